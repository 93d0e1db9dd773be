//! Latchkey CLI (`lk`)
//!
//! 서명키 관리와 relying party 관점의 크레덴셜 검증을 수행하는 Operator 도구입니다.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "lk")]
#[command(author, version, about = "Latchkey CLI - Operator tool for Latchkey", long_about = None)]
struct Cli {
    /// Hub URL
    #[arg(long, global = true, env = "LK_HUB_URL")]
    hub: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────────
    /// Generate a new P-256 signing key (PKCS#8 PEM)
    Keygen {
        /// Output path
        #[arg(long)]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the PEM public key of a signing key
    PublicKey {
        /// Signing key path
        #[arg(long)]
        key: PathBuf,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Credentials
    // ─────────────────────────────────────────────────────────────────────────
    /// Verify a credential as a relying party
    Verify {
        /// Credential (compact JWS)
        token: String,

        /// Public key PEM path (fetched from the hub when omitted)
        #[arg(long)]
        public_key: Option<PathBuf>,

        /// Permission the subject must hold (e.g. +:latchkey:user)
        #[arg(long)]
        require: Option<String>,
    },

    /// Exchange a refresh credential for an access credential
    Refresh {
        /// Refresh credential
        #[arg(long, env = "LK_REFRESH_TOKEN")]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::new(cli.hub, cli.format);

    // 명령 실행
    match cli.command {
        Commands::Keygen { out, force } => commands::keys::keygen(&out, force),
        Commands::PublicKey { key } => commands::keys::public_key(&key),
        Commands::Verify {
            token,
            public_key,
            require,
        } => {
            commands::verify::verify(&config, &token, public_key.as_deref(), require.as_deref())
                .await
        }
        Commands::Refresh { token } => commands::token::refresh(&config, &token).await,
    }
}
