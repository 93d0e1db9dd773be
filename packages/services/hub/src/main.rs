//! Latchkey Hub
//!
//! 로그인(`/signin`), refresh 교환(`/token/refresh`), 공개키 배포(`/token/public-key`),
//! 계정 관리(`/user`) 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod crypto;
mod db;
mod error;
mod handlers;
mod middleware;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "lk_hub=debug,lk_core=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting Hub with config: {:?}", config);

    // 앱 상태 초기화
    let state = AppState::new(&config).await?;
    let state = Arc::new(state);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Hub listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    let accounts = Router::new()
        .route("/user", get(handlers::user::list).post(handlers::user::create))
        .route(
            "/user/{id}",
            get(handlers::user::get).delete(handlers::user::delete),
        )
        .route(
            "/user/{id}/credential",
            post(handlers::user::update_credentials),
        )
        .route(
            "/user/{id}/permissions",
            post(handlers::user::update_permissions),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    Router::new()
        // Sign-in & token exchange
        .route("/signin", post(handlers::signin::sign_in))
        .route("/token/refresh", post(handlers::token::refresh))
        .route("/token/public-key", get(handlers::token::public_key))
        // Account API
        .merge(accounts)
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
