use anyhow::Context as _;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

pub fn client() -> Client {
    Client::new()
}

pub async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> anyhow::Result<T> {
    let resp = req.send().await.context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("request failed ({}): {}", status, text));
    }
    let body = resp.json::<T>().await.context("invalid json response")?;
    Ok(body)
}

pub async fn send_text(req: RequestBuilder) -> anyhow::Result<String> {
    let resp = req.send().await.context("request failed")?;
    let status = resp.status();
    let text = resp.text().await.context("invalid response body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("request failed ({}): {}", status, text));
    }
    Ok(text)
}
