use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;

const BROWSER_AGENT: &str = "Mozilla/5.0";

/// Shared by the stats source and the narrative generator. No total request
/// timeout is set: callers that need a deadline impose their own.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(None::<Duration>)
        .build()
        .context("failed to build http client")
}

pub fn get_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(USER_AGENT, BROWSER_AGENT)
        .send()
        .context("request failed")?;
    read_success_body(resp)
}

pub fn read_success_body(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, snippet(&body)));
    }
    Ok(body)
}

fn snippet(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.trim();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].trim()
}
