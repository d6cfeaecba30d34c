use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use codegen_core::config::CodegenConfig;
use codegen_plugins::Source;
use url::Url;

/// Turn a command-line location into a source. URLs are fetched here so the
/// engine only ever sees bytes; file paths are read by the engine itself.
pub async fn resolve_source(location: &str, format: &str) -> Result<Source> {
    if looks_like_url(location) {
        let bytes = fetch_url(location).await?;
        return Ok(Source::url(location)
            .with_format(format)
            .with_contents(bytes));
    }
    Ok(Source::file(location).with_format(format))
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<CodegenConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg = CodegenConfig::from_json_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

async fn fetch_url(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::get(url)
        .await
        .with_context(|| format!("fetch {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http error fetching {url}: {status}"));
    }
    Ok(resp.bytes().await?.to_vec())
}

fn looks_like_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
