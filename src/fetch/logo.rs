use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Download the referenced logo and save its body verbatim to `dest`.
pub async fn download_logo(client: &Client, url: &str, dest: impl AsRef<Path>) -> Result<()> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting logo {url}"))?
        .error_for_status()
        .with_context(|| format!("requesting logo {url}"))?;
    let svg = resp
        .text()
        .await
        .with_context(|| format!("reading logo body from {url}"))?;
    fs::write(dest, &svg).await?;

    info!(url = %url, dest = %dest.display(), "logo downloaded");
    Ok(())
}
