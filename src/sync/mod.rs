use crate::fetch::{logo, sheet, urls};
use crate::project;
use anyhow::Context;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;
use url::Url;

pub const SPOT_URL_ENV: &str = "GOOGLE_SHEET_SPOT_URL";
pub const BASIC_URL_ENV: &str = "GOOGLE_SHEET_BASIC_URL";

/// Where the basic-data sheet's logo lands, relative to the run root.
const LOGO_PATH: &str = "public/logo.svg";

/// Terminal failure for the whole run. The `Display` strings are the fixed
/// user-facing diagnostics; the underlying cause is kept for debug logging.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("環境変数 \"GOOGLE_SHEET_SPOT_URL\" と \"GOOGLE_SHEET_BASIC_URL\" を指定して下さい。")]
    MissingConfiguration,

    #[error("スプレッドシートのダウンロードに失敗しました。URLと閲覧権限が正しく設定されている事を確認して下さい。")]
    SheetFetch(anyhow::Error),

    #[error("ロゴ画像のダウンロードに失敗しました。正しいURLか確認して下さい。")]
    LogoFetch(anyhow::Error),

    #[error("ファイル {} の書き込みに失敗しました。", path.display())]
    Write { path: PathBuf, cause: anyhow::Error },
}

impl SyncError {
    /// Underlying cause, for logging alongside the fixed diagnostic.
    pub fn cause(&self) -> Option<String> {
        match self {
            SyncError::MissingConfiguration => None,
            SyncError::SheetFetch(e) | SyncError::LogoFetch(e) => Some(format!("{e:#}")),
            SyncError::Write { cause, .. } => Some(format!("{cause:#}")),
        }
    }
}

/// How a sheet's rows become its JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// Raw `{ "values": [[..]] }` table.
    Table,
    /// Flat record projected from the header and first data row.
    Record,
}

#[derive(Debug, Clone)]
pub struct SheetSource {
    pub name: &'static str,
    pub export_path: &'static str,
    pub sheet_url: String,
    pub kind: SheetKind,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub spot_url: String,
    pub basic_url: String,
    /// Directory the output paths are resolved against.
    pub root: PathBuf,
}

impl SyncConfig {
    /// Read the two required sheet URLs from the environment, resolving
    /// outputs against the working directory.
    pub fn from_env() -> Result<Self, SyncError> {
        let spot_url = env::var(SPOT_URL_ENV).ok().filter(|v| !v.is_empty());
        let basic_url = env::var(BASIC_URL_ENV).ok().filter(|v| !v.is_empty());
        match (spot_url, basic_url) {
            (Some(spot_url), Some(basic_url)) => Ok(Self {
                spot_url,
                basic_url,
                root: PathBuf::from("."),
            }),
            _ => Err(SyncError::MissingConfiguration),
        }
    }

    /// The sheet sources in processing order: spot data, then basic data.
    pub fn sources(&self) -> Vec<SheetSource> {
        vec![
            SheetSource {
                name: "スポットデータ",
                export_path: "public/data.json",
                sheet_url: self.spot_url.clone(),
                kind: SheetKind::Table,
            },
            SheetSource {
                name: "基本データ",
                export_path: "src/config.json",
                sheet_url: self.basic_url.clone(),
                kind: SheetKind::Record,
            },
        ]
    }
}

/// JSON shape written to disk for one sheet.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExportPayload {
    Table { values: Vec<Vec<String>> },
    Record(Map<String, Value>),
}

impl ExportPayload {
    fn logo_image_url(&self) -> Option<&str> {
        match self {
            ExportPayload::Record(map) => map.get("logo_image_url").and_then(Value::as_str),
            ExportPayload::Table { .. } => None,
        }
    }
}

fn is_svg_url(url: &str) -> bool {
    url.to_lowercase().contains(".svg")
}

/// Process every configured sheet in order, stopping at the first failure.
/// Files written before the failure are left in place.
pub async fn run(client: &Client, cfg: &SyncConfig) -> Result<(), SyncError> {
    for source in cfg.sources() {
        info!(name = %source.name, url = %source.sheet_url, "processing sheet");
        let export = urls::export_url(&source.sheet_url).map_err(SyncError::SheetFetch)?;
        process_export(client, &export, &source, &cfg.root).await?;
    }
    Ok(())
}

/// Fetch one sheet's CSV export, shape its payload, pull the logo if the
/// basic data references an SVG, and write the payload as pretty JSON.
pub async fn process_export(
    client: &Client,
    export: &Url,
    source: &SheetSource,
    root: &Path,
) -> Result<(), SyncError> {
    let values = sheet::fetch_rows(client, export, sheet::DEFAULT_MAX_COLS)
        .await
        .map_err(SyncError::SheetFetch)?;

    let payload = match source.kind {
        SheetKind::Table => ExportPayload::Table { values },
        SheetKind::Record => ExportPayload::Record(project::project_record(&values)),
    };

    if let Some(logo_url) = payload
        .logo_image_url()
        .filter(|u| is_svg_url(u))
        .map(str::to_string)
    {
        logo::download_logo(client, &logo_url, root.join(LOGO_PATH))
            .await
            .map_err(SyncError::LogoFetch)?;
    }

    let dest = root.join(source.export_path);
    write_payload(&payload, &dest)
        .await
        .map_err(|cause| SyncError::Write { path: dest, cause })?;

    info!(name = %source.name, "sheet written");
    Ok(())
}

async fn write_payload(payload: &ExportPayload, dest: &Path) -> anyhow::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(payload).context("serializing payload")?;
    fs::write(dest, json).await?;
    Ok(())
}
