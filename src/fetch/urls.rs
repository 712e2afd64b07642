use anyhow::{anyhow, Context, Result};
use url::Url;

static EXPORT_BASE: &str = "https://docs.google.com";

/// Derive the CSV export endpoint from a human-facing Google Sheets URL.
///
/// The spreadsheet id is the path segment before the terminal one
/// (`/spreadsheets/d/{id}/edit`), and the tab id is whatever follows the
/// last `=` in the fragment (`#gid={gid}`).
pub fn export_url(sheet_url: &str) -> Result<Url> {
    let url = Url::parse(sheet_url).with_context(|| format!("parsing sheet URL {sheet_url}"))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    if segments.len() < 2 {
        return Err(anyhow!("sheet URL {sheet_url} has no spreadsheet id in its path"));
    }
    let spread_sheet_id = segments[segments.len() - 2];

    let sheet_id = url
        .fragment()
        .and_then(|f| f.rsplit('=').next().filter(|_| f.contains('=')))
        .ok_or_else(|| anyhow!("sheet URL {sheet_url} has no #gid= fragment"))?;

    let mut export = Url::parse(EXPORT_BASE).expect("export base URL should be valid");
    export.set_path(&format!("/spreadsheets/d/{spread_sheet_id}/export"));
    export
        .query_pairs_mut()
        .append_pair("format", "csv")
        .append_pair("gid", sheet_id);

    Ok(export)
}
