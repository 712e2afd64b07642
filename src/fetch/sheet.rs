use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Columns beyond this are dropped from every row.
pub const DEFAULT_MAX_COLS: usize = 10;

/// Incremental CSV record decoder fed from response body chunks.
///
/// Chunks rarely end on a record boundary, so the decoder buffers bytes and
/// tracks quote parity to find the last newline that actually terminates a
/// record. Everything up to that point is handed to the CSV parser; the tail
/// waits for the next chunk.
pub struct RowDecoder {
    max_cols: usize,
    buf: Vec<u8>,
    in_quotes: bool,
    rows: Vec<Vec<String>>,
}

impl RowDecoder {
    pub fn new(max_cols: usize) -> Self {
        Self {
            max_cols,
            buf: Vec::new(),
            in_quotes: false,
            rows: Vec::new(),
        }
    }

    /// Feed the next body chunk, parsing any records it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        let base = self.buf.len();
        self.buf.extend_from_slice(chunk);

        let mut boundary = None;
        for (i, &b) in chunk.iter().enumerate() {
            match b {
                b'"' => self.in_quotes = !self.in_quotes,
                b'\n' if !self.in_quotes => boundary = Some(base + i),
                _ => {}
            }
        }

        if let Some(end) = boundary {
            let complete: Vec<u8> = self.buf.drain(..=end).collect();
            self.parse_records(&complete)?;
        }
        Ok(())
    }

    /// Parse whatever is still buffered (a final record without a trailing
    /// newline) and return the accumulated rows.
    pub fn finish(mut self) -> Result<Vec<Vec<String>>> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            self.parse_records(&rest)?;
        }
        Ok(self.rows)
    }

    fn parse_records(&mut self, bytes: &[u8]) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        for record in reader.records() {
            let record = record.context("parsing CSV record")?;
            if let Some(row) = shape_row(&record, self.max_cols) {
                self.rows.push(row);
            }
        }
        Ok(())
    }
}

/// Truncate to `max_cols`, drop all-empty rows, trim trailing empty cells
/// (always keeping at least one cell).
fn shape_row(record: &csv::StringRecord, max_cols: usize) -> Option<Vec<String>> {
    let mut row: Vec<String> = record.iter().take(max_cols).map(str::to_string).collect();
    if row.iter().all(|cell| cell.is_empty()) {
        return None;
    }
    while row.len() > 1 && row.last().map(String::as_str) == Some("") {
        row.pop();
    }
    Some(row)
}

/// Download a sheet's CSV export and decode it into shaped rows as the body
/// streams in.
pub async fn fetch_rows(
    client: &Client,
    export_url: &Url,
    max_cols: usize,
) -> Result<Vec<Vec<String>>> {
    let resp = client
        .get(export_url.as_str())
        .send()
        .await
        .with_context(|| format!("requesting {export_url}"))?
        .error_for_status()
        .with_context(|| format!("requesting {export_url}"))?;

    let mut decoder = RowDecoder::new(max_cols);
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("reading CSV body chunk")?;
        decoder.push(&chunk)?;
    }

    let rows = decoder.finish()?;
    debug!(url = %export_url, rows = rows.len(), "sheet CSV decoded");
    Ok(rows)
}
