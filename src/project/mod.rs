use serde_json::{Map, Value};

/// Replace full-width (zenkaku) forms with their half-width equivalents.
///
/// The full-width punctuation/alphanumeric block `！`..=`～` sits exactly
/// 0xFEE0 above its ASCII counterparts; the ideographic space (U+3000) maps
/// to a plain space. All other characters pass through.
pub fn zen_to_han(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '！'..='～' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

/// Project a header-plus-first-data-row table into a flat key/value record.
///
/// Each header cell becomes a key; its value is the first data row's cell at
/// the index of that header cell's *first* occurrence (so duplicate header
/// names all resolve through the first column of that name), empty when the
/// row is shorter. Values are normalized to half-width. A table with only a
/// header row projects to all-empty values. Rows past the first data row are
/// ignored.
pub fn project_record(table: &[Vec<String>]) -> Map<String, Value> {
    let header = table.first().map(Vec::as_slice).unwrap_or_default();
    let empty_row = vec![String::new(); header.len()];
    let record = table.get(1).unwrap_or(&empty_row);

    let mut out = Map::new();
    for column in header {
        let index = header
            .iter()
            .position(|h| h == column)
            .unwrap_or(usize::MAX);
        let value = record.get(index).map(String::as_str).unwrap_or("");
        out.insert(column.clone(), Value::String(zen_to_han(value)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn zen_to_han_shifts_fullwidth_block() {
        assert_eq!(zen_to_han("ＡＢＣ１２３"), "ABC123");
        assert_eq!(zen_to_han("！～"), "!~");
        for c in '！'..='～' {
            let shifted = zen_to_han(&c.to_string());
            assert_eq!(
                shifted.chars().next().unwrap() as u32,
                c as u32 - 0xFEE0
            );
        }
    }

    #[test]
    fn zen_to_han_replaces_ideographic_space() {
        assert_eq!(zen_to_han("　"), " ");
        assert_eq!(zen_to_han("ａ　ｂ"), "a b");
    }

    #[test]
    fn zen_to_han_is_total_and_idempotent() {
        assert_eq!(zen_to_han(""), "");
        assert_eq!(zen_to_han("plain ascii!"), "plain ascii!");
        let once = zen_to_han("Ｆｏｏ　Bar");
        assert_eq!(zen_to_han(&once), once);
    }

    #[test]
    fn zen_to_han_keeps_kana_and_kanji() {
        assert_eq!(zen_to_han("東京タワー"), "東京タワー");
    }

    #[test]
    fn projects_first_data_row() {
        let t = table(&[
            &["name", "logo_image_url"],
            &["Foo", "http://x/logo.svg"],
            &["ignored", "ignored"],
        ]);
        let record = project_record(&t);
        assert_eq!(record["name"], "Foo");
        assert_eq!(record["logo_image_url"], "http://x/logo.svg");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn header_only_table_projects_empty_values() {
        let t = table(&[&["name", "logo_image_url"]]);
        let record = project_record(&t);
        assert_eq!(record["name"], "");
        assert_eq!(record["logo_image_url"], "");
    }

    #[test]
    fn short_data_row_defaults_missing_cells_to_empty() {
        let t = table(&[&["a", "b", "c"], &["1"]]);
        let record = project_record(&t);
        assert_eq!(record["a"], "1");
        assert_eq!(record["b"], "");
        assert_eq!(record["c"], "");
    }

    #[test]
    fn values_are_normalized() {
        let t = table(&[&["name"], &["Ｆｏｏ　Ｂａｒ"]]);
        let record = project_record(&t);
        assert_eq!(record["name"], "Foo Bar");
    }

    // Duplicate header names all look up the first occurrence's column. This
    // mirrors the index-based lookup downstream consumers already rely on.
    #[test]
    fn duplicate_header_resolves_to_first_occurrence() {
        let t = table(&[&["x", "x"], &["first", "second"]]);
        let record = project_record(&t);
        assert_eq!(record.len(), 1);
        assert_eq!(record["x"], "first");
    }

    #[test]
    fn keys_keep_header_order() {
        let t = table(&[&["z", "a", "m"], &["1", "2", "3"]]);
        let record = project_record(&t);
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
