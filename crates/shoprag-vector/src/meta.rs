//! JSONL metadata: one `ChunkRecord` per line, line order = index slot order.

use shoprag_core::error::{Error, Result};
use shoprag_core::types::ChunkRecord;

pub fn encode_meta(records: &[ChunkRecord]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.push(b'\n');
    }
    Ok(out)
}

pub fn parse_meta(bytes: &[u8]) -> Result<Vec<ChunkRecord>> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::Operation(format!("metadata is not UTF-8: {e}")))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| Error::Operation(format!("metadata line {}: {e}", n + 1)))
        })
        .collect()
}

/// Content digest recorded in the manifest to pair metadata with an index.
pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoprag_core::types::SourceKind;

    #[test]
    fn lines_use_the_documented_field_names() {
        let record = ChunkRecord {
            text: "Blue Shirt | Apparel | Acme | Cotton shirt".to_string(),
            source: SourceKind::Product,
            id: "1".to_string(),
            title: "Blue Shirt".to_string(),
        };
        let bytes = encode_meta(std::slice::from_ref(&record)).expect("encode");
        let line = String::from_utf8(bytes.clone()).expect("utf8");
        assert_eq!(
            line,
            "{\"text\":\"Blue Shirt | Apparel | Acme | Cotton shirt\",\"source\":\"product\",\"id\":\"1\",\"title\":\"Blue Shirt\"}\n"
        );
        assert_eq!(parse_meta(&bytes).expect("parse"), vec![record]);
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let record = ChunkRecord { text: "Café crème".to_string(), source: SourceKind::Faqs, id: "faqs".to_string(), title: "FAQs".to_string() };
        let bytes = encode_meta(&[record]).expect("encode");
        assert!(String::from_utf8(bytes).expect("utf8").contains("Café crème"));
    }

    #[test]
    fn bad_line_reports_its_number() {
        let err = parse_meta(b"{\"text\":\"a\",\"source\":\"faqs\",\"id\":\"faqs\",\"title\":\"FAQs\"}\nnot json\n").expect_err("bad");
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}
