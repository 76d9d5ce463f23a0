use shoprag_core::types::SearchHit;

/// Chunk texts in ranked order, separated by blank lines.
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter().map(|h| h.record.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful e-commerce assistant.\n\
         Use ONLY the context below to answer the question.\n\
         If the context is not enough, say you don't know.\n\
         \n\
         Question: {question}\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoprag_core::types::{ChunkRecord, SourceKind};

    fn hit(text: &str, position: usize) -> SearchHit {
        SearchHit {
            record: ChunkRecord { text: text.to_string(), source: SourceKind::Product, id: position.to_string(), title: "t".to_string() },
            score: 0.5,
            position,
        }
    }

    #[test]
    fn context_keeps_rank_order() {
        let ctx = format_context(&[hit("best match", 4), hit("runner up", 1)]);
        assert_eq!(ctx, "best match\n\nrunner up");
    }

    #[test]
    fn prompt_embeds_question_and_context() {
        let p = build_prompt("Is the shirt cotton?", "Blue Shirt | Apparel | Acme | Cotton shirt");
        assert!(p.starts_with("You are a helpful e-commerce assistant.\nUse ONLY the context below"));
        assert!(p.contains("\n\nQuestion: Is the shirt cotton?\n\nContext:\nBlue Shirt | Apparel | Acme | Cotton shirt\n\nAnswer:"));
        assert!(p.ends_with("Answer:"));
    }
}
