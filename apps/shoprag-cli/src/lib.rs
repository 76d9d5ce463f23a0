//! Shared plumbing for the command-line front ends.
use shoprag_core::config::Settings;
use shoprag_core::types::SearchHit;
use shoprag_embed::get_default_embedder;
use shoprag_vector::Retriever;

const PREVIEW_CHARS: usize = 200;

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info`.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).compact().init();
}

pub async fn open_retriever(settings: &Settings) -> anyhow::Result<Retriever> {
    let embedder = get_default_embedder(&settings.embedding)?;
    Retriever::open(&settings.data.index_dir(), &settings.data.meta_path(), embedder).await
}

/// First `PREVIEW_CHARS` characters of a chunk, with an ellipsis if cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "(no matching chunks)".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(rank, hit)| {
            format!(
                "{:>2}. score={:.4} source={} title={}\n    {}",
                rank + 1,
                hit.score,
                hit.record.source,
                hit.record.title,
                preview(&hit.record.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
