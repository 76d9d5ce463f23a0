use clap::Parser;

use shoprag_cli::{format_hits, init_tracing, open_retriever};
use shoprag_core::config::Config;

/// Show the chunks retrieved for a query, with scores.
#[derive(Parser, Debug)]
#[command(name = "shoprag-search", version)]
struct Args {
    /// Query text
    #[arg(required = true)]
    query: Vec<String>,
    /// Number of hits (defaults to retrieval.top_k)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Config::load()?.settings()?;
    let retriever = open_retriever(&settings).await?;

    let query = args.query.join(" ");
    let top_k = args.top_k.unwrap_or(settings.retrieval.top_k);
    let hits = retriever.search(&query, top_k)?;
    println!("🔍 '{}' -> {} hits (of {} indexed)", query, hits.len(), retriever.len());
    println!("{}", format_hits(&hits));
    Ok(())
}
