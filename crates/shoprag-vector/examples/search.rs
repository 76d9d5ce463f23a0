use shoprag_core::config::Config;
use shoprag_embed::get_default_embedder;
use shoprag_vector::Retriever;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "blue shirt".to_string());
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let retriever = Retriever::open(&settings.data.index_dir(), &settings.data.meta_path(), embedder).await?;
    for hit in retriever.search(&query, settings.retrieval.top_k)? {
        println!("{:.4}  [{}] {}  {}", hit.score, hit.record.source, hit.record.title, hit.record.text);
    }
    Ok(())
}
