use shoprag_core::config::Config;
use shoprag_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let texts = vec!["blue cotton shirt".to_string(), "how long does shipping take".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={} id={}", embs.len(), embedder.dim(), embedder.embedder_id());
    Ok(())
}
