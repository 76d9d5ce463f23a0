use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use shoprag_core::config::{expand_path, EmbeddingSettings};

mod fake;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;
pub use shoprag_core::traits::Embedder;

use crate::tokenize::tokenize_on_device;

/// Sentence embedder over a BERT checkpoint in the sentence-transformers
/// layout (`tokenizer.json`, `config.json`, and `model.safetensors` or
/// `pytorch_model.bin`). Output is the masked mean of the last hidden
/// state, L2-normalized.
pub struct BertEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, id: String, dim: usize, max_len: usize }

impl BertEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading embedding model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?;
        let raw: serde_json::Value = serde_json::from_str(&config_text)?;
        let dim = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .and_then(|d| usize::try_from(d).ok())
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        let name = model_dir.file_name().map_or_else(|| "bert".to_string(), |n| n.to_string_lossy().to_string());
        let id = format!("bert:{name}:d{dim}");
        info!(embedder = %id, "embedding model loaded");
        Ok(Self { model, tokenizer, device, id, dim, max_len })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim {
            return Err(anyhow!("model produced {} dims, expected {}", emb.len(), self.dim));
        }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 { debug!(ms = elapsed.as_millis(), "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for BertEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Metal when built with the `metal` feature and a GPU is present, else CPU.
fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(dev) => {
            info!("embedding on Metal");
            return dev;
        }
        Err(e) => debug!(error = %e, "Metal unavailable"),
    }
    info!("embedding on CPU");
    Device::Cpu
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<std::collections::HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        return Ok(candle_core::pickle::read_all(&pickle)?.into_iter().collect());
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin under {}", model_dir.display()))
}

/// Pick the embedder for this run: the fake one when configured (or when
/// `APP_USE_FAKE_EMBEDDINGS=1`), otherwise the BERT model on disk.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let forced = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if settings.use_fake || forced {
        warn!(dim = settings.fake_dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.fake_dim)));
    }
    let model_dir = resolve_model_dir(settings)?;
    Ok(Box::new(BertEmbedder::load(&model_dir, settings.max_len)?))
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") { let p = expand_path(&dir); if p.exists() { info!(dir = %p.display(), "using APP_MODEL_DIR"); return Ok(p); } }
    let configured = expand_path(&settings.model_dir);
    if configured.exists() { return Ok(configured); }
    let parent = Path::new("..").join(&configured);
    if configured.is_relative() && parent.exists() { info!(dir = %parent.display(), "using model dir from parent"); return Ok(parent); }
    Err(anyhow!("Could not locate embedding model directory {}", configured.display()))
}
