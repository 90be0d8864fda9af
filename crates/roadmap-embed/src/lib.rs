//! Embedding capability: BGE-M3 on candle, plus a deterministic fake for tests
//! and offline runs.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use roadmap_core::config::{EmbeddingSettings, Pooling};
use roadmap_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::{cls_l2, masked_mean_l2};

pub struct BgeM3Embedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    batch_size: usize,
    pooling: Pooling,
}

impl BgeM3Embedder {
    pub fn load(model_dir: &Path, settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        info!(model_dir = %model_dir.display(), "loading BGE-M3");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: XLMRobertaConfig = serde_json::from_str(&raw_config)
            .map_err(|e| anyhow!("Failed to parse {}: {}", config_path.display(), e))?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)
            .map_err(|e| anyhow!("Failed to read weights from {}: {}", weights_path.display(), e))?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, pooling = ?settings.pooling, "BGE-M3 ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            dim,
            max_len: settings.max_len,
            batch_size: settings.batch_size.max(1),
            pooling: settings.pooling,
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize::tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = match self.pooling {
            Pooling::Cls => pool::cls_l2(&hidden)?,
            Pooling::Mean => pool::masked_mean_l2(&hidden, &attention_mask)?,
        };
        let rows: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()?;
        Ok(rows)
    }
}

impl Embedder for BgeM3Embedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

/// Hashed bag-of-words vectors. Same text, same vector; shared words pull
/// vectors together, which is enough for retrieval tests.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn fake_requested(settings: &EmbeddingSettings) -> bool {
    settings.fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
}

/// Fake embedder when requested, otherwise BGE-M3 from the resolved model dir.
/// Fails if the model's hidden size differs from the index dimension `dim`.
pub fn default_embedder(settings: &EmbeddingSettings, dim: usize) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        info!(dim, "using fake embedder");
        return Ok(Box::new(FakeEmbedder::new(dim)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    let embedder = BgeM3Embedder::load(&model_dir, settings)?;
    if embedder.dim() != dim {
        return Err(anyhow!(
            "model at {} produces {}-dimensional vectors, index expects {}",
            model_dir.display(),
            embedder.dim(),
            dim
        ));
    }
    Ok(Box::new(embedder))
}

/// Configured dir, then `APP_MODEL_DIR`, `MODEL_DIR`, then `models/bge-m3`.
pub fn resolve_model_dir(configured: Option<&Path>) -> Result<PathBuf> {
    let mut candidates: Vec<(&str, PathBuf)> = Vec::new();
    if let Some(p) = configured {
        candidates.push(("embedding.model_dir", p.to_path_buf()));
    }
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        candidates.push(("APP_MODEL_DIR", PathBuf::from(dir)));
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        candidates.push(("MODEL_DIR", PathBuf::from(dir)));
    }
    candidates.push(("default", PathBuf::from("models/bge-m3")));

    for (source, path) in candidates {
        if path.exists() {
            info!(source, path = %path.display(), "using model dir");
            return Ok(path);
        }
        warn!(source, path = %path.display(), "model dir not found");
    }
    Err(anyhow!("Could not locate BGE-M3 model directory"))
}
