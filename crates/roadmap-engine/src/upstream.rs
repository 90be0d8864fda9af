//! Calls into the embedding and generation capabilities, bounded by timeouts
//! and mapped into the core error taxonomy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use roadmap_core::traits::{Embedder, Generator};
use roadmap_core::{Capability, Error, Result};

/// Embeds `texts` on the blocking pool. The reply must hold one vector of
/// length `dim` per text.
pub async fn embed(
    embedder: Arc<dyn Embedder>,
    texts: Vec<String>,
    dim: usize,
    timeout: Duration,
    context: &str,
) -> Result<Vec<Vec<f32>>> {
    let expected = texts.len();
    let task = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts));
    let joined = match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined,
        Err(_) => {
            warn!(context, ?timeout, "embedding timed out");
            return Err(Error::UpstreamTimeout { capability: Capability::Embedding, after: timeout, context: context.to_string() });
        }
    };
    let vectors = joined
        .map_err(|e| Error::upstream(Capability::Embedding, format!("embedding task for {context} panicked: {e}")))?
        .map_err(|e| {
            error!(context, error = %e, "embedding failed");
            Error::upstream(Capability::Embedding, format!("embedding failed for {context}: {e}"))
        })?;
    if vectors.len() != expected {
        return Err(Error::upstream(
            Capability::Embedding,
            format!("embedding for {context} returned {} vectors for {} texts", vectors.len(), expected),
        ));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        error!(context, got = bad.len(), expected = dim, "embedding dimension mismatch");
        return Err(Error::upstream(
            Capability::Embedding,
            format!("embedding for {context} returned a {}-dimensional vector, index expects {dim}", bad.len()),
        ));
    }
    Ok(vectors)
}

pub async fn generate(generator: &dyn Generator, prompt: &str, timeout: Duration, context: &str) -> Result<String> {
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            error!(context, model = generator.model_id(), error = %e, "generation failed");
            Err(Error::upstream(Capability::Generation, format!("generation failed for {context}: {e}")))
        }
        Err(_) => Err(Error::UpstreamTimeout { capability: Capability::Generation, after: timeout, context: context.to_string() }),
    }
}
