use anyhow::{anyhow, Result};
use candle_core::{DType, IndexOp, Tensor};

/// Mean over unmasked tokens of `[B,T,H]`, then L2 per row. Returns `[B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (_batch, _time, hidden_dim) = hidden_dims(hidden)?;

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = mask_3d.broadcast_as(hidden.shape()).or_else(|_| mask_3d.repeat((1, 1, hidden_dim)))?;
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let mean = sum.broadcast_div(&lengths)?;
    l2_normalize(&mean)
}

/// First-token (CLS) pooling, then L2 per row. BGE-M3 dense vectors use this.
pub fn cls_l2(hidden: &Tensor) -> Result<Tensor> {
    hidden_dims(hidden)?;
    let cls = hidden.i((.., 0, ..))?.contiguous()?;
    l2_normalize(&cls)
}

pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let eps_val = match rows.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let eps = Tensor::new(&[eps_val], rows.device())?.to_dtype(rows.dtype())?.unsqueeze(0)?;
    let norm = rows.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    Ok(rows.broadcast_div(&norm)?)
}

fn hidden_dims(hidden: &Tensor) -> Result<(usize, usize, usize)> {
    match hidden.dims() {
        &[b, t, h] => Ok((b, t, h)),
        other => Err(anyhow!("hidden state must be [B,T,H], got {:?}", other)),
    }
}
