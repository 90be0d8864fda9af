use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// XLM-R `<pad>` id.
pub const PAD_ID: u32 = 1;

/// Tokenizes a batch, truncating to `max_len` and padding to the longest row.
/// Returns `(input_ids, attention_mask)`, both `[B,T]` u32.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

    let mut rows: Vec<(Vec<u32>, Vec<u32>)> = encodings
        .iter()
        .map(|enc| {
            let mut ids = enc.get_ids().to_vec();
            let mut mask = enc.get_attention_mask().to_vec();
            ids.truncate(max_len);
            mask.truncate(max_len);
            (ids, mask)
        })
        .collect();

    let width = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);
    let mut flat_ids = Vec::with_capacity(rows.len() * width);
    let mut flat_mask = Vec::with_capacity(rows.len() * width);
    for (ids, mask) in rows.iter_mut() {
        let pad = width - ids.len();
        ids.extend(std::iter::repeat(PAD_ID).take(pad));
        mask.extend(std::iter::repeat(0).take(pad));
        flat_ids.extend_from_slice(ids);
        flat_mask.extend_from_slice(mask);
    }

    let input_ids = Tensor::from_vec(flat_ids, (rows.len(), width), device)?;
    let attention_mask = Tensor::from_vec(flat_mask, (rows.len(), width), device)?;
    Ok((input_ids, attention_mask))
}
