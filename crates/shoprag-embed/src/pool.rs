use anyhow::{anyhow, Result};
use candle_core::{DType, Tensor};

/// Sentence vector: average the token states the attention mask keeps, then
/// scale each row to unit length.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]`; returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, hidden_dim) = hidden.dims3().map_err(|e| anyhow!("hidden state must be [B, T, H]: {e}"))?;
    if attention_mask.dims() != [batch, tokens] {
        return Err(anyhow!("attention mask {:?} does not match hidden state [{batch}, {tokens}, {hidden_dim}]", attention_mask.dims()));
    }
    let dtype = hidden.dtype();
    let floor = match dtype { DType::F16 | DType::BF16 => 1e-6f32, _ => 1e-12f32 };
    let floor = Tensor::new(&[floor], hidden.device())?.to_dtype(dtype)?;

    let weights = attention_mask.to_device(hidden.device())?.to_dtype(dtype)?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(2)?)?.sum(1)?;
    let kept = weights.sum_keepdim(1)?.broadcast_maximum(&floor)?;
    let mean = summed.broadcast_div(&kept)?;

    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_maximum(&floor)?;
    Ok(mean.broadcast_div(&norms)?)
}
