use anyhow::{ensure, Result};

/// Run `embed` over `texts` in slices of at most `batch_size` and concatenate
/// the rows in input order. A `batch_size` of 0 is treated as 1.
pub fn embed_in_batches<F>(texts: &[String], batch_size: usize, mut embed: F) -> Result<Vec<Vec<f32>>>
where
    F: FnMut(&[String]) -> Result<Vec<Vec<f32>>>,
{
    let mut rows = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        let out = embed(batch)?;
        ensure!(out.len() == batch.len(), "batch of {} texts produced {} vectors", batch.len(), out.len());
        rows.extend(out);
    }
    Ok(rows)
}
