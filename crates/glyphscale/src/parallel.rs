//! Batch rendering across threads
//!
//! Every rayon worker gets its own [`ScaleContext`]; the provider is shared
//! by reference. Results come back in input order.

use glyphscale_core::{GlyphId, GlyphProvider, Image, Result};
use log::{debug, warn};
use rayon::prelude::*;

use crate::context::ScaleContext;
use crate::render::Render;
use crate::scaler::ScalerConfig;

/// Render `glyphs` in parallel on the global rayon pool.
pub fn render_batch<P: GlyphProvider>(
    provider: &P,
    config: &ScalerConfig,
    render: &Render,
    glyphs: &[GlyphId],
) -> Vec<Result<Image>> {
    debug!("Rendering {} glyphs in parallel", glyphs.len());
    glyphs
        .par_iter()
        .map_init(ScaleContext::new, |context, &glyph_id| {
            let mut scaler = context.scaler(provider, config)?;
            render.render(&mut scaler, glyph_id)
        })
        .collect()
}

/// Like [`render_batch`] on a dedicated pool of `threads` workers.
///
/// Zero threads, or a pool that cannot be created, falls back to the global
/// pool.
pub fn render_batch_with_threads<P: GlyphProvider>(
    provider: &P,
    config: &ScalerConfig,
    render: &Render,
    glyphs: &[GlyphId],
    threads: usize,
) -> Vec<Result<Image>> {
    if threads == 0 {
        return render_batch(provider, config, render, glyphs);
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| render_batch(provider, config, render, glyphs)),
        Err(e) => {
            warn!("Could not build a {threads}-thread pool ({e}); using the global pool");
            render_batch(provider, config, render, glyphs)
        }
    }
}
