use anyhow::{Context, Result};

/// Produces a fixed-length embedding from an encoded face image.
///
/// Implementations must be deterministic per call and always return vectors
/// of the same length. The neural encoder used in production deployments
/// plugs in here; tests substitute a fixed stub.
pub trait EmbeddingExtractor {
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>>;
}

impl<T: EmbeddingExtractor + ?Sized> EmbeddingExtractor for &T {
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>> {
        (**self).extract(image)
    }
}

const HUE_BINS: usize = 32;
const SAT_BINS: usize = 32;

/// Dimensionality of embeddings produced by [`HistogramExtractor`].
pub const HISTOGRAM_DIMS: usize = HUE_BINS * SAT_BINS;

/// Hue-saturation histogram extractor.
///
/// A model-free extractor that embeds an image as its L2-normalized 2D
/// hue-saturation color histogram. No ML model required.
pub struct HistogramExtractor;

impl EmbeddingExtractor for HistogramExtractor {
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>> {
        let img = image::load_from_memory(image).context("decoding face image")?;
        let rgb = img.to_rgb8();

        let mut hist = vec![0.0f32; HISTOGRAM_DIMS];
        for px in rgb.pixels() {
            let r = px[0] as f32 / 255.0;
            let g = px[1] as f32 / 255.0;
            let b = px[2] as f32 / 255.0;

            let (h, s, _v) = rgb_to_hsv(r, g, b);

            let h_bin = ((h / 360.0) * HUE_BINS as f32).min(HUE_BINS as f32 - 1.0) as usize;
            let s_bin = (s * SAT_BINS as f32).min(SAT_BINS as f32 - 1.0) as usize;
            hist[h_bin * SAT_BINS + s_bin] += 1.0;
        }

        l2_normalize(&mut hist);
        Ok(hist)
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}
