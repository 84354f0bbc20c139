use noise::{NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

// =============================================================================
// NOISE PARAMETERS
// =============================================================================

/// Parameters for heightmap generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Base frequency applied to cell indices (lower = larger landmasses)
    pub frequency: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Slope of the radial falloff sigmoid
    pub falloff_steepness: f32,
    /// Normalized distance from centre where the falloff reaches one half
    pub falloff_midpoint: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            frequency: 0.03,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            falloff_steepness: 14.0,
            falloff_midpoint: 0.55,
        }
    }
}

/// Lowest and highest value of the remapped height range.
pub const HEIGHT_MIN: f32 = 0.0;
pub const HEIGHT_MAX: f32 = 100.0;

// =============================================================================
// HEIGHTMAP GENERATION
// =============================================================================

/// Generate a `rows × cols` heightmap in `[0, 100]`:
/// 1. Multi-octave OpenSimplex fBm sampled at `(row, col) * frequency`
/// 2. Remap from `[-1, 1]` onto `[0, 100]`
/// 3. Multiply by a circular sigmoid falloff so the map edges sink into water
///
/// Identical inputs always give a bit-identical result.
pub fn generate_heightmap(seed: u64, rows: usize, cols: usize, params: &NoiseParams) -> Tilemap<f32> {
    let noise = OpenSimplex::new(seed as u32);
    let mut heightmap = Tilemap::new_with(rows, cols, 0.0f32);

    for row in 0..rows {
        for col in 0..cols {
            let nx = row as f64 * params.frequency;
            let ny = col as f64 * params.frequency;

            let raw = fbm(&noise, nx, ny, params.octaves, params.persistence, params.lacunarity) as f32;
            let height = remap(raw, -1.0, 1.0, HEIGHT_MIN, HEIGHT_MAX).clamp(HEIGHT_MIN, HEIGHT_MAX);
            let falloff = sigmoid_falloff(col, row, cols, rows, params.falloff_steepness, params.falloff_midpoint);

            heightmap.set(row, col, height * falloff);
        }
    }

    heightmap
}

/// Classify every height sample into a terrain grid.
pub fn classify_heightmap(heightmap: &Tilemap<f32>) -> Tilemap<Terrain> {
    let mut terrain = Tilemap::new(heightmap.rows, heightmap.cols);
    for (row, col, &h) in heightmap.iter() {
        terrain.set(row, col, Terrain::classify(h));
    }
    terrain
}

/// Fractal Brownian motion, normalized by the total amplitude.
fn fbm(
    noise: &impl NoiseFn<f64, 2>,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Linearly map `value` from `[in_start, in_end]` onto `[out_start, out_end]`.
pub fn remap(value: f32, in_start: f32, in_end: f32, out_start: f32, out_end: f32) -> f32 {
    out_start + (out_end - out_start) / (in_end - in_start) * (value - in_start)
}

/// Falloff factor in `(0, 1)`: close to 1 near the centre, close to 0 at the corners.
pub fn sigmoid_falloff(x: usize, y: usize, width: usize, height: usize, steepness: f32, midpoint: f32) -> f32 {
    let mid_x = (width / 2) as f32;
    let mid_y = (height / 2) as f32;

    let max_dist = (mid_x * mid_x + mid_y * mid_y).sqrt();
    if max_dist == 0.0 {
        return 1.0;
    }

    let dx = x as f32 - mid_x;
    let dy = y as f32 - mid_y;
    let d = (dx * dx + dy * dy).sqrt() / max_dist;

    1.0 / (1.0 + (steepness * (d - midpoint)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightmap_is_deterministic() {
        let params = NoiseParams::default();
        let a = generate_heightmap(42, 24, 31, &params);
        let b = generate_heightmap(42, 24, 31, &params);
        let a_bits: Vec<u32> = a.as_slice().iter().map(|h| h.to_bits()).collect();
        let b_bits: Vec<u32> = b.as_slice().iter().map(|h| h.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_heights_stay_in_range() {
        let heightmap = generate_heightmap(7, 40, 40, &NoiseParams::default());
        let (min_h, max_h) = heightmap.min_max();
        assert!(min_h >= HEIGHT_MIN);
        assert!(max_h <= HEIGHT_MAX);
    }

    #[test]
    fn test_corners_fall_into_water() {
        let heightmap = generate_heightmap(42, 10, 10, &NoiseParams::default());
        let terrain = classify_heightmap(&heightmap);
        assert_eq!(*terrain.get(0, 0), Terrain::Water);
    }

    #[test]
    fn test_falloff_shape() {
        let centre = sigmoid_falloff(50, 50, 100, 100, 14.0, 0.55);
        let corner = sigmoid_falloff(0, 0, 100, 100, 14.0, 0.55);
        assert!(centre > 0.99);
        assert!(corner < 0.01);
        assert!(corner * HEIGHT_MAX < crate::terrain::WATER_LEVEL);
    }

    #[test]
    fn test_remap() {
        assert_eq!(remap(-1.0, -1.0, 1.0, 0.0, 100.0), 0.0);
        assert_eq!(remap(0.0, -1.0, 1.0, 0.0, 100.0), 50.0);
        assert_eq!(remap(1.0, -1.0, 1.0, 0.0, 100.0), 100.0);
    }
}
