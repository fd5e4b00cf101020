//! Deterministic terrain generation for the headless driver.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilefall_core::{PixelPoint, WorldConfig};
use tilefall_world::{BitmapSource, LoadError, SOLID_SAMPLE};

/// Generates a world bitmap: solid ground filling the lower half, plus
/// seed-determined pillars rising above the surface.
pub(crate) fn generate(config: &WorldConfig, seed: u64) -> Result<BitmapSource, LoadError> {
    let columns = config.grid_columns;
    let rows = config.grid_rows;
    let mut samples = vec![0xff_u8; columns as usize * rows as usize];

    let mut solidify = |x: u32, y: u32| {
        samples[y as usize * columns as usize + x as usize] = SOLID_SAMPLE;
    };

    let ground_row = rows / 2;
    for y in ground_row..rows {
        for x in 0..columns {
            solidify(x, y);
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..columns / 4 {
        let x = rng.gen_range(0..columns);
        let height = rng.gen_range(1..=3u32);
        for step in 1..=height.min(ground_row) {
            solidify(x, ground_row - step);
        }
    }

    BitmapSource::new(columns, rows, samples)
}

/// Spawn location for the player: near the horizontal center, clear of the
/// ground and of the tallest pillars.
pub(crate) fn spawn_point(config: &WorldConfig) -> PixelPoint {
    let x = (config.grid_columns / 2) * config.tile_size;
    let y = (config.grid_rows / 2).saturating_sub(6) * config.tile_size;
    PixelPoint::new(x as i32, y as i32)
}
