use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::worldgen::{NoiseDef, NoiseKind};

/// Seeded 2D noise normalized to `[0, 1]`. Sampling is pure: the same cell always yields the
/// same value for the same parameters.
pub struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    pub fn new(def: &NoiseDef) -> Self {
        let mut noise = FastNoiseLite::with_seed(def.seed);
        noise.set_noise_type(Some(noise_type(def.kind)));
        noise.set_frequency(Some(def.frequency));
        Self { noise }
    }

    /// Raw sample in `[-1, 1]`.
    #[inline]
    pub fn raw(&self, x: i32, y: i32) -> f32 {
        self.noise.get_noise_2d(x as f32, y as f32)
    }

    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        ((self.raw(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").finish_non_exhaustive()
    }
}

fn noise_type(kind: NoiseKind) -> NoiseType {
    match kind {
        NoiseKind::OpenSimplex2 => NoiseType::OpenSimplex2,
        NoiseKind::OpenSimplex2s => NoiseType::OpenSimplex2S,
        NoiseKind::Cellular => NoiseType::Cellular,
        NoiseKind::Perlin => NoiseType::Perlin,
        NoiseKind::ValueCubic => NoiseType::ValueCubic,
        NoiseKind::Value => NoiseType::Value,
    }
}

/// Noise sampler plus the acceptance threshold it is compared against.
#[derive(Debug)]
pub struct ThresholdNoise {
    pub field: NoiseField,
    pub threshold: f32,
}

impl ThresholdNoise {
    pub fn new(def: &NoiseDef, threshold: f32) -> Self {
        Self {
            field: NoiseField::new(def),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn accepts(&self, x: i32, y: i32) -> bool {
        self.field.sample(x, y) >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_normalized() {
        for kind in [
            NoiseKind::OpenSimplex2,
            NoiseKind::OpenSimplex2s,
            NoiseKind::Cellular,
            NoiseKind::Perlin,
            NoiseKind::ValueCubic,
            NoiseKind::Value,
        ] {
            let field = NoiseField::new(&NoiseDef { kind, seed: 42, frequency: 0.13 });
            for y in -20..20 {
                for x in -20..20 {
                    let v = field.sample(x, y);
                    assert!((0.0..=1.0).contains(&v), "{kind:?} produced {v}");
                }
            }
        }
    }

    #[test]
    fn zero_threshold_accepts_everything() {
        let n = ThresholdNoise::new(&NoiseDef::default(), 0.0);
        assert!((-5..5).all(|x| n.accepts(x, -x)));
        let n = ThresholdNoise::new(&NoiseDef::default(), 1.5);
        assert_eq!(n.threshold, 1.0);
    }
}
