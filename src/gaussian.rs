//! Normally distributed spawn positions.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::frustum::VisibleRect;

/// Draw from N(mean, std_dev²) with the Box–Muller transform.
pub fn sample_gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32) -> f32 {
    // 1 - [0, 1) keeps ln() away from zero
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mean + z * std_dev
}

/// Draw a point clustered on the centre of `rect`, one standard deviation being
/// a quarter of each dimension.
///
/// Draws outside the rectangle are rejected and redrawn per axis, so the result
/// always lies inside `rect`.
pub fn sample_in_rect<R: Rng + ?Sized>(rng: &mut R, rect: &VisibleRect) -> Vec2 {
    let center = rect.center();
    let x = sample_truncated(rng, center.x, rect.width() / 4.0, rect.left, rect.right);
    let y = sample_truncated(rng, center.y, rect.height() / 4.0, rect.bottom, rect.top);
    Vec2::new(x, y)
}

fn sample_truncated<R: Rng + ?Sized>(rng: &mut R, mean: f32, std_dev: f32, min: f32, max: f32) -> f32 {
    // ±2σ window: ~95% acceptance per draw
    for _ in 0..64 {
        let v = sample_gaussian(rng, mean, std_dev);
        if v >= min && v <= max {
            return v;
        }
    }
    mean.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn stats(samples: &[f32]) -> (f32, f32) {
        let n = samples.len() as f32;
        let mean = samples.iter().sum::<f32>() / n;
        let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = SmallRng::seed_from_u64(7);
        for (mean, std_dev) in [(0.0_f32, 1.0_f32), (10.0, 2.5), (-4.0, 0.5)] {
            let samples: Vec<f32> = (0..20_000)
                .map(|_| sample_gaussian(&mut rng, mean, std_dev))
                .collect();
            let (m, s) = stats(&samples);
            assert!((m - mean).abs() < 0.05 * std_dev.max(1.0), "mean {} vs {}", m, mean);
            assert!((s - std_dev).abs() < 0.05 * std_dev, "std {} vs {}", s, std_dev);
        }
    }

    #[test]
    fn test_gaussian_is_finite() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!((0..100_000).all(|_| sample_gaussian(&mut rng, 0.0, 1.0).is_finite()));
    }

    #[test]
    fn test_rect_samples_stay_inside_and_cluster() {
        let mut rng = SmallRng::seed_from_u64(3);
        let rect = VisibleRect { left: -20.0, right: 20.0, top: 10.0, bottom: -10.0 };
        let points: Vec<Vec2> = (0..10_000).map(|_| sample_in_rect(&mut rng, &rect)).collect();
        assert!(points.iter().all(|p| rect.contains(*p)));

        let near_center = points
            .iter()
            .filter(|p| p.x.abs() < 10.0 && p.y.abs() < 5.0)
            .count();
        // within one sigma on both axes: ~0.68² of the truncated mass
        assert!(near_center as f32 / points.len() as f32 > 0.4);
    }

    #[test]
    fn test_degenerate_rect_returns_center() {
        let mut rng = SmallRng::seed_from_u64(0);
        let rect = VisibleRect { left: 0.0, right: 0.0, top: 0.0, bottom: 0.0 };
        assert_eq!(sample_in_rect(&mut rng, &rect), Vec2::ZERO);
    }
}
