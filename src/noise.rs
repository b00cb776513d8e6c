// src/noise.rs
//! Шумные замкнутые контуры
//!
//! Общий приём для границы и озёр: точки на окружности, радиус которой возмущён
//! суммой двух синусоид фиксированной частоты и ограниченного равномерного шума.

use crate::geometry::Point;
use rand::Rng;
use std::f64::consts::TAU;

/// Возмущение радиуса в угле `theta`
///
/// `jitter`: равномерная случайная величина из `[0, 1)`, так что вклад шума
/// симметричен и ограничен `±amplitudes.2 / 2`.
#[must_use]
pub fn radial_noise(theta: f64, base_radius: f64, amplitudes: (f64, f64, f64), jitter: f64) -> f64 {
    let (wave_a, wave_b, random) = amplitudes;
    (theta * 7.0).sin() * base_radius * wave_a
        + (theta * 4.0).cos() * base_radius * wave_b
        + (jitter - 0.5) * base_radius * random
}

/// Шумная петля вокруг центра (без анизотропии)
///
/// Первая точка дублируется в конце, чтобы контур был замкнут.
pub fn noisy_loop<R: Rng + ?Sized>(
    rng: &mut R,
    center: Point,
    base_radius: f64,
    noise_scale: f64,
    num_points: usize,
) -> Vec<Point> {
    let mut points = Vec::with_capacity(num_points + 1);

    for i in 0..num_points {
        let theta = (i as f64 / num_points as f64) * TAU;
        let noise = (theta * 5.0).sin() * base_radius * 0.15 * noise_scale
            + (theta * 3.0).cos() * base_radius * 0.1 * noise_scale
            + (rng.gen_range(0.0..1.0) - 0.5) * base_radius * 0.1 * noise_scale;

        let r = base_radius + noise;
        points.push(Point::new(
            center.x + theta.cos() * r,
            center.y + theta.sin() * r,
        ));
    }

    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{point_in_polygon, points_coincide};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn loop_is_closed_and_surrounds_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let center = Point::new(100.0, 100.0);
        let lake = noisy_loop(&mut rng, center, 40.0, 0.5, 32);

        assert_eq!(lake.len(), 33);
        assert!(points_coincide(lake[0], lake[32], 0.0));
        assert!(point_in_polygon(center, &lake));
    }

    #[test]
    fn loop_radius_stays_within_noise_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let center = Point::new(0.0, 0.0);
        let lake = noisy_loop(&mut rng, center, 50.0, 1.0, 64);
        // 0.15 + 0.1 + 0.05 от радиуса: максимальное отклонение
        for p in &lake {
            let r = p.distance(center);
            assert!(r >= 50.0 * 0.7 - 1e-9 && r <= 50.0 * 1.3 + 1e-9);
        }
    }

    #[test]
    fn zero_points_gives_empty_loop() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(noisy_loop(&mut rng, Point::default(), 10.0, 0.5, 0).is_empty());
    }
}
