// src/boundary.rs
//! Граница континента
//!
//! Замкнутый шумный контур, площадь которого близка к `area_ratio * width * height`.
//! Форма намеренно анизотропна: оси x и y масштабируются разными гармониками
//! с разными фазами, чтобы не получался правильный эллипс.
//! Каждая точка независимо зажимается в `[margin, dimension - margin]` по своей оси,
//! поэтому повторные попытки не нужны.

use crate::config::BoardConfig;
use crate::geometry::{Point, polygon_area};
use crate::noise::radial_noise;
use rand::Rng;
use std::f64::consts::TAU;

/// Амплитуды двух синусоид и равномерного шума (доли базового радиуса)
const NOISE_AMPLITUDES: (f64, f64, f64) = (0.06, 0.06, 0.05);
/// Анизотропия по x: `1 + 0.12·sin θ`
const STRETCH_X: f64 = 0.12;
/// Анизотропия по y: `1 + 0.18·cos(θ − 0.5)`
const STRETCH_Y: f64 = 0.18;
const STRETCH_Y_PHASE: f64 = 0.5;

/// Параметры контура
#[derive(Debug, Clone, Copy)]
pub struct BoundaryParams {
    pub width: f64,
    pub height: f64,
    pub num_points: usize,
    pub area_ratio: f64,
    /// Отступ от левого/правого края
    pub margin_x: f64,
    /// Отступ от верхнего/нижнего края
    pub margin_y: f64,
}

impl BoundaryParams {
    /// Отступы берутся равными шагам сетки
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            num_points: config.boundary.num_points,
            area_ratio: config.boundary.area_ratio,
            margin_x: config.horizontal_spacing,
            margin_y: config.vertical_spacing,
        }
    }
}

/// Точка контура до зажатия, для угла `theta` и базового радиуса `radius`
fn shape_point(center: Point, radius: f64, theta: f64, jitter: f64) -> Point {
    let r = radius + radial_noise(theta, radius, NOISE_AMPLITUDES, jitter);
    Point::new(
        center.x + theta.cos() * r * (1.0 + STRETCH_X * theta.sin()),
        center.y + theta.sin() * r * (1.0 + STRETCH_Y * (theta - STRETCH_Y_PHASE).cos()),
    )
}

/// Площадь бесшумной формы с единичным радиусом
fn unit_shape_area(num_points: usize) -> f64 {
    let unit: Vec<Point> = (0..num_points)
        .map(|i| {
            let theta = (i as f64 / num_points as f64) * TAU;
            shape_point(Point::default(), 1.0, theta, 0.5)
        })
        .collect();
    polygon_area(&unit)
}

/// Базовый радиус: площадь ≈ целевой, но не дальше отступов от центра
#[must_use]
pub fn base_radius(params: &BoundaryParams) -> f64 {
    let target_area = params.width * params.height * params.area_ratio;
    let unit_area = unit_shape_area(params.num_points.max(3));
    let ideal = if unit_area > 0.0 {
        (target_area / unit_area).sqrt()
    } else {
        0.0
    };

    let limit_x = params.width / 2.0 - params.margin_x;
    let limit_y = params.height / 2.0 - params.margin_y;
    ideal.min(limit_x).min(limit_y).max(0.0)
}

/// Генерирует замкнутый контур границы (первая точка повторена в конце)
pub fn generate_boundary<R: Rng + ?Sized>(rng: &mut R, params: &BoundaryParams) -> Vec<Point> {
    let center = Point::new(params.width / 2.0, params.height / 2.0);
    let radius = base_radius(params);

    let mut points = Vec::with_capacity(params.num_points + 1);
    for i in 0..params.num_points {
        let theta = (i as f64 / params.num_points as f64) * TAU;
        let raw = shape_point(center, radius, theta, rng.gen_range(0.0..1.0));

        // max/min вместо clamp: при слишком узком поле границы могут перекреститься
        let x = raw.x.max(params.margin_x).min(params.width - params.margin_x);
        let y = raw.y.max(params.margin_y).min(params.height - params.margin_y);
        points.push(Point::new(x, y));
    }

    if let Some(&first) = points.first() {
        points.push(first);
    }

    tracing::debug!(
        radius,
        area = polygon_area(&points),
        "граница сгенерирована"
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point_in_polygon;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(width: f64, height: f64, area_ratio: f64) -> BoundaryParams {
        BoundaryParams {
            width,
            height,
            num_points: 120,
            area_ratio,
            margin_x: 35.0,
            margin_y: 10.0,
        }
    }

    #[test]
    fn boundary_is_closed_and_within_margins() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = params(1600.0, 1200.0, 0.6);
        let boundary = generate_boundary(&mut rng, &p);

        assert_eq!(boundary.len(), 121);
        assert_eq!(boundary[0], boundary[120]);
        for pt in &boundary {
            assert!(pt.x >= 35.0 && pt.x <= 1565.0);
            assert!(pt.y >= 10.0 && pt.y <= 1190.0);
        }
        assert!(point_in_polygon(Point::new(800.0, 600.0), &boundary));
    }

    #[test]
    fn area_tracks_ratio() {
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = params(1200.0, 1200.0, 0.5);
            let area = polygon_area(&generate_boundary(&mut rng, &p));
            let target = 0.5 * 1200.0 * 1200.0;
            assert!((area - target).abs() / target < 0.15, "площадь {area}");
        }
    }

    #[test]
    fn radius_is_clamped_by_margins() {
        let p = params(400.0, 100.0, 0.65);
        assert!(base_radius(&p) <= 50.0 - 10.0);
    }

    #[test]
    fn tiny_board_does_not_panic() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let boundary = generate_boundary(&mut rng, &params(20.0, 10.0, 0.6));
        assert_eq!(boundary.len(), 121);
    }
}
