// src/river/shaping.rs
//! Постобработка выращенной реки
//!
//! Три стадии по порядку: срезка острых углов, меандр, локальное сглаживание Безье.
//! Исток и устье не двигаются ни на одной стадии. Результат каждой стадии целиком
//! проверяется по препятствиям; если он нарушает хоть одно ограничение, стадия
//! откатывается к своему входу.

use super::{River, RiverParams};
use super::obstacles::Obstacles;
use crate::geometry::Point;
use std::f64::consts::PI;

/// Точек кривой на каждый сглаженный угол
const BEZIER_SAMPLES: usize = 4;

/// Внутренний угол в вершине `cur` (π у прямой); `None` для вырожденных рёбер
fn interior_angle(prev: Point, cur: Point, next: Point) -> Option<f64> {
    let a = (prev - cur).normalized()?;
    let b = (next - cur).normalized()?;
    Some(a.dot(b).clamp(-1.0, 1.0).acos())
}

/// Заменяет каждую вершину с внутренним углом меньше `threshold` двумя точками
/// на прилегающих рёбрах
#[must_use]
pub fn reduce_sharp_angles(points: &[Point], threshold: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(n * 2);
    out.push(points[0]);
    for w in points.windows(3) {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        match interior_angle(prev, cur, next) {
            Some(angle) if angle < threshold => {
                out.push(prev.lerp(cur, 0.7));
                out.push(cur.lerp(next, 0.3));
            }
            _ => out.push(cur),
        }
    }
    out.push(points[n - 1]);
    out
}

/// Смещает внутренние точки по перпендикуляру к входящему ребру
///
/// Смещение: `intensity * sin(progress * π) * sin(progress * 2π * frequency)`, где
/// `progress` есть доля пройденных вершин. Огибающая гасит меандр у концов.
#[must_use]
pub fn meander(points: &[Point], intensity: f64, frequency: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let last = (n - 1) as f64;
    let mut out = points.to_vec();
    for i in 1..n - 1 {
        let Some(dir) = (points[i] - points[i - 1]).normalized() else {
            continue;
        };
        let progress = i as f64 / last;
        let offset = intensity * (progress * PI).sin() * (progress * 2.0 * PI * frequency).sin();
        out[i] = points[i] + dir.perpendicular() * offset;
    }
    out
}

fn quadratic_bezier(a: Point, control: Point, b: Point, t: f64) -> Point {
    let u = 1.0 - t;
    a * (u * u) + control * (2.0 * u * t) + b * (t * t)
}

/// Скругляет каждую внутреннюю вершину квадратичной кривой
///
/// Кривая идёт от точки на входящем ребре до точки на исходящем, управляющая
/// точка сама вершина. Точка кривой, не прошедшая `is_clear`, заменяется точкой на
/// хорде между концами кривой.
#[must_use]
pub fn smooth_bezier<F>(points: &[Point], smoothness: f64, is_clear: F) -> Vec<Point>
where
    F: Fn(Point) -> bool,
{
    let n = points.len();
    // Не больше половины ребра: кривые соседних вершин не перекрываются
    let s = smoothness.clamp(0.0, 0.5);
    if n < 3 || s.is_nan() || s <= 0.0 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(2 + (n - 2) * (BEZIER_SAMPLES + 1));
    out.push(points[0]);
    for w in points.windows(3) {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        let a = cur.lerp(prev, s);
        let b = cur.lerp(next, s);
        for k in 0..=BEZIER_SAMPLES {
            let t = k as f64 / BEZIER_SAMPLES as f64;
            let q = quadratic_bezier(a, cur, b, t);
            out.push(if is_clear(q) { q } else { a.lerp(b, t) });
        }
    }
    out.push(points[n - 1]);
    out
}

/// Ограничения, которые каждая стадия обязана сохранить
struct StageCheck<'a, 'b> {
    obstacles: &'a Obstacles<'b>,
    rivers: &'a [River],
    exempt_first_segment: bool,
    boundary_exclusion: f64,
}

impl StageCheck<'_, '_> {
    fn keep_if_valid(&self, input: Vec<Point>, output: Vec<Point>, stage: &str) -> Vec<Point> {
        let valid = self
            .obstacles
            .path_is_valid(&output, self.exempt_first_segment)
            && self
                .obstacles
                .crossings_are_terminal(&output, self.rivers, self.boundary_exclusion);
        if valid {
            output
        } else {
            tracing::debug!(stage, "стадия постобработки откатана");
            input
        }
    }
}

/// Все стадии постобработки с откатом нарушивших ограничения
///
/// `rivers` это уже построенные реки: после обработки река по-прежнему
/// пересекает их и границу только в своём устье.
#[must_use]
pub fn shape_river(
    points: Vec<Point>,
    obstacles: &Obstacles<'_>,
    rivers: &[River],
    exempt_first_segment: bool,
    params: &RiverParams,
) -> Vec<Point> {
    let check = StageCheck {
        obstacles,
        rivers,
        exempt_first_segment,
        boundary_exclusion: params.boundary_exclusion,
    };

    let reduced = reduce_sharp_angles(&points, params.sharp_angle_threshold);
    let path = check.keep_if_valid(points, reduced, "angles");

    let meandered = meander(&path, params.meander_intensity, params.meander_frequency);
    let path = check.keep_if_valid(path, meandered, "meander");

    let smoothed = smooth_bezier(&path, params.smoothness, |p| obstacles.point_is_clear(p));
    check.keep_if_valid(path, smoothed, "bezier")
}
