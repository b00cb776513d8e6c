// src/geometry.rs
//! Геометрические примитивы генератора доски
//!
//! Все функции чистые и тотальные: вырожденные входы (нулевые отрезки, параллельные
//! прямые, пустые ломаные) дают «нет результата», а не ошибку.
//!
//! - Многоугольник: замкнутая ломаная: первая и последняя точки совпадают.
//! - Ломаная: открытая последовательность точек.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Порог знаменателя, ниже которого отрезки считаются параллельными
pub const EPSILON: f64 = 1e-10;

/// Допуск совпадения координат (ячейки сетки, якоря городов)
pub const COORD_TOLERANCE: f64 = 1e-3;

/// Точка на плоскости (и вектор, где это удобно)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Единичный вектор того же направления; `None` для нулевого вектора
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < EPSILON {
            None
        } else {
            Some(Self::new(self.x / len, self.y / len))
        }
    }

    /// Поворот на 90° против часовой стрелки
    #[must_use]
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Окружность-препятствие (буфер вокруг майлпоста)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Строго внутри радиуса
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) < self.radius
    }
}

/// Выровненный по осям прямоугольник
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// `None` для пустого набора точек
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Сжимает прямоугольник на `margin` с каждой стороны; `None`, если он схлопнулся
    #[must_use]
    pub fn shrink(&self, margin: f64) -> Option<Self> {
        let shrunk = Self {
            min_x: self.min_x + margin,
            min_y: self.min_y + margin,
            max_x: self.max_x - margin,
            max_y: self.max_y - margin,
        };
        (shrunk.min_x < shrunk.max_x && shrunk.min_y < shrunk.max_y).then_some(shrunk)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[must_use]
pub fn points_coincide(a: Point, b: Point, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

/// Тест «точка в многоугольнике» (чётно-нечётный луч)
///
/// Рёбра перебираются с замыканием последней точки на первую, поэтому ответ не зависит
/// ни от стартовой вершины, ни от того, продублирована ли она в конце.
#[must_use]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Точка пересечения отрезков `a1-a2` и `b1-b2`
///
/// Возвращает точку, только если параметры обоих отрезков лежат в `[0, 1]`.
/// Параллельные и совпадающие отрезки пересечения не дают.
#[must_use]
pub fn segment_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if denom.abs() < EPSILON {
        return None;
    }

    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1.lerp(a2, t))
    } else {
        None
    }
}

/// Расстояние от точки до отрезка (с зажимом на концах)
#[must_use]
pub fn distance_point_to_segment(p: Point, s1: Point, s2: Point) -> f64 {
    let seg = s2 - s1;
    let len_sq = seg.dot(seg);
    if len_sq < EPSILON {
        return p.distance(s1);
    }
    let t = ((p - s1).dot(seg) / len_sq).clamp(0.0, 1.0);
    p.distance(s1.lerp(s2, t))
}

/// Пересекаются ли две ломаные
///
/// При `allow_endpoint_touch` не считаются касания, в которых участвуют крайние отрезки
/// обеих ломаных (старт/финиш одной касается старта/финиша другой).
#[must_use]
pub fn polylines_intersect(a: &[Point], b: &[Point], allow_endpoint_touch: bool) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }
    let last_a = a.len() - 2;
    let last_b = b.len() - 2;

    for (i, sa) in a.windows(2).enumerate() {
        for (j, sb) in b.windows(2).enumerate() {
            if segment_intersect(sa[0], sa[1], sb[0], sb[1]).is_none() {
                continue;
            }
            if allow_endpoint_touch {
                let a_end = i == 0 || i == last_a;
                let b_end = j == 0 || j == last_b;
                if a_end && b_end {
                    continue;
                }
            }
            return true;
        }
    }
    false
}

/// Проходит ли хотя бы один отрезок ломаной ближе радиуса к центру какой-либо окружности
#[must_use]
pub fn polyline_intersects_circles(polyline: &[Point], circles: &[Circle]) -> bool {
    circles.iter().any(|circle| {
        polyline
            .windows(2)
            .any(|s| distance_point_to_segment(circle.center, s[0], s[1]) < circle.radius)
    })
}

/// Минимальное расстояние от точки до ломаной (`INFINITY` для вырожденной ломаной)
#[must_use]
pub fn min_distance_to_polyline(p: Point, polyline: &[Point]) -> f64 {
    polyline
        .windows(2)
        .map(|s| distance_point_to_segment(p, s[0], s[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Симметричное минимальное расстояние между двумя ломаными по их вершинам
#[must_use]
pub fn min_distance_between_polylines(a: &[Point], b: &[Point]) -> f64 {
    let ab = a
        .iter()
        .map(|&p| min_distance_to_polyline(p, b))
        .fold(f64::INFINITY, f64::min);
    let ba = b
        .iter()
        .map(|&p| min_distance_to_polyline(p, a))
        .fold(f64::INFINITY, f64::min);
    ab.min(ba)
}

/// Площадь многоугольника (формула шнурков)
#[must_use]
pub fn polygon_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// Среднее вершин многоугольника без замыкающего дубликата
#[must_use]
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    let unique = unique_vertices(polygon);
    if unique.is_empty() {
        return None;
    }
    let sum = unique.iter().fold(Point::default(), |acc, &p| acc + p);
    Some(sum * (1.0 / unique.len() as f64))
}

/// Вершины замкнутого многоугольника без повторённой последней точки
#[must_use]
pub fn unique_vertices(polygon: &[Point]) -> &[Point] {
    match polygon {
        [first, .., last] if points_coincide(*first, *last, EPSILON) => {
            &polygon[..polygon.len() - 1]
        }
        _ => polygon,
    }
}

/// Локальная внешняя нормаль контура в точке, лежащей на нём
///
/// Ищется ближайшее ребро в пределах `tolerance`; из двух перпендикуляров к нему
/// выбирается тот, что уводит дальше от центроида. `None`, если точка не на контуре
/// или ребро вырождено.
#[must_use]
pub fn outward_normal(polygon: &[Point], point: Point, tolerance: f64) -> Option<Point> {
    let (edge, _) = polygon
        .windows(2)
        .map(|s| (s, distance_point_to_segment(point, s[0], s[1])))
        .filter(|&(_, d)| d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let tangent = (edge[1] - edge[0]).normalized()?;
    let center = polygon_centroid(polygon)?;

    let perp1 = tangent.perpendicular();
    let perp2 = perp1 * -1.0;
    let probe1 = point + perp1 * 10.0;
    let probe2 = point + perp2 * 10.0;

    if probe1.distance(center) > probe2.distance(center) {
        Some(perp1)
    } else {
        Some(perp2)
    }
}
