// src/river/obstacles.rs
//! Препятствия для рек: буферы майлпостов, озёра, граница
//!
//! Буферные окружности разложены по корзинам равномерной сетки, чтобы запрос
//! «задевает ли шаг какой-нибудь майлпост» смотрел только на соседние корзины.

use crate::geometry::{
    COORD_TOLERANCE, Circle, Point, distance_point_to_segment, point_in_polygon,
    points_coincide, polyline_intersects_circles, segment_intersect,
};
use super::River;
use crate::lakes::Lake;
use std::collections::HashMap;

/// Допуск совпадения пересечения с устьем реки
const TERMINAL_TOLERANCE: f64 = 1e-6;

/// Корзинный индекс одинаковых окружностей
#[derive(Debug, Clone)]
pub struct CircleIndex {
    radius: f64,
    bucket_size: f64,
    buckets: HashMap<(i64, i64), Vec<Point>>,
}

impl CircleIndex {
    #[must_use]
    pub fn new(centers: &[Point], radius: f64) -> Self {
        let bucket_size = (radius * 4.0).max(1.0);
        let mut index = Self {
            radius,
            bucket_size,
            buckets: HashMap::new(),
        };
        if radius > 0.0 {
            for &c in centers {
                let key = index.key(c);
                index.buckets.entry(key).or_default().push(c);
            }
        }
        index
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn key(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.bucket_size).floor() as i64,
            (p.y / self.bucket_size).floor() as i64,
        )
    }

    /// Центры в корзинах, покрывающих отрезок с запасом в радиус
    fn nearby(&self, a: Point, b: Point) -> impl Iterator<Item = Point> + '_ {
        let pad = self.radius;
        let (x0, y0) = self.key(Point::new(a.x.min(b.x) - pad, a.y.min(b.y) - pad));
        let (x1, y1) = self.key(Point::new(a.x.max(b.x) + pad, a.y.max(b.y) + pad));
        (x0..=x1)
            .flat_map(move |x| (y0..=y1).map(move |y| (x, y)))
            .filter_map(move |key| self.buckets.get(&key))
            .flatten()
            .copied()
    }

    /// Точка строго внутри какого-либо буфера
    #[must_use]
    pub fn blocks_point(&self, p: Point) -> bool {
        self.nearby(p, p).any(|c| c.distance(p) < self.radius)
    }

    #[must_use]
    pub fn blocks_segment(&self, a: Point, b: Point) -> bool {
        let circles: Vec<Circle> = self
            .nearby(a, b)
            .map(|c| Circle::new(c, self.radius))
            .collect();
        polyline_intersects_circles(&[a, b], &circles)
    }

    /// Ближайший к `a` центр, буфер которого задевает отрезок
    #[must_use]
    pub fn blocking_center(&self, a: Point, b: Point) -> Option<Point> {
        self.nearby(a, b)
            .filter(|&c| distance_point_to_segment(c, a, b) < self.radius)
            .min_by(|c1, c2| c1.distance(a).total_cmp(&c2.distance(a)))
    }
}

/// Всё, что река должна обходить
pub struct Obstacles<'a> {
    pub boundary: &'a [Point],
    pub lakes: &'a [Lake],
    pub circles: CircleIndex,
}

impl<'a> Obstacles<'a> {
    #[must_use]
    pub fn new(
        boundary: &'a [Point],
        lakes: &'a [Lake],
        milepost_points: &[Point],
        buffer_radius: f64,
    ) -> Self {
        Self {
            boundary,
            lakes,
            circles: CircleIndex::new(milepost_points, buffer_radius),
        }
    }

    #[must_use]
    pub fn in_lake(&self, p: Point) -> bool {
        self.lakes.iter().any(|lake| lake.contains(p))
    }

    /// Ближайшая к `a` точка, где отрезок пересекает контур какого-либо озера
    #[must_use]
    pub fn lake_crossing(&self, a: Point, b: Point) -> Option<Point> {
        self.lakes
            .iter()
            .flat_map(|lake| lake.outline.windows(2))
            .filter_map(|edge| segment_intersect(a, b, edge[0], edge[1]))
            .min_by(|p1, p2| p1.distance(a).total_cmp(&p2.distance(a)))
    }

    /// Точка вне буферов майлпостов и вне озёр
    #[must_use]
    pub fn point_is_clear(&self, p: Point) -> bool {
        !self.circles.blocks_point(p) && !self.in_lake(p)
    }

    #[must_use]
    pub fn inside_boundary(&self, p: Point) -> bool {
        point_in_polygon(p, self.boundary)
    }

    /// Проверка готовой реки целиком
    ///
    /// Все точки, кроме истока, свободны; все, кроме истока и устья, внутри границы;
    /// ни один отрезок не пересекает контур озера, кроме первого при
    /// `exempt_first_segment` (исток на берегу).
    #[must_use]
    pub fn path_is_valid(&self, points: &[Point], exempt_first_segment: bool) -> bool {
        let n = points.len();
        if n < 2 {
            return false;
        }

        let points_ok = points.iter().enumerate().skip(1).all(|(i, &p)| {
            self.point_is_clear(p) && (i == n - 1 || self.inside_boundary(p))
        });
        if !points_ok {
            return false;
        }

        points
            .windows(2)
            .enumerate()
            .filter(|&(i, _)| !(i == 0 && exempt_first_segment))
            .all(|(_, s)| self.lake_crossing(s[0], s[1]).is_none())
    }

    /// Река пересекает прежние реки и границу только в своём устье
    ///
    /// Пересечение с рекой допускается лишь на последнем отрезке в самой конечной
    /// точке, касание в истоке не считается (общий исток на озере). Пересечение с
    /// границей засчитывается, только если оно дальше `boundary_exclusion` от устья.
    #[must_use]
    pub fn crossings_are_terminal(
        &self,
        points: &[Point],
        rivers: &[River],
        boundary_exclusion: f64,
    ) -> bool {
        let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
            return true;
        };
        let last = points.len().saturating_sub(2);

        points.windows(2).enumerate().all(|(i, s)| {
            let rivers_ok = rivers
                .iter()
                .flat_map(|river| river.points.windows(2))
                .filter_map(|r| segment_intersect(s[0], s[1], r[0], r[1]))
                .filter(|&p| !points_coincide(p, start, COORD_TOLERANCE))
                .all(|p| i == last && p.distance(end) <= TERMINAL_TOLERANCE);
            let boundary_ok = self
                .boundary
                .windows(2)
                .filter_map(|b| segment_intersect(s[0], s[1], b[0], b[1]))
                .all(|p| p.distance(end) <= boundary_exclusion);
            rivers_ok && boundary_ok
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::river::{RiverSource, Termination};

    fn square(origin: Point, size: f64) -> Vec<Point> {
        vec![
            origin,
            origin + Point::new(size, 0.0),
            origin + Point::new(size, size),
            origin + Point::new(0.0, size),
            origin,
        ]
    }

    #[test]
    fn index_matches_brute_force() {
        let centers: Vec<Point> = (0..20)
            .flat_map(|i| (0..20).map(move |j| Point::new(f64::from(i) * 13.0, f64::from(j) * 7.0)))
            .collect();
        let index = CircleIndex::new(&centers, 4.0);
        let circles: Vec<Circle> = centers.iter().map(|&c| Circle::new(c, 4.0)).collect();

        let probes = [
            (Point::new(1.0, 1.0), Point::new(60.0, 3.0)),
            (Point::new(6.5, 3.5), Point::new(6.5, 3.6)),
            (Point::new(200.0, 200.0), Point::new(300.0, 300.0)),
            (Point::new(-50.0, 20.0), Point::new(-10.0, 20.0)),
        ];
        for (a, b) in probes {
            assert_eq!(
                index.blocks_segment(a, b),
                polyline_intersects_circles(&[a, b], &circles),
                "{a:?} → {b:?}"
            );
        }
    }

    #[test]
    fn blocking_center_is_nearest_to_start() {
        let index = CircleIndex::new(&[Point::new(10.0, 0.0), Point::new(20.0, 0.0)], 2.0);
        let hit = index.blocking_center(Point::new(0.0, 0.0), Point::new(30.0, 0.0));
        assert_eq!(hit, Some(Point::new(10.0, 0.0)));
        assert!(index.blocking_center(Point::new(0.0, 5.0), Point::new(30.0, 5.0)).is_none());
    }

    #[test]
    fn zero_radius_blocks_nothing() {
        let index = CircleIndex::new(&[Point::new(0.0, 0.0)], 0.0);
        assert!(!index.blocks_point(Point::new(0.0, 0.0)));
    }

    #[test]
    fn crossing_an_earlier_river_only_at_the_end() {
        let boundary = square(Point::new(0.0, 0.0), 100.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 3.0);
        let earlier = River {
            id: 0,
            points: vec![Point::new(50.0, 10.0), Point::new(50.0, 90.0)],
            source: RiverSource::Interior,
            termination: Termination::ReachedBoundary,
        };
        let rivers = [earlier];

        let joins = [Point::new(20.0, 40.0), Point::new(40.0, 45.0), Point::new(50.0, 50.0)];
        assert!(obstacles.crossings_are_terminal(&joins, &rivers, 1.0));

        // Вершина перед устьем уехала за чужую реку: пересечение до устья
        let overshoots = [Point::new(20.0, 40.0), Point::new(52.0, 45.0), Point::new(50.0, 50.0)];
        assert!(!obstacles.crossings_are_terminal(&overshoots, &rivers, 1.0));

        let to_boundary = [Point::new(20.0, 20.0), Point::new(20.0, 60.0), Point::new(0.0, 60.0)];
        assert!(obstacles.crossings_are_terminal(&to_boundary, &rivers, 1.0));

        let leaves_and_returns = [
            Point::new(20.0, 20.0),
            Point::new(-5.0, 30.0),
            Point::new(20.0, 40.0),
            Point::new(0.0, 60.0),
        ];
        assert!(!obstacles.crossings_are_terminal(&leaves_and_returns, &rivers, 1.0));
    }

    #[test]
    fn path_validation_checks_lakes_and_buffers() {
        let boundary = square(Point::new(0.0, 0.0), 100.0);
        let lakes = vec![Lake {
            id: 0,
            outline: square(Point::new(40.0, 40.0), 20.0),
        }];
        let obstacles = Obstacles::new(&boundary, &lakes, &[Point::new(80.0, 80.0)], 3.0);

        let clear = [Point::new(10.0, 10.0), Point::new(30.0, 10.0), Point::new(100.0, 10.0)];
        assert!(obstacles.path_is_valid(&clear, false));

        let through_lake = [Point::new(30.0, 50.0), Point::new(70.0, 50.0), Point::new(100.0, 50.0)];
        assert!(!obstacles.path_is_valid(&through_lake, false));

        let into_buffer = [Point::new(10.0, 10.0), Point::new(79.0, 79.0), Point::new(100.0, 100.0)];
        assert!(!obstacles.path_is_valid(&into_buffer, false));

        // Исток на берегу: первый отрезок может касаться контура своего озера
        let from_shore = [Point::new(40.0, 50.0), Point::new(30.0, 50.0), Point::new(0.0, 50.0)];
        assert!(obstacles.path_is_valid(&from_shore, true));
        assert!(!obstacles.path_is_valid(&from_shore, false));
    }
}
