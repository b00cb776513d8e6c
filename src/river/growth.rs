// src/river/growth.rs
//! Пошаговый рост реки от истока к устью
//!
//! На каждом шаге предлагается точка на `segment_length` ближе к цели. Шаг,
//! задевающий буфер майлпоста или контур озера, заменяется обходом по
//! перпендикуляру; шаг, пересекающий другую реку или границу, обрывает реку
//! в точке пересечения.

use super::obstacles::Obstacles;
use super::{River, RiverParams, Termination};
use crate::geometry::{COORD_TOLERANCE, Point, points_coincide, segment_intersect};
use rand::Rng;

/// Результат успешного роста
#[derive(Debug, Clone, PartialEq)]
pub struct GrownRiver {
    pub points: Vec<Point>,
    pub termination: Termination,
}

/// Откуда и куда растёт река
#[derive(Debug, Clone, Copy)]
pub struct GrowthRequest {
    pub start: Point,
    pub end: Point,
    /// Внешняя нормаль берега, если исток на озере
    pub departure_normal: Option<Point>,
}

/// Направление шага в окне отхода от озера
///
/// Если прямое направление на цель уже смотрит наружу, берётся оно. Иначе нормаль
/// смешивается с направлением на цель с весом `1 - step / steps`; смесь, всё ещё
/// смотрящая внутрь, проецируется на касательную к берегу.
#[must_use]
pub fn departure_direction(to_target: Point, normal: Point, step: usize, steps: usize) -> Point {
    if to_target.dot(normal) >= 0.0 {
        return to_target;
    }

    let w = 1.0 - step as f64 / steps.max(1) as f64;
    let blended = (normal * w + to_target * (1.0 - w))
        .normalized()
        .unwrap_or(normal);
    let along = blended.dot(normal);
    if along >= 0.0 {
        blended
    } else {
        (blended - normal * along).normalized().unwrap_or(normal)
    }
}

/// Обход препятствия по случайным точкам перпендикуляра
///
/// Перпендикуляр длины `length` проходит через предложенную точку. После `attempts`
/// неудач берётся тот конец перпендикуляра, что дальше от препятствия.
#[derive(Debug, Clone, Copy)]
pub struct PerpendicularDiversion {
    pub length: f64,
    pub attempts: usize,
}

impl PerpendicularDiversion {
    pub fn divert<R, F, G>(
        &self,
        rng: &mut R,
        proposed: Point,
        direction: Point,
        obstacle: Point,
        step_is_clear: F,
        fallback_is_clear: G,
    ) -> Option<Point>
    where
        R: Rng + ?Sized,
        F: Fn(Point) -> bool,
        G: Fn(Point) -> bool,
    {
        let perp = direction.perpendicular();
        let half = (self.length / 2.0).max(0.0);

        for _ in 0..self.attempts {
            let candidate = proposed + perp * rng.gen_range(-half..=half);
            if step_is_clear(candidate) {
                return Some(candidate);
            }
        }

        let a = proposed + perp * half;
        let b = proposed - perp * half;
        let farthest = if a.distance(obstacle) >= b.distance(obstacle) {
            a
        } else {
            b
        };
        fallback_is_clear(farthest).then_some(farthest)
    }
}

/// Пересечение шага с чужой рекой или границей
struct Crossing {
    point: Point,
    river: Option<usize>,
}

struct Grower<'a, 'b> {
    obstacles: &'a Obstacles<'b>,
    rivers: &'a [River],
    params: &'a RiverParams,
    end: Point,
    lake_source: bool,
}

enum Step {
    Move(Point),
    Stop(Crossing),
    Stall,
}

impl Grower<'_, '_> {
    fn point_is_admissible(&self, p: Point) -> bool {
        self.obstacles.point_is_clear(p)
            && (self.obstacles.inside_boundary(p) || points_coincide(p, self.end, COORD_TOLERANCE))
    }

    fn segment_is_clear(&self, a: Point, b: Point, exempt_lakes: bool) -> bool {
        !self.obstacles.circles.blocks_segment(a, b)
            && (exempt_lakes || self.obstacles.lake_crossing(a, b).is_none())
    }

    fn step_is_clear(&self, a: Point, b: Point, exempt_lakes: bool) -> bool {
        self.segment_is_clear(a, b, exempt_lakes) && self.point_is_admissible(b)
    }

    /// Ближайшее к `a` пересечение с реками и границей
    ///
    /// Касания у самой `a` и пересечения с границей рядом с устьем не считаются.
    fn first_crossing(&self, a: Point, b: Point) -> Option<Crossing> {
        let river_hits = self.rivers.iter().flat_map(|river| {
            river
                .points
                .windows(2)
                .filter_map(move |s| segment_intersect(a, b, s[0], s[1]))
                .map(move |point| Crossing {
                    point,
                    river: Some(river.id),
                })
        });
        let boundary_hits = self
            .obstacles
            .boundary
            .windows(2)
            .filter_map(|s| segment_intersect(a, b, s[0], s[1]))
            .filter(|p| p.distance(self.end) > self.params.boundary_exclusion)
            .map(|point| Crossing { point, river: None });

        river_hits
            .chain(boundary_hits)
            .filter(|c| !points_coincide(c.point, a, COORD_TOLERANCE))
            .min_by(|c1, c2| c1.point.distance(a).total_cmp(&c2.point.distance(a)))
    }

    /// Обрыв в точке пересечения, если сама точка и путь до неё свободны
    fn stop_at(&self, current: Point, target: Point, exempt_lakes: bool) -> Option<Crossing> {
        self.first_crossing(current, target).filter(|c| {
            self.obstacles.point_is_clear(c.point)
                && self.segment_is_clear(current, c.point, exempt_lakes)
        })
    }

    fn obstacle_near(&self, current: Point, proposed: Point) -> Point {
        self.obstacles
            .circles
            .blocking_center(current, proposed)
            .or_else(|| self.obstacles.lake_crossing(current, proposed))
            .unwrap_or(proposed)
    }

    fn advance<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        current: Point,
        proposed: Point,
        direction: Point,
        exempt_lakes: bool,
    ) -> Step {
        if let Some(crossing) = self.stop_at(current, proposed, exempt_lakes) {
            return Step::Stop(crossing);
        }
        if self.step_is_clear(current, proposed, exempt_lakes) {
            return Step::Move(proposed);
        }

        let diversion = PerpendicularDiversion {
            length: self.params.perpendicular_length,
            attempts: self.params.diversion_attempts,
        };
        let obstacle = self.obstacle_near(current, proposed);
        let diverted = diversion.divert(
            rng,
            proposed,
            direction,
            obstacle,
            |p| self.step_is_clear(current, p, exempt_lakes),
            |p| {
                self.point_is_admissible(p)
                    && (exempt_lakes || self.obstacles.lake_crossing(current, p).is_none())
            },
        );

        let Some(next) = diverted else {
            return Step::Stall;
        };
        match self.first_crossing(current, next) {
            None => Step::Move(next),
            Some(_) => self
                .stop_at(current, next, exempt_lakes)
                .map_or(Step::Stall, Step::Stop),
        }
    }
}

/// Растит реку от `request.start` к `request.end`
///
/// `None`, если за `max_iterations` шагов река не дошла ни до устья, ни до
/// пересечения.
pub fn grow_river<R: Rng + ?Sized>(
    rng: &mut R,
    obstacles: &Obstacles<'_>,
    rivers: &[River],
    request: &GrowthRequest,
    params: &RiverParams,
) -> Option<GrownRiver> {
    let grower = Grower {
        obstacles,
        rivers,
        params,
        end: request.end,
        lake_source: request.departure_normal.is_some(),
    };

    let mut points = vec![request.start];
    let mut current = request.start;

    for iteration in 0..params.max_iterations {
        let remaining = current.distance(request.end);
        if remaining <= params.arrival_epsilon {
            return Some(GrownRiver {
                points,
                termination: Termination::ReachedBoundary,
            });
        }
        let Some(to_target) = (request.end - current).normalized() else {
            break;
        };

        let segments = points.len() - 1;
        let direction = match request.departure_normal {
            Some(normal) if segments < params.departure_steps => {
                departure_direction(to_target, normal, segments, params.departure_steps)
            }
            _ => to_target,
        };
        let direct = direction == to_target;
        let proposed = if direct && remaining <= params.segment_length {
            request.end
        } else {
            current + direction * params.segment_length
        };

        let exempt_lakes = grower.lake_source && segments == 0;
        match grower.advance(rng, current, proposed, direction, exempt_lakes) {
            Step::Move(next) => {
                points.push(next);
                current = next;
            }
            Step::Stop(crossing) => {
                points.push(crossing.point);
                let termination = match crossing.river {
                    Some(river) => Termination::JoinedRiver { river },
                    None => Termination::HitBoundary,
                };
                tracing::debug!(iteration, ?termination, "река оборвана пересечением");
                return Some(GrownRiver {
                    points,
                    termination,
                });
            }
            Step::Stall => {}
        }
    }

    tracing::debug!(
        points = points.len(),
        distance = current.distance(request.end),
        "река не дошла до устья"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::lakes::Lake;
    use crate::river::RiverSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Квадрат с вершинами в углах и серединах сторон
    fn square(size: f64) -> Vec<Point> {
        let h = size / 2.0;
        vec![
            Point::new(0.0, 0.0),
            Point::new(h, 0.0),
            Point::new(size, 0.0),
            Point::new(size, h),
            Point::new(size, size),
            Point::new(h, size),
            Point::new(0.0, size),
            Point::new(0.0, h),
            Point::new(0.0, 0.0),
        ]
    }

    fn params() -> RiverParams {
        RiverParams::from_config(&BoardConfig::default())
    }

    fn request(start: Point, end: Point) -> GrowthRequest {
        GrowthRequest {
            start,
            end,
            departure_normal: None,
        }
    }

    #[test]
    fn departure_prefers_outward_target() {
        let target = Point::new(0.6, 0.8);
        let normal = Point::new(0.0, 1.0);
        assert_eq!(departure_direction(target, normal, 0, 3), target);
    }

    #[test]
    fn departure_starts_along_normal_and_stays_outward() {
        let target = Point::new(0.0, -1.0);
        let normal = Point::new(0.0, 1.0);
        assert_eq!(departure_direction(target, normal, 0, 3), normal);
        for step in 0..3 {
            let d = departure_direction(target, normal, step, 3);
            assert!(d.dot(normal) >= -1e-9, "шаг {step}: {d:?}");
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn open_field_river_reaches_its_end() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let boundary = square(200.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 4.0);
        let end = Point::new(200.0, 100.0);

        let grown = grow_river(&mut rng, &obstacles, &[], &request(Point::new(100.0, 100.0), end), &params())
            .expect("река должна дойти");

        assert_eq!(grown.termination, Termination::ReachedBoundary);
        assert_eq!(grown.points.last().copied(), Some(end));
        for s in grown.points.windows(2) {
            assert!(s[0].distance(s[1]) <= 8.0 + 1e-9);
        }
    }

    #[test]
    fn river_walks_around_a_milepost() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let boundary = square(200.0);
        let milepost = Point::new(140.0, 100.0);
        let obstacles = Obstacles::new(&boundary, &[], &[milepost], 4.0);
        let end = Point::new(200.0, 100.0);

        let grown = grow_river(&mut rng, &obstacles, &[], &request(Point::new(100.0, 100.0), end), &params())
            .expect("обход должен найтись");

        assert!(grown.points.iter().skip(1).all(|p| p.distance(milepost) >= 4.0));
        assert!(grown.points.last().is_some_and(|p| p.distance(end) <= 0.5));
    }

    #[test]
    fn river_stops_where_it_meets_another_river() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let boundary = square(200.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 4.0);
        let existing = River {
            id: 0,
            points: vec![Point::new(150.0, 10.0), Point::new(150.0, 190.0)],
            source: RiverSource::Interior,
            termination: Termination::ReachedBoundary,
        };

        let grown = grow_river(
            &mut rng,
            &obstacles,
            std::slice::from_ref(&existing),
            &request(Point::new(100.0, 100.0), Point::new(200.0, 100.0)),
            &params(),
        )
        .expect("река должна влиться");

        assert_eq!(grown.termination, Termination::JoinedRiver { river: 0 });
        let last = grown.points.last().copied().unwrap_or_default();
        assert!(points_coincide(last, Point::new(150.0, 100.0), 1e-6));
    }

    #[test]
    fn lake_source_leaves_along_the_normal() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let boundary = square(200.0);
        let lake = Lake {
            id: 0,
            outline: vec![
                Point::new(80.0, 80.0),
                Point::new(100.0, 80.0),
                Point::new(120.0, 80.0),
                Point::new(120.0, 100.0),
                Point::new(120.0, 120.0),
                Point::new(100.0, 120.0),
                Point::new(80.0, 120.0),
                Point::new(80.0, 100.0),
                Point::new(80.0, 80.0),
            ],
        };
        let lakes = [lake];
        let obstacles = Obstacles::new(&boundary, &lakes, &[], 4.0);
        let normal = Point::new(0.0, 1.0);
        let req = GrowthRequest {
            start: Point::new(100.0, 120.0),
            end: Point::new(200.0, 100.0),
            departure_normal: Some(normal),
        };

        let grown = grow_river(&mut rng, &obstacles, &[], &req, &params()).expect("река должна дойти");

        for s in grown.points.windows(2).take(3) {
            assert!((s[1] - s[0]).dot(normal) >= -1e-9, "{s:?}");
        }
        assert!(obstacles.path_is_valid(&grown.points, true));
    }

    #[test]
    fn exhausted_iterations_abandon_the_river() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let boundary = square(200.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 4.0);
        let mut short = params();
        short.max_iterations = 3;

        let grown = grow_river(
            &mut rng,
            &obstacles,
            &[],
            &request(Point::new(20.0, 100.0), Point::new(200.0, 100.0)),
            &short,
        );
        assert!(grown.is_none());
    }

    #[test]
    fn diversion_falls_back_to_the_far_endpoint() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let diversion = PerpendicularDiversion {
            length: 20.0,
            attempts: 5,
        };
        let picked = diversion.divert(
            &mut rng,
            Point::new(10.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(10.0, -3.0),
            |_| false,
            |_| true,
        );
        assert_eq!(picked, Some(Point::new(10.0, 10.0)));

        let refused = diversion.divert(
            &mut rng,
            Point::new(10.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(10.0, -3.0),
            |_| false,
            |_| false,
        );
        assert!(refused.is_none());
    }
}
