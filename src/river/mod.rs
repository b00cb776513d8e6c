// src/river/mod.rs
//! Реки
//!
//! Каждая река выбирает исток (вершину озера или внутреннюю точку) и устье на
//! границе, растёт по шагам с обходом препятствий и проходит постобработку.
//! Река, которой не хватило попыток, пропускается.
//!
//! - [`obstacles`]: буферы майлпостов, озёра, граница
//! - [`growth`]: пошаговый рост
//! - [`shaping`]: срезка углов, меандр, сглаживание

pub mod growth;
pub mod obstacles;
pub mod shaping;

use crate::config::BoardConfig;
use crate::geometry::{
    BoundingBox, Point, min_distance_to_polyline, outward_normal, polygon_centroid,
    unique_vertices,
};
use crate::lakes::Lake;
use growth::{GrowthRequest, grow_river};
use obstacles::Obstacles;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Допуск поиска ребра озера под вершиной-истоком
const SHORE_TOLERANCE: f64 = 3.0;

/// Откуда начинается река
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverSource {
    Lake { lake: usize },
    Interior,
}

/// Чем закончилась река
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Дошла до выбранной точки границы
    ReachedBoundary,
    /// Влилась в ранее построенную реку
    JoinedRiver { river: usize },
    /// Пересекла границу раньше своего устья
    HitBoundary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub id: usize,
    pub points: Vec<Point>,
    pub source: RiverSource,
    pub termination: Termination,
}

impl River {
    #[must_use]
    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RiverParams {
    pub count: usize,
    pub segment_length: f64,
    pub buffer_radius: f64,
    pub perpendicular_length: f64,
    pub diversion_attempts: usize,
    pub max_iterations: usize,
    pub max_attempts: usize,
    pub interior_candidates: usize,
    /// Минимальное расстояние внутреннего истока до границы
    pub boundary_clearance: f64,
    pub arrival_epsilon: f64,
    pub boundary_exclusion: f64,
    pub departure_steps: usize,
    pub sharp_angle_threshold: f64,
    pub meander_intensity: f64,
    pub meander_frequency: f64,
    pub smoothness: f64,
}

impl RiverParams {
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        let r = &config.rivers;
        Self {
            count: r.count,
            segment_length: r.segment_length,
            buffer_radius: r.milepost_buffer_radius,
            perpendicular_length: r.perpendicular_length,
            diversion_attempts: r.diversion_attempts,
            max_iterations: r.max_iterations,
            max_attempts: r.max_attempts,
            interior_candidates: r.interior_candidates,
            boundary_clearance: config.river_boundary_clearance(),
            arrival_epsilon: r.arrival_epsilon,
            boundary_exclusion: r.boundary_exclusion,
            departure_steps: r.departure_steps,
            sharp_angle_threshold: r.sharp_angle_threshold,
            meander_intensity: r.meander_intensity,
            meander_frequency: r.meander_frequency,
            smoothness: r.smoothness,
        }
    }
}

/// Выбранный исток
#[derive(Debug, Clone, Copy)]
struct Source {
    point: Point,
    kind: RiverSource,
    /// Внешняя нормаль берега для истока на озере
    normal: Option<Point>,
}

fn lake_source<R: Rng + ?Sized>(rng: &mut R, lake: &Lake) -> Option<Source> {
    let &vertex = unique_vertices(&lake.outline).choose(rng)?;
    let normal = outward_normal(&lake.outline, vertex, SHORE_TOLERANCE).or_else(|| {
        let center = polygon_centroid(&lake.outline)?;
        (vertex - center).normalized()
    })?;
    Some(Source {
        point: vertex,
        kind: RiverSource::Lake { lake: lake.id },
        normal: Some(normal),
    })
}

fn interior_source<R: Rng + ?Sized>(
    rng: &mut R,
    obstacles: &Obstacles<'_>,
    params: &RiverParams,
) -> Option<Source> {
    let bounds = BoundingBox::from_points(obstacles.boundary)?;
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }

    (0..params.interior_candidates)
        .map(|_| {
            Point::new(
                rng.gen_range(bounds.min_x..bounds.max_x),
                rng.gen_range(bounds.min_y..bounds.max_y),
            )
        })
        .find(|&p| {
            obstacles.inside_boundary(p)
                && obstacles.point_is_clear(p)
                && min_distance_to_polyline(p, obstacles.boundary) >= params.boundary_clearance
        })
        .map(|point| Source {
            point,
            kind: RiverSource::Interior,
            normal: None,
        })
}

/// Исток реки номер `index`
///
/// Первые реки берут по озеру на каждую; остальные пробуют внутреннюю точку,
/// а при неудаче вершину случайного озера.
fn choose_source<R: Rng + ?Sized>(
    rng: &mut R,
    index: usize,
    obstacles: &Obstacles<'_>,
    params: &RiverParams,
) -> Option<Source> {
    if let Some(lake) = obstacles.lakes.get(index) {
        return lake_source(rng, lake);
    }
    if let Some(source) = interior_source(rng, obstacles, params) {
        return Some(source);
    }
    let lake = obstacles.lakes.choose(rng)?;
    lake_source(rng, lake)
}

/// Устье: вершина границы вне буферов майлпостов, для озёрного истока
/// ещё и в полуплоскости по внешнюю сторону берега
fn choose_end<R: Rng + ?Sized>(
    rng: &mut R,
    obstacles: &Obstacles<'_>,
    source: &Source,
) -> Option<Point> {
    let candidates: Vec<Point> = unique_vertices(obstacles.boundary)
        .iter()
        .copied()
        .filter(|&v| !obstacles.circles.blocks_point(v))
        .filter(|&v| source.normal.is_none_or(|n| (v - source.point).dot(n) >= 0.0))
        .collect();
    candidates.choose(rng).copied()
}

/// Строит до `params.count` рек
pub fn generate_rivers<R: Rng + ?Sized>(
    rng: &mut R,
    boundary: &[Point],
    lakes: &[Lake],
    milepost_points: &[Point],
    params: &RiverParams,
) -> Vec<River> {
    let obstacles = Obstacles::new(boundary, lakes, milepost_points, params.buffer_radius);
    let mut rivers: Vec<River> = Vec::with_capacity(params.count);

    for index in 0..params.count {
        let mut grown = None;

        for attempt in 0..params.max_attempts {
            let Some(source) = choose_source(rng, index, &obstacles, params) else {
                tracing::debug!(river = index, attempt, "исток не найден");
                continue;
            };
            let Some(end) = choose_end(rng, &obstacles, &source) else {
                tracing::debug!(river = index, attempt, "нет допустимого устья");
                continue;
            };

            let request = GrowthRequest {
                start: source.point,
                end,
                departure_normal: source.normal,
            };
            if let Some(river) = grow_river(rng, &obstacles, &rivers, &request, params) {
                grown = Some((source, river));
                break;
            }
        }

        let Some((source, river)) = grown else {
            tracing::warn!(
                river = index,
                attempts = params.max_attempts,
                "не удалось провести реку, пропускаем"
            );
            continue;
        };

        let from_lake = matches!(source.kind, RiverSource::Lake { .. });
        let points = shaping::shape_river(river.points, &obstacles, &rivers, from_lake, params);
        tracing::debug!(
            river = rivers.len(),
            points = points.len(),
            source = ?source.kind,
            termination = ?river.termination,
            "река построена"
        );
        rivers.push(River {
            id: rivers.len(),
            points,
            source: source.kind,
            termination: river.termination,
        });
    }

    rivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{points_coincide, polylines_intersect};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn polygon(n: usize, center: Point, radius: f64) -> Vec<Point> {
        let mut points: Vec<Point> = (0..n)
            .map(|i| {
                let theta = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
            })
            .collect();
        points.push(points[0]);
        points
    }

    fn params(count: usize) -> RiverParams {
        let mut config = BoardConfig::default();
        config.rivers.count = count;
        RiverParams::from_config(&config)
    }

    #[test]
    fn lake_source_sits_on_the_shore() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let lake = Lake {
            id: 4,
            outline: polygon(16, Point::new(300.0, 300.0), 40.0),
        };
        let source = lake_source(&mut rng, &lake).expect("у озера есть вершины");

        assert_eq!(source.kind, RiverSource::Lake { lake: 4 });
        assert!(lake.outline.iter().any(|&v| points_coincide(v, source.point, 1e-9)));
        let normal = source.normal.unwrap_or_default();
        assert!((source.point - Point::new(300.0, 300.0)).dot(normal) > 0.0);
    }

    #[test]
    fn end_lies_on_the_far_side_of_the_shore() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let boundary = polygon(60, Point::new(500.0, 500.0), 450.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 4.0);
        let source = Source {
            point: Point::new(600.0, 500.0),
            kind: RiverSource::Lake { lake: 0 },
            normal: Some(Point::new(1.0, 0.0)),
        };

        for _ in 0..20 {
            let end = choose_end(&mut rng, &obstacles, &source).expect("устье есть");
            assert!(end.x >= 600.0);
            assert!(boundary.contains(&end));
        }
    }

    #[test]
    fn interior_sources_keep_clear_of_the_boundary() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let boundary = polygon(60, Point::new(500.0, 500.0), 400.0);
        let obstacles = Obstacles::new(&boundary, &[], &[], 4.0);
        let p = params(1);

        for _ in 0..10 {
            let source = interior_source(&mut rng, &obstacles, &p).expect("места достаточно");
            assert_eq!(source.kind, RiverSource::Interior);
            assert!(min_distance_to_polyline(source.point, &boundary) >= p.boundary_clearance);
        }
    }

    #[test]
    fn rivers_without_lakes_reach_the_boundary_or_a_crossing() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let boundary = polygon(80, Point::new(600.0, 600.0), 500.0);
        let rivers = generate_rivers(&mut rng, &boundary, &[], &[], &params(5));

        assert!(!rivers.is_empty());
        for river in &rivers {
            assert_eq!(river.source, RiverSource::Interior);
            let end = river.end().unwrap_or_default();
            match river.termination {
                Termination::ReachedBoundary | Termination::HitBoundary => {
                    assert!(min_distance_to_polyline(end, &boundary) <= 0.5 + 1e-6);
                }
                Termination::JoinedRiver { river: other } => {
                    assert!(other < river.id);
                    let target = &rivers[other].points;
                    assert!(min_distance_to_polyline(end, target) < 1.0);
                }
            }
        }
    }

    #[test]
    fn lake_rivers_never_cross_other_lakes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let boundary = polygon(80, Point::new(600.0, 600.0), 550.0);
        let lakes = vec![
            Lake {
                id: 0,
                outline: polygon(24, Point::new(450.0, 600.0), 60.0),
            },
            Lake {
                id: 1,
                outline: polygon(24, Point::new(750.0, 600.0), 60.0),
            },
        ];
        let rivers = generate_rivers(&mut rng, &boundary, &lakes, &[], &params(3));
        let obstacles = Obstacles::new(&boundary, &lakes, &[], 4.0);

        for river in &rivers {
            let from_lake = matches!(river.source, RiverSource::Lake { .. });
            assert!(obstacles.path_is_valid(&river.points, from_lake));
            if let RiverSource::Lake { lake } = river.source {
                let other = &lakes[1 - lake];
                assert!(!polylines_intersect(&river.points, &other.outline, false));
            }
        }
    }
}
