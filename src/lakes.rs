// src/lakes.rs
//! Размещение озёр
//!
//! Выборка с отклонением: случайный центр и радиус, шумный контур, проверка всех
//! ограничений. Озеро, не уложившееся в лимит попыток, пропускается: меньше озёр,
//! чем запрошено, допустимо.

use crate::config::BoardConfig;
use crate::geometry::{
    BoundingBox, Point, min_distance_between_polylines, min_distance_to_polyline,
    point_in_polygon, polylines_intersect,
};
use crate::noise::noisy_loop;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Озеро: замкнутый контур внутри границы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lake {
    pub id: usize,
    pub outline: Vec<Point>,
}

impl Lake {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, &self.outline)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LakeParams {
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    pub num_points: usize,
    pub noise_scale: f64,
    pub buffer_distance: f64,
    pub min_lake_distance: f64,
    pub max_attempts: usize,
}

impl LakeParams {
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            count: config.lakes.count,
            min_radius: config.lakes.min_radius,
            max_radius: config.lakes.max_radius,
            num_points: config.lakes.num_points,
            noise_scale: config.lakes.noise_scale,
            buffer_distance: config.buffer_distance(),
            min_lake_distance: config.lakes.min_lake_distance,
            max_attempts: config.lakes.max_attempts,
        }
    }
}

/// Проверяет контур-кандидат относительно границы и уже принятых озёр
///
/// Каждая точка должна быть внутри границы и не ближе `buffer_distance` к её рёбрам;
/// с каждым принятым озером: ни пересечений, ни вложенности, ни сближения
/// меньше `min_lake_distance`.
#[must_use]
pub fn is_valid_lake(
    candidate: &[Point],
    boundary: &[Point],
    accepted: &[Lake],
    params: &LakeParams,
) -> bool {
    if candidate.len() < 4 {
        return false;
    }

    let inside_with_buffer = candidate.iter().all(|&p| {
        point_in_polygon(p, boundary)
            && min_distance_to_polyline(p, boundary) >= params.buffer_distance
    });
    if !inside_with_buffer {
        return false;
    }

    accepted.iter().all(|lake| {
        !polylines_intersect(candidate, &lake.outline, false)
            && !candidate.iter().any(|&p| lake.contains(p))
            && !lake.outline.iter().any(|&p| point_in_polygon(p, candidate))
            && min_distance_between_polylines(candidate, &lake.outline) >= params.min_lake_distance
    })
}

fn sample_radius<R: Rng + ?Sized>(rng: &mut R, params: &LakeParams) -> f64 {
    if params.max_radius > params.min_radius {
        rng.gen_range(params.min_radius..params.max_radius)
    } else {
        params.min_radius
    }
}

/// Размещает до `params.count` озёр внутри границы
pub fn generate_lakes<R: Rng + ?Sized>(
    rng: &mut R,
    boundary: &[Point],
    params: &LakeParams,
) -> Vec<Lake> {
    let mut lakes: Vec<Lake> = Vec::with_capacity(params.count);

    let Some(area) =
        BoundingBox::from_points(boundary).and_then(|b| b.shrink(params.buffer_distance))
    else {
        if params.count > 0 {
            tracing::warn!("граница слишком мала для озёр");
        }
        return lakes;
    };

    for requested in 0..params.count {
        let mut placed = false;

        for attempt in 0..params.max_attempts {
            let center = Point::new(
                rng.gen_range(area.min_x..area.max_x),
                rng.gen_range(area.min_y..area.max_y),
            );
            let radius = sample_radius(rng, params);
            let outline = noisy_loop(rng, center, radius, params.noise_scale, params.num_points);

            if is_valid_lake(&outline, boundary, &lakes, params) {
                tracing::debug!(lake = lakes.len(), attempt, radius, "озеро размещено");
                lakes.push(Lake {
                    id: lakes.len(),
                    outline,
                });
                placed = true;
                break;
            }
        }

        if !placed {
            tracing::warn!(
                lake = requested,
                attempts = params.max_attempts,
                "не удалось разместить озеро, пропускаем"
            );
        }
    }

    lakes
}
