// src/city/placement.rs
//! Размещение городов
//!
//! Все ячейки сетки внутри границы перемешиваются один раз и расходуются по порядку,
//! без возврата, сначала на крупные города, затем на средние и малые. Ячейка годится,
//! если она внутри границы, вне озёр и не ближе `min_spacing` к любому якорю уже
//! поставленного города. Для крупного города проверяются все семь ячеек кластера.

use super::catalog::{Good, NamePool};
use super::{City, CitySize};
use crate::config::BoardConfig;
use crate::geometry::{BoundingBox, Point, point_in_polygon};
use crate::grid::{GridCell, HexGrid};
use crate::lakes::Lake;
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy)]
pub struct CityParams {
    pub major_count: usize,
    pub medium_count: usize,
    pub small_count: usize,
    /// Минимальное расстояние между якорями разных городов
    pub min_spacing: f64,
}

impl CityParams {
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            major_count: config.cities.major_count,
            medium_count: config.medium_count(),
            small_count: config.small_count(),
            min_spacing: config.city_spacing(),
        }
    }
}

struct CityPlacer<'a> {
    boundary: &'a [Point],
    lakes: &'a [Lake],
    grid: HexGrid,
    min_spacing: f64,
    candidates: Vec<GridCell>,
    cities: Vec<City>,
}

impl CityPlacer<'_> {
    fn anchor_is_valid(&self, cell: GridCell) -> bool {
        let p = self.grid.point(cell);
        point_in_polygon(p, self.boundary)
            && !self.lakes.iter().any(|lake| lake.contains(p))
            && self
                .cities
                .iter()
                .flat_map(|city| city.anchor_points.iter())
                .all(|&other| other.distance(p) >= self.min_spacing)
    }

    fn anchors_for(&self, size: CitySize, center: GridCell) -> Vec<GridCell> {
        match size {
            CitySize::Major => self.grid.hex_cluster(center).to_vec(),
            CitySize::Small | CitySize::Medium => vec![center],
        }
    }

    /// Расходует кандидатов, пока не поставит `count` городов или не кончатся ячейки
    fn place_tier<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        names: &mut NamePool,
        size: CitySize,
        count: usize,
    ) -> usize {
        let mut placed = 0;

        while placed < count {
            let Some(center) = self.candidates.pop() else {
                tracing::warn!(
                    ?size,
                    requested = count,
                    placed,
                    "кандидаты для городов исчерпаны"
                );
                break;
            };

            let anchors = self.anchors_for(size, center);
            if !anchors.iter().all(|&cell| self.anchor_is_valid(cell)) {
                continue;
            }

            let anchor_points = anchors.iter().map(|&c| self.grid.point(c)).collect();
            self.cities.push(City {
                id: self.cities.len(),
                name: names.next_name(),
                size,
                anchors,
                anchor_points,
                goods: Good::draw(rng, size.goods_count()),
            });
            placed += 1;
        }
        placed
    }
}

/// Ставит крупные, средние и малые города
pub fn place_cities<R: Rng + ?Sized>(
    rng: &mut R,
    boundary: &[Point],
    lakes: &[Lake],
    grid: HexGrid,
    params: &CityParams,
) -> Vec<City> {
    let mut candidates: Vec<GridCell> = BoundingBox::from_points(boundary)
        .map(|bounds| grid.cells_within(&bounds))
        .unwrap_or_default()
        .into_iter()
        .filter(|&c| point_in_polygon(grid.point(c), boundary))
        .collect();
    candidates.shuffle(rng);

    let mut names = NamePool::shuffled(rng);
    let mut placer = CityPlacer {
        boundary,
        lakes,
        grid,
        min_spacing: params.min_spacing,
        candidates,
        cities: Vec::new(),
    };

    let tiers = [
        (CitySize::Major, params.major_count),
        (CitySize::Medium, params.medium_count),
        (CitySize::Small, params.small_count),
    ];
    for (size, count) in tiers {
        let placed = placer.place_tier(rng, &mut names, size, count);
        tracing::debug!(?size, requested = count, placed, "ярус городов размещён");
    }

    placer.cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
            Point::new(0.0, 0.0),
        ]
    }

    fn params(major: usize) -> CityParams {
        CityParams {
            major_count: major,
            medium_count: major * 3,
            small_count: major * 3,
            min_spacing: 70.0,
        }
    }

    #[test]
    fn tiers_follow_requested_ratios() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let grid = HexGrid::new(10.0, 35.0);
        let cities = place_cities(&mut rng, &square(1200.0), &[], grid, &params(2));

        let count = |size| cities.iter().filter(|c| c.size == size).count();
        assert_eq!(count(CitySize::Major), 2);
        assert_eq!(count(CitySize::Medium), 6);
        assert_eq!(count(CitySize::Small), 6);

        for city in &cities {
            assert_eq!(city.anchors.len(), city.size.anchor_count());
            assert_eq!(city.goods.len(), city.size.goods_count());
        }
    }

    #[test]
    fn anchors_never_collide() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let grid = HexGrid::new(10.0, 35.0);
        let cities = place_cities(&mut rng, &square(900.0), &[], grid, &params(3));

        let mut seen = HashSet::new();
        for cell in cities.iter().flat_map(|c| c.anchors.iter()) {
            assert!(seen.insert(*cell), "повтор якоря {cell:?}");
        }
    }

    #[test]
    fn cities_avoid_lakes() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let grid = HexGrid::new(10.0, 35.0);
        let lake = Lake {
            id: 0,
            outline: vec![
                Point::new(100.0, 100.0),
                Point::new(500.0, 100.0),
                Point::new(500.0, 500.0),
                Point::new(100.0, 500.0),
                Point::new(100.0, 100.0),
            ],
        };
        let cities = place_cities(&mut rng, &square(600.0), &[lake.clone()], grid, &params(1));
        for p in cities.iter().flat_map(|c| c.anchor_points.iter()) {
            assert!(!lake.contains(*p));
        }
    }

    #[test]
    fn exhausted_candidates_give_fewer_cities() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = HexGrid::new(10.0, 35.0);
        let cities = place_cities(&mut rng, &square(150.0), &[], grid, &params(5));
        assert!(cities.len() < 5 + 15 + 15);
    }
}
