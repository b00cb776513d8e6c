// src/board.rs
//! Сборка доски
//!
//! Стадии идут строго по порядку, каждая видит только результаты предыдущих:
//! граница → озёра → города → майлпосты → реки. Готовая [`Board`] неизменяема;
//! новая игра генерирует новую доску.

use crate::boundary::{BoundaryParams, generate_boundary};
use crate::city::{City, CityParams, CitySize, place_cities};
use crate::config::BoardConfig;
use crate::geometry::{COORD_TOLERANCE, Point, points_coincide};
use crate::grid::{GridCell, HexGrid};
use crate::lakes::{Lake, LakeParams, generate_lakes};
use crate::milepost::{GridLayout, Milepost, MilepostId, build_mileposts};
use crate::river::{River, RiverParams, generate_rivers};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Сколько объектов запрошено и сколько поставлено
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub requested: usize,
    pub placed: usize,
}

impl Placement {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.placed >= self.requested
    }
}

/// Сводка генерации
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub lakes: Placement,
    pub major_cities: Placement,
    pub medium_cities: Placement,
    pub small_cities: Placement,
    pub rivers: Placement,
    pub mileposts: usize,
    pub mountains: usize,
}

impl GenerationReport {
    fn collect(
        config: &BoardConfig,
        lakes: &[Lake],
        cities: &[City],
        mileposts: &[Milepost],
        rivers: &[River],
    ) -> Self {
        let cities_of = |size| cities.iter().filter(|c| c.size == size).count();
        Self {
            lakes: Placement {
                requested: config.lakes.count,
                placed: lakes.len(),
            },
            major_cities: Placement {
                requested: config.cities.major_count,
                placed: cities_of(CitySize::Major),
            },
            medium_cities: Placement {
                requested: config.medium_count(),
                placed: cities_of(CitySize::Medium),
            },
            small_cities: Placement {
                requested: config.small_count(),
                placed: cities_of(CitySize::Small),
            },
            rivers: Placement {
                requested: config.rivers.count,
                placed: rivers.len(),
            },
            mileposts: mileposts.len(),
            mountains: mileposts.iter().filter(|m| m.is_mountain).count(),
        }
    }
}

/// Готовая доска: снимок только для чтения
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BoardData")]
pub struct Board {
    pub config: BoardConfig,
    pub boundary: Vec<Point>,
    pub lakes: Vec<Lake>,
    pub cities: Vec<City>,
    /// Арена майлпостов: `mileposts[id].id == id`
    pub mileposts: Vec<Milepost>,
    pub rivers: Vec<River>,
    report: GenerationReport,
    #[serde(skip)]
    by_cell: HashMap<GridCell, MilepostId>,
}

/// Сериализуемая часть доски; индекс по ячейкам восстанавливается при чтении
#[derive(Deserialize)]
struct BoardData {
    config: BoardConfig,
    boundary: Vec<Point>,
    lakes: Vec<Lake>,
    cities: Vec<City>,
    mileposts: Vec<Milepost>,
    rivers: Vec<River>,
    #[serde(default)]
    report: GenerationReport,
}

impl From<BoardData> for Board {
    fn from(data: BoardData) -> Self {
        let by_cell = index_cells(&data.mileposts);
        Self {
            config: data.config,
            boundary: data.boundary,
            lakes: data.lakes,
            cities: data.cities,
            mileposts: data.mileposts,
            rivers: data.rivers,
            report: data.report,
            by_cell,
        }
    }
}

fn index_cells(mileposts: &[Milepost]) -> HashMap<GridCell, MilepostId> {
    mileposts.iter().map(|m| (m.cell, m.id)).collect()
}

impl Board {
    #[must_use]
    pub fn grid(&self) -> HexGrid {
        HexGrid::new(self.config.vertical_spacing, self.config.horizontal_spacing)
    }

    #[must_use]
    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    #[must_use]
    pub fn milepost(&self, id: MilepostId) -> Option<&Milepost> {
        self.mileposts.get(id)
    }

    #[must_use]
    pub fn milepost_at_cell(&self, cell: GridCell) -> Option<&Milepost> {
        self.by_cell.get(&cell).and_then(|&id| self.mileposts.get(id))
    }

    /// Майлпост в данной координате (с допуском [`COORD_TOLERANCE`])
    #[must_use]
    pub fn milepost_at(&self, p: Point) -> Option<&Milepost> {
        let grid = self.grid();
        if !grid.is_valid() {
            return None;
        }
        self.milepost_at_cell(grid.snap(p))
            .filter(|m| points_coincide(m.point, p, COORD_TOLERANCE))
    }

    #[must_use]
    pub fn city_of(&self, milepost: &Milepost) -> Option<&City> {
        milepost.city.and_then(|id| self.cities.get(id))
    }
}

/// Генерирует доску с сидом из конфигурации (или со случайным, если его нет)
#[must_use]
pub fn generate_board(config: &BoardConfig) -> Board {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    generate_board_with_rng(config, &mut rng)
}

/// Генерирует доску на переданном источнике случайности
pub fn generate_board_with_rng<R: Rng + ?Sized>(config: &BoardConfig, rng: &mut R) -> Board {
    let grid = HexGrid::new(config.vertical_spacing, config.horizontal_spacing);

    let boundary = generate_boundary(rng, &BoundaryParams::from_config(config));
    let lakes = generate_lakes(rng, &boundary, &LakeParams::from_config(config));
    let cities = place_cities(rng, &boundary, &lakes, grid, &CityParams::from_config(config));

    let layout = GridLayout {
        boundary: &boundary,
        lakes: &lakes,
        cities: &cities,
        grid,
        width: config.width,
        height: config.height,
        mountain_density: config.mountain_density,
    };
    let mileposts = build_mileposts(rng, &layout);

    let milepost_points: Vec<Point> = mileposts.iter().map(|m| m.point).collect();
    let rivers = generate_rivers(
        rng,
        &boundary,
        &lakes,
        &milepost_points,
        &RiverParams::from_config(config),
    );

    let report = GenerationReport::collect(config, &lakes, &cities, &mileposts, &rivers);
    tracing::info!(
        lakes = report.lakes.placed,
        lakes_requested = report.lakes.requested,
        cities = cities.len(),
        mileposts = report.mileposts,
        mountains = report.mountains,
        rivers = report.rivers.placed,
        rivers_requested = report.rivers.requested,
        "доска сгенерирована"
    );

    Board {
        config: config.clone(),
        by_cell: index_cells(&mileposts),
        boundary,
        lakes,
        cities,
        mileposts,
        rivers,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> BoardConfig {
        let mut config = BoardConfig {
            seed: Some(seed),
            width: 800.0,
            height: 600.0,
            ..BoardConfig::default()
        };
        config.lakes.count = 2;
        config.rivers.count = 3;
        config.cities.major_count = 1;
        config
    }

    #[test]
    fn same_seed_gives_same_board() {
        let a = generate_board(&small_config(11));
        let b = generate_board(&small_config(11));
        assert_eq!(a.boundary, b.boundary);
        assert_eq!(a.lakes, b.lakes);
        assert_eq!(a.cities, b.cities);
        assert_eq!(a.mileposts, b.mileposts);
        assert_eq!(a.rivers, b.rivers);
    }

    #[test]
    fn lookups_agree_with_the_arena() {
        let board = generate_board(&small_config(12));
        assert!(!board.mileposts.is_empty());

        for m in &board.mileposts {
            assert_eq!(board.milepost(m.id).map(|x| x.cell), Some(m.cell));
            assert_eq!(board.milepost_at_cell(m.cell).map(|x| x.id), Some(m.id));
            assert_eq!(board.milepost_at(m.point).map(|x| x.id), Some(m.id));
            if let Some(city) = board.city_of(m) {
                assert!(city.occupies(m.cell));
            }
        }
        assert!(board.milepost_at(Point::new(-100.0, -100.0)).is_none());
    }

    #[test]
    fn json_round_trip_rebuilds_the_index() {
        let board = generate_board(&small_config(13));
        let json = serde_json::to_string(&board).expect("сериализация");
        let restored: Board = serde_json::from_str(&json).expect("десериализация");

        assert_eq!(restored.report(), board.report());
        let m = &board.mileposts[board.mileposts.len() / 2];
        assert_eq!(restored.milepost_at_cell(m.cell).map(|x| x.id), Some(m.id));
    }

    #[test]
    fn report_counts_match_the_board() {
        let board = generate_board(&small_config(14));
        let report = board.report();
        assert_eq!(report.lakes.placed, board.lakes.len());
        assert_eq!(report.rivers.placed, board.rivers.len());
        assert_eq!(report.mileposts, board.mileposts.len());
        assert!(report.lakes.placed <= report.lakes.requested);
    }
}
