// src/milepost/mod.rs
//! Сетка майлпостов
//!
//! Обычный майлпост ставится в каждую ячейку внутри границы, вне озёр и вне якорей
//! городов; каждый независимо становится горным с вероятностью `mountain_density`.
//! Якоря городов добавляются следом со стоимостью своего города и ссылкой на него.
//! Майлпосты хранятся в одном векторе и адресуются индексом ([`MilepostId`]).

pub mod graph;

use crate::city::City;
use crate::geometry::{Point, point_in_polygon};
use crate::grid::{GridCell, HexGrid};
use crate::lakes::Lake;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use graph::{TrackEdge, build_milepost_graph};

pub type MilepostId = usize;

pub const PLAIN_COST: u32 = 1;
pub const MOUNTAIN_COST: u32 = 2;

/// Ячейка, в которой игроки могут заканчивать участки пути
///
/// Только данные: выделение, подсветка и обработчики живут в слое отрисовки.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milepost {
    pub id: MilepostId,
    pub cell: GridCell,
    pub point: Point,
    pub cost: u32,
    pub is_mountain: bool,
    /// Индекс города, если это якорная ячейка
    pub city: Option<usize>,
}

impl Milepost {
    #[must_use]
    pub fn is_city(&self) -> bool {
        self.city.is_some()
    }
}

/// Всё, что нужно для раскладки сетки
pub struct GridLayout<'a> {
    pub boundary: &'a [Point],
    pub lakes: &'a [Lake],
    pub cities: &'a [City],
    pub grid: HexGrid,
    pub width: f64,
    pub height: f64,
    pub mountain_density: f64,
}

fn is_open_cell(layout: &GridLayout<'_>, anchors: &HashSet<GridCell>, cell: GridCell) -> bool {
    let p = layout.grid.point(cell);
    !anchors.contains(&cell)
        && point_in_polygon(p, layout.boundary)
        && !layout.lakes.iter().any(|lake| lake.contains(p))
}

/// Ячейки под обычные майлпосты, в порядке обхода сетки
fn open_cells(layout: &GridLayout<'_>, anchors: &HashSet<GridCell>) -> Vec<GridCell> {
    let cells = layout.grid.cells_in(layout.width, layout.height);

    #[cfg(feature = "parallel")]
    let iter = cells.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = cells.into_iter();

    iter.filter(|&cell| is_open_cell(layout, anchors, cell))
        .collect()
}

fn mountain_probability(density: f64) -> f64 {
    if (0.0..=1.0).contains(&density) {
        density
    } else if density > 1.0 {
        1.0
    } else {
        0.0
    }
}

/// Строит полный набор майлпостов: обычные, затем якоря городов
pub fn build_mileposts<R: Rng + ?Sized>(rng: &mut R, layout: &GridLayout<'_>) -> Vec<Milepost> {
    let anchors: HashSet<GridCell> = layout
        .cities
        .iter()
        .flat_map(|c| c.anchors.iter().copied())
        .collect();
    let probability = mountain_probability(layout.mountain_density);

    let mut by_cell: BTreeMap<GridCell, Milepost> = BTreeMap::new();
    for cell in open_cells(layout, &anchors) {
        let is_mountain = rng.gen_bool(probability);
        by_cell.insert(
            cell,
            Milepost {
                id: 0,
                cell,
                point: layout.grid.point(cell),
                cost: if is_mountain { MOUNTAIN_COST } else { PLAIN_COST },
                is_mountain,
                city: None,
            },
        );
    }

    // Якорь города перекрывает обычный майлпост в той же ячейке
    for city in layout.cities {
        for (&cell, &point) in city.anchors.iter().zip(&city.anchor_points) {
            by_cell.insert(
                cell,
                Milepost {
                    id: 0,
                    cell,
                    point,
                    cost: city.size.anchor_cost(),
                    is_mountain: false,
                    city: Some(city.id),
                },
            );
        }
    }

    let mileposts: Vec<Milepost> = by_cell
        .into_values()
        .enumerate()
        .map(|(id, m)| Milepost { id, ..m })
        .collect();

    tracing::debug!(
        total = mileposts.len(),
        mountains = mileposts.iter().filter(|m| m.is_mountain).count(),
        city_cells = mileposts.iter().filter(|m| m.is_city()).count(),
        "сетка майлпостов построена"
    );
    mileposts
}
