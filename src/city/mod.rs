pub mod catalog;
pub mod placement;

use crate::geometry::Point;
use crate::grid::GridCell;
use serde::{Deserialize, Serialize};

pub use catalog::Good;
pub use placement::{CityParams, place_cities};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CitySize {
    Small,
    Medium,
    Major,
}

impl CitySize {
    /// Стоимость прокладки пути в якорную ячейку города
    #[must_use]
    pub fn anchor_cost(self) -> u32 {
        match self {
            CitySize::Major => 5,
            CitySize::Small | CitySize::Medium => 3,
        }
    }

    #[must_use]
    pub fn goods_count(self) -> usize {
        match self {
            CitySize::Small => 1,
            CitySize::Medium => 2,
            CitySize::Major => 3,
        }
    }

    /// Число якорных ячеек: крупный город занимает гексагональный кластер
    #[must_use]
    pub fn anchor_count(self) -> usize {
        match self {
            CitySize::Major => 7,
            CitySize::Small | CitySize::Medium => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: usize,
    pub name: String,
    pub size: CitySize,
    /// Якорные ячейки; первая является центром
    pub anchors: Vec<GridCell>,
    /// Координаты якорей, в том же порядке
    pub anchor_points: Vec<Point>,
    pub goods: Vec<Good>,
}

impl City {
    #[must_use]
    pub fn center(&self) -> Option<Point> {
        self.anchor_points.first().copied()
    }

    #[must_use]
    pub fn occupies(&self, cell: GridCell) -> bool {
        self.anchors.contains(&cell)
    }
}
