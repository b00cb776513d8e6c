// src/grid.rs
//! Гексагональная сетка со смещёнными рядами
//!
//! Ряды идут с шагом `vertical_spacing`, нечётные ряды сдвинуты на половину
//! `horizontal_spacing`. Соседи ячейки: шесть позиций: `(0, ±2v)` и `(±h/2, ±v)`.
//! Ячейки сравниваются по целочисленному ключу [`GridCell`], а не по координатам.

use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Целочисленный ключ ячейки сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

impl GridCell {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Смещения шести соседей для чётного ряда: (ряд, столбец)
const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] = [(-2, 0), (2, 0), (-1, -1), (-1, 0), (1, -1), (1, 0)];
/// Для нечётного ряда диагональные соседи смещены на столбец вправо
const ODD_ROW_NEIGHBORS: [(i32, i32); 6] = [(-2, 0), (2, 0), (-1, 0), (-1, 1), (1, 0), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexGrid {
    pub vertical_spacing: f64,
    pub horizontal_spacing: f64,
}

impl HexGrid {
    #[must_use]
    pub const fn new(vertical_spacing: f64, horizontal_spacing: f64) -> Self {
        Self {
            vertical_spacing,
            horizontal_spacing,
        }
    }

    /// Сетка пригодна, только если оба шага положительны
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertical_spacing > 0.0 && self.horizontal_spacing > 0.0
    }

    fn row_offset(&self, row: i32) -> f64 {
        if row.rem_euclid(2) == 1 {
            self.horizontal_spacing / 2.0
        } else {
            0.0
        }
    }

    /// Координата центра ячейки
    #[must_use]
    pub fn point(&self, cell: GridCell) -> Point {
        let h = self.horizontal_spacing;
        let v = self.vertical_spacing;
        Point::new(
            f64::from(cell.col) * h + h / 2.0 + self.row_offset(cell.row),
            f64::from(cell.row) * v + v / 2.0,
        )
    }

    /// Ближайшая допустимая ячейка к произвольной точке
    #[must_use]
    pub fn snap(&self, p: Point) -> GridCell {
        let h = self.horizontal_spacing;
        let v = self.vertical_spacing;
        let approx_row = ((p.y - v / 2.0) / v).round() as i32;

        // Соседние ряды тоже проверяем: в смещённой сетке ближайшая ячейка
        // может оказаться в соседнем ряду
        (approx_row - 1..=approx_row + 1)
            .map(|row| {
                let col = ((p.x - h / 2.0 - self.row_offset(row)) / h).round() as i32;
                GridCell::new(row, col)
            })
            .min_by(|a, b| {
                self.point(*a)
                    .distance(p)
                    .total_cmp(&self.point(*b).distance(p))
            })
            .unwrap_or(GridCell::new(approx_row, 0))
    }

    /// Ячейки прямоугольника `[0, width] × [0, height]` по рядам, без выделения памяти
    fn iter_cells(self, width: f64, height: f64) -> impl Iterator<Item = GridCell> {
        let (rows, cols) = if self.is_valid() && width > 0.0 && height > 0.0 {
            (
                (height / self.vertical_spacing).floor() as i32,
                (width / self.horizontal_spacing).floor() as i32,
            )
        } else {
            (-1, -1)
        };

        (0..=rows)
            .flat_map(move |row| (0..=cols).map(move |col| GridCell::new(row, col)))
            .filter(move |&cell| {
                let p = self.point(cell);
                p.x <= width && p.y <= height
            })
    }

    /// Все ячейки, центры которых лежат в прямоугольнике `[0, width] × [0, height]`
    #[must_use]
    pub fn cells_in(&self, width: f64, height: f64) -> Vec<GridCell> {
        self.iter_cells(width, height).collect()
    }

    /// Ячейки, центры которых попадают в заданный прямоугольник
    #[must_use]
    pub fn cells_within(&self, bounds: &BoundingBox) -> Vec<GridCell> {
        self.cells_in(bounds.max_x, bounds.max_y)
            .into_iter()
            .filter(|&c| {
                let p = self.point(c);
                p.x >= bounds.min_x && p.y >= bounds.min_y
            })
            .collect()
    }

    /// Шесть соседей ячейки
    #[must_use]
    pub fn neighbors(&self, cell: GridCell) -> [GridCell; 6] {
        let offsets = if cell.row.rem_euclid(2) == 1 {
            ODD_ROW_NEIGHBORS
        } else {
            EVEN_ROW_NEIGHBORS
        };
        offsets.map(|(dr, dc)| GridCell::new(cell.row + dr, cell.col + dc))
    }

    /// Гексагональный кластер крупного города: центр и кольцо из шести позиций,
    /// каждая привязана к ближайшей ячейке сетки
    #[must_use]
    pub fn hex_cluster(&self, center: GridCell) -> [GridCell; 7] {
        let c = self.point(center);
        let h = self.horizontal_spacing;
        let v = self.vertical_spacing;
        let ring = [
            Point::new(0.0, -2.0 * v),
            Point::new(0.0, 2.0 * v),
            Point::new(-h / 2.0, -v),
            Point::new(h / 2.0, -v),
            Point::new(-h / 2.0, v),
            Point::new(h / 2.0, v),
        ];
        let mut cluster = [center; 7];
        for (slot, offset) in cluster.iter_mut().skip(1).zip(ring) {
            *slot = self.snap(c + offset);
        }
        cluster
    }
}
