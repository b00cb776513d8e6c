pub mod board;
pub mod boundary;
pub mod city;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod lakes;
pub mod milepost;
pub mod noise;
pub mod preview;
pub mod river;

pub use board::{Board, GenerationReport, Placement, generate_board, generate_board_with_rng};
pub use city::{City, CitySize, Good};
pub use config::BoardConfig;
pub use error::{BoardGenError, Result};
pub use geometry::Point;
pub use grid::{GridCell, HexGrid};
pub use lakes::Lake;
pub use milepost::{Milepost, MilepostId, TrackEdge, build_milepost_graph};
pub use river::{River, RiverSource, Termination};
