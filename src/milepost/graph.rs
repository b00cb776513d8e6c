use crate::board::Board;
use crate::geometry::polylines_intersect;
use petgraph::graph::{NodeIndex, UnGraph};

/// Ребро между соседними майлпостами
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEdge {
    /// Стоимость участка: большая из стоимостей концов
    pub cost: u32,
    /// Участок пересекает реку
    pub crosses_river: bool,
}

/// Граф смежности майлпостов: вес узла `MilepostId`, узел `i` соответствует майлпосту `i`
#[must_use]
pub fn build_milepost_graph(board: &Board) -> UnGraph<usize, TrackEdge> {
    let mut graph = UnGraph::with_capacity(board.mileposts.len(), board.mileposts.len() * 3);
    for milepost in &board.mileposts {
        graph.add_node(milepost.id);
    }

    let grid = board.grid();
    for milepost in &board.mileposts {
        for neighbor_cell in grid.neighbors(milepost.cell) {
            let Some(neighbor) = board.milepost_at_cell(neighbor_cell) else {
                continue;
            };
            // Каждую пару добавляем один раз
            if neighbor.id <= milepost.id {
                continue;
            }

            let segment = [milepost.point, neighbor.point];
            let crosses_river = board
                .rivers
                .iter()
                .any(|river| polylines_intersect(&segment, &river.points, false));

            graph.add_edge(
                NodeIndex::new(milepost.id),
                NodeIndex::new(neighbor.id),
                TrackEdge {
                    cost: milepost.cost.max(neighbor.cost),
                    crosses_river,
                },
            );
        }
    }
    graph
}
