//! Fixed grid adjacency for a 4x4 city
//!
//! Cells are numbered row-major, `position = row * GRID_SIZE + col`, and a set
//! of cells is a `u16` bitmask with bit `position` set for each member.

use crate::{GRID_SIZE, NUM_CELLS};

mod static_masks {
    use crate::{GRID_SIZE, NUM_CELLS};

    pub const fn neighbour_mask(position: usize) -> u16 {
        let row = position / GRID_SIZE;
        let col = position % GRID_SIZE;
        let mut mask = 0;
        if row > 0 {
            mask |= 1u16 << (position - GRID_SIZE);
        }
        if row < GRID_SIZE - 1 {
            mask |= 1u16 << (position + GRID_SIZE);
        }
        if col > 0 {
            mask |= 1u16 << (position - 1);
        }
        if col < GRID_SIZE - 1 {
            mask |= 1u16 << (position + 1);
        }
        mask
    }

    pub const fn neighbour_masks() -> [u16; NUM_CELLS] {
        let mut masks = [0; NUM_CELLS];
        let mut position = 0;
        while position < NUM_CELLS {
            masks[position] = neighbour_mask(position);
            position += 1;
        }
        masks
    }
}

const NEIGHBOURS: [u16; NUM_CELLS] = static_masks::neighbour_masks();

/// Anything that can report which cells border a given cell
pub trait Adjacency {
    /// Bitmask of the cells sharing an edge with `position`
    fn adjacent(&self, position: usize) -> u16;
}

/// The undirected neighbour graph over the 16 cells of a city
///
/// The topology never changes so the graph carries no data; every query is a
/// lookup into a table built at compile time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct AdjacencyGraph;

impl AdjacencyGraph {
    pub fn new() -> Self {
        AdjacencyGraph
    }

    pub fn node_count(&self) -> usize {
        NUM_CELLS
    }

    /// Every edge once, as `(position, position below or to the right)`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..NUM_CELLS).flat_map(|position| {
            let down = (position + GRID_SIZE < NUM_CELLS).then(|| (position, position + GRID_SIZE));
            let right = (position % GRID_SIZE < GRID_SIZE - 1).then(|| (position, position + 1));
            down.into_iter().chain(right)
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Positions of the cells sharing an edge with `position`, in ascending order
    pub fn neighbours(&self, position: usize) -> impl Iterator<Item = usize> {
        positions(NEIGHBOURS[position])
    }
}

impl Adjacency for AdjacencyGraph {
    fn adjacent(&self, position: usize) -> u16 {
        NEIGHBOURS[position]
    }
}

pub fn position(row: usize, col: usize) -> usize {
    row * GRID_SIZE + col
}

pub fn row_col(position: usize) -> (usize, usize) {
    (position / GRID_SIZE, position % GRID_SIZE)
}

/// Iterates the positions set in a cell mask, lowest first
pub fn positions(mut mask: u16) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let position = mask.trailing_zeros() as usize;
        // clear the lowest set bit
        mask &= mask - 1;
        Some(position)
    })
}
