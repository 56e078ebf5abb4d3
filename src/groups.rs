//! Arbitrary-shape grouping: maximal sets of qualifying cells connected
//! through each other by grid edges

use crate::grid::{positions, Adjacency};
use crate::NUM_CELLS;

/// Union-find over the fixed cell positions, with union by size
#[derive(Copy, Clone, Debug)]
pub struct DisjointSet {
    parent: [u8; NUM_CELLS],
    size: [u8; NUM_CELLS],
}

impl DisjointSet {
    pub fn new() -> Self {
        let mut parent = [0; NUM_CELLS];
        for (position, entry) in parent.iter_mut().enumerate() {
            *entry = position as u8;
        }
        Self {
            parent,
            size: [1; NUM_CELLS],
        }
    }

    /// The representative of the set containing `position`
    pub fn find(&mut self, mut position: usize) -> usize {
        while self.parent[position] as usize != position {
            // path halving
            let grandparent = self.parent[self.parent[position] as usize];
            self.parent[position] = grandparent;
            position = grandparent as usize;
        }
        position
    }

    /// Merges the sets containing `a` and `b`, returning the new representative
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return a;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a as u8;
        self.size[a] += self.size[b];
        a
    }

    /// Size of the set containing `position`
    pub fn set_size(&mut self, position: usize) -> usize {
        let root = self.find(position);
        self.size[root] as usize
    }
}

impl Default for DisjointSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Sizes of the connected groups formed by the cells in `members`
///
/// Two members share a group iff a path of edges joins them through members
/// only. Only the multiset of sizes is meaningful, their order is not.
pub fn connected_group_sizes<A: Adjacency>(members: u16, adjacency: &A) -> Vec<usize> {
    let mut sets = DisjointSet::new();
    for position in positions(members) {
        for neighbour in positions(adjacency.adjacent(position) & members) {
            sets.union(position, neighbour);
        }
    }

    positions(members)
        .filter_map(|position| {
            // report each group once, at its representative
            if sets.find(position) == position {
                Some(sets.set_size(position))
            } else {
                None
            }
        })
        .collect()
}
