//! A completed city and its scoring rules

use anyhow::{anyhow, Result};

use std::fmt;

use crate::grid::{position, positions, Adjacency, AdjacencyGraph};
use crate::groups::connected_group_sizes;
use crate::lines::line_group_sizes;
use crate::tile::Tile;
use crate::{GRID_SIZE, NUM_CELLS};

/// Width of one rendered column, wide enough for the longest tile name
const CELL_WIDTH: usize = 12;

/// Points for a set of `n` offices
const fn triangular(n: u32) -> u32 {
    n * (n + 1) / 2
}

const OFFICE_SET_SIZE: u32 = 6;

fn park_group_score(size: usize) -> u32 {
    match size {
        0 => 0,
        1 => 2,
        2 => 8,
        3 => 12,
        size => size as u32 + 9,
    }
}

fn shop_group_score(size: usize) -> u32 {
    match size {
        0 => 0,
        1 => 2,
        2 => 5,
        3 => 10,
        _ => 16,
    }
}

/// Points per set of `kinds` different taverns
fn tavern_set_score(kinds: usize) -> u32 {
    match kinds {
        0 => 0,
        1 => 1,
        2 => 4,
        3 => 9,
        _ => 17,
    }
}

/// The points a city earns in each category
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ScoreBreakdown {
    pub factories: u32,
    pub houses: u32,
    pub offices: u32,
    pub parks: u32,
    pub shops: u32,
    pub taverns: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.factories + self.houses + self.offices + self.parks + self.shops + self.taverns
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Factories: {:>3}", self.factories)?;
        writeln!(f, "Houses:    {:>3}", self.houses)?;
        writeln!(f, "Offices:   {:>3}", self.offices)?;
        writeln!(f, "Parks:     {:>3}", self.parks)?;
        writeln!(f, "Shops:     {:>3}", self.shops)?;
        writeln!(f, "Taverns:   {:>3}", self.taverns)?;
        write!(f, "Total:     {:>3}", self.total())
    }
}

/// A finished 4x4 city
///
/// # Notes
/// `factory_ranking` is this city's placement (1st, 2nd or 3rd) by number of
/// factories compared with the other cities in the game. It is an input to
/// scoring and is independent of the tiles on this board.
///
/// Tiles are stored row-major, so the tile at `(row, col)` lives at
/// `row * GRID_SIZE + col`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    factory_ranking: u8,
    layout: [Tile; NUM_CELLS],
    graph: AdjacencyGraph,
}

impl Board {
    /// Creates a city from a factory ranking and 16 tiles in row-major order
    pub fn new(factory_ranking: u8, tiles: &[Tile]) -> Result<Self> {
        if !(1..=3).contains(&factory_ranking) {
            return Err(anyhow!(
                "Invalid factory ranking {}, must be 1, 2 or 3",
                factory_ranking
            ));
        }
        if tiles.len() != NUM_CELLS {
            return Err(anyhow!(
                "There must be exactly {} tiles, found {}",
                NUM_CELLS,
                tiles.len()
            ));
        }
        let mut layout = [Tile::Factory; NUM_CELLS];
        layout.copy_from_slice(tiles);
        Ok(Self::from_layout(factory_ranking, layout))
    }

    /// Creates a city from a string of 16 tile letter codes, ignoring whitespace
    /// and `|` separators
    pub fn from_codes<S: AsRef<str>>(factory_ranking: u8, codes: S) -> Result<Self> {
        let tiles = codes
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .map(Tile::from_char)
            .collect::<Result<Vec<_>>>()?;
        Self::new(factory_ranking, &tiles)
    }

    // callers guarantee the ranking is in range
    pub(crate) fn from_layout(factory_ranking: u8, layout: [Tile; NUM_CELLS]) -> Self {
        debug_assert!((1..=3).contains(&factory_ranking));
        Self {
            factory_ranking,
            layout,
            graph: AdjacencyGraph::new(),
        }
    }

    pub fn factory_ranking(&self) -> u8 {
        self.factory_ranking
    }

    pub fn tiles(&self) -> &[Tile; NUM_CELLS] {
        &self.layout
    }

    pub fn tile(&self, row: usize, col: usize) -> Tile {
        self.layout[position(row, col)]
    }

    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    /// Bitmask of the cells holding a tile matching `predicate`
    pub fn mask<P: Fn(Tile) -> bool>(&self, predicate: P) -> u16 {
        self.layout
            .iter()
            .enumerate()
            .filter(|(_, &tile)| predicate(tile))
            .fold(0, |mask, (position, _)| mask | 1u16 << position)
    }

    fn count<P: Fn(Tile) -> bool>(&self, predicate: P) -> u32 {
        self.mask(predicate).count_ones()
    }

    fn contains<P: Fn(Tile) -> bool>(&self, predicate: P) -> bool {
        self.layout.iter().any(|&tile| predicate(tile))
    }

    fn has_neighbour<P: Fn(Tile) -> bool>(&self, position: usize, predicate: P) -> bool {
        positions(self.graph.adjacent(position)).any(|neighbour| predicate(self.layout[neighbour]))
    }

    /// Factories score 4 each for the city ranked first by factory count,
    /// 3 each for second and 2 each otherwise
    pub fn score_factories(&self) -> u32 {
        let per_factory = match self.factory_ranking {
            1 => 4,
            2 => 3,
            _ => 2,
        };
        per_factory * self.count(Tile::is_factory)
    }

    /// Each house scores 1 point per other building category present in the
    /// city (all taverns together count as one category), or only 1 point if
    /// it borders a factory
    pub fn score_houses(&self) -> u32 {
        let categories: [fn(Tile) -> bool; 5] = [
            Tile::is_tavern,
            Tile::is_factory,
            Tile::is_shop,
            Tile::is_office,
            Tile::is_park,
        ];
        let per_house = categories
            .iter()
            .filter(|&&category| self.contains(category))
            .count() as u32;

        positions(self.mask(Tile::is_house))
            .map(|house| {
                if self.has_neighbour(house, Tile::is_factory) {
                    1
                } else {
                    per_house
                }
            })
            .sum()
    }

    /// Offices score 1, 3, 6, 10, 15 and 21 points for one to six offices,
    /// starting over for every further set of six. Each office bordering at
    /// least one tavern scores a single bonus point.
    pub fn score_offices(&self) -> u32 {
        let offices = self.mask(Tile::is_office);
        let count = offices.count_ones();
        let sets = (count / OFFICE_SET_SIZE) * triangular(OFFICE_SET_SIZE)
            + triangular(count % OFFICE_SET_SIZE);
        let bonus = positions(offices)
            .filter(|&office| self.has_neighbour(office, Tile::is_tavern))
            .count() as u32;
        sets + bonus
    }

    /// Sizes of the groups of parks connected by shared edges, in any shape
    pub fn park_group_sizes(&self) -> Vec<usize> {
        connected_group_sizes(self.mask(Tile::is_park), &self.graph)
    }

    /// Park groups score 2, 8 and 12 points for one to three parks and one
    /// more point per park beyond that
    pub fn score_parks(&self) -> u32 {
        self.park_group_sizes()
            .into_iter()
            .map(park_group_score)
            .sum()
    }

    /// Sizes of the straight lines of shops, where crossing lines don't share
    /// a tile
    pub fn shop_group_sizes(&self) -> Vec<usize> {
        line_group_sizes(self.mask(Tile::is_shop))
    }

    /// Shop lines score 2, 5, 10 and 16 points for one to four shops
    pub fn score_shops(&self) -> u32 {
        self.shop_group_sizes()
            .into_iter()
            .map(shop_group_score)
            .sum()
    }

    /// Taverns score in sets of different kinds: 1, 4, 9 or 17 points for a
    /// set of one to four kinds. Uneven counts are peeled off in layers, each
    /// layer being as many complete sets as the rarest remaining kind allows.
    pub fn score_taverns(&self) -> u32 {
        let mut counts = [0u32; 4];
        for kind in self.layout.iter().filter_map(|tile| tile.tavern_type()) {
            counts[kind] += 1;
        }

        let mut score = 0;
        loop {
            let kinds = counts.iter().filter(|&&count| count > 0).count();
            let layer = match counts.iter().filter(|&&count| count > 0).min() {
                Some(&layer) => layer,
                None => break,
            };
            score += layer * tavern_set_score(kinds);
            for count in counts.iter_mut().filter(|count| **count > 0) {
                *count -= layer;
            }
        }
        score
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            factories: self.score_factories(),
            houses: self.score_houses(),
            offices: self.score_offices(),
            parks: self.score_parks(),
            shops: self.score_shops(),
            taverns: self.score_taverns(),
        }
    }

    /// The total score of the city over all categories
    pub fn score(&self) -> u32 {
        self.breakdown().total()
    }

    /// Human readable drawing of the city, the same text as `Display`
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn render_row(&self, row: usize) -> String {
        let mut line = String::from("|");
        for col in 0..GRID_SIZE {
            let name = self.tile(row, col).name();
            let indent = " ".repeat(CELL_WIDTH.saturating_sub(name.len()) / 2);
            line.push_str(&format!("{:<width$}|", indent + name, width = CELL_WIDTH));
        }
        line
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner_width = GRID_SIZE * (CELL_WIDTH + 1) - 1;
        let cell_rule = "-".repeat(CELL_WIDTH);
        let cell_blank = " ".repeat(CELL_WIDTH);
        let separator = format!("|{}|", vec![cell_rule.as_str(); GRID_SIZE].join("|"));
        let space = format!("|{}|", vec![cell_blank.as_str(); GRID_SIZE].join("|"));

        writeln!(
            f,
            "#{} in factories; Score: {}",
            self.factory_ranking,
            self.score()
        )?;
        writeln!(f, "┌{}┐", "-".repeat(inner_width))?;
        for row in 0..GRID_SIZE {
            if row > 0 {
                writeln!(f, "{}", separator)?;
            }
            writeln!(f, "{}", space)?;
            writeln!(f, "{}", self.render_row(row))?;
            writeln!(f, "{}", space)?;
        }
        write!(f, "└{}┘", "-".repeat(inner_width))
    }
}
