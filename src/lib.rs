//! A scoring engine and exhaustive search for 4x4 city boards in a
//! tile-placing city building game
//!
//! Every board configuration (a factory ranking plus 16 tiles) is identified
//! by a single integer index, so the whole space can be swept, sampled or
//! resumed from any point.
//!
//! # Basic Usage
//!
//! ```
//! use cities_ai::{board::Board, codec, tile::Tile};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board = Board::from_codes(1, "SSSSHHOMOPOOOPHP")?;
//! assert_eq!(board.score(), 56);
//!
//! let first = codec::decode(0);
//! assert!(first.tiles().iter().all(|&tile| tile == Tile::Factory));
//! assert_eq!(codec::decode(codec::encode(&board)), board);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod tile;

pub mod grid;

pub mod groups;

pub mod lines;

pub mod board;

pub mod codec;

pub mod enumerator;

pub mod checkpoint;

pub mod sweep;

mod test;

pub use board::{Board, ScoreBreakdown};
pub use enumerator::{Enumerator, ScoreTally};
pub use tile::Tile;

/// The width and height of a city in tiles
pub const GRID_SIZE: usize = 4;

/// The number of tiles in a city
pub const NUM_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// The number of distinct tile kinds
pub const NUM_TILE_KINDS: u64 = 9;

/// The number of possible factory rankings
pub const NUM_RANKINGS: u64 = 3;

/// One past the largest valid board index: 3 * 9^16
pub const MAX_INDEX: u64 = NUM_RANKINGS * NUM_TILE_KINDS.pow(NUM_CELLS as u32);

// cell sets are stored as u16 bitmasks
const_assert!(NUM_CELLS <= 16);
// the index space must fit in a u64 with room to spare for range arithmetic
const_assert!(MAX_INDEX < u64::MAX / 2);
