//! Bijection between board indices in `[0, MAX_INDEX)` and cities
//!
//! An index is a mixed radix number: the lowest digit is base 3 and holds the
//! factory ranking, the 16 digits above it are base 9 and hold the tiles, with
//! the most significant digit at `(0, 0)` and the least significant at `(3, 3)`.

use anyhow::{anyhow, Result};

use crate::board::Board;
use crate::tile::Tile;
use crate::{MAX_INDEX, NUM_CELLS, NUM_RANKINGS, NUM_TILE_KINDS};

/// Decodes a board index, which must be below [`MAX_INDEX`]
pub fn decode(mut index: u64) -> Board {
    debug_assert!(index < MAX_INDEX, "board index {} out of range", index);

    let factory_ranking = (index % NUM_RANKINGS) as u8 + 1;
    index /= NUM_RANKINGS;

    let mut layout = [Tile::Factory; NUM_CELLS];
    // least significant digit is the last cell
    for cell in layout.iter_mut().rev() {
        *cell = Tile::ALL[(index % NUM_TILE_KINDS) as usize];
        index /= NUM_TILE_KINDS;
    }
    Board::from_layout(factory_ranking, layout)
}

/// Decodes a board index, rejecting indices outside `[0, MAX_INDEX)`
pub fn try_decode(index: u64) -> Result<Board> {
    if index >= MAX_INDEX {
        return Err(anyhow!(
            "Invalid board index {}, must be less than {}",
            index,
            MAX_INDEX
        ));
    }
    Ok(decode(index))
}

/// The index that [`decode`]s to `board`
pub fn encode(board: &Board) -> u64 {
    let tiles = board
        .tiles()
        .iter()
        .fold(0, |index, tile| index * NUM_TILE_KINDS + tile.digit());
    tiles * NUM_RANKINGS + (board.factory_ranking() - 1) as u64
}
