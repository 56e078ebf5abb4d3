//! Straight-line grouping: runs of qualifying cells along a single row or
//! column, where crossing lines may not share a cell

use crate::grid::{position, positions, row_col};
use crate::GRID_SIZE;

/// Mask of the run starting at `(row, col)` and stepping by `(d_row, d_col)`
/// through cells in `available`
fn run_from(available: u16, row: usize, col: usize, d_row: usize, d_col: usize) -> u16 {
    let mut run = 0;
    let (mut row, mut col) = (row, col);
    while row < GRID_SIZE && col < GRID_SIZE {
        let cell = 1u16 << position(row, col);
        if available & cell == 0 {
            break;
        }
        run |= cell;
        row += d_row;
        col += d_col;
    }
    run
}

/// Splits the cells in `members` into straight runs
///
/// Cells are visited in row-major order. From each cell the rightward run and
/// the downward run over unclaimed members are measured; the column run is
/// kept only when it is strictly longer, otherwise the row run is kept. Kept
/// cells are claimed and never counted again, so a cell where two lines cross
/// belongs to whichever line claimed it first.
///
/// Returns the masks of the runs in the order they were claimed.
pub fn line_groups(members: u16) -> Vec<u16> {
    let mut claimed = 0u16;
    let mut groups = Vec::new();

    for start in positions(members) {
        let available = members & !claimed;
        let (row, col) = row_col(start);
        let row_run = run_from(available, row, col, 0, 1);
        let column_run = run_from(available, row, col, 1, 0);

        let group = if row_run.count_ones() < column_run.count_ones() {
            column_run
        } else {
            row_run
        };
        // an already claimed start cell has no runs at all
        if group != 0 {
            claimed |= group;
            groups.push(group);
        }
    }
    groups
}

/// Sizes of the straight runs formed by the cells in `members`
pub fn line_group_sizes(members: u16) -> Vec<usize> {
    line_groups(members)
        .into_iter()
        .map(|group| group.count_ones() as usize)
        .collect()
}
