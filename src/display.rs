use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use cities_ai::{Board, Tile, GRID_SIZE};

const CELL_WIDTH: usize = 14;

fn tile_colour(tile: Tile) -> Color {
    match tile {
        Tile::Factory => Color::DarkGrey,
        Tile::House => Color::DarkYellow,
        Tile::Office => Color::DarkBlue,
        Tile::Park => Color::DarkGreen,
        Tile::Shop => Color::DarkMagenta,
        _ => Color::DarkRed,
    }
}

/// Draws the city as a grid of coloured cells followed by its score breakdown
pub fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    stdout.queue(PrintStyledContent(style(format!(
        "#{} in factories\n",
        board.factory_ranking()
    ))))?;
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let tile = board.tile(row, col);
            stdout.queue(PrintStyledContent(
                style(format!("{:^width$}", tile.name(), width = CELL_WIDTH))
                    .attribute(Attribute::Bold)
                    .with(Color::White)
                    .on(tile_colour(tile)),
            ))?;
        }
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.queue(PrintStyledContent(style(format!("{}\n", board.breakdown()))))?;
    stdout.flush()?;
    Ok(())
}
