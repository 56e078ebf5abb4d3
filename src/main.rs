use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use indicatif::*;

use std::path::PathBuf;
use std::time::*;

use cities_ai::checkpoint::{Checkpoint, DEFAULT_CHECKPOINT_PATH};
use cities_ai::sweep::{Sweep, DEFAULT_CHUNK_SIZE, DEFAULT_SEGMENT_SIZE};
use cities_ai::*;

mod display;
use display::*;

/// Number of best board indices listed in a report
const REPORTED_BEST: usize = 10;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Scores 4x4 city boards and searches for the best ones", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a board index and show its score
    Show {
        index: u64,

        /// Print the plain text layout instead of coloured cells
        #[clap(long)]
        plain: bool,
    },
    /// Score a board given as one 16 letter code string or as 16 tile names
    Score {
        /// Placement of this city by factory count (1, 2 or 3)
        #[clap(short, long, default_value_t = 1)]
        ranking: u8,

        #[clap(required = true)]
        tiles: Vec<String>,
    },
    /// Score every board index in order, saving progress as it goes
    Sweep {
        /// First index to score
        #[clap(long, default_value_t = 0)]
        start: u64,

        /// One past the last index to score (defaults to the last board)
        #[clap(long)]
        end: Option<u64>,

        /// Stop after scoring this many boards
        #[clap(short, long)]
        count: Option<u64>,

        #[clap(long, default_value = DEFAULT_CHECKPOINT_PATH)]
        checkpoint: PathBuf,

        /// Continue from the saved checkpoint instead of starting over
        #[clap(long)]
        resume: bool,

        /// Boards scored between checkpoints
        #[clap(long, default_value_t = DEFAULT_SEGMENT_SIZE)]
        segment: u64,

        /// Boards scored by one worker task at a time
        #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk: u64,

        /// Worker threads (defaults to RAYON_NUM_THREADS or one per core)
        #[clap(long)]
        threads: Option<usize>,
    },
    /// Score uniformly sampled board indices
    Sample {
        #[clap(short, long, default_value_t = 1_000_000)]
        count: u64,

        /// Seed for a reproducible sample
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Show { index, plain } => {
            let board = codec::try_decode(index)?;
            if plain {
                println!("{}", board);
            } else {
                display(&board)?;
            }
        }
        Command::Score { ranking, tiles } => {
            let board = parse_board(ranking, &tiles)?;
            println!("{}", board);
            println!("{}", board.breakdown());
            println!("Board index: {}", codec::encode(&board));
        }
        Command::Sweep {
            start,
            end,
            count,
            checkpoint,
            resume,
            segment,
            chunk,
            threads,
        } => {
            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()?;
            }

            let sweep = if resume {
                let saved = Checkpoint::load(&checkpoint)?;
                println!(
                    "Resuming sweep at board {} of {} from {}",
                    saved.cursor,
                    saved.end,
                    checkpoint.display()
                );
                Sweep::resume(saved)
            } else {
                Sweep::new(start..end.unwrap_or(MAX_INDEX))
            };
            let mut sweep = sweep
                .with_checkpoint_path(&checkpoint)
                .with_segment_size(segment)
                .with_chunk_size(chunk)
                .verbose();

            sweep.run(count)?;
            report(sweep.tally())?;
            if !sweep.is_finished() {
                println!(
                    "Stopped at board {}, continue with --resume --checkpoint {}",
                    sweep.cursor(),
                    checkpoint.display()
                );
            }
        }
        Command::Sample { count, seed } => {
            let enumerator = match seed {
                Some(seed) => Enumerator::sampled(seed),
                None => Enumerator::sampled_from_entropy(),
            };
            let tally = sample(enumerator, count);
            report(&tally)?;
        }
    }
    Ok(())
}

fn parse_board(ranking: u8, tiles: &[String]) -> Result<Board> {
    match tiles {
        [codes] => Board::from_codes(ranking, codes),
        _ => {
            let tiles = tiles
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<Tile>>>()?;
            Board::new(ranking, &tiles)
        }
    }
}

fn sample(mut enumerator: Enumerator, count: u64) -> ScoreTally {
    let start = Instant::now();
    let mut next_time = start;

    let progress = ProgressBar::new(count);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Sampling boards: {bar:40.cyan/blue} {msg} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let mut tally = ScoreTally::new();
    let mut delta = 0;
    for (index, score) in enumerator.by_ref().take(count as usize) {
        let previous_best = tally.best_score();
        tally.record(index, score);
        if tally.best_score() != previous_best {
            progress.println(format!("New best board, index {}:\n{}", index, codec::decode(index)));
        }

        delta += 1;
        if Instant::now() > next_time {
            progress.inc(delta);
            delta = 0;
            progress.set_message(&format!("(best {})", tally.best_score().unwrap_or(0)));
            next_time += Duration::from_millis(100);
        }
    }
    progress.inc(delta);
    progress.finish();

    println!(
        "Sampled {} boards in {}",
        tally.boards_scored(),
        HumanDuration(Instant::now() - start)
    );
    tally
}

fn report(tally: &ScoreTally) -> Result<()> {
    let best = tally
        .best_score()
        .ok_or_else(|| anyhow!("No boards were scored"))?;

    println!("Score distribution:");
    for (score, count) in tally.counts() {
        println!("{:>4}: {}", score, count);
    }

    println!(
        "Best score {} reached by {} board(s)",
        best,
        tally.best_indices().len()
    );
    for &index in tally.best_indices().iter().take(REPORTED_BEST) {
        println!("  {}", index);
    }
    if let Some(&index) = tally.best_indices().iter().next() {
        display(&codec::decode(index))?;
    }
    Ok(())
}
