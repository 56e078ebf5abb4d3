//! Parallel, checkpointed sequential sweep over a range of board indices
//!
//! The range is processed in segments. Each segment is cut into chunks that
//! are scored on the rayon thread pool; every chunk produces its own
//! [`ScoreTally`], which is sent back to the thread that owns the sweep and
//! merged there, so the running statistics only ever have one writer. The
//! checkpoint is written between segments, when every index below the cursor
//! has been merged.

use anyhow::{anyhow, Result};
use indicatif::*;
use rayon::prelude::*;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::mpsc::*;
use std::thread;
use std::time::*;

use crate::checkpoint::Checkpoint;
use crate::codec::decode;
use crate::enumerator::ScoreTally;
use crate::MAX_INDEX;

/// Indices scored by one worker task before reporting back
pub const DEFAULT_CHUNK_SIZE: u64 = 1 << 16;
/// Indices swept between checkpoints
pub const DEFAULT_SEGMENT_SIZE: u64 = 1 << 26;

pub struct Sweep {
    start: u64,
    cursor: u64,
    end: u64,
    tally: ScoreTally,
    chunk_size: u64,
    segment_size: u64,
    checkpoint_path: Option<PathBuf>,
    verbose: bool,
}

impl Sweep {
    /// A fresh sweep over `range`, clamped to the valid index space
    pub fn new(range: Range<u64>) -> Self {
        let end = range.end.min(MAX_INDEX);
        let start = range.start.min(end);
        Self {
            start,
            cursor: start,
            end,
            tally: ScoreTally::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            segment_size: DEFAULT_SEGMENT_SIZE,
            checkpoint_path: None,
            verbose: false,
        }
    }

    /// Continues a sweep from a saved checkpoint
    pub fn resume(checkpoint: Checkpoint) -> Self {
        Self {
            start: checkpoint.start,
            cursor: checkpoint.cursor,
            end: checkpoint.end,
            tally: checkpoint.tally,
            ..Self::new(0..0)
        }
    }

    /// Saves a checkpoint to `path` after every segment
    pub fn with_checkpoint_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.checkpoint_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_segment_size(mut self, segment_size: u64) -> Self {
        self.segment_size = segment_size.max(1);
        self
    }

    /// Shows a progress bar and prints every new best board as it's found
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn tally(&self) -> &ScoreTally {
        &self.tally
    }

    pub fn into_tally(self) -> ScoreTally {
        self.tally
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.end
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            start: self.start,
            cursor: self.cursor,
            end: self.end,
            tally: self.tally.clone(),
        }
    }

    /// Sweeps until the end of the range, or until `limit` more boards have
    /// been scored. Stopping early leaves a valid, resumable state.
    pub fn run(&mut self, limit: Option<u64>) -> Result<()> {
        let start_time = Instant::now();
        let target = match limit {
            Some(limit) => self.cursor.saturating_add(limit).min(self.end),
            None => self.end,
        };

        let progress = if self.verbose {
            let progress = ProgressBar::new(target - self.cursor);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("Scoring boards: {bar:40.cyan/blue} {msg} ~{eta} remaining")
                    .progress_chars("█▓▒░  "),
            );
            progress
        } else {
            ProgressBar::hidden()
        };

        while self.cursor < target {
            let segment_end = self.cursor.saturating_add(self.segment_size).min(target);
            self.run_segment(segment_end, &progress)?;
        }
        progress.finish();

        if self.verbose {
            println!(
                "Swept to board {} of {} in {}",
                self.cursor,
                self.end,
                HumanDuration(Instant::now() - start_time)
            );
        }
        Ok(())
    }

    /// Scores `[cursor, segment_end)` in parallel and advances the cursor
    fn run_segment(&mut self, segment_end: u64, progress: &ProgressBar) -> Result<()> {
        let segment = self.score_segment(segment_end, progress)?;
        self.tally.merge(segment);
        self.cursor = segment_end;
        if let Some(path) = &self.checkpoint_path {
            self.checkpoint().save(path)?;
        }
        Ok(())
    }

    /// Tally of `[cursor, segment_end)`, leaving the sweep itself untouched
    /// until every worker has finished
    pub(crate) fn score_segment(&self, segment_end: u64, progress: &ProgressBar) -> Result<ScoreTally> {
        let chunk_size = self.chunk_size;
        let chunks: Vec<Range<u64>> = (self.cursor..segment_end)
            .step_by(chunk_size as usize)
            .map(|chunk_start| chunk_start..chunk_start.saturating_add(chunk_size).min(segment_end))
            .collect();

        let (tx, rx) = channel();
        let workers = thread::spawn(move || {
            chunks.into_par_iter().for_each_with(tx, |tx, chunk| {
                let tally: ScoreTally = chunk.map(|index| (index, decode(index).score())).collect();
                // the receiver only hangs up if the owning thread has failed
                let _ = tx.send(tally);
            });
        });

        let mut segment = ScoreTally::new();
        let mut best = self.tally.best_score();
        let mut next_time = Instant::now();
        let mut delta = 0;
        // ends once every worker has finished and dropped its sender
        for chunk_tally in rx {
            delta += chunk_tally.boards_scored();
            segment.merge(chunk_tally);

            if segment.best_score() > best {
                best = segment.best_score();
                if self.verbose {
                    if let Some(&index) = segment.best_indices().iter().next() {
                        progress.println(format!("New best board, index {}:\n{}", index, decode(index)));
                    }
                }
            }
            if Instant::now() > next_time {
                progress.inc(delta);
                delta = 0;
                progress.set_message(&format!("(best {})", best.unwrap_or(0)));
                next_time += Duration::from_millis(100);
            }
        }
        progress.inc(delta);

        workers
            .join()
            .map_err(|_| anyhow!("A scoring worker panicked"))?;
        Ok(segment)
    }
}
