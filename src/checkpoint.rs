use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::enumerator::ScoreTally;
use crate::MAX_INDEX;

pub const DEFAULT_CHECKPOINT_PATH: &str = "sweep_checkpoint.bin";

const MAGIC: &[u8; 4] = b"CITY";
const VERSION: u8 = 1;

/// Saved progress of a sequential sweep over `[start, end)`
///
/// Every index in `[start, cursor)` has been folded into `tally`; the sweep
/// resumes at `cursor`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Checkpoint {
    pub start: u64,
    pub cursor: u64,
    pub end: u64,
    pub tally: ScoreTally,
}

impl Checkpoint {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = BufReader::new(File::open(path)?);
        Self::read_from(&mut file)
    }

    /// Writes the checkpoint next to `path` and then moves it into place, so
    /// an interrupted save never leaves a truncated checkpoint behind
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        {
            let mut file = BufWriter::new(
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&temp_path)?,
            );
            self.write_to(&mut file)?;
            file.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(MAGIC)?;
        writer.write_u8(VERSION)?;
        writer.write_u64::<BigEndian>(self.start)?;
        writer.write_u64::<BigEndian>(self.cursor)?;
        writer.write_u64::<BigEndian>(self.end)?;
        writer.write_u64::<BigEndian>(self.tally.boards_scored())?;

        writer.write_u32::<BigEndian>(self.tally.best_score().unwrap_or(0))?;
        writer.write_u32::<BigEndian>(self.tally.best_indices().len() as u32)?;
        for &index in self.tally.best_indices() {
            writer.write_u64::<BigEndian>(index)?;
        }

        writer.write_u32::<BigEndian>(self.tally.counts().len() as u32)?;
        for (&score, &count) in self.tally.counts() {
            writer.write_u32::<BigEndian>(score)?;
            writer.write_u64::<BigEndian>(count)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(anyhow!("Not a sweep checkpoint, bad magic {:?}", magic));
        }
        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(anyhow!("Unsupported checkpoint version {}", version));
        }

        let start = reader.read_u64::<BigEndian>()?;
        let cursor = reader.read_u64::<BigEndian>()?;
        let end = reader.read_u64::<BigEndian>()?;
        let boards_scored = reader.read_u64::<BigEndian>()?;
        if !(start <= cursor && cursor <= end && end <= MAX_INDEX) {
            return Err(anyhow!(
                "Invalid checkpoint range: start {}, cursor {}, end {}",
                start,
                cursor,
                end
            ));
        }

        let best_score = reader.read_u32::<BigEndian>()?;
        let num_best = reader.read_u32::<BigEndian>()?;
        let mut best_indices = BTreeSet::new();
        for _ in 0..num_best {
            best_indices.insert(reader.read_u64::<BigEndian>()?);
        }

        let num_buckets = reader.read_u32::<BigEndian>()?;
        let mut counts = BTreeMap::new();
        for _ in 0..num_buckets {
            let score = reader.read_u32::<BigEndian>()?;
            let count = reader.read_u64::<BigEndian>()?;
            counts.insert(score, count);
        }

        let best_score = if best_indices.is_empty() {
            None
        } else {
            Some(best_score)
        };
        let tally = ScoreTally::from_parts(counts, best_score, best_indices);
        if tally.boards_scored() != boards_scored || boards_scored != cursor - start {
            return Err(anyhow!(
                "Corrupt checkpoint: {} boards recorded for {} indices swept",
                tally.boards_scored(),
                cursor - start
            ));
        }

        Ok(Self {
            start,
            cursor,
            end,
            tally,
        })
    }
}
