use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;

use crate::error::SortError;
use crate::line_reader::LineReader;

/// Next unconsumed line of a merge source
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Head {
    Line(Vec<u8>),
    Exhausted,
}

/// Read cursor over one sorted file with its current head line.
///
/// Ordering is reversed so that a [std::collections::BinaryHeap] of sources pops the smallest
/// head first, and among equal heads the lowest index. Exhausted sources order last.
#[derive(Debug)]
pub(crate) struct MergeSource {
    index: usize,
    path: PathBuf,
    reader: LineReader<BufReader<File>>,
    head: Head,
}

impl MergeSource {
    pub(crate) fn new(index: usize, path: PathBuf, max_line_length: usize) -> Result<MergeSource, anyhow::Error> {
        let file = File::open(&path).with_context(|| format!("open merge source: {}", path.to_string_lossy()))?;
        let mut merge_source = MergeSource {
            index,
            path,
            reader: LineReader::new(BufReader::new(file), max_line_length),
            head: Head::Exhausted,
        };
        merge_source.advance()?;
        Ok(merge_source)
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.head == Head::Exhausted
    }

    /// Take the head line and refill it from the file
    pub(crate) fn pop_line(&mut self) -> Result<Vec<u8>, anyhow::Error> {
        match std::mem::replace(&mut self.head, Head::Exhausted) {
            Head::Line(line) => {
                self.advance()?;
                Ok(line)
            }
            Head::Exhausted => {
                Err(SortError::ExhaustionInvariantViolation { source_index: self.index }.into())
            }
        }
    }

    fn advance(&mut self) -> Result<(), anyhow::Error> {
        self.head = match self.reader.read_line()
            .with_context(|| format!("read merge source: {}", self.path.to_string_lossy()))? {
            Some(line) => Head::Line(line),
            None => Head::Exhausted,
        };
        Ok(())
    }
}

impl Eq for MergeSource {}

impl PartialEq<Self> for MergeSource {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd<Self> for MergeSource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeSource {
    // comparisons are flipped to work with BinaryHeap (Max Heap)
    fn cmp(&self, other: &Self) -> Ordering {
        let heads = match (&self.head, &other.head) {
            (Head::Exhausted, Head::Exhausted) => Ordering::Equal,
            (Head::Exhausted, Head::Line(_)) => Ordering::Less,
            (Head::Line(_), Head::Exhausted) => Ordering::Greater,
            (Head::Line(line), Head::Line(other_line)) => other_line.cmp(line),
        };
        heads.then_with(|| other.index.cmp(&self.index))
    }
}
