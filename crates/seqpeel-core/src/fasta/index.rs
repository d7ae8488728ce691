//! One-pass record index of a FASTA file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::error::PeelError;
use crate::fragments::{ByteRangeRecord, FragmentList};

/// Sequence bytes `[first, last]` (inclusive) of one record, header line excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpan {
    pub header: String,
    pub first: u64,
    pub last: u64,
}

impl RecordSpan {
    pub fn size(&self) -> u64 {
        self.last - self.first + 1
    }
}

/// Indexes every record of `path`. A record runs from the byte after its
/// header line up to the byte before the next header line (or EOF), so line
/// breaks inside the sequence are part of it.
pub fn index_file(path: &Path) -> Result<Vec<RecordSpan>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            anyhow::Error::new(PeelError::MissingInput(path.to_path_buf()))
        } else {
            anyhow::Error::new(e).context(format!("open {}", path.display()))
        }
    })?;
    index_reader(BufReader::new(file)).with_context(|| format!("index {}", path.display()))
}

/// Same as [`index_file`] over any buffered reader.
pub fn index_reader<R: BufRead>(mut reader: R) -> io::Result<Vec<RecordSpan>> {
    let mut spans = Vec::new();
    let mut current: Option<(String, u64)> = None;
    let mut position = 0u64;
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        if line[0] == b'>' {
            close_record(&mut spans, current.take(), position);
            let header = String::from_utf8_lossy(&line[1..]).trim().to_string();
            current = Some((header, position + n as u64));
        }
        position += n as u64;
    }
    close_record(&mut spans, current, position);
    Ok(spans)
}

fn close_record(spans: &mut Vec<RecordSpan>, current: Option<(String, u64)>, end: u64) {
    if let Some((header, first)) = current {
        if end > first {
            spans.push(RecordSpan {
                header,
                first,
                last: end - 1,
            });
        }
    }
}

/// Indexes `path` into a fresh fragment list over its records.
pub fn load_fragments(path: &Path) -> Result<FragmentList> {
    let source: Arc<Path> = Arc::from(path);
    let records = index_file(path)?
        .into_iter()
        .filter_map(|span| {
            let len = span.size();
            ByteRangeRecord::with_len(span.header, span.first, len, Arc::clone(&source))
        })
        .collect::<Vec<_>>();
    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        "indexed fasta file"
    );
    Ok(FragmentList::new(records))
}
