//! Materializes a fragment list as a FASTA file.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::DEFAULT_EXTRACT_CHUNK_BYTES;
use crate::fragments::FragmentList;

/// Copies record bytes out of their source files.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    chunk_bytes: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACT_CHUNK_BYTES)
    }
}

impl Extractor {
    pub fn new(chunk_bytes: usize) -> Self {
        Self {
            chunk_bytes: chunk_bytes.max(1),
        }
    }

    /// Writes `list` to `dest`, replacing any existing file.
    pub fn extract(&self, list: &FragmentList, dest: &Path) -> Result<()> {
        let file = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_fasta(list, &mut writer)
            .with_context(|| format!("extract into {}", dest.display()))?;
        writer
            .flush()
            .with_context(|| format!("flush {}", dest.display()))?;
        Ok(())
    }

    /// For each record: a `> <header> $$$ left=<L> right=<R>` line, the raw
    /// source bytes `[L, R]`, and a newline if those bytes did not end with one.
    pub fn write_fasta<W: Write>(&self, list: &FragmentList, writer: &mut W) -> Result<()> {
        let largest = list.records().iter().map(|r| r.size()).max().unwrap_or(0);
        let mut buf = vec![0u8; (self.chunk_bytes as u64).min(largest) as usize];
        let mut sources: HashMap<&Path, File> = HashMap::new();

        for record in list.records() {
            writeln!(writer, "> {}", record.fasta_header())?;
            let source = match sources.entry(record.source()) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    let f = File::open(record.source())
                        .with_context(|| format!("open {}", record.source().display()))?;
                    e.insert(f)
                }
            };
            source.seek(SeekFrom::Start(record.left()))?;

            let mut remaining = record.size();
            let mut last = b'\n';
            while remaining > 0 {
                let n = remaining.min(buf.len() as u64) as usize;
                source.read_exact(&mut buf[..n]).with_context(|| {
                    format!(
                        "read bytes {}..={} of {}",
                        record.left(),
                        record.right(),
                        record.source().display()
                    )
                })?;
                writer.write_all(&buf[..n])?;
                last = buf[n - 1];
                remaining -= n as u64;
            }
            if last != b'\n' {
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fasta::load_fragments;

    const TWO: &str = ">s1\nAAAAAAAAA\n>s2\nCCCCCCCCCCCC\n";

    fn rendered(list: &FragmentList, chunk: usize) -> String {
        let mut out = Vec::new();
        Extractor::new(chunk).write_fasta(list, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn full_list_keeps_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.fa");
        std::fs::write(&path, TWO).unwrap();
        let list = load_fragments(&path).unwrap();
        assert_eq!(
            rendered(&list, 4),
            "> s1 $$$ left=4 right=13\nAAAAAAAAA\n> s2 $$$ left=18 right=30\nCCCCCCCCCCCC\n"
        );
    }

    #[test]
    fn partial_record_gets_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.fa");
        std::fs::write(&path, TWO).unwrap();
        let list = load_fragments(&path).unwrap().without_range(3, 15);
        assert_eq!(
            rendered(&list, 1024),
            "> s1 $$$ left=4 right=6\nAAA\n> s2 $$$ left=24 right=30\nCCCCCC\n"
        );
    }

    #[test]
    fn extract_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.fa");
        std::fs::write(&path, TWO).unwrap();
        let list = load_fragments(&path).unwrap();
        let dest = dir.path().join("out.fa");
        Extractor::default().extract(&list, &dest).unwrap();
        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(text.contains("AAAAAAAAA\n"));
        assert!(text.contains("CCCCCCCCCCCC\n"));
    }

    #[test]
    fn empty_list_writes_empty_file() {
        assert_eq!(rendered(&FragmentList::default(), 16), "");
    }
}
