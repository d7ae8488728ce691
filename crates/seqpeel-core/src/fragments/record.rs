//! One byte range of a source FASTA file.

use std::path::Path;
use std::sync::Arc;

/// Bytes `[left, right]` (both inclusive) of `source`, labelled with the
/// header of the FASTA record they come from.
///
/// A record is never empty: splitting methods return `None` for a zero-width half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRangeRecord {
    header: Arc<str>,
    left: u64,
    right: u64,
    source: Arc<Path>,
}

impl ByteRangeRecord {
    /// Record covering `len` bytes starting at `left`; `None` when `len` is 0.
    pub fn with_len(
        header: impl Into<Arc<str>>,
        left: u64,
        len: u64,
        source: Arc<Path>,
    ) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            header: header.into(),
            left,
            right: left + len - 1,
            source,
        })
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// First byte (inclusive) in the source file.
    pub fn left(&self) -> u64 {
        self.left
    }

    /// Last byte (inclusive) in the source file.
    pub fn right(&self) -> u64 {
        self.right
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn size(&self) -> u64 {
        self.right - self.left + 1
    }

    /// Splits at local offset `position` (clamped to `0..=size`) into
    /// `[left, left+position-1]` and `[left+position, right]`.
    pub fn split_at(&self, position: u64) -> (Option<Self>, Option<Self>) {
        let position = position.min(self.size());
        let left = (position > 0).then(|| self.slice(self.left, self.left + position - 1));
        let right = (position < self.size()).then(|| self.slice(self.left + position, self.right));
        (left, right)
    }

    /// Header line written by the extractor (without the leading `>`).
    pub fn fasta_header(&self) -> String {
        format!("{} $$$ left={} right={}", self.header, self.left, self.right)
    }

    fn slice(&self, left: u64, right: u64) -> Self {
        Self {
            header: Arc::clone(&self.header),
            left,
            right,
            source: Arc::clone(&self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(left: u64, len: u64) -> ByteRangeRecord {
        ByteRangeRecord::with_len("complete 1", left, len, Arc::from(Path::new("fake.fa"))).unwrap()
    }

    #[test]
    fn zero_length_is_absent() {
        assert!(ByteRangeRecord::with_len("x", 5, 0, Arc::from(Path::new("a.fa"))).is_none());
    }

    #[test]
    fn size_is_inclusive() {
        let r = record(0, 10);
        assert_eq!(r.left(), 0);
        assert_eq!(r.right(), 9);
        assert_eq!(r.size(), 10);
    }

    #[test]
    fn split_every_position() {
        let r = record(0, 10);
        for p in 0..=r.size() {
            let (left, right) = r.split_at(p);
            if p == 0 {
                assert!(left.is_none());
            } else {
                let left = left.unwrap();
                assert_eq!(left.size(), p);
                assert_eq!(left.left(), 0);
                assert_eq!(left.right(), p - 1);
            }
            if p == r.size() {
                assert!(right.is_none());
            } else {
                let right = right.unwrap();
                assert_eq!(right.size(), r.size() - p);
                assert_eq!(right.left(), p);
                assert_eq!(right.right(), r.size() - 1);
            }
        }
    }

    #[test]
    fn split_keeps_absolute_offsets() {
        let r = record(100, 8);
        let (left, right) = r.split_at(3);
        assert_eq!((left.as_ref().unwrap().left(), left.unwrap().right()), (100, 102));
        assert_eq!((right.as_ref().unwrap().left(), right.unwrap().right()), (103, 107));
    }

    #[test]
    fn fasta_header_format() {
        let r = record(4, 6);
        assert_eq!(r.fasta_header(), "complete 1 $$$ left=4 right=9");
    }
}
