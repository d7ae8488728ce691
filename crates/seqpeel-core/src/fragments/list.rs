//! Ordered list of byte-range records addressed by global position.

use super::{ByteRangeRecord, Mask, MaskPhase};

/// The reduced view of one input file: records in file order, addressed as a
/// single sequence of positions `0..length`.
///
/// `cumulative[i]` is the total size of `records[0..=i]`, so locating a
/// position is a binary search. `masks` are sorted by start and disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentList {
    records: Vec<ByteRangeRecord>,
    cumulative: Vec<u64>,
    masks: Vec<Mask>,
}

impl FragmentList {
    /// A fresh list: the whole range is one dichotomy mask.
    pub fn new(records: Vec<ByteRangeRecord>) -> Self {
        let mut list = Self::from_parts(records, Vec::new());
        list.masks = Mask::span(0, list.length(), MaskPhase::Dichotomy)
            .into_iter()
            .collect();
        list
    }

    fn from_parts(records: Vec<ByteRangeRecord>, masks: Vec<Mask>) -> Self {
        let cumulative = records
            .iter()
            .scan(0u64, |total, r| {
                *total += r.size();
                Some(*total)
            })
            .collect();
        Self {
            records,
            cumulative,
            masks,
        }
    }

    pub fn records(&self) -> &[ByteRangeRecord] {
        &self.records
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Total number of positions (bytes) in the list.
    pub fn length(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record index holding `position` and the offset inside that record.
    pub fn locate(&self, position: u64) -> Option<(usize, u64)> {
        if position >= self.length() {
            return None;
        }
        let index = self.cumulative.partition_point(|&total| total <= position);
        let before = index
            .checked_sub(1)
            .map(|i| self.cumulative[i])
            .unwrap_or(0);
        Some((index, position - before))
    }

    /// Splits into positions `[0, position)` and `[position, length)`.
    /// Both sides are fresh lists with a single full-range dichotomy mask.
    pub fn split_at(&self, position: u64) -> (FragmentList, FragmentList) {
        let (left, right) = self.split_records(position);
        (FragmentList::new(left), FragmentList::new(right))
    }

    /// The list with positions `[start, end]` deleted. Masks are remapped to
    /// the new positions; a mask swallowed by the deletion is dropped.
    pub fn without_range(&self, start: u64, end: u64) -> FragmentList {
        if start > end || start >= self.length() {
            return self.clone();
        }
        let end = end.min(self.length() - 1);
        let (mut kept, rest) = self.split_records(start);
        let tail = FragmentList::from_parts(rest, Vec::new());
        let (_, after) = tail.split_records(end - start + 1);
        kept.extend(after);
        let masks = self
            .masks
            .iter()
            .filter_map(|m| m.after_removal(start, end))
            .collect();
        FragmentList::from_parts(kept, masks)
    }

    /// Same records with a new mask set (sorted by start).
    pub(crate) fn with_masks(&self, mut masks: Vec<Mask>) -> FragmentList {
        masks.sort_by_key(|m| m.start);
        FragmentList {
            records: self.records.clone(),
            cumulative: self.cumulative.clone(),
            masks,
        }
    }

    /// Same records with `old` swapped for `new`.
    pub(crate) fn replacing(&self, old: Mask, new: &[Mask]) -> FragmentList {
        let masks = self
            .masks
            .iter()
            .filter(|m| **m != old)
            .chain(new.iter())
            .copied()
            .collect();
        self.with_masks(masks)
    }

    fn split_records(&self, position: u64) -> (Vec<ByteRangeRecord>, Vec<ByteRangeRecord>) {
        let Some((index, offset)) = self.locate(position) else {
            return (self.records.clone(), Vec::new());
        };
        let mut left = self.records[..index].to_vec();
        let mut right = Vec::with_capacity(self.records.len() - index);
        let (head, tail) = self.records[index].split_at(offset);
        left.extend(head);
        right.extend(tail);
        right.extend_from_slice(&self.records[index + 1..]);
        (left, right)
    }
}
