//! Masks: the contiguous position ranges of a [`FragmentList`] that are still
//! under reduction, and the candidate-producing operations driven by them.
//!
//! A dichotomy mask is halved; when neither half alone keeps the behaviour it
//! turns into a pair of peel masks, which then shave bytes from one side
//! (halving the attempted amount on each failure) until they settle.

use super::FragmentList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskPhase {
    Dichotomy,
    LeftPeel,
    RightPeel,
}

/// Positions `[start, end]` (inclusive) of a fragment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask {
    pub start: u64,
    pub end: u64,
    pub phase: MaskPhase,
}

impl Mask {
    pub fn new(start: u64, end: u64, phase: MaskPhase) -> Self {
        debug_assert!(start <= end, "mask [{start}, {end}] is inverted");
        Self { start, end, phase }
    }

    /// `None` when `len` is 0.
    pub fn span(start: u64, len: u64, phase: MaskPhase) -> Option<Self> {
        (len > 0).then(|| Self::new(start, start + len - 1, phase))
    }

    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// First position of the right half; the left half is the smaller one.
    pub fn midpoint(&self) -> u64 {
        (self.start + self.end + 1) / 2
    }

    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Remaps this mask after positions `[start, end]` were deleted from its list.
    /// Masks past the deletion shift left, overlapping masks are clipped, a
    /// mask swallowed whole disappears.
    pub(crate) fn after_removal(self, start: u64, end: u64) -> Option<Self> {
        let removed = end - start + 1;
        if self.end < start {
            return Some(self);
        }
        if self.start > end {
            return Some(Self::new(self.start - removed, self.end - removed, self.phase));
        }
        let overlap = self.end.min(end) - self.start.max(start) + 1;
        Self::span(self.start.min(start), self.size() - overlap, self.phase)
    }
}

impl FragmentList {
    /// Two candidates for a dichotomy mask of size >= 2: the left half alone
    /// and the right half alone (everything outside the mask is kept in both).
    /// The kept half carries a fresh dichotomy mask.
    pub fn split_dichotomy(&self, mask: Mask) -> (FragmentList, FragmentList) {
        debug_assert_eq!(mask.phase, MaskPhase::Dichotomy);
        let mid = mask.midpoint();
        let left = if mid <= mask.end {
            self.without_range(mid, mask.end)
        } else {
            self.clone()
        };
        let right = if mid > mask.start {
            self.without_range(mask.start, mid - 1)
        } else {
            self.clone()
        };
        (left, right)
    }

    /// Same content with the dichotomy `mask` replaced by a left peel over its
    /// left half and a right peel over its right half. A one-position mask
    /// becomes a single right peel.
    pub fn dichotomy_to_peel(&self, mask: Mask) -> FragmentList {
        debug_assert_eq!(mask.phase, MaskPhase::Dichotomy);
        if mask.size() < 2 {
            return self.replacing(
                mask,
                &[Mask::new(mask.start, mask.end, MaskPhase::RightPeel)],
            );
        }
        let mid = mask.midpoint();
        self.replacing(
            mask,
            &[
                Mask::new(mask.start, mid - 1, MaskPhase::LeftPeel),
                Mask::new(mid, mask.end, MaskPhase::RightPeel),
            ],
        )
    }

    /// `(on_success, on_error)` candidates for a peel mask.
    ///
    /// A left peel of size `m` tries to delete its first `max(m/2, 1)`
    /// positions; a right peel tries to delete everything from `m/2` on.
    /// On success the mask keeps what was not deleted; on error it narrows
    /// to the part that could not go, and settles once that is a single
    /// position. A dichotomy mask passed here is first converted with
    /// [`dichotomy_to_peel`](Self::dichotomy_to_peel) and its larger peel
    /// mask is split.
    pub fn split_peel(&self, mask: Mask) -> (FragmentList, FragmentList) {
        let size = mask.size();
        match mask.phase {
            MaskPhase::LeftPeel => {
                let attempt = (size / 2).max(1);
                let last = mask.start + attempt - 1;
                let success = self.without_range(mask.start, last);
                let narrowed = if attempt > 1 {
                    vec![Mask::new(mask.start, last, MaskPhase::LeftPeel)]
                } else {
                    Vec::new()
                };
                (success, self.replacing(mask, &narrowed))
            }
            MaskPhase::RightPeel => {
                let keep = size / 2;
                let first = mask.start + keep;
                let success = self.without_range(first, mask.end);
                let narrowed = if size - keep > 1 {
                    vec![Mask::new(first, mask.end, MaskPhase::RightPeel)]
                } else {
                    Vec::new()
                };
                (success, self.replacing(mask, &narrowed))
            }
            MaskPhase::Dichotomy => {
                let converted = self.dichotomy_to_peel(mask);
                match converted.largest_mask_within(mask.start, mask.end) {
                    Some(peel) => converted.split_peel(peel),
                    None => (converted.clone(), converted),
                }
            }
        }
    }

    /// Largest mask overall; ties go to the lower start.
    pub fn largest_mask(&self) -> Option<Mask> {
        self.largest_mask_within(0, u64::MAX)
    }

    fn largest_mask_within(&self, start: u64, end: u64) -> Option<Mask> {
        self.masks()
            .iter()
            .filter(|m| m.start >= start && m.end <= end)
            .fold(None, |best: Option<Mask>, m| match best {
                Some(b) if b.size() >= m.size() => Some(b),
                _ => Some(*m),
            })
    }

    /// Total number of positions still under reduction.
    pub fn masked_len(&self) -> u64 {
        self.masks().iter().map(Mask::size).sum()
    }
}
