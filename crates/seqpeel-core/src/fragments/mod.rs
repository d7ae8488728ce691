//! Byte-range model of a FASTA file under reduction.
//!
//! A file is a list of [`ByteRangeRecord`]s (the sequence bytes of each
//! record, never the header line) addressed as one run of positions. Every
//! candidate input is derived from a [`FragmentList`] by deleting positions;
//! [`Mask`]s remember which positions are still worth trying to delete.

mod list;
mod mask;
mod record;

pub use list::FragmentList;
pub use mask::{Mask, MaskPhase};
pub use record::ByteRangeRecord;
