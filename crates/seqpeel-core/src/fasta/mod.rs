//! FASTA collaborators: record index, extraction and input manifests.

mod extract;
mod index;
mod manifest;

pub use extract::Extractor;
pub use index::{index_file, index_reader, load_fragments, RecordSpan};
pub use manifest::load_manifest;
