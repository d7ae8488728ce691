//! seqpeel core: delta-debugging minimizer for FASTA inputs.
//!
//! Given input files and a command that shows some behaviour on them, the
//! peeler searches for the smallest input set (fewest files, fewest bytes)
//! that still shows that behaviour, racing candidate reductions in sandboxes.

pub mod checksum;
pub mod command;
pub mod config;
pub mod content;
pub mod error;
pub mod fasta;
pub mod fragments;
pub mod job;
pub mod logging;
pub mod peeler;
pub mod report;
pub mod sandbox;
pub mod scheduler;
