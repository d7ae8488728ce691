//! `seqpeel index` – print the record index of FASTA files.

use anyhow::Result;
use seqpeel_core::fasta;
use std::path::PathBuf;

/// Prints `header first last size` for every record, one file after the other.
pub fn run_index(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let spans = fasta::index_file(path)?;
        if paths.len() > 1 {
            println!("# {}", path.display());
        }
        for span in &spans {
            println!("{}\t{}\t{}\t{}", span.header, span.first, span.last, span.size());
        }
    }
    Ok(())
}
