//! The input set of one experiment: reduced FASTA files plus declared outputs.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::fasta::load_fragments;
use crate::fragments::{FragmentList, Mask};

/// One input file as named on the command line, with its reduced records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub fragments: FragmentList,
}

impl InputFile {
    pub fn size(&self) -> u64 {
        self.fragments.length()
    }

    /// Base name used for the sandbox copy.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input.fa".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperimentContent {
    inputs: Vec<InputFile>,
    outputs: Vec<PathBuf>,
}

impl ExperimentContent {
    pub fn new(inputs: Vec<InputFile>, outputs: Vec<PathBuf>) -> Self {
        Self { inputs, outputs }
    }

    /// Indexes every input path into a fresh, unreduced content.
    pub fn load(paths: &[PathBuf], outputs: Vec<PathBuf>) -> Result<Self> {
        let inputs = paths
            .iter()
            .map(|path| {
                Ok(InputFile {
                    path: path.clone(),
                    fragments: load_fragments(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(inputs, outputs))
    }

    pub fn inputs(&self) -> &[InputFile] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Bytes of sequence across all inputs.
    pub fn size(&self) -> u64 {
        self.inputs.iter().map(InputFile::size).sum()
    }

    /// Positions still under reduction across all inputs.
    pub fn masked_len(&self) -> u64 {
        self.inputs.iter().map(|i| i.fragments.masked_len()).sum()
    }

    /// Inputs reordered by descending size; equal sizes keep their order.
    pub fn sorted_by_size_desc(&self) -> Self {
        let mut inputs = self.inputs.clone();
        inputs.sort_by(|a, b| b.size().cmp(&a.size()));
        Self::new(inputs, self.outputs.clone())
    }

    /// Content without input `index`, and the path of the removed input.
    pub fn without_input(&self, index: usize) -> Option<(Self, &Path)> {
        let removed = self.inputs.get(index)?;
        let mut inputs = self.inputs.clone();
        inputs.remove(index);
        Some((Self::new(inputs, self.outputs.clone()), removed.path.as_path()))
    }

    /// Content with input `index` reduced to `fragments`.
    pub fn with_fragments(&self, index: usize, fragments: FragmentList) -> Self {
        let mut next = self.clone();
        if let Some(input) = next.inputs.get_mut(index) {
            input.fragments = fragments;
        }
        next
    }

    /// The largest mask of any input with its file index. Ties go to the
    /// earlier file, then to the lower start.
    pub fn largest_mask(&self) -> Option<(usize, Mask)> {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(i, input)| input.fragments.largest_mask().map(|m| (i, m)))
            .fold(None, |best: Option<(usize, Mask)>, (i, m)| match best {
                Some((bi, bm)) if bm.size() >= m.size() => Some((bi, bm)),
                _ => Some((i, m)),
            })
    }
}
