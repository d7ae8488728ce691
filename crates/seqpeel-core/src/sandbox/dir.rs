//! Numbered job directories and the record files kept in them.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::scheduler::RunOutput;

const CMD_FILE: &str = ".cmd.txt";
const RETURNCODE_FILE: &str = ".returncode.txt";
const STDOUT_FILE: &str = ".stdout.txt";
const STDERR_FILE: &str = ".stderr.txt";

/// A job directory under the results root; removed on drop unless kept.
#[derive(Debug)]
pub struct SandboxDir {
    path: PathBuf,
    keep: bool,
}

impl SandboxDir {
    /// Creates `<root>/<n>` for the first free `n`. `create_dir` fails on an
    /// existing entry, so concurrent allocations never share a directory.
    pub fn create_numbered(root: &Path, keep: bool) -> Result<Self> {
        for index in 0u64.. {
            let path = root.join(index.to_string());
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path, keep }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("create sandbox {}", path.display()))
                }
            }
        }
        bail!("no free sandbox directory under {}", root.display())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_command(&self, command: &str) -> Result<()> {
        write_line(&self.path.join(CMD_FILE), command)
    }

    /// See [`unique_file_path`].
    pub fn unique_path(&self, name: &str, taken: &mut HashSet<String>) -> PathBuf {
        unique_file_path(&self.path, name, taken)
    }
}

/// Picks a file name inside `dir` that is neither in `taken` nor present on
/// disk: `name`, then `name_0`, `name_1`, ... The chosen name is added to `taken`.
pub fn unique_file_path(dir: &Path, name: &str, taken: &mut HashSet<String>) -> PathBuf {
    let mut candidate = name.to_string();
    let mut suffix = 0u64;
    while taken.contains(&candidate) || dir.join(&candidate).exists() {
        candidate = format!("{name}_{suffix}");
        suffix += 1;
    }
    let path = dir.join(&candidate);
    taken.insert(candidate);
    path
}

impl Drop for SandboxDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove sandbox directory"
                );
            }
        }
    }
}

/// Writes the exit code and captured streams next to the job's files.
pub fn write_outcome(dir: &Path, output: &RunOutput) -> Result<()> {
    let code = match (output.exit_code, output.timed_out) {
        (Some(code), _) => code.to_string(),
        (None, true) => "timeout".to_string(),
        (None, false) => "none".to_string(),
    };
    write_line(&dir.join(RETURNCODE_FILE), &code)?;
    write_line(&dir.join(STDOUT_FILE), &output.stdout)?;
    write_line(&dir.join(STDERR_FILE), &output.stderr)?;
    Ok(())
}

fn write_line(path: &Path, text: &str) -> Result<()> {
    fs::write(path, format!("{text}\n")).with_context(|| format!("write {}", path.display()))
}
