//! Whitespace-token rewriting of the user command line.
//!
//! A token names a path either as a whole (`a.fa`) or as the value of a
//! `key=value` pair (`in=a.fa`). Rewritten commands are re-joined with
//! single spaces.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Command with its input and output paths made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub command: String,
    /// Canonical input paths, in the order given.
    pub inputs: Vec<PathBuf>,
    /// Absolute output paths, in the order given.
    pub outputs: Vec<PathBuf>,
}

fn rewrite_tokens<F>(command: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    command
        .split_whitespace()
        .filter_map(|token| {
            if let Some(replacement) = rewrite(token) {
                return (!replacement.is_empty()).then_some(replacement);
            }
            match token.split_once('=') {
                Some((key, value)) if !value.is_empty() => match rewrite(value) {
                    Some(r) if r.is_empty() => None,
                    Some(r) => Some(format!("{key}={r}")),
                    None => Some(token.to_string()),
                },
                _ => Some(token.to_string()),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops every token naming `path`.
pub fn remove_path_tokens(command: &str, path: &Path) -> String {
    let path = path.to_string_lossy();
    rewrite_tokens(command, |token| (token == path).then(String::new))
}

/// Replaces every token naming one of the `from` paths with its `to` path.
pub fn substitute_paths(command: &str, substitutions: &[(PathBuf, PathBuf)]) -> String {
    rewrite_tokens(command, |token| {
        substitutions
            .iter()
            .find(|(from, _)| from.as_os_str() == token)
            .map(|(_, to)| to.to_string_lossy().into_owned())
    })
}

/// Makes the command independent of the working directory.
///
/// Input tokens become the canonical path of their file, output tokens
/// become absolute, and any other token naming an existing relative path
/// (a reference database, a script) is made absolute as well.
pub fn absolutize(
    command: &str,
    inputs: &[PathBuf],
    outputs: &[PathBuf],
    cwd: &Path,
) -> Result<CommandTemplate> {
    let canonical_inputs = inputs
        .iter()
        .map(|p| {
            std::fs::canonicalize(cwd.join(p))
                .with_context(|| format!("resolve input {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let absolute_outputs: Vec<PathBuf> = outputs.iter().map(|p| cwd.join(p)).collect();

    let rewritten = rewrite_tokens(command, |token| {
        let as_path = Path::new(token);
        if let Some(i) = inputs.iter().position(|p| p.as_path() == as_path) {
            return Some(canonical_inputs[i].to_string_lossy().into_owned());
        }
        if let Some(i) = outputs.iter().position(|p| p.as_path() == as_path) {
            return Some(absolute_outputs[i].to_string_lossy().into_owned());
        }
        if as_path.is_relative() && cwd.join(as_path).exists() {
            return Some(cwd.join(as_path).to_string_lossy().into_owned());
        }
        None
    });

    Ok(CommandTemplate {
        command: rewritten,
        inputs: canonical_inputs,
        outputs: absolute_outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_plain_and_keyed_tokens() {
        let cmd = "tool  /d/a.fa in=/d/a.fa /d/b.fa";
        assert_eq!(
            remove_path_tokens(cmd, Path::new("/d/a.fa")),
            "tool /d/b.fa"
        );
    }

    #[test]
    fn remove_leaves_prefixes_alone() {
        assert_eq!(
            remove_path_tokens("cat /d/a.fa.bak /d/a.fa", Path::new("/d/a.fa")),
            "cat /d/a.fa.bak"
        );
    }

    #[test]
    fn substitute_rewrites_all_occurrences() {
        let subs = vec![
            (PathBuf::from("/d/a.fa"), PathBuf::from("/r/0/a.fa")),
            (PathBuf::from("/d/out.txt"), PathBuf::from("/r/0/out.txt")),
        ];
        assert_eq!(
            substitute_paths("tool /d/a.fa -o=/d/out.txt && cat /d/a.fa", &subs),
            "tool /r/0/a.fa -o=/r/0/out.txt && cat /r/0/a.fa"
        );
    }

    #[test]
    fn absolutize_resolves_inputs_outputs_and_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::write(cwd.join("a.fa"), ">a\nA\n").unwrap();
        std::fs::write(cwd.join("ref.db"), "x").unwrap();
        let input = cwd.join("a.fa");

        let t = absolutize(
            "tool a.fa --db ref.db -o out.txt -q",
            &[input.clone()],
            &[PathBuf::from("out.txt")],
            &cwd,
        )
        .unwrap();

        // The input token is relative, so it is resolved as an existing path.
        let expected = format!(
            "tool {} --db {} -o {} -q",
            input.display(),
            cwd.join("ref.db").display(),
            cwd.join("out.txt").display()
        );
        assert_eq!(t.command, expected);
        assert_eq!(t.inputs, vec![input]);
        assert_eq!(t.outputs, vec![cwd.join("out.txt")]);
    }

    #[test]
    fn absolutize_fails_on_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.fa");
        assert!(absolutize("cat none.fa", &[missing], &[], dir.path()).is_err());
    }
}
