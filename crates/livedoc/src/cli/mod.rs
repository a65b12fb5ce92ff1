//! Core logic behind the `livedoc-*` binaries.
//!
//! - `livedoc-diff <prev> <next>`: changed line ranges as JSON
//! - `livedoc-merge <base> <local> <server>`: merged text, or conflicts
//! - `livedoc-highlight <prev> <next>`: decorated ranges as JSON
//!
//! Each accepts `--config <file.toml>` anywhere on the command line.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::highlight::plan_highlight;
use crate::line_diff::diff_lines_with;
use crate::merge::three_way_merge_with;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parsed command line: positional file arguments plus the engine config.
#[derive(Debug)]
pub struct Invocation {
    pub files: Vec<PathBuf>,
    pub config: EngineConfig,
}

impl Invocation {
    /// Split `--config <path>` from the positional arguments and require
    /// exactly `expected` of the latter.
    pub fn parse(args: impl IntoIterator<Item = String>, expected: usize, usage: &str) -> Result<Self, CliError> {
        let mut files = Vec::new();
        let mut config = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--config needs a file".to_string()))?;
                config = Some(EngineConfig::load(path)?);
            } else {
                files.push(PathBuf::from(arg));
            }
        }
        if files.len() != expected {
            return Err(CliError::Usage(usage.to_string()));
        }
        Ok(Self {
            files,
            config: config.unwrap_or_default(),
        })
    }

    pub fn read(&self, index: usize) -> Result<String, CliError> {
        read_file(&self.files[index])
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the stderr `tracing` subscriber (`RUST_LOG`, default `livedoc=info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("livedoc=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Changed-line ranges of `next` against `prev`, as a JSON array.
pub fn diff_texts(prev: &str, next: &str, config: &EngineConfig) -> Result<String, CliError> {
    Ok(serde_json::to_string(&diff_lines_with(prev, next, &config.diff))?)
}

/// Merged text, or [`EngineError::MergeConflict`].
pub fn merge_texts(base: &str, local: &str, server: &str, config: &EngineConfig) -> Result<String, CliError> {
    let outcome = three_way_merge_with(base, local, server, None, &config.ignored())?;
    Ok(outcome.into_result()?)
}

/// Decorated ranges as a JSON array; empty when nothing should be flagged.
pub fn highlight_texts(prev: &str, next: &str, config: &EngineConfig) -> Result<String, CliError> {
    let decorated = plan_highlight(prev, next, config)
        .map(|h| h.decorated)
        .unwrap_or_default();
    Ok(serde_json::to_string(&decorated)?)
}

/// Run `f`, print its output to stdout, or the error to stderr with exit 1.
pub fn run(f: impl FnOnce() -> Result<String, CliError>) {
    init_logging();
    match f() {
        Ok(out) => println!("{out}"),
        Err(CliError::Engine(EngineError::MergeConflict { paths })) => {
            for path in paths {
                eprintln!("conflict: {path}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn invocation_positional() {
        let inv = Invocation::parse(args(&["a", "b"]), 2, "usage").unwrap();
        assert_eq!(inv.files, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(inv.config, EngineConfig::default());
    }

    #[test]
    fn invocation_wrong_arity() {
        let err = Invocation::parse(args(&["a"]), 2, "usage: x a b").unwrap_err();
        assert_eq!(err.to_string(), "usage: x a b");
    }

    #[test]
    fn invocation_missing_config_value() {
        let err = Invocation::parse(args(&["a", "--config"]), 1, "usage").unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn invocation_unreadable_config() {
        let err = Invocation::parse(args(&["--config", "/nonexistent/livedoc.toml", "a"]), 1, "usage").unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::Config(_))));
    }

    #[test]
    fn diff_output_is_json() {
        let out = diff_texts("a\nb", "a\nc", &EngineConfig::default()).unwrap();
        assert_eq!(out, r#"[{"startLine":2,"endLine":2}]"#);
    }

    #[test]
    fn merge_output() {
        let config = EngineConfig::default();
        assert_eq!(merge_texts("a: 1\nb: 1\n", "a: 2\nb: 1\n", "a: 1\nb: 3\n", &config).unwrap(), "a: 2\nb: 3\n");
        let err = merge_texts("a: 1\n", "a: 2\n", "a: 3\n", &config).unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::MergeConflict { .. })));
    }

    #[test]
    fn highlight_output_empty_when_suppressed() {
        let out = highlight_texts("status: {a: 1}\n", "status: {a: 2}\n", &EngineConfig::default()).unwrap();
        assert_eq!(out, "[]");
    }
}
