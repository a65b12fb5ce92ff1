//! `livedoc-merge` - three-way merge of single-document YAML/JSON files.
//!
//! Usage:
//!   livedoc-merge [--config <file.toml>] <base> <local> <server>
//!
//! Prints the merged document in the local file's format. On conflict the
//! conflicting paths go to stderr and the exit code is 1.

use livedoc::cli::{merge_texts, run, Invocation};

fn main() {
    run(|| {
        let inv = Invocation::parse(
            std::env::args().skip(1),
            3,
            "usage: livedoc-merge [--config <file>] <base> <local> <server>",
        )?;
        merge_texts(&inv.read(0)?, &inv.read(1)?, &inv.read(2)?, &inv.config)
    });
}
