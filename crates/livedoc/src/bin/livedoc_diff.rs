//! `livedoc-diff` - print the changed line ranges between two files.
//!
//! Usage:
//!   livedoc-diff [--config <file.toml>] <prev> <next>

use livedoc::cli::{diff_texts, run, Invocation};

fn main() {
    run(|| {
        let inv = Invocation::parse(std::env::args().skip(1), 2, "usage: livedoc-diff [--config <file>] <prev> <next>")?;
        diff_texts(&inv.read(0)?, &inv.read(1)?, &inv.config)
    });
}
