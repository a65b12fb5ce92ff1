//! `livedoc-highlight` - print the line ranges an editor would decorate
//! when `prev` is replaced by `next`.
//!
//! Usage:
//!   livedoc-highlight [--config <file.toml>] <prev> <next>

use livedoc::cli::{highlight_texts, run, Invocation};

fn main() {
    run(|| {
        let inv = Invocation::parse(
            std::env::args().skip(1),
            2,
            "usage: livedoc-highlight [--config <file>] <prev> <next>",
        )?;
        highlight_texts(&inv.read(0)?, &inv.read(1)?, &inv.config)
    });
}
