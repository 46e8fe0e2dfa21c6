//! Messaging-extension ticket search service.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

mod cli;

fn main() {
    cli::run();
}
