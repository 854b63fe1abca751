//! CLI domain: parse and presentation only.
//! Orchestration lives in `scan`; the binary wires the two together.

mod parse;
mod presentation;

pub use parse::Cli;
pub use presentation::{format_summary_json, format_summary_text, SummaryFormat};
