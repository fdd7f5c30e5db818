//! HTML parsing utilities for structured notification bodies.

pub mod parser;

pub use parser::{repair_escaped_markup, DocumentParser, HtmlParser};
