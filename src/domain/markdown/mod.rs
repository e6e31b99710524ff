//! Markdown conversion for template bodies.
//!
//! This module provides:
//! - `MarkdownConverter`: a shared pulldown-cmark converter with an ordered
//!   inline rule pipeline
//! - `InlineRule` / `InlineNode`: the extension points for custom syntax
//! - `ButtonRule`: the `[!button|LABEL](URL)` call-to-action syntax

mod button;
mod converter;
mod rules;

pub use button::{ButtonNode, ButtonRule, BUTTON_CLASS};
pub use converter::MarkdownConverter;
pub use rules::{InlineMatch, InlineNode, InlineRule};
