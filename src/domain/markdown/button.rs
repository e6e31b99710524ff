//! `[!button|LABEL](URL)` call-to-action links.
//!
//! Renders as `<a href="URL" class="button">LABEL</a>` with both spans
//! HTML-escaped. Label and URL are flat scans: the label ends at the first
//! `]` and the URL at the first `)`.

use crate::domain::html::push_escaped;

use super::rules::{InlineMatch, InlineNode, InlineRule};

const PREFIX: &str = "[!button|";

/// Class attribute marking button anchors
pub const BUTTON_CLASS: &str = "button";

/// A parsed button with raw, unescaped spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonNode<'a> {
    pub label: &'a str,
    pub url: &'a str,
}

impl<'a> ButtonNode<'a> {
    /// Parse a button at the start of `input`, returning it with the number
    /// of bytes consumed (through the closing `)`)
    pub fn parse(input: &'a str) -> Option<(Self, usize)> {
        let rest = input.strip_prefix(PREFIX)?;
        let label_end = rest.find(']')?;
        let label = &rest[..label_end];

        let rest = rest[label_end + 1..].strip_prefix('(')?;
        let url_end = rest.find(')')?;
        let url = &rest[..url_end];

        let consumed = PREFIX.len() + label_end + 2 + url_end + 1;
        Some((Self { label, url }, consumed))
    }
}

impl InlineNode for ButtonNode<'_> {
    fn render_html(&self, out: &mut String) {
        out.push_str("<a href=\"");
        push_escaped(out, self.url);
        out.push_str("\" class=\"");
        out.push_str(BUTTON_CLASS);
        out.push_str("\">");
        push_escaped(out, self.label);
        out.push_str("</a>");
    }
}

/// Inline rule registering the button syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonRule;

impl InlineRule for ButtonRule {
    fn name(&self) -> &'static str {
        "button"
    }

    fn triggers(&self) -> &[u8] {
        b"["
    }

    fn parse<'a>(&self, input: &'a str) -> Option<InlineMatch<'a>> {
        let (node, consumed) = ButtonNode::parse(input)?;
        Some(InlineMatch {
            node: Box::new(node),
            consumed,
        })
    }
}
