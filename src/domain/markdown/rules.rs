//! Pluggable inline rules for the markdown converter.
//!
//! A rule is a trigger byte set, a parse step producing a node, and the
//! node's HTML emitter. Rules are registered in priority order; the first
//! rule that parses at a position wins, and a rule that declines leaves the
//! input to the engine's ordinary link and text handling.

/// A node produced by an inline rule, rendered straight to HTML
pub trait InlineNode {
    /// Append the node's HTML to `out`
    fn render_html(&self, out: &mut String);
}

/// A successful inline parse
pub struct InlineMatch<'a> {
    /// Parsed node, borrowing from the markdown source
    pub node: Box<dyn InlineNode + 'a>,

    /// Number of bytes consumed from the start of the input
    pub consumed: usize,
}

/// An inline syntax extension.
///
/// Trigger bytes must be ASCII.
pub trait InlineRule: Send + Sync {
    /// Rule name for diagnostics
    fn name(&self) -> &'static str;

    /// Bytes that can start a match
    fn triggers(&self) -> &[u8];

    /// Try to parse at the start of `input`.
    ///
    /// Returns `None` to decline; declining must have no side effects.
    fn parse<'a>(&self, input: &'a str) -> Option<InlineMatch<'a>>;
}
