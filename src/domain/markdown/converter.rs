//! Markdown to HTML conversion with inline rule support.

use std::ops::Range;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use super::button::ButtonRule;
use super::rules::{InlineMatch, InlineRule};

/// Shared markdown converter.
///
/// Built once with its rule pipeline and reused for every call; `to_html`
/// takes `&self` and keeps no state between calls.
pub struct MarkdownConverter {
    options: Options,
    rules: Vec<Box<dyn InlineRule>>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with the built-in button rule
    pub fn new() -> Self {
        Self::with_rules(vec![Box::new(ButtonRule)])
    }

    /// Create a converter with a custom rule pipeline, highest priority first
    pub fn with_rules(rules: Vec<Box<dyn InlineRule>>) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options, rules }
    }

    /// Names of the registered rules, in priority order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Convert markdown to an HTML fragment
    pub fn to_html(&self, markdown: &str) -> String {
        let mut events: Vec<Event<'_>> = Vec::new();
        let mut run = TextRun::default();
        // Depth of code blocks, links and images; rules never run inside them
        let mut opaque = 0usize;

        let mut parser = Parser::new_ext(markdown, self.options).into_offset_iter();
        while let Some((event, range)) = parser.next() {
            if opaque == 0 {
                if let Event::Text(text) = &event {
                    run.push(text, range);
                    continue;
                }
            }
            self.flush_text(markdown, &mut run, &mut events);

            match event {
                Event::Start(Tag::Link { .. }) if opaque == 0 => {
                    let span = &markdown[range.clone()];
                    if let Some(matched) = self.match_at(span) {
                        // Drop the engine's rendition of the link
                        for (inner, _) in parser.by_ref() {
                            if matches!(inner, Event::End(TagEnd::Link)) {
                                break;
                            }
                        }
                        events.push(render_match(&matched));
                        run.push(
                            &span[matched.consumed..],
                            range.start + matched.consumed..range.end,
                        );
                        continue;
                    }
                    opaque += 1;
                    events.push(event);
                }
                Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                    opaque += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                    opaque = opaque.saturating_sub(1);
                    events.push(event);
                }
                // Raw HTML in the source is shown as text, never passed through
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                other => events.push(other),
            }
        }
        self.flush_text(markdown, &mut run, &mut events);

        let mut output = String::with_capacity(markdown.len() + markdown.len() / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }

    fn match_at<'a>(&self, input: &'a str) -> Option<InlineMatch<'a>> {
        let first = *input.as_bytes().first()?;
        self.rules
            .iter()
            .filter(|rule| rule.triggers().contains(&first))
            .find_map(|rule| rule.parse(input))
    }

    fn is_trigger(&self, byte: u8) -> bool {
        self.rules.iter().any(|rule| rule.triggers().contains(&byte))
    }

    /// Match a rule at `pos` of a text run, only where the matched text was
    /// written literally in the source.
    ///
    /// Backslash escapes and character references decode to trigger bytes
    /// too, and those must stay plain text.
    fn match_literal<'a>(
        &self,
        markdown: &str,
        run: &'a TextRun,
        pos: usize,
    ) -> Option<InlineMatch<'a>> {
        let offset = run.source_offset(markdown, pos)?;
        if is_escaped(markdown, offset) {
            return None;
        }
        let matched = self.match_at(&run.text[pos..])?;
        let decoded = &run.text[pos..pos + matched.consumed];
        (markdown.get(offset..offset + matched.consumed)? == decoded).then_some(matched)
    }

    /// Emit a run of merged text, splitting it around rule matches
    fn flush_text(&self, markdown: &str, run: &mut TextRun, events: &mut Vec<Event<'_>>) {
        if run.text.is_empty() {
            return;
        }
        let run = std::mem::take(run);
        let text = run.text.as_str();
        let bytes = text.as_bytes();

        let mut plain_start = 0;
        let mut cursor = 0;
        while cursor < bytes.len() {
            // Trigger bytes are ASCII, so `cursor` is on a char boundary here
            if self.is_trigger(bytes[cursor]) {
                if let Some(matched) = self.match_literal(markdown, &run, cursor) {
                    if plain_start < cursor {
                        events.push(Event::Text(CowStr::from(text[plain_start..cursor].to_string())));
                    }
                    events.push(render_match(&matched));
                    cursor += matched.consumed.max(1);
                    plain_start = cursor;
                    continue;
                }
            }
            cursor += 1;
        }

        if plain_start < bytes.len() {
            events.push(Event::Text(CowStr::from(text[plain_start..].to_string())));
        }
    }
}

/// Adjacent text events merged into one string, with the source range each
/// piece was decoded from
#[derive(Default)]
struct TextRun {
    text: String,
    pieces: Vec<(usize, Range<usize>)>,
}

impl TextRun {
    fn push(&mut self, text: &str, source: Range<usize>) {
        self.pieces.push((self.text.len(), source));
        self.text.push_str(text);
    }

    /// Source offset of byte `pos`, when its piece is a verbatim copy of the source
    fn source_offset(&self, markdown: &str, pos: usize) -> Option<usize> {
        let index = self
            .pieces
            .partition_point(|(start, _)| *start <= pos)
            .checked_sub(1)?;
        let (start, source) = &self.pieces[index];
        let end = self
            .pieces
            .get(index + 1)
            .map_or(self.text.len(), |(next, _)| *next);

        if markdown.get(source.clone())? != &self.text[*start..end] {
            return None;
        }
        Some(source.start + (pos - start))
    }
}

/// Whether the byte at `offset` follows an odd number of backslashes
fn is_escaped(markdown: &str, offset: usize) -> bool {
    let backslashes = markdown.as_bytes()[..offset]
        .iter()
        .rev()
        .take_while(|&&byte| byte == b'\\')
        .count();
    backslashes % 2 == 1
}

fn render_match(matched: &InlineMatch<'_>) -> Event<'static> {
    let mut html = String::new();
    matched.node.render_html(&mut html);
    Event::InlineHtml(CowStr::from(html))
}
