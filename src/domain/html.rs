//! HTML escaping shared by the markdown emitter and the layout executor.

/// Append `input` to `out` with `&`, `<`, `>`, `"` and `'` replaced by entities.
pub fn push_escaped(out: &mut String, input: &str) {
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape_html(input: &str) -> String {
        let mut out = String::new();
        push_escaped(&mut out, input);
        out
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#"say "hi" 'now'"#), "say &quot;hi&quot; &#39;now&#39;");
    }

    #[test]
    fn test_escape_html_passthrough() {
        assert_eq!(escape_html("plain text ünïcode"), "plain text ünïcode");
        assert_eq!(escape_html(""), "");
    }
}
