use std::borrow::Cow;

/// Escape a label value: backslash, double quote and newline.
pub fn escape_label_value(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

/// Escape HELP text: backslash and newline.
pub fn escape_help(help: &str) -> Cow<'_, str> {
    escape(help, false)
}

fn escape(s: &str, quote: bool) -> Cow<'_, str> {
    let needs = |c: char| c == '\\' || c == '\n' || (quote && c == '"');
    if !s.contains(needs) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' if quote => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
