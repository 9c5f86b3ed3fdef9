//! Line-oriented formatter for the small markdown subset the agent emits in
//! summaries: headings, bullet and numbered items, blank lines and `**bold**`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Plain(String),
    Bold(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownLine {
    /// Level 1 to 3.
    Heading { level: u8, text: String },
    Bullet(Vec<InlineSpan>),
    Numbered(Vec<InlineSpan>),
    Blank,
    Paragraph(Vec<InlineSpan>),
}

pub fn format_markdown(text: &str) -> Vec<MarkdownLine> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> MarkdownLine {
    if let Some(rest) = line.strip_prefix("### ") {
        return heading(3, rest);
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return heading(2, rest);
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return heading(1, rest);
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return MarkdownLine::Bullet(format_inline(rest));
    }
    if let Some(rest) = strip_ordinal(line) {
        return MarkdownLine::Numbered(format_inline(rest));
    }
    if line.trim().is_empty() {
        return MarkdownLine::Blank;
    }
    MarkdownLine::Paragraph(format_inline(line))
}

fn heading(level: u8, text: &str) -> MarkdownLine {
    MarkdownLine::Heading {
        level,
        text: text.to_string(),
    }
}

/// Strips a leading `N.` followed by one whitespace character.
fn strip_ordinal(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}

/// Splits on non-greedy `**...**` pairs; odd segments are bold.
pub fn format_inline(text: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            spans.push(InlineSpan::Plain(rest[..open].to_string()));
        }
        spans.push(InlineSpan::Bold(after_open[..close].to_string()));
        rest = &after_open[close + 2..];
    }
    if !rest.is_empty() || spans.is_empty() {
        spans.push(InlineSpan::Plain(rest.to_string()));
    }
    spans
}

/// Flattens spans back into plain text, dropping bold markers.
pub fn plain_text(spans: &[InlineSpan]) -> String {
    spans
        .iter()
        .map(|span| match span {
            InlineSpan::Plain(text) | InlineSpan::Bold(text) => text.as_str(),
        })
        .collect()
}
