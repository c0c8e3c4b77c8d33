//! Reply sectioning and HTML-to-terminal rendering.
//!
//! [`format_response`] splits a model reply on blank lines and turns the four
//! tutoring sections into markdown headings. Two heading styles are
//! recognized:
//!
//! - the literal `Label:` prefix, e.g. `Intuition:\n...`;
//! - a decorated first line as models tend to write when asked for numbered
//!   subheadings, e.g. `### 1. Intuition` or `**3. Example In Tabular Format**`.
//!   The line counts as a heading only when nothing but the label, the
//!   prompt's qualifier wording, or a `:` with inline text follows it, so a
//!   numbered sentence such as `1. Approach it greedily` stays prose.
//!
//! Recognized sections are emitted under their canonical label. Everything
//! else passes through unchanged apart from trimming.

use std::sync::LazyLock;

use regex::Regex;

/// The tutoring sections the formatter knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Intuition,
    ApproachDiscussion,
    Example,
    TimeSpaceComplexity,
}

impl Heading {
    pub const ALL: [Heading; 4] = [
        Heading::Intuition,
        Heading::ApproachDiscussion,
        Heading::Example,
        Heading::TimeSpaceComplexity,
    ];

    /// Display label used in the rendered heading.
    pub fn label(self) -> &'static str {
        match self {
            Heading::Intuition => "Intuition",
            Heading::ApproachDiscussion => "Approach Discussion",
            Heading::Example => "Example",
            Heading::TimeSpaceComplexity => "Time & Space Complexity",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Heading::Intuition => "Intuition:",
            Heading::ApproachDiscussion => "Approach Discussion:",
            Heading::Example => "Example:",
            Heading::TimeSpaceComplexity => "Time & Space Complexity:",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Heading::Intuition => &["intuition"],
            Heading::ApproachDiscussion => &["approach discussion", "approach"],
            Heading::Example => &["example"],
            Heading::TimeSpaceComplexity => &["time & space complexity", "time and space complexity"],
        }
    }

    /// Wording the tutoring prompt attaches to a heading, e.g.
    /// "Example In Tabular Format".
    fn qualifiers(self) -> &'static [&'static str] {
        match self {
            Heading::ApproachDiscussion => &[
                "in points with subpoints using example for each approach",
                "in points with subpoints",
                "in points",
            ],
            Heading::Example => &["in tabular format", "in table format"],
            Heading::Intuition | Heading::TimeSpaceComplexity => &[],
        }
    }

    /// Match a heading label at the start of `text`, returning the heading
    /// and any text after a `:` on the same line. A label followed by
    /// ordinary prose is not a heading.
    fn matching(text: &str) -> Option<(Heading, &str)> {
        Heading::ALL.into_iter().find_map(|heading| {
            heading.aliases().iter().find_map(|alias| {
                let rest = strip_prefix_ignore_case(text, alias)?;
                heading.remainder(rest).map(|inline| (heading, inline))
            })
        })
    }

    fn remainder(self, rest: &str) -> Option<&str> {
        let mut rest = rest.trim_start();
        if let Some(after) = self
            .qualifiers()
            .iter()
            .find_map(|q| strip_prefix_ignore_case(rest, q))
        {
            rest = after;
        }

        let rest = rest.trim_start_matches(is_decoration);
        if rest.is_empty() {
            return Some("");
        }
        rest.strip_prefix(':')
            .map(|inline| inline.trim_start_matches(is_decoration).trim_end())
    }
}

fn is_decoration(c: char) -> bool {
    c == '*' || c.is_whitespace()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Re-emit `response` with recognized sections under markdown headings.
///
/// ```
/// use leetcode_tutor::format::format_response;
///
/// let out = format_response("Intuition:\nfoo\n\nsomething else");
/// assert_eq!(out, "## **Intuition**\nfoo\n\nsomething else\n\n");
/// ```
pub fn format_response(response: &str) -> String {
    let mut formatted = String::new();
    for section in response.split("\n\n") {
        match split_heading(section) {
            Some((heading, body)) => {
                formatted.push_str("## **");
                formatted.push_str(heading.label());
                formatted.push_str("**\n");
                formatted.push_str(body.trim());
            }
            None => formatted.push_str(section.trim()),
        }
        formatted.push_str("\n\n");
    }
    formatted
}

/// Recognize a section heading and return the heading plus the body text.
pub fn split_heading(section: &str) -> Option<(Heading, String)> {
    let section = section.trim_start();

    for heading in Heading::ALL {
        if let Some(body) = section.strip_prefix(heading.prefix()) {
            return Some((heading, body.to_string()));
        }
    }

    let (first, rest) = section.split_once('\n').unwrap_or((section, ""));
    // "**Intuition:** text" keeps its inline text as the start of the body.
    let (heading, inline) = decorated_heading_text(first).and_then(Heading::matching)?;
    let body = match (inline.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => inline.to_string(),
        (false, false) => format!("{inline}\n{rest}"),
    };
    Some((heading, body))
}

/// The text of a markdown-ish heading line, or `None` when the line carries
/// no heading decoration (`#`, `**`, or `N.` / `N)` numbering).
fn decorated_heading_text(line: &str) -> Option<&str> {
    let mut text = line.trim();
    let mut decorated = false;

    if text.starts_with('#') {
        text = text.trim_start_matches('#').trim_start();
        decorated = true;
    }
    if let Some(rest) = text.strip_prefix("**") {
        text = rest.trim_start();
        decorated = true;
    }
    if let Some(rest) = strip_numbering(text) {
        text = rest;
        decorated = true;
    }
    if let Some(rest) = text.strip_prefix("**") {
        text = rest.trim_start();
        decorated = true;
    }

    decorated.then_some(text)
}

fn strip_numbering(text: &str) -> Option<&str> {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == text.len() {
        return None;
    }
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
}

// ── HTML rendering ─────────────────────────────────────────────────

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|pre|ul|ol|br)\b[^>]*>").expect("block tag pattern compiles")
});

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("list item pattern compiles"));

static SUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<sup\b[^>]*>").expect("sup pattern compiles"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("blank run pattern compiles"));

/// Render an HTML problem statement as plain terminal text.
pub fn html_to_text(html: &str) -> String {
    let text = BLOCK_TAG_RE.replace_all(html, "\n");
    let text = LIST_ITEM_RE.replace_all(&text, "\n- ");
    let text = SUP_RE.replace_all(&text, "^");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|([a-zA-Z]+));")
        .expect("entity pattern compiles")
});

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "nbsp" => ' ',
        "lt" => '<',
        "gt" => '>',
        "le" => '≤',
        "ge" => '≥',
        "ne" => '≠',
        "times" => '×',
        "minus" => '−',
        "rarr" => '→',
        "hellip" => '…',
        "quot" => '"',
        "apos" => '\'',
        "amp" => '&',
        _ => return None,
    })
}

/// Decode character references in one pass, so "&amp;lt;" becomes "&lt;".
/// Unknown or invalid references are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
