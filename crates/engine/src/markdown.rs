//! Markdown to HTML for generated lore.
//!
//! Model output is loosely formatted markdown: a few bullet points, the odd
//! header or bold phrase. This renderer handles that subset and nothing more.
//!
//! Block constructs are resolved before inline ones. Fenced code blocks and
//! inline code spans are HTML-escaped and swapped for opaque tokens as soon
//! as they are recognized, so no later pass can rewrite their contents. The
//! tokens are restored at the very end; token delimiters already present in
//! the input are dropped first. Everything else is passed through
//! unescaped: the text comes from the configured model, not from players.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)([ \t]*\n)?(.*?)```").expect("valid regex"));
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static BOLD_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b__(.+?)__\b").expect("valid regex"));
static ITALIC_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("valid regex"));
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\n]+?)_\b").expect("valid regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid regex"));
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("valid regex"));

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// Render model output to HTML. Empty or blank input renders to `""`.
pub fn render(text: &str) -> String {
    let text = strip_token_delimiters(text);
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut shield = Shield::default();
    let text = shield.fenced_code(text);
    let html = render_blocks(&text);
    let html = shield.inline_code(&html);
    let html = render_emphasis(&html);
    let html = render_links(&html);
    shield.restore(&html)
}

/// Lightweight variant: inline formatting plus bullet items, one paragraph
/// per remaining line. No headers, numbered lists or fenced code.
pub fn render_simple(text: &str) -> String {
    let text = strip_token_delimiters(text);
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut shield = Shield::default();
    let text = shield.inline_code(text);
    let text = render_emphasis(&text);

    let mut html = String::new();
    let mut in_list = false;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match bullet_item(line) {
            Some(item) => {
                if !in_list {
                    html.push_str("<ul>");
                    in_list = true;
                }
                html.push_str(&format!("<li>{item}</li>"));
            }
            None => {
                if in_list {
                    html.push_str("</ul>");
                    in_list = false;
                }
                html.push_str(&format!("<p>{line}</p>"));
            }
        }
    }
    if in_list {
        html.push_str("</ul>");
    }

    shield.restore(&html)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// Code shielding
// =============================================================================

fn strip_token_delimiters(text: &str) -> String {
    text.replace(&[TOKEN_OPEN, TOKEN_CLOSE][..], "")
}

/// Rendered code fragments, addressed by the tokens left in their place.
#[derive(Default)]
struct Shield {
    fragments: Vec<String>,
}

impl Shield {
    fn token(&mut self, html: String) -> String {
        self.fragments.push(html);
        format!("{TOKEN_OPEN}{}{TOKEN_CLOSE}", self.fragments.len() - 1)
    }

    /// Replace fenced blocks with a token on a line of its own.
    ///
    /// Without a newline after the opening fence there is no language tag:
    /// ```` ```x``` ```` is the code `x`.
    fn fenced_code(&mut self, text: &str) -> String {
        FENCED_CODE_RE
            .replace_all(text, |caps: &Captures| {
                let code = if caps.get(2).is_some() {
                    caps[3].to_string()
                } else {
                    format!("{}{}", &caps[1], &caps[3])
                };
                let html = format!("<pre><code>{}</code></pre>", escape_html(&code));
                format!("\n{}\n", self.token(html))
            })
            .into_owned()
    }

    fn inline_code(&mut self, text: &str) -> String {
        INLINE_CODE_RE
            .replace_all(text, |caps: &Captures| {
                let html = format!("<code>{}</code>", escape_html(&caps[1]));
                self.token(html)
            })
            .into_owned()
    }

    fn restore(&self, html: &str) -> String {
        TOKEN_RE
            .replace_all(html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.fragments.get(index))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

fn is_block_token(line: &str) -> bool {
    line.strip_prefix(TOKEN_OPEN)
        .and_then(|rest| rest.strip_suffix(TOKEN_CLOSE))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

// =============================================================================
// Blocks
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Headers, lists and paragraphs, one output block per line.
fn render_blocks(text: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut list: Option<(ListKind, Vec<String>)> = None;

    for raw in text.lines() {
        let line = raw.trim();

        if let Some((kind, item)) = list_item(line) {
            let continues = matches!(&list, Some((current, _)) if *current == kind);
            if !continues {
                close_list(&mut list, &mut blocks);
            }
            list.get_or_insert_with(|| (kind, Vec::new()))
                .1
                .push(item.to_string());
            continue;
        }

        close_list(&mut list, &mut blocks);

        if line.is_empty() {
            continue;
        }
        if is_block_token(line) {
            blocks.push(line.to_string());
        } else if let Some((level, content)) = header(raw) {
            blocks.push(format!("<h{level}>{content}</h{level}>"));
        } else {
            blocks.push(format!("<p>{line}</p>"));
        }
    }
    close_list(&mut list, &mut blocks);

    blocks.join("\n")
}

fn close_list(list: &mut Option<(ListKind, Vec<String>)>, blocks: &mut Vec<String>) {
    if let Some((kind, items)) = list.take() {
        let tag = kind.tag();
        let items: String = items.iter().map(|item| format!("<li>{item}</li>")).collect();
        blocks.push(format!("<{tag}>{items}</{tag}>"));
    }
}

/// `# Title` through `###### Title`. Seven or more `#` is not a header.
fn header(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let content = rest.trim();
    (!content.is_empty()).then_some((level, content))
}

fn list_item(line: &str) -> Option<(ListKind, &str)> {
    if let Some(item) = bullet_item(line) {
        return Some((ListKind::Unordered, item));
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    marker_content(line[digits..].strip_prefix('.')?).map(|item| (ListKind::Ordered, item))
}

fn bullet_item(line: &str) -> Option<&str> {
    ['•', '-', '*']
        .into_iter()
        .find_map(|marker| line.strip_prefix(marker))
        .and_then(marker_content)
}

/// Text after a list marker: at least one space, then something.
fn marker_content(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let content = rest.trim();
    (!content.is_empty()).then_some(content)
}

// =============================================================================
// Inline
// =============================================================================

fn render_emphasis(text: &str) -> String {
    let text = BOLD_STAR_RE.replace_all(text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR_RE.replace_all(&text, "<em>$1</em>");
    ITALIC_UNDERSCORE_RE
        .replace_all(&text, "<em>$1</em>")
        .into_owned()
}

fn render_links(text: &str) -> String {
    LINK_RE
        .replace_all(text, r#"<a href="$2">$1</a>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render(""), "");
        assert_eq!(render("  \n\n "), "");
        assert_eq!(render_simple(""), "");
    }

    #[test]
    fn fenced_code_is_escaped_and_left_literal() {
        let html = render("```\n**not bold** <b>\n```");
        assert_eq!(html, "<pre><code>**not bold** &lt;b&gt;\n</code></pre>");
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn fenced_code_language_tag_is_dropped() {
        assert_eq!(
            render("```rust\nlet x = 1;```"),
            "<pre><code>let x = 1;</code></pre>"
        );
    }

    #[test]
    fn single_line_fence_keeps_its_code() {
        assert_eq!(render("```x```"), "<pre><code>x</code></pre>");
        assert_eq!(
            render("```let y = 2;```"),
            "<pre><code>let y = 2;</code></pre>"
        );
    }

    #[test]
    fn token_delimiters_in_input_are_not_expanded() {
        assert_eq!(render("\u{E000}0\u{E001} literal"), "<p>0 literal</p>");
        assert_eq!(
            render("`a` then \u{E000}0\u{E001}"),
            "<p><code>a</code> then 0</p>"
        );
        assert_eq!(render_simple("`a` \u{E000}0\u{E001}"), "<p><code>a</code> 0</p>");
    }

    #[test]
    fn bullet_run_becomes_one_list() {
        assert_eq!(
            render("- a\n- b\n- c"),
            "<ul><li>a</li><li>b</li><li>c</li></ul>"
        );
    }

    #[test]
    fn switching_marker_kind_starts_a_new_list() {
        assert_eq!(render("- a\n1. b"), "<ul><li>a</li></ul>\n<ol><li>b</li></ol>");
    }

    #[test]
    fn all_bullet_markers_are_accepted() {
        assert_eq!(
            render("• one\n* two\n- three"),
            "<ul><li>one</li><li>two</li><li>three</li></ul>"
        );
    }

    #[test]
    fn list_is_closed_by_a_paragraph() {
        assert_eq!(
            render("1. first\n2. second\nAfterwards"),
            "<ol><li>first</li><li>second</li></ol>\n<p>Afterwards</p>"
        );
    }

    #[test]
    fn header_levels() {
        assert_eq!(render("### Title"), "<h3>Title</h3>");
        assert_eq!(render("# Top"), "<h1>Top</h1>");
        assert_eq!(render("###### Six"), "<h6>Six</h6>");
    }

    #[test]
    fn seven_hashes_is_a_paragraph() {
        assert_eq!(render("####### Title"), "<p>####### Title</p>");
        assert_eq!(render("#Title"), "<p>#Title</p>");
    }

    #[test]
    fn paragraphs_one_per_line() {
        assert_eq!(render("one\n\ntwo\nthree"), "<p>one</p>\n<p>two</p>\n<p>three</p>");
    }

    #[test]
    fn inline_formatting() {
        assert_eq!(
            render("**bold** and *italic* and __also__ and _this_"),
            "<p><strong>bold</strong> and <em>italic</em> and <strong>also</strong> and <em>this</em></p>"
        );
    }

    #[test]
    fn snake_case_is_not_italic() {
        assert_eq!(render("use cold_iron_weapon"), "<p>use cold_iron_weapon</p>");
    }

    #[test]
    fn inline_code_is_shielded_from_emphasis() {
        assert_eq!(
            render("Try `**x** & y` now"),
            "<p>Try <code>**x** &amp; y</code> now</p>"
        );
    }

    #[test]
    fn links() {
        assert_eq!(
            render("See [the bestiary](https://example.com/b)"),
            r#"<p>See <a href="https://example.com/b">the bestiary</a></p>"#
        );
    }

    #[test]
    fn formatting_inside_list_items() {
        assert_eq!(
            render("- **Weak** to fire\n- Immune to *cold*"),
            "<ul><li><strong>Weak</strong> to fire</li><li>Immune to <em>cold</em></li></ul>"
        );
    }

    #[test]
    fn typical_model_reply() {
        let reply = "Here is what you recall:\n\n- The dragon fears **cold iron**.\n- Its breath is `harmless` at night.";
        assert_eq!(
            render(reply),
            "<p>Here is what you recall:</p>\n<ul><li>The dragon fears <strong>cold iron</strong>.</li><li>Its breath is <code>harmless</code> at night.</li></ul>"
        );
    }

    #[test]
    fn simple_variant_groups_bullets() {
        assert_eq!(
            render_simple("Intro\n- a\n- **b**\nOutro"),
            "<p>Intro</p><ul><li>a</li><li><strong>b</strong></li></ul><p>Outro</p>"
        );
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
    }
}
