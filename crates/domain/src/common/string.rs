//! String helpers shared by the extractor and the event classifier.

/// Lowercases `text` and collapses every run of non-alphanumeric characters
/// into a single space, trimming the ends.
///
/// Used for punctuation-insensitive phrase matching: `"Critical-Failure!"`
/// and `"critical failure"` both normalize to `"critical failure"`.
///
/// ```
/// use misrecall_domain::common::normalize_phrase;
///
/// assert_eq!(normalize_phrase("  Recall_Knowledge: "), "recall knowledge");
/// ```
pub fn normalize_phrase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// True when `haystack` contains `phrase` after both are normalized with
/// [`normalize_phrase`]. Matches are aligned to word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let phrase = normalize_phrase(phrase);
    if phrase.is_empty() {
        return false;
    }
    let haystack = format!(" {} ", normalize_phrase(haystack));
    haystack.contains(&format!(" {phrase} "))
}

/// Removes markup tags and decodes the handful of entities the host's rich
/// text editor emits, then collapses whitespace.
///
/// This is a text projection, not a sanitizer: the result is only ever fed
/// into prompts.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_phrase_ignores_case_and_punctuation() {
        assert_eq!(normalize_phrase("CRITICAL   failure."), "critical failure");
        assert_eq!(normalize_phrase("critical-failure"), "critical failure");
        assert_eq!(normalize_phrase("!!!"), "");
    }

    #[test]
    fn contains_phrase_respects_word_boundaries() {
        assert!(contains_phrase(
            "Result: <b>Critical Failure</b>!",
            "critical failure"
        ));
        assert!(!contains_phrase("supercritical failures", "critical failure"));
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn strip_html_keeps_text_only() {
        assert_eq!(
            strip_html("<p>Lives in <em>caves</em> &amp; ruins.</p>"),
            "Lives in caves & ruins."
        );
        assert_eq!(strip_html(""), "");
    }
}
