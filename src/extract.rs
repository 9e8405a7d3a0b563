/// Headword and definition extraction from rendered entry markup
use regex::Regex;
use std::sync::OnceLock;

/// Private token shielding line breaks while every other tag is stripped.
const LINE_SENTINEL: &str = "---NL---";

/// Control glyphs rendered inside entry tool strips (copy, send, nav arrows).
const MARKER_GLYPHS: [char; 4] = ['✂', '➠', '▲', '▼'];

/// Full-width closing bracket that ends a headword group in several
/// dictionary bodies; the star count is inlined right after it.
const CLOSING_BRACKET: char = '】';

/// A selected text range drags the tool-strip glyph column along as its own
/// lines; those runs collapse back to a single newline.
const SELECTION_ARTIFACT: &str = "\n✂➠\n▲\n▼\n";

fn br_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static pattern"))
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static pattern"))
}

/// What an entry's owning dictionary exports as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryKind {
    Text,
    Image,
    Audio,
}

impl DictionaryKind {
    pub fn from_name(name: &str) -> DictionaryKind {
        match name {
            "Images" | "Google Images" => DictionaryKind::Image,
            "Forvo" => DictionaryKind::Audio,
            _ => DictionaryKind::Text,
        }
    }
}

/// Back-reference from an entry to its owning dictionary block, recorded when
/// the result fragment is indexed rather than re-derived per click.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryContext {
    pub dictionary: String,
    pub kind: DictionaryKind,
    pub duplicate_header: bool,
}

/// Scraped title segment of one entry block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryTitle {
    pub word: String,
    pub reading: String,
    pub pronunciation: String,
    pub star_count: String,
}

/// Strip entry markup down to text.
///
/// Algorithm (order matters):
/// 1. Replace every `<br>` variant (case-insensitive, optional whitespace and
///    self-closing slash) with a private sentinel so real line breaks survive
///    the next step
/// 2. Strip all remaining tags
/// 3. Drop the decorative tool-strip glyphs wherever they appear
/// 4. Replace the sentinel with the requested separator (`<br>` for storage,
///    `\n` for the clipboard)
pub fn clean_markup(html: &str, line_sep: &str) -> String {
    let shielded = br_pattern().replace_all(html, LINE_SENTINEL);
    let stripped = tag_pattern().replace_all(&shielded, "");
    let cleaned: String = stripped.chars().filter(|c| !MARKER_GLYPHS.contains(c)).collect();
    cleaned.replace(LINE_SENTINEL, line_sep)
}

/// Join the up-to-two main-word fields: comma-joined when both are present,
/// else whichever is non-empty.
pub fn headword(title: &EntryTitle) -> String {
    match (title.word.is_empty(), title.reading.is_empty()) {
        (false, false) => format!("{}, {}", title.word, title.reading),
        (false, true) => title.word.clone(),
        (true, false) => title.reading.clone(),
        (true, true) => String::new(),
    }
}

/// Produce the exportable (word, definition) pair for one entry.
///
/// With the dictionary's duplicate-header flag off, the pronunciation line is
/// prepended to the body. With it on, the star count is inlined instead:
/// right after the first `】` when the body has one, otherwise before the
/// first line break.
pub fn extract_word_and_definition(
    ctx: &EntryContext,
    title: &EntryTitle,
    body_html: &str,
) -> (String, String) {
    let mut definition = clean_markup(body_html, "<br>");
    if !ctx.duplicate_header {
        definition = format!("{}<br>{}", title.pronunciation, definition);
    } else if let Some(pos) = definition.find(CLOSING_BRACKET) {
        let insert_at = pos + CLOSING_BRACKET.len_utf8();
        definition.insert_str(insert_at, &format!("{} ", title.star_count));
    } else if let Some(pos) = definition.find("<br>") {
        definition.insert_str(pos, &title.star_count);
    }
    (headword(title), definition)
}

/// Collapse tool-strip glyph runs that ride along with a user text selection.
pub fn strip_selection_artifacts(text: &str) -> String {
    text.replace(SELECTION_ARTIFACT, "\n")
}

/// A user selection wins over the auto-extracted body; storage-bound payloads
/// get the cleaned title prepended and newlines normalized to `<br>`.
pub fn selection_payload(title_text: &str, selection: &str) -> String {
    format!(
        "{}<br>{}",
        clean_markup(title_text, "<br>"),
        selection.replace('\n', "<br>")
    )
}

/// Undo the handful of entities the webview escapes in text content.
pub fn decode_basic_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(duplicate_header: bool) -> EntryContext {
        EntryContext {
            dictionary: "大辞林".to_string(),
            kind: DictionaryKind::Text,
            duplicate_header,
        }
    }

    fn title() -> EntryTitle {
        EntryTitle {
            word: "犬".to_string(),
            reading: "いぬ".to_string(),
            pronunciation: "犬【いぬ】".to_string(),
            star_count: "★★★".to_string(),
        }
    }

    #[test]
    fn test_clean_markup_br_variants() {
        assert_eq!(clean_markup("A<br>B<BR/>C", "\n"), "A\nB\nC");
        assert_eq!(clean_markup("A<br />B<Br>C", "<br>"), "A<br>B<br>C");
    }

    #[test]
    fn test_clean_markup_strips_tags_but_keeps_breaks() {
        assert_eq!(
            clean_markup("<b>bold</b><br><span class=\"x\">rest</span>", "\n"),
            "bold\nrest"
        );
    }

    #[test]
    fn test_clean_markup_removes_marker_glyphs_anywhere() {
        assert_eq!(clean_markup("✂a➠b▲c▼d", "\n"), "abcd");
        assert_eq!(clean_markup("mid✂dle", "\n"), "middle");
    }

    #[test]
    fn test_headword_both_fields() {
        assert_eq!(headword(&title()), "犬, いぬ");
    }

    #[test]
    fn test_headword_single_field() {
        let mut t = title();
        t.reading.clear();
        assert_eq!(headword(&t), "犬");
        let mut t = title();
        t.word.clear();
        assert_eq!(headword(&t), "いぬ");
    }

    #[test]
    fn test_headword_empty() {
        assert_eq!(headword(&EntryTitle::default()), "");
    }

    #[test]
    fn test_duplicate_header_off_prepends_pronunciation() {
        let (word, definition) =
            extract_word_and_definition(&context(false), &title(), "body line");
        assert_eq!(word, "犬, いぬ");
        assert_eq!(definition, "犬【いぬ】<br>body line");
    }

    #[test]
    fn test_duplicate_header_on_inlines_stars_after_bracket() {
        let (_, definition) =
            extract_word_and_definition(&context(true), &title(), "いぬ【犬】first sense");
        assert_eq!(definition, "いぬ【犬】★★★ first sense");
    }

    #[test]
    fn test_duplicate_header_on_inlines_stars_before_first_break() {
        let (_, definition) =
            extract_word_and_definition(&context(true), &title(), "first<br>second");
        assert_eq!(definition, "first★★★<br>second");
    }

    #[test]
    fn test_duplicate_header_on_without_bracket_or_break() {
        let (_, definition) = extract_word_and_definition(&context(true), &title(), "only line");
        assert_eq!(definition, "only line");
    }

    #[test]
    fn test_strip_selection_artifacts() {
        assert_eq!(
            strip_selection_artifacts("one\n✂➠\n▲\n▼\ntwo"),
            "one\ntwo"
        );
        assert_eq!(strip_selection_artifacts("untouched"), "untouched");
    }

    #[test]
    fn test_selection_payload_prefixes_title() {
        assert_eq!(
            selection_payload("犬【いぬ】✂➠", "picked\nline"),
            "犬【いぬ】<br>picked<br>line"
        );
    }

    #[test]
    fn test_decode_basic_entities() {
        assert_eq!(decode_basic_entities("&lt;b&gt; &amp; more"), "<b> & more");
    }
}
