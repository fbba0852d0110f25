//! Rendering traits for the editor.
//!
//! These traits abstract over external concerns during rendering:
//! - Turning escaped section text into highlighted markup
//! - Refreshing the (expensive) document preview
//!
//! Implementations are provided by the consuming application.

use crate::sections::ParsedSection;

/// Produces highlighted markup for one section body.
///
/// Input is already escaped, so implementations only add `<span>` wrappers
/// and must not change the text content.
pub trait Highlighter {
    fn render(&self, escaped: &str) -> String;
}

/// Unit type implementation - no highlighting.
impl Highlighter for () {
    fn render(&self, escaped: &str) -> String {
        escaped.to_owned()
    }
}

/// Re-renders the document preview.
pub trait PreviewRenderer {
    fn refresh(&mut self, text: &str);

    /// Restore the preview's scroll offset when a file opens.
    fn scroll_to(&mut self, _scroll_top: f64) {}
}

/// Unit type implementation - no preview.
impl PreviewRenderer for () {
    fn refresh(&mut self, _text: &str) {}
}

impl<T: Highlighter> Highlighter for &T {
    fn render(&self, escaped: &str) -> String {
        (*self).render(escaped)
    }
}

impl<T: Highlighter> Highlighter for Option<T> {
    fn render(&self, escaped: &str) -> String {
        match self {
            Some(h) => h.render(escaped),
            None => escaped.to_owned(),
        }
    }
}

impl<T: PreviewRenderer> PreviewRenderer for &mut T {
    fn refresh(&mut self, text: &str) {
        (**self).refresh(text)
    }

    fn scroll_to(&mut self, scroll_top: f64) {
        (**self).scroll_to(scroll_top)
    }
}

impl<T: PreviewRenderer> PreviewRenderer for Option<T> {
    fn refresh(&mut self, text: &str) {
        if let Some(p) = self {
            p.refresh(text)
        }
    }

    fn scroll_to(&mut self, scroll_top: f64) {
        if let Some(p) = self {
            p.scroll_to(scroll_top)
        }
    }
}

/// Escape reserved markup characters. Non-breaking spaces become plain spaces.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '\u{a0}' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Surface id of a section's node.
pub fn section_dom_id(id: u64) -> String {
    format!("folio-section-{id}")
}

/// Markup for one section: highlighted body, preceded by its front matter.
///
/// Front matter is escaped separately and wrapped in a `token md` span, with
/// each line break in its own `token lf` span.
pub fn render_section<H: Highlighter + ?Sized>(section: &ParsedSection, highlighter: &H) -> String {
    let body = highlighter.render(&escape(&section.text));
    let front_matter = section.front_matter();
    if front_matter.is_empty() {
        return body;
    }
    let front_matter = escape(front_matter).replace('\n', "<span class=\"token lf\">\n</span>");
    format!("<span class=\"token md\">{front_matter}</span>{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeadingHighlighter;

    impl Highlighter for HeadingHighlighter {
        fn render(&self, escaped: &str) -> String {
            escaped
                .split_inclusive('\n')
                .map(|line| {
                    if line.starts_with('#') {
                        format!("<span class=\"token title\">{}</span>", line.trim_end_matches('\n'))
                            + if line.ends_with('\n') { "\n" } else { "" }
                    } else {
                        line.to_owned()
                    }
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct CountingPreview {
        refreshes: Vec<String>,
    }

    impl PreviewRenderer for CountingPreview {
        fn refresh(&mut self, text: &str) {
            self.refreshes.push(text.to_owned());
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b && c\u{a0}d"), "a &lt; b &amp;&amp; c d");
        assert_eq!(escape("> quote"), "> quote");
    }

    #[test]
    fn test_render_section_without_front_matter() {
        let section = ParsedSection::new(0, "", "# A <b>\n");
        insta::assert_snapshot!(
            render_section(&section, &HeadingHighlighter).trim_end(),
            @r#"<span class="token title"># A &lt;b></span>"#
        );
    }

    #[test]
    fn test_render_section_wraps_front_matter() {
        let section = ParsedSection::new(3, "\n\n", "text\n");
        assert_eq!(
            render_section(&section, &()),
            "<span class=\"token md\"><span class=\"token lf\">\n</span>\
             <span class=\"token lf\">\n</span></span>text\n"
        );
    }

    #[test]
    fn test_unit_impls() {
        assert_eq!(().render("a &amp; b"), "a &amp; b");
        let mut preview = ();
        preview.refresh("anything");
    }

    #[test]
    fn test_option_impls() {
        let some: Option<HeadingHighlighter> = Some(HeadingHighlighter);
        assert!(some.render("# x").contains("token title"));
        let none: Option<HeadingHighlighter> = None;
        assert_eq!(none.render("# x"), "# x");

        let mut preview = Some(CountingPreview::default());
        preview.refresh("doc\n");
        assert_eq!(preview.map(|p| p.refreshes), Some(vec!["doc\n".to_string()]));
    }

    #[test]
    fn test_ref_impls() {
        let highlighter = HeadingHighlighter;
        assert!((&highlighter).render("# x").starts_with("<span"));

        let mut preview = CountingPreview::default();
        (&mut preview).refresh("one");
        assert_eq!(preview.refreshes.len(), 1);
    }
}
