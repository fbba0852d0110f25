//! Section model and the parser seam.
//!
//! A section is a maximal structural block of the document. The text of all
//! sections, front matter included, concatenated in order is the document.

use crate::surface::NodeId;

/// A section as produced by a parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSection {
    /// Parser-local numbering. The reconciler replaces it with a session-wide
    /// id when the section is tracked.
    pub id: u64,
    /// Body text, without front matter.
    pub text: String,
    /// Front matter followed by the body.
    pub text_with_front_matter: String,
}

impl ParsedSection {
    pub fn new(id: u64, front_matter: &str, text: &str) -> Self {
        Self {
            id,
            text: text.to_owned(),
            text_with_front_matter: format!("{front_matter}{text}"),
        }
    }

    /// Text preceding the body.
    pub fn front_matter(&self) -> &str {
        let split = self
            .text_with_front_matter
            .len()
            .saturating_sub(self.text.len());
        self.text_with_front_matter.get(..split).unwrap_or_default()
    }
}

/// A section tracked by the engine, with the surface node rendering it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub id: u64,
    pub text: String,
    pub text_with_front_matter: String,
    pub node: Option<NodeId>,
}

impl Section {
    pub fn parsed(&self) -> ParsedSection {
        ParsedSection {
            id: self.id,
            text: self.text.clone(),
            text_with_front_matter: self.text_with_front_matter.clone(),
        }
    }
}

impl From<ParsedSection> for Section {
    fn from(parsed: ParsedSection) -> Self {
        Self {
            id: parsed.id,
            text: parsed.text,
            text_with_front_matter: parsed.text_with_front_matter,
            node: None,
        }
    }
}

/// Splits document text into an ordered partition of sections.
pub trait SectionParser {
    fn parse(&self, text: &str) -> Vec<ParsedSection>;
}

impl<T: SectionParser + ?Sized> SectionParser for &T {
    fn parse(&self, text: &str) -> Vec<ParsedSection> {
        (**self).parse(text)
    }
}

impl<T: SectionParser + ?Sized> SectionParser for Box<T> {
    fn parse(&self, text: &str) -> Vec<ParsedSection> {
        (**self).parse(text)
    }
}

/// Splits at blank lines.
///
/// Blank lines become the front matter of the following section. Trailing
/// blank lines stay in the last section's body.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlankLineSections;

impl SectionParser for BlankLineSections {
    fn parse(&self, text: &str) -> Vec<ParsedSection> {
        let mut sections: Vec<ParsedSection> = Vec::new();
        let mut front_matter = String::new();
        let mut body = String::new();

        for line in text.split_inclusive('\n') {
            let blank = line.trim().is_empty();
            if blank && !body.is_empty() {
                let id = sections.len() as u64;
                sections.push(ParsedSection::new(id, &front_matter, &body));
                front_matter.clear();
                body.clear();
            }
            if blank {
                front_matter.push_str(line);
            } else {
                body.push_str(line);
            }
        }

        if !body.is_empty() {
            let id = sections.len() as u64;
            sections.push(ParsedSection::new(id, &front_matter, &body));
        } else if !front_matter.is_empty() {
            match sections.last_mut() {
                Some(last) => {
                    last.text.push_str(&front_matter);
                    last.text_with_front_matter.push_str(&front_matter);
                }
                None => sections.push(ParsedSection::new(0, "", &front_matter)),
            }
        }
        sections
    }
}
