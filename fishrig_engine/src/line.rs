//! Line classification and error annotations.
//!
//! Every physical line of a queue file is a comment, a blank line, or a
//! descriptor. Descriptor lines that failed on an earlier pass carry an
//! annotation prefix (`Mistake in this line: <why> -> <original>`); the
//! classifier peels it off so the line is re-checked as the human left it.

use variantly::Variantly;

/// Start of every annotation the engine writes.
pub const ANNOTATION_MARKER: &str = "Mistake in this line: ";
/// Separates the explanation from the original descriptor text.
pub const ANNOTATION_SEPARATOR: &str = " -> ";

/// Descriptor text recovered from a physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The line carried one or more annotations that were stripped.
    pub was_annotated: bool,
    /// The descriptor exactly as the human wrote it, inline comment included.
    pub original: String,
}

impl SourceLine {
    /// The part of the line the parser sees: everything before the first unescaped `#`.
    pub fn body(&self) -> &str {
        strip_inline_comment(&self.original)
    }
}

/// One physical line of a queue file.
#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum QueueLine {
    Comment(String),
    Blank(String),
    Descriptor(SourceLine),
}

impl QueueLine {
    /// Text to write back when the line passes through untouched.
    pub fn passthrough_text(&self) -> &str {
        match self {
            QueueLine::Comment(text) | QueueLine::Blank(text) => text,
            QueueLine::Descriptor(source) => &source.original,
        }
    }
}

/// Classify a raw line, stripping any earlier annotation first.
pub fn classify(raw: &str) -> QueueLine {
    let source = strip_annotation(raw);
    let text = source.original.as_str();
    if text.trim().is_empty() {
        QueueLine::Blank(text.to_string())
    } else if text.trim_start().starts_with('#') {
        QueueLine::Comment(text.to_string())
    } else {
        QueueLine::Descriptor(source)
    }
}

/// Prefix `original` with an explanation of why it was rejected.
pub fn annotate(original: &str, message: &str) -> String {
    format!("{ANNOTATION_MARKER}{message}{ANNOTATION_SEPARATOR}{original}")
}

/// Remove every leading annotation from `raw`, recovering the original text.
///
/// Only a marker followed somewhere by the separator counts as an annotation;
/// anything else is returned unchanged.
pub fn strip_annotation(raw: &str) -> SourceLine {
    let mut text = raw;
    let mut was_annotated = false;
    while let Some(rest) = text.strip_prefix(ANNOTATION_MARKER)
        && let Some((_, original)) = rest.split_once(ANNOTATION_SEPARATOR)
    {
        text = original;
        was_annotated = true;
    }
    SourceLine {
        was_annotated,
        original: text.to_string(),
    }
}

/// Cut a trailing `# comment` (and the whitespace before it) from a descriptor.
/// A backslash-escaped `\#` does not start a comment.
pub fn strip_inline_comment(text: &str) -> &str {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '\\' => escaped = !escaped,
            '#' if !escaped => return text[..idx].trim_end(),
            _ => escaped = false,
        }
    }
    text
}
