//! Word-level redline inside a single modified field.
//!
//! Uses the `similar` crate (Myers diff over words) so a renderer can strike
//! through deleted words and underline inserted ones.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::redline::{ChangeType, FieldChange};

/// A run of text with one classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InlineSegment {
    Equal(String),
    Inserted(String),
    Deleted(String),
}

impl InlineSegment {
    pub fn text(&self) -> &str {
        match self {
            Self::Equal(t) | Self::Inserted(t) | Self::Deleted(t) => t,
        }
    }
}

/// The word-level difference between two strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRedline {
    pub segments: Vec<InlineSegment>,
}

impl InlineRedline {
    /// Text of the old side, reassembled from the segments.
    pub fn old_text(&self) -> String {
        self.segments
            .iter()
            .filter(|s| !matches!(s, InlineSegment::Inserted(_)))
            .map(InlineSegment::text)
            .collect()
    }

    /// Text of the new side, reassembled from the segments.
    pub fn new_text(&self) -> String {
        self.segments
            .iter()
            .filter(|s| !matches!(s, InlineSegment::Deleted(_)))
            .map(InlineSegment::text)
            .collect()
    }

    /// Render as `[-deleted-]{+inserted+}` markup, as in `git diff --word-diff`.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                InlineSegment::Equal(t) => out.push_str(t),
                InlineSegment::Inserted(t) => {
                    out.push_str("{+");
                    out.push_str(t);
                    out.push_str("+}");
                }
                InlineSegment::Deleted(t) => {
                    out.push_str("[-");
                    out.push_str(t);
                    out.push_str("-]");
                }
            }
        }
        out
    }
}

/// Compute the word-level redline between two strings.
///
/// Adjacent tokens with the same classification are merged into one segment.
pub fn inline_redline(old: &str, new: &str) -> InlineRedline {
    let diff = TextDiff::from_words(old, new);
    let mut segments: Vec<InlineSegment> = Vec::new();

    for change in diff.iter_all_changes() {
        let text = change.value();
        let tag = change.tag();
        let merged = match (segments.last_mut(), tag) {
            (Some(InlineSegment::Equal(t)), ChangeTag::Equal)
            | (Some(InlineSegment::Inserted(t)), ChangeTag::Insert)
            | (Some(InlineSegment::Deleted(t)), ChangeTag::Delete) => {
                t.push_str(text);
                true
            }
            _ => false,
        };
        if !merged {
            segments.push(match tag {
                ChangeTag::Equal => InlineSegment::Equal(text.to_string()),
                ChangeTag::Insert => InlineSegment::Inserted(text.to_string()),
                ChangeTag::Delete => InlineSegment::Deleted(text.to_string()),
            });
        }
    }

    InlineRedline { segments }
}

impl FieldChange {
    /// Word-level redline of a `Modified` change.
    ///
    /// `Added` and `Removed` changes have nothing to align and return `None`.
    pub fn inline(&self) -> Option<InlineRedline> {
        match (self.change_type, &self.old_value, &self.new_value) {
            (ChangeType::Modified, Some(old), Some(new)) => Some(inline_redline(old, new)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_one_equal_segment() {
        let r = inline_redline("shall support SSO", "shall support SSO");
        assert_eq!(
            r.segments,
            vec![InlineSegment::Equal("shall support SSO".into())]
        );
    }

    #[test]
    fn replaced_word_is_deleted_then_inserted() {
        let r = inline_redline("shall support SSO", "shall support SAML");
        assert!(r.segments.contains(&InlineSegment::Deleted("SSO".into())));
        assert!(r.segments.contains(&InlineSegment::Inserted("SAML".into())));
        assert_eq!(r.to_markup(), "shall support [-SSO-]{+SAML+}");
    }

    #[test]
    fn sides_reassemble() {
        let old = "The user shall log in with a password";
        let new = "The operator shall log in with a hardware token";
        let r = inline_redline(old, new);
        assert_eq!(r.old_text(), old);
        assert_eq!(r.new_text(), new);
    }

    #[test]
    fn only_modified_changes_have_inline_redline() {
        let modified = FieldChange {
            field: "Title".into(),
            old_value: Some("Login".into()),
            new_value: Some("Login page".into()),
            change_type: ChangeType::Modified,
        };
        let inline = modified.inline().unwrap();
        assert_eq!(inline.new_text(), "Login page");

        let added = FieldChange {
            field: "Description".into(),
            old_value: None,
            new_value: Some("text".into()),
            change_type: ChangeType::Added,
        };
        assert!(added.inline().is_none());
    }
}
