/*!
 * Discovery of annotation nodes.
 *
 * The scanner walks the tree in pre-order (node first, then children left to
 * right) and yields every marker element whose first child carries text. It
 * only reads the document. The tree keeps text raw; payloads are decoded
 * (`&amp;` becomes `&`) before they reach a synthesizer.
 */

use html_escape::decode_html_entities;

use crate::document::model::Descendants;
use crate::document::{Document, NodeId};

/// A marker element together with the text to narrate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The marker element; the reference node is inserted right before it
    pub node: NodeId,
    /// Text of the marker's first child, entity-decoded and trimmed
    pub text: String,
}

/// Lazy, single-pass iterator over the annotations of a document
pub struct AnnotationScanner<'a> {
    document: &'a Document,
    marker_tag: &'a str,
    walk: Descendants<'a>,
}

impl<'a> AnnotationScanner<'a> {
    pub fn new(document: &'a Document, marker_tag: &'a str) -> Self {
        Self {
            document,
            marker_tag,
            walk: document.descendants(document.root()),
        }
    }

    fn is_marker(&self, node: NodeId) -> bool {
        self.document
            .tag(node)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(self.marker_tag))
    }

    /// Payload of a marker: the decoded text of its first child, if that
    /// child is a non-blank text node
    pub fn payload(document: &Document, node: NodeId) -> Option<String> {
        let first = document.first_child(node)?;
        let decoded = decode_html_entities(document.text(first)?);
        let text = decoded.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

impl Iterator for AnnotationScanner<'_> {
    type Item = Annotation;

    fn next(&mut self) -> Option<Annotation> {
        loop {
            let node = self.walk.next()?;
            if !self.is_marker(node) {
                continue;
            }
            if let Some(text) = Self::payload(self.document, node) {
                return Some(Annotation { node, text });
            }
        }
    }
}

/// Process-run counter handing out clip sequence numbers, starting at 1
#[derive(Debug, Default)]
pub struct SequenceCounter {
    last: usize,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_value(&mut self) -> usize {
        self.last += 1;
        self.last
    }

    /// Last value handed out, 0 if none
    pub fn current(&self) -> usize {
        self.last
    }
}

/// An annotation with its sequence number assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAnnotation {
    pub sequence: usize,
    pub annotation: Annotation,
}

/// Scan the whole document and number every annotation in document order
pub fn schedule(
    document: &Document,
    marker_tag: &str,
    counter: &mut SequenceCounter,
) -> Vec<ScheduledAnnotation> {
    AnnotationScanner::new(document, marker_tag)
        .map(|annotation| ScheduledAnnotation {
            sequence: counter.next_value(),
            annotation,
        })
        .collect()
}
