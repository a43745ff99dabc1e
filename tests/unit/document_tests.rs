/*!
 * Tests for the markup tree, parser and serializer
 */

use revealvoice::document::{self, NodeType};
use revealvoice::errors::DocumentError;

use crate::common;

#[test]
fn test_render_withSampleDeck_shouldReproduceInput() {
    let doc = document::parse(common::SAMPLE_DECK).unwrap();
    assert_eq!(document::render(&doc), common::SAMPLE_DECK);
}

#[test]
fn test_elements_by_tag_withSampleDeck_shouldFindEveryNote() {
    let doc = document::parse(common::SAMPLE_DECK).unwrap();
    let notes: Vec<_> = doc.elements_by_tag("aside").collect();
    assert_eq!(notes.len(), 3);
    for note in &notes {
        assert_eq!(doc.node_type(*note), NodeType::Element);
        assert_eq!(doc.tag(doc.parent(*note).unwrap()), Some("section"));
    }
    assert_eq!(doc.text_content(notes[2]), "Thanks for listening.");
}

#[test]
fn test_parse_withUnterminatedDeclaration_shouldReportMalformed() {
    let result = document::parse("<p>ok</p><!DOCTYPE html");
    assert!(matches!(result, Err(DocumentError::Malformed { .. })));
}

#[test]
fn test_insert_before_withDetachedNode_shouldKeepSiblingOrder() {
    let mut doc = document::parse("<section><h2>T</h2><aside>note</aside></section>").unwrap();
    let aside = doc.elements_by_tag("aside").next().unwrap();
    let section = doc.parent(aside).unwrap();

    let marker = doc.create_element("hr", Vec::new());
    doc.insert_before(section, marker, aside).unwrap();

    assert_eq!(doc.index_in_parent(marker), Some(1));
    assert_eq!(doc.index_in_parent(aside), Some(2));
    assert_eq!(
        document::render(&doc),
        "<section><h2>T</h2><hr><aside>note</aside></section>"
    );
}
