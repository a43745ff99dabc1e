/*!
 * Tests for annotation scanning, sequence numbering and clip naming
 */

use revealvoice::document;
use revealvoice::narration::scanner::schedule;
use revealvoice::narration::{AnnotationScanner, ClipNamer, SequenceCounter};

use crate::common;

#[test]
fn test_schedule_withSampleDeck_shouldSkipEmptyNote() {
    let doc = document::parse(common::SAMPLE_DECK).unwrap();
    let mut counter = SequenceCounter::new();
    let scheduled = schedule(&doc, "aside", &mut counter);

    let numbered: Vec<(usize, &str)> = scheduled
        .iter()
        .map(|s| (s.sequence, s.annotation.text.as_str()))
        .collect();
    assert_eq!(numbered, vec![(1, "Welcome to the talk."), (2, "Thanks for listening.")]);
    assert_eq!(counter.current(), 2);
}

#[test]
fn test_scanner_withNonTextFirstChild_shouldSkipMarker() {
    let doc = document::parse(
        "<aside><b>bold</b> tail</aside><aside>  \n </aside><aside>\n  spoken  \n</aside>",
    )
    .unwrap();
    let texts: Vec<String> = AnnotationScanner::new(&doc, "aside").map(|a| a.text).collect();
    assert_eq!(texts, vec!["spoken"]);
}

#[test]
fn test_scanner_withCustomTag_shouldIgnoreAsides() {
    let doc = document::parse("<aside>no</aside><note>yes</note>").unwrap();
    let texts: Vec<String> = AnnotationScanner::new(&doc, "note").map(|a| a.text).collect();
    assert_eq!(texts, vec!["yes"]);
}

#[test]
fn test_sequence_counter_acrossSchedules_shouldKeepCounting() {
    let doc = document::parse("<aside>a</aside><aside>b</aside>").unwrap();
    let mut counter = SequenceCounter::new();
    schedule(&doc, "aside", &mut counter);
    let second = schedule(&doc, "aside", &mut counter);
    assert_eq!(second[0].sequence, 3);
    assert_eq!(second[1].sequence, 4);
}

#[test]
fn test_clip_namer_withWidths_shouldZeroPad() {
    assert_eq!(ClipNamer::mp3("deck").clip_name(7), "deck.007.mp3");
    assert_eq!(ClipNamer::mp3("deck").clip_name(1234), "deck.1234.mp3");
    assert_eq!(ClipNamer::new("talk", 5).clip_name(42), "talk.00042.mp3");
}
