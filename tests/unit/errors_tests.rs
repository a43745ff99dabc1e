/*!
 * Tests for error types and conversions
 */

use revealvoice::errors::{ClipError, DocumentError, MutationError, PipelineError, SynthesisError};
use std::error::Error;

#[test]
fn test_document_error_display_shouldIncludeOffset() {
    let error = DocumentError::Malformed {
        offset: 17,
        reason: "unterminated comment".to_string(),
    };
    assert_eq!(error.to_string(), "Malformed document at byte 17: unterminated comment");
}

#[test]
fn test_pipeline_error_withMutation_shouldExposeSource() {
    let error = PipelineError::Mutation {
        sequence: 3,
        source: MutationError::Detached(9),
    };
    assert!(error.to_string().contains("#3"));
    let source = error.source().expect("mutation error should have a source");
    assert_eq!(source.to_string(), "Annotation node 9 has no parent");
}

#[test]
fn test_clip_error_withIo_shouldKeepName() {
    let error = ClipError::Io {
        name: "deck.001.mp3".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(error.to_string().contains("deck.001.mp3"));
    assert!(error.source().is_some());
}

#[test]
fn test_pipeline_error_fromDocumentError_shouldWrapAsScan() {
    let error: PipelineError = DocumentError::Malformed {
        offset: 3,
        reason: "unterminated tag <div".to_string(),
    }
    .into();
    assert!(matches!(error, PipelineError::Scan(DocumentError::Malformed { offset: 3, .. })));
    assert!(error.to_string().starts_with("Scan error: Malformed document at byte 3"));
}

#[test]
fn test_synthesis_error_display_shouldIncludeStatus() {
    let error = SynthesisError::ApiError {
        status_code: 429,
        message: "slow down".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 429 - slow down");
    let anyhow_error: anyhow::Error = SynthesisError::EmptyAudio("alloy".to_string()).into();
    assert!(anyhow_error.to_string().contains("alloy"));
}
