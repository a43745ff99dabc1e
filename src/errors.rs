/*!
 * Error types for the revealvoice application.
 *
 * Each concern of the narration pipeline has its own error enum, defined with
 * the thiserror crate. Only `DocumentError` and `MutationError` are fatal to a
 * pipeline run; synthesis and clip failures are recovered per annotation.
 */

use thiserror::Error;

/// Errors raised while reading a markup document into a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The input could not be tokenized
    #[error("Malformed document at byte {offset}: {reason}")]
    Malformed {
        /// Byte offset of the offending construct
        offset: usize,
        /// Human readable description
        reason: String,
    },
}

/// Errors that can occur when calling a speech synthesis backend
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The backend answered successfully but returned no audio
    #[error("Synthesis returned no audio for voice '{0}'")]
    EmptyAudio(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while persisting an audio clip
#[derive(Error, Debug)]
pub enum ClipError {
    /// The clip name cannot be used as a file name
    #[error("Invalid clip name: {0}")]
    InvalidName(String),

    /// Writing the clip failed
    #[error("Failed to write clip '{name}': {source}")]
    Io {
        /// Clip name that was being written
        name: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Violations of the tree mutation preconditions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    /// A node id does not belong to the document
    #[error("Node {0} does not exist in the document")]
    UnknownNode(usize),

    /// The anchor is not currently a child of the given parent
    #[error("Anchor node {anchor} is not a child of node {parent}")]
    AnchorNotFound {
        /// Expected parent
        parent: usize,
        /// Anchor that was looked up
        anchor: usize,
    },

    /// The node to insert already has a parent
    #[error("Node {0} is already attached to the tree")]
    AlreadyAttached(usize),

    /// The annotation node was detached before its reference could be inserted
    #[error("Annotation node {0} has no parent")]
    Detached(usize),
}

/// Fatal pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document could not be scanned
    #[error("Scan error: {0}")]
    Scan(#[from] DocumentError),

    /// A unit violated a tree mutation precondition
    #[error("Tree mutation failed for annotation #{sequence}: {source}")]
    Mutation {
        /// Sequence number of the failing annotation
        sequence: usize,
        /// Underlying precondition violation
        #[source]
        source: MutationError,
    },
}
