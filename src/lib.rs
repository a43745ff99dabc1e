/*!
 * # revealvoice - spoken narration for slide decks
 *
 * A Rust library that reads a markup document, synthesizes speech for every
 * speaker-note annotation (`<aside>` by default) and writes the document back
 * out with an `<audio>` reference inserted in front of each note.
 *
 * ## Features
 *
 * - Tolerant markup parser and serializer over an arena-backed tree
 * - One concurrent synthesis unit per annotation, bounded by a semaphore
 * - Clips numbered in document order (`<base>.001.mp3`, `<base>.002.mp3`, ...)
 *   no matter which unit finishes first
 * - Failures isolated per annotation: a failed clip simply gets no reference
 * - Speech backends:
 *   - OpenAI-compatible `/audio/speech` endpoints
 *   - ElevenLabs
 *   - An in-process mock for tests and dry runs
 *
 * ## Architecture
 *
 * - `document`: tree model, parser and serializer
 * - `narration`: the pipeline:
 *   - `narration::scanner`: finds annotations and numbers them
 *   - `narration::dispatcher`: runs the synthesis units and the completion barrier
 *   - `narration::mutator`: splices reference nodes into the tree
 *   - `narration::clips`: clip naming and storage
 *   - `narration::pipeline`: scan, dispatch, drain, serialize
 * - `providers`: speech synthesis clients
 * - `app_config`: configuration management
 * - `app_controller`: file and folder level driver
 * - `file_utils`: file system operations
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod narration;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document::{Document, NodeId};
pub use errors::{ClipError, DocumentError, MutationError, PipelineError, SynthesisError};
pub use narration::{Pipeline, PipelineOptions, PipelineOutput, RunReport};
pub use providers::Synthesizer;
