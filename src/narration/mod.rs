/*!
 * Document narration pipeline.
 *
 * - `scanner`: finds annotation nodes and numbers them in document order
 * - `dispatcher`: runs one synthesis unit per annotation and tracks completion
 * - `mutator`: splices `<audio>` reference nodes into the tree
 * - `clips`: clip naming and storage
 * - `pipeline`: orchestrates scan, dispatch, drain and serialize
 */

pub mod clips;
pub mod dispatcher;
pub mod mutator;
pub mod pipeline;
pub mod scanner;

pub use clips::{ClipNamer, ClipRef, ClipWriter, FsClipWriter, MemoryClipWriter};
pub use dispatcher::{
    CompletionBarrier, DispatchHandle, SharedDocument, TaskDispatcher, UnitOutcome, UnitReport,
};
pub use mutator::{AudioReference, ReferenceOptions, TreeMutator};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput, PipelineState, RunReport};
pub use scanner::{Annotation, AnnotationScanner, ScheduledAnnotation, SequenceCounter};
