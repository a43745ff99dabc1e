/*!
 * Fan-out of narration units.
 *
 * Every annotation gets its own tokio task that synthesizes the payload,
 * writes the clip and splices a reference node in front of the annotation.
 * Units are independent: a failure ends that unit only. A counting barrier
 * tracks units in flight so the pipeline can wait for all of them.
 */

use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

use crate::document::{Document, render_subtree};
use crate::errors::MutationError;
use crate::providers::Synthesizer;

use super::clips::{ClipNamer, ClipWriter};
use super::mutator::{AudioReference, ReferenceOptions, TreeMutator};
use super::scanner::Annotation;

/// The document as shared between units. The lock is held only for a splice.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Counts units in flight and wakes waiters when the count drops to zero
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    pending: AtomicUsize,
    drained: Notify,
}

/// Decrements the barrier when dropped, including on unit panic
#[derive(Debug)]
pub struct BarrierGuard {
    barrier: Arc<CompletionBarrier>,
}

impl CompletionBarrier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enter(self: &Arc<Self>) -> BarrierGuard {
        self.pending.fetch_add(1, Ordering::SeqCst);
        BarrierGuard {
            barrier: Arc::clone(self),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Resolve once no unit is in flight
    pub async fn wait(&self) {
        loop {
            // Register before checking so a concurrent final drop is not missed
            let notified = self.drained.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        if self.barrier.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.barrier.drained.notify_waiters();
        }
    }
}

/// How a unit ended
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// Clip written and reference node inserted
    Inserted(AudioReference),
    /// The synthesizer failed; nothing was written or inserted
    SynthesisFailed(String),
    /// The clip could not be stored; nothing was inserted
    WriteFailed(String),
    /// The splice precondition did not hold
    MutationFailed(MutationError),
    /// The unit's task panicked or was aborted
    Crashed(String),
}

/// Per-annotation result
#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub sequence: usize,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    pub fn is_inserted(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Inserted(_))
    }
}

/// Handle to one dispatched unit
#[derive(Debug)]
pub struct DispatchHandle {
    sequence: usize,
    inner: JoinHandle<UnitReport>,
}

impl DispatchHandle {
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the unit and return its report
    pub async fn join(self) -> UnitReport {
        match self.inner.await {
            Ok(report) => report,
            Err(e) => UnitReport {
                sequence: self.sequence,
                outcome: UnitOutcome::Crashed(e.to_string()),
            },
        }
    }
}

/// Progress hook: receives the number of completed units
pub type CompletionCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Launches one unit of concurrent work per annotation
pub struct TaskDispatcher {
    synthesizer: Arc<dyn Synthesizer>,
    clip_writer: Arc<dyn ClipWriter>,
    document: SharedDocument,
    namer: ClipNamer,
    reference_options: ReferenceOptions,
    barrier: Arc<CompletionBarrier>,
    /// Caps synthesis calls in flight; units still run one per annotation
    limiter: Option<Arc<Semaphore>>,
    completed: Arc<AtomicUsize>,
    on_complete: Option<CompletionCallback>,
}

/// Everything a unit needs, moved into its task
struct UnitContext {
    synthesizer: Arc<dyn Synthesizer>,
    clip_writer: Arc<dyn ClipWriter>,
    document: SharedDocument,
    clip_name: String,
    voice: String,
    reference_options: ReferenceOptions,
    limiter: Option<Arc<Semaphore>>,
}

impl TaskDispatcher {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        clip_writer: Arc<dyn ClipWriter>,
        document: SharedDocument,
        namer: ClipNamer,
    ) -> Self {
        Self {
            synthesizer,
            clip_writer,
            document,
            namer,
            reference_options: ReferenceOptions::default(),
            barrier: CompletionBarrier::new(),
            limiter: None,
            completed: Arc::new(AtomicUsize::new(0)),
            on_complete: None,
        }
    }

    pub fn with_reference_options(mut self, options: ReferenceOptions) -> Self {
        self.reference_options = options;
        self
    }

    /// Allow at most `max` synthesis calls at once
    pub fn with_concurrency_limit(mut self, max: usize) -> Self {
        self.limiter = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    pub fn with_completion_callback(mut self, callback: CompletionCallback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Units dispatched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.barrier.pending()
    }

    /// Spawn the unit for one annotation. Must be called within a tokio runtime.
    pub fn dispatch(&self, annotation: Annotation, sequence: usize, voice: &str) -> DispatchHandle {
        let guard = self.barrier.enter();
        let context = UnitContext {
            synthesizer: Arc::clone(&self.synthesizer),
            clip_writer: Arc::clone(&self.clip_writer),
            document: Arc::clone(&self.document),
            clip_name: self.namer.clip_name(sequence),
            voice: voice.to_string(),
            reference_options: self.reference_options,
            limiter: self.limiter.clone(),
        };
        let completed = Arc::clone(&self.completed);
        let on_complete = self.on_complete.clone();

        debug!("Dispatching annotation #{} ({} chars)", sequence, annotation.text.len());
        let inner = tokio::spawn(async move {
            let _guard = guard;
            let outcome = run_unit(context, annotation, sequence).await;
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = on_complete {
                callback(done);
            }
            UnitReport { sequence, outcome }
        });

        DispatchHandle { sequence, inner }
    }

    /// Block until every dispatched unit has finished
    pub async fn drain(&self) {
        self.barrier.wait().await;
    }
}

async fn run_unit(context: UnitContext, annotation: Annotation, sequence: usize) -> UnitOutcome {
    let permit = match &context.limiter {
        Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
        None => None,
    };
    let synthesized = context
        .synthesizer
        .synthesize(&annotation.text, &context.voice)
        .await;
    drop(permit);

    let audio = match synthesized {
        Ok(audio) => audio,
        Err(e) => {
            error!("Synthesis failed for annotation #{}: {}", sequence, e);
            return UnitOutcome::SynthesisFailed(e.to_string());
        }
    };

    let clip = match context.clip_writer.write(&context.clip_name, audio).await {
        Ok(clip) => clip,
        Err(e) => {
            error!("Could not store clip for annotation #{}: {}", sequence, e);
            return UnitOutcome::WriteFailed(e.to_string());
        }
    };

    let reference = AudioReference {
        artifact: clip.name,
        voice: context.voice,
    };
    let spliced = {
        let mut document = context.document.lock();
        TreeMutator::splice_reference(
            &mut document,
            annotation.node,
            &reference,
            context.reference_options,
        )
        .map(|node| render_subtree(&document, node))
    };

    match spliced {
        Ok(inserted) => {
            debug!("Annotation #{} -> {}", sequence, inserted);
            UnitOutcome::Inserted(reference)
        }
        Err(e) => {
            error!("Tree mutation failed for annotation #{}: {}", sequence, e);
            UnitOutcome::MutationFailed(e)
        }
    }
}
