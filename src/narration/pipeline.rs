/*!
 * Pipeline orchestrator for narrating a document.
 *
 * The pipeline runs strictly forward through its phases:
 * 1. Scanning: find every annotation and number it in document order
 * 2. Dispatching: launch one unit per annotation
 * 3. Draining: wait until every unit has finished
 * 4. Serializing: render the annotated tree
 *
 * Serialization only starts once draining is complete, so the rendered
 * markup contains every successful insertion and nothing in flight.
 */

use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::document::{self, Document};
use crate::errors::PipelineError;
use crate::providers::Synthesizer;

use super::clips::{ClipNamer, ClipWriter};
use super::dispatcher::{
    CompletionCallback, DispatchHandle, SharedDocument, TaskDispatcher, UnitOutcome, UnitReport,
};
use super::mutator::ReferenceOptions;
use super::scanner::{AnnotationScanner, SequenceCounter, schedule};

/// Phases of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Scanning,
    Dispatching,
    Draining,
    Serializing,
    Done,
}

/// Configuration for the narration pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Tag of the annotation elements
    pub marker_tag: String,
    /// Voice handed to the synthesizer
    pub voice: String,
    /// Clip naming scheme
    pub namer: ClipNamer,
    /// Shape of inserted reference nodes
    pub reference: ReferenceOptions,
    /// Cap on concurrent synthesis calls, `None` for unbounded
    pub max_concurrent_requests: Option<usize>,
}

impl PipelineOptions {
    /// Default options writing clips named after `clip_base`
    pub fn new(clip_base: &str) -> Self {
        Self {
            marker_tag: "aside".to_string(),
            voice: "alloy".to_string(),
            namer: ClipNamer::mp3(clip_base),
            reference: ReferenceOptions::default(),
            max_concurrent_requests: None,
        }
    }

    /// Options derived from the application config
    pub fn from_config(config: &Config, clip_base: &str) -> Self {
        Self {
            marker_tag: config.marker_tag.clone(),
            voice: config.voice.clone(),
            namer: ClipNamer::new(clip_base, config.output.sequence_width),
            reference: ReferenceOptions {
                autoplay: config.output.autoplay,
            },
            max_concurrent_requests: Some(config.synthesis.optimal_concurrent_requests()),
        }
    }

    pub fn with_voice(mut self, voice: &str) -> Self {
        self.voice = voice.to_string();
        self
    }

    pub fn with_marker_tag(mut self, tag: &str) -> Self {
        self.marker_tag = tag.to_string();
        self
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Marker elements found, including ones with no payload
    pub markers_found: usize,
    /// Units launched
    pub dispatched: usize,
    /// One report per unit, ordered by sequence number
    pub units: Vec<UnitReport>,
    /// Phases entered, in order
    pub states: Vec<PipelineState>,
    pub duration: Duration,
}

impl RunReport {
    pub fn inserted(&self) -> usize {
        self.units.iter().filter(|u| u.is_inserted()).count()
    }

    pub fn failed(&self) -> usize {
        self.units.len() - self.inserted()
    }

    /// Markers skipped because they had nothing to say
    pub fn skipped(&self) -> usize {
        self.markers_found - self.dispatched
    }

    /// Clip names in sequence order
    pub fn artifacts(&self) -> Vec<String> {
        self.units
            .iter()
            .filter_map(|u| match &u.outcome {
                UnitOutcome::Inserted(reference) => Some(reference.artifact.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct PipelineOutput {
    /// The annotated tree
    pub document: Document,
    /// The annotated tree, serialized
    pub markup: String,
    pub report: RunReport,
}

/// Drives scan, dispatch, drain and serialize for one document
pub struct Pipeline {
    options: PipelineOptions,
    synthesizer: Arc<dyn Synthesizer>,
    clip_writer: Arc<dyn ClipWriter>,
    state: PipelineState,
    states: Vec<PipelineState>,
    progress: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl Pipeline {
    pub fn new(
        options: PipelineOptions,
        synthesizer: Arc<dyn Synthesizer>,
        clip_writer: Arc<dyn ClipWriter>,
    ) -> Self {
        Self {
            options,
            synthesizer,
            clip_writer,
            state: PipelineState::Scanning,
            states: vec![PipelineState::Scanning],
            progress: None,
        }
    }

    /// Report `(completed, total)` as units finish
    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(next > self.state, "pipeline cannot move from {:?} to {:?}", self.state, next);
        debug!("Pipeline: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.states.push(next);
    }

    /// Parse `markup` and run the pipeline over it
    pub async fn run_markup(self, markup: &str) -> Result<PipelineOutput, PipelineError> {
        let document = document::parse(markup)?;
        self.run(document).await
    }

    /// Narrate every annotation of `document`
    pub async fn run(self, document: Document) -> Result<PipelineOutput, PipelineError> {
        self.run_shared(Arc::new(Mutex::new(document))).await
    }

    /// Narrate a document that other tasks may also hold. On success the
    /// annotated tree is moved out of `shared`, leaving an empty document.
    pub async fn run_shared(mut self, shared: SharedDocument) -> Result<PipelineOutput, PipelineError> {
        let start_time = Instant::now();

        let (markers_found, scheduled) = {
            let document = shared.lock();
            let mut counter = SequenceCounter::new();
            (
                document.elements_by_tag(&self.options.marker_tag).count(),
                schedule(&document, &self.options.marker_tag, &mut counter),
            )
        };
        info!(
            "Found {} annotation(s) to narrate with {} ({} empty marker(s) skipped)",
            scheduled.len(),
            self.synthesizer.name(),
            markers_found - scheduled.len()
        );

        self.advance(PipelineState::Dispatching);
        let total = scheduled.len();
        let mut dispatcher = TaskDispatcher::new(
            Arc::clone(&self.synthesizer),
            Arc::clone(&self.clip_writer),
            Arc::clone(&shared),
            self.options.namer.clone(),
        )
        .with_reference_options(self.options.reference);
        if let Some(max) = self.options.max_concurrent_requests {
            dispatcher = dispatcher.with_concurrency_limit(max);
        }
        if let Some(progress) = self.progress.clone() {
            let callback: CompletionCallback = Arc::new(move |done| progress(done, total));
            dispatcher = dispatcher.with_completion_callback(callback);
        }

        let handles: Vec<_> = scheduled
            .into_iter()
            .map(|s| dispatcher.dispatch(s.annotation, s.sequence, &self.options.voice))
            .collect();

        self.advance(PipelineState::Draining);
        dispatcher.drain().await;

        let mut units = join_all(handles.into_iter().map(DispatchHandle::join)).await;
        units.sort_by_key(|u| u.sequence);

        if let Some(fatal) = units.iter().find_map(|u| match &u.outcome {
            UnitOutcome::MutationFailed(e) => Some((u.sequence, e.clone())),
            _ => None,
        }) {
            return Err(PipelineError::Mutation {
                sequence: fatal.0,
                source: fatal.1,
            });
        }
        for unit in units.iter().filter(|u| matches!(u.outcome, UnitOutcome::Crashed(_))) {
            warn!("Narration unit #{} did not complete: {:?}", unit.sequence, unit.outcome);
        }

        self.advance(PipelineState::Serializing);
        let document = std::mem::take(&mut *shared.lock());
        let markup = document::render(&document);

        self.advance(PipelineState::Done);
        let report = RunReport {
            markers_found,
            dispatched: total,
            units,
            states: self.states.clone(),
            duration: start_time.elapsed(),
        };
        info!(
            "Narration finished: {} clip(s) inserted, {} failed in {:?}",
            report.inserted(),
            report.failed(),
            report.duration
        );

        Ok(PipelineOutput {
            document,
            markup,
            report,
        })
    }

    /// Scan without dispatching: the numbered annotations a run would narrate
    pub fn preview(&self, document: &Document) -> Vec<(String, String)> {
        AnnotationScanner::new(document, &self.options.marker_tag)
            .enumerate()
            .map(|(i, a)| (self.options.namer.clip_name(i + 1), a.text))
            .collect()
    }
}
