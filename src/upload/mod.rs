//! Upload pipeline — validate, submit, and map the outcome onto metric state.
//!
//! One attempt moves `Idle → Validating → Submitting → Succeeded | Failed`.
//! Every attempt is tagged with a sequence number; a completion whose ticket
//! is no longer the latest is discarded.

pub mod classifier;
pub mod file;
pub mod ingredients;
pub mod worker;

use tracing::{debug, info, warn};

pub use classifier::{ClassificationResponse, Classifier, HttpClassifier};
pub use file::{ImageFile, MAX_UPLOAD_BYTES};
pub use ingredients::{format_ingredients, ingredient_lines, EMPTY_PLACEHOLDER};
pub use worker::{UploadWorker, WorkerMessage};

use crate::error::UploadError;
use crate::metrics::MetricState;

/// Where the current attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Local reference to an uploaded image, shown as its preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    pub uri: String,
    pub size: u64,
}

impl PreviewRef {
    pub fn for_file(file: &ImageFile) -> Self {
        Self {
            uri: format!("file://{}", file.name),
            size: file.size(),
        }
    }
}

/// Handle for one submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    seq: u64,
    preview: PreviewRef,
}

impl UploadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a completion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Applied; `ingested` tells whether the readings replaced `current`.
    Succeeded { ingested: bool },
    /// Applied as a failure.
    Failed(UploadError),
    /// Superseded by a newer attempt or a removal; nothing changed.
    Stale,
}

/// Upload state exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadView<'a> {
    pub is_loading: bool,
    pub error: Option<&'a str>,
    pub preview: Option<&'a PreviewRef>,
    pub ingredient_text: &'a str,
}

#[derive(Debug, Clone)]
pub struct UploadPipeline {
    phase: UploadPhase,
    is_loading: bool,
    error: Option<String>,
    preview: Option<PreviewRef>,
    ingredients: String,
    latest_seq: u64,
    in_flight: Option<u64>,
}

impl UploadPipeline {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            is_loading: false,
            error: None,
            preview: None,
            ingredients: String::new(),
            latest_seq: 0,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    pub fn ingredient_text(&self) -> &str {
        &self.ingredients
    }

    pub fn view(&self) -> UploadView<'_> {
        UploadView {
            is_loading: self.is_loading,
            error: self.error(),
            preview: self.preview(),
            ingredient_text: &self.ingredients,
        }
    }

    /// Start an attempt. Supersedes any earlier attempt and clears the stale
    /// preview; a validation failure ends the attempt without a ticket.
    pub fn begin(&mut self, file: &ImageFile) -> Result<UploadTicket, UploadError> {
        self.latest_seq += 1;
        self.in_flight = None;
        self.error = None;
        self.preview = None;
        self.is_loading = true;
        self.phase = UploadPhase::Validating;

        if let Err(e) = file.validate() {
            info!(file = %file.name, size = file.size(), error = %e, "rejected upload");
            self.fail(&e);
            return Err(e);
        }

        self.phase = UploadPhase::Submitting;
        self.in_flight = Some(self.latest_seq);
        info!(file = %file.name, size = file.size(), seq = self.latest_seq, "submitting image");
        Ok(UploadTicket {
            seq: self.latest_seq,
            preview: PreviewRef::for_file(file),
        })
    }

    /// End a new attempt that failed before it could be validated, e.g. an
    /// unreadable file. Supersedes any in-flight attempt like `begin` does.
    pub fn reject(&mut self, error: &UploadError) {
        self.latest_seq += 1;
        self.in_flight = None;
        warn!(seq = self.latest_seq, error = %error, "upload could not start");
        self.fail(error);
    }

    /// Apply the result of a submitted attempt.
    pub fn finish(
        &mut self,
        ticket: UploadTicket,
        outcome: Result<ClassificationResponse, UploadError>,
        metrics: &mut MetricState,
    ) -> Completion {
        if self.in_flight != Some(ticket.seq) {
            debug!(seq = ticket.seq, latest = self.latest_seq, "discarding stale upload result");
            return Completion::Stale;
        }
        self.in_flight = None;

        let response = match outcome.and_then(|r| r.error().map_or(Ok(r), Err)) {
            Ok(response) => response,
            Err(e) => {
                warn!(seq = ticket.seq, error = %e, "upload failed");
                self.fail(&e);
                return Completion::Failed(e);
            }
        };

        self.preview = Some(ticket.preview);
        self.ingredients = response.ingredient_text().to_string();
        let readings = response.readings();
        if let Some(readings) = &readings {
            metrics.ingest(readings);
        } else {
            debug!(seq = ticket.seq, "response carried no usable nutrition vector");
        }
        self.is_loading = false;
        self.phase = UploadPhase::Succeeded;
        info!(seq = ticket.seq, ingested = readings.is_some(), "upload succeeded");
        Completion::Succeeded {
            ingested: readings.is_some(),
        }
    }

    /// Validate, submit and apply in one blocking call.
    pub fn submit(
        &mut self,
        file: &ImageFile,
        classifier: &dyn Classifier,
        metrics: &mut MetricState,
    ) -> Completion {
        match self.begin(file) {
            Ok(ticket) => {
                let outcome = classifier.classify(file);
                self.finish(ticket, outcome, metrics)
            }
            Err(e) => Completion::Failed(e),
        }
    }

    /// User removed the image: drop preview, error, ingredients and current readings.
    pub fn remove(&mut self, metrics: &mut MetricState) {
        if let Some(seq) = self.in_flight.take() {
            debug!(seq, "abandoning in-flight upload");
        }
        self.preview = None;
        self.error = None;
        self.ingredients.clear();
        self.is_loading = false;
        self.phase = UploadPhase::Idle;
        metrics.clear_current();
    }

    fn fail(&mut self, error: &UploadError) {
        self.error = Some(error.user_message());
        self.preview = None;
        self.is_loading = false;
        self.phase = UploadPhase::Failed;
    }
}

impl Default for UploadPipeline {
    fn default() -> Self {
        Self::new()
    }
}
