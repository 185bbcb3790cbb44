//! Session — metric state and upload pipeline wired together.
//!
//! This is the whole surface the presentation layer reads from and drives.

use crate::error::UploadError;
use crate::metrics::{CommitReceipt, GoalPreset, Metric, MetricState, METRIC_COUNT};
use crate::store::KeyValueStore;
use crate::upload::{
    format_ingredients, ClassificationResponse, Classifier, Completion, ImageFile, UploadPipeline,
    UploadTicket, UploadView,
};

#[derive(Debug)]
pub struct Session {
    metrics: MetricState,
    upload: UploadPipeline,
}

impl Session {
    /// Restore persisted metrics and start with an idle pipeline.
    pub fn start(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            metrics: MetricState::restore(store),
            upload: UploadPipeline::new(),
        }
    }

    pub fn metrics(&self) -> &[Metric; METRIC_COUNT] {
        self.metrics.metrics()
    }

    pub fn metric_state(&self) -> &MetricState {
        &self.metrics
    }

    pub fn upload_view(&self) -> UploadView<'_> {
        self.upload.view()
    }

    pub fn pipeline(&self) -> &UploadPipeline {
        &self.upload
    }

    /// Whether "reset max" should be offered.
    pub fn has_non_default_max(&self) -> bool {
        self.metrics.has_non_default_max()
    }

    /// Ingredient display lines (bullets, or the empty-state placeholder).
    pub fn ingredient_display(&self) -> Vec<String> {
        format_ingredients(self.upload.ingredient_text())
    }

    pub fn apply_preset(&mut self, preset: GoalPreset) {
        self.metrics.apply_preset(preset);
    }

    pub fn set_max(&mut self, index: usize, raw: &str) -> bool {
        self.metrics.set_max(index, raw)
    }

    pub fn commit(&mut self) -> CommitReceipt {
        self.metrics.commit()
    }

    pub fn reset_values(&mut self) {
        self.metrics.reset_values();
    }

    pub fn reset_max(&mut self) {
        self.metrics.reset_max();
    }

    /// Validate, classify and apply in one blocking call.
    pub fn upload(&mut self, file: &ImageFile, classifier: &dyn Classifier) -> Completion {
        self.upload.submit(file, classifier, &mut self.metrics)
    }

    /// Start an attempt whose classification runs elsewhere.
    pub fn begin_upload(&mut self, file: &ImageFile) -> Result<UploadTicket, UploadError> {
        self.upload.begin(file)
    }

    /// Apply a classification that ran elsewhere.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        outcome: Result<ClassificationResponse, UploadError>,
    ) -> Completion {
        self.upload.finish(ticket, outcome, &mut self.metrics)
    }

    /// Record an attempt that failed before validation.
    pub fn reject_upload(&mut self, error: &UploadError) {
        self.upload.reject(error);
    }

    pub fn remove_image(&mut self) {
        self.upload.remove(&mut self.metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::STORAGE_KEY;
    use crate::store::MemoryStore;
    use crate::upload::EMPTY_PLACEHOLDER;

    struct Fixed(ClassificationResponse);

    impl Classifier for Fixed {
        fn classify(&self, _file: &ImageFile) -> Result<ClassificationResponse, UploadError> {
            Ok(self.0.clone())
        }
    }

    fn session() -> Session {
        Session::start(Box::new(MemoryStore::new()))
    }

    #[test]
    fn upload_then_commit_then_remove() {
        let mut session = session();
        let classifier = Fixed(ClassificationResponse::success(
            "oats\nbanana",
            &[350.0, 6.0, 0.0, 5.0, 66.0, 11.0],
        ));
        let file = ImageFile::new("breakfast.jpg", "image/jpeg", vec![0; 32]);

        session.upload(&file, &classifier);
        assert_eq!(session.ingredient_display(), ["\u{2022} oats", "\u{2022} banana"]);
        session.commit();
        session.remove_image();

        assert_eq!(session.metrics()[0].value, 350);
        assert_eq!(session.metrics()[0].current, 0);
        assert_eq!(session.ingredient_display(), [EMPTY_PLACEHOLDER]);
        assert!(session.upload_view().preview.is_none());
    }

    #[test]
    fn preset_then_reset_max() {
        let mut session = session();
        session.apply_preset(GoalPreset::BodyBuilder);
        assert!(session.has_non_default_max());
        session.reset_max();
        assert!(!session.has_non_default_max());
    }

    #[test]
    fn state_survives_restart() {
        let mut first = session();
        first.set_max(0, "2200");
        let raw = first.metric_state().store().get(STORAGE_KEY).unwrap().unwrap();

        let second = Session::start(Box::new(MemoryStore::with_entry(STORAGE_KEY, &raw)));
        assert_eq!(second.metrics()[0].max, 2200);
    }
}
