//! Background submission — runs the classifier off the UI thread and reports
//! back over an mpsc channel. Only the receiving thread touches session state.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::classifier::{ClassificationResponse, Classifier};
use super::file::ImageFile;
use super::UploadTicket;
use crate::error::UploadError;

/// A finished submission, ready for `UploadPipeline::finish`.
#[derive(Debug)]
pub struct WorkerMessage {
    pub ticket: UploadTicket,
    pub outcome: Result<ClassificationResponse, UploadError>,
}

/// Classify `file` on a new thread and send the outcome on `tx`.
fn spawn_submission(
    classifier: Arc<dyn Classifier>,
    ticket: UploadTicket,
    file: ImageFile,
    tx: mpsc::Sender<WorkerMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let outcome = classifier.classify(&file);
        // Receiver gone means the session ended; nothing left to update.
        let _ = tx.send(WorkerMessage { ticket, outcome });
    })
}

/// Owns the classifier and the completion channel.
pub struct UploadWorker {
    classifier: Arc<dyn Classifier>,
    tx: mpsc::Sender<WorkerMessage>,
    rx: mpsc::Receiver<WorkerMessage>,
}

impl UploadWorker {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { classifier, tx, rx }
    }

    /// Start a submission. Completion arrives through `poll`/`drain`.
    pub fn dispatch(&self, ticket: UploadTicket, file: ImageFile) -> JoinHandle<()> {
        spawn_submission(Arc::clone(&self.classifier), ticket, file, self.tx.clone())
    }

    /// Non-blocking poll for the next completion.
    pub fn poll(&self) -> Option<WorkerMessage> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending completions.
    pub fn drain(&self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadPipeline;

    struct Echo;

    impl Classifier for Echo {
        fn classify(&self, file: &ImageFile) -> Result<ClassificationResponse, UploadError> {
            Ok(ClassificationResponse::success(&file.name, &[1.0; 6]))
        }
    }

    #[test]
    fn dispatch_delivers_completion() {
        let worker = UploadWorker::new(Arc::new(Echo));
        let mut pipeline = UploadPipeline::new();
        let file = ImageFile::new("plate.png", "image/png", vec![0; 8]);
        let ticket = pipeline.begin(&file).unwrap();

        worker.dispatch(ticket.clone(), file).join().unwrap();
        let message = worker.poll().unwrap();
        assert_eq!(message.ticket, ticket);
        assert_eq!(message.outcome.unwrap().ingredient_text(), "plate.png");
        assert!(worker.poll().is_none());
    }

    #[test]
    fn drain_collects_everything() {
        let worker = UploadWorker::new(Arc::new(Echo));
        let mut pipeline = UploadPipeline::new();
        let mut handles = Vec::new();
        for name in ["a.png", "b.png"] {
            let file = ImageFile::new(name, "image/png", vec![0; 8]);
            let ticket = pipeline.begin(&file).unwrap();
            handles.push(worker.dispatch(ticket, file));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(worker.drain().len(), 2);
    }
}
