use anyhow::Result;
use tracing::{debug, info};

use crate::{config::UploadConfig, image_utils::ImageFile};

use super::uploader::{UploadOutcome, Uploader};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Uploading,
    Done,
}

/// Submission lifecycle of the page: one upload in flight at most, result or
/// error text kept until the next submission.
pub struct PageController {
    uploader: Uploader,
    phase: Phase,
    result_text: Option<String>,
    failed: bool,
}

impl PageController {
    pub fn new(config: &UploadConfig) -> Result<Self> {
        Ok(Self::with_uploader(Uploader::new(config)?))
    }

    pub fn with_uploader(uploader: Uploader) -> Self {
        Self {
            uploader,
            phase: Phase::Idle,
            result_text: None,
            failed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == Phase::Uploading
    }

    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    /// Whether the last finished submission ended in an error.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Starts uploading `file`. A submission while another is in flight is
    /// ignored and returns `false`.
    pub fn submit(&mut self, file: &ImageFile) -> bool {
        if self.is_uploading() {
            debug!(name = %file.name, "submit ignored, upload in flight");
            return false;
        }

        self.phase = Phase::Uploading;
        self.result_text = None;
        if let Err(err) = self.uploader.queue_upload(file.clone()) {
            self.finish(format!("Error: {err:#}"), true);
        }
        true
    }

    /// Applies finished uploads. Call once per frame.
    pub fn poll(&mut self) {
        for outcome in self.uploader.check_completions() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: UploadOutcome) {
        match outcome.result {
            Ok(pretty) => {
                info!(name = %outcome.file_name, "analysis received");
                self.finish(pretty, false);
            }
            Err(err) => self.finish(format!("Error: {err}"), true),
        }
    }

    fn finish(&mut self, text: String, failed: bool) {
        self.result_text = Some(text);
        self.failed = failed;
        self.phase = Phase::Done;
    }
}
