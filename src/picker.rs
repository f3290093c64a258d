use thiserror::Error;
use tracing::{info, warn};

use crate::{image_utils::ImageFile, preview::PreviewSource};

pub const INVALID_FILE_NOTICE: &str = "Please select an image file";
pub const INVALID_DROP_NOTICE: &str = "Please select a valid image file";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("{mime:?} is not an image type")]
    InvalidFileType { mime: String },

    #[error("only one file can be dropped at a time, got {0}")]
    MultipleFiles(usize),
}

#[derive(Debug)]
pub struct SelectedImage<H> {
    pub file: ImageFile,
    pub preview: H,
}

impl<H> SelectedImage<H> {
    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.file.size_bytes()
    }
}

/// Selection state of the image input: the chosen file, its preview and the
/// drag-over flag.
///
/// At most one preview handle is live. It is released when a new file
/// replaces it, on [`ImagePicker::clear`] and when the picker is dropped.
pub struct ImagePicker<P: PreviewSource> {
    previews: P,
    selection: Option<SelectedImage<P::Handle>>,
    pub drag_active: bool,
    notice: Option<String>,
}

impl<P: PreviewSource> ImagePicker<P> {
    pub fn new(previews: P) -> Self {
        Self {
            previews,
            selection: None,
            drag_active: false,
            notice: None,
        }
    }

    pub fn selection(&self) -> Option<&SelectedImage<P::Handle>> {
        self.selection.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn select_file(
        &mut self,
        candidate: ImageFile,
    ) -> Result<&SelectedImage<P::Handle>, PickerError> {
        self.select_with_notice(candidate, INVALID_FILE_NOTICE)
    }

    fn select_with_notice(
        &mut self,
        candidate: ImageFile,
        notice: &str,
    ) -> Result<&SelectedImage<P::Handle>, PickerError> {
        if !candidate.is_image() {
            warn!(name = %candidate.name, mime = %candidate.mime_type, "rejected non-image file");
            self.notice = Some(notice.to_string());
            return Err(PickerError::InvalidFileType {
                mime: candidate.mime_type,
            });
        }

        // Release before allocating so two handles never coexist
        if let Some(previous) = self.selection.take() {
            self.previews.release(previous.preview);
        }
        let preview = self.previews.create(&candidate);

        info!(
            name = %candidate.name,
            mime = %candidate.mime_type,
            bytes = candidate.size_bytes(),
            "image selected"
        );
        let selected = self.selection.insert(SelectedImage {
            file: candidate,
            preview,
        });
        Ok(&*selected)
    }

    pub fn clear(&mut self) {
        if let Some(selected) = self.selection.take() {
            self.previews.release(selected.preview);
        }
    }

    /// Hands the selected file to `on_send` unless nothing is selected or a
    /// submission is already in flight. Returns whether `on_send` ran.
    pub fn confirm_send<F>(&self, busy: bool, on_send: F) -> bool
    where
        F: FnOnce(&ImageFile),
    {
        match &self.selection {
            Some(selected) if !busy => {
                on_send(&selected.file);
                true
            }
            _ => false,
        }
    }

    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
    }

    /// Handles a drop on the input. Only a single file is accepted; a drop of
    /// several is rejected as a whole.
    pub fn handle_drop(
        &mut self,
        mut files: Vec<ImageFile>,
    ) -> Result<Option<&SelectedImage<P::Handle>>, PickerError> {
        self.drag_active = false;
        if files.len() > 1 {
            warn!(count = files.len(), "rejected multi-file drop");
            self.notice = Some(INVALID_DROP_NOTICE.to_string());
            return Err(PickerError::MultipleFiles(files.len()));
        }
        let Some(candidate) = files.pop() else {
            return Ok(None);
        };
        self.select_with_notice(candidate, INVALID_DROP_NOTICE)
            .map(Some)
    }

    /// Reports a problem that happened before a candidate existed, such as an
    /// unreadable dropped file.
    pub fn reject(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn status_line(&self, placeholder: &str) -> String {
        match &self.selection {
            Some(selected) => format!("Image: {}", selected.file.name),
            None => placeholder.to_string(),
        }
    }

    pub fn size_label(&self) -> Option<String> {
        self.selection
            .as_ref()
            .map(|selected| format!("{} ({:.2} MB)", selected.file.name, selected.file.size_mb()))
    }
}

impl<P: PreviewSource> Drop for ImagePicker<P> {
    fn drop(&mut self) {
        self.clear();
    }
}
