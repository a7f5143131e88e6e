use serde::Serialize;

use crate::models::NewTask;
use crate::tasks::due_date_only;

/// Attachment cap checked at capture time.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Decoded size of a base64 data URI, estimated from the payload length
/// without decoding.
pub fn image_size_bytes(data_uri: &str) -> usize {
    let payload = data_uri
        .split_once(',')
        .map(|(_, payload)| payload)
        .unwrap_or(data_uri);
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() / 4 * 3).saturating_sub(padding)
}

pub fn image_too_large(data_uri: &str) -> bool {
    image_size_bytes(data_uri) > MAX_IMAGE_BYTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStep {
    Title,
    Image,
    Project,
    Done,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DraftError {
    TitleRequired,
    InvalidDueDate,
    ImageTooLarge,
    ProjectRequired,
    NotFinished,
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::TitleRequired => write!(f, "title required"),
            DraftError::InvalidDueDate => write!(f, "invalid due date"),
            DraftError::ImageTooLarge => write!(f, "image too large"),
            DraftError::ProjectRequired => write!(f, "project required"),
            DraftError::NotFinished => write!(f, "draft not finished"),
        }
    }
}

impl std::error::Error for DraftError {}

/// New-task capture as a small state machine: title and due date first, then
/// an optional image, then the project, then done. A rejected input (empty
/// title, oversized image) leaves the draft on the same step so the shell
/// re-offers it; cancel simply keeps the current step.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    step: DraftStep,
    title: String,
    description: String,
    due_date: String,
    image: Option<String>,
    project_id: Option<String>,
}

impl TaskDraft {
    pub fn new() -> Self {
        Self {
            step: DraftStep::Title,
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            image: None,
            project_id: None,
        }
    }

    pub fn step(&self) -> DraftStep {
        self.step
    }

    /// Title step: a non-empty title and a parseable due date move the draft
    /// on to image capture.
    pub fn submit_details(
        &mut self,
        title: &str,
        description: &str,
        due_date: &str,
    ) -> Result<(), DraftError> {
        if title.trim().is_empty() {
            return Err(DraftError::TitleRequired);
        }
        if due_date_only(due_date).is_none() {
            return Err(DraftError::InvalidDueDate);
        }
        self.title = title.trim().to_string();
        self.description = description.trim().to_string();
        self.due_date = due_date.to_string();
        self.step = DraftStep::Image;
        Ok(())
    }

    /// Image step: an oversized attachment is rejected, the field stays
    /// unset and the step is re-offered.
    pub fn attach_image(&mut self, data_uri: &str) -> Result<(), DraftError> {
        if image_too_large(data_uri) {
            return Err(DraftError::ImageTooLarge);
        }
        self.image = Some(data_uri.to_string());
        self.step = DraftStep::Project;
        Ok(())
    }

    /// The image is optional; skipping moves straight to project selection.
    pub fn skip_image(&mut self) {
        self.step = DraftStep::Project;
    }

    pub fn choose_project(&mut self, project_id: &str) -> Result<(), DraftError> {
        if project_id.trim().is_empty() {
            return Err(DraftError::ProjectRequired);
        }
        self.project_id = Some(project_id.trim().to_string());
        self.step = DraftStep::Done;
        Ok(())
    }

    /// Consumes a finished draft into the create payload.
    pub fn finish(self) -> Result<NewTask, DraftError> {
        if self.step != DraftStep::Done {
            return Err(DraftError::NotFinished);
        }
        Ok(NewTask {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            image: self.image,
            project_id: self.project_id.ok_or(DraftError::ProjectRequired)?,
        })
    }
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self::new()
    }
}
