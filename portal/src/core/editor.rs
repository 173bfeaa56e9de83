//! Create/edit and delete-confirmation flows, independent of any dialog chrome.
//!
//! A failed submission keeps the editor open with its draft so the user can
//! retry without re-entering data. A successful one closes it and asks the
//! list to refresh.

use crate::core::types::Notice;
use crate::core::validation::{FormDraft, ValidationError};

/// Request the caller must send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<D> {
    Create(D),
    Update(i64, D),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent<D> {
    OpenNew(D),
    OpenEdit(i64, D),
    /// Replace the draft while the editor is open.
    Change(D),
    Submit,
    Succeeded,
    Failed(String),
    Cancel,
}

/// Effects of one editor transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStep<D> {
    pub mutation: Option<Mutation<D>>,
    pub notice: Option<Notice>,
    /// Submission was rejected at the form boundary.
    pub invalid: Option<ValidationError>,
    /// The owning list should re-fetch.
    pub refresh: bool,
}

impl<D> Default for EditorStep<D> {
    fn default() -> Self {
        Self {
            mutation: None,
            notice: None,
            invalid: None,
            refresh: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor<D> {
    Closed,
    Open {
        /// `None` when creating.
        target: Option<i64>,
        draft: D,
        submitting: bool,
    },
}

impl<D> Default for Editor<D> {
    fn default() -> Self {
        Editor::Closed
    }
}

impl<D: FormDraft> Editor<D> {
    pub fn is_open(&self) -> bool {
        matches!(self, Editor::Open { .. })
    }

    /// A submitted mutation is awaiting its outcome.
    pub fn is_submitting(&self) -> bool {
        matches!(
            self,
            Editor::Open {
                submitting: true,
                ..
            }
        )
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Editor::Open { draft, .. } => Some(draft),
            Editor::Closed => None,
        }
    }

    /// Dialog title for the current mode.
    pub fn title(&self) -> Option<String> {
        match self {
            Editor::Open { target: Some(_), .. } => Some(format!("Edit {}", D::NOUN)),
            Editor::Open { target: None, .. } => Some(format!("Add {}", D::NOUN)),
            Editor::Closed => None,
        }
    }

    pub fn apply(&mut self, event: EditorEvent<D>) -> EditorStep<D> {
        match event {
            EditorEvent::OpenNew(draft) => {
                *self = Editor::Open {
                    target: None,
                    draft,
                    submitting: false,
                };
                EditorStep::default()
            }
            EditorEvent::OpenEdit(id, draft) => {
                *self = Editor::Open {
                    target: Some(id),
                    draft,
                    submitting: false,
                };
                EditorStep::default()
            }
            EditorEvent::Change(next) => {
                if let Editor::Open {
                    draft,
                    submitting: false,
                    ..
                } = self
                {
                    *draft = next;
                }
                EditorStep::default()
            }
            EditorEvent::Submit => self.submit(),
            EditorEvent::Succeeded => {
                let Editor::Open {
                    target,
                    submitting: true,
                    ..
                } = self
                else {
                    return EditorStep::default();
                };
                let verb = if target.is_some() { "updated" } else { "created" };
                let notice = Notice::success(format!("{} {verb}", capitalized(D::NOUN)));
                *self = Editor::Closed;
                EditorStep {
                    notice: Some(notice),
                    refresh: true,
                    ..EditorStep::default()
                }
            }
            EditorEvent::Failed(message) => {
                if let Editor::Open { submitting, .. } = self {
                    *submitting = false;
                }
                EditorStep {
                    notice: Some(Notice::error(message)),
                    ..EditorStep::default()
                }
            }
            EditorEvent::Cancel => {
                *self = Editor::Closed;
                EditorStep::default()
            }
        }
    }

    fn submit(&mut self) -> EditorStep<D> {
        let Editor::Open {
            target,
            draft,
            submitting,
        } = self
        else {
            return EditorStep::default();
        };
        if *submitting {
            return EditorStep::default();
        }
        match draft.clone().checked() {
            Ok(checked) => {
                *draft = checked.clone();
                *submitting = true;
                let mutation = match target {
                    Some(id) => Mutation::Update(*id, checked),
                    None => Mutation::Create(checked),
                };
                EditorStep {
                    mutation: Some(mutation),
                    ..EditorStep::default()
                }
            }
            Err(invalid) => EditorStep {
                invalid: Some(invalid),
                ..EditorStep::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteConfirm {
    #[default]
    Idle,
    Pending(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteEvent {
    Request(i64),
    Confirm,
    Dismiss,
}

impl DeleteConfirm {
    /// Returns the id to delete when a pending request is confirmed.
    pub fn apply(&mut self, event: DeleteEvent) -> Option<i64> {
        let confirmed = match (event, *self) {
            (DeleteEvent::Request(id), _) => {
                *self = DeleteConfirm::Pending(id);
                return None;
            }
            (DeleteEvent::Confirm, DeleteConfirm::Pending(id)) => Some(id),
            (DeleteEvent::Confirm | DeleteEvent::Dismiss, _) => None,
        };
        *self = DeleteConfirm::Idle;
        confirmed
    }
}

/// Notice and refresh for a finished delete of a `noun`.
pub fn delete_outcome<D>(noun: &str, result: Result<(), String>) -> EditorStep<D> {
    match result {
        Ok(()) => EditorStep {
            notice: Some(Notice::success(format!("{} deleted", capitalized(noun)))),
            refresh: true,
            ..EditorStep::default()
        },
        Err(message) => EditorStep {
            notice: Some(Notice::error(message)),
            ..EditorStep::default()
        },
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
