use crate::{error::FinderError, filter::FilterCriteria};

/// Where the UI stands between actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    IdleWithReply,
    IdleWithError,
}

/// Process-wide UI state.
///
/// Selector edits go to `draft`; only a search copies them into `criteria`.
/// `reset` restores every field to its default in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Form values being edited
    pub draft: FilterCriteria,
    /// Criteria of the last submitted search
    pub criteria: FilterCriteria,
    /// Last complete assistant reply; empty when there is none
    pub reply: String,
    /// Message of the last failed remote call
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits the draft form.
    pub fn submit(&mut self) -> &FilterCriteria {
        self.criteria = self.draft.clone();
        &self.criteria
    }

    /// Restores every filter field and the conversation state to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reply(&self) -> Option<&str> {
        if self.reply.is_empty() {
            None
        } else {
            Some(&self.reply)
        }
    }

    /// Replaces the held reply after a successful question.
    pub fn set_reply(&mut self, reply: String) {
        self.reply = reply;
        self.last_error = None;
    }

    /// Records a failed remote call. The previous reply is kept.
    pub fn record_error(&mut self, error: &FinderError) {
        self.last_error = Some(error.to_string());
    }

    /// Forgets the last failure once a later action succeeds.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn status(&self) -> Status {
        if self.last_error.is_some() {
            Status::IdleWithError
        } else if self.reply().is_some() {
            Status::IdleWithReply
        } else {
            Status::Idle
        }
    }
}
