/// Language Transition Controller
///
/// Changing a file's language may overwrite work, so it is a two-step state
/// machine: Idle → AwaitingConfirmation → Idle. The pending state lives on
/// the session as `Option<PendingTransition>`; `None` is Idle.
///
/// A switch skips confirmation when nothing would be lost (the file is
/// blank or still holds its language's boilerplate) and is applied with
/// reset semantics straight away.

use codepad_common::error::{Result, SessionError};
use codepad_common::templates::{language_for_file_name, rename_for_language, template_for};
use codepad_common::types::{FileId, Language};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransition {
    pub file_id: FileId,
    pub from_language: Language,
    pub target_language: Language,
    /// File name to apply once confirmed
    pub target_name: String,
    /// Content at the moment the change was requested
    pub content_snapshot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransitionChoice {
    /// Switch language, leave the code as it is
    Keep,
    /// Switch language, replace the code with the new boilerplate
    Reset,
    /// Abandon the switch
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The language did not change
    Unchanged,
    /// Switched without asking; content replaced by the new boilerplate
    Applied,
    /// Waiting on `resolve_transition`
    AwaitingConfirmation,
}

/// Whether switching away from `language` would discard anything
fn content_is_disposable(content: &str, language: Language) -> bool {
    content.trim().is_empty() || content == template_for(language)
}

impl Session {
    /// Ask to switch the active file to `target`
    pub fn request_language(&mut self, target: Language) -> Result<TransitionOutcome> {
        let file_id = self.files.active_id().ok_or(SessionError::NoActiveFile)?;
        let target_name = rename_for_language(&self.files.get(file_id)?.name, target);
        self.begin_transition(file_id, target, target_name)
    }

    /// Rename a file. A new extension that implies another language goes
    /// through the same confirmation as picking that language directly.
    pub fn rename_file(&mut self, file_id: FileId, new_name: &str) -> Result<TransitionOutcome> {
        let target = language_for_file_name(new_name)?;
        let current = self.files.get(file_id)?.language;

        if self
            .pending_transition
            .as_ref()
            .is_some_and(|pending| pending.file_id == file_id)
        {
            return Err(SessionError::TransitionPending);
        }

        if target == current {
            self.files.rename(file_id, new_name)?;
            return Ok(TransitionOutcome::Unchanged);
        }

        self.begin_transition(file_id, target, new_name.trim().to_string())
    }

    fn begin_transition(
        &mut self,
        file_id: FileId,
        target: Language,
        target_name: String,
    ) -> Result<TransitionOutcome> {
        if self.pending_transition.is_some() {
            return Err(SessionError::TransitionPending);
        }

        let file = self.files.get(file_id)?;
        if file.language == target {
            return Ok(TransitionOutcome::Unchanged);
        }

        if content_is_disposable(&file.content, file.language) {
            let from = file.language;
            self.files.rename(file_id, &target_name)?;
            self.files.update_content(file_id, template_for(target))?;
            info!(file_id = %file_id, from = %from, to = %target, "Language switched");
            return Ok(TransitionOutcome::Applied);
        }

        debug!(file_id = %file_id, from = %file.language, to = %target, "Language change awaiting confirmation");
        self.pending_transition = Some(PendingTransition {
            file_id,
            from_language: file.language,
            target_language: target,
            target_name,
            content_snapshot: file.content.clone(),
        });
        Ok(TransitionOutcome::AwaitingConfirmation)
    }

    /// Settle the pending language change. Every choice returns to Idle.
    pub fn resolve_transition(&mut self, choice: TransitionChoice) -> Result<()> {
        let pending = self
            .pending_transition
            .take()
            .ok_or(SessionError::NoPendingTransition)?;

        if choice == TransitionChoice::Cancel {
            debug!(file_id = %pending.file_id, "Language change cancelled");
            return Ok(());
        }

        self.files.rename(pending.file_id, &pending.target_name)?;
        if choice == TransitionChoice::Reset {
            self.files
                .update_content(pending.file_id, template_for(pending.target_language))?;
        }

        info!(
            file_id = %pending.file_id,
            from = %pending.from_language,
            to = %pending.target_language,
            choice = ?choice,
            "Language switched"
        );
        Ok(())
    }

    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.pending_transition.as_ref()
    }

    /// Drop a pending change aimed at `file_id`, if any
    pub(crate) fn cancel_transition_for(&mut self, file_id: FileId) {
        if self
            .pending_transition
            .as_ref()
            .is_some_and(|p| p.file_id == file_id)
        {
            debug!(file_id = %file_id, "Pending language change dropped");
            self.pending_transition = None;
        }
    }
}
