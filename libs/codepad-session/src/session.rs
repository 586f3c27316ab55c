/// Session - the aggregate every UI event is applied to
///
/// Owns the file store, one test case set per file, and the pending
/// language change. What used to be ambient UI state (which file is open,
/// which case is shown, whether a prompt is up) is an explicit field here,
/// so the whole state machine can be driven without a rendering layer.
///
/// Commands are synchronous. A command that returns an error has not
/// changed anything.

use std::collections::HashMap;

use codepad_common::config::Config;
use codepad_common::error::{Result, SessionError};
use codepad_common::types::{File, FileId, TestCaseId};
use serde::Serialize;
use tracing::{debug, info};

use crate::file_store::FileStore;
use crate::language::PendingTransition;
use crate::test_cases::TestCaseSet;

#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) files: FileStore,
    pub(crate) test_cases: HashMap<FileId, TestCaseSet>,
    pub(crate) pending_transition: Option<PendingTransition>,
}

/// Read-only view handed to whatever renders the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub active_file: Option<FileId>,
    pub files: Vec<FileSnapshot>,
    pub pending_transition: Option<PendingTransition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSnapshot {
    #[serde(flatten)]
    pub file: File,
    pub test_cases: TestCaseSet,
}

impl Session {
    /// Start a session holding a single file
    pub fn new(default_file_name: &str) -> Result<Self> {
        let mut session = Self {
            files: FileStore::new(),
            test_cases: HashMap::new(),
            pending_transition: None,
        };
        session.create_file(default_file_name)?;
        Ok(session)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.default_file_name)
    }

    // ─────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────

    pub fn create_file(&mut self, name: &str) -> Result<FileId> {
        let id = self.files.create(name)?;
        self.test_cases.insert(id, TestCaseSet::new());
        self.drop_transition_unless(id);
        info!(file_id = %id, name = name.trim(), "File opened");
        Ok(id)
    }

    /// Close a file along with its test cases. The last file stays.
    pub fn delete_file(&mut self, id: FileId) -> Result<()> {
        let removed = self.files.delete(id)?;
        self.test_cases.remove(&id);
        self.cancel_transition_for(id);
        info!(file_id = %id, name = %removed.name, "File closed");
        Ok(())
    }

    pub fn set_active(&mut self, id: FileId) -> Result<()> {
        self.files.set_active(id)?;
        self.drop_transition_unless(id);
        Ok(())
    }

    pub fn update_content(&mut self, id: FileId, text: impl Into<String>) -> Result<()> {
        self.files.update_content(id, text)
    }

    /// A pending language change belongs to one file; moving focus elsewhere
    /// abandons it
    fn drop_transition_unless(&mut self, id: FileId) {
        if let Some(pending) = &self.pending_transition {
            if pending.file_id != id {
                debug!(file_id = %pending.file_id, "Focus moved, pending language change dropped");
                self.pending_transition = None;
            }
        }
    }

    pub fn file(&self, id: FileId) -> Result<&File> {
        self.files.get(id)
    }

    pub fn active_file(&self) -> Result<&File> {
        self.files.active()
    }

    pub fn file_by_name(&self, name: &str) -> Option<&File> {
        self.files.find_by_name(name)
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.iter()
    }

    // ─────────────────────────────────────────────────────────────
    // Test cases of the active file
    // ─────────────────────────────────────────────────────────────

    pub fn add_test_case(&mut self) -> Result<TestCaseId> {
        let (file_id, cases) = self.active_cases_mut()?;
        let id = cases.add();
        debug!(file_id = %file_id, test_case_id = id, "Test case added");
        Ok(id)
    }

    /// Returns `Ok(false)` when the case is the file's last one and was kept
    pub fn remove_test_case(&mut self, id: TestCaseId) -> Result<bool> {
        let (file_id, cases) = self.active_cases_mut()?;
        let removed = cases.remove(id)?;
        if removed {
            debug!(file_id = %file_id, test_case_id = id, "Test case removed");
        }
        Ok(removed)
    }

    pub fn set_test_input(&mut self, id: TestCaseId, text: impl Into<String>) -> Result<()> {
        self.active_cases_mut()?.1.set_input(id, text)
    }

    pub fn select_test_case(&mut self, id: TestCaseId) -> Result<()> {
        self.active_cases_mut()?.1.select(id)
    }

    /// Test cases of the active file
    pub fn test_cases(&self) -> Result<&TestCaseSet> {
        let id = self.files.active_id().ok_or(SessionError::NoActiveFile)?;
        self.test_cases_for(id)
    }

    pub fn test_cases_for(&self, file_id: FileId) -> Result<&TestCaseSet> {
        self.test_cases
            .get(&file_id)
            .ok_or_else(|| SessionError::file_not_found(file_id))
    }

    pub(crate) fn active_cases_mut(&mut self) -> Result<(FileId, &mut TestCaseSet)> {
        let id = self.files.active_id().ok_or(SessionError::NoActiveFile)?;
        let cases = self
            .test_cases
            .get_mut(&id)
            .ok_or_else(|| SessionError::file_not_found(id))?;
        Ok((id, cases))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_file: self.files.active_id(),
            files: self
                .files
                .iter()
                .filter_map(|file| {
                    self.test_cases.get(&file.id).map(|cases| FileSnapshot {
                        file: file.clone(),
                        test_cases: cases.clone(),
                    })
                })
                .collect(),
            pending_transition: self.pending_transition.clone(),
        }
    }
}
