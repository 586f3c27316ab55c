// Reset Controller - discard the active file's code

use codepad_common::error::Result;
use codepad_common::templates::template_for;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResetAction {
    /// Restore the language's starter code
    Boilerplate,
    /// Empty the file
    Clear,
}

impl Session {
    /// Overwrite the active file's content. There is no undo, and test cases
    /// are left as they are.
    pub fn reset_active(&mut self, action: ResetAction) -> Result<()> {
        let file = self.files.active()?;
        let (id, language) = (file.id, file.language);

        let content = match action {
            ResetAction::Boilerplate => template_for(language),
            ResetAction::Clear => "",
        };
        self.files.update_content(id, content)?;

        info!(file_id = %id, action = ?action, "File content reset");
        Ok(())
    }

    pub fn reset_to_boilerplate(&mut self) -> Result<()> {
        self.reset_active(ResetAction::Boilerplate)
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.reset_active(ResetAction::Clear)
    }
}
