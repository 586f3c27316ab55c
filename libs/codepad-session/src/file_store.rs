/// File Store - ordered in-memory files and the active-file pointer
///
/// **Invariants:**
/// - Every file name carries a recognized extension, and the file's language
///   is the one that extension maps to
/// - Exactly one file is active whenever the store is non-empty
/// - Ids are fresh UUIDs, never reused
///
/// The store knows nothing about test cases or confirmation prompts; the
/// session decides when a language-changing rename may be applied.

use codepad_common::error::{Result, SessionError};
use codepad_common::templates::{language_for_file_name, rename_for_language, template_for};
use codepad_common::types::{File, FileId, Language};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: Vec<File>,
    active: Option<FileId>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file from its name, seeded with the language boilerplate,
    /// and make it active
    pub fn create(&mut self, name: &str) -> Result<FileId> {
        let language = language_for_file_name(name)?;
        let id = Uuid::new_v4();

        self.files.push(File {
            id,
            name: name.trim().to_string(),
            language,
            content: template_for(language).to_string(),
        });
        self.active = Some(id);

        debug!(file_id = %id, name = name.trim(), language = %language, "File created");
        Ok(id)
    }

    /// Rename a file. The language follows the new extension; content is
    /// never touched. Returns the file's language after the rename.
    pub fn rename(&mut self, id: FileId, new_name: &str) -> Result<Language> {
        let language = language_for_file_name(new_name)?;
        let file = self.get_mut(id)?;
        file.name = new_name.trim().to_string();
        file.language = language;
        Ok(language)
    }

    /// Switch a file's language, carrying the name's extension along
    pub fn set_language(&mut self, id: FileId, language: Language) -> Result<()> {
        let file = self.get_mut(id)?;
        file.name = rename_for_language(&file.name, language);
        file.language = language;
        Ok(())
    }

    /// Remove a file. The last file cannot be removed.
    ///
    /// When the active file goes, the file now at the same index becomes
    /// active, or the new last file if the index ran off the end.
    pub fn delete(&mut self, id: FileId) -> Result<File> {
        let index = self.position(id).ok_or_else(|| SessionError::file_not_found(id))?;
        if self.files.len() == 1 {
            return Err(SessionError::LastFile);
        }

        let removed = self.files.remove(index);
        if self.active == Some(id) {
            let next = index.min(self.files.len() - 1);
            self.active = Some(self.files[next].id);
        }

        debug!(file_id = %id, name = %removed.name, "File deleted");
        Ok(removed)
    }

    pub fn set_active(&mut self, id: FileId) -> Result<()> {
        if self.position(id).is_none() {
            return Err(SessionError::file_not_found(id));
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn update_content(&mut self, id: FileId, text: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.content = text.into();
        Ok(())
    }

    pub fn get(&self, id: FileId) -> Result<&File> {
        self.files
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| SessionError::file_not_found(id))
    }

    fn get_mut(&mut self, id: FileId) -> Result<&mut File> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| SessionError::file_not_found(id))
    }

    fn position(&self, id: FileId) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    pub fn active_id(&self) -> Option<FileId> {
        self.active
    }

    pub fn active(&self) -> Result<&File> {
        let id = self.active.ok_or(SessionError::NoActiveFile)?;
        self.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&File> {
        let name = name.trim();
        self.files.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
