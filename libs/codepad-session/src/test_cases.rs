/// Test Case Manager - the ordered test cases of one file
///
/// A set is never empty: it starts with one case and refuses to drop its
/// last one. Ids come from a counter that only moves forward, so an id is
/// never handed out twice even after deletions.

use codepad_common::error::{Result, SessionError};
use codepad_common::types::{TestCase, TestCaseId, TestCaseStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TestCaseSet {
    cases: Vec<TestCase>,
    selected: TestCaseId,
    #[serde(skip)]
    next_id: TestCaseId,
}

impl Default for TestCaseSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCaseSet {
    /// A set holding a single empty, pending case
    pub fn new() -> Self {
        Self {
            cases: vec![TestCase::new(1)],
            selected: 1,
            next_id: 2,
        }
    }

    /// Append an empty case and select it
    pub fn add(&mut self) -> TestCaseId {
        let id = self.next_id;
        self.next_id += 1;
        self.cases.push(TestCase::new(id));
        self.selected = id;
        id
    }

    /// Remove a case. Returns `Ok(false)` without touching anything when it
    /// is the only case left.
    pub fn remove(&mut self, id: TestCaseId) -> Result<bool> {
        let index = self
            .cases
            .iter()
            .position(|tc| tc.id == id)
            .ok_or_else(|| SessionError::test_case_not_found(id))?;

        if self.cases.len() == 1 {
            return Ok(false);
        }

        self.cases.remove(index);
        if self.selected == id {
            self.selected = self.cases[0].id;
        }
        Ok(true)
    }

    /// Replace a case's input. Any previous result is stale from here on.
    pub fn set_input(&mut self, id: TestCaseId, text: impl Into<String>) -> Result<()> {
        let case = self.get_mut(id)?;
        case.input = text.into();
        case.output = None;
        case.status = TestCaseStatus::Pending;
        case.last_run_at = None;
        case.active_run = None;
        Ok(())
    }

    pub fn select(&mut self, id: TestCaseId) -> Result<()> {
        self.get(id)?;
        self.selected = id;
        Ok(())
    }

    pub fn get(&self, id: TestCaseId) -> Result<&TestCase> {
        self.cases
            .iter()
            .find(|tc| tc.id == id)
            .ok_or_else(|| SessionError::test_case_not_found(id))
    }

    pub(crate) fn get_mut(&mut self, id: TestCaseId) -> Result<&mut TestCase> {
        self.cases
            .iter_mut()
            .find(|tc| tc.id == id)
            .ok_or_else(|| SessionError::test_case_not_found(id))
    }

    pub(crate) fn find_mut(&mut self, id: TestCaseId) -> Option<&mut TestCase> {
        self.cases.iter_mut().find(|tc| tc.id == id)
    }

    pub fn selected_id(&self) -> TestCaseId {
        self.selected
    }

    pub fn selected(&self) -> &TestCase {
        // selection always points at a live case
        self.cases
            .iter()
            .find(|tc| tc.id == self.selected)
            .unwrap_or(&self.cases[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
