use chrono::{DateTime, Utc};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, TransportError};

pub type FileId = Uuid;
pub type TestCaseId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Cpp,
    Java,
    C,
}

impl Language {
    /// All supported languages, in selector order
    pub fn all() -> [Language; 5] {
        [
            Language::JavaScript,
            Language::Python,
            Language::Cpp,
            Language::Java,
            Language::C,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::C => "c",
        }
    }

    /// Human-facing label shown by the language selector
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript (Node.js)",
            Language::Python => "Python 3",
            Language::Cpp => "C++ (GCC)",
            Language::Java => "Java",
            Language::C => "C (GCC)",
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" => Ok(Language::JavaScript),
            "python" => Ok(Language::Python),
            "cpp" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            _ => Err(ConfigError::UnknownLanguage(s.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub name: String,
    pub language: Language,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseStatus {
    Pending,
    Running,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    pub input: String,
    /// `None` until a run completes after the last input edit
    pub output: Option<String>,
    pub status: TestCaseStatus,
    pub last_run_at: Option<DateTime<Utc>>,
    /// Run whose result this case is waiting for
    #[serde(skip)]
    pub active_run: Option<Uuid>,
}

impl TestCase {
    pub fn new(id: TestCaseId) -> Self {
        Self {
            id,
            input: String::new(),
            output: None,
            status: TestCaseStatus::Pending,
            last_run_at: None,
            active_run: None,
        }
    }
}

/// Body POSTed to the execution endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Status id the execution service reports for a clean run
pub const STATUS_ACCEPTED: u32 = 3;

/// Response from the execution endpoint.
///
/// Every field is optional: the service reports a submission result with
/// stdout/stderr/compile_output/status, while the local proxy answers
/// failures with a `{success, message}` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<ServiceStatus>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub memory: Option<u64>,
}

/// Normalized result of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub output: String,
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref()
        .map(str::trim_end)
        .filter(|t| !t.trim().is_empty())
}

impl CompileResponse {
    fn is_empty(&self) -> bool {
        self.success.is_none()
            && self.stdout.is_none()
            && self.stderr.is_none()
            && self.compile_output.is_none()
            && self.output.is_none()
            && self.message.is_none()
            && self.status.is_none()
    }

    /// Collapse the response into a single status and human-readable output.
    ///
    /// An Accepted status is trusted as a clean run even when stderr or the
    /// compiler printed something. Without a status, stderr counts as a
    /// failure. Compiler output replaces the program's output only when the
    /// run failed or produced no stdout.
    pub fn into_outcome(self) -> Result<RunOutcome, TransportError> {
        if self.is_empty() {
            return Err(TransportError::Malformed(
                "response carries no recognizable fields".to_string(),
            ));
        }

        let stdout = if self.stdout.is_some() {
            non_blank(&self.stdout)
        } else {
            non_blank(&self.output)
        };
        let stderr = non_blank(&self.stderr);

        let clean = match &self.status {
            Some(status) => status.id == STATUS_ACCEPTED,
            None => stderr.is_none(),
        };
        let success = self.success != Some(false) && clean;

        if let Some(compiler) = non_blank(&self.compile_output) {
            if !success || stdout.is_none() {
                return Ok(RunOutcome {
                    success,
                    output: compiler.to_string(),
                });
            }
        }

        let combined = [stdout, stderr]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n");

        if !success && combined.is_empty() {
            let fallback = non_blank(&self.message)
                .map(str::to_string)
                .or_else(|| {
                    self.status
                        .as_ref()
                        .map(|s| s.description.trim().to_string())
                        .filter(|d| !d.is_empty())
                })
                .unwrap_or_else(|| "Execution failed".to_string());
            return Ok(RunOutcome {
                success,
                output: fallback,
            });
        }

        Ok(RunOutcome {
            success,
            output: combined,
        })
    }
}
