/// Execution Dispatcher - send test cases to the execution service and fold
/// the results back into the session
///
/// **Flow:**
/// 1. `Session::begin_run` marks the targeted cases Running and hands out one
///    `RunTicket` per case, each carrying a snapshot of code and input
/// 2. `Dispatcher::dispatch` spawns one task per ticket; every task reports a
///    `RunCompletion` on a channel
/// 3. `Session::apply_completion` patches exactly one case per completion
///
/// Tasks never touch the session, so completions racing each other cannot
/// lose updates. Each ticket carries a run id; a completion whose case was
/// deleted, edited or re-run since dispatch no longer matches and is dropped.
///
/// "Run all" always runs every case to completion. One failure never stops
/// or alters the others, and nothing is retried.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use codepad_common::error::{Result, TransportError};
use codepad_common::templates::execution_id_for;
use codepad_common::types::{
    CompileRequest, CompileResponse, FileId, RunOutcome, TestCaseId, TestCaseStatus,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::CompilerClient;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    One(TestCaseId),
    All,
}

/// One dispatched execution of one test case
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub file_id: FileId,
    pub test_case_id: TestCaseId,
    pub run_id: Uuid,
    pub request: CompileRequest,
}

#[derive(Debug, Clone)]
pub struct RunCompletion {
    pub file_id: FileId,
    pub test_case_id: TestCaseId,
    pub run_id: Uuid,
    pub result: std::result::Result<RunOutcome, TransportError>,
    pub finished_at: DateTime<Utc>,
}

impl RunCompletion {
    pub fn new(
        ticket: &RunTicket,
        result: std::result::Result<RunOutcome, TransportError>,
    ) -> Self {
        Self {
            file_id: ticket.file_id,
            test_case_id: ticket.test_case_id,
            run_id: ticket.run_id,
            result,
            finished_at: Utc::now(),
        }
    }

    /// Normalize a raw service response; undecodable content counts as a
    /// transport failure
    pub fn from_response(
        ticket: &RunTicket,
        response: std::result::Result<CompileResponse, TransportError>,
    ) -> Self {
        Self::new(ticket, response.and_then(CompileResponse::into_outcome))
    }

    fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.success)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Completions that arrived for deleted, edited or re-run cases
    pub discarded: usize,
}

impl Session {
    /// Mark the targeted cases of the active file Running and build their
    /// requests. Nothing changes if the target does not exist.
    pub fn begin_run(&mut self, target: RunTarget) -> Result<Vec<RunTicket>> {
        let file = self.files.active()?;
        let file_id = file.id;
        let language_id = execution_id_for(file.language);
        let source_code = file.content.clone();

        let (_, cases) = self.active_cases_mut()?;
        let targeted: Vec<TestCaseId> = match target {
            RunTarget::One(id) => vec![cases.get(id)?.id],
            RunTarget::All => cases.iter().map(|tc| tc.id).collect(),
        };

        let mut tickets = Vec::with_capacity(targeted.len());
        for id in targeted {
            let case = cases.get_mut(id)?;
            let run_id = Uuid::new_v4();
            case.status = TestCaseStatus::Running;
            case.active_run = Some(run_id);

            tickets.push(RunTicket {
                file_id,
                test_case_id: id,
                run_id,
                request: CompileRequest {
                    source_code: source_code.clone(),
                    language_id,
                    stdin: case.input.clone(),
                },
            });
        }

        Ok(tickets)
    }

    /// Apply one finished run to its test case.
    ///
    /// Returns `false`, changing nothing, when the case is gone or no longer
    /// waiting for this particular run.
    pub fn apply_completion(&mut self, completion: RunCompletion) -> bool {
        let Some(case) = self
            .test_cases
            .get_mut(&completion.file_id)
            .and_then(|cases| cases.find_mut(completion.test_case_id))
        else {
            debug!(
                file_id = %completion.file_id,
                test_case_id = completion.test_case_id,
                "Result for a removed test case discarded"
            );
            return false;
        };

        if case.active_run != Some(completion.run_id) {
            debug!(
                file_id = %completion.file_id,
                test_case_id = completion.test_case_id,
                "Result for a superseded run discarded"
            );
            return false;
        }

        case.active_run = None;
        case.last_run_at = Some(completion.finished_at);
        match completion.result {
            Ok(outcome) => {
                case.status = if outcome.success {
                    TestCaseStatus::Success
                } else {
                    TestCaseStatus::Error
                };
                case.output = Some(outcome.output);
            }
            Err(e) => {
                case.status = TestCaseStatus::Error;
                case.output = Some(e.to_string());
            }
        }
        true
    }
}

/// Runs tickets against a compiler client, one task per ticket
pub struct Dispatcher<C> {
    client: Arc<C>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> Dispatcher<C>
where
    C: CompilerClient + Send + Sync + 'static,
{
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start every ticket concurrently. The receiver yields completions in
    /// the order they finish and closes once every task has ended.
    pub fn dispatch(&self, tickets: Vec<RunTicket>) -> mpsc::UnboundedReceiver<RunCompletion> {
        let (tx, rx) = mpsc::unbounded_channel();

        for ticket in tickets {
            let client = Arc::clone(&self.client);
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = client.compile(&ticket.request).await;
                let completion = RunCompletion::from_response(&ticket, response);
                // receiver gone means nobody is left to show the result
                let _ = tx.send(completion);
            });
        }

        rx
    }

    /// Run `target` on the active file and apply every result before
    /// returning. A task that dies without reporting is recorded as an
    /// error so no case stays Running.
    pub async fn run(&self, session: &mut Session, target: RunTarget) -> Result<RunSummary> {
        let tickets = session.begin_run(target)?;
        let mut summary = RunSummary {
            dispatched: tickets.len(),
            ..RunSummary::default()
        };

        if let Some(first) = tickets.first() {
            info!(
                file_id = %first.file_id,
                language_id = first.request.language_id,
                test_cases = tickets.len(),
                "Dispatching run"
            );
        }

        let mut outstanding: HashMap<Uuid, RunTicket> = tickets
            .iter()
            .map(|ticket| (ticket.run_id, ticket.clone()))
            .collect();

        let mut completions = self.dispatch(tickets);
        while let Some(completion) = completions.recv().await {
            outstanding.remove(&completion.run_id);
            record(session, completion, &mut summary);
        }

        for ticket in outstanding.into_values() {
            warn!(
                file_id = %ticket.file_id,
                test_case_id = ticket.test_case_id,
                "Execution task ended without a result"
            );
            let completion = RunCompletion::new(&ticket, Err(TransportError::Aborted));
            record(session, completion, &mut summary);
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            discarded = summary.discarded,
            "Run finished"
        );
        Ok(summary)
    }
}

fn record(session: &mut Session, completion: RunCompletion, summary: &mut RunSummary) {
    let test_case_id = completion.test_case_id;
    let succeeded = completion.succeeded();
    if let Err(e) = &completion.result {
        warn!(test_case_id, error = %e, "Execution request failed");
    }

    if !session.apply_completion(completion) {
        summary.discarded += 1;
    } else if succeeded {
        summary.succeeded += 1;
    } else {
        summary.failed += 1;
    }
}
