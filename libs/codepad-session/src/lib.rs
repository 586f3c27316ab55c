//! In-memory execution session: open files, their languages, per-file test
//! cases, and the dispatch of runs to a remote execution service.
//!
//! All state lives in [`Session`] and is mutated synchronously through its
//! command methods. The only asynchronous part is [`Dispatcher`], whose
//! tasks report [`RunCompletion`]s that the session owner applies back.

pub mod client;
pub mod dispatcher;
pub mod file_store;
pub mod language;
pub mod reset;
pub mod session;
pub mod test_cases;


pub use client::{CompilerClient, HttpCompilerClient};
pub use dispatcher::{Dispatcher, RunCompletion, RunSummary, RunTarget, RunTicket};
pub use file_store::FileStore;
pub use language::{PendingTransition, TransitionChoice, TransitionOutcome};
pub use reset::ResetAction;
pub use session::{Session, SessionSnapshot};
pub use test_cases::TestCaseSet;
