// Shell commands: every line typed maps onto one session command
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use codepad_common::types::{File, TestCaseStatus};
use codepad_session::{
    CompilerClient, Dispatcher, ResetAction, RunTarget, Session, TransitionChoice,
    TransitionOutcome,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct Repl {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReplCommand {
    /// List open files
    Files,

    /// Create a file and switch to it
    New {
        /// File name with extension (e.g., utils.js)
        name: String,
    },

    /// Switch to another open file
    Open { name: String },

    /// Rename a file
    Rename { name: String, new_name: String },

    /// Close a file and discard its test cases
    Close { name: String },

    /// Change the active file's language
    Lang {
        /// javascript, python, cpp, java or c
        language: String,
    },

    /// Confirm a language change and keep the current code
    Keep,

    /// Confirm a language change and load the new boilerplate
    Reset,

    /// Abandon a pending language change
    Cancel,

    /// Replace the active file's code with a file from disk
    Load { path: PathBuf },

    /// Print the active file
    Show,

    /// Restore the starter code for the active file's language
    Restore,

    /// Empty the active file
    Clear,

    /// Manage test cases of the active file
    #[command(subcommand)]
    Case(CaseCommand),

    /// List test cases of the active file
    Cases,

    /// Run the selected test case, a test case by id, or `all`
    Run { target: Option<String> },

    /// Print the whole session as JSON
    Dump,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
pub enum CaseCommand {
    /// Add an empty test case and select it
    Add,

    /// Remove a test case (the last one always stays)
    Rm { id: u32 },

    /// Select a test case
    Select { id: u32 },

    /// Set a test case's stdin; `\n` starts a new line
    Input {
        id: u32,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// `case input <id> <text>` keeps the text exactly as typed, minus the
/// single separator after the id.
fn raw_case_input(line: &str) -> Option<Vec<&str>> {
    let (command, rest) = line.trim_start().split_once(char::is_whitespace)?;
    let (sub, rest) = rest.trim_start().split_once(char::is_whitespace)?;
    if command != "case" || sub != "input" {
        return None;
    }

    let rest = rest.trim_start();
    let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if id.is_empty() {
        return None;
    }

    let mut args = vec![command, sub, id];
    if !text.is_empty() {
        args.push(text);
    }
    Some(args)
}

/// Split a line into clap arguments
pub fn parse_line(line: &str) -> Result<Option<Repl>> {
    let args: Vec<&str> =
        raw_case_input(line).unwrap_or_else(|| line.split_whitespace().collect());
    if args.is_empty() {
        return Ok(None);
    }
    Repl::try_parse_from(args)
        .map(Some)
        .map_err(|e| anyhow!(e.render().to_string()))
}

fn status_label(status: TestCaseStatus) -> &'static str {
    match status {
        TestCaseStatus::Pending => "pending",
        TestCaseStatus::Running => "running",
        TestCaseStatus::Success => "success",
        TestCaseStatus::Error => "error",
    }
}

fn file_named<'a>(session: &'a Session, name: &str) -> Result<&'a File> {
    session
        .file_by_name(name)
        .ok_or_else(|| anyhow!("No open file named '{}'", name))
}

fn parse_target(target: Option<&str>, session: &Session) -> Result<RunTarget> {
    match target {
        None => Ok(RunTarget::One(session.test_cases()?.selected_id())),
        Some("all") => Ok(RunTarget::All),
        Some(id) => id
            .parse()
            .map(RunTarget::One)
            .with_context(|| format!("Expected a test case id or 'all', got '{}'", id)),
    }
}

fn report_transition(out: &mut impl Write, session: &Session, outcome: TransitionOutcome) -> Result<()> {
    match outcome {
        TransitionOutcome::Unchanged => writeln!(out, "Language unchanged")?,
        TransitionOutcome::Applied => {
            let file = session.active_file()?;
            writeln!(out, "Switched {} to {}", file.name, file.language.display_name())?;
        }
        TransitionOutcome::AwaitingConfirmation => {
            if let Some(pending) = session.pending_transition() {
                writeln!(
                    out,
                    "Keep your current code or reset to the {} boilerplate? (keep / reset / cancel)",
                    pending.target_language.display_name()
                )?;
            }
        }
    }
    Ok(())
}

fn render_files(out: &mut impl Write, session: &Session) -> Result<()> {
    let active = session.active_file()?.id;
    for file in session.files() {
        let marker = if file.id == active { "*" } else { " " };
        writeln!(out, "{} {:<20} {}", marker, file.name, file.language.display_name())?;
    }
    Ok(())
}

fn render_cases(out: &mut impl Write, session: &Session) -> Result<()> {
    let cases = session.test_cases()?;
    for case in cases.iter() {
        let marker = if case.id == cases.selected_id() { ">" } else { " " };
        writeln!(out, "{} #{} [{}]", marker, case.id, status_label(case.status))?;
        if !case.input.is_empty() {
            writeln!(out, "    input:  {}", case.input.replace('\n', "\\n"))?;
        }
        if let Some(output) = &case.output {
            for (idx, line) in output.lines().enumerate() {
                let label = if idx == 0 { "output:" } else { "       " };
                writeln!(out, "    {} {}", label, line)?;
            }
        }
    }
    Ok(())
}

/// Execute one shell command against the session
pub async fn execute<C>(
    command: ReplCommand,
    session: &mut Session,
    dispatcher: &Dispatcher<C>,
    out: &mut impl Write,
) -> Result<Flow>
where
    C: CompilerClient + Send + Sync + 'static,
{
    match command {
        ReplCommand::Files => render_files(out, session)?,
        ReplCommand::New { name } => {
            session.create_file(&name)?;
            writeln!(out, "Created {}", name.trim())?;
        }
        ReplCommand::Open { name } => {
            let id = file_named(session, &name)?.id;
            session.set_active(id)?;
        }
        ReplCommand::Rename { name, new_name } => {
            let id = file_named(session, &name)?.id;
            match session.rename_file(id, &new_name)? {
                TransitionOutcome::Unchanged => writeln!(out, "Renamed to {}", new_name.trim())?,
                outcome => report_transition(out, session, outcome)?,
            }
        }
        ReplCommand::Close { name } => {
            let id = file_named(session, &name)?.id;
            session.delete_file(id)?;
            writeln!(out, "Closed {}", name)?;
        }
        ReplCommand::Lang { language } => {
            let outcome = session.request_language(language.parse()?)?;
            report_transition(out, session, outcome)?;
        }
        ReplCommand::Keep => session.resolve_transition(TransitionChoice::Keep)?,
        ReplCommand::Reset => session.resolve_transition(TransitionChoice::Reset)?,
        ReplCommand::Cancel => session.resolve_transition(TransitionChoice::Cancel)?,
        ReplCommand::Load { path } => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let id = session.active_file()?.id;
            session.update_content(id, content)?;
        }
        ReplCommand::Show => {
            let file = session.active_file()?;
            writeln!(out, "── {} ({}) ──", file.name, file.language)?;
            write!(out, "{}", file.content)?;
            if !file.content.ends_with('\n') {
                writeln!(out)?;
            }
        }
        ReplCommand::Restore => session.reset_active(ResetAction::Boilerplate)?,
        ReplCommand::Clear => session.reset_active(ResetAction::Clear)?,
        ReplCommand::Case(case) => match case {
            CaseCommand::Add => {
                let id = session.add_test_case()?;
                writeln!(out, "Added test case #{}", id)?;
            }
            CaseCommand::Rm { id } => {
                if !session.remove_test_case(id)? {
                    writeln!(out, "A file keeps at least one test case")?;
                }
            }
            CaseCommand::Select { id } => session.select_test_case(id)?,
            CaseCommand::Input { id, text } => {
                session.set_test_input(id, text.join(" ").replace("\\n", "\n"))?;
            }
        },
        ReplCommand::Cases => render_cases(out, session)?,
        ReplCommand::Run { target } => {
            if session.pending_transition().is_some() {
                bail!("Resolve the pending language change first (keep / reset / cancel)");
            }
            let target = parse_target(target.as_deref(), session)?;
            let summary = dispatcher.run(session, target).await?;
            render_cases(out, session)?;
            writeln!(
                out,
                "{} passed, {} failed",
                summary.succeeded, summary.failed
            )?;
        }
        ReplCommand::Dump => {
            writeln!(out, "{}", serde_json::to_string_pretty(&session.snapshot())?)?;
        }
        ReplCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_common::error::TransportError;
    use codepad_common::types::{CompileRequest, CompileResponse, Language};

    /// Execution service that echoes stdin back, or fails on "boom"
    struct EchoClient;

    impl CompilerClient for EchoClient {
        async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse, TransportError> {
            if request.stdin == "boom" {
                return Err(TransportError::Unreachable("connection reset".to_string()));
            }
            Ok(CompileResponse {
                success: Some(true),
                stdout: Some(request.stdin.clone()),
                ..CompileResponse::default()
            })
        }
    }

    /// Feed lines through the shell and collect everything it printed
    async fn drive(session: &mut Session, lines: &[&str]) -> String {
        let dispatcher = Dispatcher::new(EchoClient);
        let mut out = Vec::new();
        for line in lines {
            let repl = parse_line(line).unwrap().expect("non-empty line");
            execute(repl.command, session, &dispatcher, &mut out)
                .await
                .unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_line() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(matches!(
            parse_line("run all").unwrap().unwrap().command,
            ReplCommand::Run { target: Some(ref t) } if t == "all"
        ));
        assert!(matches!(
            parse_line("case input 2 3 -4").unwrap().unwrap().command,
            ReplCommand::Case(CaseCommand::Input { id: 2, ref text }) if text == &["3 -4"]
        ));
        assert!(matches!(
            parse_line("case input 1").unwrap().unwrap().command,
            ReplCommand::Case(CaseCommand::Input { id: 1, ref text }) if text.is_empty()
        ));
        assert!(parse_line("frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_file_lifecycle() {
        let mut session = Session::new("main.js").unwrap();

        let printed = drive(&mut session, &["new sol.py", "files"]).await;

        assert!(printed.contains("Created sol.py"));
        assert!(printed.contains("* sol.py"));
        assert_eq!(session.active_file().unwrap().language, Language::Python);

        drive(&mut session, &["close sol.py"]).await;
        assert_eq!(session.active_file().unwrap().name, "main.js");
    }

    #[tokio::test]
    async fn test_language_change_prompts_then_keeps() {
        let mut session = Session::new("main.py").unwrap();
        let id = session.active_file().unwrap().id;
        session.update_content(id, "X").unwrap();

        let printed = drive(&mut session, &["lang java"]).await;
        assert!(printed.contains("keep / reset / cancel"));

        drive(&mut session, &["keep"]).await;
        let file = session.active_file().unwrap();
        assert_eq!(file.language, Language::Java);
        assert_eq!(file.content, "X");
    }

    #[tokio::test]
    async fn test_run_all_reports_each_case() {
        let mut session = Session::new("main.py").unwrap();

        let printed = drive(
            &mut session,
            &["case input 1 hello", "case add", "case input 2 boom", "run all"],
        )
        .await;

        let statuses: Vec<TestCaseStatus> =
            session.test_cases().unwrap().iter().map(|tc| tc.status).collect();
        assert_eq!(statuses, vec![TestCaseStatus::Success, TestCaseStatus::Error]);
        assert!(printed.contains("output: hello"));
        assert!(printed.contains("connection reset"));
        assert!(printed.contains("1 passed, 1 failed"));
    }

    #[tokio::test]
    async fn test_run_defaults_to_selected_case() {
        let mut session = Session::new("main.py").unwrap();

        drive(&mut session, &["case add", "case input 2 a\\nb", "run"]).await;

        let cases = session.test_cases().unwrap();
        assert_eq!(cases.get(1).unwrap().status, TestCaseStatus::Pending);
        assert_eq!(cases.get(2).unwrap().input, "a\nb");
        assert_eq!(cases.get(2).unwrap().output.as_deref(), Some("a\nb"));
    }

    #[tokio::test]
    async fn test_case_input_keeps_spacing() {
        let mut session = Session::new("main.py").unwrap();

        drive(&mut session, &["case input 1   a  b\t\\nc "]).await;

        let cases = session.test_cases().unwrap();
        assert_eq!(cases.get(1).unwrap().input, "  a  b\t\nc ");
    }

    #[tokio::test]
    async fn test_unknown_language_is_rejected() {
        let mut session = Session::new("main.py").unwrap();
        let dispatcher = Dispatcher::new(EchoClient);
        let repl = parse_line("lang rust").unwrap().unwrap();

        let err = execute(repl.command, &mut session, &dispatcher, &mut Vec::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unknown language 'rust'"));
        assert_eq!(session.active_file().unwrap().language, Language::Python);
    }

    #[tokio::test]
    async fn test_run_refused_while_language_change_pending() {
        let mut session = Session::new("main.py").unwrap();
        let id = session.active_file().unwrap().id;
        session.update_content(id, "X").unwrap();
        drive(&mut session, &["lang c"]).await;

        let dispatcher = Dispatcher::new(EchoClient);
        let repl = parse_line("run").unwrap().unwrap();
        let result = execute(repl.command, &mut session, &dispatcher, &mut Vec::new()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_replaces_content() {
        let path = std::env::temp_dir().join(format!("codepad-load-{}.py", std::process::id()));
        fs::write(&path, "print(42)\n").unwrap();
        let mut session = Session::new("main.py").unwrap();

        let line = format!("load {}", path.display());
        drive(&mut session, &[line.as_str()]).await;

        assert_eq!(session.active_file().unwrap().content, "print(42)\n");
        let _ = fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut session = Session::new("main.py").unwrap();
        let dispatcher = Dispatcher::new(EchoClient);
        let repl = parse_line("exit").unwrap().unwrap();

        let flow = execute(repl.command, &mut session, &dispatcher, &mut Vec::new())
            .await
            .unwrap();

        assert_eq!(flow, Flow::Quit);
    }
}
