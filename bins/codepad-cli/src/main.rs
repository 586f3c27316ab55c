mod commands;

use anyhow::Result;
use clap::Parser;
use codepad_common::config::Config;
use codepad_session::{Dispatcher, HttpCompilerClient, Session};
use commands::Flow;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "codepad")]
#[command(about = "Codepad - write, switch and run code across files and test cases", long_about = None)]
struct Cli {
    /// Execution endpoint (overrides CODEPAD_COMPILER_URL)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Name of the first file (overrides CODEPAD_DEFAULT_FILE)
    #[arg(short, long)]
    file: Option<String>,
}

fn prompt(session: &Session) -> Result<()> {
    let mut stdout = std::io::stdout();
    let name = session.active_file().map(|f| f.name.as_str()).unwrap_or("-");
    write!(stdout, "codepad [{}]> ", name)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the shell's own output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.compiler_url = endpoint;
    }
    if let Some(file) = cli.file {
        config.default_file_name = file;
    }

    let mut session = Session::from_config(&config)?;
    let dispatcher = Dispatcher::new(HttpCompilerClient::new(config.compiler_url.clone()));
    info!(endpoint = %config.compiler_url, "Session started");

    println!("Codepad session. Type `help` for commands, `quit` to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();
    loop {
        prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let repl = match commands::parse_line(&line) {
            Ok(Some(repl)) => repl,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match commands::execute(repl.command, &mut session, &dispatcher, &mut stdout).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}
