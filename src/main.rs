//! sqlshell CLI entry point.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::InterruptHandle;
use tracing_subscriber::EnvFilter;

use sqlshell::cli::{Args, OutputSink, PagerSink, Repl, StdoutSink};
use sqlshell::db::SqliteDatabase;
use sqlshell::session::Session;

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let db = SqliteDatabase::open(&args.database, !args.read_write)
        .with_context(|| format!("Failed to open database: {}", args.database.display()))?
        .with_limits(args.fetch_size, args.max_rows);

    match args.pager.as_deref() {
        Some(pager) => run(&args, db, PagerSink::new(pager)),
        None => run(&args, db, StdoutSink),
    }
}

fn run<S: OutputSink>(args: &Args, db: SqliteDatabase, sink: S) -> Result<ExitCode> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut session =
        Session::new(db, sink, args.session_config()).with_interrupt_flag(interrupted.clone());

    let code = match &args.execute {
        // Execute statement from -e flag
        Some(statement) => {
            if session.execute_statement(statement, true)?.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        // Interactive REPL
        None => {
            run_repl(&mut session, args, interrupted)?;
            ExitCode::SUCCESS
        }
    };

    let (db, _sink) = session.into_parts();
    if let Err(e) = db.close() {
        tracing::warn!("{}", e);
    }
    Ok(code)
}

fn run_repl<S: OutputSink>(
    session: &mut Session<SqliteDatabase, S>,
    args: &Args,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let mut repl = Repl::new()?.with_history(args.history_path());
    install_interrupt_handler(interrupted, session.database().interrupt_handle());

    println!("Connecting to {}", session.database().target());
    println!("{}", preamble());

    let result = session.run(&mut repl);

    println!("\nExiting sqlshell");
    repl.finish();
    result?;
    Ok(())
}

/// Ctrl-C outside the prompt aborts the running statement and ends the loop,
/// so history and the connection are still closed normally.
fn install_interrupt_handler(flag: Arc<AtomicBool>, handle: InterruptHandle) {
    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        handle.interrupt();
    });
    if let Err(e) = installed {
        tracing::warn!("Could not install Ctrl-C handler: {}", e);
    }
}

fn preamble() -> String {
    let mut text = String::from("Welcome to sqlshell!\n");
    text.push_str("Commands end with ; or \\g.  Use \\c to cancel a query.\n");
    text.push_str("Dates: #date('YYYY-MM-DD') or #date('YYYY-MM-DD HH:MM:SS').\n");
    text.push('\n');
    text.push_str("Type quit, exit or Ctrl-D (EOF) to quit\n");
    text
}
