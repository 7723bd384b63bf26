// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! `rlsh`: an interactive echo shell driving [`readline_sync`].
//!
//! Prompts with `> `, echoes each submitted line back as `input: <line>`,
//! and quits on `exit` / `EXIT` (or Ctrl-D on an empty line). Asynchronous
//! signals are ignored for the life of the process so that the prompt can
//! only be left through the line editor itself; Ctrl-C arrives as a key
//! event in raw mode and just abandons the current line.

use std::sync::{Arc, atomic::AtomicBool};

use clap::Parser;
use crossterm::style::{Color, SetForegroundColor, Stylize};
use miette::{IntoDiagnostic, WrapErr};
use readline_sync::{Readline, ReadlineEvent};
use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM, SIGTSTP};

const PROMPT: &str = "> ";

#[derive(Debug, Parser)]
#[command(bin_name = "rlsh")]
#[command(about = "Interactive echo shell with raw-mode line editing")]
#[command(version)]
#[command(arg_required_else_help(false))]
pub struct CLIArg {
    #[arg(
        long,
        short = 'l',
        help = "Log app output to a file named `log.txt` for debugging."
    )]
    pub enable_logging: bool,
}

fn main() -> miette::Result<()> {
    let cli_arg = match CLIArg::try_parse() {
        Ok(it) => it,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            drop(err.print());
            return Ok(());
        }
        Err(_) => {
            eprintln!("{}", "Error: invalid argument".red());
            std::process::exit(1);
        }
    };

    if cli_arg.enable_logging {
        try_initialize_logging()?;
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    }

    ignore_signals()?;

    println!("{}\n", "type 'exit' to quit !".cyan());

    run_repl()
}

/// Keep terminal job-control and termination signals from interrupting the
/// prompt. In raw mode Ctrl-C / Ctrl-Z never become signals anyway; this
/// covers signals sent from outside (e.g. `kill`).
fn ignore_signals() -> miette::Result<()> {
    for signal in [SIGINT, SIGQUIT, SIGTSTP, SIGTERM] {
        // The flag is never read; registering it replaces the default
        // (terminating) disposition.
        signal_hook::flag::register(signal, Arc::new(AtomicBool::new(false)))
            .into_diagnostic()
            .wrap_err("failed to install signal handler")?;
    }
    Ok(())
}

fn run_repl() -> miette::Result<()> {
    let mut readline = Readline::default();
    let input_color = SetForegroundColor(Color::Cyan).to_string();

    loop {
        let event = match readline.read_line(PROMPT, &input_color) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(message = "read_line failed", error = ?err);
                eprintln!(
                    "{}",
                    "Error: unexpected error while reading input".red()
                );
                std::process::exit(1);
            }
        };

        match event {
            ReadlineEvent::Line(line) => {
                if line.is_empty() {
                    println!("{}", "Warning: the input is empty".red());
                    continue;
                }
                if line == "exit" || line == "EXIT" {
                    println!("{}", "Program terminated".cyan());
                    return Ok(());
                }
                println!("input: {line}");
                readline.add_history_entry(&line);
            }
            ReadlineEvent::Eof => {
                println!("{}", "Program terminated".cyan());
                return Ok(());
            }
            ReadlineEvent::Interrupted => {
                // Line abandoned; show a fresh prompt.
                tracing::debug!("line interrupted by user");
            }
        }
    }
}

/// Send DEBUG-and-up events to `log.txt` in the working directory. Returns
/// an error if the file can't be opened for append.
fn try_initialize_logging() -> miette::Result<()> {
    let file_appender = tracing_appender::rolling::never(".", "log.txt");

    tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .try_init()
        .map_err(|err| miette::miette!("failed to initialize logging: {err}"))
}
