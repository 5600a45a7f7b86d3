// bfstep: Brainfuck interpreter with a stepping debugger

use std::fs;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use bfstep::config::{EngineConfig, DEFAULT_EOF, DEFAULT_INTERVAL_MS};
use bfstep::interpreter::BatchInterpreter;
use bfstep::logging::init_logging;
use bfstep::memory::TapePolicy;
use bfstep::protocol::{Mode, StartRequest};
use bfstep::ui::App;
use bfstep::worker;

#[derive(Parser, Debug)]
#[command(name = "bfstep", version, about = "Brainfuck interpreter with a stepping debugger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program to completion and write its output to stdout
    Run {
        /// Program file
        file: PathBuf,

        #[command(flatten)]
        io: ProgramIo,

        #[command(flatten)]
        tape: TapeArgs,
    },

    /// Serve JSON-lines commands on stdin and write events to stdout
    Worker {
        #[command(flatten)]
        tape: TapeArgs,
    },

    /// Step through a program in the terminal debugger
    Debug {
        /// Program file
        file: PathBuf,

        #[command(flatten)]
        io: ProgramIo,

        #[command(flatten)]
        tape: TapeArgs,

        /// Milliseconds between paced steps
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
        interval: u64,
    },
}

#[derive(Args, Debug)]
struct ProgramIo {
    /// Byte `,` yields once input is exhausted
    #[arg(long, default_value_t = DEFAULT_EOF)]
    eof: u8,

    /// Program input as a string
    #[arg(long, conflicts_with = "input_file")]
    input: Option<String>,

    /// Read program input from a file
    #[arg(long)]
    input_file: Option<PathBuf>,
}

impl ProgramIo {
    fn bytes(&self) -> io::Result<Vec<u8>> {
        match (&self.input, &self.input_file) {
            (Some(text), _) => Ok(text.clone().into_bytes()),
            (None, Some(path)) => fs::read(path),
            (None, None) => Ok(Vec::new()),
        }
    }
}

#[derive(Args, Debug)]
struct TapeArgs {
    /// Initial tape length in cells (defaults depend on the mode)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tape_len: Option<u64>,

    /// Fail instead of growing when the pointer runs off the tape
    #[arg(long)]
    fixed_tape: bool,
}

impl TapeArgs {
    fn config(&self) -> EngineConfig {
        let policy = if self.fixed_tape {
            TapePolicy::Fixed
        } else {
            TapePolicy::Growable
        };
        let config = EngineConfig::with_policy(policy);
        match self.tape_len {
            Some(len) => config.with_tape_len(len as usize),
            None => config,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, io, tape } => {
            init_logging("warn");
            let source = fs::read_to_string(&file)?;
            let input = io.bytes()?;

            let interpreter = BatchInterpreter::new(tape.config().batch_tape);
            let outcome = match interpreter.run_source(&source, io.eof, &input) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(file = %file.display(), error = %e, "run failed");
                    eprintln!("Runtime error: {}", e);
                    std::process::exit(1);
                }
            };
            info!(cycles = outcome.cycle_count, "run finished");

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&outcome.stdout)?;
            stdout.flush()?;
        }

        Commands::Worker { tape } => {
            init_logging("info");
            info!("worker ready");
            let reader = BufReader::new(std::io::stdin());
            worker::serve(reader, std::io::stdout().lock(), tape.config())?;
        }

        Commands::Debug {
            file,
            io,
            tape,
            interval,
        } => {
            // Log lines would tear the alternate screen
            init_logging("off");
            let source = fs::read_to_string(&file)?;
            let request = StartRequest {
                mode: Mode::Simple,
                source,
                eof: io.eof,
                input: io.bytes()?,
                interval,
            };
            run_tui(App::new(request, tape.config()))?;
        }
    }

    Ok(())
}

fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
