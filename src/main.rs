use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tabledb::{
    config::Config,
    error::Result,
    shell::{Confirm, Flow, Shell, read_line},
    sql::engine::{DocEngine, Session},
    storage::file::FileEngine,
};
use tracing_subscriber::EnvFilter;

/// Line-oriented table database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the metadata document and the table documents
    #[arg(long, value_name = "DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long)]
    assume_yes: bool,

    /// Run a command and exit instead of starting the prompt (repeatable)
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,
}

/// Reads the answer to a confirmation prompt from stdin
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, action: &str) -> io::Result<bool> {
        print!("Are you sure you want to {}? [y/n]: ", action);
        io::stdout().flush()?;
        let answer = read_line(&mut io::stdin().lock())?.unwrap_or_default();
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config {
        data_dir: args.data_dir,
        assume_yes: args.assume_yes,
        ..Config::default()
    };

    match run(config, args.commands) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config, commands: Vec<String>) -> Result<()> {
    tracing::debug!(data_dir = %config.data_dir.display(), "opening database");
    let engine = DocEngine::new(FileEngine::new(config.clone())?);
    let mut shell = Shell::new(Session::new(engine), StdinConfirm, io::stdout())
        .assume_yes(config.assume_yes);

    if !commands.is_empty() {
        for line in &commands {
            if shell.handle_line(line)? == Flow::Exit {
                break;
            }
        }
        return Ok(());
    }

    shell.banner()?;
    loop {
        shell.prompt()?;
        let Some(line) = read_line(&mut io::stdin().lock())? else {
            println!();
            break;
        };
        if shell.handle_line(&line)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}
