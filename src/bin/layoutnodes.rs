use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "layoutnodes", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a pass script and print one JSON report per pass.
    Replay(ReplayArgs),
    /// Validate a pass script without running it.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write reports here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pretty-print each report.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_script(path: &Path) -> anyhow::Result<layoutnodes::ReplayScript> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let script = layoutnodes::ReplayScript::from_reader(BufReader::new(f))
        .with_context(|| format!("load script '{}'", path.display()))?;
    Ok(script)
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let reports = layoutnodes::replay(&script)?;

    let mut out: Box<dyn std::io::Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    for report in &reports {
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, report)?;
        } else {
            serde_json::to_writer(&mut out, report)?;
        }
        writeln!(out)?;
    }
    out.flush().with_context(|| "flush reports")?;

    if let Some(path) = &args.out {
        eprintln!("wrote {} pass reports to {}", reports.len(), path.display());
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    eprintln!(
        "{}: ok ({} passes)",
        args.in_path.display(),
        script.passes.len()
    );
    Ok(())
}
