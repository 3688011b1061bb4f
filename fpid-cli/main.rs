use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use fpid::{check_inputs, verify, IdentifyConfig, Identifier, PersistentConfig, VerifyConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fingerprint identification with FAST/BRIEF features")]
struct Cli {
    /// Log per-candidate scores
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify a fingerprint against a database directory
    Identify(IdentifyArgs),
    /// Compare a fingerprint against one enrolled image
    Verify(VerifyArgs),
    /// Report whether input images and the database can be read
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct IdentifyArgs {
    #[arg(default_value = "data/src.bmp")]
    source: PathBuf,
    #[arg(default_value = "data/database")]
    database: PathBuf,
    /// JSON or TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Lowe ratio (lower is stricter)
    #[arg(long)]
    ratio: Option<f32>,
    /// Minimum good-match count for a positive identification
    #[arg(long)]
    threshold: Option<usize>,
    #[arg(long)]
    top_k: Option<usize>,
    /// Do not write the match diagram
    #[arg(long)]
    no_vis: bool,
    #[arg(long, value_name = "FILE")]
    vis_path: Option<PathBuf>,
    /// Enlarge the match diagram by this integer factor
    #[arg(long)]
    preview_scale: Option<u32>,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[arg(default_value = "data/src.bmp")]
    source: PathBuf,
    #[arg(default_value = "data/model.bmp")]
    model: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    ratio: Option<f32>,
    /// Minimum good-match count for the pair to pass
    #[arg(long)]
    threshold: Option<usize>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    paths: Vec<PathBuf>,
    #[arg(long, default_value = "data/database")]
    db: PathBuf,
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "fpid=debug" } else { "fpid=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the command succeeded; `Err` is a usage or config error
fn run(command: Command) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Identify(args) => run_identify(args),
        Command::Verify(args) => run_verify(args),
        Command::Check(args) => {
            let paths = if args.paths.is_empty() {
                vec![PathBuf::from("data/src.bmp"), PathBuf::from("data/model.bmp")]
            } else {
                args.paths
            };
            let report = check_inputs(&paths, &args.db);
            emit(&report, args.json, |r| r.to_string())?;
            Ok(report.all_ok())
        }
    }
}

fn run_identify(args: IdentifyArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut cfg = load_or_default::<IdentifyConfig>(args.config.as_deref())?;
    if let Some(ratio) = args.ratio {
        cfg = cfg.with_ratio(ratio);
    }
    if let Some(threshold) = args.threshold {
        cfg = cfg.with_threshold(threshold);
    }
    if let Some(top_k) = args.top_k {
        cfg = cfg.with_top_k(top_k);
    }
    if let Some(path) = args.vis_path {
        cfg = cfg.with_visualization(path);
    }
    if let Some(scale) = args.preview_scale {
        cfg = cfg.with_preview_scale(scale);
    }
    if args.no_vis {
        cfg = cfg.without_visualization();
    }
    tracing::debug!("{}", cfg.summary());

    let identifier = Identifier::new(cfg)?;
    let result = identifier.identify(&args.source, &args.database);

    emit(&result, args.json, |r| {
        let mut text = r.message.clone();
        for (rank, c) in r.top_k.iter().enumerate() {
            text.push_str(&format!("\n  {}. {} (good={})", rank + 1, c.filename, c.score));
        }
        if let Some(path) = &r.vis_path {
            text.push_str(&format!("\nmatch diagram: {}", path.display()));
        }
        text
    })?;
    Ok(result.ok)
}

fn run_verify(args: VerifyArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut cfg = load_or_default::<VerifyConfig>(args.config.as_deref())?;
    if let Some(ratio) = args.ratio {
        cfg = cfg.with_ratio(ratio);
    }
    if let Some(threshold) = args.threshold {
        cfg = cfg.with_pass_threshold(threshold);
    }
    cfg.validate()?;

    let result = verify(&args.source, &args.model, &cfg);
    emit(&result, args.json, |r| r.message.clone())?;
    Ok(result.passed)
}

fn load_or_default<C: PersistentConfig + Default>(
    path: Option<&Path>,
) -> Result<C, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => C::load(path)?,
        None => C::default(),
    })
}

fn emit<T: Serialize>(
    value: &T,
    json: bool,
    text: impl FnOnce(&T) -> String,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}
