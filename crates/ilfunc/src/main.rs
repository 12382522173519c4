mod config;
mod report;
mod roundtrip;
mod toolchain;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ilfunc_core::Rewriter;

use crate::config::{Config, Settings};
use crate::report::Report;
use crate::roundtrip::{check_paths, roundtrip, Failure, Job, Stage, StageExt};
use crate::toolchain::{BuildType, SdkToolchain};

/// Replace the bodies of methods tagged with [ILFunc("...")] by the IL in the attribute.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The .exe or .dll to rewrite.
    input: PathBuf,

    /// Where to write the result (default: overwrite INPUT).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to ilasm.exe.
    #[arg(long)]
    ilasm: Option<PathBuf>,

    /// Path to ildasm.exe.
    #[arg(long)]
    ildasm: Option<PathBuf>,

    /// Assemble with full debug information.
    #[arg(long, conflicts_with = "release")]
    debug: bool,

    /// Assemble with optimized debug information.
    #[arg(long)]
    release: bool,

    /// TOML file with tool paths and rewrite options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a YAML summary of every replaced method.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Keep a copy of the rewritten IL in this directory.
    #[arg(long)]
    keep_il: Option<PathBuf>,
}

fn run(args: Args, settings: Settings) -> Result<(), Failure> {
    check_paths(&settings.ilasm, &settings.ildasm, &args.input)?;

    let rewriter = Rewriter::new(&settings.rewrite).stage(Stage::Rewrite)?;
    let toolchain = SdkToolchain {
        ilasm: settings.ilasm,
        ildasm: settings.ildasm,
    };
    let job = Job {
        output: args.out.unwrap_or_else(|| args.input.clone()),
        input: args.input,
        build: BuildType::from_flags(args.debug, args.release),
        keep_il: args.keep_il,
    };

    let splices = roundtrip(&toolchain, &rewriter, &job)?;

    if let Some(path) = &args.report {
        Report::new(&job.input, &job.output, &splices)
            .write(path)
            .stage(Stage::Io)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    };
    // The logger is not up yet when the config file is broken.
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(Stage::Io.exit_code());
        }
    };

    let settings = Settings::resolve(args.ilasm.clone(), args.ildasm.clone(), config);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.to_string()),
    )
    .init();

    match run(args, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match failure.splice_kind() {
                Some(kind) => log::error!("Error ({kind}): {failure}"),
                None => log::error!("Error: {}", failure),
            }
            ExitCode::from(failure.stage.exit_code())
        }
    }
}
