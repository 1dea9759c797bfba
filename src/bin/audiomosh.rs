use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{ArgAction, CommandFactory as _, Parser, Subcommand};

use audiomosh::{
    BitDepth, BlendFactor, CancelFlag, ConfigOverrides, EffectSpec, FfmpegToolkit, FrameRate,
    MoshError, Pipeline, PipelineConfig, PixelFormat, Resolution, SoxProcessor, effects_catalog,
};

#[derive(Parser, Debug)]
#[command(
    name = "audiomosh",
    version,
    about = "Datamosh images and video by running their pixels through audio effects",
    disable_help_flag = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Print usage and exit with status 1.
    #[arg(short = 'h', long, global = true)]
    help: bool,

    /// Print example effect invocations and exit.
    #[arg(long, global = true)]
    effects: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Datamosh <input> into <output> with an ordered sox effect chain.
    ///
    /// Effects follow the paths, e.g. `run in.gif out.gif echo 0.8 0.9 1000 0.3 vol 2`.
    /// Options go before the effects; everything after the first effect belongs to the chain.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input image, animated GIF or video.
    input: Option<PathBuf>,

    /// Output path; the extension picks the container (gif, png, mp4, ...).
    output: Option<PathBuf>,

    /// Effect names and their parameters, applied in order.
    #[arg(value_name = "EFFECT", trailing_var_arg = true, allow_hyphen_values = true)]
    effect: Vec<String>,

    /// Sample bit depth.
    #[arg(long, value_name = "8|16|24")]
    bits: Option<BitDepth>,

    /// Pixel format frames are decoded to (default rgb24).
    #[arg(long = "color-format", value_name = "FMT")]
    color_format: Option<PixelFormat>,

    /// Target resolution (default: source resolution).
    #[arg(long, value_name = "WxH")]
    res: Option<Resolution>,

    /// Output frame rate: integer, decimal or num/den (default: source, or 10).
    #[arg(long, value_name = "N")]
    framerate: Option<FrameRate>,

    /// Blend reconstructed frames with the source (0 = source, 1 = reconstruction).
    #[arg(long, value_name = "0..1")]
    blend: Option<BlendFactor>,

    /// Sample rate label of the pixel stream.
    #[arg(long = "sample-rate", value_name = "HZ")]
    sample_rate: Option<u32>,

    /// Worker threads for per-frame processing.
    #[arg(long)]
    threads: Option<usize>,

    /// JSON config file; command-line options override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for the run's working storage (default: system temp dir).
    #[arg(long = "work-root", value_name = "DIR")]
    work_root: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };
    init_tracing(cli.verbose);

    if cli.help {
        print_usage();
        return ExitCode::FAILURE;
    }
    if cli.effects {
        print!("{}", effects_catalog());
        return ExitCode::SUCCESS;
    }
    let Some(Command::Run(args)) = cli.cmd else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("interrupt received, stopping after the current stage");
        handler_flag.cancel();
    }) {
        tracing::warn!("could not install interrupt handler: {e}");
    }

    match cmd_run(args, cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<MoshError>().is_some_and(MoshError::is_usage) {
                print_usage();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn print_usage() {
    let mut cmd = Cli::command();
    eprintln!("{}", cmd.render_help());
    if let Some(run) = cmd.find_subcommand_mut("run") {
        eprintln!("{}", run.render_help());
    }
}

fn cmd_run(args: RunArgs, cancel: CancelFlag) -> anyhow::Result<()> {
    let input = args
        .input
        .ok_or_else(|| MoshError::usage("missing <input> path"))?;
    let output = args
        .output
        .ok_or_else(|| MoshError::usage("missing <output> path"))?;

    let file = args
        .config
        .as_deref()
        .map(ConfigOverrides::from_json_file)
        .transpose()?;
    let effects = if args.effect.is_empty() {
        None
    } else {
        Some(EffectSpec::parse(&args.effect)?)
    };
    let overrides = ConfigOverrides {
        bit_depth: args.bits,
        pixel_format: args.color_format,
        resolution: args.res,
        frame_rate: args.framerate,
        blend: args.blend,
        sample_rate: args.sample_rate,
        effects,
        threads: args.threads,
        work_root: args.work_root,
    };
    let config = PipelineConfig::resolve(file, overrides)?;
    tracing::info!(
        effects = %config.effects,
        bits = %config.bit_depth,
        format = %config.pixel_format,
        "configured"
    );

    let media = FfmpegToolkit::default();
    let sox = SoxProcessor::default();
    let report = Pipeline::new(&config, &media, &sox)
        .with_cancel(cancel)
        .run(&input, &output)
        .with_context(|| format!("datamosh '{}'", input.display()))?;

    eprintln!(
        "wrote {} ({} frame(s) in, {} out{})",
        output.display(),
        report.frames_in,
        report.frames_out,
        if report.audio_processed {
            ", audio effected"
        } else {
            ""
        }
    );
    Ok(())
}
