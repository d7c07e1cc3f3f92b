mod output;
mod recover;
mod summary;

use std::io::{stderr, stdout};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tlmsync::{
    demod::DemodOpts,
    framing::{SyncOpts, CORRELATION_THRESHOLD, CORRELATION_WINDOW, DEFAULT_PREVIEW_BITS},
    Pipeline,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable debug logging. Overrides TLMSYNC_LOG.
    #[arg(short, long, global = true, action)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct RecoveryArgs {
    /// Attached sync marker as 8 hex characters.
    #[arg(long, default_value = "1acffc1d", value_name = "hex")]
    asm: String,

    /// Number of leading sync marker bits scored when looking for partial matches.
    #[arg(long, default_value_t = CORRELATION_WINDOW)]
    window: usize,

    /// Minimum number of agreeing bits for a partial match.
    #[arg(long, default_value_t = CORRELATION_THRESHOLD)]
    threshold: usize,

    /// Record ambiguous demodulation intervals as gaps and report frames containing them.
    #[arg(long, action)]
    gaps: bool,

    /// Number of leading decoded bits written to the debug preview when no frames are found.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_BITS)]
    preview_bits: usize,

    /// Summary output format
    #[arg(short, long, default_value = "text")]
    format: summary::Format,

    /// Input capture files. Directories are expanded to the *.bin files they contain.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl RecoveryArgs {
    fn pipeline(&self) -> Result<Pipeline> {
        let asm = hex::decode(&self.asm).context("decoding --asm")?;
        let sync = SyncOpts::new()
            .with_asm(&asm)?
            .with_correlation(self.window, self.threshold)?;
        Ok(Pipeline::new()
            .with_sync(sync)
            .with_demod(DemodOpts::new().with_gap_tracking(self.gaps))
            .with_preview_bits(self.preview_bits))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recover frames from raw two-channel captures.
    ///
    /// For each input a result directory named <input stem>_result_<timestamp> is created
    /// containing channels.csv, decoded_bits.csv and out.bin, the concatenated frames. If
    /// no frames are found debug_first_1000_bits.txt and partial_matches.txt are also
    /// written.
    Recover {
        /// Directory in which result directories are created. Defaults to the directory of
        /// each input.
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,

        #[command(flatten)]
        args: RecoveryArgs,
    },
    /// Show recovery results without writing any files.
    Info {
        #[command(flatten)]
        args: RecoveryArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TLMSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let (args, output, write) = match &cli.command {
        Commands::Recover { output, args } => (args, output.as_deref(), true),
        Commands::Info { args } => (args, None, false),
    };
    let pipeline = args.pipeline()?;
    let inputs = recover::expand_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("no inputs to process");
    }

    let now = chrono::Local::now();
    let mut summaries = Vec::default();
    for input in &inputs {
        let zult = if write {
            let dest = recover::output_dir(input, output, now);
            recover::recover(input, &dest, &pipeline)
        } else {
            recover::inspect(input, &pipeline)
        };
        match zult {
            Ok(summary) => summaries.push(summary),
            // Failed inputs do not stop the others
            Err(err) => error!("failed to process {input:?}: {err:#}"),
        }
    }

    if summaries.is_empty() {
        bail!("all {} inputs failed", inputs.len());
    }
    info!("processed {} of {} inputs", summaries.len(), inputs.len());

    summary::write_summaries(stdout(), &summaries, &args.format)
}
