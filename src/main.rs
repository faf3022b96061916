//! scenario-sprites: generate transparent character sprite sheets.
//!
//! Runs the built-in archetype roster (or one custom prompt) through the
//! Scenario img2img and background-removal pipeline, one sprite at a time.

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenario_sprites::cli::Cli;
use scenario_sprites::config::{load_dotenv, SpriteConfig};
use scenario_sprites::generation::{default_roster, run_batch, SpritePipeline};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    // `.env` may set RUST_LOG, so it is loaded before the subscriber.
    let env_files = load_dotenv();
    init_tracing(cli.verbose);
    for path in &env_files {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    if cli.list {
        print!("{}", roster_listing());
        return Ok(());
    }

    let mut config = SpriteConfig::from_env().context("cannot start without Scenario credentials")?;
    cli.apply_to(&mut config);
    if let Some(msg) = config.validate() {
        bail!("invalid configuration: {}", msg);
    }

    let specs = cli.specs()?;
    let template = cli.request_template(&config);
    template.validate()?;

    let output_dir = config.effective_output_dir();
    tracing::info!(
        sprites = specs.len(),
        model_id = %config.model_id,
        reference = %config.reference_asset_id,
        output_dir = %output_dir.display(),
        "starting sprite generation"
    );

    let pipeline = SpritePipeline::from_config(&config)?;
    let report = run_batch(&pipeline, &specs, &template, &output_dir)?;

    for output in report.succeeded() {
        eprintln!("Saved: {} ({} bytes)", output.path.display(), output.bytes_written);
    }
    for (name, err) in report.failed() {
        eprintln!("Failed: {}: {}", name, err);
    }

    if !report.all_succeeded() {
        bail!(
            "{} of {} sprite sheets failed",
            report.failed().count(),
            report.len()
        );
    }

    Ok(())
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "scenario_sprites=debug"
    } else {
        "scenario_sprites=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Formats the built-in archetype roster, one archetype per line.
fn roster_listing() -> String {
    default_roster()
        .iter()
        .map(|spec| format!("{:<16} {}\n", spec.name, spec.prompt))
        .collect()
}
