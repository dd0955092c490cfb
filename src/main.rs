//! # Astro Clock Application Entry Point
//!
//! Computes a sky snapshot for one instant and prints it, either as the text summary
//! the clock face shows or as JSON for other tools.
//!
//! ```text
//! astro-clock [--at <RFC 3339>] [--config <path>] [--locator <grid>] [--json]
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use astro_clock_lib::config::Config;
use astro_clock_lib::renderer::draw_ascii;
use astro_clock_lib::sky::SkySnapshot;
use astro_clock_lib::{GeoPosition, Instant};
use chrono::DateTime;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct Options {
    at: Option<Instant>,
    config: Option<String>,
    locator: Option<String>,
    json: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--at" => {
                let value = args.next().context("--at needs an RFC 3339 instant")?;
                let parsed = DateTime::parse_from_rfc3339(&value)
                    .with_context(|| format!("invalid instant {:?}", value))?;
                options.at = Some(Instant::from_unix_seconds(parsed.timestamp()));
            }
            "--config" => {
                options.config = Some(args.next().context("--config needs a path")?);
            }
            "--locator" => {
                options.locator = Some(args.next().context("--locator needs a grid square")?);
            }
            other => bail!("unknown argument {:?}", other),
        }
    }
    Ok(options)
}

/// Observer position: a locator given on the command line acts like a position fix.
fn observer(config: &Config, locator: Option<&str>) -> anyhow::Result<GeoPosition> {
    let fix = match locator {
        Some(grid) => Some(
            GeoPosition::from_maidenhead(grid)
                .with_context(|| format!("invalid --locator {:?}", grid))?,
        ),
        None => None,
    };
    Ok(config.resolve_position(fix))
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let options = parse_args(env::args().skip(1))?;

    let config = match &options.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let position = observer(&config, options.locator.as_deref())?;
    let instant = options.at.unwrap_or_else(Instant::now);

    info!(
        location = %config.location.name,
        latitude = position.latitude,
        longitude = position.longitude,
        "computing sky snapshot"
    );
    let snapshot = SkySnapshot::compute(instant, position, config.engine)
        .context("instant is outside the supported calendar range")?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        draw_ascii(&snapshot);
    }
    Ok(())
}
