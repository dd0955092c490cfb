//! Command line parsing and position selection for the binary.

use crate::{observer, parse_args, Options};
use astro_clock_lib::config::Config;
use astro_clock_lib::Instant;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// No arguments means text output for the current time.
#[test]
fn defaults_without_arguments() {
    assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
}

/// All flags together, with an instant carrying a UTC offset.
#[test]
fn parses_all_flags() {
    let options = parse_args(args(&[
        "--json",
        "--at",
        "2024-03-20T13:00:00+01:00",
        "--config",
        "/tmp/clock.toml",
        "--locator",
        "JO59jw",
    ]))
    .unwrap();

    assert!(options.json);
    assert_eq!(options.at, Some(Instant::from_unix_seconds(1_710_936_000)));
    assert_eq!(options.config.as_deref(), Some("/tmp/clock.toml"));
    assert_eq!(options.locator.as_deref(), Some("JO59jw"));
}

/// Bad input is reported, not ignored.
#[test]
fn rejects_bad_arguments() {
    assert!(parse_args(args(&["--at"])).is_err());
    assert!(parse_args(args(&["--at", "yesterday"])).is_err());
    assert!(parse_args(args(&["--stdout"])).is_err());
}

/// A locator on the command line wins over the configured position.
#[test]
fn locator_overrides_config() {
    let config = Config::default();
    let position = observer(&config, Some("FN31pr")).unwrap();
    assert!((position.latitude - 41.7).abs() < 0.1);
    assert!((position.longitude + 72.7).abs() < 0.1);

    let position = observer(&config, None).unwrap();
    assert_eq!(position.latitude, 59.945556);

    assert!(observer(&config, Some("ZZ99")).is_err());
}
