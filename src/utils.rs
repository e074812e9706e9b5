use crate::error::{Error, Result};
use crate::types::Coords;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,waymark={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

static COORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*[,;]\s*(-?\d+(?:\.\d+)?)\s*$")
        .expect("coordinate regex compiles")
});

/// Parse `"LAT,LNG"` (a `;` separator also works). Latitude must be within ±90,
/// longitude within ±180.
pub fn parse_coords(s: &str) -> Result<Coords> {
    let caps = COORDS_RE
        .captures(s)
        .ok_or_else(|| Error::InvalidCoords(format!("expected LAT,LNG, got {s:?}")))?;

    let lat: f64 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidCoords(format!("bad latitude in {s:?}")))?;
    let lng: f64 = caps[2]
        .parse()
        .map_err(|_| Error::InvalidCoords(format!("bad longitude in {s:?}")))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidCoords(format!("latitude {lat} out of range")));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidCoords(format!("longitude {lng} out of range")));
    }

    Ok(Coords::new(lat, lng))
}

/// `<data dir>/waymark/waymark.db`, falling back to the working directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("waymark"))
        .unwrap_or_default()
        .join("waymark.db")
}
