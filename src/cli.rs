use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::app::WorkoutForm;
use crate::render::DEFAULT_ZOOM;
use crate::types::WorkoutKind;

#[derive(Parser, Debug)]
#[command(
    name = "waymark",
    about = "Log running and cycling workouts on a map, with pace/speed and persistent history"
)]
pub struct Cli {
    /// Path to the workout store (SQLite).
    ///
    /// Default: <data dir>/waymark/waymark.db
    #[arg(long, env = "WAYMARK_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Your current position as LAT,LNG. The map is only loaded when this is known.
    #[arg(long, env = "WAYMARK_HOME", global = true, allow_hyphen_values = true)]
    pub home: Option<String>,

    /// Zoom level used when centering the map.
    #[arg(long, default_value_t = DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a new workout at a point.
    Add {
        #[command(flatten)]
        place: Place,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Print every logged workout, oldest first.
    List {
        /// Prefix each line with id, timestamp and coordinates.
        #[arg(long)]
        details: bool,
    },

    /// Center the map on a workout.
    Show { id: String },

    /// Replace a workout's distance, duration and kind-specific field.
    Edit {
        id: String,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Remove one workout.
    Delete { id: String },

    /// Delete all logged workouts.
    Reset,

    /// Merge workouts from a JSON snapshot (e.g. a browser localStorage dump).
    Import { file: PathBuf },

    /// Write all workouts as GPX waypoints.
    ExportGpx { file: PathBuf },
}

/// The point on the map the workout belongs to.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Place {
    /// LAT,LNG
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Use the first track point of a GPX file.
    #[arg(long, value_name = "GPX")]
    pub from_gpx: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FormArgs {
    #[arg(value_enum)]
    pub kind: WorkoutKind,

    /// Distance in km.
    #[arg(long, allow_hyphen_values = true)]
    pub distance: Option<f64>,

    /// Duration in minutes.
    #[arg(long, allow_hyphen_values = true)]
    pub duration: Option<f64>,

    /// Steps per minute (running).
    #[arg(long, allow_hyphen_values = true)]
    pub cadence: Option<f64>,

    /// Elevation gain in metres (cycling).
    #[arg(long, allow_hyphen_values = true)]
    pub elevation: Option<f64>,
}

impl From<&FormArgs> for WorkoutForm {
    fn from(a: &FormArgs) -> Self {
        Self {
            kind: a.kind,
            distance: a.distance,
            duration: a.duration,
            cadence: a.cadence,
            elevation: a.elevation,
        }
    }
}
