//! Rendering collaborators: the map (markers + view) and the workout list.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::gpx::{Waypoint, write_waypoints};
use crate::types::{Activity, Coords, Workout};

/// Zoom level used when centering the map.
pub const DEFAULT_ZOOM: u8 = 13;

/// A marker request: where, what the popup says, and its style class.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: String,
    pub class: String,
}

impl Marker {
    pub fn for_workout(w: &Workout) -> Self {
        Self {
            coords: w.coords,
            popup: format!("{} {}", w.kind().icon(), w.description),
            class: format!("{}-popup", w.kind()),
        }
    }
}

pub trait MapView {
    fn place_marker(&mut self, marker: &Marker) -> Result<()>;
    fn set_view(&mut self, center: Coords, zoom: u8) -> Result<()>;
    fn clear_markers(&mut self) -> Result<()>;
}

pub trait ListView {
    fn push_entry(&mut self, workout: &Workout) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// One list line, e.g. `Running on April 14  🏃 5 km  ⏱ 25 min  ⚡ 5.0 min/km  🦶 180 spm`.
pub fn format_entry(w: &Workout) -> String {
    let head = format!(
        "{}  {} {} km  ⏱ {} min",
        w.description,
        w.kind().icon(),
        w.distance,
        w.duration
    );
    match w.activity {
        Activity::Running { cadence, pace } => {
            format!("{head}  ⚡ {pace:.1} min/km  🦶 {cadence} spm")
        }
        Activity::Cycling {
            elevation_gain,
            speed,
        } => format!("{head}  ⚡ {speed:.1} km/h  ⛰ {elevation_gain} m"),
    }
}

/// Map stand-in for a terminal. Markers and view changes only go to the log; stdout is
/// left to the command output.
#[derive(Debug, Default)]
pub struct TerminalMap {
    markers: usize,
}

impl MapView for TerminalMap {
    fn place_marker(&mut self, marker: &Marker) -> Result<()> {
        self.markers += 1;
        tracing::debug!(
            coords = %marker.coords,
            class = %marker.class,
            popup = %marker.popup,
            "marker placed"
        );
        Ok(())
    }

    fn set_view(&mut self, center: Coords, zoom: u8) -> Result<()> {
        tracing::info!(center = %center, zoom, "map centered");
        Ok(())
    }

    fn clear_markers(&mut self) -> Result<()> {
        tracing::debug!(removed = self.markers, "markers cleared");
        self.markers = 0;
        Ok(())
    }
}

/// Prints one line per workout to stdout (or any writer).
#[derive(Debug, Clone)]
pub struct TerminalList<W = io::Stdout> {
    out: W,
    details: bool,
}

impl TerminalList {
    pub fn stdout(details: bool) -> Self {
        Self {
            out: io::stdout(),
            details,
        }
    }
}

impl<W: Write> TerminalList<W> {
    pub const fn new(out: W, details: bool) -> Self {
        Self { out, details }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ListView for TerminalList<W> {
    fn push_entry(&mut self, workout: &Workout) -> Result<()> {
        let line = format_entry(workout);
        if self.details {
            writeln!(
                self.out,
                "{}\t{}\t{}\t{line}",
                workout.id,
                workout.date.to_rfc3339(),
                workout.coords
            )?;
        } else {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects markers and writes them as a GPX waypoint file.
#[derive(Debug)]
pub struct GpxMap {
    path: PathBuf,
    center: Option<Coords>,
    waypoints: Vec<Waypoint>,
}

impl GpxMap {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            center: None,
            waypoints: Vec::new(),
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Write everything placed so far to the target file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn flush(&self) -> Result<()> {
        let file = File::create(&self.path)?;
        write_waypoints(BufWriter::new(file), &self.waypoints, self.center)?;
        tracing::info!(
            path = %self.path.display(),
            waypoints = self.waypoints.len(),
            "gpx written"
        );
        Ok(())
    }
}

impl MapView for GpxMap {
    fn place_marker(&mut self, marker: &Marker) -> Result<()> {
        self.waypoints.push(Waypoint {
            coords: marker.coords,
            time: None,
            name: marker
                .popup
                .split_once(' ')
                .map_or_else(|| marker.popup.clone(), |(_, rest)| rest.to_string()),
            desc: marker.popup.clone(),
            kind: marker.class.clone(),
        });
        Ok(())
    }

    fn set_view(&mut self, center: Coords, _zoom: u8) -> Result<()> {
        self.center = Some(center);
        Ok(())
    }

    fn clear_markers(&mut self) -> Result<()> {
        self.waypoints.clear();
        Ok(())
    }
}
