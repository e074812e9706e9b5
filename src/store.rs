//! Persistence for the workout list.
//!
//! The list lives in a single key/value slot as one JSON snapshot. Every save
//! replaces the whole value; there are no per-record writes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::dlog;
use crate::error::{Error, Result};
use crate::types::{Activity, Coords, Workout, WorkoutId, WorkoutKind};

/// Slot key holding the serialized workout list.
pub const WORKOUTS_KEY: &str = "workouts";

/// A string key/value store.
pub trait SlotStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// `SQLite`-backed slots, one row per key.
#[derive(Debug)]
pub struct SqliteSlots {
    path: PathBuf,
    conn: Connection,
}

impl SqliteSlots {
    /// Open or create the slot database, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path).map_err(|source| Error::StorageOpen {
            path: path.clone(),
            source,
        })?;
        ensure_schema(&conn)?;

        tracing::debug!(path = %path.display(), "slot store opened");
        Ok(Self { path, conn })
    }

    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::StorageOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        ensure_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS slots (
          key    TEXT PRIMARY KEY,
          value  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

impl SlotStore for SqliteSlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO slots (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            ",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Plain-data shape of one persisted workout.
///
/// Matches what the browser version wrote to `localStorage`, so old dumps load as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    pub id: String,
    pub date: DateTime<Utc>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl From<&Workout> for Record {
    fn from(w: &Workout) -> Self {
        let (cadence, pace, elevation_gain, speed) = match w.activity {
            Activity::Running { cadence, pace } => (Some(cadence), Some(pace), None, None),
            Activity::Cycling {
                elevation_gain,
                speed,
            } => (None, None, Some(elevation_gain), Some(speed)),
        };

        Self {
            kind: w.kind(),
            id: w.id.to_string(),
            date: w.date,
            coords: w.coords,
            distance: w.distance,
            duration: w.duration,
            clicks: w.clicks,
            description: w.description.clone(),
            cadence,
            pace,
            elevation_gain,
            speed,
        }
    }
}

impl Record {
    /// Rebuild a typed workout, recomputing the derived metric.
    ///
    /// Returns `None` when the record breaks a workout invariant.
    pub fn into_workout(self) -> Option<Workout> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if self.id.is_empty()
            || !positive(self.distance)
            || !positive(self.duration)
            || !self.coords.lat.is_finite()
            || !self.coords.lng.is_finite()
        {
            return None;
        }

        let activity = match self.kind {
            WorkoutKind::Running => Activity::Running {
                cadence: self.cadence.filter(|c| c.is_finite())?,
                pace: 0.0,
            },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain: self.elevation_gain.filter(|e| e.is_finite())?,
                speed: 0.0,
            },
        };

        let mut w = Workout::assemble(
            WorkoutId::from(self.id),
            self.date,
            self.coords,
            self.distance,
            self.duration,
            activity,
        );
        w.clicks = self.clicks;
        if !self.description.is_empty() {
            w.description = self.description;
        }
        Some(w)
    }
}

/// Parse a JSON snapshot into workouts, dropping records that fail validation.
///
/// # Errors
///
/// Returns an error if `json` is not an array of records.
pub fn parse_snapshot(json: &str) -> Result<Vec<Workout>> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    let total = records.len();

    let mut out = Vec::with_capacity(total);
    for r in records {
        let id = r.id.clone();
        match r.into_workout() {
            Some(w) => out.push(w),
            None => tracing::warn!(id = %id, "skipping invalid stored workout"),
        }
    }

    dlog!("parsed snapshot records={} kept={}", total, out.len());
    Ok(out)
}

/// Whole-list persistence on top of a [`SlotStore`].
#[derive(Debug)]
pub struct WorkoutStore<S> {
    slots: S,
}

impl<S: SlotStore> WorkoutStore<S> {
    pub const fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Replace the stored list with `workouts`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<()> {
        let records: Vec<Record> = workouts.iter().map(Record::from).collect();
        let json = serde_json::to_string(&records)?;
        self.slots.set(WORKOUTS_KEY, &json)?;
        dlog!("saved workouts count={}", workouts.len());
        Ok(())
    }

    /// Load the stored list. Missing or malformed data yields an empty list.
    pub fn load(&self) -> Vec<Workout> {
        let json = match self.slots.get(WORKOUTS_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(err = %e, "could not read stored workouts");
                return Vec::new();
            }
        };

        parse_snapshot(&json).unwrap_or_else(|e| {
            tracing::warn!(err = %e, "stored workouts are malformed; starting empty");
            Vec::new()
        })
    }

    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub fn clear(&mut self) -> Result<()> {
        self.slots.remove(WORKOUTS_KEY)
    }

    pub const fn slots(&self) -> &S {
        &self.slots
    }
}
