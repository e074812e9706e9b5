//! The coordinator: owns the workout list and wires input to records, storage and views.

use crate::dlog;
use crate::error::{Error, Result};
use crate::render::{ListView, MapView, Marker};
use crate::store::{SlotStore, WorkoutStore};
use crate::types::{Activity, Coords, Workout, WorkoutId, WorkoutKind};

/// Source of the user's current position.
pub trait Locator {
    fn current_position(&self) -> Result<Coords>;
}

/// A position known up front (config or command line), or none at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator(pub Option<Coords>);

impl Locator for FixedLocator {
    fn current_position(&self) -> Result<Coords> {
        self.0.ok_or(Error::PositionUnavailable)
    }
}

/// Raw form input. Fields the chosen kind does not use are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub kind: WorkoutKind,
    pub distance: Option<f64>,
    pub duration: Option<f64>,
    pub cadence: Option<f64>,
    pub elevation: Option<f64>,
}

impl WorkoutForm {
    pub const fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance: Some(distance),
            duration: Some(duration),
            cadence: Some(cadence),
            elevation: None,
        }
    }

    pub const fn cycling(distance: f64, duration: f64, elevation: f64) -> Self {
        Self {
            kind: WorkoutKind::Cycling,
            distance: Some(distance),
            duration: Some(duration),
            cadence: None,
            elevation: Some(elevation),
        }
    }

    /// Check every field the kind requires.
    ///
    /// Distance, duration and cadence must be finite and > 0; elevation gain must be
    /// finite and >= 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first rejected field.
    pub fn validate(&self) -> Result<ValidForm> {
        let distance = positive("distance", self.distance)?;
        let duration = positive("duration", self.duration)?;
        let activity = match self.kind {
            WorkoutKind::Running => Activity::Running {
                cadence: positive("cadence", self.cadence)?,
                pace: 0.0,
            },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain: non_negative("elevation", self.elevation)?,
                speed: 0.0,
            },
        };
        Ok(ValidForm {
            distance,
            duration,
            activity,
        })
    }
}

/// Form values that passed validation. The derived metric is filled in on assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidForm {
    distance: f64,
    duration: f64,
    activity: Activity,
}

impl ValidForm {
    fn build(self, coords: Coords) -> Workout {
        match self.activity {
            Activity::Running { cadence, .. } => {
                Workout::running(coords, self.distance, self.duration, cadence)
            }
            Activity::Cycling { elevation_gain, .. } => {
                Workout::cycling(coords, self.distance, self.duration, elevation_gain)
            }
        }
    }

    fn rebuild(self, old: &Workout) -> Workout {
        let mut w = Workout::assemble(
            old.id.clone(),
            old.date,
            old.coords,
            self.distance,
            self.duration,
            self.activity,
        );
        w.clicks = old.clicks;
        w
    }
}

fn positive(field: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(Error::invalid_input(field)),
    }
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(Error::invalid_input(field)),
    }
}

/// Application context. One per session; the front end constructs it and drives it.
#[derive(Debug)]
pub struct App<S, M, L> {
    workouts: Vec<Workout>,
    store: WorkoutStore<S>,
    map: Option<M>,
    list: L,
    zoom: u8,
    pending: Option<Coords>,
    form_visible: bool,
}

impl<S: SlotStore, M: MapView, L: ListView> App<S, M, L> {
    /// Load persisted workouts and render them into the list. The map starts unloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the list view fails to render.
    pub fn start(store: WorkoutStore<S>, mut list: L, zoom: u8) -> Result<Self> {
        let workouts = store.load();
        for w in &workouts {
            list.push_entry(w)?;
        }
        tracing::debug!(workouts = workouts.len(), "session started");

        Ok(Self {
            workouts,
            store,
            map: None,
            list,
            zoom,
            pending: None,
            form_visible: false,
        })
    }

    /// Ask `locator` where we are; on success center `map` there and replay all markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionUnavailable`] (map stays unloaded) or a rendering error.
    pub fn load_map(&mut self, locator: &impl Locator, mut map: M) -> Result<()> {
        let center = match locator.current_position() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(err = %e, "map not loaded");
                return Err(e);
            }
        };

        map.set_view(center, self.zoom)?;
        for w in &self.workouts {
            map.place_marker(&Marker::for_workout(w))?;
        }
        dlog!("map loaded center={} markers={}", center, self.workouts.len());
        self.map = Some(map);
        Ok(())
    }

    /// A click on the map: remember where and open the form.
    pub fn show_form(&mut self, coords: Coords) {
        self.pending = Some(coords);
        self.form_visible = true;
    }

    /// Validate the form and log a new workout at the clicked point.
    ///
    /// # Errors
    ///
    /// [`Error::NoLocation`] without a prior [`App::show_form`], [`Error::InvalidInput`]
    /// on bad input, or a storage error. Nothing changes when an error is returned.
    /// Once the workout is persisted, rendering failures are logged, not returned.
    pub fn submit(&mut self, form: &WorkoutForm) -> Result<&Workout> {
        let coords = self.pending.ok_or(Error::NoLocation)?;
        let valid = form.validate().inspect_err(|e| {
            tracing::debug!(err = %e, ?form, "form rejected");
        })?;

        let workout = valid.build(coords);
        self.workouts.push(workout);
        if let Err(e) = self.store.save(&self.workouts) {
            self.workouts.pop();
            return Err(e);
        }
        self.pending = None;
        self.form_visible = false;

        let idx = self.workouts.len() - 1;
        self.render_appended(idx);

        let workout = &self.workouts[idx];
        tracing::info!(id = %workout.id, kind = %workout.kind(), "workout logged");
        Ok(workout)
    }

    /// A click on a list entry: center the map on the workout and count the click.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownWorkout`] or a storage error; the click is not counted
    /// when the store write fails.
    pub fn move_to(&mut self, id: &WorkoutId) -> Result<Coords> {
        let idx = self.index_of(id)?;
        let coords = self.workouts[idx].coords;

        let clicks = self.workouts[idx].clicks;
        self.workouts[idx].click();
        if let Err(e) = self.store.save(&self.workouts) {
            self.workouts[idx].clicks = clicks;
            return Err(e);
        }

        if let Some(map) = self.map.as_mut()
            && let Err(e) = map.set_view(coords, self.zoom)
        {
            tracing::warn!(err = %e, "could not recenter map");
        }
        Ok(coords)
    }

    /// Replace a workout's fields, keeping its id, place, date and click count.
    ///
    /// The kind may change; the derived metric and description are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownWorkout`], [`Error::InvalidInput`], or a storage error.
    pub fn edit(&mut self, id: &WorkoutId, form: &WorkoutForm) -> Result<&Workout> {
        let idx = self.index_of(id)?;
        let valid = form.validate()?;

        let updated = valid.rebuild(&self.workouts[idx]);
        let previous = std::mem::replace(&mut self.workouts[idx], updated);
        if let Err(e) = self.store.save(&self.workouts) {
            self.workouts[idx] = previous;
            return Err(e);
        }

        self.redraw();
        tracing::info!(id = %id, "workout edited");
        Ok(&self.workouts[idx])
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownWorkout`] or a storage error.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout> {
        let idx = self.index_of(id)?;
        let removed = self.workouts.remove(idx);
        if let Err(e) = self.store.save(&self.workouts) {
            self.workouts.insert(idx, removed);
            return Err(e);
        }

        self.redraw();
        tracing::info!(id = %id, "workout deleted");
        Ok(removed)
    }

    /// Append workouts from another snapshot, skipping ids already present.
    ///
    /// Returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns a storage error, in which case nothing is added.
    pub fn import(&mut self, incoming: Vec<Workout>) -> Result<usize> {
        let before = self.workouts.len();
        for w in incoming {
            if self.workouts.iter().any(|have| have.id == w.id) {
                dlog!("import skipping duplicate id={}", w.id);
                continue;
            }
            self.workouts.push(w);
        }

        let added = self.workouts.len() - before;
        if added == 0 {
            return Ok(0);
        }
        if let Err(e) = self.store.save(&self.workouts) {
            self.workouts.truncate(before);
            return Err(e);
        }

        for idx in before..self.workouts.len() {
            self.render_appended(idx);
        }
        Ok(added)
    }

    /// Wipe all history, persisted and in memory, and return to a fresh session.
    ///
    /// The map is dropped as well; call [`App::load_map`] again to locate and redraw,
    /// the way a page reload would.
    ///
    /// # Errors
    ///
    /// Returns a storage error, in which case nothing is cleared.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.workouts.clear();
        self.pending = None;
        self.form_visible = false;

        if let Err(e) = self.list.clear() {
            tracing::warn!(err = %e, "could not clear list");
        }
        if let Some(mut map) = self.map.take()
            && let Err(e) = map.clear_markers()
        {
            tracing::warn!(err = %e, "could not clear markers");
        }
        tracing::info!("history reset");
        Ok(())
    }

    /// Draw one already-persisted workout. Failures only affect the views, so they are logged.
    fn render_appended(&mut self, idx: usize) {
        let workout = &self.workouts[idx];
        if let Some(map) = self.map.as_mut()
            && let Err(e) = map.place_marker(&Marker::for_workout(workout))
        {
            tracing::warn!(err = %e, id = %workout.id, "could not place marker");
        }
        if let Err(e) = self.list.push_entry(workout) {
            tracing::warn!(err = %e, id = %workout.id, "could not render list entry");
        }
    }

    fn redraw(&mut self) {
        if let Err(e) = self.redraw_views() {
            tracing::warn!(err = %e, "could not redraw views");
        }
    }

    fn redraw_views(&mut self) -> Result<()> {
        self.list.clear()?;
        for w in &self.workouts {
            self.list.push_entry(w)?;
        }
        if let Some(map) = self.map.as_mut() {
            map.clear_markers()?;
            for w in &self.workouts {
                map.place_marker(&Marker::for_workout(w))?;
            }
        }
        Ok(())
    }

    fn index_of(&self, id: &WorkoutId) -> Result<usize> {
        self.workouts
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| Error::UnknownWorkout { id: id.clone() })
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| &w.id == id)
    }

    pub const fn is_form_visible(&self) -> bool {
        self.form_visible
    }

    pub const fn pending_coords(&self) -> Option<Coords> {
        self.pending
    }

    pub const fn is_map_loaded(&self) -> bool {
        self.map.is_some()
    }

    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySlots, WORKOUTS_KEY};
    use chrono::{Datelike, Local};

    #[derive(Debug, Default)]
    struct RecordingMap {
        markers: Vec<Marker>,
        views: Vec<(Coords, u8)>,
    }

    impl MapView for RecordingMap {
        fn place_marker(&mut self, marker: &Marker) -> Result<()> {
            self.markers.push(marker.clone());
            Ok(())
        }

        fn set_view(&mut self, center: Coords, zoom: u8) -> Result<()> {
            self.views.push((center, zoom));
            Ok(())
        }

        fn clear_markers(&mut self) -> Result<()> {
            self.markers.clear();
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingList {
        entries: Vec<String>,
    }

    impl ListView for RecordingList {
        fn push_entry(&mut self, workout: &Workout) -> Result<()> {
            self.entries.push(workout.id.to_string());
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            self.entries.clear();
            Ok(())
        }
    }

    /// Slots whose writes always fail.
    #[derive(Debug, Default)]
    struct BrokenSlots;

    impl SlotStore for BrokenSlots {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk full")))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Slots that accept a fixed number of writes and fail after that.
    #[derive(Debug, Default)]
    struct FlakySlots {
        inner: MemorySlots,
        writes_left: usize,
    }

    impl SlotStore for FlakySlots {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.writes_left == 0 {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.writes_left -= 1;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    /// A map that can be centered but refuses markers.
    #[derive(Debug, Default)]
    struct FailingMap;

    impl MapView for FailingMap {
        fn place_marker(&mut self, _marker: &Marker) -> Result<()> {
            Err(Error::Io(std::io::Error::other("tile server gone")))
        }

        fn set_view(&mut self, _center: Coords, _zoom: u8) -> Result<()> {
            Ok(())
        }

        fn clear_markers(&mut self) -> Result<()> {
            Ok(())
        }
    }

    type TestApp = App<MemorySlots, RecordingMap, RecordingList>;

    const HOME: Coords = Coords::new(48.8566, 2.3522);
    const CLICK: Coords = Coords::new(48.86, 2.34);

    fn new_app() -> TestApp {
        let mut app = App::start(
            WorkoutStore::new(MemorySlots::new()),
            RecordingList::default(),
            13,
        )
        .unwrap();
        app.load_map(&FixedLocator(Some(HOME)), RecordingMap::default())
            .unwrap();
        app
    }

    fn add_run(app: &mut TestApp) -> WorkoutId {
        app.show_form(CLICK);
        app.submit(&WorkoutForm::running(5.0, 25.0, 180.0))
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn test_submit_running() {
        let mut app = new_app();
        app.show_form(CLICK);
        assert!(app.is_form_visible());

        let w = app
            .submit(&WorkoutForm::running(5.0, 25.0, 180.0))
            .unwrap()
            .clone();

        assert_eq!(w.pace(), Some(5.0));
        assert_eq!(w.coords, CLICK);
        let local = w.date.with_timezone(&Local);
        assert!(w.description.contains(&local.day().to_string()));
        assert!(!w.description.is_empty());

        assert_eq!(app.workouts().len(), 1);
        assert!(!app.is_form_visible());
        assert_eq!(app.pending_coords(), None);
        assert_eq!(app.map().unwrap().markers.len(), 1);
        assert_eq!(app.list().entries, vec![w.id.to_string()]);
        assert_eq!(app.store().load(), vec![w]);
    }

    #[test]
    fn test_submit_cycling() {
        let mut app = new_app();
        app.show_form(CLICK);
        let w = app.submit(&WorkoutForm::cycling(20.0, 60.0, 150.0)).unwrap();
        assert_eq!(w.speed(), Some(20.0));
        assert_eq!(w.kind(), WorkoutKind::Cycling);
    }

    #[test]
    fn test_rejected_inputs_change_nothing() {
        let mut app = new_app();
        add_run(&mut app);
        let before = app.workouts().to_vec();

        let bad = [
            WorkoutForm::running(-1.0, 5.0, 10.0),
            WorkoutForm::running(5.0, 0.0, 10.0),
            WorkoutForm::running(5.0, 10.0, 0.0),
            WorkoutForm::running(f64::NAN, 10.0, 170.0),
            WorkoutForm::running(5.0, f64::INFINITY, 170.0),
            WorkoutForm::cycling(5.0, 0.0, 10.0),
            WorkoutForm::cycling(5.0, 10.0, -3.0),
            WorkoutForm {
                cadence: None,
                ..WorkoutForm::running(5.0, 10.0, 1.0)
            },
        ];

        app.show_form(CLICK);
        for form in &bad {
            let err = app.submit(form).unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }), "{form:?}");
        }

        assert_eq!(app.workouts(), before.as_slice());
        assert_eq!(app.store().load(), before);
        assert!(app.is_form_visible());
        assert_eq!(app.pending_coords(), Some(CLICK));
        assert_eq!(app.list().entries.len(), 1);
    }

    #[test]
    fn test_flat_ride_is_accepted() {
        let mut app = new_app();
        app.show_form(CLICK);
        let w = app.submit(&WorkoutForm::cycling(12.0, 30.0, 0.0)).unwrap();
        assert_eq!(w.speed(), Some(24.0));
    }

    #[test]
    fn test_submit_without_click_fails() {
        let mut app = new_app();
        let err = app
            .submit(&WorkoutForm::running(5.0, 25.0, 180.0))
            .unwrap_err();
        assert!(matches!(err, Error::NoLocation));
        assert!(app.workouts().is_empty());
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let mut app: App<BrokenSlots, RecordingMap, RecordingList> =
            App::start(WorkoutStore::new(BrokenSlots), RecordingList::default(), 13).unwrap();
        app.show_form(CLICK);

        assert!(app.submit(&WorkoutForm::running(5.0, 25.0, 180.0)).is_err());
        assert!(app.workouts().is_empty());
        assert!(app.list().entries.is_empty());
        assert!(app.is_form_visible());
    }

    #[test]
    fn test_startup_replays_history() {
        let mut store = WorkoutStore::new(MemorySlots::new());
        let history = vec![
            Workout::running(HOME, 3.0, 18.0, 170.0),
            Workout::cycling(CLICK, 30.0, 90.0, 200.0),
        ];
        store.save(&history).unwrap();

        let mut app: TestApp = App::start(store, RecordingList::default(), 13).unwrap();
        assert_eq!(app.list().entries.len(), 2);
        assert!(!app.is_map_loaded());

        app.load_map(&FixedLocator(Some(HOME)), RecordingMap::default())
            .unwrap();
        let map = app.map().unwrap();
        assert_eq!(map.views, vec![(HOME, 13)]);
        assert_eq!(map.markers.len(), 2);
        assert_eq!(map.markers[1].class, "cycling-popup");
    }

    #[test]
    fn test_position_failure_leaves_map_unloaded() {
        let mut store = WorkoutStore::new(MemorySlots::new());
        store
            .save(&[Workout::running(HOME, 3.0, 18.0, 170.0)])
            .unwrap();

        let mut app: TestApp = App::start(store, RecordingList::default(), 13).unwrap();
        let err = app
            .load_map(&FixedLocator(None), RecordingMap::default())
            .unwrap_err();

        assert!(matches!(err, Error::PositionUnavailable));
        assert!(!app.is_map_loaded());
        assert_eq!(app.list().entries.len(), 1);

        // Logging still works without a map.
        app.show_form(CLICK);
        app.submit(&WorkoutForm::running(5.0, 25.0, 180.0)).unwrap();
        assert_eq!(app.workouts().len(), 2);
    }

    #[test]
    fn test_move_to_recenters_and_counts_click() {
        let mut app = new_app();
        let id = add_run(&mut app);

        let coords = app.move_to(&id).unwrap();
        assert_eq!(coords, CLICK);
        assert_eq!(app.map().unwrap().views.last(), Some(&(CLICK, 13)));
        assert_eq!(app.find(&id).unwrap().clicks, 1);
        assert_eq!(app.store().load()[0].clicks, 1);

        let missing = WorkoutId::from("nope");
        assert!(matches!(
            app.move_to(&missing),
            Err(Error::UnknownWorkout { .. })
        ));
    }

    #[test]
    fn test_edit_keeps_identity() {
        let mut app = new_app();
        let id = add_run(&mut app);
        app.move_to(&id).unwrap();
        let original = app.find(&id).unwrap().clone();

        let edited = app
            .edit(&id, &WorkoutForm::running(10.0, 45.0, 175.0))
            .unwrap()
            .clone();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.date, original.date);
        assert_eq!(edited.coords, original.coords);
        assert_eq!(edited.clicks, 1);
        assert_eq!(edited.pace(), Some(4.5));
        assert_eq!(app.store().load(), vec![edited]);
        assert_eq!(app.map().unwrap().markers.len(), 1);
        assert_eq!(app.list().entries.len(), 1);
    }

    #[test]
    fn test_edit_can_change_kind() {
        let mut app = new_app();
        let id = add_run(&mut app);

        let edited = app.edit(&id, &WorkoutForm::cycling(20.0, 60.0, 10.0)).unwrap();
        assert_eq!(edited.kind(), WorkoutKind::Cycling);
        assert!(edited.description.starts_with("Cycling on "));
    }

    #[test]
    fn test_edit_rejects_bad_input() {
        let mut app = new_app();
        let id = add_run(&mut app);
        let before = app.workouts().to_vec();

        assert!(app.edit(&id, &WorkoutForm::running(0.0, 10.0, 170.0)).is_err());
        assert_eq!(app.workouts(), before.as_slice());
    }

    #[test]
    fn test_delete() {
        let mut app = new_app();
        let first = add_run(&mut app);
        let second = add_run(&mut app);

        let removed = app.delete(&first).unwrap();
        assert_eq!(removed.id, first);
        assert_eq!(app.workouts().len(), 1);
        assert_eq!(app.workouts()[0].id, second);
        assert_eq!(app.store().load().len(), 1);
        assert_eq!(app.list().entries, vec![second.to_string()]);
        assert_eq!(app.map().unwrap().markers.len(), 1);
    }

    #[test]
    fn test_import_skips_known_ids() {
        let mut app = new_app();
        add_run(&mut app);
        let existing = app.workouts()[0].clone();
        let fresh = Workout::cycling(HOME, 20.0, 60.0, 150.0);

        let added = app.import(vec![existing, fresh.clone()]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(app.workouts().len(), 2);
        assert_eq!(app.store().load()[1], fresh);
        assert_eq!(app.map().unwrap().markers.len(), 2);
    }

    #[test]
    fn test_reset() {
        let mut app = new_app();
        add_run(&mut app);
        add_run(&mut app);

        app.reset().unwrap();

        assert!(app.workouts().is_empty());
        assert!(app.list().entries.is_empty());
        assert!(!app.is_map_loaded());
        assert!(app.store().slots().get(WORKOUTS_KEY).unwrap().is_none());
        assert!(app.store().load().is_empty());
    }

    #[test]
    fn test_failed_click_save_is_not_counted() {
        let slots = FlakySlots {
            writes_left: 1,
            ..FlakySlots::default()
        };
        let mut app: App<FlakySlots, RecordingMap, RecordingList> =
            App::start(WorkoutStore::new(slots), RecordingList::default(), 13).unwrap();
        app.load_map(&FixedLocator(Some(HOME)), RecordingMap::default())
            .unwrap();
        app.show_form(CLICK);
        let id = app
            .submit(&WorkoutForm::running(5.0, 25.0, 180.0))
            .unwrap()
            .id
            .clone();

        assert!(app.move_to(&id).is_err());
        assert_eq!(app.find(&id).unwrap().clicks, 0);
        assert_eq!(app.store().load()[0].clicks, 0);
        assert_eq!(app.map().unwrap().views, vec![(HOME, 13)]);
    }

    #[test]
    fn test_render_failure_after_save_still_succeeds() {
        let mut app: App<MemorySlots, FailingMap, RecordingList> = App::start(
            WorkoutStore::new(MemorySlots::new()),
            RecordingList::default(),
            13,
        )
        .unwrap();
        app.load_map(&FixedLocator(Some(HOME)), FailingMap).unwrap();

        app.show_form(CLICK);
        let id = app
            .submit(&WorkoutForm::running(5.0, 25.0, 180.0))
            .unwrap()
            .id
            .clone();

        assert!(!app.is_form_visible());
        assert_eq!(app.pending_coords(), None);
        assert_eq!(app.store().load().len(), 1);
        assert_eq!(app.list().entries, vec![id.to_string()]);

        let added = app
            .import(vec![Workout::cycling(HOME, 20.0, 60.0, 150.0)])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(app.store().load().len(), 2);

        app.edit(&id, &WorkoutForm::running(6.0, 30.0, 170.0)).unwrap();
        app.delete(&id).unwrap();
        assert_eq!(app.store().load().len(), 1);
    }

    #[test]
    fn test_map_reloads_after_reset() {
        let mut app = new_app();
        add_run(&mut app);
        app.reset().unwrap();

        app.load_map(&FixedLocator(Some(HOME)), RecordingMap::default())
            .unwrap();
        assert!(app.is_map_loaded());
        let map = app.map().unwrap();
        assert!(map.markers.is_empty());
        assert_eq!(map.views, vec![(HOME, 13)]);

        add_run(&mut app);
        assert_eq!(app.map().unwrap().markers.len(), 1);
    }
}
