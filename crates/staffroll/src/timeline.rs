use anyhow::{Context, Result};
use egui::{CursorIcon, Pos2, Vec2};
use staffroll_command::CommandTracker;
use staffroll_lib::{ElementRef, Range, Song};

use crate::{
    DirtyTracker, TimelineConfig,
    drag::{
        ClickAction, DragAction, DragHandler, DraggedData, clamp_pitch_delta, clamp_stretch_delta,
        clamp_time_delta,
    },
    element::{ElementWrapper, HitRegion, InteractKind},
    input::{InputModifiers, PointerEvent},
    selection::{self, ElementKey, SelectionManager},
    track::{Track, TrackKind},
};

pub const CHANGE_TRACK: usize = 0;
pub const NOTE_TRACK: usize = 1;
pub const CHORD_TRACK: usize = 2;

/// Everything one finished gesture did to the song. Rolling back `commands` undoes it.
#[derive(Debug)]
pub struct GestureCommit {
    pub commands: CommandTracker,
    /// Elements that were moved or stretched, indexed as they are after the commit.
    pub modified: Vec<ElementRef>,
}

#[derive(Debug)]
#[must_use = "the dirty span and cursor should be handed to the renderer"]
pub struct EventOutcome {
    /// Ticks to repaint, accumulated since the last [`Timeline::take_dirty`].
    pub dirty: Option<Range>,
    pub cursor: CursorIcon,
    pub commit: Option<GestureCommit>,
}

/// Interactive state of the timeline. The song itself isn't owned; it's passed to every call that
/// reads or writes it.
#[derive(Debug)]
pub struct Timeline {
    config: TimelineConfig,

    tracks: Vec<Track>,
    selection: SelectionManager,
    dirty: DirtyTracker,
    drag: DragHandler,
    hover: Option<(ElementKey, InteractKind)>,

    length: i64,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Self {
        let dirty = DirtyTracker::new(config.dirty_pad, config.dirty_all_margin);
        Self {
            config,
            tracks: vec![
                Track::new(TrackKind::Changes),
                Track::new(TrackKind::Notes),
                Track::new(TrackKind::Chords),
            ],
            selection: SelectionManager::new(),
            dirty,
            drag: DragHandler::new(),
            hover: None,
            length: 0,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }
    pub fn length(&self) -> i64 {
        self.length
    }
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|track| track.kind() == kind)
    }
    pub fn element(&self, key: ElementKey) -> Option<&ElementWrapper> {
        selection::element(&self.tracks, key)
    }
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }
    pub fn selected_elements(&self) -> impl Iterator<Item = &ElementWrapper> {
        self.selection.iter(&self.tracks)
    }
    pub fn hover(&self) -> Option<ElementKey> {
        self.hover.map(|(key, _)| key)
    }
    pub fn is_dragging(&self) -> bool {
        self.drag.is_something_being_dragged()
    }
    pub fn dragged_data(&self) -> Option<&DraggedData> {
        self.drag.dragged_data()
    }

    /// Scroll offset of a track including a background drag in progress.
    pub fn scroll_y(&self, track: usize) -> f32 {
        self.tracks
            .get(track)
            .map_or(0.0, |t| t.scroll_y + self.pending_scroll(track))
    }

    /// The span to repaint since the last call.
    pub fn take_dirty(&mut self) -> Option<Range> {
        self.dirty.take_and_clear()
    }

    /// Rebuilds every element from `song` and marks everything dirty. Any gesture in progress
    /// is dropped and nothing stays selected.
    pub fn synchronize(&mut self, song: &Song) -> Result<()> {
        song.validate()
            .context("song can't be shown on the timeline")?;

        if self.drag.finish().is_some() {
            tracing::debug!("dropping gesture in progress for synchronization");
        }
        self.hover = None;
        self.selection.clear();

        self.length = song.length();
        self.dirty.set_length(self.length);
        for track in &mut self.tracks {
            track.synchronize(song, &self.config);
        }
        self.dirty.mark_all();

        tracing::debug!(
            "synchronized timeline: {} ticks, {} notes, {} chords, {} key changes, {} meter changes",
            self.length,
            song.notes.len(),
            song.chords.len(),
            song.key_changes.len(),
            song.meter_changes.len()
        );
        Ok(())
    }

    /// Stacks the tracks in a canvas `height` pixels tall. The note track takes whatever the
    /// change and chord tracks leave over.
    pub fn relayout(&mut self, song: &Song, height: f32) {
        let margin = self.config.track_margin;
        let change_height = self.config.change_track_height;
        let chord_height = self.config.chord_track_height;
        let note_height = (height - change_height - chord_height - 4.0 * margin).max(0.0);

        let mut y = margin;
        for (track, track_height) in
            self.tracks
                .iter_mut()
                .zip([change_height, note_height, chord_height])
        {
            track.y = y;
            track.height = track_height;
            y += track_height + margin;
        }

        if self.drag.finish().is_some() {
            tracing::debug!("dropping gesture in progress for relayout");
        }
        self.hover = None;

        // rebuilding the wrappers drops their selected flags
        let selected = self.selection.selected_elements(&self.tracks);
        for track in &mut self.tracks {
            track.synchronize(song, &self.config);
        }
        self.selection.restore(&mut self.tracks, &selected);
        self.dirty.mark_all();
    }

    pub fn handle_event(&mut self, song: &mut Song, event: PointerEvent) -> EventOutcome {
        tracing::trace!("handling {event:?}");
        let (cursor, commit) = match event {
            PointerEvent::Down { pos, modifiers } => (self.pointer_down(pos, modifiers), None),
            PointerEvent::Move { pos } => (self.pointer_move(pos), None),
            PointerEvent::Up { .. } => self.pointer_up(song),
            PointerEvent::Cancel => (self.cancel(), None),
        };
        EventOutcome {
            dirty: self.dirty.span(),
            cursor,
            commit,
        }
    }

    fn pending_scroll(&self, track: usize) -> f32 {
        match self.drag.dragged_data() {
            Some(data) if data.action() == (DragAction::Scroll { track: Some(track) }) => {
                data.scroll_y
            }
            _ => 0.0,
        }
    }

    fn track_index_at(&self, y: f32) -> Option<usize> {
        self.tracks.iter().position(|track| track.contains_y(y))
    }

    fn hit_test(&self, pos: Pos2) -> Option<(ElementKey, HitRegion)> {
        self.tracks.iter().enumerate().find_map(|(i, track)| {
            track
                .hit_test(pos, self.pending_scroll(i))
                .map(|(index, region)| (ElementKey::new(i, index), region))
        })
    }

    fn pointer_down(&mut self, pos: Pos2, modifiers: InputModifiers) -> CursorIcon {
        if self.drag.is_something_being_dragged() {
            tracing::warn!("pointer down in the middle of a gesture, cancelling it");
            self.cancel();
        }

        let extend = modifiers.contains(InputModifiers::EXTEND_SELECTION);
        let hit = self.hit_test(pos);
        let is_selected = hit.is_some_and(|(key, _)| self.selection.contains(key));

        if !extend && !is_selected {
            self.selection.unselect_all(&mut self.tracks, &mut self.dirty);
        }

        let Some((key, region)) = hit else {
            let track = self.track_index_at(pos.y);
            tracing::trace!("background drag on track {track:?}");
            self.drag.start(DragAction::Scroll { track }, pos, None);
            return CursorIcon::Grabbing;
        };

        let click = if !is_selected {
            self.selection.select(&mut self.tracks, &mut self.dirty, key);
            None
        } else if extend {
            Some(ClickAction::Toggle(key))
        } else {
            Some(ClickAction::SelectOnly(key))
        };

        self.selection
            .unselect_all_except_compatible(&mut self.tracks, &mut self.dirty, region.kind);
        self.selection
            .mark_dirty(&self.tracks, &mut self.dirty, region.kind, 0);

        tracing::trace!(
            "dragging {} elements from {key:?} with {:?}",
            self.selection.len(),
            region.kind
        );
        self.drag.start(DragAction::Elements(region.kind), pos, click);
        region.kind.cursor()
    }

    fn pointer_move(&mut self, pos: Pos2) -> CursorIcon {
        let Some(movement) = self.drag.update(pos) else {
            return self.update_hover(pos);
        };
        let Some(action) = self.drag.dragged_data().map(DraggedData::action) else {
            return CursorIcon::Default;
        };

        match action {
            DragAction::Scroll { .. } => {
                if let Some(data) = self.drag.dragged_data_mut() {
                    data.scroll_y = movement.y;
                }
                self.dirty.mark_all();
                CursorIcon::Grabbing
            }
            DragAction::Elements(kind) => {
                self.drag_elements(kind, movement);
                kind.cursor()
            }
        }
    }

    fn drag_elements(&mut self, kind: InteractKind, movement: Vec2) {
        let Some(previous_time) = self.drag.dragged_data().map(|data| data.delta_time) else {
            return;
        };

        let raw_time = self.config.x_to_tick(movement.x).round() as i64;
        // screen y grows downwards, pitch grows upwards
        let raw_pitch = (-movement.y / self.config.note_height).round() as i32;

        let delta_time = if kind.contains(InteractKind::MOVE_TIME) {
            self.selection
                .iter(&self.tracks)
                .map(ElementWrapper::time_range)
                .reduce(|a, b| a.merge(b))
                .map_or(0, |merged| {
                    clamp_time_delta(raw_time, merged, self.length, self.config.time_snap)
                })
        } else if kind.contains(InteractKind::STRETCH_TIME) {
            clamp_stretch_delta(
                raw_time,
                self.selection
                    .iter(&self.tracks)
                    .map(ElementWrapper::time_range),
                self.length,
                self.config.time_snap,
            )
        } else {
            0
        };

        let delta_pitch = if kind.contains(InteractKind::MOVE_PITCH) {
            self.selection
                .iter(&self.tracks)
                .filter_map(ElementWrapper::pitch)
                .fold(None, |bounds: Option<(i32, i32)>, pitch| {
                    Some(bounds.map_or((pitch, pitch), |(lowest, highest)| {
                        (lowest.min(pitch), highest.max(pitch))
                    }))
                })
                .map_or(0, |(lowest, highest)| {
                    clamp_pitch_delta(raw_pitch, lowest, highest)
                })
        } else {
            0
        };

        // repaint where the elements were and where they are now
        self.selection
            .mark_dirty(&self.tracks, &mut self.dirty, kind, previous_time);
        self.selection
            .set_displacement(&mut self.tracks, kind, delta_time, delta_pitch);
        self.selection
            .mark_dirty(&self.tracks, &mut self.dirty, kind, delta_time);

        if let Some(data) = self.drag.dragged_data_mut() {
            data.delta_time = delta_time;
            data.delta_pitch = delta_pitch;
        }
        tracing::trace!("drag delta: {delta_time} ticks, {delta_pitch} semitones");
    }

    fn update_hover(&mut self, pos: Pos2) -> CursorIcon {
        let hover = self
            .hit_test(pos)
            .map(|(key, region)| (key, region.kind));

        // an unchanged hover target looks the same, so only a change is repainted
        if hover != self.hover {
            for (key, _) in [self.hover, hover].into_iter().flatten() {
                if let Some(elem) = selection::element(&self.tracks, key) {
                    self.dirty
                        .mark_dirty(elem.dirty_range(InteractKind::empty(), 0));
                }
            }
            self.hover = hover;
        }

        hover.map_or(CursorIcon::Default, |(_, kind)| kind.cursor())
    }

    fn pointer_up(&mut self, song: &mut Song) -> (CursorIcon, Option<GestureCommit>) {
        let Some(data) = self.drag.finish() else {
            return (CursorIcon::Default, None);
        };

        match data.action() {
            DragAction::Scroll { track } => {
                if let Some(track) = track.and_then(|i| self.tracks.get_mut(i)) {
                    track.handle_scroll(data.scroll_y);
                }
                if data.scroll_y != 0.0 {
                    self.dirty.mark_all();
                }
                (CursorIcon::Default, None)
            }
            DragAction::Elements(kind) => {
                if let Some(click) = data.click() {
                    self.apply_click(click);
                    return (kind.cursor(), None);
                }
                let commit = self.commit(song, kind, data.delta_time);
                (kind.cursor(), commit)
            }
        }
    }

    fn apply_click(&mut self, click: ClickAction) {
        tracing::trace!("click: {click:?}");
        match click {
            ClickAction::Toggle(key) => {
                self.selection
                    .unselect(&mut self.tracks, &mut self.dirty, key);
            }
            ClickAction::SelectOnly(key) => {
                self.selection
                    .unselect_all(&mut self.tracks, &mut self.dirty);
                self.selection
                    .select(&mut self.tracks, &mut self.dirty, key);
            }
        }
    }

    fn commit(
        &mut self,
        song: &mut Song,
        kind: InteractKind,
        delta_time: i64,
    ) -> Option<GestureCommit> {
        let mut commands = CommandTracker::new();
        let mut modified = Vec::new();
        for elem in self.selection.iter(&self.tracks) {
            if elem.modify(song, &mut commands) {
                modified.push(elem.element());
            }
        }
        self.selection
            .mark_dirty(&self.tracks, &mut self.dirty, kind, delta_time);

        let mut remaps = Vec::new();
        for track in &self.tracks {
            remaps.extend(track.apply_modifications(song, &mut commands));
        }

        // the wrappers are stale now, rebuild them and carry the selection over
        let selected =
            selection::remap_elements(&self.selection.selected_elements(&self.tracks), &remaps);
        self.hover = None;
        for track in &mut self.tracks {
            track.synchronize(song, &self.config);
        }
        self.selection.restore(&mut self.tracks, &selected);
        self.selection
            .mark_dirty(&self.tracks, &mut self.dirty, InteractKind::empty(), 0);

        if commands.is_empty() {
            tracing::trace!("gesture didn't change anything");
            return None;
        }

        let modified: Vec<_> = modified
            .into_iter()
            .map(|element| selection::remap_element(element, &remaps))
            .collect();
        tracing::info!(
            "committed {} commands for {} elements",
            commands.len(),
            modified.len()
        );
        Some(GestureCommit { commands, modified })
    }

    fn cancel(&mut self) -> CursorIcon {
        let Some(data) = self.drag.finish() else {
            return CursorIcon::Default;
        };

        match data.action() {
            DragAction::Elements(kind) => {
                self.selection
                    .mark_dirty(&self.tracks, &mut self.dirty, kind, data.delta_time);
                self.selection.reset_displacement(&mut self.tracks);
                self.selection
                    .mark_dirty(&self.tracks, &mut self.dirty, InteractKind::empty(), 0);
            }
            DragAction::Scroll { .. } => {
                if data.scroll_y != 0.0 {
                    self.dirty.mark_all();
                }
            }
        }
        tracing::debug!("gesture cancelled");
        CursorIcon::Default
    }
}
