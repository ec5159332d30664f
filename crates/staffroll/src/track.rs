use egui::{Pos2, Rect, pos2};
use staffroll_command::{CommandTracker, sequence::SequenceReorder};
use staffroll_lib::{ElementRef, Idx, MAX_VALID_MIDI_PITCH, Range, Sequence, Song};

use crate::{
    TimelineConfig,
    element::{ElementWrapper, HitRegion, InteractKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Key and meter change markers.
    Changes,
    Notes,
    Chords,
}

impl TrackKind {
    pub fn sequences(self) -> &'static [Sequence] {
        match self {
            Self::Changes => &[Sequence::KeyChanges, Sequence::MeterChanges],
            Self::Notes => &[Sequence::Notes],
            Self::Chords => &[Sequence::Chords],
        }
    }
}

/// A horizontal strip of the timeline showing one kind of element.
#[derive(Debug)]
pub struct Track {
    kind: TrackKind,

    pub y: f32,
    pub height: f32,
    pub scroll_y: f32,

    // sorted the same way as the song's sequences
    elements: Vec<ElementWrapper>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            y: 0.0,
            height: 0.0,
            scroll_y: 0.0,
            elements: Vec::new(),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y && y < self.y + self.height
    }

    pub fn elements(&self) -> &[ElementWrapper] {
        &self.elements
    }
    pub fn element(&self, index: usize) -> Option<&ElementWrapper> {
        self.elements.get(index)
    }
    pub(crate) fn element_mut(&mut self, index: usize) -> Option<&mut ElementWrapper> {
        self.elements.get_mut(index)
    }

    /// Elements drawn anywhere inside `range`, at rest or mid-drag.
    pub fn elements_in(&self, range: Range) -> impl Iterator<Item = &ElementWrapper> {
        self.elements.iter().filter(move |elem| {
            elem.time_range().expand(1).intersects(range)
                || elem.interact_time_range().expand(1).intersects(range)
        })
    }

    /// Rebuilds every element from the song. Nothing is selected afterwards.
    pub fn synchronize(&mut self, song: &Song, config: &TimelineConfig) {
        self.elements.clear();
        match self.kind {
            TrackKind::Notes => self.synchronize_notes(song, config),
            TrackKind::Chords => self.synchronize_chords(song, config),
            TrackKind::Changes => self.synchronize_changes(song, config),
        }
    }

    fn synchronize_notes(&mut self, song: &Song, config: &TimelineConfig) {
        for idx in Idx::all(song.notes.len()) {
            let note = song.note(idx);
            let row = (MAX_VALID_MIDI_PITCH - 1 - note.pitch) as f32;
            let y = row * config.note_height;
            let x1 = config.tick_to_x(note.tick);
            let x2 = config.tick_to_x(note.tick + note.duration);

            self.elements.push(with_stretch_handle(
                ElementWrapper::new(ElementRef::Note(idx), song),
                x1,
                x2,
                (y, y + config.note_height),
                InteractKind::MOVE_TIME | InteractKind::MOVE_PITCH,
                config,
            ));
        }
    }

    fn synchronize_chords(&mut self, song: &Song, config: &TimelineConfig) {
        const LANE_PADDING: f32 = 4.0;
        let y_range = (LANE_PADDING, (self.height - LANE_PADDING).max(LANE_PADDING));

        for idx in Idx::all(song.chords.len()) {
            let chord = song.chord(idx);
            let x1 = config.tick_to_x(chord.tick);
            let x2 = config.tick_to_x(chord.tick + chord.duration);

            self.elements.push(with_stretch_handle(
                ElementWrapper::new(ElementRef::Chord(idx), song),
                x1,
                x2,
                y_range,
                InteractKind::MOVE_TIME,
                config,
            ));
        }
    }

    fn synchronize_changes(&mut self, song: &Song, config: &TimelineConfig) {
        let half_width = config.change_marker_width * 0.5;
        let visual_margin = (half_width / config.time_to_pixels).ceil() as i64;
        let middle = self.height * 0.5;

        let key_changes = Idx::all(song.key_changes.len()).map(ElementRef::KeyChange);
        let meter_changes = Idx::all(song.meter_changes.len()).map(ElementRef::MeterChange);

        for element in key_changes.chain(meter_changes) {
            let wrapper = ElementWrapper::new(element, song).with_visual_margin(visual_margin);

            // the tick-0 entries anchor the song and can't be dragged
            if element.index() == 0 {
                self.elements.push(wrapper);
                continue;
            }

            let x = config.tick_to_x(wrapper.time_range().start);
            let (y1, y2) = match element {
                ElementRef::KeyChange(_) => (0.0, middle),
                _ => (middle, self.height),
            };
            let rect = Rect::from_min_max(pos2(x - half_width, y1), pos2(x + half_width, y2));
            self.elements
                .push(wrapper.with_region(rect, InteractKind::MOVE_TIME));
        }
    }

    /// Element and region under `pos`, given in timeline coordinates. `pending_scroll` is scrolling
    /// that hasn't been committed to the track yet.
    pub fn hit_test(&self, pos: Pos2, pending_scroll: f32) -> Option<(usize, HitRegion)> {
        if !self.contains_y(pos.y) {
            return None;
        }
        let local = pos2(pos.x, pos.y - self.y - self.scroll_y - pending_scroll);

        // later elements are drawn on top
        self.elements
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, elem)| elem.hit(local).map(|region| (i, region)))
    }

    /// Restores tick order in the track's sequences after elements were moved. Returns, for every
    /// reordered sequence, where each element ended up.
    pub fn apply_modifications(
        &self,
        song: &mut Song,
        tracker: &mut CommandTracker,
    ) -> Vec<(Sequence, Vec<usize>)> {
        let mut remaps = Vec::new();
        for &sequence in self.kind.sequences() {
            if let Some(reorder) = SequenceReorder::sort_by_tick(song, sequence) {
                tracing::debug!("reordering {sequence:?} after modification");
                remaps.push((sequence, reorder.new_positions()));
                tracker.execute(song, reorder);
            }
        }
        remaps
    }

    pub fn handle_scroll(&mut self, scroll: f32) {
        self.scroll_y += scroll;
    }
}

fn with_stretch_handle(
    wrapper: ElementWrapper,
    x1: f32,
    x2: f32,
    (y1, y2): (f32, f32),
    body_kind: InteractKind,
    config: &TimelineConfig,
) -> ElementWrapper {
    let handle_width = config.stretch_handle_width.min((x2 - x1) * 0.5);
    let handle_x = x2 - handle_width;
    wrapper
        .with_region(
            Rect::from_min_max(pos2(x1, y1), pos2(handle_x, y2)),
            body_kind,
        )
        .with_region(
            Rect::from_min_max(pos2(handle_x, y1), pos2(x2, y2)),
            InteractKind::STRETCH_TIME,
        )
}
