use egui::{Pos2, Rect};
use smallvec::SmallVec;
use staffroll_command::{
    CommandTracker,
    element::{ElementMove, ElementStretch},
};
use staffroll_lib::{ElementRef, Range, Song};

bitflags::bitflags! {
    /// What dragging a part of an element does.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InteractKind: u8 {
        const MOVE_TIME = 1 << 0;
        const MOVE_PITCH = 1 << 1;
        /// Moves the end of the element, changing its duration.
        const STRETCH_TIME = 1 << 2;
    }
}

impl InteractKind {
    pub fn cursor(self) -> egui::CursorIcon {
        if self.intersects(Self::MOVE_TIME | Self::MOVE_PITCH) {
            egui::CursorIcon::Move
        } else if self.contains(Self::STRETCH_TIME) {
            egui::CursorIcon::ResizeHorizontal
        } else {
            egui::CursorIcon::Default
        }
    }
}

/// A clickable part of an element, in track-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub rect: Rect,
    pub kind: InteractKind,
}

/// Interactive stand-in for one object of the song.
#[derive(Debug, Clone)]
pub struct ElementWrapper {
    element: ElementRef,

    time_range: Range,
    pitch: Option<i32>,

    // working copies, only differ from the above during a drag
    interact_time_range: Range,
    interact_pitch: Option<i32>,

    interact_kind: InteractKind,
    regions: SmallVec<[HitRegion; 2]>,
    // extra ticks on each side covered by the element's visuals
    visual_margin: i64,

    selected: bool,
}

impl ElementWrapper {
    pub fn new(element: ElementRef, song: &Song) -> Self {
        let time_range = song.time_range(element);
        let pitch = song.pitch(element);
        Self {
            element,
            time_range,
            pitch,
            interact_time_range: time_range,
            interact_pitch: pitch,
            interact_kind: InteractKind::empty(),
            regions: SmallVec::new(),
            visual_margin: 0,
            selected: false,
        }
    }

    pub fn with_region(mut self, rect: Rect, kind: InteractKind) -> Self {
        self.regions.push(HitRegion { rect, kind });
        self.interact_kind |= kind;
        self
    }
    pub fn with_visual_margin(mut self, visual_margin: i64) -> Self {
        self.visual_margin = visual_margin;
        self
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }
    pub fn time_range(&self) -> Range {
        self.time_range
    }
    pub fn pitch(&self) -> Option<i32> {
        self.pitch
    }
    pub fn interact_time_range(&self) -> Range {
        self.interact_time_range
    }
    pub fn interact_pitch(&self) -> Option<i32> {
        self.interact_pitch
    }
    pub fn interact_kind(&self) -> InteractKind {
        self.interact_kind
    }
    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }
    pub fn is_selected(&self) -> bool {
        self.selected
    }
    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_compatible_with(&self, kind: InteractKind) -> bool {
        self.interact_kind.intersects(kind)
    }

    /// Ticks to repaint for this element drawn with `delta` applied.
    pub fn dirty_range(&self, action: InteractKind, delta: i64) -> Range {
        displaced(self.time_range, action, delta).expand(self.visual_margin)
    }

    /// Topmost region under `pos`, which is relative to the top of the element's track.
    pub fn hit(&self, pos: Pos2) -> Option<HitRegion> {
        self.regions
            .iter()
            .rev()
            .find(|region| region.rect.contains(pos))
            .copied()
    }

    /// Updates the working copies to show the element displaced by a drag.
    pub fn set_displacement(&mut self, action: InteractKind, delta_time: i64, delta_pitch: i32) {
        self.interact_time_range = displaced(self.time_range, action, delta_time);
        self.interact_pitch = if action.contains(InteractKind::MOVE_PITCH) {
            self.pitch.map(|pitch| pitch + delta_pitch)
        } else {
            self.pitch
        };
    }
    pub fn reset_displacement(&mut self) {
        self.interact_time_range = self.time_range;
        self.interact_pitch = self.pitch;
    }

    /// Writes the working copies back into the song. Returns whether anything changed.
    pub fn modify(&self, song: &mut Song, tracker: &mut CommandTracker) -> bool {
        let mut modified = false;

        let pitch_offset = match (self.pitch, self.interact_pitch) {
            (Some(pitch), Some(interact_pitch)) => interact_pitch - pitch,
            _ => 0,
        };
        if self.interact_time_range.start != self.time_range.start || pitch_offset != 0 {
            tracker.execute(
                song,
                ElementMove::new(
                    self.element,
                    self.time_range.start,
                    self.interact_time_range.start,
                    pitch_offset,
                ),
            );
            modified = true;
        }
        if self.interact_time_range.length() != self.time_range.length() {
            tracker.execute(
                song,
                ElementStretch::new(
                    self.element,
                    self.time_range.length(),
                    self.interact_time_range.length(),
                ),
            );
            modified = true;
        }

        modified
    }
}

fn displaced(range: Range, action: InteractKind, delta: i64) -> Range {
    if action.contains(InteractKind::MOVE_TIME) {
        range + delta
    } else if action.contains(InteractKind::STRETCH_TIME) {
        Range::new(range.start, range.end + delta)
    } else {
        range
    }
}
