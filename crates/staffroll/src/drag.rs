use egui::{Pos2, Vec2};
use staffroll_lib::{MAX_VALID_MIDI_PITCH, MIN_VALID_MIDI_PITCH, Range, snap};

use crate::{element::InteractKind, selection::ElementKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    /// Dragging the selected elements through a region with these capabilities.
    Elements(InteractKind),
    /// Dragging the background of a track (or of no track at all).
    Scroll { track: Option<usize> },
}

/// What a press turns into if it's released without moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Select only this element.
    SelectOnly(ElementKey),
    /// Flip the selectedness of this element, leaving everything else alone.
    Toggle(ElementKey),
}

#[derive(Debug, Clone)]
pub struct DraggedData {
    action: DragAction,

    raw_start_pos: Pos2,
    raw_current_pos: Pos2,

    pub delta_time: i64,
    pub delta_pitch: i32,
    pub scroll_y: f32,

    click: Option<ClickAction>,
}

impl DraggedData {
    pub fn action(&self) -> DragAction {
        self.action
    }
    pub fn raw_movement(&self) -> Vec2 {
        self.raw_current_pos - self.raw_start_pos
    }
    pub fn has_moved(&self) -> bool {
        self.raw_current_pos != self.raw_start_pos
    }
    /// The click action, if the pointer never moved.
    pub fn click(&self) -> Option<ClickAction> {
        if self.has_moved() { None } else { self.click }
    }
}

/// Tracks the gesture between pointer down and pointer up. At most one gesture is active.
#[derive(Debug, Default)]
pub struct DragHandler {
    dragged_data: Option<DraggedData>,
}

impl DragHandler {
    pub fn new() -> Self {
        Self { dragged_data: None }
    }

    pub fn is_something_being_dragged(&self) -> bool {
        self.dragged_data.is_some()
    }
    pub fn dragged_data(&self) -> Option<&DraggedData> {
        self.dragged_data.as_ref()
    }
    pub fn dragged_data_mut(&mut self) -> Option<&mut DraggedData> {
        self.dragged_data.as_mut()
    }

    pub fn start(&mut self, action: DragAction, pos: Pos2, click: Option<ClickAction>) {
        if self.dragged_data.is_some() {
            tracing::warn!("drag started while another one was active");
        }
        self.dragged_data = Some(DraggedData {
            action,
            raw_start_pos: pos,
            raw_current_pos: pos,
            delta_time: 0,
            delta_pitch: 0,
            scroll_y: 0.0,
            click,
        });
    }

    /// Moves the pointer and returns the total raw movement since the drag started.
    pub fn update(&mut self, pos: Pos2) -> Option<Vec2> {
        let data = self.dragged_data.as_mut()?;
        data.raw_current_pos = pos;
        Some(data.raw_movement())
    }

    pub fn finish(&mut self) -> Option<DraggedData> {
        self.dragged_data.take()
    }
}

/// Clamps a time drag so `range` (the merged range of everything being dragged) stays inside
/// `[0, length]`, then snaps it. A snapped value that leaves the bounds is clamped again.
pub fn clamp_time_delta(raw: i64, range: Range, length: i64, grid: i64) -> i64 {
    clamp_snapped(raw, -range.start, length - range.end, grid)
}

/// Clamps a stretch so every range keeps at least `grid` ticks (or its current duration, if
/// shorter) and ends no later than `length`.
pub fn clamp_stretch_delta(
    raw: i64,
    ranges: impl IntoIterator<Item = Range>,
    length: i64,
    grid: i64,
) -> i64 {
    let mut min = i64::MIN;
    let mut max = i64::MAX;
    for range in ranges {
        let duration = range.length();
        min = min.max(duration.min(grid) - duration);
        max = max.min(length - range.end);
    }
    if min == i64::MIN {
        return 0;
    }
    clamp_snapped(raw, min, max, grid)
}

/// Clamps a pitch drag so both `lowest` and `highest` stay playable.
pub fn clamp_pitch_delta(raw: i32, lowest: i32, highest: i32) -> i32 {
    let min = MIN_VALID_MIDI_PITCH - lowest;
    let max = MAX_VALID_MIDI_PITCH - 1 - highest;
    if min > max {
        return 0;
    }
    raw.clamp(min, max)
}

fn clamp_snapped(raw: i64, min: i64, max: i64, grid: i64) -> i64 {
    if min > max {
        return 0;
    }
    snap(raw.clamp(min, max), grid).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};
    use staffroll_lib::{MAX_VALID_MIDI_PITCH, MIN_VALID_MIDI_PITCH, Range, snap};

    use super::{
        ClickAction, DragAction, DragHandler, clamp_pitch_delta, clamp_stretch_delta,
        clamp_time_delta,
    };
    use crate::{element::InteractKind, selection::ElementKey};

    #[test]
    fn test_scenario_drag_left_past_start() {
        // note [100, 200) dragged by -150 in a 1000 tick song
        assert_eq!(clamp_time_delta(-150, Range::new(100, 200), 1000, 60), -100);
    }

    #[test]
    fn test_time_delta_stays_in_bounds() {
        let length = 1920;
        let ranges = [
            Range::new(0, 240),
            Range::new(100, 200),
            Range::new(1700, 1920),
            Range::new(30, 1900),
            Range::at(960),
        ];
        for range in ranges {
            for raw in (-3000..3000).step_by(37) {
                let delta = clamp_time_delta(raw, range, length, 60);
                assert!(range.start + delta >= 0, "{range:?} {raw}");
                assert!(range.end + delta <= length, "{range:?} {raw}");
            }
        }
    }

    #[test]
    fn test_time_delta_snaps_inside_bounds() {
        let range = Range::new(960, 1200);
        assert_eq!(clamp_time_delta(70, range, 3840, 60), 60);
        assert_eq!(clamp_time_delta(95, range, 3840, 60), 120);
        assert_eq!(clamp_time_delta(-29, range, 3840, 60), 0);
        let delta = clamp_time_delta(-500, range, 3840, 60);
        assert_eq!(delta, snap(delta, 60));
    }

    #[test]
    fn test_pitch_delta_stays_playable() {
        for (lowest, highest) in [(60, 60), (40, 90), (36, 94), (50, 70)] {
            for raw in -100..100 {
                let delta = clamp_pitch_delta(raw, lowest, highest);
                assert!(lowest + delta >= MIN_VALID_MIDI_PITCH);
                assert!(highest + delta <= MAX_VALID_MIDI_PITCH - 1);
            }
        }
        assert_eq!(clamp_pitch_delta(5, 60, 60), 5);
        assert_eq!(clamp_pitch_delta(-30, 60, 60), -24);
    }

    #[test]
    fn test_stretch_delta() {
        let ranges = [Range::new(0, 240), Range::new(480, 510)];
        // the 30 tick note can't shrink at all
        assert_eq!(clamp_stretch_delta(-120, ranges, 1920, 60), 0);
        assert_eq!(clamp_stretch_delta(130, ranges, 1920, 60), 120);
        assert_eq!(clamp_stretch_delta(5000, ranges, 1920, 60), 1410);

        assert_eq!(clamp_stretch_delta(-500, [Range::new(0, 240)], 1920, 60), -180);
        assert_eq!(clamp_stretch_delta(100, std::iter::empty(), 1920, 60), 0);
    }

    #[test]
    fn test_click_only_without_movement() {
        let mut handler = DragHandler::new();
        let key = ElementKey::new(1, 0);
        handler.start(
            DragAction::Elements(InteractKind::MOVE_TIME),
            pos2(10.0, 10.0),
            Some(ClickAction::Toggle(key)),
        );
        assert!(handler.is_something_being_dragged());
        assert_eq!(
            handler.dragged_data().and_then(|data| data.click()),
            Some(ClickAction::Toggle(key))
        );

        assert_eq!(handler.update(pos2(15.0, 8.0)), Some(vec2(5.0, -2.0)));
        let data = handler.finish().expect("drag vanished");
        assert_eq!(data.click(), None);
        assert!(!handler.is_something_being_dragged());
        assert_eq!(handler.update(pos2(0.0, 0.0)), None);
    }
}
