use crate::{Range, Timed};

/// Lowest pitch a note may be dragged to.
pub const MIN_VALID_MIDI_PITCH: i32 = 3 * 12;
/// Notes stay strictly below this pitch.
pub const MAX_VALID_MIDI_PITCH: i32 = 8 * 12 - 1;

#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pub tick: i64,
    pub duration: i64,
    // MIDI pitch, middle C == 60
    pub pitch: i32,
}

impl Note {
    pub fn new(tick: i64, duration: i64, pitch: i32) -> Self {
        Self {
            tick,
            duration,
            pitch,
        }
    }

    pub fn range(&self) -> Range {
        Range::from_start_length(self.tick, self.duration)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chord {
    pub tick: i64,
    pub duration: i64,
    pub root_pitch: i32,
    /// Index into the host's chord kind table (major, minor, dominant seventh, ...).
    pub kind: u32,
}

impl Chord {
    pub fn new(tick: i64, duration: i64, root_pitch: i32, kind: u32) -> Self {
        Self {
            tick,
            duration,
            root_pitch,
            kind,
        }
    }

    pub fn range(&self) -> Range {
        Range::from_start_length(self.tick, self.duration)
    }
}

impl Timed for Note {
    fn tick(&self) -> i64 {
        self.tick
    }
}
impl Timed for Chord {
    fn tick(&self) -> i64 {
        self.tick
    }
}
