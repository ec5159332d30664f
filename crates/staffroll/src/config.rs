use staffroll_lib::Range;

/// Pixel metrics for the block and region layouts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutMetrics {
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,

    /// Space above the note area, for section names and change labels.
    pub header_height: f32,
    pub chord_height: f32,
    pub chord_note_separation: f32,
    pub key_change_bar_width: f32,
    pub meter_change_bar_width: f32,

    /// Height of one staff row in the region layout.
    pub note_height: f32,
    pub section_separation: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            margin_left: 4.0,
            margin_top: 4.0,
            margin_bottom: 4.0,

            header_height: 40.0,
            chord_height: 60.0,
            chord_note_separation: 10.0,
            key_change_bar_width: 10.0,
            meter_change_bar_width: 10.0,

            note_height: 12.0,
            section_separation: 20.0,
        }
    }
}

/// Settings for the interactive timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimelineConfig {
    /// Grid time drags snap to, in ticks.
    pub time_snap: i64,
    pub time_to_pixels: f32,
    /// Height of one pitch in the note track.
    pub note_height: f32,

    /// Ticks added on both sides of every dirty mark to cover stroke widths.
    pub dirty_pad: i64,
    /// Ticks added on both sides of the song when everything is dirty.
    pub dirty_all_margin: i64,

    /// Width of the grab area at the right edge of notes and chords.
    pub stretch_handle_width: f32,
    /// Width of the key and meter change markers in the change track.
    pub change_marker_width: f32,

    pub track_margin: f32,
    pub change_track_height: f32,
    pub chord_track_height: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            time_snap: Range::TICKS_PER_WHOLE_NOTE / 16,
            time_to_pixels: 100.0 / Range::TICKS_PER_WHOLE_NOTE as f32,
            note_height: 12.0,

            dirty_pad: 10,
            dirty_all_margin: 100,

            stretch_handle_width: 6.0,
            change_marker_width: 6.0,

            track_margin: 5.0,
            change_track_height: 32.0,
            chord_track_height: 40.0,
        }
    }
}

impl TimelineConfig {
    pub fn tick_to_x(&self, tick: i64) -> f32 {
        tick as f32 * self.time_to_pixels
    }
    pub fn x_to_tick(&self, x: f32) -> f32 {
        x / self.time_to_pixels
    }
    /// Horizontal pixel span the renderer has to repaint for a dirty tick span.
    pub fn dirty_x_range(&self, dirty: Range) -> egui::Rangef {
        egui::Rangef::new(self.tick_to_x(dirty.start), self.tick_to_x(dirty.end))
    }
}
