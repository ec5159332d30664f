use egui::{Rect, pos2};
use staffroll_lib::{Idx, KeyChange, MeterChange, Note, PitchRows, Range, Song};

use crate::LayoutMetrics;

/// Staff rows every section shows even when its notes don't reach them.
const DEFAULT_LOWEST_ROW: i32 = 7 * 5;
const DEFAULT_HIGHEST_ROW: i32 = 7 * 6;

/// Part of a section with constant key and meter.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRegion {
    pub section: usize,
    pub tick: i64,
    pub duration: i64,
    pub key: Idx<KeyChange>,
    pub meter: Idx<MeterChange>,
    /// Whether the key change starts exactly here and needs a label.
    pub show_key_change: bool,
    pub show_meter_change: bool,
    /// Notes overlapping the region, in song order.
    pub notes: Vec<Idx<Note>>,
    /// Row span of the whole section, shared by all of its regions.
    pub lowest_note_row: i32,
    pub highest_note_row: i32,
    pub rect: Rect,
}

impl ViewRegion {
    pub fn tick_range(&self) -> Range {
        Range::from_start_length(self.tick, self.duration)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionLayout {
    pub regions: Vec<ViewRegion>,
    /// Total canvas height needed for every section.
    pub height: f32,
}

pub fn layout_regions(
    song: &Song,
    rows: &impl PitchRows,
    zoom: f32,
    metrics: &LayoutMetrics,
) -> RegionLayout {
    let mut layout = RegionLayout::default();
    let mut y = metrics.margin_top;

    for section in 0..song.section_count() {
        let section_range = song.section_tick_range(section);
        let first_region = layout.regions.len();

        let mut lowest_row = DEFAULT_LOWEST_ROW;
        let mut highest_row = DEFAULT_HIGHEST_ROW;

        let mut key = song.key_change_at(section_range.start);
        let mut meter = song.meter_change_at(section_range.start);
        let mut region_start = section_range.start;

        while region_start < section_range.end {
            let next_key_tick = song
                .key_changes
                .get(key.get() + 1)
                .map_or(section_range.end, |change| change.tick.min(section_range.end));
            let next_meter_tick = song
                .meter_changes
                .get(meter.get() + 1)
                .map_or(section_range.end, |change| change.tick.min(section_range.end));
            let region_end = next_key_tick.min(next_meter_tick);

            let key_change = song.key_change(key);
            let region_range = Range::new(region_start, region_end);
            let mut notes = Vec::new();
            for idx in Idx::all(song.notes.len()) {
                let note = song.note(idx);
                // zero-length notes still occupy their starting tick
                let note_range = Range::new(note.tick, note.tick + note.duration.max(1));
                if !note_range.intersects(region_range) {
                    continue;
                }
                let row = rows.row_for_pitch(note.pitch, &key_change.scale, key_change.tonic_pitch);
                lowest_row = lowest_row.min(row.floor() as i32);
                highest_row = highest_row.max(row.ceil() as i32 + 1);
                notes.push(idx);
            }

            let x1 = metrics.margin_left + (region_start - section_range.start) as f32 * zoom;
            let x2 = metrics.margin_left + (region_end - section_range.start) as f32 * zoom;
            layout.regions.push(ViewRegion {
                section,
                tick: region_start,
                duration: region_end - region_start,
                key,
                meter,
                show_key_change: key_change.tick == region_start,
                show_meter_change: song.meter_change(meter).tick == region_start,
                notes,
                lowest_note_row: 0,
                highest_note_row: 0,
                rect: Rect::from_min_max(pos2(x1, y), pos2(x2, y)),
            });

            region_start = region_end;
            // also skips every other change sharing the tick
            key = song.key_change_at(region_end);
            meter = song.meter_change_at(region_end);
        }

        let section_height = metrics.header_height
            + (highest_row - lowest_row) as f32 * metrics.note_height
            + metrics.chord_note_separation
            + metrics.chord_height;

        for region in &mut layout.regions[first_region..] {
            region.lowest_note_row = lowest_row;
            region.highest_note_row = highest_row;
            region.rect.max.y = y + section_height;
        }

        y += section_height + metrics.section_separation;
    }

    layout.height = y;
    tracing::debug!(
        "laid out {} regions in {} sections, {} px tall",
        layout.regions.len(),
        song.section_count(),
        layout.height
    );
    layout
}

/// Pixel box of a note on `row` of `region`, starting at `tick` and lasting `duration` ticks.
pub fn note_position(
    region: &ViewRegion,
    row: f32,
    tick: i64,
    duration: i64,
    zoom: f32,
    metrics: &LayoutMetrics,
) -> Rect {
    let x1 = region.rect.min.x + (tick - region.tick) as f32 * zoom;
    let y1 = region.rect.max.y
        - metrics.chord_height
        - metrics.chord_note_separation
        - (row - region.lowest_note_row as f32 + 1.0) * metrics.note_height;
    Rect::from_min_max(
        pos2(x1, y1),
        pos2(x1 + duration as f32 * zoom, y1 + metrics.note_height),
    )
}

#[cfg(test)]
mod tests {
    use staffroll_lib::{DiatonicRows, Idx, KeyChange, MeterChange, Note, Scale, Song};

    use super::{layout_regions, note_position};
    use crate::LayoutMetrics;

    #[test]
    fn test_regions_split_at_changes_within_sections() {
        let mut song = Song::new(3840);
        song.section_breaks.push(1920);
        song.key_changes
            .push(KeyChange::new(960, Scale::natural_minor(), 57));
        song.key_changes.push(KeyChange::new(2400, Scale::major(), 62));
        song.meter_changes.push(MeterChange::new(2400, 3, 4));
        song.validate().expect("test song is invalid");

        let layout = layout_regions(&song, &DiatonicRows, 0.1, &LayoutMetrics::default());
        let spans: Vec<_> = layout
            .regions
            .iter()
            .map(|region| (region.section, region.tick, region.duration))
            .collect();
        assert_eq!(
            spans,
            vec![(0, 0, 960), (0, 960, 960), (1, 1920, 480), (1, 2400, 1440)]
        );

        // the second section starts in the middle of the minor key
        let region = &layout.regions[2];
        assert_eq!(region.key, Idx::new(1));
        assert!(!region.show_key_change);
        assert!(!region.show_meter_change);

        let region = &layout.regions[3];
        assert_eq!((region.key, region.meter), (Idx::new(2), Idx::new(1)));
        assert!(region.show_key_change && region.show_meter_change);
        // regions restart at the left margin in every section
        assert_eq!(region.rect.min.x, 4.0 + 48.0);
    }

    #[test]
    fn test_rows_and_heights() {
        let mut song = Song::new(1920);
        song.section_breaks.push(960);
        // C4 and G5 in the first section, nothing in the second
        song.notes = vec![Note::new(0, 240, 60), Note::new(480, 240, 79)];

        let metrics = LayoutMetrics::default();
        let layout = layout_regions(&song, &DiatonicRows, 0.1, &metrics);
        assert_eq!(layout.regions.len(), 2);

        let first = &layout.regions[0];
        assert_eq!(first.notes, vec![Idx::new(0), Idx::new(1)]);
        // G5 sits on row 46
        assert_eq!((first.lowest_note_row, first.highest_note_row), (35, 47));

        let second = &layout.regions[1];
        assert!(second.notes.is_empty());
        assert_eq!((second.lowest_note_row, second.highest_note_row), (35, 42));

        let first_height = 40.0 + 12.0 * 12.0 + 10.0 + 60.0;
        let second_height = 40.0 + 7.0 * 12.0 + 10.0 + 60.0;
        assert_eq!(first.rect.min.y, 4.0);
        assert_eq!(first.rect.height(), first_height);
        assert_eq!(second.rect.min.y, 4.0 + first_height + 20.0);
        assert_eq!(
            layout.height,
            4.0 + first_height + 20.0 + second_height + 20.0
        );
    }

    #[test]
    fn test_rows_accumulate_across_regions() {
        let mut song = Song::new(1920);
        song.key_changes.push(KeyChange::new(960, Scale::major(), 62));
        song.notes = vec![Note::new(0, 100, 48), Note::new(1000, 100, 84)];

        let layout = layout_regions(&song, &DiatonicRows, 0.1, &LayoutMetrics::default());
        assert_eq!(layout.regions.len(), 2);
        for region in &layout.regions {
            assert_eq!(region.notes.len(), 1);
            assert_eq!(region.lowest_note_row, layout.regions[0].lowest_note_row);
            assert_eq!(region.highest_note_row, layout.regions[0].highest_note_row);
        }
        assert_eq!(layout.regions[0].lowest_note_row, 28);
        assert!(layout.regions[0].highest_note_row > 42);
    }

    #[test]
    fn test_note_position() {
        let mut song = Song::new(960);
        song.notes.push(Note::new(240, 240, 60));
        let metrics = LayoutMetrics::default();
        let layout = layout_regions(&song, &DiatonicRows, 0.1, &metrics);
        let region = &layout.regions[0];

        let rect = note_position(region, 35.0, 240, 240, 0.1, &metrics);
        assert_eq!(rect.min.x, region.rect.min.x + 24.0);
        assert_eq!(rect.width(), 24.0);
        assert_eq!(rect.height(), metrics.note_height);
        // the lowest row sits right above the chord lane
        assert_eq!(
            rect.max.y,
            region.rect.max.y - metrics.chord_height - metrics.chord_note_separation
        );

        let higher = note_position(region, 36.0, 240, 240, 0.1, &metrics);
        assert_eq!(higher.min.y, rect.min.y - metrics.note_height);
    }

    #[test]
    fn test_empty_song_has_no_regions() {
        let song = Song::new(0);
        let layout = layout_regions(&song, &DiatonicRows, 0.1, &LayoutMetrics::default());
        assert!(layout.regions.is_empty());
        assert!(layout.height > 0.0);
    }
}
