use egui::{Rect, pos2};
use staffroll_lib::{Idx, KeyChange, MeterChange, Song};

use crate::LayoutMetrics;

/// A maximal span of ticks with constant key and meter.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBlock {
    pub tick: i64,
    pub duration: i64,
    pub key: Idx<KeyChange>,
    pub meter: Idx<MeterChange>,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeRef {
    Key(Idx<KeyChange>),
    Meter(Idx<MeterChange>),
}

/// Marker bar for a key or meter change. Markers take up horizontal space of their own, between
/// the block before and the block after.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewChange {
    pub change: ChangeRef,
    pub tick: i64,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockLayout {
    pub blocks: Vec<ViewBlock>,
    /// Markers in left-to-right order, key before meter where they share a tick.
    pub changes: Vec<ViewChange>,
}

impl BlockLayout {
    pub fn key_changes(&self) -> impl Iterator<Item = &ViewChange> {
        self.changes
            .iter()
            .filter(|change| matches!(change.change, ChangeRef::Key(_)))
    }
    pub fn meter_changes(&self) -> impl Iterator<Item = &ViewChange> {
        self.changes
            .iter()
            .filter(|change| matches!(change.change, ChangeRef::Meter(_)))
    }
}

/// Scans the song left to right, splitting it into blocks at every key and meter change before
/// `last_tick` and placing a marker at each change. `zoom` is pixels per tick and `height` the
/// canvas height.
pub fn layout_blocks(song: &Song, zoom: f32, height: f32, metrics: &LayoutMetrics) -> BlockLayout {
    let last_tick = song.length();

    let block_y1 = metrics.margin_top + metrics.header_height;
    let block_y2 = height
        - metrics.margin_bottom
        - metrics.chord_height
        - metrics.chord_note_separation;
    let change_y1 = metrics.margin_top;
    let change_y2 = height - metrics.margin_bottom;
    let block_rect = |x1: f32, x2: f32| Rect::from_min_max(pos2(x1, block_y1), pos2(x2, block_y2));

    let mut layout = BlockLayout::default();

    let mut x = metrics.margin_left;
    let mut tick = 0;
    let mut next_key = 0;
    let mut next_meter = 0;
    let mut key = Idx::new(0);
    let mut meter = Idx::new(0);

    let mut block = ViewBlock {
        tick: 0,
        duration: 0,
        key,
        meter,
        rect: block_rect(x, x),
    };

    loop {
        let key_tick = song
            .key_changes
            .get(next_key)
            .map(|change| change.tick)
            .filter(|&t| t < last_tick);
        let meter_tick = song
            .meter_changes
            .get(next_meter)
            .map(|change| change.tick)
            .filter(|&t| t < last_tick);

        let next_change_tick = [key_tick, meter_tick]
            .into_iter()
            .flatten()
            .fold(last_tick, i64::min);

        x += (next_change_tick - tick) as f32 * zoom;
        tick = next_change_tick;
        let block_x2 = x;

        let mut changed = false;
        if key_tick == Some(tick) {
            key = Idx::new(next_key);
            layout.changes.push(ViewChange {
                change: ChangeRef::Key(key),
                tick,
                rect: Rect::from_min_max(
                    pos2(x, change_y1),
                    pos2(x + metrics.key_change_bar_width, change_y2),
                ),
            });
            x += metrics.key_change_bar_width;
            next_key += 1;
            changed = true;
        }
        if meter_tick == Some(tick) {
            meter = Idx::new(next_meter);
            layout.changes.push(ViewChange {
                change: ChangeRef::Meter(meter),
                tick,
                rect: Rect::from_min_max(
                    pos2(x, change_y1),
                    pos2(x + metrics.meter_change_bar_width, change_y2),
                ),
            });
            x += metrics.meter_change_bar_width;
            next_meter += 1;
            changed = true;
        }

        if changed && tick == block.tick {
            // the block hasn't started yet, so the change applies to it directly
            block.key = key;
            block.meter = meter;
            block.rect = block_rect(x, x);
            continue;
        }

        block.duration = tick - block.tick;
        block.rect.max.x = block_x2;
        layout.blocks.push(block);

        if !changed {
            break;
        }
        block = ViewBlock {
            tick,
            duration: 0,
            key,
            meter,
            rect: block_rect(x, x),
        };
    }

    tracing::debug!(
        "laid out {} blocks and {} change markers over {last_tick} ticks",
        layout.blocks.len(),
        layout.changes.len()
    );
    layout
}

#[cfg(test)]
mod tests {
    use staffroll_lib::{Idx, KeyChange, MeterChange, Scale, Song};

    use super::{BlockLayout, ChangeRef, layout_blocks};
    use crate::LayoutMetrics;

    fn layout(song: &Song) -> BlockLayout {
        layout_blocks(song, 0.1, 400.0, &LayoutMetrics::default())
    }

    fn assert_contiguous(song: &Song, layout: &BlockLayout) {
        let mut tick = 0;
        for block in &layout.blocks {
            assert_eq!(block.tick, tick, "{:?}", layout.blocks);
            assert!(block.duration >= 0);
            assert!(block.rect.min.x <= block.rect.max.x);
            tick += block.duration;
        }
        assert_eq!(tick, song.length());
        assert_eq!(
            layout.blocks.iter().map(|block| block.duration).sum::<i64>(),
            song.length()
        );
        for pair in layout.blocks.windows(2) {
            assert!(pair[0].duration > 0, "zero-length block before {:?}", pair[1]);
            assert!(pair[0].rect.max.x <= pair[1].rect.min.x);
        }
    }

    #[test]
    fn test_key_change_splits_song_in_two() {
        let mut song = Song::new(1920);
        song.key_changes
            .push(KeyChange::new(960, Scale::natural_minor(), 57));

        let layout = layout(&song);
        assert_contiguous(&song, &layout);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].duration, 960);
        assert_eq!(layout.blocks[1].duration, 960);
        assert_eq!(layout.blocks[0].key, Idx::new(0));
        assert_eq!(layout.blocks[1].key, Idx::new(1));

        // sentinels at 0 plus the change at 960
        assert_eq!(layout.key_changes().count(), 2);
        assert_eq!(layout.meter_changes().count(), 1);
        let marker = layout.key_changes().nth(1).expect("missing marker");
        assert_eq!(marker.tick, 960);
        assert_eq!(marker.rect.min.x, layout.blocks[0].rect.max.x);
        assert_eq!(marker.rect.max.x, layout.blocks[1].rect.min.x);
    }

    #[test]
    fn test_simultaneous_key_and_meter_change() {
        let mut song = Song::new(960);
        song.key_changes
            .push(KeyChange::new(480, Scale::natural_minor(), 57));
        song.meter_changes.push(MeterChange::new(480, 3, 4));

        let layout = layout(&song);
        assert_contiguous(&song, &layout);
        let spans: Vec<_> = layout
            .blocks
            .iter()
            .map(|block| (block.tick, block.duration))
            .collect();
        assert_eq!(spans, vec![(0, 480), (480, 480)]);
        assert_eq!(layout.blocks[1].key, Idx::new(1));
        assert_eq!(layout.blocks[1].meter, Idx::new(1));

        let at_480: Vec<_> = layout
            .changes
            .iter()
            .filter(|change| change.tick == 480)
            .map(|change| change.change)
            .collect();
        assert_eq!(
            at_480,
            vec![ChangeRef::Key(Idx::new(1)), ChangeRef::Meter(Idx::new(1))]
        );
    }

    #[test]
    fn test_changes_at_tick_zero_make_no_empty_block() {
        let song = Song::new(1920);
        let layout = layout(&song);
        assert_contiguous(&song, &layout);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.changes.len(), 2);

        let metrics = LayoutMetrics::default();
        let expected_x =
            metrics.margin_left + metrics.key_change_bar_width + metrics.meter_change_bar_width;
        assert_eq!(layout.blocks[0].rect.min.x, expected_x);
        assert_eq!(layout.blocks[0].rect.max.x, expected_x + 192.0);
    }

    #[test]
    fn test_changes_at_or_after_end_are_ignored() {
        let mut song = Song::new(960);
        song.meter_changes.push(MeterChange::new(960, 6, 8));
        let layout = layout(&song);
        assert_contiguous(&song, &layout);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.meter_changes().count(), 1);
    }

    #[test]
    fn test_empty_song() {
        let song = Song::new(0);
        let layout = layout(&song);
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].duration, 0);
        assert!(layout.changes.is_empty());
    }

    #[test]
    fn test_many_changes_stay_contiguous() {
        let mut song = Song::new(3840);
        for (i, tick) in [240, 960, 960, 2000, 3000].into_iter().enumerate() {
            song.key_changes
                .push(KeyChange::new(tick, Scale::major(), 60 + i as i32));
        }
        for tick in [100, 960, 2000, 3839] {
            song.meter_changes.push(MeterChange::new(tick, 3, 4));
        }
        song.validate().expect("test song is invalid");

        let layout = layout(&song);
        assert_contiguous(&song, &layout);
        assert_eq!(layout.key_changes().count(), 6);
        assert_eq!(layout.meter_changes().count(), 5);
        // ties emit every change but only one block boundary
        let ticks: Vec<_> = layout.blocks.iter().map(|block| block.tick).collect();
        assert_eq!(ticks, vec![0, 100, 240, 960, 2000, 3000, 3839]);
        // both key changes at 960 are absorbed, the later one wins
        assert_eq!(layout.blocks[3].key, Idx::new(3));
    }
}
