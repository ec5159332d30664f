use anyhow::{Result, bail, ensure};

use crate::{Chord, ElementRef, Idx, KeyChange, MeterChange, Note, Range, Scale, Sequence};

/// Anything placed at a tick. All of the song's sequences are kept sorted by this.
pub trait Timed {
    fn tick(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Song {
    pub last_tick: i64,

    pub notes: Vec<Note>,
    pub chords: Vec<Chord>,
    // both of these always start with an entry at tick 0
    pub key_changes: Vec<KeyChange>,
    pub meter_changes: Vec<MeterChange>,

    /// Ticks at which a new section starts. Sorted, strictly inside `0..last_tick`.
    pub section_breaks: Vec<i64>,
}

impl Song {
    /// Longest song the editor accepts, 1024 whole notes.
    pub const MAX_VALID_LENGTH: i64 = Range::TICKS_PER_WHOLE_NOTE * 1024;

    /// An empty song in C major and 4/4.
    pub fn new(last_tick: i64) -> Self {
        Self {
            last_tick,
            notes: Vec::new(),
            chords: Vec::new(),
            key_changes: vec![KeyChange::new(0, Scale::major(), 60)],
            meter_changes: vec![MeterChange::new(0, 4, 4)],
            section_breaks: Vec::new(),
        }
    }

    pub fn length(&self) -> i64 {
        self.last_tick
    }

    pub fn section_count(&self) -> usize {
        self.section_breaks.len() + 1
    }

    pub fn section_tick_range(&self, section: usize) -> Range {
        assert!(
            section < self.section_count(),
            "section {section} out of bounds ({} sections)",
            self.section_count()
        );
        let start = match section {
            0 => 0,
            _ => self.section_breaks[section - 1],
        };
        let end = self
            .section_breaks
            .get(section)
            .copied()
            .unwrap_or(self.last_tick);
        Range::new(start, end)
    }

    /// The key change in effect at `tick`.
    pub fn key_change_at(&self, tick: i64) -> Idx<KeyChange> {
        Idx::new(in_effect_at(&self.key_changes, tick))
    }
    /// The meter change in effect at `tick`.
    pub fn meter_change_at(&self, tick: i64) -> Idx<MeterChange> {
        Idx::new(in_effect_at(&self.meter_changes, tick))
    }

    pub fn note(&self, idx: Idx<Note>) -> &Note {
        self.notes
            .get(idx.get())
            .unwrap_or_else(|| panic!("Nonexistent note: {idx:?}"))
    }
    pub fn chord(&self, idx: Idx<Chord>) -> &Chord {
        self.chords
            .get(idx.get())
            .unwrap_or_else(|| panic!("Nonexistent chord: {idx:?}"))
    }
    pub fn key_change(&self, idx: Idx<KeyChange>) -> &KeyChange {
        self.key_changes
            .get(idx.get())
            .unwrap_or_else(|| panic!("Nonexistent key change: {idx:?}"))
    }
    pub fn meter_change(&self, idx: Idx<MeterChange>) -> &MeterChange {
        self.meter_changes
            .get(idx.get())
            .unwrap_or_else(|| panic!("Nonexistent meter change: {idx:?}"))
    }

    pub fn sequence_len(&self, sequence: Sequence) -> usize {
        match sequence {
            Sequence::Notes => self.notes.len(),
            Sequence::Chords => self.chords.len(),
            Sequence::KeyChanges => self.key_changes.len(),
            Sequence::MeterChanges => self.meter_changes.len(),
        }
    }

    /// Time covered by an element. Key and meter changes are instantaneous.
    pub fn time_range(&self, element: ElementRef) -> Range {
        match element {
            ElementRef::Note(idx) => self.note(idx).range(),
            ElementRef::Chord(idx) => self.chord(idx).range(),
            ElementRef::KeyChange(idx) => Range::at(self.key_change(idx).tick),
            ElementRef::MeterChange(idx) => Range::at(self.meter_change(idx).tick),
        }
    }

    /// Pitch of an element that can be moved vertically.
    pub fn pitch(&self, element: ElementRef) -> Option<i32> {
        match element {
            ElementRef::Note(idx) => Some(self.note(idx).pitch),
            _ => None,
        }
    }

    /// Moves an element to `tick` and transposes it by `pitch_offset`. Elements without a pitch
    /// ignore the offset.
    pub fn move_element(&mut self, element: ElementRef, tick: i64, pitch_offset: i32) {
        match element {
            ElementRef::Note(idx) => {
                let note = force_get_mut(&mut self.notes, idx.get(), "note");
                note.tick = tick;
                note.pitch += pitch_offset;
            }
            ElementRef::Chord(idx) => force_get_mut(&mut self.chords, idx.get(), "chord").tick = tick,
            ElementRef::KeyChange(idx) => {
                force_get_mut(&mut self.key_changes, idx.get(), "key change").tick = tick
            }
            ElementRef::MeterChange(idx) => {
                force_get_mut(&mut self.meter_changes, idx.get(), "meter change").tick = tick
            }
        }
    }

    /// Sets the duration of a note or chord. Returns the old duration, or `None` if the element
    /// has no duration.
    pub fn set_duration(&mut self, element: ElementRef, duration: i64) -> Option<i64> {
        let slot = match element {
            ElementRef::Note(idx) => &mut force_get_mut(&mut self.notes, idx.get(), "note").duration,
            ElementRef::Chord(idx) => {
                &mut force_get_mut(&mut self.chords, idx.get(), "chord").duration
            }
            ElementRef::KeyChange(_) | ElementRef::MeterChange(_) => {
                tracing::warn!("tried to set the duration of {element:?}");
                return None;
            }
        };
        Some(std::mem::replace(slot, duration))
    }

    /// The permutation that would sort `sequence` by tick. Equal ticks keep their relative order,
    /// so a tick-0 sentinel stays first.
    pub fn tick_order(&self, sequence: Sequence) -> Vec<usize> {
        match sequence {
            Sequence::Notes => tick_order(&self.notes),
            Sequence::Chords => tick_order(&self.chords),
            Sequence::KeyChanges => tick_order(&self.key_changes),
            Sequence::MeterChanges => tick_order(&self.meter_changes),
        }
    }

    /// Rearranges `sequence` so that the element previously at `order[i]` ends up at `i`.
    pub fn reorder(&mut self, sequence: Sequence, order: &[usize]) {
        match sequence {
            Sequence::Notes => permute(&mut self.notes, order),
            Sequence::Chords => permute(&mut self.chords, order),
            Sequence::KeyChanges => permute(&mut self.key_changes, order),
            Sequence::MeterChanges => permute(&mut self.meter_changes, order),
        }
    }

    /// Checks the invariants the layout scan depends on.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0..=Self::MAX_VALID_LENGTH).contains(&self.last_tick),
            "song length {} is outside of 0..={}",
            self.last_tick,
            Self::MAX_VALID_LENGTH
        );

        check_sorted("notes", &self.notes)?;
        check_sorted("chords", &self.chords)?;
        check_sorted("key changes", &self.key_changes)?;
        check_sorted("meter changes", &self.meter_changes)?;

        if self.key_changes.first().map(Timed::tick) != Some(0) {
            bail!("key changes must start with an entry at tick 0");
        }
        if self.meter_changes.first().map(Timed::tick) != Some(0) {
            bail!("meter changes must start with an entry at tick 0");
        }

        for (i, note) in self.notes.iter().enumerate() {
            ensure!(note.duration >= 0, "note {i} has negative duration {}", note.duration);
        }
        for (i, chord) in self.chords.iter().enumerate() {
            ensure!(chord.duration >= 0, "chord {i} has negative duration {}", chord.duration);
        }
        for (i, key_change) in self.key_changes.iter().enumerate() {
            ensure!(
                key_change.scale.degrees.first() == Some(&0),
                "key change {i} has a scale that doesn't start on the tonic"
            );
        }

        let mut prev = 0;
        for &section_break in &self.section_breaks {
            ensure!(
                section_break > prev && section_break < self.last_tick,
                "section break at {section_break} is out of order or outside of the song"
            );
            prev = section_break;
        }

        Ok(())
    }
}

fn in_effect_at<T: Timed>(changes: &[T], tick: i64) -> usize {
    changes
        .partition_point(|change| change.tick() <= tick)
        .saturating_sub(1)
}

fn force_get_mut<'a, T>(items: &'a mut [T], index: usize, what: &str) -> &'a mut T {
    let len = items.len();
    items
        .get_mut(index)
        .unwrap_or_else(|| panic!("Nonexistent {what}: {index} (len {len})"))
}

fn check_sorted<T: Timed>(name: &str, items: &[T]) -> Result<()> {
    // TODO change to array_windows when it's stabilized
    for (i, pair) in items.windows(2).enumerate() {
        ensure!(
            pair[0].tick() <= pair[1].tick(),
            "{name} are not sorted: entry {} at tick {} comes after tick {}",
            i + 1,
            pair[1].tick(),
            pair[0].tick()
        );
    }
    Ok(())
}

fn tick_order<T: Timed>(items: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| items[i].tick());
    order
}

fn permute<T>(items: &mut Vec<T>, order: &[usize]) {
    assert_eq!(
        items.len(),
        order.len(),
        "permutation length doesn't match sequence length"
    );
    let mut old: Vec<Option<T>> = std::mem::take(items).into_iter().map(Some).collect();
    *items = order
        .iter()
        .map(|&i| {
            old[i]
                .take()
                .unwrap_or_else(|| panic!("index {i} appears twice in permutation"))
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::Song;
    use crate::{ElementRef, Idx, KeyChange, MeterChange, Note, Range, Scale, Sequence};

    fn song_with_sections() -> Song {
        let mut song = Song::new(3840);
        song.section_breaks = vec![960, 2880];
        song
    }

    #[test]
    fn test_section_tick_range() {
        let song = song_with_sections();
        assert_eq!(song.section_count(), 3);
        assert_eq!(song.section_tick_range(0), Range::new(0, 960));
        assert_eq!(song.section_tick_range(1), Range::new(960, 2880));
        assert_eq!(song.section_tick_range(2), Range::new(2880, 3840));

        let single = Song::new(1000);
        assert_eq!(single.section_tick_range(0), Range::new(0, 1000));
    }

    #[test]
    fn test_change_in_effect() {
        let mut song = Song::new(1920);
        song.key_changes.push(KeyChange::new(960, Scale::natural_minor(), 57));
        assert_eq!(song.key_change_at(0), Idx::new(0));
        assert_eq!(song.key_change_at(959), Idx::new(0));
        assert_eq!(song.key_change_at(960), Idx::new(1));
        assert_eq!(song.key_change_at(5000), Idx::new(1));
        assert_eq!(song.meter_change_at(1500), Idx::new(0));
    }

    #[test]
    fn test_validate() {
        assert!(Song::new(1920).validate().is_ok());

        let mut unsorted = Song::new(1920);
        unsorted.notes = vec![Note::new(480, 10, 60), Note::new(0, 10, 60)];
        assert!(unsorted.validate().is_err());

        let mut no_sentinel = Song::new(1920);
        no_sentinel.key_changes[0].tick = 10;
        let err = no_sentinel.validate().unwrap_err();
        assert!(err.to_string().contains("tick 0"), "{err}");

        let mut no_meter = Song::new(1920);
        no_meter.meter_changes.clear();
        assert!(no_meter.validate().is_err());

        let mut bad_break = Song::new(1920);
        bad_break.section_breaks = vec![960, 480];
        assert!(bad_break.validate().is_err());

        let mut negative = Song::new(1920);
        negative.notes.push(Note::new(0, -5, 60));
        assert!(negative.validate().is_err());

        assert!(Song::new(Song::MAX_VALID_LENGTH + 1).validate().is_err());
    }

    #[test]
    fn test_reorder_keeps_sentinel_first() {
        let mut song = Song::new(1920);
        song.meter_changes.push(MeterChange::new(960, 3, 4));
        song.meter_changes.push(MeterChange::new(1440, 6, 8));

        // drag the 3/4 change onto tick 0
        song.move_element(ElementRef::MeterChange(Idx::new(1)), 0, 0);
        song.move_element(ElementRef::MeterChange(Idx::new(2)), 480, 0);

        let order = song.tick_order(Sequence::MeterChanges);
        assert_eq!(order, vec![0, 1, 2]);

        song.move_element(ElementRef::MeterChange(Idx::new(1)), 1000, 0);
        let order = song.tick_order(Sequence::MeterChanges);
        assert_eq!(order, vec![0, 2, 1]);
        song.reorder(Sequence::MeterChanges, &order);
        assert_eq!(
            song.meter_changes.iter().map(|m| m.numerator).collect::<Vec<_>>(),
            vec![4, 6, 3]
        );
        assert!(song.validate().is_ok());
    }

    #[test]
    fn test_set_duration() {
        let mut song = Song::new(1920);
        song.notes.push(Note::new(0, 240, 60));
        assert_eq!(song.set_duration(ElementRef::Note(Idx::new(0)), 480), Some(240));
        assert_eq!(song.notes[0].duration, 480);
        assert_eq!(song.set_duration(ElementRef::KeyChange(Idx::new(0)), 480), None);
    }
}
