use staffroll_lib::{ElementRef, Song};

use crate::SongCommand;

#[derive(Debug)]
pub struct ElementMove {
    element: ElementRef,
    starting_tick: i64,
    new_tick: i64,
    pitch_offset: i32,
}

impl ElementMove {
    pub fn new(element: ElementRef, starting_tick: i64, new_tick: i64, pitch_offset: i32) -> Self {
        Self {
            element,
            starting_tick,
            new_tick,
            pitch_offset,
        }
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }
    pub fn tick_offset(&self) -> i64 {
        self.new_tick - self.starting_tick
    }
    pub fn pitch_offset(&self) -> i32 {
        self.pitch_offset
    }
}

impl SongCommand for ElementMove {
    fn execute(&mut self, song: &mut Song) {
        song.move_element(self.element, self.new_tick, self.pitch_offset);
    }
    fn rollback(&mut self, song: &mut Song) {
        song.move_element(self.element, self.starting_tick, -self.pitch_offset);
    }
}

#[derive(Debug)]
pub struct ElementStretch {
    element: ElementRef,
    starting_duration: i64,
    new_duration: i64,
}

impl ElementStretch {
    pub fn new(element: ElementRef, starting_duration: i64, new_duration: i64) -> Self {
        Self {
            element,
            starting_duration,
            new_duration,
        }
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }
}

impl SongCommand for ElementStretch {
    fn execute(&mut self, song: &mut Song) {
        song.set_duration(self.element, self.new_duration);
    }
    fn rollback(&mut self, song: &mut Song) {
        song.set_duration(self.element, self.starting_duration);
    }
}

#[cfg(test)]
mod tests {
    use staffroll_lib::{ElementRef, Idx, Note, Song};

    use super::{ElementMove, ElementStretch};
    use crate::SongCommand;

    #[test]
    fn test_move_and_rollback() {
        let mut song = Song::new(1920);
        song.notes.push(Note::new(480, 240, 64));
        let note = ElementRef::Note(Idx::new(0));

        let mut command = ElementMove::new(note, 480, 960, -2);
        command.execute(&mut song);
        assert_eq!(song.notes[0], Note::new(960, 240, 62));
        assert_eq!(command.tick_offset(), 480);

        command.rollback(&mut song);
        assert_eq!(song.notes[0], Note::new(480, 240, 64));
    }

    #[test]
    fn test_stretch_and_rollback() {
        let mut song = Song::new(1920);
        song.notes.push(Note::new(0, 240, 64));
        let note = ElementRef::Note(Idx::new(0));

        let mut command = ElementStretch::new(note, 240, 600);
        command.execute(&mut song);
        assert_eq!(song.notes[0].duration, 600);
        command.rollback(&mut song);
        assert_eq!(song.notes[0].duration, 240);
    }
}
