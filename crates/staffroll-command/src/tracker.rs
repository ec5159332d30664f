use staffroll_lib::Song;

use crate::SongCommand;

/// The commands making up one user action, in execution order.
#[derive(Default, Debug)]
pub struct CommandTracker(Vec<Box<dyn SongCommand>>);

impl CommandTracker {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    /// Executes `command` against the song and records it.
    pub fn execute(&mut self, song: &mut Song, mut command: impl SongCommand) {
        command.execute(song);
        self.0.push(Box::new(command));
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Undoes every command, newest first.
    pub fn rollback(&mut self, song: &mut Song) {
        tracing::debug!("rolling back {} commands", self.0.len());
        for command in self.0.iter_mut().rev() {
            command.rollback(song);
        }
    }
    /// Redoes every command after a [`rollback`](Self::rollback).
    pub fn execute_all(&mut self, song: &mut Song) {
        for command in &mut self.0 {
            command.execute(song);
        }
    }
}

#[cfg(test)]
mod tests {
    use staffroll_lib::{ElementRef, Idx, Note, Sequence, Song};

    use super::CommandTracker;
    use crate::{element::ElementMove, sequence::SequenceReorder};

    #[test]
    fn test_rollback_move_then_reorder() {
        let mut song = Song::new(1920);
        song.notes = vec![Note::new(0, 100, 60), Note::new(480, 100, 62)];
        let original = song.clone();

        let mut tracker = CommandTracker::new();
        tracker.execute(
            &mut song,
            ElementMove::new(ElementRef::Note(Idx::new(0)), 0, 960, 0),
        );
        let reorder =
            SequenceReorder::sort_by_tick(&song, Sequence::Notes).expect("notes are out of order");
        tracker.execute(&mut song, reorder);
        assert_eq!(tracker.len(), 2);
        assert_eq!(song.notes[1], Note::new(960, 100, 60));

        tracker.rollback(&mut song);
        assert_eq!(song, original);

        tracker.execute_all(&mut song);
        assert_eq!(song.notes[0], Note::new(480, 100, 62));
    }
}
