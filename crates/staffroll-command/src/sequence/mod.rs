use staffroll_lib::{Sequence, Song};

use crate::SongCommand;

/// Puts a sequence back into tick order after its elements were moved around.
#[derive(Debug)]
pub struct SequenceReorder {
    sequence: Sequence,
    order: Vec<usize>,
}

impl SequenceReorder {
    /// Returns `None` if the sequence is already in tick order.
    pub fn sort_by_tick(song: &Song, sequence: Sequence) -> Option<Self> {
        let order = song.tick_order(sequence);
        let is_identity = order.iter().enumerate().all(|(i, &j)| i == j);
        (!is_identity).then_some(Self { sequence, order })
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }
    /// Where each element ends up, indexed by its position before the reorder.
    pub fn new_positions(&self) -> Vec<usize> {
        let mut inverse = vec![0; self.order.len()];
        for (new, &old) in self.order.iter().enumerate() {
            inverse[old] = new;
        }
        inverse
    }
}

impl SongCommand for SequenceReorder {
    fn execute(&mut self, song: &mut Song) {
        song.reorder(self.sequence, &self.order);
    }
    fn rollback(&mut self, song: &mut Song) {
        song.reorder(self.sequence, &self.new_positions());
    }
}
