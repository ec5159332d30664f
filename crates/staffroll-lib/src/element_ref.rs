use crate::{Chord, Idx, KeyChange, MeterChange, Note};

/// One of the song's ordered sequences.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Sequence {
    Notes,
    Chords,
    KeyChanges,
    MeterChanges,
}

/// Refers to a single object in the song by its position in the owning sequence.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum ElementRef {
    Note(Idx<Note>),
    Chord(Idx<Chord>),
    KeyChange(Idx<KeyChange>),
    MeterChange(Idx<MeterChange>),
}

impl ElementRef {
    pub fn sequence(self) -> Sequence {
        match self {
            Self::Note(_) => Sequence::Notes,
            Self::Chord(_) => Sequence::Chords,
            Self::KeyChange(_) => Sequence::KeyChanges,
            Self::MeterChange(_) => Sequence::MeterChanges,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Note(idx) => idx.get(),
            Self::Chord(idx) => idx.get(),
            Self::KeyChange(idx) => idx.get(),
            Self::MeterChange(idx) => idx.get(),
        }
    }

    /// The same position in another sequence.
    pub fn in_sequence(sequence: Sequence, index: usize) -> Self {
        match sequence {
            Sequence::Notes => Self::Note(Idx::new(index)),
            Sequence::Chords => Self::Chord(Idx::new(index)),
            Sequence::KeyChanges => Self::KeyChange(Idx::new(index)),
            Sequence::MeterChanges => Self::MeterChange(Idx::new(index)),
        }
    }

    pub fn with_index(self, index: usize) -> Self {
        Self::in_sequence(self.sequence(), index)
    }
}
