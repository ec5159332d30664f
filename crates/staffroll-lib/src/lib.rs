mod range;
pub use range::{Range, snap};
mod idx;
pub use idx::Idx;
mod note;
pub use note::{Chord, MAX_VALID_MIDI_PITCH, MIN_VALID_MIDI_PITCH, Note};
mod change;
pub use change::{KeyChange, MeterChange, Scale};
mod element_ref;
pub use element_ref::{ElementRef, Sequence};
mod song;
pub use song::{Song, Timed};
mod theory;
pub use theory::{DiatonicRows, PitchRows};
