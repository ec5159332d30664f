//! Song modifications as undoable commands. Separate from `staffroll-lib` because the song model
//! doesn't need to know about undo.

use staffroll_lib::Song;

pub mod element;
pub mod sequence;
mod tracker;
pub use tracker::CommandTracker;

pub trait SongCommand: 'static + Send + std::fmt::Debug {
    fn execute(&mut self, song: &mut Song);
    fn rollback(&mut self, song: &mut Song);
}
