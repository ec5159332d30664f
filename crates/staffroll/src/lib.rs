//! Layout and pointer interaction for the staff/timeline editor. Drawing is left to the host: it
//! gets geometry from [`layout`] and element state from [`Timeline`], and repaints the tick span
//! each [`EventOutcome`] reports as dirty.

mod config;
pub use config::{LayoutMetrics, TimelineConfig};
mod dirty;
pub use dirty::DirtyTracker;
pub mod drag;
pub mod element;
pub use element::{ElementWrapper, HitRegion, InteractKind};
mod input;
pub use input::{InputModifiers, PointerEvent};
pub mod layout;
mod selection;
pub use selection::{ElementKey, SelectionManager};
mod timeline;
pub use timeline::{CHANGE_TRACK, CHORD_TRACK, EventOutcome, GestureCommit, NOTE_TRACK, Timeline};
mod track;
pub use track::{Track, TrackKind};
