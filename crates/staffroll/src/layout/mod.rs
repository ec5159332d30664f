//! Static geometry of the song: blocks and change markers for the overview strip, and per-section
//! regions for the staff view. Everything here is recomputed from scratch whenever the song changes.

mod blocks;
pub use blocks::{BlockLayout, ChangeRef, ViewBlock, ViewChange, layout_blocks};
mod regions;
pub use regions::{RegionLayout, ViewRegion, layout_regions, note_position};
