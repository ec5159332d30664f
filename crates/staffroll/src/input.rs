use egui::Pos2;

bitflags::bitflags! {
    /// Input modifiers with a semantic meaning rather than a physical key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputModifiers: u8 {
        /// Clicking adds to or toggles the selection instead of replacing it. Bound to
        /// ctrl, or cmd on macOS.
        const EXTEND_SELECTION = 1 << 0;
    }
}

impl InputModifiers {
    pub fn from_egui(modifiers: egui::Modifiers) -> Self {
        let mut this = Self::empty();
        if modifiers.ctrl || modifiers.command {
            this |= Self::EXTEND_SELECTION;
        }
        this
    }
}

/// Pointer input in timeline coordinates: x in pixels from tick 0, y from the top of the first
/// track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        pos: Pos2,
        modifiers: InputModifiers,
    },
    Move {
        pos: Pos2,
    },
    Up {
        pos: Pos2,
    },
    /// The gesture was interrupted (focus loss, escape). Nothing gets committed.
    Cancel,
}

impl PointerEvent {
    pub fn pos(&self) -> Option<Pos2> {
        match *self {
            Self::Down { pos, .. } | Self::Move { pos } | Self::Up { pos } => Some(pos),
            Self::Cancel => None,
        }
    }
}
