use smallvec::{SmallVec, smallvec};

use crate::Timed;

/// A scale, as semitone offsets of each degree from the tonic. The first degree is always 0.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    pub name: String,
    pub degrees: SmallVec<[u8; 12]>,
}

impl Scale {
    pub fn major() -> Self {
        Self {
            name: "Major".into(),
            degrees: smallvec![0, 2, 4, 5, 7, 9, 11],
        }
    }
    pub fn natural_minor() -> Self {
        Self {
            name: "Natural Minor".into(),
            degrees: smallvec![0, 2, 3, 5, 7, 8, 10],
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyChange {
    pub tick: i64,
    pub scale: Scale,
    pub tonic_pitch: i32,
}

impl KeyChange {
    pub fn new(tick: i64, scale: Scale, tonic_pitch: i32) -> Self {
        Self {
            tick,
            scale,
            tonic_pitch,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeterChange {
    pub tick: i64,
    pub numerator: u32,
    pub denominator: u32,
}

impl MeterChange {
    pub fn new(tick: i64, numerator: u32, denominator: u32) -> Self {
        Self {
            tick,
            numerator,
            denominator,
        }
    }
}

impl Timed for KeyChange {
    fn tick(&self) -> i64 {
        self.tick
    }
}
impl Timed for MeterChange {
    fn tick(&self) -> i64 {
        self.tick
    }
}
