use std::ops;

/// A half-open span of ticks, `start..end`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub const TICKS_PER_WHOLE_NOTE: i64 = 960;

    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
    pub fn from_start_length(start: i64, length: i64) -> Self {
        Self {
            start,
            end: start.checked_add(length).expect("start + length overflows i64"),
        }
    }
    pub const fn at(pos: i64) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, pos: i64) -> bool {
        pos >= self.start && pos < self.end
    }

    pub fn intersects(&self, other: Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// The smallest range covering both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
    /// Grows the range by `amount` on both sides.
    pub fn expand(&self, amount: i64) -> Self {
        Self {
            start: self.start - amount,
            end: self.end + amount,
        }
    }
}

impl ops::Add<i64> for Range {
    type Output = Self;
    fn add(self, rhs: i64) -> Self::Output {
        Self {
            start: self.start + rhs,
            end: self.end + rhs,
        }
    }
}

/// Rounds `value` to the nearest multiple of `grid`. Halfway values round up.
pub fn snap(value: i64, grid: i64) -> i64 {
    if grid <= 1 {
        return value;
    }
    (value + grid / 2).div_euclid(grid) * grid
}
