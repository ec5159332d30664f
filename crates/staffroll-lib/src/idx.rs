use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

// The <T> keeps an Idx<Note> from being used to index the chord list and so on.
// Indices are only meaningful for the song they were taken from and go stale on any structural
// edit.
#[repr(transparent)]
pub struct Idx<T>(usize, PhantomData<fn() -> T>);

impl<T> Idx<T> {
    pub const fn new(index: usize) -> Self {
        Self(index, PhantomData)
    }
    pub const fn get(self) -> usize {
        self.0
    }

    /// Every index into a sequence of length `len`.
    pub fn all(len: usize) -> impl Iterator<Item = Self> {
        (0..len).map(Self::new)
    }
}

impl<T> Debug for Idx<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "Idx::<{short}>({})", self.0)
    }
}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for Idx<T> {}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Idx<T> {}

impl<T> PartialOrd for Idx<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Idx<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}
