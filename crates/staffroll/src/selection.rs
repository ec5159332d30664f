use ahash::{HashSet, HashSetExt};
use staffroll_lib::{ElementRef, Sequence};

use crate::{
    DirtyTracker,
    element::{ElementWrapper, InteractKind},
    track::Track,
};

/// Position of an element wrapper in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey {
    pub track: usize,
    pub index: usize,
}

impl ElementKey {
    pub fn new(track: usize, index: usize) -> Self {
        Self { track, index }
    }
}

pub(crate) fn element(tracks: &[Track], key: ElementKey) -> Option<&ElementWrapper> {
    tracks.get(key.track)?.element(key.index)
}
pub(crate) fn element_mut(tracks: &mut [Track], key: ElementKey) -> Option<&mut ElementWrapper> {
    tracks.get_mut(key.track)?.element_mut(key.index)
}

/// Keeps the selected flags of the element wrappers and the list of selected keys in sync.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Vec<ElementKey>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[ElementKey] {
        &self.selected
    }
    pub fn len(&self) -> usize {
        self.selected.len()
    }
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
    pub fn contains(&self, key: ElementKey) -> bool {
        self.selected.contains(&key)
    }

    pub fn iter<'a>(&'a self, tracks: &'a [Track]) -> impl Iterator<Item = &'a ElementWrapper> {
        self.selected.iter().filter_map(|&key| element(tracks, key))
    }

    pub fn select(&mut self, tracks: &mut [Track], dirty: &mut DirtyTracker, key: ElementKey) {
        let Some(elem) = element_mut(tracks, key) else {
            tracing::warn!("tried to select nonexistent element {key:?}");
            return;
        };
        elem.set_selected(true);
        dirty.mark_dirty(elem.dirty_range(InteractKind::empty(), 0));
        if !self.selected.contains(&key) {
            self.selected.push(key);
        }
    }

    pub fn unselect(&mut self, tracks: &mut [Track], dirty: &mut DirtyTracker, key: ElementKey) {
        if let Some(elem) = element_mut(tracks, key) {
            elem.set_selected(false);
            dirty.mark_dirty(elem.dirty_range(InteractKind::empty(), 0));
        }
        self.selected.retain(|&k| k != key);
    }

    pub fn unselect_all(&mut self, tracks: &mut [Track], dirty: &mut DirtyTracker) {
        for key in std::mem::take(&mut self.selected) {
            if let Some(elem) = element_mut(tracks, key) {
                elem.set_selected(false);
                dirty.mark_dirty(elem.dirty_range(InteractKind::empty(), 0));
            }
        }
    }

    /// Drops every selected element that can't take part in a `kind` gesture.
    pub fn unselect_all_except_compatible(
        &mut self,
        tracks: &mut [Track],
        dirty: &mut DirtyTracker,
        kind: InteractKind,
    ) {
        self.selected.retain(|&key| {
            let Some(elem) = element_mut(tracks, key) else {
                return false;
            };
            if elem.is_compatible_with(kind) {
                return true;
            }
            elem.set_selected(false);
            dirty.mark_dirty(elem.dirty_range(InteractKind::empty(), 0));
            false
        });
    }

    /// Forgets the selection without touching any wrapper, for when the wrappers were rebuilt.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// The song objects behind the current selection.
    pub fn selected_elements(&self, tracks: &[Track]) -> HashSet<ElementRef> {
        self.iter(tracks).map(ElementWrapper::element).collect()
    }

    /// Selects the wrappers of `elements` after the tracks were rebuilt.
    pub fn restore(&mut self, tracks: &mut [Track], elements: &HashSet<ElementRef>) {
        self.selected.clear();
        for (track_index, track) in tracks.iter_mut().enumerate() {
            let mut index = 0;
            while let Some(elem) = track.element_mut(index) {
                if elements.contains(&elem.element()) {
                    elem.set_selected(true);
                    self.selected.push(ElementKey::new(track_index, index));
                }
                index += 1;
            }
        }
    }

    /// Applies `delta` to the working copies of every selected element.
    pub fn set_displacement(
        &self,
        tracks: &mut [Track],
        action: InteractKind,
        delta_time: i64,
        delta_pitch: i32,
    ) {
        for &key in &self.selected {
            if let Some(elem) = element_mut(tracks, key) {
                elem.set_displacement(action, delta_time, delta_pitch);
            }
        }
    }

    pub fn reset_displacement(&self, tracks: &mut [Track]) {
        for &key in &self.selected {
            if let Some(elem) = element_mut(tracks, key) {
                elem.reset_displacement();
            }
        }
    }

    pub fn mark_dirty(
        &self,
        tracks: &[Track],
        dirty: &mut DirtyTracker,
        action: InteractKind,
        delta_time: i64,
    ) {
        for elem in self.iter(tracks) {
            dirty.mark_dirty(elem.dirty_range(action, delta_time));
        }
    }
}

/// Where `element` ended up after the sequence reorders in `remaps`.
pub(crate) fn remap_element(element: ElementRef, remaps: &[(Sequence, Vec<usize>)]) -> ElementRef {
    remaps
        .iter()
        .find(|(sequence, _)| *sequence == element.sequence())
        .and_then(|(_, positions)| positions.get(element.index()))
        .map_or(element, |&index| element.with_index(index))
}

pub(crate) fn remap_elements(
    elements: &HashSet<ElementRef>,
    remaps: &[(Sequence, Vec<usize>)],
) -> HashSet<ElementRef> {
    let mut remapped = HashSet::with_capacity(elements.len());
    for &element in elements {
        remapped.insert(remap_element(element, remaps));
    }
    remapped
}
