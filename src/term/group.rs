use crate::HpoTermId;

/// A set of [`HpoTermId`]s
///
/// Each term can occur only once in the group. The IDs are kept sorted,
/// so iteration order is deterministic, which the random samplers rely on.
///
/// This group is used e.g. for the parents of a term or the terms
/// annotated to a disease
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TermGroup {
    ids: Vec<HpoTermId>,
}

impl TermGroup {
    /// Constructs a new, empty [`TermGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`TermGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no [`HpoTermId`]s
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of [`HpoTermId`]s in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new [`HpoTermId`] to the group
    ///
    /// Returns whether the `HpoTermId` was newly inserted. That is:
    ///
    /// - If the group did not previously contain this `HpoTermId`, true is returned.
    /// - If the group already contained this `HpoTermId`, false is returned.
    ///
    pub fn insert<I: Into<HpoTermId>>(&mut self, id: I) -> bool {
        let id = id.into();
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the [`HpoTermId`]
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns the [`HpoTermId`] at the given index
    ///
    /// If the index is out of bounds, `None` is returned.
    pub fn get(&self, index: usize) -> Option<&HpoTermId> {
        self.ids.get(index)
    }

    /// Returns an Iterator of the [`HpoTermId`]s inside the group
    pub fn iter(&self) -> TermIds<'_> {
        TermIds::new(self.ids.iter())
    }

    /// Returns the sorted IDs as a slice
    pub fn as_slice(&self) -> &[HpoTermId] {
        &self.ids
    }
}

impl FromIterator<HpoTermId> for TermGroup {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        let mut group = TermGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

impl Extend<HpoTermId> for TermGroup {
    fn extend<T: IntoIterator<Item = HpoTermId>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a TermGroup {
    type Item = HpoTermId;

    type IntoIter = TermIds<'a>;

    fn into_iter(self) -> TermIds<'a> {
        TermIds::new(self.ids.iter())
    }
}

/// An iterator over [`HpoTermId`]s
pub struct TermIds<'a> {
    inner: std::slice::Iter<'a, HpoTermId>,
}

impl<'a> TermIds<'a> {
    fn new(inner: std::slice::Iter<'a, HpoTermId>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for TermIds<'a> {
    type Item = HpoTermId;
    fn next(&mut self) -> Option<HpoTermId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_iter() {
        let mut group = TermGroup::new();
        group.insert(1u32);
        group.insert(2u32);
        group.insert(3u32);

        let mut ids = Vec::new();
        for id in &group {
            ids.push(id)
        }
        assert_eq!(ids.len(), 3);

        for id in &group {
            ids.push(id)
        }
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_insert_keeps_sorted_and_unique() {
        let mut group = TermGroup::new();
        assert!(group.insert(5u32));
        assert!(group.insert(2u32));
        assert!(!group.insert(5u32));
        assert!(group.insert(9u32));

        let expected: Vec<HpoTermId> = vec![2u32.into(), 5u32.into(), 9u32.into()];
        assert_eq!(group.as_slice(), &expected[..]);
        assert!(group.contains(&HpoTermId::from(9u32)));
        assert!(!group.contains(&HpoTermId::from(3u32)));
    }

    #[test]
    fn test_collect() {
        let group: TermGroup = [3u32, 1, 3, 2].into_iter().map(HpoTermId::from).collect();
        assert_eq!(group.len(), 3);
        assert_eq!(group.get(0), Some(&HpoTermId::from(1u32)));
        assert_eq!(group.get(3), None);
    }
}
