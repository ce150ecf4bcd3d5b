use crate::{
    QproxError,
    base::{Representation, RepresentationKind},
};
use chrono::{DateTime, Utc};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records where a stored representation came from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Provenance {
    /// The representation the [`Pdf`](`crate::base::Pdf`) was constructed from.
    Seed,

    /// Derived from another representation.
    Derived {
        /// The representation the derivation was computed from.
        from: RepresentationKind,
    },
}

/// A single entry of a [`RepresentationStore`].
#[derive(Clone, Debug)]
pub struct StoreEntry<T> {
    /// Creation time of the entry.
    pub created: DateTime<Utc>,

    /// The origin of the representation.
    pub provenance: Provenance,

    /// The stored representation.
    pub representation: Representation<T>,

    /// Store revision at insertion, strictly increasing over the lifetime of the store.
    pub revision: u64,
}

/// Holds at most one representation per [`RepresentationKind`].
///
/// The seed entry can never be replaced, any other kind is overwritten when recomputed.
#[derive(Clone, Debug)]
pub struct RepresentationStore<T> {
    entries: BTreeMap<RepresentationKind, StoreEntry<T>>,
    last_used: Option<RepresentationKind>,
    revision: u64,
    seed: RepresentationKind,
}

impl<T> RepresentationStore<T> {
    /// Returns true if a representation of the given `kind` is stored.
    pub fn contains(&self, kind: RepresentationKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Returns the entry for the given `kind`.
    pub fn get(&self, kind: RepresentationKind) -> Option<&StoreEntry<T>> {
        self.entries.get(&kind)
    }

    /// Inserts a derived representation, replacing a previous entry of the same kind.
    pub fn insert(
        &mut self,
        representation: Representation<T>,
        from: RepresentationKind,
    ) -> Result<&StoreEntry<T>, QproxError> {
        let kind = representation.kind();

        if kind == self.seed {
            return Err(QproxError::UnsupportedRepresentation {
                operation: "RepresentationStore::insert",
                kind,
                msg: "the seed representation cannot be replaced",
            });
        }

        self.revision += 1;

        trace!(
            "store: inserting {:?} derived from {:?} (revision {})",
            kind, from, self.revision
        );

        self.entries.insert(
            kind,
            StoreEntry {
                created: Utc::now(),
                provenance: Provenance::Derived { from },
                representation,
                revision: self.revision,
            },
        );

        Ok(&self.entries[&kind])
    }

    /// Iterate over all stored kinds in order.
    pub fn kinds(&self) -> impl Iterator<Item = RepresentationKind> + '_ {
        self.entries.keys().copied()
    }

    /// Returns the most recently used kind.
    pub fn last_used(&self) -> Option<RepresentationKind> {
        self.last_used
    }

    /// Returns the number of stored representations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty, which never holds after construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks `kind` as the most recently used kind.
    pub fn mark_used(&mut self, kind: RepresentationKind) {
        self.last_used = Some(kind);
    }

    /// Create a new [`RepresentationStore`] holding the `seed` representation.
    pub fn new(seed: Representation<T>) -> Self {
        let kind = seed.kind();

        let mut entries = BTreeMap::new();

        entries.insert(
            kind,
            StoreEntry {
                created: Utc::now(),
                provenance: Provenance::Seed,
                representation: seed,
                revision: 0,
            },
        );

        Self {
            entries,
            last_used: None,
            revision: 0,
            seed: kind,
        }
    }

    /// Returns the stored representation of the given `kind`.
    pub fn representation(&self, kind: RepresentationKind) -> Option<&Representation<T>> {
        self.entries.get(&kind).map(|entry| &entry.representation)
    }

    /// Returns the seed kind.
    pub fn seed(&self) -> RepresentationKind {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{Histogram, Quantiles, Samples};

    #[test]
    fn test_store() {
        let seed = Samples::new(vec![0.0f64, 1.0]).unwrap();
        let mut store = RepresentationStore::new(Representation::Samples(seed));

        assert_eq!(store.seed(), RepresentationKind::Samples);
        assert_eq!(store.get(RepresentationKind::Samples).unwrap().provenance, Provenance::Seed);
        assert!(store.last_used().is_none());

        let quantiles = Quantiles::new(vec![0.5], vec![0.5]).unwrap();

        let revision = store
            .insert(Representation::Quantiles(quantiles.clone()), RepresentationKind::Samples)
            .unwrap()
            .revision;

        assert_eq!(revision, 1);

        let entry = store
            .insert(Representation::Quantiles(quantiles), RepresentationKind::Samples)
            .unwrap();

        assert_eq!(entry.revision, 2);
        assert_eq!(
            entry.provenance,
            Provenance::Derived {
                from: RepresentationKind::Samples
            }
        );

        store
            .insert(
                Representation::Histogram(Histogram::new(vec![0.0, 1.0], vec![1.0]).unwrap()),
                RepresentationKind::Samples,
            )
            .unwrap();

        assert_eq!(
            store.kinds().collect::<Vec<_>>(),
            vec![
                RepresentationKind::Samples,
                RepresentationKind::Quantiles,
                RepresentationKind::Histogram
            ]
        );
        assert_eq!(store.len(), 3);

        assert!(matches!(
            store.insert(
                Representation::Samples(Samples::new(vec![2.0]).unwrap()),
                RepresentationKind::Quantiles
            ),
            Err(QproxError::UnsupportedRepresentation { .. })
        ));

        store.mark_used(RepresentationKind::Histogram);

        assert_eq!(store.last_used(), Some(RepresentationKind::Histogram));
    }
}
