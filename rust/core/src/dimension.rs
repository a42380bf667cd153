// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! First-seen label to surrogate id allocation for lookup dimensions.

use rustc_hash::FxHashMap;
use std::fmt;

/// Surrogate id of a dimension label. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(i32);

impl DimensionId {
    pub const FIRST: DimensionId = DimensionId(1);

    /// Wrap a raw id read back from the store. Returns `None` for ids below 1.
    pub fn new(raw: i32) -> Option<Self> {
        (raw >= 1).then_some(DimensionId(raw))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of resolving a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The label was seen earlier in this run.
    Existing(DimensionId),
    /// The label is new; a dimension row must be written for it.
    New(DimensionId),
}

impl Resolution {
    pub fn id(self) -> DimensionId {
        match self {
            Resolution::Existing(id) | Resolution::New(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Resolution::New(_))
    }
}

/// Label -> id map for one dimension.
///
/// Ids are handed out sequentially from 1 in order of first appearance.
#[derive(Debug, Clone)]
pub struct DimensionIndex {
    ids: FxHashMap<String, DimensionId>,
    next: DimensionId,
}

impl DimensionIndex {
    pub fn new() -> Self {
        Self {
            ids: FxHashMap::default(),
            next: DimensionId::FIRST,
        }
    }

    /// Resolve `label`, allocating the next id if it has not been seen.
    pub fn resolve(&mut self, label: &str) -> Resolution {
        if let Some(&id) = self.ids.get(label) {
            return Resolution::Existing(id);
        }

        let id = self.next;
        self.next = DimensionId(id.0 + 1);
        self.ids.insert(label.to_owned(), id);
        Resolution::New(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for DimensionIndex {
    fn default() -> Self {
        Self::new()
    }
}
