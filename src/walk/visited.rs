//! Location identity for dedup walks

use std::collections::HashSet;

use crate::describe::Describe;

/// Identity of one storage location
///
/// Data address plus type name: a record and its first field share an
/// address, as do all zero-sized values, but never a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    addr: usize,
    type_name: &'static str,
}

impl Location {
    /// Location of `value`
    pub fn of(value: &dyn Describe) -> Self {
        Self {
            addr: std::ptr::from_ref(value).cast::<()>() as usize,
            type_name: value.type_info().name,
        }
    }

    /// Location of string storage reached through a shared handle
    pub fn of_str(payload: &str) -> Self {
        Self {
            addr: payload.as_ptr() as usize,
            type_name: std::any::type_name::<str>(),
        }
    }
}

/// Locations already observed during one walk
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<Location>,
}

impl VisitedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `location`; returns false if it was already present
    pub fn insert(&mut self, location: Location) -> bool {
        self.seen.insert(location)
    }

    /// Number of distinct locations seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
