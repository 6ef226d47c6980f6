//! # Structural memory-footprint estimation
//!
//! Estimates how many bytes a value occupies by walking its object graph and
//! summing the storage of every reachable node, broken down by type.
//!
//! ## Layers
//!
//! 1. **Describe**: each type reports its fixed layout and its structure
//!    (string, pointer, sequence, map, record, boxed value)
//! 2. **Walker**: pre-order traversal that visits each distinct location once
//!    and reports it to an [`Observer`] with its parent context
//! 3. **Profiler**: the observer that prices each node and accumulates
//!    per-type bytes, counts and the grand total
//!
//! ## Usage Example
//!
//! ```
//! use memusage::{compute_profile, describe_record};
//!
//! struct Entry {
//!     id: u64,
//!     body: Box<Body>,
//! }
//!
//! struct Body {
//!     name: String,
//!     samples: Vec<i64>,
//! }
//!
//! describe_record!(Entry { id, body });
//! describe_record!(Body { name, samples });
//!
//! let entry = Entry {
//!     id: 3,
//!     body: Box::new(Body {
//!         name: "123456".to_string(),
//!         samples: vec![3, 2, 1],
//!     }),
//! };
//! let profile = compute_profile(&entry);
//! assert_eq!(profile.total_bytes(), 16 + 48 + 6 + 3 * 8);
//! ```
//!
//! ## Approximation
//!
//! Totals are structural: fixed layout sizes plus string and sequence
//! payloads. Allocator headers, padding inside allocations, hash-table control
//! bytes and reference-count words are not included. Storage reachable
//! through several paths is counted once ([`Sharing::CountOnce`], the default)
//! or once per path ([`Sharing::CountPerPath`]); the two answer different
//! questions and must not be mixed.

#![warn(missing_docs, missing_debug_implementations)]

pub mod describe; // Type layout and structure
pub mod profile; // Size accounting and reports
pub mod walk; // Object-graph traversal

pub use describe::{Describe, Entries, Field, Kind, Seq, Shape, TypeInfo};
pub use profile::{Profile, Profiler, TypeStats};
pub use walk::{observer_fn, Context, Node, Observer, Parent, Sharing, Visit, WalkStats, Walker};

use thiserror::Error;

/// Configuration for a profiling walk
#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    /// How storage reachable through several paths is counted
    pub sharing: Sharing,

    /// Emit a `trace` event per visited node
    pub trace_nodes: bool,
}

impl ProfileConfig {
    /// Default configuration: shared storage counted once, no per-node tracing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sharing policy
    pub fn with_sharing(mut self, sharing: Sharing) -> Self {
        self.sharing = sharing;
        self
    }

    /// Enable per-node trace events
    pub fn with_trace_nodes(mut self, enabled: bool) -> Self {
        self.trace_nodes = enabled;
        self
    }
}

/// Errors that can occur while profiling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A type-erased root was not a pointer or boxed value
    #[error("profiling root must be pointer-like, got {type_name}")]
    RootNotReference {
        /// Type of the rejected root
        type_name: &'static str,
    },
}

/// Profile everything reachable from `root`, counting shared storage once
pub fn compute_profile<T: Describe>(root: &T) -> Profile {
    compute_profile_with(root, &ProfileConfig::default())
}

/// Profile everything reachable from `root` with an explicit configuration
///
/// With [`Sharing::CountPerPath`] the walk does not terminate on cyclic
/// graphs.
pub fn compute_profile_with<T: Describe>(root: &T, config: &ProfileConfig) -> Profile {
    let mut profiler = Profiler::new(config);
    Walker::new(config.sharing).walk(root, &mut profiler);
    profiler.into_profile()
}

/// Profile from a type-erased root, which must be a pointer or boxed value
///
/// Fails immediately with [`ProfileError::RootNotReference`] otherwise.
pub fn compute_profile_dyn(
    root: &dyn Describe,
    config: &ProfileConfig,
) -> Result<Profile, ProfileError> {
    let mut profiler = Profiler::new(config);
    Walker::new(config.sharing).walk_dyn(root, &mut profiler)?;
    Ok(profiler.into_profile())
}

/// Bytes reachable from `root`, shared storage counted once
pub fn total_bytes<T: Describe>(root: &T) -> usize {
    compute_profile(root).total_bytes()
}

/// Bytes reachable from `root`, shared storage counted once per path
///
/// Answers "how big would this be with no sharing". Must not be used on
/// cyclic graphs.
pub fn total_bytes_per_path<T: Describe>(root: &T) -> usize {
    let config = ProfileConfig::new().with_sharing(Sharing::CountPerPath);
    compute_profile_with(root, &config).total_bytes()
}

/// Bytes reachable from a type-erased pointer-like root, shared storage counted once
pub fn total_bytes_dyn(root: &dyn Describe) -> Result<usize, ProfileError> {
    compute_profile_dyn(root, &ProfileConfig::default()).map(|profile| profile.total_bytes())
}
