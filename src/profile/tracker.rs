//! Profile accumulation during a walk

use tracing::trace;

use super::{shallow_size, Profile, Shallow};
use crate::describe::TypeInfo;
use crate::walk::{Context, Node, Observer, Parent, Visit};
use crate::ProfileConfig;

/// Observer that prices every visited node into a [`Profile`]
#[derive(Debug)]
pub struct Profiler {
    profile: Profile,
    trace_nodes: bool,
}

impl Profiler {
    /// Create profiler for one walk
    pub fn new(config: &ProfileConfig) -> Self {
        Self {
            profile: Profile::new(config.sharing),
            trace_nodes: config.trace_nodes,
        }
    }

    /// Charge one node
    ///
    /// Nodes embedded in a record or sequence only add their owned content to
    /// the grand total; their fixed slot is part of the parent's footprint.
    pub fn record(&mut self, info: TypeInfo, shallow: Shallow, parent: Parent) {
        let attributed = if parent.is_embedded() {
            shallow.owned
        } else {
            shallow.bytes
        };
        self.profile.record(info.name, shallow.bytes, attributed);
    }

    /// Running grand total
    pub fn total_bytes(&self) -> usize {
        self.profile.total_bytes()
    }

    /// Finish and hand out the profile
    pub fn into_profile(self) -> Profile {
        self.profile
    }
}

impl<'a> Observer<'a> for Profiler {
    fn visit(&mut self, node: &Node<'a, '_>, ctx: &Context<'a>) -> Visit {
        let shallow = shallow_size(node);
        if self.trace_nodes {
            trace!(
                type_name = node.info.name,
                parent = ?ctx.parent,
                field = ?ctx.field,
                index = ?ctx.index,
                bytes = shallow.bytes,
                owned = shallow.owned,
                "visit"
            );
        }
        self.record(node.info, shallow, ctx.parent);
        shallow.visit
    }
}
