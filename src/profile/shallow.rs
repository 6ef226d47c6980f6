//! Shallow size of a single node
//!
//! No recursion: fixed layout size plus whatever variable-length content
//! the node owns directly (string bytes, sequence backing storage).

use crate::describe::Shape;
use crate::walk::{Node, Visit};

/// Size of one node and whether its children still need walking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shallow {
    /// Fixed size plus owned content
    pub bytes: usize,

    /// Owned content only (`bytes - fixed size`)
    pub owned: usize,

    /// `Skip` once the node's full transitive contents are already priced
    pub visit: Visit,
}

/// Compute the shallow size of `node`
///
/// Sequences of scalar-like elements are priced in one step (element chain
/// size × slots) and report [`Visit::Skip`]; walking them would only find the
/// same scalars again. Inline arrays already hold their element slots in their
/// fixed size, so only the pointees of a reference chain are added for them.
/// Growable sequences are charged per allocated slot, not per live element.
pub fn shallow_size(node: &Node<'_, '_>) -> Shallow {
    let (owned, visit) = match node.shape {
        Shape::Str { len } => (*len, Visit::Descend),
        Shape::Array(seq) => match seq.elem.scalar_chain {
            Some(chain) => (chain.saturating_sub(seq.elem.size) * seq.len, Visit::Skip),
            None => (0, Visit::Descend),
        },
        Shape::Slice(seq) => match seq.elem.scalar_chain {
            Some(chain) => (chain * seq.capacity, Visit::Skip),
            None => (seq.elem.size * seq.capacity, Visit::Descend),
        },
        Shape::Leaf
        | Shape::Pointer(_)
        | Shape::SharedStr(_)
        | Shape::Map(_)
        | Shape::Record(_)
        | Shape::Boxed(_) => (0, Visit::Descend),
    };

    Shallow {
        bytes: node.info.size + owned,
        owned,
        visit,
    }
}
