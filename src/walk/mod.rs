//! Object-graph traversal
//!
//! Depth-first, pre-order. Every pointer target, element, map key/value,
//! record field and boxed payload is reported to an [`Observer`] together with
//! the [`Context`] it was reached through.
//!
//! Recursion is replaced by an explicit work-stack of child iterators:
//! stack depth == reference depth, but it lives on the heap, so arbitrarily
//! long chains cannot overflow the thread stack. Visitation order is the same
//! as the recursive formulation.

mod visited;

pub use visited::{Location, VisitedSet};

use std::fmt;
use std::iter;

use tracing::debug;

use crate::describe::{Describe, Shape, TypeInfo};
use crate::ProfileError;

/// How storage reachable through several paths is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Sharing {
    /// Track visited locations; shared storage is reported once
    #[default]
    CountOnce,

    /// No visited-set; shared storage is reported once per path
    ///
    /// Never terminates on cyclic graphs.
    CountPerPath,
}

/// Kind of container a node was reached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The walk's starting node
    Root,
    /// Pointer dereference
    Pointer,
    /// Array or slice element
    Sequence,
    /// Map key or value
    Map,
    /// Record field
    Record,
    /// Concrete value behind a trait object
    Interface,
}

impl Parent {
    /// Whether a child's fixed slot is part of the parent's own footprint
    #[inline]
    pub fn is_embedded(self) -> bool {
        matches!(self, Parent::Sequence | Parent::Record)
    }
}

/// Position of a node relative to its parent
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Parent container kind
    pub parent: Parent,

    /// Field name when the parent is a record
    pub field: Option<&'static str>,

    /// Element index when the parent is a sequence
    pub index: Option<usize>,

    /// Entry key when the parent is a map
    pub key: Option<&'a dyn Describe>,
}

impl<'a> Context<'a> {
    fn with_parent(parent: Parent) -> Self {
        Self {
            parent,
            field: None,
            index: None,
            key: None,
        }
    }

    /// Context of the walk's starting node
    pub fn root() -> Self {
        Self::with_parent(Parent::Root)
    }

    /// Reached through a pointer
    pub fn pointer() -> Self {
        Self::with_parent(Parent::Pointer)
    }

    /// Reached through a trait object
    pub fn interface() -> Self {
        Self::with_parent(Parent::Interface)
    }

    /// Record field `name`
    pub fn field(name: &'static str) -> Self {
        Self {
            field: Some(name),
            ..Self::with_parent(Parent::Record)
        }
    }

    /// Sequence element `index`
    pub fn index(index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::with_parent(Parent::Sequence)
        }
    }

    /// Map key or value stored under `key`
    pub fn key(key: &'a dyn Describe) -> Self {
        Self {
            key: Some(key),
            ..Self::with_parent(Parent::Map)
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("parent", &self.parent)
            .field("field", &self.field)
            .field("index", &self.index)
            .field("key", &self.key.map(|key| key.type_info().name))
            .finish()
    }
}

/// Observer verdict for the node just visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Walk this node's children
    Descend,
    /// Treat this node as a leaf
    Skip,
}

/// A node as presented to an observer
pub struct Node<'a, 'b> {
    /// The value itself, `None` for string storage behind a shared handle
    pub value: Option<&'a dyn Describe>,

    /// Static facts about its concrete type
    pub info: TypeInfo,

    /// Its structure
    pub shape: &'b Shape<'a>,
}

impl fmt::Debug for Node<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("info", &self.info)
            .field("shape", self.shape)
            .finish()
    }
}

/// Callback invoked once per visited node
pub trait Observer<'a> {
    /// Inspect `node`, reached as described by `ctx`
    fn visit(&mut self, node: &Node<'a, '_>, ctx: &Context<'a>) -> Visit;
}

impl<'a, O: Observer<'a> + ?Sized> Observer<'a> for &mut O {
    fn visit(&mut self, node: &Node<'a, '_>, ctx: &Context<'a>) -> Visit {
        (**self).visit(node, ctx)
    }
}

/// Observer backed by a closure, see [`observer_fn`]
#[derive(Debug)]
pub struct FnObserver<F>(F);

/// Wrap a closure as an [`Observer`]
pub fn observer_fn<'a, F>(f: F) -> FnObserver<F>
where
    F: FnMut(&Node<'a, '_>, &Context<'a>) -> Visit,
{
    FnObserver(f)
}

impl<'a, F> Observer<'a> for FnObserver<F>
where
    F: FnMut(&Node<'a, '_>, &Context<'a>) -> Visit,
{
    fn visit(&mut self, node: &Node<'a, '_>, ctx: &Context<'a>) -> Visit {
        (self.0)(node, ctx)
    }
}

/// Counters from one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Nodes handed to the observer
    pub nodes_visited: usize,

    /// Nodes dropped because their location was already visited
    pub revisits_skipped: usize,

    /// Deepest work-stack seen
    pub max_depth: usize,
}

/// Graph walker
///
/// Holds only the sharing policy; each walk owns a fresh visited-set, so one
/// walker can serve any number of independent (or concurrent) walks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    sharing: Sharing,
}

impl Walker {
    /// Create walker with the given sharing policy
    pub fn new(sharing: Sharing) -> Self {
        Self { sharing }
    }

    /// Sharing policy in use
    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    /// Walk everything reachable from the value `root` refers to
    ///
    /// `root` itself (the reference) is not reported; pass `&&value` to
    /// include a pointer slot.
    pub fn walk<'a, T, O>(&self, root: &'a T, observer: &mut O) -> WalkStats
    where
        T: Describe,
        O: Observer<'a> + ?Sized,
    {
        self.walk_from(Target::Value(root), observer)
    }

    /// Walk from a type-erased root, which must be pointer-like
    ///
    /// The root's shape must be a pointer, shared string or boxed value; its target is the
    /// first node visited. A nil root walks nothing.
    pub fn walk_dyn<'a, O>(
        &self,
        root: &'a dyn Describe,
        observer: &mut O,
    ) -> Result<WalkStats, ProfileError>
    where
        O: Observer<'a> + ?Sized,
    {
        match root.shape() {
            Shape::Pointer(target) | Shape::Boxed(target) => Ok(target
                .map(|target| self.walk_from(Target::Value(target), observer))
                .unwrap_or_default()),
            Shape::SharedStr(payload) => Ok(self.walk_from(Target::Str(payload), observer)),
            _ => Err(ProfileError::RootNotReference {
                type_name: root.type_info().name,
            }),
        }
    }

    fn walk_from<'a, O>(&self, start: Target<'a>, observer: &mut O) -> WalkStats
    where
        O: Observer<'a> + ?Sized,
    {
        let traversal = Traversal {
            observer,
            visited: match self.sharing {
                Sharing::CountOnce => Some(VisitedSet::new()),
                Sharing::CountPerPath => None,
            },
            stack: Vec::new(),
            stats: WalkStats::default(),
        };
        let stats = traversal.run(start);

        debug!(
            root = start.type_name(),
            sharing = ?self.sharing,
            nodes = stats.nodes_visited,
            skipped = stats.revisits_skipped,
            depth = stats.max_depth,
            "walk complete"
        );
        stats
    }
}

/// Something the walker can enter
#[derive(Clone, Copy)]
enum Target<'a> {
    Value(&'a dyn Describe),
    /// Payload of a shared string handle; `str` is unsized, so it has no
    /// `dyn Describe` of its own
    Str(&'a str),
}

impl<'a> Target<'a> {
    fn type_name(self) -> &'static str {
        match self {
            Target::Value(value) => value.type_info().name,
            Target::Str(_) => std::any::type_name::<str>(),
        }
    }
}

type Children<'a> = Box<dyn Iterator<Item = (Target<'a>, Context<'a>)> + 'a>;

/// State of one in-flight walk
struct Traversal<'a, 'o, O: ?Sized> {
    observer: &'o mut O,
    visited: Option<VisitedSet>,
    stack: Vec<Children<'a>>,
    stats: WalkStats,
}

impl<'a, O: Observer<'a> + ?Sized> Traversal<'a, '_, O> {
    fn run(mut self, start: Target<'a>) -> WalkStats {
        self.enter(start, Context::root());

        while let Some(frame) = self.stack.last_mut() {
            match frame.next() {
                Some((target, ctx)) => self.enter(target, ctx),
                None => {
                    self.stack.pop();
                }
            }
        }

        self.stats
    }

    fn enter(&mut self, target: Target<'a>, ctx: Context<'a>) {
        if let Some(visited) = self.visited.as_mut() {
            let location = match target {
                Target::Value(value) => Location::of(value),
                Target::Str(payload) => Location::of_str(payload),
            };
            if !visited.insert(location) {
                self.stats.revisits_skipped += 1;
                return;
            }
        }
        self.stats.nodes_visited += 1;

        let (value, info, shape) = match target {
            Target::Value(value) => (Some(value), value.type_info(), value.shape()),
            Target::Str(payload) => (
                None,
                TypeInfo::str_payload(),
                Shape::Str { len: payload.len() },
            ),
        };
        let node = Node {
            value,
            info,
            shape: &shape,
        };
        if self.observer.visit(&node, &ctx) == Visit::Skip {
            return;
        }

        if let Some(children) = children(shape) {
            self.stack.push(children);
            self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
        }
    }
}

/// Children of a node in visitation order, `None` for leaves
fn children(shape: Shape<'_>) -> Option<Children<'_>> {
    match shape {
        Shape::Leaf | Shape::Str { .. } | Shape::Pointer(None) | Shape::Boxed(None) => None,
        Shape::Pointer(Some(target)) => Some(Box::new(iter::once((
            Target::Value(target),
            Context::pointer(),
        )))),
        Shape::SharedStr(payload) => Some(Box::new(iter::once((
            Target::Str(payload),
            Context::pointer(),
        )))),
        Shape::Boxed(Some(value)) => Some(Box::new(iter::once((
            Target::Value(value),
            Context::interface(),
        )))),
        Shape::Array(seq) | Shape::Slice(seq) => Some(Box::new(
            seq.into_items()
                .enumerate()
                .map(|(i, item)| (Target::Value(item), Context::index(i))),
        )),
        Shape::Map(entries) => Some(Box::new(entries.into_pairs().flat_map(|(k, v)| {
            [
                (Target::Value(k), Context::key(k)),
                (Target::Value(v), Context::key(k)),
            ]
        }))),
        Shape::Record(fields) => Some(Box::new(
            fields
                .into_iter()
                .map(|field| (Target::Value(field.value), Context::field(field.name))),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_parents(value: &Vec<Box<u8>>, sharing: Sharing) -> Vec<(Parent, Option<usize>)> {
        let mut seen = Vec::new();
        let mut observer = observer_fn(|_node, ctx| {
            seen.push((ctx.parent, ctx.index));
            Visit::Descend
        });
        Walker::new(sharing).walk(value, &mut observer);
        seen
    }

    #[test]
    fn test_pre_order_with_indices() {
        let value = vec![Box::new(1u8), Box::new(2u8)];
        let seen = collect_parents(&value, Sharing::CountOnce);
        assert_eq!(
            seen,
            vec![
                (Parent::Root, None),
                (Parent::Sequence, Some(0)),
                (Parent::Pointer, None),
                (Parent::Sequence, Some(1)),
                (Parent::Pointer, None),
            ]
        );
    }

    #[test]
    fn test_skip_stops_descent() {
        let value = vec![Box::new(1u8), Box::new(2u8)];
        let mut count = 0;
        let mut observer = observer_fn(|_node, _ctx| {
            count += 1;
            Visit::Skip
        });
        let stats = Walker::default().walk(&value, &mut observer);
        assert_eq!(count, 1);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_dyn_root_must_be_pointer_like() {
        let value = 5u32;
        let mut observer = observer_fn(|_, _| Visit::Descend);
        let err = Walker::default()
            .walk_dyn(&value, &mut observer)
            .unwrap_err();
        assert!(matches!(err, ProfileError::RootNotReference { type_name: "u32" }));
    }

    struct Handle(Option<&'static u8>);

    impl Describe for Handle {
        fn layout() -> TypeInfo {
            TypeInfo::of::<Self>(crate::Kind::Pointer)
        }

        fn type_info(&self) -> TypeInfo {
            Self::layout()
        }

        fn shape(&self) -> Shape<'_> {
            Shape::Pointer(self.0.map(|target| target as &dyn Describe))
        }
    }

    #[test]
    fn test_nil_dyn_root_walks_nothing() {
        let root = Handle(None);
        let mut visited = 0;
        let mut observer = observer_fn(|_, _| {
            visited += 1;
            Visit::Descend
        });
        let stats = Walker::default().walk_dyn(&root, &mut observer).unwrap();
        assert_eq!(visited, 0);
        assert_eq!(stats, WalkStats::default());
    }

    #[test]
    fn test_boxed_dyn_root_starts_at_payload() {
        let value: Box<dyn Describe> = Box::new(String::from("abc"));
        let mut names = Vec::new();
        let mut observer = observer_fn(|node, ctx| {
            names.push((node.info.name, ctx.parent));
            Visit::Descend
        });
        Walker::default().walk_dyn(&value, &mut observer).unwrap();
        assert_eq!(names, vec![("alloc::string::String", Parent::Root)]);
    }

    #[test]
    fn test_shared_str_payload_entered_once() {
        let text: std::sync::Arc<str> = std::sync::Arc::from("payload");
        let handles = vec![text.clone(), text.clone(), text];
        let mut payloads = Vec::new();
        let mut observer = observer_fn(|node, ctx| {
            if node.value.is_none() {
                payloads.push((node.info.name, ctx.parent, node.info.size));
            }
            Visit::Descend
        });
        let stats = Walker::default().walk(&handles, &mut observer);

        assert_eq!(payloads, vec![("str", Parent::Pointer, 0)]);
        assert_eq!(stats.revisits_skipped, 2);
    }

    #[test]
    fn test_dyn_root_may_be_borrowed_str() {
        let text = "abc";
        let mut seen = Vec::new();
        let mut observer = observer_fn(|node, ctx| {
            seen.push((node.info.kind, ctx.parent));
            Visit::Descend
        });
        Walker::default().walk_dyn(&text, &mut observer).unwrap();
        assert_eq!(seen, vec![(crate::Kind::Str, Parent::Root)]);
    }

    #[test]
    fn test_embedded_parents() {
        assert!(Parent::Sequence.is_embedded());
        assert!(Parent::Record.is_embedded());
        assert!(!Parent::Pointer.is_embedded());
        assert!(!Parent::Map.is_embedded());
        assert!(!Parent::Root.is_embedded());
    }
}
