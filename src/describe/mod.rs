//! Structural self-description
//!
//! Rust has no runtime reflection, so every measurable type reports its own
//! layout and structure through [`Describe`]:
//!   static facts  -> [`TypeInfo`] (name, fixed size, kind, scalar chain)
//!   per-value     -> [`Shape`] (string length, elements, entries, fields, pointee)
//!
//! The walker only ever sees `&dyn Describe`.

mod impls;

use std::fmt;

/// Structural kind of a type, as seen by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kind {
    /// Fixed-width primitive (numbers, `bool`, `char`, `()`)
    Scalar,
    /// String handle plus variable-length UTF-8 payload
    Str,
    /// Single-target reference (`&T`, `Box<T>`, `Rc<T>`, `Arc<T>`, shared `str` handles)
    Pointer,
    /// Fixed-length inline array `[T; N]`
    Array,
    /// Growable or heap-backed sequence (`Vec<T>`, `Box<[T]>`, `&[T]`)
    Slice,
    /// Associative container
    Map,
    /// Struct, tuple or enum payload
    Record,
    /// Type-erased value behind a trait object
    Interface,
}

/// Static facts about a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type name (from [`std::any::type_name`])
    pub name: &'static str,

    /// Fixed layout size in bytes (`size_of::<T>()`)
    pub size: usize,

    /// Structural kind
    pub kind: Kind,

    /// Total size of the reference chain if it bottoms out at a scalar
    ///
    /// `Some(size)` for scalars, `Some(handle + target)` for pointers to
    /// scalar-like types, `None` otherwise.
    pub scalar_chain: Option<usize>,
}

impl TypeInfo {
    /// Non-scalar type of the given kind
    pub fn of<T>(kind: Kind) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
            kind,
            scalar_chain: None,
        }
    }

    /// Fixed-width primitive
    pub fn scalar<T>() -> Self {
        Self {
            scalar_chain: Some(std::mem::size_of::<T>()),
            ..Self::of::<T>(Kind::Scalar)
        }
    }

    /// String storage reached through a borrowed or reference-counted handle
    ///
    /// Unsized: no fixed part, only the content bytes.
    pub fn str_payload() -> Self {
        Self {
            name: std::any::type_name::<str>(),
            size: 0,
            kind: Kind::Str,
            scalar_chain: None,
        }
    }

    /// Struct-like type
    pub fn record<T>() -> Self {
        Self::of::<T>(Kind::Record)
    }

    /// Pointer of type `P` to a target described by `target`
    ///
    /// Scalar-like when the target is.
    pub fn pointer<P>(target: TypeInfo) -> Self {
        let info = Self::of::<P>(Kind::Pointer);
        Self {
            scalar_chain: target.scalar_chain.map(|chain| chain + info.size),
            ..info
        }
    }

    /// Whether values of this type bottom out at a scalar
    #[inline]
    pub fn is_scalar_like(&self) -> bool {
        self.scalar_chain.is_some()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// A type whose memory footprint can be walked
///
/// Implementations exist for the primitives, strings, pointers, sequences,
/// maps, tuples and `Option`. Structs opt in with [`describe_record!`] or a
/// manual impl.
///
/// [`describe_record!`]: crate::describe_record
pub trait Describe {
    /// Static facts about `Self`
    fn layout() -> TypeInfo
    where
        Self: Sized;

    /// Static facts about the concrete type behind `self`
    ///
    /// Differs from [`Describe::layout`] only for trait objects.
    fn type_info(&self) -> TypeInfo;

    /// Structure of this particular value
    fn shape(&self) -> Shape<'_>;
}

/// Elements of an array or slice
pub struct Seq<'a> {
    /// Element type
    pub elem: TypeInfo,

    /// Number of live elements
    pub len: usize,

    /// Allocated element slots (equals `len` for inline and borrowed storage)
    pub capacity: usize,

    items: Box<dyn Iterator<Item = &'a dyn Describe> + 'a>,
}

impl<'a> Seq<'a> {
    /// Sequence over `items` with the given allocated capacity
    pub fn new<T: Describe + 'a>(items: &'a [T], capacity: usize) -> Self {
        Self {
            elem: T::layout(),
            len: items.len(),
            capacity,
            items: Box::new(items.iter().map(|item| item as &dyn Describe)),
        }
    }

    /// Sequence over an arbitrary element iterator
    pub fn from_items<T, I>(items: I, len: usize, capacity: usize) -> Self
    where
        T: Describe + 'a,
        I: Iterator<Item = &'a T> + 'a,
    {
        Self {
            elem: T::layout(),
            len,
            capacity,
            items: Box::new(items.map(|item| item as &dyn Describe)),
        }
    }

    pub(crate) fn into_items(self) -> Box<dyn Iterator<Item = &'a dyn Describe> + 'a> {
        self.items
    }
}

/// Key/value pairs of a map
pub struct Entries<'a> {
    /// Number of entries
    pub len: usize,

    pairs: Box<dyn Iterator<Item = (&'a dyn Describe, &'a dyn Describe)> + 'a>,
}

impl<'a> Entries<'a> {
    /// Entries from a `(&K, &V)` iterator such as `HashMap::iter`
    pub fn new<K, V, I>(pairs: I, len: usize) -> Self
    where
        K: Describe + 'a,
        V: Describe + 'a,
        I: Iterator<Item = (&'a K, &'a V)> + 'a,
    {
        Self {
            len,
            pairs: Box::new(pairs.map(|(k, v)| (k as &dyn Describe, v as &dyn Describe))),
        }
    }

    pub(crate) fn into_pairs(
        self,
    ) -> Box<dyn Iterator<Item = (&'a dyn Describe, &'a dyn Describe)> + 'a> {
        self.pairs
    }
}

/// Named member of a record
#[derive(Clone, Copy)]
pub struct Field<'a> {
    /// Field identifier (`"0"`, `"1"`, ... for tuples)
    pub name: &'static str,

    /// Field value
    pub value: &'a dyn Describe,
}

impl<'a> Field<'a> {
    /// Pair a field name with its value
    pub fn new(name: &'static str, value: &'a dyn Describe) -> Self {
        Self { name, value }
    }
}

/// Per-value structure reported to the walker
pub enum Shape<'a> {
    /// Scalar: nothing beyond the fixed size, no children
    Leaf,

    /// String holding `len` content bytes
    Str {
        /// Content length in bytes
        len: usize,
    },

    /// Reference to a single target, `None` when nil
    Pointer(Option<&'a dyn Describe>),

    /// Handle to string storage that may be shared (`&str`, `Rc<str>`, `Arc<str>`)
    ///
    /// The payload is walked as a separate `str` node keyed by its address.
    SharedStr(&'a str),

    /// Inline fixed-length array
    Array(Seq<'a>),

    /// Heap-backed or borrowed sequence
    Slice(Seq<'a>),

    /// Associative container
    Map(Entries<'a>),

    /// Fields in declaration order
    Record(Vec<Field<'a>>),

    /// Type-erased value, `None` when empty
    Boxed(Option<&'a dyn Describe>),
}

impl Shape<'_> {
    /// Kind matching this shape
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Leaf => Kind::Scalar,
            Shape::Str { .. } => Kind::Str,
            Shape::Pointer(_) | Shape::SharedStr(_) => Kind::Pointer,
            Shape::Array(_) => Kind::Array,
            Shape::Slice(_) => Kind::Slice,
            Shape::Map(_) => Kind::Map,
            Shape::Record(_) => Kind::Record,
            Shape::Boxed(_) => Kind::Interface,
        }
    }
}

impl fmt::Debug for Seq<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seq")
            .field("elem", &self.elem.name)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Entries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entries")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type", &self.value.type_info().name)
            .finish()
    }
}

impl fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Leaf => write!(f, "Leaf"),
            Shape::Str { len } => write!(f, "Str({len})"),
            Shape::Pointer(target) => write!(f, "Pointer(nil={})", target.is_none()),
            Shape::SharedStr(payload) => write!(f, "SharedStr({})", payload.len()),
            Shape::Array(seq) => write!(f, "Array(len={})", seq.len),
            Shape::Slice(seq) => write!(f, "Slice(len={}, cap={})", seq.len, seq.capacity),
            Shape::Map(entries) => write!(f, "Map(len={})", entries.len),
            Shape::Record(fields) => {
                let names: Vec<_> = fields.iter().map(|field| field.name).collect();
                write!(f, "Record({})", names.join(", "))
            }
            Shape::Boxed(value) => write!(f, "Boxed(nil={})", value.is_none()),
        }
    }
}

/// Implement [`Describe`] for a struct by listing its fields
///
/// Fields are walked in the order given; list them in declaration order.
/// Tuple structs use positional names (`0`, `1`, ...). Generic structs need a
/// manual impl.
///
/// ```
/// use memusage::describe_record;
///
/// struct Entry {
///     key: String,
///     hits: u64,
/// }
///
/// describe_record!(Entry { key, hits });
/// ```
#[macro_export]
macro_rules! describe_record {
    ($ty:ty { $($field:tt),* $(,)? }) => {
        impl $crate::Describe for $ty {
            fn layout() -> $crate::TypeInfo {
                $crate::TypeInfo::record::<Self>()
            }

            fn type_info(&self) -> $crate::TypeInfo {
                <Self as $crate::Describe>::layout()
            }

            fn shape(&self) -> $crate::Shape<'_> {
                $crate::Shape::Record(vec![
                    $($crate::Field::new(stringify!($field), &self.$field),)*
                ])
            }
        }
    };
}
