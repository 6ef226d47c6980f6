//! `Describe` for primitives and std containers

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use super::{Describe, Entries, Field, Kind, Seq, Shape, TypeInfo};

macro_rules! describe_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn layout() -> TypeInfo {
                    TypeInfo::scalar::<Self>()
                }

                fn type_info(&self) -> TypeInfo {
                    Self::layout()
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Leaf
                }
            }
        )*
    };
}

describe_scalar!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char, (),
    Duration,
);

// Strings: fixed handle plus `len` content bytes.

impl Describe for String {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Str)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Str { len: self.len() }
    }
}

impl Describe for Box<str> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Str)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Str { len: self.len() }
    }
}

// Borrowed and reference-counted strings point at storage other handles may
// share, so the payload is a node of its own.

macro_rules! describe_shared_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn layout() -> TypeInfo {
                    TypeInfo::pointer::<Self>(TypeInfo::str_payload())
                }

                fn type_info(&self) -> TypeInfo {
                    Self::layout()
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::SharedStr(self)
                }
            }
        )*
    };
}

describe_shared_str!(&str, Rc<str>, Arc<str>);

// Single-target pointers.

macro_rules! describe_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: Describe> Describe for $ptr<T> {
                fn layout() -> TypeInfo {
                    TypeInfo::pointer::<Self>(T::layout())
                }

                fn type_info(&self) -> TypeInfo {
                    Self::layout()
                }

                fn shape(&self) -> Shape<'_> {
                    Shape::Pointer(Some(&**self))
                }
            }
        )*
    };
}

describe_pointer!(Box, Rc, Arc);

impl<T: Describe> Describe for &T {
    fn layout() -> TypeInfo {
        TypeInfo::pointer::<Self>(T::layout())
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Pointer(Some(*self))
    }
}

// Trait objects: the concrete value lives behind the handle.

impl Describe for Box<dyn Describe> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Interface)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Boxed(Some(&**self))
    }
}

impl Describe for &dyn Describe {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Interface)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Boxed(Some(*self))
    }
}

// Sequences.

impl<T: Describe> Describe for Vec<T> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Slice)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Slice(Seq::new(self.as_slice(), self.capacity()))
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Slice)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Slice(Seq::from_items(self.iter(), self.len(), self.capacity()))
    }
}

impl<T: Describe> Describe for Box<[T]> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Slice)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Slice(Seq::new(&self[..], self.len()))
    }
}

impl<T: Describe> Describe for &[T] {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Slice)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Slice(Seq::new(self, self.len()))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Array)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Array(Seq::new(self.as_slice(), N))
    }
}

// Maps.

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Map)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Map(Entries::new(self.iter(), self.len()))
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Map)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Map(Entries::new(self.iter(), self.len()))
    }
}

// Records: `Option` payloads and tuples live inline.

impl<T: Describe> Describe for Option<T> {
    fn layout() -> TypeInfo {
        TypeInfo::record::<Self>()
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => Shape::Record(vec![Field::new("Some", value)]),
            None => Shape::Record(Vec::new()),
        }
    }
}

macro_rules! describe_tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn layout() -> TypeInfo {
                TypeInfo::record::<Self>()
            }

            fn type_info(&self) -> TypeInfo {
                Self::layout()
            }

            fn shape(&self) -> Shape<'_> {
                Shape::Record(vec![$(Field::new(stringify!($idx), &self.$idx)),+])
            }
        }
    };
}

describe_tuple!(A 0);
describe_tuple!(A 0, B 1);
describe_tuple!(A 0, B 1, C 2);
describe_tuple!(A 0, B 1, C 2, D 3);
