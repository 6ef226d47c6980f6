//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use memusage::{describe_record, Describe, Field, Kind, Shape, TypeInfo};

/// Record with a scalar and a pointer to a second record
pub struct Outer {
    pub x: i64,
    pub y: Box<Inner>,
}

/// Record with a string and a scalar sequence
pub struct Inner {
    pub a: String,
    pub b: Vec<i64>,
}

describe_record!(Outer { x, y });
describe_record!(Inner { a, b });

pub fn inner() -> Inner {
    Inner {
        a: "123456".to_string(),
        b: vec![3, 2, 1],
    }
}

pub fn scenario_a() -> Outer {
    Outer {
        x: 3,
        y: Box::new(inner()),
    }
}

/// Cost of one `Inner` reached through a pointer
pub fn inner_cost(inner: &Inner) -> usize {
    std::mem::size_of::<Inner>() + inner.a.len() + inner.b.capacity() * 8
}

/// Two handles that may or may not share their target
pub struct Pair {
    pub left: Rc<Inner>,
    pub right: Rc<Inner>,
}

describe_record!(Pair { left, right });

/// Record with an optional pointer
pub struct Holder {
    pub tag: u8,
    pub target: Option<Box<Inner>>,
}

describe_record!(Holder { tag, target });

/// Singly linked chain; dropped iteratively so long chains are safe
pub struct Chain {
    pub value: u32,
    pub next: Option<Box<Chain>>,
}

describe_record!(Chain { value, next });

impl Drop for Chain {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

pub fn chain(len: usize) -> Chain {
    let mut head = Chain {
        value: 0,
        next: None,
    };
    for value in 1..len as u32 {
        head = Chain {
            value,
            next: Some(Box::new(head)),
        };
    }
    head
}

/// Node of a cyclic graph built from plain references
pub struct Ring<'a> {
    pub id: u32,
    pub next: Link<'a>,
}

/// Nullable, re-targetable reference
pub struct Link<'a>(pub Cell<Option<&'a Ring<'a>>>);

impl<'a> Ring<'a> {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            next: Link(Cell::new(None)),
        }
    }

    pub fn point_to(&self, other: &'a Ring<'a>) {
        self.next.0.set(Some(other));
    }
}

impl Describe for Ring<'_> {
    fn layout() -> TypeInfo {
        TypeInfo::record::<Self>()
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Record(vec![
            Field::new("id", &self.id),
            Field::new("next", &self.next),
        ])
    }
}

impl Describe for Link<'_> {
    fn layout() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Pointer)
    }

    fn type_info(&self) -> TypeInfo {
        Self::layout()
    }

    fn shape(&self) -> Shape<'_> {
        Shape::Pointer(self.0.get().map(|ring| ring as &dyn Describe))
    }
}
