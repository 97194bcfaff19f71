//! Rich-text change scripts.
//!
//! A [`Delta`] is an ordered sequence of [`Op`]s describing either a whole
//! document (inserts only) or a change between two documents. Every mutation
//! funnels through [`Delta::push`], which keeps scripts canonical:
//!
//! - zero-length operations are never stored;
//! - adjacent deletes, and adjacent text inserts or count retains with equal
//!   attributes, are merged (embeds never merge);
//! - an insert pushed right after a delete slides in front of it, so inserts
//!   precede deletes among consecutive non-retain operations;
//! - attribute maps are stored only when non-empty.
//!
//! [`Delta::chop`] removes a trailing bare retain, the terminal form every
//! algebra result is returned in.

use crate::attributes::AttributeMap;
use crate::op::{InsertValue, Op, RetainValue};
use crate::op_iterator::{OpIterator, OpType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod compose;
mod diff;
mod invert;
mod transform;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append an insert. Empty text is a no-op.
    pub fn insert(
        &mut self,
        content: impl Into<InsertValue>,
        attributes: Option<AttributeMap>,
    ) -> &mut Self {
        let content = content.into();
        if matches!(&content, InsertValue::Text(text) if text.is_empty()) {
            return self;
        }
        self.push(Op::Insert(content, non_empty(attributes)))
    }

    /// Append a delete. Zero is a no-op.
    pub fn delete(&mut self, length: usize) -> &mut Self {
        if length == 0 {
            return self;
        }
        self.push(Op::Delete(length))
    }

    /// Append a retain: a plain advance, a reformat, or an embed update.
    /// A zero count is a no-op.
    pub fn retain(
        &mut self,
        what: impl Into<RetainValue>,
        attributes: Option<AttributeMap>,
    ) -> &mut Self {
        let what = what.into();
        if matches!(what, RetainValue::Count(0)) {
            return self;
        }
        self.push(Op::Retain(what, non_empty(attributes)))
    }

    /// The normalization kernel. See the module docs for the invariants.
    pub fn push(&mut self, new_op: Op) -> &mut Self {
        if new_op.length() == 0 {
            return self;
        }
        let mut index = self.ops.len();
        let last_delete = match self.ops.last() {
            Some(Op::Delete(length)) => Some(*length),
            _ => None,
        };
        if let Some(last_length) = last_delete {
            if let Op::Delete(new_length) = new_op {
                self.ops[index - 1] = Op::Delete(last_length + new_length);
                return self;
            }
            // It does not matter whether we insert before or after deleting
            // at the same index, so always insert first.
            if new_op.is_insert() {
                index -= 1;
                if index == 0 {
                    self.ops.insert(0, new_op);
                    return self;
                }
            }
        }
        if index > 0 && new_op.attributes() == self.ops[index - 1].attributes() {
            match (&mut self.ops[index - 1], &new_op) {
                (
                    Op::Insert(InsertValue::Text(last), _),
                    Op::Insert(InsertValue::Text(text), _),
                ) => {
                    last.push_str(text);
                    return self;
                }
                (
                    Op::Retain(RetainValue::Count(last), _),
                    Op::Retain(RetainValue::Count(count), _),
                ) => {
                    *last += count;
                    return self;
                }
                _ => {}
            }
        }
        if index == self.ops.len() {
            self.ops.push(new_op);
        } else {
            self.ops.insert(index, new_op);
        }
        self
    }

    /// Drop a trailing bare count retain, the canonical terminal form.
    pub fn chop(&mut self) -> &mut Self {
        if let Some(Op::Retain(RetainValue::Count(_), None)) = self.ops.last() {
            self.ops.pop();
        }
        self
    }

    /// Total number of document positions covered.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::length).sum()
    }

    /// Net growth a document undergoes when this script is applied.
    pub fn change_length(&self) -> i64 {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Insert(..) => op.length() as i64,
                Op::Delete(length) => -(*length as i64),
                Op::Retain(..) => 0,
            })
            .sum()
    }

    pub fn filter<'a>(&'a self, mut predicate: impl FnMut(&Op) -> bool) -> Vec<&'a Op> {
        self.ops.iter().filter(|op| predicate(op)).collect()
    }

    pub fn for_each(&self, f: impl FnMut(&Op)) {
        self.ops.iter().for_each(f);
    }

    pub fn map<'a, T>(&'a self, f: impl FnMut(&'a Op) -> T) -> Vec<T> {
        self.ops.iter().map(f).collect()
    }

    pub fn reduce<T>(&self, init: T, f: impl FnMut(T, &Op) -> T) -> T {
        self.ops.iter().fold(init, f)
    }

    pub fn partition<'a>(
        &'a self,
        mut predicate: impl FnMut(&Op) -> bool,
    ) -> (Vec<&'a Op>, Vec<&'a Op>) {
        self.ops.iter().partition(|op| predicate(op))
    }

    /// The position range `[start, end)` of this script as a new script.
    pub fn slice(&self, start: usize, end: usize) -> Delta {
        let mut ops = Vec::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0;
        while index < end && iter.has_next() {
            if index < start {
                index += iter.next_len(start - index).length();
            } else {
                let op = iter.next_len(end - index);
                index += op.length();
                ops.push(op);
            }
        }
        Delta { ops }
    }

    /// This script followed by `other`, normalized at the seam.
    pub fn concat(&self, other: &Delta) -> Delta {
        let mut delta = Delta {
            ops: self.ops.clone(),
        };
        if let Some((first, rest)) = other.ops.split_first() {
            delta.push(first.clone());
            delta.ops.extend_from_slice(rest);
        }
        delta
    }

    /// Iterate a document line by line, splitting on `newline`.
    ///
    /// Each [`Line`] carries the script for the line's content and the
    /// attributes of the newline insert that terminated it; a trailing
    /// unterminated line is yielded with no attributes. Iteration stops at
    /// the first non-insert operation.
    pub fn lines(&self, newline: char) -> Lines<'_> {
        Lines {
            iter: OpIterator::new(&self.ops),
            newline,
            done: false,
        }
    }
}

fn non_empty(attributes: Option<AttributeMap>) -> Option<AttributeMap> {
    attributes.filter(|a| !a.is_empty())
}

impl From<Vec<Op>> for Delta {
    fn from(ops: Vec<Op>) -> Self {
        Delta { ops }
    }
}

impl FromIterator<Op> for Delta {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        let mut delta = Delta::new();
        for op in iter {
            delta.push(op);
        }
        delta
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ops.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Ops(Vec<Op>),
            Wrapper { ops: Vec<Op> },
        }
        let (Repr::Ops(ops) | Repr::Wrapper { ops }) = Repr::deserialize(deserializer)?;
        Ok(Delta { ops })
    }
}

/// One line of a document and the attributes of its terminating newline.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub delta: Delta,
    pub attributes: Option<AttributeMap>,
}

pub struct Lines<'a> {
    iter: OpIterator<'a>,
    newline: char,
    done: bool,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.done {
            return None;
        }
        let mut line = Delta::new();
        while self.iter.has_next() {
            if self.iter.peek_type() != OpType::Insert {
                self.done = true;
                return None;
            }
            let Some(this_op) = self.iter.peek() else {
                break;
            };
            let start = this_op.length() - self.iter.peek_length();
            let newline_at = match this_op {
                Op::Insert(InsertValue::Text(text), _) => text
                    .chars()
                    .skip(start)
                    .position(|c| c == self.newline),
                _ => None,
            };
            match newline_at {
                None => {
                    line.push(self.iter.next_op());
                }
                Some(0) => {
                    let attributes = self.iter.next_len(1).attributes().cloned();
                    return Some(Line {
                        delta: line,
                        attributes,
                    });
                }
                Some(offset) => {
                    line.push(self.iter.next_len(offset));
                }
            }
        }
        self.done = true;
        if line.length() > 0 {
            return Some(Line {
                delta: line,
                attributes: None,
            });
        }
        None
    }
}
