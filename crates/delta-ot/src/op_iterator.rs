//! Splittable cursor over a fixed operation slice.
//!
//! The algebra walks two scripts in lockstep by repeatedly asking each side
//! for a slice of at most the other side's remaining length. The cursor is an
//! `(index, offset)` pair; text operations are sliced by scalar-value
//! position, while embeds are indivisible and always come back whole.
//!
//! Past the end the cursor reports an infinite bare retain
//! (`peek_length() == usize::MAX`, `peek_type() == OpType::Retain`), which
//! lets the aligned loops drain the longer script without a special case.

use crate::op::{InsertValue, Op, RetainValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Insert,
    Retain,
    Delete,
}

#[derive(Debug)]
pub struct OpIterator<'a> {
    ops: &'a [Op],
    index: usize,
    offset: usize,
}

impl<'a> OpIterator<'a> {
    pub fn new(ops: &'a [Op]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a Op> {
        self.ops.get(self.index)
    }

    /// Remaining positions in the current operation; `usize::MAX` at the end.
    pub fn peek_length(&self) -> usize {
        match self.ops.get(self.index) {
            Some(op) => op.length() - self.offset,
            None => usize::MAX,
        }
    }

    pub fn peek_type(&self) -> OpType {
        match self.ops.get(self.index) {
            Some(Op::Insert(..)) => OpType::Insert,
            Some(Op::Delete(_)) => OpType::Delete,
            Some(Op::Retain(..)) | None => OpType::Retain,
        }
    }

    pub fn has_next(&self) -> bool {
        self.peek_length() < usize::MAX
    }

    /// Consume and return the rest of the current operation.
    pub fn next_op(&mut self) -> Op {
        self.next_len(usize::MAX)
    }

    /// Consume up to `length` positions of the current operation, returning
    /// the covered slice with its tag and attributes. Embeds come back whole.
    pub fn next_len(&mut self, length: usize) -> Op {
        let Some(op) = self.ops.get(self.index) else {
            return Op::Retain(RetainValue::Count(usize::MAX), None);
        };
        let offset = self.offset;
        let op_length = op.length();
        let length = if length >= op_length - offset {
            self.index += 1;
            self.offset = 0;
            op_length - offset
        } else {
            self.offset += length;
            length
        };
        match op {
            Op::Delete(_) => Op::Delete(length),
            Op::Retain(RetainValue::Count(_), attributes) => {
                Op::Retain(RetainValue::Count(length), attributes.clone())
            }
            Op::Insert(InsertValue::Text(text), attributes) => Op::Insert(
                InsertValue::Text(substr_chars(text, offset, length)),
                attributes.clone(),
            ),
            // indivisible: offset is 0 and the whole embed is consumed
            Op::Retain(RetainValue::Embed(_), _) | Op::Insert(InsertValue::Embed(_), _) => {
                op.clone()
            }
        }
    }

    /// The unconsumed tail of the script, with the current operation
    /// truncated to its remaining part. Does not advance the cursor.
    pub fn rest(&mut self) -> Vec<Op> {
        if !self.has_next() {
            Vec::new()
        } else if self.offset == 0 {
            self.ops[self.index..].to_vec()
        } else {
            let offset = self.offset;
            let index = self.index;
            let head = self.next_op();
            let mut rest = vec![head];
            rest.extend_from_slice(&self.ops[self.index..]);
            self.index = index;
            self.offset = offset;
            rest
        }
    }
}

/// Slice of `s` covering `length` chars starting at char position `offset`.
fn substr_chars(s: &str, offset: usize, length: usize) -> String {
    s.chars().skip(offset).take(length).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ops() -> Vec<Op> {
        vec![
            Op::insert("Hello", None),
            Op::retain(3usize, None),
            Op::delete(4),
        ]
    }

    #[test]
    fn peek_reports_current_op() {
        let ops = ops();
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.peek(), Some(&Op::insert("Hello", None)));
        assert_eq!(iter.peek_length(), 5);
        assert_eq!(iter.peek_type(), OpType::Insert);
        iter.next_len(2);
        assert_eq!(iter.peek_length(), 3);
    }

    #[test]
    fn next_slices_text_by_chars() {
        let ops = vec![Op::insert("día 🎉 fin", None)];
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.next_len(4), Op::insert("día ", None));
        assert_eq!(iter.next_len(2), Op::insert("🎉 ", None));
        assert_eq!(iter.next_op(), Op::insert("fin", None));
        assert!(!iter.has_next());
    }

    #[test]
    fn next_slices_counts() {
        let ops = ops();
        let mut iter = OpIterator::new(&ops);
        iter.next_op();
        assert_eq!(iter.next_len(2), Op::retain(2usize, None));
        assert_eq!(iter.next_len(10), Op::retain(1usize, None));
        assert_eq!(iter.next_len(1), Op::delete(1));
        assert_eq!(iter.next_op(), Op::delete(3));
    }

    #[test]
    fn embeds_are_returned_whole() {
        let ops = vec![Op::insert(json!({"image": "url"}), None)];
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.next_len(1), Op::insert(json!({"image": "url"}), None));
        assert!(!iter.has_next());
    }

    #[test]
    fn exhausted_iterator_is_an_infinite_retain() {
        let mut iter = OpIterator::new(&[]);
        assert_eq!(iter.peek(), None);
        assert_eq!(iter.peek_length(), usize::MAX);
        assert_eq!(iter.peek_type(), OpType::Retain);
        assert!(!iter.has_next());
        assert_eq!(
            iter.next_op(),
            Op::Retain(RetainValue::Count(usize::MAX), None)
        );
    }

    #[test]
    fn rest_truncates_the_current_op() {
        let ops = ops();
        let mut iter = OpIterator::new(&ops);
        iter.next_len(2);
        assert_eq!(
            iter.rest(),
            vec![
                Op::insert("llo", None),
                Op::retain(3usize, None),
                Op::delete(4),
            ]
        );
        // the cursor is untouched
        assert_eq!(iter.next_op(), Op::insert("llo", None));
    }

    #[test]
    fn attributes_ride_along_with_slices() {
        let attrs = json!({"bold": true}).as_object().cloned();
        let ops = vec![Op::insert("abc", attrs.clone())];
        let mut iter = OpIterator::new(&ops);
        assert_eq!(iter.next_len(1), Op::insert("a", attrs));
    }
}
