//! Transformation of concurrent changes and positions.

use super::Delta;
use crate::attributes;
use crate::embed;
use crate::op::{Op, RetainValue};
use crate::op_iterator::{OpIterator, OpType};
use serde_json::Value;

impl Delta {
    /// Rewrites the concurrent `other` (made against the same base document
    /// as `self`) so that it applies after `self`:
    /// `self.compose(&other.transform(self, true))` and
    /// `other.compose(&self.transform(other, false))` converge.
    ///
    /// `priority` breaks ties when both sides insert at the same position:
    /// with it, `self`'s insert stays first and pushes `other`'s to the
    /// right.
    pub fn transform(&self, other: &Delta, priority: bool) -> Delta {
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());
        let mut delta = Delta::new();
        while this_iter.has_next() || other_iter.has_next() {
            if this_iter.peek_type() == OpType::Insert
                && (priority || other_iter.peek_type() != OpType::Insert)
            {
                // The other side must step over what we inserted.
                delta.retain(this_iter.next_op().length(), None);
            } else if other_iter.peek_type() == OpType::Insert {
                delta.push(other_iter.next_op());
            } else {
                let length = this_iter.peek_length().min(other_iter.peek_length());
                let this_op = this_iter.next_len(length);
                let other_op = other_iter.next_len(length);
                if this_op.is_delete() {
                    // Our delete already removed what the other side touched.
                    continue;
                }
                if let Op::Delete(count) = other_op {
                    delta.push(Op::Delete(count));
                    continue;
                }
                let retained = transformed_retain(&this_op, &other_op, priority, length);
                delta.retain(
                    retained,
                    attributes::transform(
                        this_op.attributes(),
                        other_op.attributes(),
                        priority,
                    ),
                );
            }
        }
        delta.chop();
        delta
    }

    /// Maps a base-document position through this change.
    ///
    /// Deletes before the position pull it left; inserts push it right,
    /// except an insert exactly at the position when `priority` is set,
    /// which stays to its right. `offset` tracks the base coordinate and
    /// advances by the full operation length for every operation kind.
    pub fn transform_position(&self, index: usize, priority: bool) -> usize {
        let mut iter = OpIterator::new(self.ops());
        let mut index = index;
        let mut offset = 0usize;
        while iter.has_next() && offset <= index {
            let length = iter.peek_length();
            let op_type = iter.peek_type();
            iter.next_op();
            match op_type {
                OpType::Delete => index -= length.min(index - offset),
                OpType::Insert if offset < index || !priority => index += length,
                _ => {}
            }
            offset += length;
        }
        index
    }
}

/// The retain the transformed side ends up with: the other side's embed
/// update when it has one (run through the handler when both sides updated
/// the same embed type and a handler is registered), a plain advance
/// otherwise.
fn transformed_retain(this_op: &Op, other_op: &Op, priority: bool, length: usize) -> RetainValue {
    let this_embed = embed_retain_value(this_op);
    let other_embed = embed_retain_value(other_op);
    match (this_embed, other_embed) {
        (Some(a), Some(b)) => {
            if let (Value::Object(a_map), Value::Object(b_map)) = (a, b) {
                if let (Some(a_type), Some(b_type)) = (a_map.keys().next(), b_map.keys().next())
                {
                    if a_type == b_type {
                        if let Some(handler) = embed::find_handler(a_type) {
                            let transformed =
                                handler.transform(&a_map[a_type], &b_map[b_type], priority);
                            return RetainValue::Embed(embed::wrap(a_type, transformed));
                        }
                    }
                }
            }
            RetainValue::Embed(b.clone())
        }
        (None, Some(b)) => RetainValue::Embed(b.clone()),
        _ => RetainValue::Count(length),
    }
}

fn embed_retain_value(op: &Op) -> Option<&Value> {
    match op {
        Op::Retain(RetainValue::Embed(value), _) => Some(value),
        _ => None,
    }
}
