//! Sequential composition of change scripts.

use super::Delta;
use crate::attributes;
use crate::embed;
use crate::error::DeltaError;
use crate::op::{InsertValue, Op, RetainValue};
use crate::op_iterator::{OpIterator, OpType};

impl Delta {
    /// Returns a script equivalent to applying `self` and then `other`.
    ///
    /// Attribute maps on aligned slices merge with null-as-unset semantics;
    /// aligned structured embeds of the same type are merged by the handler
    /// registered for it. Fails when an embed pair has no registered handler
    /// or mismatched types.
    pub fn compose(&self, other: &Delta) -> Result<Delta, DeltaError> {
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());
        let mut delta = Delta::new();

        // Whole inserts covered by a leading bare retain pass through as-is.
        if let Some(Op::Retain(RetainValue::Count(first_retain), None)) = other_iter.peek() {
            let first_retain = *first_retain;
            let mut first_left = first_retain;
            while this_iter.peek_type() == OpType::Insert && this_iter.peek_length() <= first_left
            {
                first_left -= this_iter.peek_length();
                delta.ops.push(this_iter.next_op());
            }
            if first_retain - first_left > 0 {
                other_iter.next_len(first_retain - first_left);
            }
        }

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_type() == OpType::Insert {
                delta.push(other_iter.next_op());
            } else if this_iter.peek_type() == OpType::Delete {
                delta.push(this_iter.next_op());
            } else {
                let length = this_iter.peek_length().min(other_iter.peek_length());
                let this_op = this_iter.next_len(length);
                let other_op = other_iter.next_len(length);
                match other_op {
                    Op::Retain(other_retain, other_attributes) => {
                        let keep_null =
                            matches!(this_op, Op::Retain(RetainValue::Count(_), _));
                        let attributes = attributes::compose(
                            this_op.attributes(),
                            other_attributes.as_ref(),
                            keep_null,
                        );
                        let new_op = composed_over_retain(this_op, other_retain, length, attributes)?;
                        let probe = new_op.clone();
                        delta.push(new_op);
                        // If the rest of `other` is exhausted the remainder of
                        // `self` passes through untouched.
                        if !other_iter.has_next() && delta.ops.last() == Some(&probe) {
                            let rest = Delta::from(this_iter.rest());
                            let mut out = delta.concat(&rest);
                            out.chop();
                            return Ok(out);
                        }
                    }
                    Op::Delete(length) => {
                        // Deleting what `self` retained survives; deleting
                        // what `self` inserted cancels both out.
                        if this_op.is_retain() {
                            delta.push(Op::Delete(length));
                        }
                    }
                    // `other`'s inserts were drained before aligning.
                    Op::Insert(..) => {}
                }
            }
        }

        delta.chop();
        Ok(delta)
    }
}

/// The operation produced when a slice of `self` is covered by a retain of
/// `other`. An integer retain keeps the covered content in place; an embed
/// retain updates the embedded object it lands on.
fn composed_over_retain(
    this_op: Op,
    other_retain: RetainValue,
    length: usize,
    attributes: Option<crate::attributes::AttributeMap>,
) -> Result<Op, DeltaError> {
    match (this_op, other_retain) {
        (Op::Retain(RetainValue::Count(_), _), RetainValue::Count(_)) => {
            Ok(Op::Retain(RetainValue::Count(length), attributes))
        }
        (Op::Retain(RetainValue::Count(_), _), RetainValue::Embed(value)) => {
            Ok(Op::Retain(RetainValue::Embed(value), attributes))
        }
        (Op::Insert(content, _), RetainValue::Count(_)) => {
            Ok(Op::Insert(content, attributes))
        }
        // An embed retain over a plain advance keeps the structured update
        // without consulting the handler.
        (Op::Retain(RetainValue::Embed(value), _), RetainValue::Count(_)) => {
            Ok(Op::Retain(RetainValue::Embed(value), attributes))
        }
        (Op::Insert(InsertValue::Embed(a), _), RetainValue::Embed(b)) => {
            let (embed_type, a_data, b_data) = embed::embed_type_and_data(&a, &b)?;
            let handler = embed::handler(embed_type)?;
            let composed = handler.compose(a_data, b_data, false);
            Ok(Op::Insert(
                InsertValue::Embed(embed::wrap(embed_type, composed)),
                attributes,
            ))
        }
        (Op::Retain(RetainValue::Embed(a), _), RetainValue::Embed(b)) => {
            let (embed_type, a_data, b_data) = embed::embed_type_and_data(&a, &b)?;
            let handler = embed::handler(embed_type)?;
            let composed = handler.compose(a_data, b_data, true);
            Ok(Op::Retain(
                RetainValue::Embed(embed::wrap(embed_type, composed)),
                attributes,
            ))
        }
        // A text slice cannot receive a structured update.
        (Op::Insert(InsertValue::Text(_), _), RetainValue::Embed(_)) => {
            Err(DeltaError::CannotRetainNonObject)
        }
        // Deletes were drained before aligning; a delete slice passes through.
        (Op::Delete(_), _) => Ok(Op::Delete(length)),
    }
}
