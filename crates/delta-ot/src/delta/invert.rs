//! Inversion of a change against the document it was applied to.

use super::Delta;
use crate::attributes;
use crate::embed;
use crate::error::DeltaError;
use crate::op::{InsertValue, Op, RetainValue};

impl Delta {
    /// Returns the change that undoes `self`, given the document `base` it
    /// was applied to: `base.compose(self)?.compose(self.invert(base)?)`
    /// yields `base` again.
    pub fn invert(&self, base: &Delta) -> Result<Delta, DeltaError> {
        let mut inverted = Delta::new();
        let mut base_index = 0usize;
        for op in self.ops() {
            match op {
                Op::Insert(..) => {
                    inverted.delete(op.length());
                }
                Op::Retain(RetainValue::Count(length), None) => {
                    inverted.retain(*length, None);
                    base_index += length;
                }
                Op::Delete(length) | Op::Retain(RetainValue::Count(length), Some(_)) => {
                    let length = *length;
                    let slice = base.slice(base_index, base_index + length);
                    for base_op in slice.ops() {
                        match op {
                            Op::Delete(_) => {
                                // Restore what was removed.
                                inverted.push(base_op.clone());
                            }
                            Op::Retain(_, attributes) => {
                                inverted.retain(
                                    base_op.length(),
                                    attributes::invert(
                                        attributes.as_ref(),
                                        base_op.attributes(),
                                    ),
                                );
                            }
                            Op::Insert(..) => {}
                        }
                    }
                    base_index += length;
                }
                Op::Retain(RetainValue::Embed(retain_value), attributes) => {
                    let slice = base.slice(base_index, base_index + 1);
                    let base_op = slice.ops().first();
                    let (embed_type, op_data, base_data) = match base_op {
                        Some(Op::Insert(InsertValue::Embed(base_value), _)) => {
                            embed::embed_type_and_data(retain_value, base_value)?
                        }
                        _ => return Err(DeltaError::CannotRetainNonObject),
                    };
                    let handler = embed::handler(embed_type)?;
                    let undone = embed::wrap(embed_type, handler.invert(op_data, base_data));
                    let base_attributes = base_op.and_then(Op::attributes);
                    inverted.retain(
                        undone,
                        attributes::invert(attributes.as_ref(), base_attributes),
                    );
                    base_index += 1;
                }
            }
        }
        inverted.chop();
        Ok(inverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use serde_json::{json, Value};

    fn attrs(value: Value) -> Option<AttributeMap> {
        value.as_object().cloned()
    }

    fn doc(ops: Vec<Op>) -> Delta {
        Delta::from(ops)
    }

    fn round_trips(base: &Delta, change: &Delta) {
        let applied = base.compose(change).unwrap();
        let inverted = change.invert(base).unwrap();
        assert_eq!(
            applied.compose(&inverted).unwrap(),
            *base,
            "undo failed for {change:?} on {base:?}"
        );
    }

    #[test]
    fn insert_inverts_to_delete() {
        let base = doc(vec![Op::insert("Hello", None)]);
        let mut change = Delta::new();
        change.retain(2usize, None).insert("XY", None);
        let inverted = change.invert(&base).unwrap();
        assert_eq!(
            inverted.ops(),
            &[Op::retain(2usize, None), Op::delete(2)]
        );
        round_trips(&base, &change);
    }

    #[test]
    fn delete_inverts_to_reinsert() {
        let base = doc(vec![Op::insert("Hello", attrs(json!({"bold": true})))]);
        let mut change = Delta::new();
        change.retain(1usize, None).delete(3);
        let inverted = change.invert(&base).unwrap();
        assert_eq!(
            inverted.ops(),
            &[
                Op::retain(1usize, None),
                Op::insert("ell", attrs(json!({"bold": true}))),
            ]
        );
        round_trips(&base, &change);
    }

    #[test]
    fn attributed_retain_inverts_attributes() {
        let base = doc(vec![Op::insert("Hello", attrs(json!({"bold": true})))]);
        let mut change = Delta::new();
        change.retain(5usize, attrs(json!({"bold": null, "italic": true})));
        let inverted = change.invert(&base).unwrap();
        assert_eq!(
            inverted.ops(),
            &[Op::retain(
                5usize,
                attrs(json!({"bold": true, "italic": null}))
            )]
        );
        round_trips(&base, &change);
    }

    #[test]
    fn bare_retain_inverts_to_bare_retain() {
        let base = doc(vec![Op::insert("Hello", None)]);
        let mut change = Delta::new();
        change.retain(4usize, None).insert("!", None);
        round_trips(&base, &change);
    }

    #[test]
    fn delete_spanning_mixed_base_ops() {
        let base = doc(vec![
            Op::insert("ab", None),
            Op::insert(json!({"image": "x"}), None),
            Op::insert("cd", attrs(json!({"bold": true}))),
        ]);
        let mut change = Delta::new();
        change.retain(1usize, None).delete(3);
        let inverted = change.invert(&base).unwrap();
        assert_eq!(
            inverted.ops(),
            &[
                Op::retain(1usize, None),
                Op::insert("b", None),
                Op::insert(json!({"image": "x"}), None),
                Op::insert("c", attrs(json!({"bold": true}))),
            ]
        );
        round_trips(&base, &change);
    }

    #[test]
    fn embed_retain_invert_requires_handler() {
        let base = doc(vec![Op::insert(json!({"invert-missing": {"v": 1}}), None)]);
        let mut change = Delta::new();
        change.retain(json!({"invert-missing": {"v": 2}}), None);
        assert_eq!(
            change.invert(&base).unwrap_err(),
            DeltaError::UnknownEmbedType("invert-missing".to_string())
        );
    }

    #[test]
    fn embed_retain_against_text_base_fails() {
        let base = doc(vec![Op::insert("ab", None)]);
        let mut change = Delta::new();
        change.retain(json!({"poll": {"v": 1}}), None);
        assert_eq!(
            change.invert(&base).unwrap_err(),
            DeltaError::CannotRetainNonObject
        );
    }
}
