//! Differencing of two documents into a change script.

use super::Delta;
use crate::attributes;
use crate::error::{DeltaError, DiffSide};
use crate::op::{InsertValue, Op};
use crate::op_iterator::OpIterator;
use crate::text_diff;
use similar::ChangeTag;

/// Stand-in character for a structured embed in the diffed text.
const EMBED_PLACEHOLDER: char = '\0';

impl Delta {
    /// Returns the change that edits the document `self` into the document
    /// `other`: `self.compose(&self.diff(&other, None)?)` yields `other`.
    ///
    /// `cursor`, when known, is the caret position in `other` after the edit
    /// and lets the common typing case skip the full diff. Fails with
    /// [`DeltaError::NotADocument`] when either script contains a non-insert
    /// operation.
    pub fn diff(&self, other: &Delta, cursor: Option<usize>) -> Result<Delta, DeltaError> {
        let this_text = document_text(self, DiffSide::Left)?;
        let other_text = document_text(other, DiffSide::Right)?;
        if self.ops == other.ops {
            return Ok(Delta::new());
        }

        let mut delta = Delta::new();
        let mut this_iter = OpIterator::new(self.ops());
        let mut other_iter = OpIterator::new(other.ops());
        for (tag, segment) in text_diff::diff(&this_text, &other_text, cursor) {
            let mut length = segment.chars().count();
            while length > 0 {
                let op_length;
                match tag {
                    ChangeTag::Insert => {
                        op_length = length.min(other_iter.peek_length());
                        delta.push(other_iter.next_len(op_length));
                    }
                    ChangeTag::Delete => {
                        op_length = length.min(this_iter.peek_length());
                        this_iter.next_len(op_length);
                        delta.delete(op_length);
                    }
                    ChangeTag::Equal => {
                        op_length = length
                            .min(this_iter.peek_length())
                            .min(other_iter.peek_length());
                        let this_op = this_iter.next_len(op_length);
                        let other_op = other_iter.next_len(op_length);
                        if same_insert(&this_op, &other_op) {
                            delta.retain(
                                op_length,
                                attributes::diff(this_op.attributes(), other_op.attributes()),
                            );
                        } else {
                            // Two different embeds behind the same placeholder.
                            delta.push(other_op);
                            delta.delete(op_length);
                        }
                    }
                }
                length -= op_length;
            }
        }
        delta.chop();
        Ok(delta)
    }
}

fn same_insert(a: &Op, b: &Op) -> bool {
    match (a, b) {
        (Op::Insert(a, _), Op::Insert(b, _)) => a == b,
        _ => false,
    }
}

fn document_text(delta: &Delta, side: DiffSide) -> Result<String, DeltaError> {
    let mut text = String::with_capacity(delta.length());
    for op in delta.ops() {
        match op {
            Op::Insert(InsertValue::Text(run), _) => text.push_str(run),
            Op::Insert(InsertValue::Embed(_), _) => text.push(EMBED_PLACEHOLDER),
            _ => return Err(DeltaError::NotADocument(side)),
        }
    }
    Ok(text)
}
