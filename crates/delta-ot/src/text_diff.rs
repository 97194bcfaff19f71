//! Char-level string diff used by document differencing.
//!
//! The diff algorithm itself is delegated to the `similar` crate (Myers);
//! its output is remapped back to slices of the input strings and coalesced
//! into a normalized insert/delete/equal edit script. All segment lengths are
//! in Unicode scalar values.
//!
//! When the caller knows the caret position in the destination string, the
//! common single-contiguous-edit case (one typed or deleted run right before
//! the caret) is answered directly without running the full diff.

use similar::{utils::TextDiffRemapper, Algorithm, ChangeTag, TextDiff};

pub(crate) type EditScript = Vec<(ChangeTag, String)>;

pub(crate) fn diff(src: &str, dst: &str, cursor: Option<usize>) -> EditScript {
    if let Some(caret) = cursor {
        if let Some(patch) = diff_around_caret(src, dst, caret) {
            return patch;
        }
    }
    if src == dst {
        return if src.is_empty() {
            Vec::new()
        } else {
            vec![(ChangeTag::Equal, src.to_string())]
        };
    }
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(src, dst);
    let remapper = TextDiffRemapper::from_text_diff(&diff, src, dst);
    let patch = diff
        .ops()
        .iter()
        .flat_map(|op| remapper.iter_slices(op))
        .map(|(tag, text)| (tag, text.to_string()))
        .collect();
    normalize(patch)
}

/// Merge consecutive segments of the same tag; drop empty segments.
fn normalize(patch: EditScript) -> EditScript {
    let mut result: EditScript = Vec::with_capacity(patch.len());
    for (tag, text) in patch {
        if text.is_empty() {
            continue;
        }
        match result.last_mut() {
            Some(last) if last.0 == tag => last.1.push_str(&text),
            _ => result.push((tag, text)),
        }
    }
    result
}

/// Shortcut for a single contiguous insertion or deletion ending at `caret`
/// (a char position in `dst`). Returns `None` when the strings do not have
/// that shape and the full diff must run.
fn diff_around_caret(src: &str, dst: &str, caret: usize) -> Option<EditScript> {
    let src_chars: Vec<char> = src.chars().collect();
    let dst_chars: Vec<char> = dst.chars().collect();
    let src_len = src_chars.len();
    let dst_len = dst_chars.len();
    if src_len == dst_len || caret > dst_len {
        return None;
    }
    let dst_sfx = &dst_chars[caret..];
    let sfx_len = dst_sfx.len();
    if sfx_len > src_len || src_chars[src_len - sfx_len..] != *dst_sfx {
        return None;
    }

    let mut patch = EditScript::new();
    if dst_len > src_len {
        let pfx_len = src_len - sfx_len;
        if pfx_len > caret || src_chars[..pfx_len] != dst_chars[..pfx_len] {
            return None;
        }
        push_segment(&mut patch, ChangeTag::Equal, &dst_chars[..pfx_len]);
        push_segment(&mut patch, ChangeTag::Insert, &dst_chars[pfx_len..caret]);
    } else {
        let pfx_len = dst_len - sfx_len;
        if src_chars[..pfx_len] != dst_chars[..pfx_len] {
            return None;
        }
        push_segment(&mut patch, ChangeTag::Equal, &dst_chars[..pfx_len]);
        push_segment(&mut patch, ChangeTag::Delete, &src_chars[pfx_len..src_len - sfx_len]);
    }
    push_segment(&mut patch, ChangeTag::Equal, dst_sfx);
    Some(patch)
}

fn push_segment(patch: &mut EditScript, tag: ChangeTag, chars: &[char]) {
    if !chars.is_empty() {
        patch.push((tag, chars.iter().collect()));
    }
}
