//! Cursor stepping that skips discarded samples.
//!
//! Both helpers take the discard check as a closure so they can be driven by
//! the correction store in a session and by plain vectors in tests.

use crate::error::Result;

/// First index at or after `start` that is not discarded.
///
/// Returns `None` when the list is exhausted. Probes at most
/// `size - start + 1` indices; indices at or past `size` are never probed.
pub fn seek_forward<F>(start: usize, size: usize, mut is_discarded: F) -> Result<Option<usize>>
where
    F: FnMut(usize) -> Result<bool>,
{
    let mut index = start;
    while index < size && is_discarded(index)? {
        index += 1;
    }
    Ok((index < size).then_some(index))
}

/// Step back from `from` over discarded samples.
///
/// Returns `None` when `from` is already 0. Index 0 is always accepted, even
/// when discarded, so stepping back always terminates.
pub fn seek_backward<F>(from: usize, mut is_discarded: F) -> Result<Option<usize>>
where
    F: FnMut(usize) -> Result<bool>,
{
    if from == 0 {
        return Ok(None);
    }
    let mut index = from - 1;
    while index > 0 && is_discarded(index)? {
        index -= 1;
    }
    Ok(Some(index))
}
