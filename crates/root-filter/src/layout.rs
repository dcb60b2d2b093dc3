//! Layout walker: step through an object payload field by field.
//!
//! Given the class layout from the streamer registry, [`advance_to`] moves
//! the cursor from one named field to the start of another, skipping every
//! field in between according to its storage form. Counter values met on
//! the way are kept so that later variable-length arrays can be sized.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::RBuffer;
use crate::streamer::{FieldKind, StreamerInfo};

/// Counter values read while walking one object.
#[derive(Debug, Clone, Default)]
pub struct CounterCache {
    values: HashMap<String, i32>,
}

impl CounterCache {
    /// Last value read for counter `name`, 0 if it was never read.
    pub fn get(&self, name: &str) -> usize {
        self.values.get(name).copied().unwrap_or(0).max(0) as usize
    }

    fn set(&mut self, name: &str, value: i32) {
        self.values.insert(name.to_string(), value);
    }
}

/// Move `r` from just after field `current` to the start of field `target`.
///
/// An empty `current` means the cursor sits at the first field. Returns
/// `Ok(false)` when `target` is not found after `current`; the cursor is
/// then wherever the walk stopped. A pointer target is left at its heap
/// flag byte.
pub fn advance_to(
    r: &mut RBuffer,
    fields: &[StreamerInfo],
    current: &str,
    target: &str,
    counters: &mut CounterCache,
) -> Result<bool> {
    let start = if current.is_empty() {
        0
    } else {
        match fields.iter().position(|f| f.name == current || f.name == target) {
            Some(i) if fields[i].name == current => i + 1,
            _ => return Ok(false),
        }
    };

    for field in &fields[start..] {
        if field.name == target {
            return Ok(true);
        }
        match &field.kind {
            FieldKind::Object => r.skip_objects(1)?,
            FieldKind::Counter => {
                let value = r.read::<i32>()?;
                counters.set(&field.name, value);
            }
            FieldKind::Pointer { size, counter } => {
                let n = counter.as_deref().map_or(1, |c| counters.get(c));
                r.skip(size * n + 1)?;
            }
            FieldKind::Scalar { size } => r.skip(*size)?,
        }
    }
    Ok(false)
}

/// [`advance_to`], failing when `target` cannot be reached.
pub fn seek_field(
    r: &mut RBuffer,
    fields: &[StreamerInfo],
    current: &str,
    target: &str,
    counters: &mut CounterCache,
) -> Result<()> {
    if advance_to(r, fields, current, target, counters)? {
        Ok(())
    } else {
        Err(RootError::Deserialization(format!(
            "field '{}' not found after '{}'",
            target, current
        )))
    }
}
