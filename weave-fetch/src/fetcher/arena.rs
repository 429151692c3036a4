//! Slot storage for values moving through one traversal.

use crate::error::{FetchError, FetchResult};

/// Index of a value held by a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

/// Owns every value taking part in a fetch.
///
/// Values are placed once, rewritten in place as their relations resolve and
/// moved out at the end. A vacated slot is an engine bug and surfaces as an
/// internal error rather than a panic.
#[derive(Debug)]
pub(crate) struct SlotArena<E> {
    slots: Vec<Option<E>>,
}

impl<E> SlotArena<E> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Place a value and return its slot.
    pub(crate) fn alloc(&mut self, value: E) -> SlotId {
        self.slots.push(Some(value));
        SlotId(self.slots.len() - 1)
    }

    pub(crate) fn get(&self, slot: SlotId) -> FetchResult<&E> {
        self.slots
            .get(slot.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| vacated(slot))
    }

    /// Move a value out, leaving the slot vacated.
    pub(crate) fn take(&mut self, slot: SlotId) -> FetchResult<E> {
        self.slots
            .get_mut(slot.0)
            .and_then(Option::take)
            .ok_or_else(|| vacated(slot))
    }

    /// Rewrite a value in place.
    pub(crate) fn update(
        &mut self,
        slot: SlotId,
        f: impl FnOnce(E) -> FetchResult<E>,
    ) -> FetchResult<()> {
        let value = self.take(slot)?;
        let updated = f(value)?;
        self.slots[slot.0] = Some(updated);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

fn vacated(slot: SlotId) -> FetchError {
    FetchError::internal(format!("slot {} was read after being vacated", slot.0))
}
