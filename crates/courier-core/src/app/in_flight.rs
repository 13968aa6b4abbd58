//! In-process ownership of items that are being sent.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::ItemId;

/// Set of item ids currently owned by a send sequence.
///
/// Only guards against duplicates inside one process; overlapping dispatchers
/// in other processes may still send the same item (at-least-once).
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<ItemId>>>,
}

impl InFlight {
    /// Claims `id`, or returns `None` when another sequence already owns it.
    pub(crate) fn claim(&self, id: ItemId) -> Option<InFlightClaim> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id) {
            return None;
        }
        Some(InFlightClaim {
            ids: Arc::clone(&self.ids),
            id,
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Releases ownership on drop.
#[derive(Debug)]
pub(crate) struct InFlightClaim {
    ids: Arc<Mutex<HashSet<ItemId>>>,
    id: ItemId,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn second_claim_fails_until_first_is_dropped() {
        let in_flight = InFlight::default();
        let id = ItemId::from_ulid(Ulid::new());

        let first = in_flight.claim(id);
        assert!(first.is_some());
        assert!(in_flight.claim(id).is_none());
        assert_eq!(in_flight.len(), 1);

        drop(first);
        assert_eq!(in_flight.len(), 0);
        assert!(in_flight.claim(id).is_some());
    }

    #[test]
    fn distinct_items_do_not_block_each_other() {
        let in_flight = InFlight::default();

        let a = in_flight.claim(ItemId::from_ulid(Ulid::new()));
        let b = in_flight.claim(ItemId::from_ulid(Ulid::new()));

        assert!(a.is_some() && b.is_some());
        assert_eq!(in_flight.len(), 2);
    }
}
