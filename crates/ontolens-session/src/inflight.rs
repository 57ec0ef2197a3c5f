//! Per-relation action bookkeeping

use crate::error::SessionError;
use ontolens_domain::RelationId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of relation ids with an action currently running
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<RelationId>>>,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashSet<RelationId>> {
        // A panic while holding the lock cannot leave the set inconsistent
        self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `id`, failing if it is already claimed
    pub(crate) fn acquire(&self, id: &RelationId) -> Result<InFlightGuard, SessionError> {
        if !self.lock().insert(id.clone()) {
            return Err(SessionError::ActionInFlight(id.clone()));
        }
        Ok(InFlightGuard {
            set: self.clone(),
            id: id.clone(),
        })
    }

    pub(crate) fn contains(&self, id: &RelationId) -> bool {
        self.lock().contains(id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Releases its relation id when dropped
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    set: InFlight,
    id: RelationId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}
