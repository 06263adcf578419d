use crate::cast::CastId;

/// Notifications a unit raises towards casts that watch it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitSignal {
    Moved,
    Killed,
    Despawned,
}

/// Typed subscription lists owned by the observed unit.
///
/// Casts subscribe by id and must unsubscribe on every teardown path; a
/// signal delivered to a cast id that no longer exists is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitListeners {
    moved: Vec<CastId>,
    killed: Vec<CastId>,
    despawned: Vec<CastId>,
}

impl UnitListeners {
    fn list(&self, signal: UnitSignal) -> &Vec<CastId> {
        match signal {
            UnitSignal::Moved => &self.moved,
            UnitSignal::Killed => &self.killed,
            UnitSignal::Despawned => &self.despawned,
        }
    }

    fn list_mut(&mut self, signal: UnitSignal) -> &mut Vec<CastId> {
        match signal {
            UnitSignal::Moved => &mut self.moved,
            UnitSignal::Killed => &mut self.killed,
            UnitSignal::Despawned => &mut self.despawned,
        }
    }

    pub fn subscribe(&mut self, signal: UnitSignal, cast: CastId) {
        let list = self.list_mut(signal);
        if !list.contains(&cast) {
            list.push(cast);
        }
    }

    pub fn unsubscribe(&mut self, signal: UnitSignal, cast: CastId) {
        self.list_mut(signal).retain(|c| *c != cast);
    }

    pub fn unsubscribe_all(&mut self, cast: CastId) {
        self.moved.retain(|c| *c != cast);
        self.killed.retain(|c| *c != cast);
        self.despawned.retain(|c| *c != cast);
    }

    /// Snapshot of the subscribers; delivery may unsubscribe during iteration.
    pub fn subscribers(&self, signal: UnitSignal) -> Vec<CastId> {
        self.list(signal).clone()
    }

    pub fn is_subscribed(&self, signal: UnitSignal, cast: CastId) -> bool {
        self.list(signal).contains(&cast)
    }

    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.killed.is_empty() && self.despawned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsubscribe_all_clears_every_list() {
        let mut listeners = UnitListeners::default();
        listeners.subscribe(UnitSignal::Moved, CastId(1));
        listeners.subscribe(UnitSignal::Moved, CastId(1));
        listeners.subscribe(UnitSignal::Killed, CastId(1));
        listeners.subscribe(UnitSignal::Despawned, CastId(2));
        assert_eq!(listeners.subscribers(UnitSignal::Moved), vec![CastId(1)]);

        listeners.unsubscribe_all(CastId(1));
        assert!(!listeners.is_subscribed(UnitSignal::Killed, CastId(1)));
        assert!(listeners.is_subscribed(UnitSignal::Despawned, CastId(2)));
        listeners.unsubscribe(UnitSignal::Despawned, CastId(2));
        assert!(listeners.is_empty());
    }
}
