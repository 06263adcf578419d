use super::CastId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastState {
    #[default]
    Idle,
    Casting(CastId),
}

/// Per-caster slot holding at most one active cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastContext {
    pub state: CastState,
}

impl CastContext {
    pub fn current(&self) -> Option<CastId> {
        match self.state {
            CastState::Idle => None,
            CastState::Casting(id) => Some(id),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == CastState::Idle
    }

    pub fn begin(&mut self, id: CastId) {
        self.state = CastState::Casting(id);
    }

    /// Returns to idle if the slot still holds `id`.
    pub fn clear_if(&mut self, id: CastId) -> bool {
        if self.state == CastState::Casting(id) {
            self.state = CastState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_only_releases_matching_cast() {
        let mut slot = CastContext::default();
        slot.begin(CastId(1));
        assert!(!slot.clear_if(CastId(2)));
        assert_eq!(slot.current(), Some(CastId(1)));
        assert!(slot.clear_if(CastId(1)));
        assert!(slot.is_idle());
    }
}
