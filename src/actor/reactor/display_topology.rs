use bitflags::bitflags;
use tracing::debug;

bitflags! {
    /// Why a reconciliation pass runs. Reasons raised while a pass is
    /// pending or running are or-ed together.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ReconcileReason: u32 {
        const MONITOR_ADDED     = 1 << 0;
        const MONITOR_REMOVED   = 1 << 1;
        const MONITOR_CHANGED   = 1 << 2;
        const PRIMARY_CHANGED   = 1 << 3;
        const SETTINGS_CHANGED  = 1 << 4;
        const DRAG_FINISHED     = 1 << 5;
        const SERVICE_RECOVERED = 1 << 6;
        const SCREEN_SWITCH     = 1 << 7;

        const TOPOLOGY = Self::MONITOR_ADDED.bits()
            | Self::MONITOR_REMOVED.bits()
            | Self::MONITOR_CHANGED.bits()
            | Self::PRIMARY_CHANGED.bits();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopologyState {
    #[default]
    Stable,
    /// Monitor events are arriving; the pass waits for the settle timer.
    Settling {
        epoch: u64,
        events: u32,
        reasons: ReconcileReason,
    },
}

/// Collapses bursts of display-server events into one reconciliation.
#[derive(Debug, Default, Clone)]
pub struct DisplayTopologyManager {
    state: TopologyState,
    epoch: u64,
}

impl DisplayTopologyManager {
    #[cfg(test)]
    pub(crate) fn state(&self) -> &TopologyState { &self.state }

    pub fn is_settling(&self) -> bool { matches!(self.state, TopologyState::Settling { .. }) }

    /// Records one monitor event. Returns true for the first event of a burst,
    /// which is when the settle timer has to be armed.
    pub fn note(&mut self, reason: ReconcileReason) -> bool {
        match &mut self.state {
            TopologyState::Settling { events, reasons, .. } => {
                *events += 1;
                *reasons |= reason;
                false
            }
            TopologyState::Stable => {
                self.epoch = self.epoch.wrapping_add(1);
                self.state = TopologyState::Settling {
                    epoch: self.epoch,
                    events: 1,
                    reasons: reason,
                };
                debug!(epoch = self.epoch, ?reason, "monitor burst begin");
                true
            }
        }
    }

    /// Ends the burst, handing back everything it accumulated.
    pub fn take_settled(&mut self) -> Option<ReconcileReason> {
        match std::mem::take(&mut self.state) {
            TopologyState::Settling { epoch, events, reasons } => {
                debug!(epoch, events, ?reasons, "monitor burst settled");
                Some(reasons)
            }
            TopologyState::Stable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_accumulates_reasons() {
        let mut manager = DisplayTopologyManager::default();
        assert!(manager.note(ReconcileReason::MONITOR_ADDED));
        assert!(!manager.note(ReconcileReason::PRIMARY_CHANGED));
        assert!(!manager.note(ReconcileReason::MONITOR_CHANGED));
        assert!(matches!(manager.state(), TopologyState::Settling { events: 3, .. }));

        let reasons = manager.take_settled().unwrap();
        assert!(reasons.contains(ReconcileReason::MONITOR_ADDED | ReconcileReason::PRIMARY_CHANGED));
        assert!(!manager.is_settling());
        assert_eq!(manager.take_settled(), None);
    }

    #[test]
    fn a_new_burst_gets_a_new_epoch() {
        let mut manager = DisplayTopologyManager::default();
        manager.note(ReconcileReason::MONITOR_REMOVED);
        manager.take_settled();
        assert!(manager.note(ReconcileReason::MONITOR_ADDED));
        assert!(matches!(manager.state(), TopologyState::Settling { epoch: 2, .. }));
    }
}
