use std::time::Duration;

use tracing::{debug, trace};

use crate::actor::reactor::display_topology::ReconcileReason;
use crate::actor::reactor::scheduler::TaskKind;
use crate::actor::reactor::{Reactor, ReactorError};
use crate::model::monitor::{Monitor, MonitorChange};

pub struct MonitorEventHandler;

impl MonitorEventHandler {
    pub fn handle_monitor_added(reactor: &mut Reactor, monitor: Monitor) -> Result<(), ReactorError> {
        let name = monitor.name.clone();
        let primary = monitor.primary;
        if !reactor.monitor_manager.registry.add(monitor) {
            trace!(%name, "monitor already known");
            return Ok(());
        }
        if primary {
            reactor.monitor_manager.tracker.set_primary(&name);
        }
        Self::note_change(reactor, ReconcileReason::MONITOR_ADDED);
        Ok(())
    }

    pub fn handle_monitor_removed(reactor: &mut Reactor, name: &str) -> Result<(), ReactorError> {
        reactor.monitor_manager.registry.remove(name)?;
        Self::note_change(reactor, ReconcileReason::MONITOR_REMOVED);
        Ok(())
    }

    pub fn handle_monitor_changed(
        reactor: &mut Reactor,
        name: &str,
        change: MonitorChange,
    ) -> Result<(), ReactorError> {
        if reactor.monitor_manager.registry.update(name, change)? {
            Self::note_change(reactor, ReconcileReason::MONITOR_CHANGED);
        }
        Ok(())
    }

    pub fn handle_monitors_snapshot(
        reactor: &mut Reactor,
        monitors: Vec<Monitor>,
    ) -> Result<(), ReactorError> {
        if let Some(primary) = monitors.iter().find(|m| m.primary) {
            reactor.monitor_manager.tracker.set_primary(&primary.name);
        }
        if reactor.monitor_manager.registry.replace_all(monitors) {
            Self::note_change(reactor, ReconcileReason::TOPOLOGY);
        }
        Ok(())
    }

    pub fn handle_primary_changed(reactor: &mut Reactor, name: &str) -> Result<(), ReactorError> {
        reactor.monitor_manager.tracker.set_primary(name);
        if reactor.monitor_manager.registry.set_primary(name) {
            Self::note_change(reactor, ReconcileReason::PRIMARY_CHANGED);
        }
        Ok(())
    }

    /// The settle timer fired; the burst is over.
    pub fn handle_settled(reactor: &mut Reactor) -> Result<(), ReactorError> {
        if let Some(reasons) = reactor.monitor_manager.topology.take_settled() {
            reactor.reconcile(reasons);
        }
        Ok(())
    }

    fn note_change(reactor: &mut Reactor, reason: ReconcileReason) {
        let settle_ms = reactor.dock_manager.settings.monitor_settle_ms;
        if settle_ms == 0 {
            reactor.reconcile(reason);
            return;
        }
        if reactor.monitor_manager.topology.note(reason) {
            debug!(settle_ms, "waiting for monitor events to settle");
            reactor.schedule(TaskKind::Reconcile, Duration::from_millis(settle_ms));
        }
    }
}
