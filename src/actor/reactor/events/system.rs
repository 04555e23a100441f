use std::time::Duration;

use tracing::{debug, info, warn};

use crate::actor::broadcast::DockSignal;
use crate::actor::reactor::display_topology::ReconcileReason;
use crate::actor::reactor::scheduler::TaskKind;
use crate::actor::reactor::{Reactor, ReactorError, Service};
use crate::model::geometry::{HideMode, HideState};

pub const SERVICE_PROBE_INTERVAL: Duration = Duration::from_secs(1);

pub struct SystemEventHandler;

impl SystemEventHandler {
    pub fn handle_menu_opened(reactor: &mut Reactor) -> Result<(), ReactorError> {
        reactor.input_manager.menu_depth = reactor.input_manager.menu_depth.saturating_add(1);
        reactor.input_manager.guards.menu_open = true;
        debug!(depth = reactor.input_manager.menu_depth, "menu opened");
        Ok(())
    }

    pub fn handle_menu_closed(reactor: &mut Reactor) -> Result<(), ReactorError> {
        if reactor.input_manager.menu_depth == 0 {
            debug!("menu closed with zero depth");
            return Ok(());
        }
        reactor.input_manager.menu_depth -= 1;
        if reactor.input_manager.menu_depth == 0 {
            reactor.input_manager.guards.menu_open = false;
            reactor.update_visibility();
        }
        Ok(())
    }

    pub fn handle_daemon_hide_state(
        reactor: &mut Reactor,
        state: HideState,
    ) -> Result<(), ReactorError> {
        reactor.input_manager.daemon_hide = state;
        if reactor.dock_manager.settings.hide_mode == HideMode::SmartHide {
            reactor.update_visibility();
        }
        Ok(())
    }

    pub fn handle_service_availability(
        reactor: &mut Reactor,
        service: Service,
        available: bool,
    ) -> Result<(), ReactorError> {
        if !reactor.service_manager.set(service, available) {
            return Ok(());
        }

        if !available {
            warn!(?service, "service unavailable, its signals are dropped until it returns");
            if !reactor.scheduler.is_armed(TaskKind::ServiceProbe) {
                reactor.schedule(TaskKind::ServiceProbe, SERVICE_PROBE_INTERVAL);
            }
            return Ok(());
        }

        info!(?service, "service available again");
        if reactor.service_manager.unavailable().is_empty() {
            reactor.scheduler.cancel(TaskKind::ServiceProbe);
        }
        match service {
            Service::Display => reactor.emit(DockSignal::ResyncMonitors),
            Service::DockDaemon | Service::RegionMonitor => {
                reactor.reconcile(ReconcileReason::SERVICE_RECOVERED)
            }
        }
        Ok(())
    }

    pub fn handle_service_probe(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let down = reactor.service_manager.unavailable();
        if down.is_empty() {
            return Ok(());
        }
        for service in down {
            reactor.emit(DockSignal::ProbeService { service });
        }
        reactor.schedule(TaskKind::ServiceProbe, SERVICE_PROBE_INTERVAL);
        Ok(())
    }
}
