use super::Service;
use super::display_topology::{DisplayTopologyManager, ReconcileReason};
use super::edge_trigger::{EdgeTriggerMonitor, InputGuardState};
use super::screen_tracker::DockScreenTracker;
use crate::actor::broadcast::BroadcastSender;
use crate::actor::timer;
use crate::common::config::Settings;
use crate::geometry_engine::DockGeometry;
use crate::model::geometry::{HideState, Position, ScreenName};
use crate::model::monitor::MonitorRegistry;

/// Manages monitors and the screen hosting the dock
pub struct MonitorManager {
    pub registry: MonitorRegistry,
    pub tracker: DockScreenTracker,
    pub topology: DisplayTopologyManager,
}

/// Manages dock settings and the geometry of the last reconciliation
pub struct DockManager {
    pub settings: Settings,
    pub geometry: Option<DockGeometry>,
    pub last_layout: Option<(ScreenName, Position)>,
    pub pending_relocation: Option<Relocation>,
}

/// A move to another edge or screen, committed once the dock is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    pub position: Option<Position>,
    pub screen: Option<ScreenName>,
}

/// Manages edge triggers and input guards
pub struct InputManager {
    pub edge: EdgeTriggerMonitor,
    pub guards: InputGuardState,
    pub menu_depth: usize,
    /// The user asked for the dock (edge hit or tap) and has not left it yet.
    pub revealed: bool,
    /// Overlap decision from the dock daemon, used in smart-hide.
    pub daemon_hide: HideState,
}

/// Manages availability of the external services
#[derive(Debug, Clone, Copy)]
pub struct ServiceManager {
    pub display: bool,
    pub dock_daemon: bool,
    pub region_monitor: bool,
}

impl Default for ServiceManager {
    fn default() -> Self {
        ServiceManager {
            display: true,
            dock_daemon: true,
            region_monitor: true,
        }
    }
}

impl ServiceManager {
    pub fn is_available(&self, service: Service) -> bool {
        match service {
            Service::Display => self.display,
            Service::DockDaemon => self.dock_daemon,
            Service::RegionMonitor => self.region_monitor,
        }
    }

    /// Returns whether the availability changed.
    pub fn set(&mut self, service: Service, available: bool) -> bool {
        let slot = match service {
            Service::Display => &mut self.display,
            Service::DockDaemon => &mut self.dock_daemon,
            Service::RegionMonitor => &mut self.region_monitor,
        };
        let changed = *slot != available;
        *slot = available;
        changed
    }

    pub fn unavailable(&self) -> Vec<Service> {
        [Service::Display, Service::DockDaemon, Service::RegionMonitor]
            .into_iter()
            .filter(|s| !self.is_available(*s))
            .collect()
    }
}

/// Manages the outbound channels
pub struct CommunicationManager {
    pub signal_tx: BroadcastSender,
    pub timer_tx: timer::Sender,
}

/// Serializes reconciliation passes
pub struct PassState {
    pub in_pass: bool,
    pub queued: ReconcileReason,
}

impl Default for PassState {
    fn default() -> Self {
        PassState {
            in_pass: false,
            queued: ReconcileReason::empty(),
        }
    }
}
