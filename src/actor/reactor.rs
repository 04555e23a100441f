//! The Reactor's job is to keep the dock coherent with the monitors, the
//! settings and the user's input.
//!
//! It takes events from the collaborators one at a time and runs
//! reconciliation passes that recompute, in a fixed order, the host screen,
//! the dock geometry, the hot regions and the animation targets. Only then
//! does it publish signals, so nothing downstream ever sees a half-updated
//! picture.

pub mod animation;
pub mod display_topology;
pub mod edge_trigger;
mod error;
mod events;
mod managers;
mod replay;
pub mod scheduler;
pub mod screen_tracker;

#[cfg(test)]
mod testing;

use std::mem;
use std::time::Duration;

use animation::{AnimationController, AnimationRequest};
use display_topology::{DisplayTopologyManager, ReconcileReason};
use edge_trigger::{EdgeTriggerMonitor, InputGuardState, RegionKey};
pub use error::ReactorError;
use events::drag::DragEventHandler;
use events::input::InputEventHandler;
use events::monitor::MonitorEventHandler;
use events::settings::SettingsEventHandler;
use events::system::SystemEventHandler;
use managers::{
    CommunicationManager, DockManager, InputManager, MonitorManager, PassState, Relocation,
    ServiceManager,
};
pub use replay::{Record, Simulation, replay};
use scheduler::{Scheduler, TaskKind, TaskToken};
use screen_tracker::DockScreenTracker;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, trace, warn};

use crate::actor::broadcast::{BroadcastSender, DockSignal};
use crate::actor::{self, timer};
use crate::common::config::Config;
use crate::common::log;
use crate::geometry_engine::{DockGeometry, GeometryEngine, HotRegion};
use crate::model::geometry::{HideMode, HideState, Point, ScreenName};
use crate::model::monitor::{Monitor, MonitorChange, MonitorRegistry};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// External services the reactor talks to. Each can disappear and come back.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Display,
    DockDaemon,
    RegionMonitor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A monitor was connected. Also sent for every monitor on startup.
    MonitorAdded(Monitor),
    MonitorRemoved(ScreenName),
    /// Geometry, rotation, enablement or scale of one monitor changed.
    MonitorChanged {
        name: ScreenName,
        change: MonitorChange,
    },
    /// The full monitor set, sent by the display service after a resync.
    MonitorsSnapshot(Vec<Monitor>),
    PrimaryChanged(ScreenName),

    /// One flat key/value pair changed in the settings store.
    SettingChanged {
        key: String,
        value: String,
    },
    /// The config file was edited and reloaded.
    ConfigUpdated(Config),

    /// Pointer motion inside a registered region, raw global coordinates.
    PointerMoved {
        x: i32,
        y: i32,
        key: RegionKey,
    },
    PointerLeft {
        key: RegionKey,
    },
    ButtonPressed,
    ButtonReleased,
    TouchPressed {
        x: i32,
        y: i32,
        key: RegionKey,
    },
    TouchReleased {
        x: i32,
        y: i32,
        key: RegionKey,
    },

    /// The user grabbed the dock's resize handle.
    DragStarted,
    /// Thickness while dragging, logical pixels for the current display mode.
    DockSizeChanged {
        size: u32,
    },
    DragFinished,

    MenuOpened,
    MenuClosed,

    /// Smart-hide decision from the dock daemon (does a window overlap?).
    DaemonHideState(HideState),
    ServiceAvailability {
        service: Service,
        available: bool,
    },

    TimerFired(TaskToken),
}

pub struct Reactor {
    monitor_manager: MonitorManager,
    dock_manager: DockManager,
    input_manager: InputManager,
    animation: AnimationController,
    service_manager: ServiceManager,
    scheduler: Scheduler,
    communication_manager: CommunicationManager,
    record: Record,
    pass: PassState,
}

impl Reactor {
    pub fn new(
        config: Config,
        mut record: Record,
        signal_tx: BroadcastSender,
        timer_tx: timer::Sender,
    ) -> Reactor {
        record.start(&config);
        let settings = config.settings;
        Reactor {
            monitor_manager: MonitorManager {
                registry: MonitorRegistry::new(),
                tracker: DockScreenTracker::new(),
                topology: DisplayTopologyManager::default(),
            },
            animation: AnimationController::new(&settings.animation),
            dock_manager: DockManager {
                settings,
                geometry: None,
                last_layout: None,
                pending_relocation: None,
            },
            input_manager: InputManager {
                edge: EdgeTriggerMonitor::new(),
                guards: InputGuardState::default(),
                menu_depth: 0,
                revealed: false,
                daemon_hide: HideState::Shown,
            },
            service_manager: ServiceManager::default(),
            scheduler: Scheduler::new(),
            communication_manager: CommunicationManager { signal_tx, timer_tx },
            record,
            pass: PassState::default(),
        }
    }

    /// Handles events until `shutdown` fires, then drains whatever is still
    /// queued.
    pub async fn run(mut self, mut events: Receiver, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                Some((span, event)) = events.recv() => {
                    let _guard = span.enter();
                    self.handle_event(event);
                }
                _ = &mut shutdown => {
                    while let Ok((span, event)) = events.try_recv() {
                        let _guard = span.enter();
                        self.handle_event(event);
                    }
                    break;
                }
                else => break,
            }
        }
        self.finish();
        debug!("reactor stopped");
    }

    /// Completes what the stopped timers would have: a pending monitor burst
    /// settles and an animation in flight runs to its end. Delayed reveals
    /// are dropped.
    fn finish(&mut self) {
        if let Some(reasons) = self.monitor_manager.topology.take_settled() {
            debug!(?reasons, "settling monitor burst at shutdown");
            self.reconcile(reasons);
        }
        while self.animation.is_animating() && self.monitor_manager.tracker.has_host() {
            self.step_animation();
        }
        self.scheduler.cancel(TaskKind::AnimationFrame);
        self.scheduler.cancel(TaskKind::Reconcile);
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::PointerMoved { .. } | Event::TimerFired(..) | Event::DockSizeChanged { .. } => {
                trace!(?event, "Event")
            }
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        self.record.on_event(&event);

        let result = match event {
            Event::MonitorAdded(monitor) => MonitorEventHandler::handle_monitor_added(self, monitor),
            Event::MonitorRemoved(name) => MonitorEventHandler::handle_monitor_removed(self, &name),
            Event::MonitorChanged { name, change } => {
                MonitorEventHandler::handle_monitor_changed(self, &name, change)
            }
            Event::MonitorsSnapshot(monitors) => {
                MonitorEventHandler::handle_monitors_snapshot(self, monitors)
            }
            Event::PrimaryChanged(name) => MonitorEventHandler::handle_primary_changed(self, &name),
            Event::SettingChanged { key, value } => {
                SettingsEventHandler::handle_setting_changed(self, &key, &value)
            }
            Event::ConfigUpdated(config) => SettingsEventHandler::handle_config_updated(self, config),
            Event::PointerMoved { x, y, key } => {
                InputEventHandler::handle_pointer_moved(self, Point::new(x, y), key)
            }
            Event::PointerLeft { key } => InputEventHandler::handle_pointer_left(self, key),
            Event::ButtonPressed => InputEventHandler::handle_button(self, true),
            Event::ButtonReleased => InputEventHandler::handle_button(self, false),
            Event::TouchPressed { x, y, key } => {
                InputEventHandler::handle_touch_pressed(self, Point::new(x, y), key)
            }
            Event::TouchReleased { x, y, key } => {
                InputEventHandler::handle_touch_released(self, Point::new(x, y), key)
            }
            Event::DragStarted => DragEventHandler::handle_drag_started(self),
            Event::DockSizeChanged { size } => DragEventHandler::handle_dock_size_changed(self, size),
            Event::DragFinished => DragEventHandler::handle_drag_finished(self),
            Event::MenuOpened => SystemEventHandler::handle_menu_opened(self),
            Event::MenuClosed => SystemEventHandler::handle_menu_closed(self),
            Event::DaemonHideState(state) => SystemEventHandler::handle_daemon_hide_state(self, state),
            Event::ServiceAvailability { service, available } => {
                SystemEventHandler::handle_service_availability(self, service, available)
            }
            Event::TimerFired(token) => self.handle_timer(token),
        };

        match result {
            Ok(()) => {}
            Err(err @ ReactorError::Registry(_)) => debug!(%err, "stale monitor reference ignored"),
            Err(err) => warn!(%err, "event not applied"),
        }
    }

    fn handle_timer(&mut self, token: TaskToken) -> Result<(), ReactorError> {
        if !self.scheduler.fire(token) {
            return Ok(());
        }
        match token.kind {
            TaskKind::Reconcile => MonitorEventHandler::handle_settled(self),
            TaskKind::DelayShow => InputEventHandler::handle_delay_show_elapsed(self),
            TaskKind::AnimationFrame => {
                self.step_animation();
                Ok(())
            }
            TaskKind::ServiceProbe => SystemEventHandler::handle_service_probe(self),
        }
    }

    fn emit(&self, signal: DockSignal) {
        trace!(?signal, "signal");
        if let Err(e) = self.communication_manager.signal_tx.try_send(signal) {
            debug!(error = %ReactorError::from(e), "signal dropped");
        }
    }

    fn schedule(&mut self, kind: TaskKind, delay: Duration) {
        let task = self.scheduler.schedule(kind, delay);
        if let Err(e) = self.communication_manager.timer_tx.try_send(task) {
            warn!(error = %ReactorError::from(e), ?kind, "timer not scheduled");
        }
    }

    /// Runs a reconciliation pass. A pass requested while one is running is
    /// queued and runs right after it.
    fn reconcile(&mut self, reasons: ReconcileReason) {
        if self.pass.in_pass {
            trace!(?reasons, "pass in progress, queued");
            self.pass.queued |= reasons;
            return;
        }

        let mut reasons = reasons;
        loop {
            self.pass.in_pass = true;
            log::timed("reconcile pass", || self.run_pass(reasons));
            self.pass.in_pass = false;

            if self.pass.queued.is_empty() {
                break;
            }
            reasons = mem::replace(&mut self.pass.queued, ReconcileReason::empty());
        }
    }

    #[instrument(skip(self))]
    fn run_pass(&mut self, reasons: ReconcileReason) {
        // 1. Registry refresh.
        let only_primary = self.dock_manager.settings.show_only_on_primary;
        self.monitor_manager.registry.set_show_only_on_primary(only_primary);
        let eligible = self.monitor_manager.registry.eligible_screens();

        // 2. Host selection.
        let selection = self.monitor_manager.tracker.select_host(&eligible);
        let Some(host) = selection.host().map(str::to_owned) else {
            warn!("no eligible monitor, keeping the last known dock geometry");
            return;
        };

        // 3. Geometry.
        let Some(monitor) = self.monitor_manager.registry.get(&host) else {
            warn!(%host, "host monitor vanished mid-pass");
            return;
        };
        let geometry = GeometryEngine::compute(monitor, &self.dock_manager.settings.dock_params());
        if !geometry.is_valid() {
            warn!(%host, ?geometry, "degenerate dock geometry, publication skipped");
            return;
        }
        let regions = self.collect_regions(&eligible, &host, &geometry);

        // 4. Hot regions. Replacing the table drops any delayed reveal.
        let generation = self.input_manager.edge.replace_regions(regions);
        self.scheduler.cancel(TaskKind::DelayShow);
        if self.service_manager.region_monitor {
            self.emit(DockSignal::UpdateRegionMonitor {
                generation,
                regions: self.input_manager.edge.regions().to_vec(),
            });
        }

        // 5. Animation targets.
        self.dock_manager.geometry = Some(geometry.clone());
        if self.animation.current_rect().is_none() {
            let state = self.desired_hide_state();
            let rect = self.animation.place(state, geometry.shown, geometry.hidden);
            info!(%host, ?state, ?rect, "dock placed");
            self.emit(DockSignal::DockFrame { screen: host.clone(), rect });
            self.emit(DockSignal::HideStateChanged { state });
        } else if let Some(rect) = self.animation.retarget(geometry.shown, geometry.hidden) {
            self.emit(DockSignal::DockFrame { screen: host.clone(), rect });
        }
        self.update_visibility();

        // 6. Collaborators.
        self.publish(&host, &geometry);
    }

    fn collect_regions(
        &self,
        eligible: &[ScreenName],
        host: &str,
        geometry: &DockGeometry,
    ) -> Vec<HotRegion> {
        let settings = &self.dock_manager.settings;
        let auto_hides = settings.hide_mode != HideMode::KeepShowing;
        let mut regions = Vec::new();
        for name in eligible {
            // An always-shown dock has nothing to reveal on its own screen,
            // but the other screens still need edges for screen switching.
            if name == host && !auto_hides {
                continue;
            }
            let Some(monitor) = self.monitor_manager.registry.get(name) else {
                continue;
            };
            regions.extend(GeometryEngine::hot_regions(monitor, settings.position));
            regions.extend(GeometryEngine::touch_regions(monitor, settings.position));
        }
        if auto_hides {
            regions.push(HotRegion::dock_area(host, geometry.shown_raw));
        }
        regions
    }

    fn publish(&mut self, host: &str, geometry: &DockGeometry) {
        let layout = (host.to_string(), geometry.position);
        if self.dock_manager.last_layout.as_ref() != Some(&layout) {
            self.dock_manager.last_layout = Some(layout);
            self.emit(DockSignal::UpdateLayout {
                screen: host.to_string(),
                position: geometry.position,
            });
        }

        self.publish_frontend_geometry();

        let reserve_strut = self.dock_manager.settings.hide_mode == HideMode::KeepShowing;
        self.emit(DockSignal::NotifyWindowManager {
            screen: host.to_string(),
            rect: geometry.shown_raw,
            reserve_strut,
        });
    }

    fn publish_frontend_geometry(&self) {
        if !self.service_manager.dock_daemon {
            trace!("dock daemon unavailable, frontend geometry not published");
            return;
        }
        if !self.monitor_manager.tracker.has_host() {
            return;
        }
        let (Some(screen), Some(geometry)) = (
            self.monitor_manager.tracker.current_screen(),
            self.dock_manager.geometry.as_ref(),
        ) else {
            return;
        };
        if geometry.shown.is_empty() {
            return;
        }
        self.emit(DockSignal::UpdateFrontendGeometry {
            screen: screen.to_string(),
            rect: geometry.shown,
        });
    }

    fn desired_hide_state(&self) -> HideState {
        if self.dock_manager.pending_relocation.is_some() {
            return HideState::Hidden;
        }
        let guards = self.input_manager.guards;
        if guards.menu_open || guards.dragging {
            return self.animation.target_state();
        }
        let revealed = self.input_manager.revealed;
        let shown = match self.dock_manager.settings.hide_mode {
            HideMode::KeepShowing => true,
            HideMode::KeepHidden => revealed,
            HideMode::SmartHide => revealed || self.input_manager.daemon_hide == HideState::Shown,
        };
        if shown { HideState::Shown } else { HideState::Hidden }
    }

    /// Starts a transition when the desired visibility differs from where the
    /// dock is, or is heading.
    fn update_visibility(&mut self) {
        if self.dock_manager.geometry.is_none() || !self.monitor_manager.tracker.has_host() {
            return;
        }
        let request = match self.desired_hide_state() {
            HideState::Shown => self.animation.request_show(),
            HideState::Hidden => self.animation.request_hide(),
        };
        if request == AnimationRequest::Started {
            self.scheduler.cancel(TaskKind::AnimationFrame);
            self.step_animation();
        }
    }

    fn step_animation(&mut self) {
        if !self.monitor_manager.tracker.has_host() {
            debug!("no host monitor, animation stopped");
            self.animation.stop();
            self.scheduler.cancel(TaskKind::AnimationFrame);
            return;
        }
        let Some(frame) = self.animation.advance() else {
            return;
        };
        let Some(screen) = self.monitor_manager.tracker.current_screen().map(str::to_owned) else {
            return;
        };
        self.emit(DockSignal::DockFrame { screen, rect: frame.rect });

        match frame.finished {
            None => {
                let interval = self.animation.frame_interval();
                self.schedule(TaskKind::AnimationFrame, interval);
            }
            Some(state) => {
                self.emit(DockSignal::HideStateChanged { state });
                self.publish_frontend_geometry();
                if state == HideState::Hidden
                    && let Some(relocation) = self.dock_manager.pending_relocation.take()
                {
                    self.commit_relocation(relocation);
                }
            }
        }
    }

    /// Moves the dock to another edge or screen. A dock that is visible or
    /// still mid-transition hides first; the move is committed once it is out
    /// of sight.
    fn relocate(&mut self, relocation: Relocation) {
        let visible = self.dock_manager.geometry.is_some()
            && self.monitor_manager.tracker.has_host()
            && (self.animation.is_animating() || self.animation.hide_state() == HideState::Shown);
        if !visible {
            self.commit_relocation(relocation);
            return;
        }

        let pending = self.dock_manager.pending_relocation.get_or_insert_with(Relocation::default);
        if relocation.position.is_some() {
            pending.position = relocation.position;
        }
        if relocation.screen.is_some() {
            pending.screen = relocation.screen;
        }
        debug!(pending = ?self.dock_manager.pending_relocation, "hiding before relocation");
        self.update_visibility();
    }

    fn commit_relocation(&mut self, relocation: Relocation) {
        info!(?relocation, "relocating dock");
        let mut reasons = ReconcileReason::empty();
        if let Some(position) = relocation.position {
            self.dock_manager.settings.position = position;
            reasons |= ReconcileReason::SETTINGS_CHANGED;
        }
        if let Some(screen) = &relocation.screen {
            self.monitor_manager.tracker.dock_to(screen);
            self.input_manager.revealed = true;
            reasons |= ReconcileReason::SCREEN_SWITCH;
        }
        self.reconcile(reasons);
    }
}
