use std::time::Duration;

use super::edge_trigger::{KeyedRegion, RegionKey};
use super::{Event, Reactor, Simulation};
use crate::actor::broadcast::DockSignal;
use crate::common::config::{Config, Settings};
use crate::geometry_engine::RegionKind;
use crate::model::geometry::{HideState, Rect};
use crate::model::monitor::Monitor;

/// Long enough for the monitor settle window and a full animation, short of
/// the delayed-show timeout.
const SETTLE: Duration = Duration::from_millis(1000);

pub fn config(f: impl FnOnce(&mut Settings)) -> Config {
    let mut config = Config::default();
    f(&mut config.settings);
    config
}

pub fn screen(name: &str, x: i32, y: i32, width: i32, height: i32) -> Monitor {
    Monitor::new(name, Rect::new(x, y, width, height))
}

pub fn primary(mut monitor: Monitor) -> Monitor {
    monitor.primary = true;
    monitor
}

pub fn hdmi() -> Monitor { screen("HDMI-1", 0, 0, 1920, 1080) }

pub fn edp() -> Monitor { screen("eDP-1", 1920, 0, 1920, 1080) }

pub struct Harness {
    sim: Simulation,
}

impl Harness {
    pub fn new(config: Config) -> Self { Harness { sim: Simulation::new(config) } }

    pub fn with_monitors(config: Config, monitors: impl IntoIterator<Item = Monitor>) -> Self {
        let mut harness = Harness::new(config);
        for monitor in monitors {
            harness.dispatch(Event::MonitorAdded(monitor));
        }
        harness.settle();
        harness
    }

    pub fn dispatch(&mut self, event: Event) { self.sim.dispatch(event) }

    pub fn settle(&mut self) { self.sim.advance_by(SETTLE) }

    pub fn advance_ms(&mut self, ms: u64) { self.sim.advance_by(Duration::from_millis(ms)) }

    pub fn signals(&mut self) -> Vec<DockSignal> { self.sim.take_signals() }

    pub fn reactor(&self) -> &Reactor { self.sim.reactor() }

    pub fn host(&self) -> Option<&str> {
        let tracker = &self.reactor().monitor_manager.tracker;
        if tracker.has_host() { tracker.current_screen() } else { None }
    }

    pub fn hide_state(&self) -> HideState { self.reactor().animation.target_state() }

    pub fn region(&self, screen: &str, kind: RegionKind) -> KeyedRegion {
        self.reactor()
            .input_manager
            .edge
            .regions()
            .iter()
            .find(|r| r.region.screen == screen && r.region.kind == kind)
            .cloned()
            .unwrap_or_else(|| panic!("no {kind:?} region on {screen}"))
    }

    pub fn enter_edge(&mut self, screen: &str) -> RegionKey {
        let region = self.region(screen, RegionKind::Edge);
        let rect = region.region.rect;
        self.dispatch(Event::PointerMoved {
            x: rect.x + rect.width / 2,
            y: rect.y + rect.height / 2,
            key: region.key,
        });
        region.key
    }
}

pub fn count(signals: &[DockSignal], pred: impl Fn(&DockSignal) -> bool) -> usize {
    signals.iter().filter(|s| pred(s)).count()
}

pub fn hide_states(signals: &[DockSignal]) -> Vec<HideState> {
    signals
        .iter()
        .filter_map(|s| match s {
            DockSignal::HideStateChanged { state } => Some(*state),
            _ => None,
        })
        .collect()
}
