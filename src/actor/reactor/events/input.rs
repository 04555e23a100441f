use std::time::Duration;

use tracing::{debug, trace};

use crate::actor::broadcast::DockSignal;
use crate::actor::reactor::edge_trigger::{RegionKey, TriggerContext, TriggerDecision};
use crate::actor::reactor::managers::Relocation;
use crate::actor::reactor::scheduler::TaskKind;
use crate::actor::reactor::{Reactor, ReactorError};
use crate::model::geometry::Point;

pub struct InputEventHandler;

impl InputEventHandler {
    pub fn handle_pointer_moved(
        reactor: &mut Reactor,
        point: Point,
        key: RegionKey,
    ) -> Result<(), ReactorError> {
        let host = Self::host(reactor);
        let ctx = TriggerContext {
            host: host.as_deref(),
            hide_state: reactor.animation.target_state(),
            guards: reactor.input_manager.guards,
        };
        let decision = reactor.input_manager.edge.on_pointer_event(point, key, ctx);
        Self::apply(reactor, decision);
        Ok(())
    }

    pub fn handle_pointer_left(reactor: &mut Reactor, key: RegionKey) -> Result<(), ReactorError> {
        let decision = reactor.input_manager.edge.on_pointer_left(key);
        Self::apply(reactor, decision);
        Ok(())
    }

    pub fn handle_button(reactor: &mut Reactor, pressed: bool) -> Result<(), ReactorError> {
        reactor.input_manager.guards.button_pressed = pressed;
        Ok(())
    }

    pub fn handle_touch_pressed(
        reactor: &mut Reactor,
        point: Point,
        key: RegionKey,
    ) -> Result<(), ReactorError> {
        reactor.input_manager.guards.touch_pressed = true;
        reactor.input_manager.edge.on_touch_press(point, key);
        Ok(())
    }

    pub fn handle_touch_released(
        reactor: &mut Reactor,
        point: Point,
        key: RegionKey,
    ) -> Result<(), ReactorError> {
        reactor.input_manager.guards.touch_pressed = false;
        let host = Self::host(reactor);
        let ctx = TriggerContext {
            host: host.as_deref(),
            hide_state: reactor.animation.target_state(),
            guards: reactor.input_manager.guards,
        };
        let decision = reactor.input_manager.edge.on_touch_release(point, key, ctx);
        Self::apply(reactor, decision);
        Ok(())
    }

    /// The delayed-show timer elapsed with the pointer still on the edge.
    pub fn handle_delay_show_elapsed(reactor: &mut Reactor) -> Result<(), ReactorError> {
        let Some(screen) = reactor.input_manager.edge.clear_pending_delay() else {
            trace!("delay elapsed without a pending screen");
            return Ok(());
        };
        if !reactor.monitor_manager.registry.eligible_screens().contains(&screen) {
            debug!(%screen, "delayed screen is no longer eligible");
            return Ok(());
        }
        if reactor.monitor_manager.tracker.current_screen() == Some(screen.as_str()) {
            reactor.input_manager.revealed = true;
            reactor.update_visibility();
            return Ok(());
        }
        reactor.relocate(Relocation { position: None, screen: Some(screen) });
        Ok(())
    }

    fn host(reactor: &Reactor) -> Option<String> {
        let tracker = &reactor.monitor_manager.tracker;
        if !tracker.has_host() {
            return None;
        }
        tracker.current_screen().map(str::to_owned)
    }

    fn apply(reactor: &mut Reactor, decision: TriggerDecision) {
        match decision {
            TriggerDecision::Ignore => {}
            TriggerDecision::ShowNow => {
                reactor.input_manager.revealed = true;
                reactor.update_visibility();
            }
            TriggerDecision::DelayShow(screen) => {
                let delay_ms = reactor.dock_manager.settings.delay_show_ms;
                reactor.schedule(TaskKind::DelayShow, Duration::from_millis(delay_ms));
                reactor.emit(DockSignal::DelayShowDock { screen, delay_ms });
            }
            TriggerDecision::CancelDelay => {
                if reactor.scheduler.cancel(TaskKind::DelayShow) {
                    debug!("delayed show cancelled");
                }
            }
            TriggerDecision::LeftDock => {
                if reactor.input_manager.revealed {
                    reactor.input_manager.revealed = false;
                    reactor.update_visibility();
                }
            }
        }
    }
}
