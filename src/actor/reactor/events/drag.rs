use tracing::{debug, trace};

use crate::actor::reactor::display_topology::ReconcileReason;
use crate::actor::reactor::{Reactor, ReactorError};
use crate::geometry_engine::{MAX_DOCK_SIZE, MIN_DOCK_SIZE};
use crate::model::geometry::DisplayMode;

pub struct DragEventHandler;

impl DragEventHandler {
    pub fn handle_drag_started(reactor: &mut Reactor) -> Result<(), ReactorError> {
        debug!("dock resize drag started");
        reactor.input_manager.guards.dragging = true;
        Ok(())
    }

    pub fn handle_dock_size_changed(reactor: &mut Reactor, size: u32) -> Result<(), ReactorError> {
        let size = size.clamp(MIN_DOCK_SIZE, MAX_DOCK_SIZE);
        let settings = &mut reactor.dock_manager.settings;
        let slot = match settings.display_mode {
            DisplayMode::Efficient => &mut settings.window_size_efficient,
            DisplayMode::Fashion => &mut settings.window_size_fashion,
        };
        if *slot == size {
            return Ok(());
        }
        *slot = size;

        if reactor.input_manager.guards.dragging {
            trace!(size, "size change deferred until the drag finishes");
        } else {
            reactor.reconcile(ReconcileReason::SETTINGS_CHANGED);
        }
        Ok(())
    }

    pub fn handle_drag_finished(reactor: &mut Reactor) -> Result<(), ReactorError> {
        if !reactor.input_manager.guards.dragging {
            trace!("drag finished without a drag in progress");
            return Ok(());
        }
        debug!("dock resize drag finished");
        reactor.input_manager.guards.dragging = false;
        reactor.reconcile(ReconcileReason::DRAG_FINISHED);
        Ok(())
    }
}
