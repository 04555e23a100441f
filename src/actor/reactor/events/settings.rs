use tracing::{debug, info, trace};

use crate::actor::broadcast::DockSignal;
use crate::actor::reactor::display_topology::ReconcileReason;
use crate::actor::reactor::managers::Relocation;
use crate::actor::reactor::{Reactor, ReactorError};
use crate::common::config::{Config, Settings};

pub struct SettingsEventHandler;

impl SettingsEventHandler {
    /// Applies one key from the settings store. A rejected value leaves the
    /// running settings untouched.
    pub fn handle_setting_changed(
        reactor: &mut Reactor,
        key: &str,
        value: &str,
    ) -> Result<(), ReactorError> {
        let previous = reactor.dock_manager.settings.clone();
        if !reactor.dock_manager.settings.apply_key(key, value)? {
            trace!(key, "setting unchanged");
            return Ok(());
        }
        info!(key, value, "setting changed");
        Self::apply(reactor, previous);
        Ok(())
    }

    pub fn handle_config_updated(reactor: &mut Reactor, config: Config) -> Result<(), ReactorError> {
        if reactor.dock_manager.settings == config.settings {
            debug!("config reloaded without changes");
            return Ok(());
        }
        let previous = std::mem::replace(&mut reactor.dock_manager.settings, config.settings);
        Self::apply(reactor, previous);
        Ok(())
    }

    fn apply(reactor: &mut Reactor, previous: Settings) {
        let current = reactor.dock_manager.settings.clone();

        if current.opacity_alpha() != previous.opacity_alpha() {
            reactor.emit(DockSignal::OpacityChanged { value: current.opacity_alpha() });
        }
        if current.display_mode != previous.display_mode {
            reactor.emit(DockSignal::DisplayModeChanged { mode: current.display_mode });
        }
        if current.animation != previous.animation {
            reactor.animation.configure(&current.animation);
        }
        if current.hide_mode != previous.hide_mode {
            reactor.input_manager.revealed = false;
        }

        let mut needs_pass = current.hide_mode != previous.hide_mode
            || current.display_mode != previous.display_mode
            || current.window_size_efficient != previous.window_size_efficient
            || current.window_size_fashion != previous.window_size_fashion
            || current.show_only_on_primary != previous.show_only_on_primary;

        if current.position != previous.position {
            // The new edge is applied once the dock has hidden.
            reactor.dock_manager.settings.position = previous.position;
            reactor.relocate(Relocation {
                position: Some(current.position),
                screen: None,
            });
            needs_pass &= reactor.dock_manager.pending_relocation.is_some();
        }

        if needs_pass {
            reactor.reconcile(ReconcileReason::SETTINGS_CHANGED);
        }
    }
}
