//! The live set of physical outputs and the policy deciding which of them may
//! host the dock.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::geometry::{Rect, Rotation, ScreenName, sanitize_scale};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub name: ScreenName,
    pub enabled: bool,
    /// Geometry in raw (physical) global coordinates.
    pub rect: Rect,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub primary: bool,
}

fn unit_scale() -> f64 { 1.0 }

impl Monitor {
    pub fn new(name: impl Into<ScreenName>, rect: Rect) -> Self {
        Monitor {
            name: name.into(),
            enabled: true,
            rect,
            scale: 1.0,
            rotation: Rotation::Normal,
            primary: false,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = sanitize_scale(scale);
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The monitor in logical coordinates (raw origin, scaled lengths).
    pub fn logical_rect(&self) -> Rect { self.rect.to_logical(self.scale) }
}

/// A single property update delivered by the display service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorChange {
    Geometry(Rect),
    Rotation(Rotation),
    Enabled(bool),
    Scale(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("monitor {0} is not registered")]
    NotFound(ScreenName),
}

/// Owns every [`Monitor`]. Mutations report whether anything changed and bump
/// [`MonitorRegistry::revision`] when it did.
#[derive(Debug, Default, Clone)]
pub struct MonitorRegistry {
    monitors: Vec<Monitor>,
    primary: Option<ScreenName>,
    show_only_on_primary: bool,
    revision: u64,
}

impl MonitorRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn revision(&self) -> u64 { self.revision }

    pub fn is_empty(&self) -> bool { self.monitors.is_empty() }

    pub fn monitors(&self) -> &[Monitor] { &self.monitors }

    pub fn get(&self, name: &str) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.name == name)
    }

    pub fn primary(&self) -> Option<&str> { self.primary.as_deref() }

    pub fn show_only_on_primary(&self) -> bool { self.show_only_on_primary }

    fn bump(&mut self) -> bool {
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// Inserts a monitor, replacing any monitor with the same name in place.
    pub fn add(&mut self, mut monitor: Monitor) -> bool {
        monitor.scale = sanitize_scale(monitor.scale);
        if monitor.primary {
            self.primary = Some(monitor.name.clone());
        }
        monitor.primary = self.primary.as_deref() == Some(monitor.name.as_str());

        match self.monitors.iter_mut().find(|m| m.name == monitor.name) {
            Some(existing) if *existing == monitor => return false,
            Some(existing) => {
                debug!(name = %monitor.name, "monitor re-added, replacing");
                *existing = monitor;
            }
            None => {
                debug!(name = %monitor.name, rect = ?monitor.rect, "monitor added");
                self.monitors.push(monitor);
            }
        }
        if self.primary.is_some() {
            self.sync_primary_flags();
        }
        self.bump()
    }

    pub fn remove(&mut self, name: &str) -> Result<Monitor, RegistryError> {
        let idx = self
            .monitors
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let removed = self.monitors.remove(idx);
        debug!(name, "monitor removed");
        self.bump();
        Ok(removed)
    }

    pub fn update(&mut self, name: &str, change: MonitorChange) -> Result<bool, RegistryError> {
        let monitor = self
            .monitors
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let changed = match change {
            MonitorChange::Geometry(rect) => replace_if_changed(&mut monitor.rect, rect),
            MonitorChange::Rotation(rotation) => {
                replace_if_changed(&mut monitor.rotation, rotation)
            }
            MonitorChange::Enabled(enabled) => replace_if_changed(&mut monitor.enabled, enabled),
            MonitorChange::Scale(scale) => {
                replace_if_changed(&mut monitor.scale, sanitize_scale(scale))
            }
        };
        trace!(name, changed, "monitor property update");
        Ok(changed && self.bump())
    }

    /// Records the primary output. The name may refer to a monitor that has
    /// not been announced yet.
    pub fn set_primary(&mut self, name: &str) -> bool {
        if self.primary.as_deref() == Some(name) {
            return false;
        }
        self.primary = Some(name.to_string());
        self.sync_primary_flags();
        self.bump()
    }

    pub fn set_show_only_on_primary(&mut self, only_primary: bool) -> bool {
        replace_if_changed(&mut self.show_only_on_primary, only_primary) && self.bump()
    }

    /// Replaces the whole set, used after the display service restarts.
    pub fn replace_all(&mut self, monitors: Vec<Monitor>) -> bool {
        if let Some(primary) = monitors.iter().find(|m| m.primary) {
            self.primary = Some(primary.name.clone());
        }
        let primary = self.primary.clone();
        let mut monitors = monitors;
        for m in &mut monitors {
            m.scale = sanitize_scale(m.scale);
            m.primary = primary.as_deref() == Some(m.name.as_str());
        }
        if monitors == self.monitors {
            return false;
        }
        self.monitors = monitors;
        self.bump()
    }

    fn sync_primary_flags(&mut self) {
        let primary = self.primary.as_deref();
        for m in &mut self.monitors {
            m.primary = Some(m.name.as_str()) == primary;
        }
    }

    /// Monitors allowed to host the dock, best candidate first.
    pub fn eligible_screens(&self) -> Vec<ScreenName> {
        let primary = self.primary.as_deref();
        let mut enabled = self.monitors.iter().filter(|m| m.enabled);

        if self.show_only_on_primary {
            // The primary name can lag behind an unplug; fall back to any
            // enabled output rather than leaving the dock without a host.
            let chosen = self
                .monitors
                .iter()
                .filter(|m| m.enabled)
                .find(|m| Some(m.name.as_str()) == primary)
                .or_else(|| enabled.next());
            return chosen.map(|m| vec![m.name.clone()]).unwrap_or_default();
        }

        let mut names: Vec<ScreenName> = enabled.map(|m| m.name.clone()).collect();
        if let Some(idx) = names.iter().position(|n| Some(n.as_str()) == primary) {
            let primary = names.remove(idx);
            names.insert(0, primary);
        }
        names
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn registry(names: &[&str]) -> MonitorRegistry {
        let mut reg = MonitorRegistry::new();
        for (i, name) in names.iter().enumerate() {
            reg.add(Monitor::new(*name, Rect::new(i as i32 * 1920, 0, 1920, 1080)));
        }
        reg
    }

    #[test]
    fn primary_moves_to_the_front_preserving_the_rest() {
        let mut reg = registry(&["DP-1", "DP-2", "HDMI-1", "eDP-1"]);
        reg.set_primary("HDMI-1");
        assert_eq!(reg.eligible_screens(), vec!["HDMI-1", "DP-1", "DP-2", "eDP-1"]);
    }

    #[test]
    fn disabled_monitors_are_not_eligible() {
        let mut reg = registry(&["DP-1", "DP-2"]);
        reg.update("DP-1", MonitorChange::Enabled(false)).unwrap();
        assert_eq!(reg.eligible_screens(), vec!["DP-2"]);
    }

    #[test]
    fn show_only_on_primary_returns_a_single_screen() {
        let mut reg = registry(&["DP-1", "HDMI-1"]);
        reg.set_primary("HDMI-1");
        reg.set_show_only_on_primary(true);
        assert_eq!(reg.eligible_screens(), vec!["HDMI-1"]);

        // Primary unplugged before the primary name caught up.
        reg.remove("HDMI-1").unwrap();
        assert_eq!(reg.eligible_screens(), vec!["DP-1"]);

        reg.update("DP-1", MonitorChange::Enabled(false)).unwrap();
        assert!(reg.eligible_screens().is_empty());
    }

    #[test]
    fn unknown_names_are_recoverable() {
        let mut reg = registry(&["DP-1"]);
        assert_eq!(reg.remove("VGA-1"), Err(RegistryError::NotFound("VGA-1".into())));
        assert_eq!(
            reg.update("VGA-1", MonitorChange::Enabled(true)),
            Err(RegistryError::NotFound("VGA-1".into()))
        );
        assert_eq!(reg.monitors().len(), 1);
    }

    #[test]
    fn revision_only_moves_on_real_changes() {
        let mut reg = registry(&["DP-1"]);
        let rev = reg.revision();
        assert!(!reg.update("DP-1", MonitorChange::Enabled(true)).unwrap());
        assert_eq!(reg.revision(), rev);

        assert!(reg.update("DP-1", MonitorChange::Rotation(Rotation::Rotate90)).unwrap());
        assert_eq!(reg.revision(), rev + 1);

        let same = reg.get("DP-1").unwrap().clone();
        assert!(!reg.add(same));
        assert_eq!(reg.revision(), rev + 1);
    }

    #[test]
    fn primary_flag_follows_set_primary() {
        let mut reg = registry(&["DP-1", "DP-2"]);
        reg.set_primary("DP-2");
        assert!(reg.get("DP-2").unwrap().primary);
        reg.set_primary("DP-1");
        assert!(reg.get("DP-1").unwrap().primary);
        assert!(!reg.get("DP-2").unwrap().primary);
    }

    #[test]
    fn invalid_scale_is_sanitized() {
        let mut reg = MonitorRegistry::new();
        reg.add(Monitor::new("DP-1", Rect::new(0, 0, 100, 100)).with_scale(0.0));
        assert_eq!(reg.get("DP-1").unwrap().scale, 1.0);
        reg.update("DP-1", MonitorChange::Scale(f64::NAN)).unwrap();
        assert_eq!(reg.get("DP-1").unwrap().scale, 1.0);
    }
}
