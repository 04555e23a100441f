use tracing::{debug, info};

use crate::model::geometry::ScreenName;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DockScreenState {
    pub current: Option<ScreenName>,
    pub last: Option<ScreenName>,
    pub primary: Option<ScreenName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSelection {
    Kept(ScreenName),
    Moved { from: Option<ScreenName>, to: ScreenName },
    /// Nothing is eligible; `current` was left alone.
    NoHost,
}

impl HostSelection {
    pub fn host(&self) -> Option<&str> {
        match self {
            HostSelection::Kept(name) | HostSelection::Moved { to: name, .. } => Some(name),
            HostSelection::NoHost => None,
        }
    }
}

/// Remembers which screen hosts the dock. Only [`DockScreenTracker::dock_to`]
/// changes `current`.
#[derive(Debug, Default)]
pub struct DockScreenTracker {
    state: DockScreenState,
    has_host: bool,
}

impl DockScreenTracker {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self) -> &DockScreenState { &self.state }

    pub fn current_screen(&self) -> Option<&str> { self.state.current.as_deref() }

    pub fn last_screen(&self) -> Option<&str> { self.state.last.as_deref() }

    pub fn primary(&self) -> Option<&str> { self.state.primary.as_deref() }

    /// False after a selection found no eligible monitor.
    pub fn has_host(&self) -> bool { self.has_host }

    pub fn dock_to(&mut self, name: &str) -> bool {
        if self.state.current.as_deref() == Some(name) {
            return false;
        }
        let previous = self.state.current.replace(name.to_string());
        if previous.is_some() {
            self.state.last = previous;
        }
        debug!(current = name, last = ?self.state.last, "dock screen set");
        true
    }

    pub fn set_primary(&mut self, name: &str) {
        self.state.primary = Some(name.to_string());
        if self.state.current.is_none() {
            self.dock_to(name);
        }
    }

    pub fn select_host(&mut self, eligible: &[ScreenName]) -> HostSelection {
        let current = self.state.current.clone();
        if let Some(current) = &current
            && eligible.contains(current)
        {
            self.has_host = true;
            return HostSelection::Kept(current.clone());
        }

        let target = self
            .state
            .primary
            .as_ref()
            .filter(|primary| eligible.contains(*primary))
            .or_else(|| eligible.first())
            .cloned();

        match target {
            Some(to) => {
                self.dock_to(&to);
                self.has_host = true;
                info!(from = ?current, to = %to, "dock moved to another screen");
                HostSelection::Moved { from: current, to }
            }
            None => {
                self.has_host = false;
                HostSelection::NoHost
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(list: &[&str]) -> Vec<ScreenName> { list.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn dock_to_tracks_the_previous_screen() {
        let mut tracker = DockScreenTracker::new();
        assert!(tracker.dock_to("HDMI-1"));
        assert_eq!(tracker.last_screen(), None);
        assert!(!tracker.dock_to("HDMI-1"));
        assert!(tracker.dock_to("eDP-1"));
        assert_eq!(tracker.current_screen(), Some("eDP-1"));
        assert_eq!(tracker.last_screen(), Some("HDMI-1"));
    }

    #[test]
    fn first_primary_becomes_current() {
        let mut tracker = DockScreenTracker::new();
        tracker.set_primary("DP-1");
        assert_eq!(tracker.current_screen(), Some("DP-1"));
        tracker.set_primary("DP-2");
        assert_eq!(tracker.current_screen(), Some("DP-1"));
        assert_eq!(tracker.primary(), Some("DP-2"));
    }

    #[test]
    fn selection_prefers_current_then_primary_then_first() {
        let mut tracker = DockScreenTracker::new();
        tracker.dock_to("A");
        tracker.set_primary("B");

        assert_eq!(tracker.select_host(&names(&["B", "A"])), HostSelection::Kept("A".into()));
        assert_eq!(
            tracker.select_host(&names(&["C", "B"])),
            HostSelection::Moved { from: Some("A".into()), to: "B".into() }
        );
        assert_eq!(
            tracker.select_host(&names(&["C"])),
            HostSelection::Moved { from: Some("B".into()), to: "C".into() }
        );
    }

    #[test]
    fn empty_eligible_set_leaves_current_untouched() {
        let mut tracker = DockScreenTracker::new();
        tracker.dock_to("A");
        assert_eq!(tracker.select_host(&[]), HostSelection::NoHost);
        assert!(!tracker.has_host());
        assert_eq!(tracker.current_screen(), Some("A"));
        assert_eq!(tracker.select_host(&names(&["A"])), HostSelection::Kept("A".into()));
        assert!(tracker.has_host());
    }
}
