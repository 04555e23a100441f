//! Decides what pointer and touch activity near the screen edges means for
//! the dock. The reactor owns the timers; this only hands back decisions.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::common::collections::HashSet;
use crate::geometry_engine::{HotRegion, RegionKind};
use crate::model::geometry::{HideState, Point, ScreenName};

/// Maximum raw-pixel travel between touch press and release that still
/// counts as a tap.
pub const TOUCH_SLOP: i32 = 10;

/// Correlates input callbacks with the region table they were registered
/// from. Keys from an older table are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionKey {
    pub generation: u64,
    pub index: u32,
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.generation, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedRegion {
    pub key: RegionKey,
    #[serde(flatten)]
    pub region: HotRegion,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputGuardState {
    pub dragging: bool,
    pub button_pressed: bool,
    pub touch_pressed: bool,
    pub menu_open: bool,
}

impl InputGuardState {
    pub fn blocks_reveal(&self) -> bool { self.dragging || self.button_pressed }
}

/// What the monitor needs to know about the dock when judging an event.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    pub host: Option<&'a str>,
    pub hide_state: HideState,
    pub guards: InputGuardState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    Ignore,
    ShowNow,
    DelayShow(ScreenName),
    CancelDelay,
    LeftDock,
}

#[derive(Debug, Clone, Copy)]
struct TouchStart {
    key: RegionKey,
    point: Point,
}

#[derive(Debug, Default)]
pub struct EdgeTriggerMonitor {
    generation: u64,
    regions: Vec<KeyedRegion>,
    entered: HashSet<RegionKey>,
    pending_delay: Option<ScreenName>,
    touch: Option<TouchStart>,
}

impl EdgeTriggerMonitor {
    pub fn new() -> Self { Self::default() }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn regions(&self) -> &[KeyedRegion] { &self.regions }

    pub fn pending_delay(&self) -> Option<&str> { self.pending_delay.as_deref() }

    /// Installs a new region table. Everything tracked against the old table,
    /// including a pending delayed reveal, is dropped.
    pub fn replace_regions(&mut self, regions: Vec<HotRegion>) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.regions = regions
            .into_iter()
            .enumerate()
            .map(|(index, region)| KeyedRegion {
                key: RegionKey { generation, index: index as u32 },
                region,
            })
            .collect();
        self.entered.clear();
        self.touch = None;
        if let Some(screen) = self.pending_delay.take() {
            debug!(%screen, "delayed reveal dropped with its region table");
        }
        generation
    }

    pub fn clear_pending_delay(&mut self) -> Option<ScreenName> { self.pending_delay.take() }

    fn lookup(&self, key: RegionKey) -> Option<&KeyedRegion> {
        if key.generation != self.generation {
            debug!(%key, current = self.generation, "stale region key");
            return None;
        }
        let found = self.regions.get(key.index as usize);
        if found.is_none() {
            debug!(%key, "unknown region key");
        }
        found
    }

    pub fn on_pointer_event(
        &mut self,
        point: Point,
        key: RegionKey,
        ctx: TriggerContext<'_>,
    ) -> TriggerDecision {
        let Some(region) = self.lookup(key).map(|r| r.region.clone()) else {
            return TriggerDecision::Ignore;
        };
        if ctx.guards.touch_pressed {
            trace!("pointer motion during touch ignored");
            return TriggerDecision::Ignore;
        }

        match region.kind {
            RegionKind::Touch => TriggerDecision::Ignore,
            RegionKind::Dock if region.rect.contains(point) => TriggerDecision::Ignore,
            RegionKind::Dock => TriggerDecision::LeftDock,
            RegionKind::Edge if !region.rect.contains(point) => self.on_pointer_left(key),
            RegionKind::Edge => {
                if self.entered.contains(&key) || ctx.guards.blocks_reveal() {
                    return TriggerDecision::Ignore;
                }
                let decision = self.reveal_on(region.screen, ctx);
                // Only a reveal latches the region.
                if decision != TriggerDecision::Ignore {
                    self.entered.insert(key);
                }
                decision
            }
        }
    }

    pub fn on_pointer_left(&mut self, key: RegionKey) -> TriggerDecision {
        let Some(region) = self.lookup(key).map(|r| r.region.clone()) else {
            return TriggerDecision::Ignore;
        };
        match region.kind {
            RegionKind::Edge => {
                self.entered.remove(&key);
                if self.pending_delay.as_deref() == Some(region.screen.as_str()) {
                    self.pending_delay = None;
                    TriggerDecision::CancelDelay
                } else {
                    TriggerDecision::Ignore
                }
            }
            RegionKind::Dock => TriggerDecision::LeftDock,
            RegionKind::Touch => TriggerDecision::Ignore,
        }
    }

    pub fn on_touch_press(&mut self, point: Point, key: RegionKey) {
        self.touch = match self.lookup(key) {
            Some(r) if r.region.kind == RegionKind::Touch && r.region.rect.contains(point) => {
                Some(TouchStart { key, point })
            }
            _ => None,
        };
    }

    /// A touch reveals only when it stayed put inside one touch region.
    pub fn on_touch_release(
        &mut self,
        point: Point,
        key: RegionKey,
        ctx: TriggerContext<'_>,
    ) -> TriggerDecision {
        let Some(start) = self.touch.take() else {
            return TriggerDecision::Ignore;
        };
        let Some(region) = self.lookup(key).map(|r| r.region.clone()) else {
            return TriggerDecision::Ignore;
        };
        let stationary = start.key == key
            && region.rect.contains(point)
            && start.point.distance_to(point) <= TOUCH_SLOP;
        if !stationary {
            trace!(from = ?start.point, to = ?point, "touch drag ignored");
            return TriggerDecision::Ignore;
        }
        if ctx.guards.dragging {
            return TriggerDecision::Ignore;
        }
        self.reveal_on(region.screen, ctx)
    }

    fn reveal_on(&mut self, screen: ScreenName, ctx: TriggerContext<'_>) -> TriggerDecision {
        if ctx.host != Some(screen.as_str()) {
            if self.pending_delay.as_ref() == Some(&screen) {
                return TriggerDecision::Ignore;
            }
            self.pending_delay = Some(screen.clone());
            return TriggerDecision::DelayShow(screen);
        }
        match ctx.hide_state {
            HideState::Hidden => TriggerDecision::ShowNow,
            HideState::Shown => TriggerDecision::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::geometry::Rect;

    fn region(screen: &str, kind: RegionKind, rect: Rect) -> HotRegion {
        HotRegion { screen: screen.into(), kind, rect }
    }

    fn monitor_with_two_screens() -> EdgeTriggerMonitor {
        let mut edge = EdgeTriggerMonitor::new();
        edge.replace_regions(vec![
            region("A", RegionKind::Edge, Rect::new(0, 1065, 1920, 15)),
            region("B", RegionKind::Edge, Rect::new(1920, 1065, 1920, 15)),
            region("A", RegionKind::Touch, Rect::new(0, 1050, 1920, 30)),
            region("A", RegionKind::Dock, Rect::new(0, 1040, 1920, 40)),
        ]);
        edge
    }

    fn key(edge: &EdgeTriggerMonitor, index: u32) -> RegionKey {
        RegionKey { generation: edge.generation(), index }
    }

    fn hidden_on_a() -> TriggerContext<'static> {
        TriggerContext {
            host: Some("A"),
            hide_state: HideState::Hidden,
            guards: InputGuardState::default(),
        }
    }

    #[test]
    fn entering_the_host_edge_reveals_once() {
        let mut edge = monitor_with_two_screens();
        let k = key(&edge, 0);
        let p = Point::new(100, 1070);
        assert_eq!(edge.on_pointer_event(p, k, hidden_on_a()), TriggerDecision::ShowNow);
        assert_eq!(edge.on_pointer_event(p, k, hidden_on_a()), TriggerDecision::Ignore);
        edge.on_pointer_left(k);
        assert_eq!(edge.on_pointer_event(p, k, hidden_on_a()), TriggerDecision::ShowNow);
    }

    #[test]
    fn resting_on_the_edge_of_a_shown_dock_reveals_after_it_hides() {
        let mut edge = monitor_with_two_screens();
        let k = key(&edge, 0);
        let p = Point::new(100, 1070);
        let shown = TriggerContext { hide_state: HideState::Shown, ..hidden_on_a() };
        assert_eq!(edge.on_pointer_event(p, k, shown), TriggerDecision::Ignore);
        assert_eq!(edge.on_pointer_event(p, k, hidden_on_a()), TriggerDecision::ShowNow);
        assert_eq!(edge.on_pointer_event(p, k, hidden_on_a()), TriggerDecision::Ignore);
    }

    #[test]
    fn pressed_button_or_drag_blocks_the_reveal() {
        let mut edge = monitor_with_two_screens();
        let mut ctx = hidden_on_a();
        ctx.guards.button_pressed = true;
        assert_eq!(
            edge.on_pointer_event(Point::new(5, 1070), key(&edge, 0), ctx),
            TriggerDecision::Ignore
        );
        ctx.guards = InputGuardState { dragging: true, ..Default::default() };
        assert_eq!(
            edge.on_pointer_event(Point::new(5, 1070), key(&edge, 0), ctx),
            TriggerDecision::Ignore
        );
        assert_eq!(
            edge.on_pointer_event(Point::new(5, 1070), key(&edge, 0), hidden_on_a()),
            TriggerDecision::ShowNow
        );
    }

    #[test]
    fn other_screen_is_delayed_and_cancelled_by_leaving() {
        let mut edge = monitor_with_two_screens();
        let k = key(&edge, 1);
        assert_eq!(
            edge.on_pointer_event(Point::new(2000, 1070), k, hidden_on_a()),
            TriggerDecision::DelayShow("B".into())
        );
        assert_eq!(edge.pending_delay(), Some("B"));
        assert_eq!(edge.on_pointer_left(k), TriggerDecision::CancelDelay);
        assert_eq!(edge.pending_delay(), None);
    }

    #[test]
    fn stale_keys_are_ignored() {
        let mut edge = monitor_with_two_screens();
        let old = key(&edge, 0);
        edge.replace_regions(vec![region("A", RegionKind::Edge, Rect::new(0, 0, 10, 10))]);
        assert_eq!(
            edge.on_pointer_event(Point::new(1, 1070), old, hidden_on_a()),
            TriggerDecision::Ignore
        );
        let missing = RegionKey { generation: edge.generation(), index: 7 };
        assert_eq!(edge.on_pointer_left(missing), TriggerDecision::Ignore);
    }

    #[test]
    fn replacing_regions_drops_the_pending_delay() {
        let mut edge = monitor_with_two_screens();
        edge.on_pointer_event(Point::new(2000, 1070), key(&edge, 1), hidden_on_a());
        edge.replace_regions(Vec::new());
        assert_eq!(edge.pending_delay(), None);
    }

    #[test]
    fn stationary_touch_reveals_but_touch_drag_does_not() {
        let mut edge = monitor_with_two_screens();
        let k = key(&edge, 2);
        edge.on_touch_press(Point::new(500, 1060), k);
        assert_eq!(
            edge.on_touch_release(Point::new(504, 1062), k, hidden_on_a()),
            TriggerDecision::ShowNow
        );

        edge.on_touch_press(Point::new(500, 1060), k);
        assert_eq!(
            edge.on_touch_release(Point::new(700, 1060), k, hidden_on_a()),
            TriggerDecision::Ignore
        );

        assert_eq!(
            edge.on_touch_release(Point::new(500, 1060), k, hidden_on_a()),
            TriggerDecision::Ignore
        );
    }

    #[test]
    fn pointer_motion_is_ignored_while_touching() {
        let mut edge = monitor_with_two_screens();
        let mut ctx = hidden_on_a();
        ctx.guards.touch_pressed = true;
        assert_eq!(
            edge.on_pointer_event(Point::new(5, 1070), key(&edge, 0), ctx),
            TriggerDecision::Ignore
        );
    }

    #[test]
    fn leaving_the_dock_area_is_reported() {
        let mut edge = monitor_with_two_screens();
        let k = key(&edge, 3);
        let shown = TriggerContext { hide_state: HideState::Shown, ..hidden_on_a() };
        assert_eq!(edge.on_pointer_event(Point::new(10, 1050), k, shown), TriggerDecision::Ignore);
        assert_eq!(edge.on_pointer_event(Point::new(10, 900), k, shown), TriggerDecision::LeftDock);
        assert_eq!(edge.on_pointer_left(k), TriggerDecision::LeftDock);
    }
}
