use serde::{Deserialize, Serialize};

use crate::actor::reactor::Service;
use crate::actor::reactor::edge_trigger::KeyedRegion;
use crate::model::geometry::{DisplayMode, HideState, Position, Rect, ScreenName};

/// Requests to the external collaborators. Every rectangle carried here has
/// positive width and height.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum DockSignal {
    /// The renderer should re-flow its items for the edge orientation.
    UpdateLayout {
        screen: ScreenName,
        position: Position,
    },
    /// Replaces the whole registered hot-region set (raw coordinates).
    UpdateRegionMonitor {
        generation: u64,
        regions: Vec<KeyedRegion>,
    },
    /// Shown rectangle in logical pixels, for the backend service.
    UpdateFrontendGeometry {
        screen: ScreenName,
        rect: Rect,
    },
    /// Shown rectangle in raw pixels, for strut reservation.
    NotifyWindowManager {
        screen: ScreenName,
        rect: Rect,
        reserve_strut: bool,
    },
    DelayShowDock {
        screen: ScreenName,
        delay_ms: u64,
    },
    /// One rendered position of the dock window, logical pixels.
    DockFrame {
        screen: ScreenName,
        rect: Rect,
    },
    HideStateChanged {
        state: HideState,
    },
    OpacityChanged {
        value: u8,
    },
    DisplayModeChanged {
        mode: DisplayMode,
    },
    /// Ask the display service for a full monitor snapshot.
    ResyncMonitors,
    ProbeService {
        service: Service,
    },
}

pub type BroadcastSender = crate::actor::Sender<DockSignal>;
pub type BroadcastReceiver = crate::actor::Receiver<DockSignal>;
