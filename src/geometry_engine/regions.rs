use serde::{Deserialize, Serialize};

use super::{HOT_REGION_DEPTH, TOUCH_REGION_DEPTH};
use crate::model::geometry::{Position, Rect, ScreenName};
use crate::model::monitor::Monitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Thin strip along the docked edge; entering it reveals the dock.
    Edge,
    /// Deeper strip watched for touch taps.
    Touch,
    /// The shown dock itself; leaving it lets an auto-hide policy hide again.
    Dock,
}

/// A rectangle registered with the input region monitor, in raw global
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotRegion {
    pub screen: ScreenName,
    pub kind: RegionKind,
    pub rect: Rect,
}

impl HotRegion {
    pub fn dock_area(screen: &str, shown_raw: Rect) -> Self {
        HotRegion {
            screen: screen.to_string(),
            kind: RegionKind::Dock,
            rect: shown_raw,
        }
    }
}

pub(super) fn edge_regions(monitor: &Monitor, position: Position) -> Vec<HotRegion> {
    vec![strip(monitor, position, HOT_REGION_DEPTH, RegionKind::Edge)]
}

pub(super) fn touch_regions(monitor: &Monitor, position: Position) -> Vec<HotRegion> {
    vec![strip(monitor, position, TOUCH_REGION_DEPTH, RegionKind::Touch)]
}

fn strip(monitor: &Monitor, position: Position, depth: i32, kind: RegionKind) -> HotRegion {
    let screen = monitor.rect;
    let depth = ((depth as f64) * monitor.scale).round().max(1.0) as i32;
    let rect = match position {
        Position::Top => Rect::new(screen.x, screen.y, screen.width, depth.min(screen.height)),
        Position::Bottom => {
            let depth = depth.min(screen.height);
            Rect::new(screen.x, screen.max_y() - depth, screen.width, depth)
        }
        Position::Left => Rect::new(screen.x, screen.y, depth.min(screen.width), screen.height),
        Position::Right => {
            let depth = depth.min(screen.width);
            Rect::new(screen.max_x() - depth, screen.y, depth, screen.height)
        }
    };
    HotRegion {
        screen: monitor.name.clone(),
        kind,
        rect,
    }
}
