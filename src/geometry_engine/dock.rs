use serde::{Deserialize, Serialize};

use super::regions::{self, HotRegion};
use super::{FASHION_MARGIN, MAX_DOCK_SIZE, MIN_DOCK_SIZE};
use crate::model::geometry::{DisplayMode, HideMode, Position, Rect};
use crate::model::monitor::Monitor;

/// Which pixel space a rectangle is expressed in. The frontend service wants
/// logical pixels, the window manager wants physical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSpace {
    Logical,
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockParams {
    pub position: Position,
    pub hide_mode: HideMode,
    pub display_mode: DisplayMode,
    pub window_size_efficient: u32,
    pub window_size_fashion: u32,
}

impl DockParams {
    pub fn dock_size(&self) -> u32 {
        let size = match self.display_mode {
            DisplayMode::Efficient => self.window_size_efficient,
            DisplayMode::Fashion => self.window_size_fashion,
        };
        size.clamp(MIN_DOCK_SIZE, MAX_DOCK_SIZE)
    }

    pub fn margin(&self) -> i32 {
        match self.display_mode {
            DisplayMode::Efficient => 0,
            DisplayMode::Fashion => FASHION_MARGIN,
        }
    }
}

/// Everything the reactor needs about the dock on one monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockGeometry {
    /// The configured edge after the monitor's rotation was applied.
    pub position: Position,
    pub shown: Rect,
    pub hidden: Rect,
    pub shown_raw: Rect,
    pub hidden_raw: Rect,
}

impl DockGeometry {
    pub fn is_valid(&self) -> bool {
        ![self.shown, self.hidden, self.shown_raw, self.hidden_raw]
            .iter()
            .any(Rect::is_empty)
    }
}

pub struct GeometryEngine;

impl GeometryEngine {
    pub fn effective_position(monitor: &Monitor, position: Position) -> Position {
        position.rotated(monitor.rotation)
    }

    pub fn shown_rect(monitor: &Monitor, params: &DockParams, space: CoordSpace) -> Rect {
        let position = Self::effective_position(monitor, params.position);
        let (screen, scale) = screen_in(monitor, space);
        let thickness = scaled_len(params.dock_size() as i32, scale);
        let margin = scaled_len_allow_zero(params.margin(), scale);
        flush_rect(screen, position, thickness, margin)
    }

    pub fn hidden_rect(monitor: &Monitor, params: &DockParams, space: CoordSpace) -> Rect {
        let shown = Self::shown_rect(monitor, params, space);
        if params.hide_mode == HideMode::KeepShowing {
            return shown;
        }
        let position = Self::effective_position(monitor, params.position);
        let (screen, _) = screen_in(monitor, space);
        collapse_to_edge(shown, screen, position)
    }

    /// Edge strips that reveal the dock, in raw coordinates.
    pub fn hot_regions(monitor: &Monitor, position: Position) -> Vec<HotRegion> {
        regions::edge_regions(monitor, Self::effective_position(monitor, position))
    }

    pub fn touch_regions(monitor: &Monitor, position: Position) -> Vec<HotRegion> {
        regions::touch_regions(monitor, Self::effective_position(monitor, position))
    }

    pub fn compute(monitor: &Monitor, params: &DockParams) -> DockGeometry {
        DockGeometry {
            position: Self::effective_position(monitor, params.position),
            shown: Self::shown_rect(monitor, params, CoordSpace::Logical),
            hidden: Self::hidden_rect(monitor, params, CoordSpace::Logical),
            shown_raw: Self::shown_rect(monitor, params, CoordSpace::Raw),
            hidden_raw: Self::hidden_rect(monitor, params, CoordSpace::Raw),
        }
    }
}

fn screen_in(monitor: &Monitor, space: CoordSpace) -> (Rect, f64) {
    match space {
        CoordSpace::Logical => (monitor.logical_rect(), 1.0),
        CoordSpace::Raw => (monitor.rect, monitor.scale),
    }
}

fn scaled_len(len: i32, scale: f64) -> i32 { ((len as f64) * scale).round().max(1.0) as i32 }

fn scaled_len_allow_zero(len: i32, scale: f64) -> i32 {
    ((len as f64) * scale).round().max(0.0) as i32
}

/// The dock rectangle against `position`, `margin` away from every edge it
/// touches. Lengths never drop below one pixel, even on absurdly small
/// screens.
fn flush_rect(screen: Rect, position: Position, thickness: i32, margin: i32) -> Rect {
    let span_w = (screen.width - 2 * margin).max(1);
    let span_h = (screen.height - 2 * margin).max(1);

    match position {
        Position::Top => {
            let height = thickness.min(span_h).max(1);
            Rect::new(screen.x + margin, screen.y + margin, span_w, height)
        }
        Position::Bottom => {
            let height = thickness.min(span_h).max(1);
            Rect::new(screen.x + margin, screen.max_y() - margin - height, span_w, height)
        }
        Position::Left => {
            let width = thickness.min(span_w).max(1);
            Rect::new(screen.x + margin, screen.y + margin, width, span_h)
        }
        Position::Right => {
            let width = thickness.min(span_w).max(1);
            Rect::new(screen.max_x() - margin - width, screen.y + margin, width, span_h)
        }
    }
}

/// A one pixel strip on the outer edge, keeping the along-edge extent of
/// `shown`.
fn collapse_to_edge(shown: Rect, screen: Rect, position: Position) -> Rect {
    match position {
        Position::Top => Rect::new(shown.x, screen.y, shown.width, 1),
        Position::Bottom => Rect::new(shown.x, screen.max_y() - 1, shown.width, 1),
        Position::Left => Rect::new(screen.x, shown.y, 1, shown.height),
        Position::Right => Rect::new(screen.max_x() - 1, shown.y, 1, shown.height),
    }
}
