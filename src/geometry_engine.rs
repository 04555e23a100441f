//! Rectangle math for the dock. Everything here is a pure function of the
//! monitor and the dock parameters it is handed; nothing is cached.

mod dock;
mod regions;

pub use dock::{CoordSpace, DockGeometry, DockParams, GeometryEngine};
pub use regions::{HotRegion, RegionKind};

/// Smallest configurable dock thickness, in logical pixels.
pub const MIN_DOCK_SIZE: u32 = 40;
/// Largest configurable dock thickness, in logical pixels.
pub const MAX_DOCK_SIZE: u32 = 100;
/// Gap between the dock and the screen edges in fashion mode.
pub const FASHION_MARGIN: i32 = 10;
/// Depth of the edge strip that reveals a hidden dock, in logical pixels.
pub const HOT_REGION_DEPTH: i32 = 15;
/// Depth of the edge strip watched for touch reveals, in logical pixels.
pub const TOUCH_REGION_DEPTH: i32 = 30;
