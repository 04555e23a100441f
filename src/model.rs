pub mod geometry;
pub mod monitor;

pub use geometry::{DisplayMode, HideMode, HideState, Point, Position, Rect, Rotation, ScreenName};
pub use monitor::{Monitor, MonitorChange, MonitorRegistry, RegistryError};
