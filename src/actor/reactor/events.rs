pub mod drag;
pub mod input;
pub mod monitor;
pub mod settings;
pub mod system;
