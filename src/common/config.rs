use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::geometry_engine::{DockParams, MAX_DOCK_SIZE, MIN_DOCK_SIZE};
use crate::model::geometry::{DisplayMode, HideMode, Position};

const MAX_DELAY_SHOW_MS: u64 = 60_000;
const MAX_MONITOR_SETTLE_MS: u64 = 5_000;
pub const MAX_ANIMATION_DURATION: f64 = 5.0;
pub const MAX_ANIMATION_FPS: f64 = 240.0;

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("multidock")
}

pub fn config_file() -> PathBuf { config_dir().join("config.toml") }

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl ToString) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub hide_mode: HideMode,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default = "default_window_size_efficient")]
    pub window_size_efficient: u32,
    #[serde(default = "default_window_size_fashion")]
    pub window_size_fashion: u32,
    #[serde(default = "no")]
    pub show_only_on_primary: bool,
    /// Dock background opacity, 0.0 (transparent) to 1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// How long the pointer must rest on another screen's edge before the
    /// dock follows it there.
    #[serde(default = "default_delay_show_ms")]
    pub delay_show_ms: u64,
    /// Window in which a burst of monitor events collapses into one pass.
    #[serde(default = "default_monitor_settle_ms")]
    pub monitor_settle_ms: u64,
    #[serde(default)]
    pub animation: AnimationSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnimationSettings {
    #[serde(default = "yes")]
    pub animate: bool,
    #[serde(default = "default_animation_duration")]
    pub duration: f64,
    #[serde(default = "default_animation_fps")]
    pub fps: f64,
    #[serde(default)]
    pub easing: AnimationEasing,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnimationEasing {
    #[default]
    EaseInOut,
    Linear,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            position: Position::default(),
            hide_mode: HideMode::default(),
            display_mode: DisplayMode::default(),
            window_size_efficient: default_window_size_efficient(),
            window_size_fashion: default_window_size_fashion(),
            show_only_on_primary: no(),
            opacity: default_opacity(),
            delay_show_ms: default_delay_show_ms(),
            monitor_settle_ms: default_monitor_settle_ms(),
            animation: AnimationSettings::default(),
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            animate: yes(),
            duration: default_animation_duration(),
            fps: default_animation_fps(),
            easing: AnimationEasing::default(),
        }
    }
}

impl Settings {
    pub fn dock_params(&self) -> DockParams {
        DockParams {
            position: self.position,
            hide_mode: self.hide_mode,
            display_mode: self.display_mode,
            window_size_efficient: self.window_size_efficient,
            window_size_fashion: self.window_size_fashion,
        }
    }

    /// Opacity as the 0-255 alpha the frontend expects.
    pub fn opacity_alpha(&self) -> u8 { (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8 }

    /// Applies one flat key/value pair from the settings store. On error the
    /// previous value is left in place. Returns whether the value changed.
    pub fn apply_key(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        let value = value.trim();
        match key {
            "position" => set(&mut self.position, parse_enum(key, value)?),
            "hide_mode" => set(&mut self.hide_mode, parse_enum(key, value)?),
            "display_mode" => set(&mut self.display_mode, parse_enum(key, value)?),
            "window_size_efficient" => {
                set(&mut self.window_size_efficient, parse_size(key, value)?)
            }
            "window_size_fashion" => set(&mut self.window_size_fashion, parse_size(key, value)?),
            "show_only_on_primary" => set(&mut self.show_only_on_primary, parse_bool(key, value)?),
            "opacity" => {
                let opacity = parse_f64(key, value)?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(ConfigError::invalid(key, value, "expected 0.0 to 1.0"));
                }
                set(&mut self.opacity, opacity)
            }
            "delay_show_ms" => {
                set(&mut self.delay_show_ms, parse_ms(key, value, MAX_DELAY_SHOW_MS)?)
            }
            "monitor_settle_ms" => set(
                &mut self.monitor_settle_ms,
                parse_ms(key, value, MAX_MONITOR_SETTLE_MS)?,
            ),
            "animate" => set(&mut self.animation.animate, parse_bool(key, value)?),
            "animation_duration" => {
                let duration = parse_f64(key, value)?;
                if !duration_in_range(duration) {
                    return Err(ConfigError::invalid(
                        key,
                        value,
                        format!("expected 0.0 to {MAX_ANIMATION_DURATION}"),
                    ));
                }
                set(&mut self.animation.duration, duration)
            }
            "animation_fps" => {
                let fps = parse_f64(key, value)?;
                if !fps_in_range(fps) {
                    return Err(ConfigError::invalid(
                        key,
                        value,
                        format!("expected above 0 and at most {MAX_ANIMATION_FPS}"),
                    ));
                }
                set(&mut self.animation.fps, fps)
            }
            "animation_easing" => set(&mut self.animation.easing, parse_enum(key, value)?),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, size) in [
            ("window_size_efficient", self.window_size_efficient),
            ("window_size_fashion", self.window_size_fashion),
        ] {
            if !(MIN_DOCK_SIZE..=MAX_DOCK_SIZE).contains(&size) {
                issues.push(format!(
                    "{name} must be within {MIN_DOCK_SIZE}..={MAX_DOCK_SIZE}, got {size}"
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            issues.push(format!("opacity must be within 0.0..=1.0, got {}", self.opacity));
        }

        if self.delay_show_ms > MAX_DELAY_SHOW_MS {
            issues.push(format!(
                "delay_show_ms must be at most {MAX_DELAY_SHOW_MS}, got {}",
                self.delay_show_ms
            ));
        }

        if self.monitor_settle_ms > MAX_MONITOR_SETTLE_MS {
            issues.push(format!(
                "monitor_settle_ms must be at most {MAX_MONITOR_SETTLE_MS}, got {}",
                self.monitor_settle_ms
            ));
        }

        issues.extend(self.animation.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for size in [&mut self.window_size_efficient, &mut self.window_size_fashion] {
            let clamped = (*size).clamp(MIN_DOCK_SIZE, MAX_DOCK_SIZE);
            if clamped != *size {
                *size = clamped;
                fixes += 1;
            }
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            self.opacity = default_opacity();
            fixes += 1;
        }

        if self.delay_show_ms > MAX_DELAY_SHOW_MS {
            self.delay_show_ms = default_delay_show_ms();
            fixes += 1;
        }

        if self.monitor_settle_ms > MAX_MONITOR_SETTLE_MS {
            self.monitor_settle_ms = default_monitor_settle_ms();
            fixes += 1;
        }

        fixes += self.animation.auto_fix_values();

        fixes
    }
}

impl AnimationSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !duration_in_range(self.duration) {
            issues.push(format!(
                "animation duration must be within 0.0..={MAX_ANIMATION_DURATION}, got {}",
                self.duration
            ));
        }

        if !fps_in_range(self.fps) {
            issues.push(format!(
                "animation fps must be above 0 and at most {MAX_ANIMATION_FPS}, got {}",
                self.fps
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !duration_in_range(self.duration) {
            self.duration = default_animation_duration();
            fixes += 1;
        }

        if !fps_in_range(self.fps) {
            self.fps = default_animation_fps();
            fixes += 1;
        }

        fixes
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T) -> Result<bool, ConfigError> {
    if *slot == value {
        return Ok(false);
    }
    *slot = value;
    Ok(true)
}

fn parse_enum<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::invalid(key, value, "unrecognized variant"))
}

// Range checks also reject NaN and infinities.
fn duration_in_range(duration: f64) -> bool {
    (0.0..=MAX_ANIMATION_DURATION).contains(&duration)
}

fn fps_in_range(fps: f64) -> bool { fps > 0.0 && fps <= MAX_ANIMATION_FPS }

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = value.parse().map_err(|e| ConfigError::invalid(key, value, e))?;
    if !parsed.is_finite() {
        return Err(ConfigError::invalid(key, value, "must be finite"));
    }
    Ok(parsed)
}

fn parse_size(key: &str, value: &str) -> Result<u32, ConfigError> {
    let size: u32 = value.parse().map_err(|e| ConfigError::invalid(key, value, e))?;
    if !(MIN_DOCK_SIZE..=MAX_DOCK_SIZE).contains(&size) {
        return Err(ConfigError::invalid(
            key,
            value,
            format!("expected {MIN_DOCK_SIZE}..={MAX_DOCK_SIZE}"),
        ));
    }
    Ok(size)
}

fn parse_ms(key: &str, value: &str, max: u64) -> Result<u64, ConfigError> {
    let ms: u64 = value.parse().map_err(|e| ConfigError::invalid(key, value, e))?;
    if ms > max {
        return Err(ConfigError::invalid(key, value, format!("at most {max}")));
    }
    Ok(ms)
}

fn yes() -> bool { true }

fn no() -> bool { false }

fn default_window_size_efficient() -> u32 { 40 }

fn default_window_size_fashion() -> u32 { 60 }

fn default_opacity() -> f64 { 0.4 }

fn default_delay_show_ms() -> u64 { 2000 }

fn default_monitor_settle_ms() -> u64 { 100 }

fn default_animation_duration() -> f64 { 0.3 }

fn default_animation_fps() -> f64 { 60.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, falling back to the built-in defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}
