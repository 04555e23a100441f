use std::time::Duration;

use tracing::{debug, trace};

use crate::common::config::{
    AnimationEasing, AnimationSettings, MAX_ANIMATION_DURATION, MAX_ANIMATION_FPS,
};
use crate::model::geometry::{HideState, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Showing,
    Hiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationRequest {
    /// Already animating in that direction; the request was coalesced.
    Ignored,
    Started,
    /// Idle and already in the requested state.
    AlreadyThere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub rect: Rect,
    /// Set on the terminal frame.
    pub finished: Option<HideState>,
}

/// Show/hide transition state. Owns no geometry beyond the two targets the
/// last reconciliation handed it.
#[derive(Debug)]
pub struct AnimationController {
    phase: AnimationPhase,
    hide_state: HideState,
    current: Option<Rect>,
    from: Rect,
    to: Rect,
    shown: Rect,
    hidden: Rect,
    frame: u32,
    frames: u32,
    easing: AnimationEasing,
    frame_interval: Duration,
    animate: bool,
}

impl AnimationController {
    pub fn new(settings: &AnimationSettings) -> Self {
        let mut controller = AnimationController {
            phase: AnimationPhase::Idle,
            hide_state: HideState::Shown,
            current: None,
            from: Rect::default(),
            to: Rect::default(),
            shown: Rect::default(),
            hidden: Rect::default(),
            frame: 0,
            frames: 1,
            easing: AnimationEasing::default(),
            frame_interval: Duration::ZERO,
            animate: true,
        };
        controller.configure(settings);
        controller
    }

    pub fn configure(&mut self, settings: &AnimationSettings) {
        let fps = if settings.fps.is_finite() && settings.fps > 0.0 {
            settings.fps.min(MAX_ANIMATION_FPS)
        } else {
            60.0
        };
        let duration = if settings.duration.is_finite() {
            settings.duration.clamp(0.0, MAX_ANIMATION_DURATION)
        } else {
            0.0
        };
        self.animate = settings.animate && duration > 0.0;
        self.frames = if self.animate {
            ((duration * fps).round() as u32).max(1)
        } else {
            1
        };
        self.easing = settings.easing;
        self.frame_interval = Duration::from_secs_f64(1.0 / fps);
    }

    pub fn phase(&self) -> AnimationPhase { self.phase }

    pub fn hide_state(&self) -> HideState { self.hide_state }

    pub fn current_rect(&self) -> Option<Rect> { self.current }

    pub fn is_animating(&self) -> bool { self.phase != AnimationPhase::Idle }

    pub fn frame_interval(&self) -> Duration { self.frame_interval }

    /// The state the dock is in, or is heading to.
    pub fn target_state(&self) -> HideState {
        match self.phase {
            AnimationPhase::Idle => self.hide_state,
            AnimationPhase::Showing => HideState::Shown,
            AnimationPhase::Hiding => HideState::Hidden,
        }
    }

    fn target_for(&self, state: HideState) -> Rect {
        match state {
            HideState::Shown => self.shown,
            HideState::Hidden => self.hidden,
        }
    }

    /// Puts the dock straight into `state` without a transition. Used for the
    /// very first placement.
    pub fn place(&mut self, state: HideState, shown: Rect, hidden: Rect) -> Rect {
        self.shown = shown;
        self.hidden = hidden;
        self.phase = AnimationPhase::Idle;
        self.hide_state = state;
        let rect = self.target_for(state);
        self.current = Some(rect);
        rect
    }

    /// Installs fresh targets. An animation in flight keeps going from where
    /// it is toward the new target. When idle, returns the rect the dock has
    /// to jump to if its target moved.
    pub fn retarget(&mut self, shown: Rect, hidden: Rect) -> Option<Rect> {
        self.shown = shown;
        self.hidden = hidden;
        match self.phase {
            AnimationPhase::Showing => {
                self.to = shown;
                None
            }
            AnimationPhase::Hiding => {
                self.to = hidden;
                None
            }
            AnimationPhase::Idle => {
                let rect = self.target_for(self.hide_state);
                if self.current == Some(rect) {
                    return None;
                }
                self.current = Some(rect);
                Some(rect)
            }
        }
    }

    pub fn request_show(&mut self) -> AnimationRequest { self.request(HideState::Shown) }

    pub fn request_hide(&mut self) -> AnimationRequest { self.request(HideState::Hidden) }

    fn request(&mut self, state: HideState) -> AnimationRequest {
        let phase = match state {
            HideState::Shown => AnimationPhase::Showing,
            HideState::Hidden => AnimationPhase::Hiding,
        };
        if self.phase == phase {
            trace!(?phase, "animation request coalesced");
            return AnimationRequest::Ignored;
        }
        if self.phase == AnimationPhase::Idle && self.hide_state == state {
            return AnimationRequest::AlreadyThere;
        }

        let opposite = self.target_for(match state {
            HideState::Shown => HideState::Hidden,
            HideState::Hidden => HideState::Shown,
        });
        self.from = self.current.unwrap_or(opposite);
        self.to = self.target_for(state);
        self.frame = 0;
        self.phase = phase;
        debug!(?phase, from = ?self.from, to = ?self.to, frames = self.frames, "animation started");
        AnimationRequest::Started
    }

    /// Produces the next frame. The terminal frame is exactly the target.
    pub fn advance(&mut self) -> Option<AnimationFrame> {
        let state = match self.phase {
            AnimationPhase::Idle => return None,
            AnimationPhase::Showing => HideState::Shown,
            AnimationPhase::Hiding => HideState::Hidden,
        };

        self.frame += 1;
        if self.frame >= self.frames {
            self.phase = AnimationPhase::Idle;
            self.hide_state = state;
            self.current = Some(self.to);
            debug!(?state, rect = ?self.to, "animation finished");
            return Some(AnimationFrame { rect: self.to, finished: Some(state) });
        }

        let t = self.frame as f64 / self.frames as f64;
        let rect = self.from.lerp(&self.to, ease_value(t, self.easing));
        self.current = Some(rect);
        Some(AnimationFrame { rect, finished: None })
    }

    /// Abandons the transition where it is. The hide state is unchanged.
    pub fn stop(&mut self) {
        if self.phase != AnimationPhase::Idle {
            debug!(phase = ?self.phase, "animation stopped");
        }
        self.phase = AnimationPhase::Idle;
    }
}

fn ease_value(t: f64, easing: AnimationEasing) -> f64 {
    match easing {
        AnimationEasing::Linear => t,
        AnimationEasing::EaseInOut => {
            if t < 0.5 {
                (1.0 - f64::sqrt(1.0 - f64::powi(2.0 * t, 2))) / 2.0
            } else {
                (f64::sqrt(1.0 - f64::powi(-2.0 * t + 2.0, 2)) + 1.0) / 2.0
            }
        }
        AnimationEasing::EaseInSine => 1.0 - f64::cos((t * std::f64::consts::PI) / 2.0),
        AnimationEasing::EaseOutSine => f64::sin((t * std::f64::consts::PI) / 2.0),
        AnimationEasing::EaseInOutSine => -(f64::cos(std::f64::consts::PI * t) - 1.0) / 2.0,
        AnimationEasing::EaseInQuad => t * t,
        AnimationEasing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        AnimationEasing::EaseInOutQuad => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - f64::powi(-2.0 * t + 2.0, 2) / 2.0
            }
        }
        AnimationEasing::EaseInCubic => t * t * t,
        AnimationEasing::EaseOutCubic => 1.0 - f64::powi(1.0 - t, 3),
        AnimationEasing::EaseInOutCubic => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                1.0 - f64::powi(-2.0 * t + 2.0, 3) / 2.0
            }
        }
    }
}
