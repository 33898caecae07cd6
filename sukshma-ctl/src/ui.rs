//! Visibility surface implemented by whatever renders the rig's UI.
//!
//! The control core never draws anything. It asks a [`UiSurface`] to show,
//! hide or flash a closed set of [`UiTarget`]s and, for the slider modes, to
//! display a level. A renderer binds the targets it actually has; the
//! `*_bound` helpers skip unbound targets with a warning, and every caller in
//! the control core goes through them.
//!
//! - [`LogSurface`]: logs every change, used by the daemon when headless
//! - [`RecordingSurface`]: records every call, used by tests

use crate::core::types::{ControlMode, HoverZone};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Every UI element the control core can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiTarget {
    /// Container holding the hover targets while the button is held
    Container,
    /// Highlight for one hover zone
    Hover(HoverZone),
    /// Confirmation shown after a cancel selection
    ConfirmCancel,
    /// Panel shown while a control mode is active
    ModePanel(ControlMode),
    /// Level slider for Zoom and Light
    Slider(ControlMode),
    /// Shown while an Unlock stream is running
    StreamingIndicator,
    /// Completion mark for a course task (1-based)
    Checkmark(u8),
}

impl fmt::Display for UiTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiTarget::Container => write!(f, "container"),
            UiTarget::Hover(zone) => write!(f, "hover:{:?}", zone),
            UiTarget::ConfirmCancel => write!(f, "confirm-cancel"),
            UiTarget::ModePanel(mode) => write!(f, "panel:{:?}", mode),
            UiTarget::Slider(mode) => write!(f, "slider:{:?}", mode),
            UiTarget::StreamingIndicator => write!(f, "streaming"),
            UiTarget::Checkmark(n) => write!(f, "checkmark:{}", n),
        }
    }
}

/// Capability interface towards the renderer
pub trait UiSurface {
    fn show(&mut self, target: UiTarget);

    fn hide(&mut self, target: UiTarget);

    /// Show a target briefly; the renderer hides it again after `duration`
    fn flash_for(&mut self, target: UiTarget, duration: Duration);

    /// Whether the renderer has an element for this target
    fn is_bound(&self, _target: UiTarget) -> bool {
        true
    }

    /// Display a continuous level on a slider target
    fn set_level(&mut self, _target: UiTarget, _value: f32) {}

    /// [`show`](Self::show), skipped with a warning when unbound
    fn show_bound(&mut self, target: UiTarget) {
        if self.is_bound(target) {
            self.show(target);
        } else {
            log::warn!("UI target {} not bound, skipping show", target);
        }
    }

    /// [`hide`](Self::hide), skipped when unbound.
    ///
    /// Logged at debug level: every hover session hides all hover targets.
    fn hide_bound(&mut self, target: UiTarget) {
        if self.is_bound(target) {
            self.hide(target);
        } else {
            log::debug!("UI target {} not bound, skipping hide", target);
        }
    }

    /// [`flash_for`](Self::flash_for), skipped with a warning when unbound
    fn flash_bound(&mut self, target: UiTarget, duration: Duration) {
        if self.is_bound(target) {
            self.flash_for(target, duration);
        } else {
            log::warn!("UI target {} not bound, skipping flash", target);
        }
    }

    /// [`set_level`](Self::set_level), skipped when unbound
    fn set_level_bound(&mut self, target: UiTarget, value: f32) {
        if self.is_bound(target) {
            self.set_level(target, value);
        } else {
            log::debug!("UI target {} not bound, skipping level", target);
        }
    }
}

/// Headless surface that only logs
#[derive(Debug, Default)]
pub struct LogSurface;

impl UiSurface for LogSurface {
    fn show(&mut self, target: UiTarget) {
        log::info!("UI show {}", target);
    }

    fn hide(&mut self, target: UiTarget) {
        log::debug!("UI hide {}", target);
    }

    fn flash_for(&mut self, target: UiTarget, duration: Duration) {
        log::info!("UI flash {} for {:?}", target, duration);
    }

    fn set_level(&mut self, target: UiTarget, value: f32) {
        log::trace!("UI level {} = {:.2}", target, value);
    }
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Show(UiTarget),
    Hide(UiTarget),
    Flash(UiTarget, Duration),
    Level(UiTarget, f32),
}

/// Surface that records calls and tracks visibility
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Vec<UiEvent>,
    visible: HashSet<UiTarget>,
    unbound: HashSet<UiTarget>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the renderer has no element for `target`
    pub fn unbind(&mut self, target: UiTarget) {
        self.unbound.insert(target);
    }

    pub fn events(&self) -> &[UiEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn is_visible(&self, target: UiTarget) -> bool {
        self.visible.contains(&target)
    }

    /// Visible hover targets, in [`HoverZone::SELECTABLE`] order
    pub fn visible_hovers(&self) -> Vec<HoverZone> {
        HoverZone::SELECTABLE
            .into_iter()
            .filter(|zone| self.is_visible(UiTarget::Hover(*zone)))
            .collect()
    }

    /// Most recent level published to `target`
    pub fn last_level(&self, target: UiTarget) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match e {
            UiEvent::Level(t, v) if *t == target => Some(*v),
            _ => None,
        })
    }

    pub fn flashes(&self) -> Vec<UiTarget> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Flash(t, _) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl UiSurface for RecordingSurface {
    fn show(&mut self, target: UiTarget) {
        self.visible.insert(target);
        self.events.push(UiEvent::Show(target));
    }

    fn hide(&mut self, target: UiTarget) {
        self.visible.remove(&target);
        self.events.push(UiEvent::Hide(target));
    }

    fn flash_for(&mut self, target: UiTarget, duration: Duration) {
        self.events.push(UiEvent::Flash(target, duration));
    }

    fn is_bound(&self, target: UiTarget) -> bool {
        !self.unbound.contains(&target)
    }

    fn set_level(&mut self, target: UiTarget, value: f32) {
        self.events.push(UiEvent::Level(target, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_tracks_visibility() {
        let mut ui = RecordingSurface::new();
        ui.show(UiTarget::Container);
        ui.show(UiTarget::Hover(HoverZone::Zoom));
        ui.hide(UiTarget::Container);

        assert!(!ui.is_visible(UiTarget::Container));
        assert_eq!(ui.visible_hovers(), vec![HoverZone::Zoom]);
        assert_eq!(ui.events().len(), 3);
    }

    #[test]
    fn test_unbound_targets() {
        let mut ui = RecordingSurface::new();
        let slider = UiTarget::Slider(ControlMode::Zoom);
        assert!(ui.is_bound(slider));
        ui.unbind(slider);
        assert!(!ui.is_bound(slider));
    }

    #[test]
    fn test_bound_helpers_skip_unbound_targets() {
        let mut ui = RecordingSurface::new();
        let hover = UiTarget::Hover(HoverZone::Light);
        ui.unbind(hover);
        ui.show_bound(hover);
        ui.hide_bound(hover);
        ui.flash_bound(hover, Duration::from_secs(1));
        ui.set_level_bound(hover, 1.0);
        assert!(ui.events().is_empty());

        ui.show_bound(UiTarget::Container);
        assert_eq!(ui.events(), &[UiEvent::Show(UiTarget::Container)]);
    }

    #[test]
    fn test_last_level() {
        let mut ui = RecordingSurface::new();
        let slider = UiTarget::Slider(ControlMode::Light);
        assert_eq!(ui.last_level(slider), None);
        ui.set_level(slider, 2.0);
        ui.set_level(UiTarget::Slider(ControlMode::Zoom), 9.0);
        ui.set_level(slider, 4.5);
        assert_eq!(ui.last_level(slider), Some(4.5));
    }

    #[test]
    fn test_log_surface_default_binding() {
        let ui = LogSurface;
        assert!(ui.is_bound(UiTarget::Checkmark(3)));
    }
}
