//! Interaction mode state machine.
//!
//! ```text
//!            press                    release (zone still active)
//!   Idle ──────────────► Hovering ───────────────────────────► Unlocked / ZoomActive / LightActive
//!    ▲                      │  release (cancel, none, rejected)         │ press: start stream
//!    └──────────────────────┘                                           │ release: stop, exit
//!    ▲                                                                  │
//!    └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Button edges drive transitions through [`Interaction::handle_edge`]; the
//! tick loop calls [`Interaction::tick`] with the latest calibrated orientation
//! to classify hover zones, run stream steps and delayed hides, and check the
//! course. Everything runs on the caller's thread; time comes in as an
//! argument so tests can drive it with a manual clock.

use crate::control::{ControlCommand, ControlConfig, ControlMapper, PayloadFormat, SerialEmitter};
use crate::core::orientation::EulerAngles;
use crate::core::types::{ButtonEdge, ControlMode, HoverZone, InteractionMode};
use crate::course::{CourseConfig, CourseTracker};
use crate::error::{Error, Result};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::ui::{UiSurface, UiTarget};
use crate::zones::{ZoneClassifier, ZoneTable};
use glam::Quat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[interaction]` section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Main loop rate in Hz (default: 60)
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// How long confirmation flashes stay visible (default: 1000)
    #[serde(default = "default_confirmation_flash_ms")]
    pub confirmation_flash_ms: u64,

    /// Delay before a mode's panel is hidden after leaving it (default: 2000)
    #[serde(default = "default_exit_hide_delay_ms")]
    pub exit_hide_delay_ms: u64,
}

fn default_tick_hz() -> u32 {
    60
}

fn default_confirmation_flash_ms() -> u64 {
    1000
}

fn default_exit_hide_delay_ms() -> u64 {
    2000
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            confirmation_flash_ms: default_confirmation_flash_ms(),
            exit_hide_delay_ms: default_exit_hide_delay_ms(),
        }
    }
}

impl InteractionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 || self.tick_hz > 1000 {
            return Err(Error::Config(format!(
                "interaction.tick_hz must be in 1..=1000, got {}",
                self.tick_hz
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Stream(ControlMode),
    Hide(UiTarget),
}

pub struct Interaction<U: UiSurface> {
    mode: InteractionMode,
    classifier: ZoneClassifier,
    mapper: ControlMapper,
    command: ControlCommand,
    format: PayloadFormat,
    timers: Scheduler<TimerEvent>,
    stream: Option<TaskHandle>,
    pending_hides: Vec<(ControlMode, TaskHandle)>,
    surface: U,
    emitter: SerialEmitter,
    stream_interval: Duration,
    confirmation_flash: Duration,
    exit_hide_delay: Duration,
    course: Option<CourseTracker>,
    orientation: Quat,
}

impl<U: UiSurface> Interaction<U> {
    pub fn new(
        zones: ZoneTable,
        control: &ControlConfig,
        timing: &InteractionConfig,
        course: &CourseConfig,
        mut surface: U,
        emitter: SerialEmitter,
    ) -> Self {
        surface.hide_bound(UiTarget::Container);

        let course = if course.enabled {
            let mut tracker = CourseTracker::new(course);
            tracker.reset(&mut surface);
            log::info!("Course enabled with {} tasks", course.tasks.len());
            Some(tracker)
        } else {
            None
        };

        Self {
            mode: InteractionMode::Idle,
            classifier: ZoneClassifier::new(zones),
            mapper: control.mapper(),
            command: control.initial,
            format: control.format,
            timers: Scheduler::new(),
            stream: None,
            pending_hides: Vec::new(),
            surface,
            emitter,
            stream_interval: control.stream_interval(),
            confirmation_flash: Duration::from_millis(timing.confirmation_flash_ms),
            exit_hide_delay: Duration::from_millis(timing.exit_hide_delay_ms),
            course,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn command(&self) -> &ControlCommand {
        &self.command
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn emitter_mut(&mut self) -> &mut SerialEmitter {
        &mut self.emitter
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn course(&self) -> Option<&CourseTracker> {
        self.course.as_ref()
    }

    /// Apply a button edge at time `now`
    pub fn handle_edge(&mut self, edge: ButtonEdge, now: Duration) {
        match (self.mode, edge) {
            (InteractionMode::Idle, ButtonEdge::Pressed) => self.enter_hover(),
            (InteractionMode::Hovering(_), ButtonEdge::Released) => self.select(),
            (mode, ButtonEdge::Pressed) if mode.control_mode().is_some() => {
                if let Some(control) = mode.control_mode() {
                    self.start_stream(control, now);
                }
            }
            (mode, ButtonEdge::Released) if mode.control_mode().is_some() => self.exit_mode(now),
            (mode, edge) => log::debug!("Ignoring {:?} in {}", edge, mode),
        }
    }

    /// Advance one tick with the latest calibrated orientation
    pub fn tick(&mut self, now: Duration, orientation: Quat) {
        self.orientation = orientation;
        let euler = EulerAngles::from_quat(orientation);

        if let InteractionMode::Hovering(_) = self.mode {
            let zone = self.classifier.classify(&euler, &mut self.surface);
            self.set_mode(InteractionMode::Hovering(zone));
        }

        for event in self.timers.due(now) {
            match event {
                TimerEvent::Stream(mode) => self.stream_step(mode, &euler),
                TimerEvent::Hide(target) => self.surface.hide_bound(target),
            }
        }
        self.pending_hides.retain(|(_, h)| !h.is_cancelled());

        if let Some(course) = self.course.as_mut() {
            course.check(&self.command, &mut self.surface);
        }
    }

    /// Stop any stream, drop timers and return to a clean Idle screen
    pub fn reset_ui(&mut self) {
        self.stop_stream();
        self.timers.clear();
        self.pending_hides.clear();
        self.classifier.clear(&mut self.surface);
        self.surface.hide_bound(UiTarget::Container);
        self.surface.hide_bound(UiTarget::ConfirmCancel);
        for mode in [ControlMode::Unlock, ControlMode::Zoom, ControlMode::Light] {
            self.surface.hide_bound(UiTarget::ModePanel(mode));
            if mode.has_slider() {
                self.surface.hide_bound(UiTarget::Slider(mode));
            }
        }
        if let Some(course) = self.course.as_mut() {
            course.reset(&mut self.surface);
        }
        self.set_mode(InteractionMode::Idle);
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            log::info!("Mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn enter_hover(&mut self) {
        self.classifier.begin_session(&mut self.surface);
        self.show(UiTarget::Container);
        let euler = EulerAngles::from_quat(self.orientation);
        let zone = self.classifier.classify(&euler, &mut self.surface);
        self.set_mode(InteractionMode::Hovering(zone));
    }

    fn select(&mut self) {
        let zone = self.classifier.last_hovered();
        let active = self.classifier.active();
        let mut next = InteractionMode::Idle;

        match zone {
            HoverZone::None => log::debug!("Released with no zone hovered"),
            HoverZone::Cancel => {
                log::info!("Cancel selected");
                self.flash(UiTarget::ConfirmCancel);
            }
            zone => {
                if let Some(mode) = zone.control_mode() {
                    if active != zone {
                        log::info!("{:?} rejected: pointing at {:?} on release", zone, active);
                        self.flash(UiTarget::Hover(zone));
                    } else if mode.has_slider() && !self.surface.is_bound(UiTarget::Slider(mode)) {
                        log::warn!("{:?} mode unavailable: no slider bound", mode);
                    } else {
                        self.enter_mode(mode);
                        next = mode.interaction_mode();
                    }
                }
            }
        }

        self.surface.hide_bound(UiTarget::Container);
        self.classifier.clear(&mut self.surface);
        self.set_mode(next);
    }

    fn enter_mode(&mut self, mode: ControlMode) {
        // Re-entering before the exit hide fired keeps the panel up
        self.pending_hides.retain(|(pending, handle)| {
            if *pending == mode {
                handle.cancel();
                false
            } else {
                true
            }
        });
        self.show(UiTarget::ModePanel(mode));
        if mode.has_slider() {
            let slider = UiTarget::Slider(mode);
            self.show(slider);
            self.surface.set_level_bound(slider, 0.0);
        }
    }

    fn start_stream(&mut self, mode: ControlMode, now: Duration) {
        if self.stream.is_some() {
            log::debug!("{:?} stream already running", mode);
            return;
        }
        log::info!("{:?} streaming every {:?}", mode, self.stream_interval);
        let handle = self
            .timers
            .every(now, self.stream_interval, TimerEvent::Stream(mode));
        self.stream = Some(handle);
        if mode == ControlMode::Unlock {
            self.show(UiTarget::StreamingIndicator);
        }
    }

    fn stop_stream(&mut self) {
        if let Some(handle) = self.stream.take() {
            handle.cancel();
            self.surface.hide_bound(UiTarget::StreamingIndicator);
            log::info!(
                "Stream stopped ({} lines sent, {} failed)",
                self.emitter.sent(),
                self.emitter.failed()
            );
        }
    }

    fn exit_mode(&mut self, now: Duration) {
        let Some(mode) = self.mode.control_mode() else {
            return;
        };
        self.stop_stream();

        let mut targets = vec![UiTarget::ModePanel(mode)];
        if mode.has_slider() {
            targets.push(UiTarget::Slider(mode));
        }
        for target in targets {
            let handle = self
                .timers
                .after(now, self.exit_hide_delay, TimerEvent::Hide(target));
            self.pending_hides.push((mode, handle));
        }
        self.set_mode(InteractionMode::Idle);
    }

    fn stream_step(&mut self, mode: ControlMode, euler: &EulerAngles) {
        if self.mode.control_mode() != Some(mode) {
            return;
        }
        if let Some(level) = self.mapper.apply(mode, euler, &mut self.command) {
            self.surface.set_level_bound(UiTarget::Slider(mode), level);
        }
        let line = self.command.encode(self.format);
        self.emitter.emit(&line);
    }

    fn show(&mut self, target: UiTarget) {
        self.surface.show_bound(target);
    }

    fn flash(&mut self, target: UiTarget) {
        self.surface.flash_bound(target, self.confirmation_flash);
    }
}
