//! Application wiring for the SukshmaCtl daemon
//!
//! Owns every component and drives them from one fixed-rate tick loop:
//! console keys, then the button edge, then the CAN poll and calibration, then
//! the interaction state machine with the latest calibrated orientation.

use crate::calibration::Calibrator;
use crate::can::mock::MockCanBus;
use crate::can::reader::OrientationReader;
use crate::can::slcan::SlcanBus;
use crate::can::CanBus;
use crate::config::SukshmaConfig;
use crate::control::SerialEmitter;
use crate::error::Result;
use crate::input::keyboard::{spawn_console, ConsoleEvent};
use crate::input::ButtonChannel;
use crate::interaction::Interaction;
use crate::scheduler::{Clock, MonotonicClock};
use crate::transport::SerialTransport;
use crate::ui::UiSurface;
use crossbeam_channel::Receiver;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Main application structure that manages all components
pub struct App<U: UiSurface> {
    reader: OrientationReader,
    calibrator: Calibrator,
    buttons: ButtonChannel,
    console: Option<Receiver<ConsoleEvent>>,
    interaction: Interaction<U>,
    clock: Box<dyn Clock>,
    tick_interval: Duration,
    ticks: u64,
    shut_down: bool,
}

impl<U: UiSurface> App<U> {
    pub fn new(
        reader: OrientationReader,
        buttons: ButtonChannel,
        interaction: Interaction<U>,
        clock: Box<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            reader,
            calibrator: Calibrator::new(),
            buttons,
            console: None,
            interaction,
            clock,
            tick_interval,
            ticks: 0,
            shut_down: false,
        }
    }

    /// Attach an operator console event stream
    pub fn with_console(mut self, console: Receiver<ConsoleEvent>) -> Self {
        self.console = Some(console);
        self
    }

    /// Open the hardware named in `config`.
    ///
    /// Hardware failures are not fatal: a CAN adapter that does not open
    /// disables orientation input for the session, and a serial port that does
    /// not open switches the button to the keyboard fallback.
    pub fn from_config(config: &SukshmaConfig, surface: U, mock_can: bool) -> Result<Self> {
        info!("Initializing SukshmaCtl");

        let reader = open_can(config, mock_can);

        let (buttons, emitter) = match SerialTransport::open(
            &config.serial.port,
            config.serial.baud_rate,
            config.serial.read_timeout(),
        ) {
            Ok(port) => match port.try_clone() {
                Ok(read_half) => (
                    ButtonChannel::serial(read_half)?,
                    SerialEmitter::new(Box::new(port)),
                ),
                Err(e) => {
                    warn!("Cannot share {} with the button reader: {}", port.name(), e);
                    (ButtonChannel::keyboard(), SerialEmitter::new(Box::new(port)))
                }
            },
            Err(e) => {
                warn!("Serial port {} unavailable: {}", config.serial.port, e);
                (ButtonChannel::keyboard(), SerialEmitter::disconnected())
            }
        };

        let interaction = Interaction::new(
            config.zones.clone(),
            &config.control,
            &config.interaction,
            &config.course,
            surface,
            emitter,
        );

        let mut app = Self::new(
            reader,
            buttons,
            interaction,
            Box::new(MonotonicClock::new()),
            config.interaction.tick_interval(),
        );

        if config.console.enabled {
            let keys = config.console.keys();
            match spawn_console(keys) {
                Ok(rx) => {
                    info!(
                        "Console: '{}' press, '{}' release, '{}' reset IMU",
                        keys.press, keys.release, keys.reset
                    );
                    app = app.with_console(rx);
                }
                Err(e) => warn!("Console unavailable: {}", e),
            }
        }

        Ok(app)
    }

    pub fn interaction(&self) -> &Interaction<U> {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction<U> {
        &mut self.interaction
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn buttons(&self) -> &ButtonChannel {
        &self.buttons
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Re-arm calibration; the next orientation sample becomes the zero pose
    pub fn reset_imu(&mut self) {
        self.calibrator.reset_imu();
    }

    pub fn handle_console(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::ResetImu => self.reset_imu(),
            key => self.buttons.submit_key(key),
        }
    }

    /// One pass of the main loop
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.ticks += 1;

        let events: Vec<ConsoleEvent> = match &self.console {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_console(event);
        }

        if let Some(edge) = self.buttons.poll() {
            debug!("Button {:?}", edge);
            self.interaction.handle_edge(edge, now);
        }

        if let Some(sample) = self.reader.poll() {
            self.calibrator.apply(&sample);
        }

        self.interaction.tick(now, self.calibrator.calibrated());
    }

    /// Tick at the configured rate until `running` is cleared, then shut down
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        info!(
            "Running at {:.0} Hz (button: {:?}, CAN: {})",
            1.0 / self.tick_interval.as_secs_f64(),
            self.buttons.source(),
            if self.reader.is_enabled() { "on" } else { "off" }
        );

        while running.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.tick();
            let elapsed = started.elapsed();
            if elapsed < self.tick_interval {
                std::thread::sleep(self.tick_interval - elapsed);
            }
        }

        info!("Shutdown signal received after {} ticks", self.ticks);
        self.shutdown()
    }

    /// Stop the button reader, then close serial, then close CAN
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        info!("Stopping components...");
        self.interaction.reset_ui();
        self.buttons.shutdown()?;
        self.interaction.emitter_mut().close();
        self.reader.close();
        info!("Shutdown complete");
        Ok(())
    }
}

impl<U: UiSurface> Drop for App<U> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Error during cleanup: {}", e);
        }
    }
}

fn open_can(config: &SukshmaConfig, mock_can: bool) -> OrientationReader {
    let bus: Box<dyn CanBus> = if mock_can {
        info!("Using mock CAN bus (no orientation hardware)");
        Box::new(MockCanBus::new())
    } else {
        match SlcanBus::open_serial(
            &config.can.adapter_port,
            config.can.adapter_baud,
            config.can.bitrate,
        ) {
            Ok(bus) => Box::new(bus),
            Err(e) => {
                error!(
                    "CAN adapter {} failed to initialize: {}; orientation input disabled",
                    config.can.adapter_port, e
                );
                return OrientationReader::disabled();
            }
        }
    };
    OrientationReader::new(
        bus,
        config.can.poll_every_n_ticks,
        config.can.max_frames_per_poll,
    )
}
