//! End-to-end runs of the tick loop against mock hardware.

use std::time::Duration;
use sukshma_ctl::app::App;
use sukshma_ctl::can::mock::MockCanBus;
use sukshma_ctl::can::reader::OrientationReader;
use sukshma_ctl::control::{ControlConfig, PayloadFormat, SerialEmitter};
use sukshma_ctl::course::CourseConfig;
use sukshma_ctl::input::keyboard::ConsoleEvent;
use sukshma_ctl::input::ButtonChannel;
use sukshma_ctl::interaction::{Interaction, InteractionConfig};
use sukshma_ctl::scheduler::ManualClock;
use sukshma_ctl::transport::MockTransport;
use sukshma_ctl::ui::{RecordingSurface, UiTarget};
use sukshma_ctl::zones::ZoneTable;
use sukshma_ctl::{ControlMode, HoverZone, InteractionMode, OrientationSample};

const TICK: Duration = Duration::from_millis(16);

struct Rig {
    app: App<RecordingSurface>,
    bus: MockCanBus,
    serial: MockTransport,
    clock: ManualClock,
}

impl Rig {
    fn new(control: ControlConfig) -> Self {
        let bus = MockCanBus::new();
        let serial = MockTransport::new();
        let clock = ManualClock::new();
        let interaction = Interaction::new(
            ZoneTable::default(),
            &control,
            &InteractionConfig::default(),
            &CourseConfig::default(),
            RecordingSurface::new(),
            SerialEmitter::new(Box::new(serial.clone())),
        );
        let app = App::new(
            OrientationReader::new(Box::new(bus.clone()), 1, 8),
            ButtonChannel::keyboard(),
            interaction,
            Box::new(clock.clone()),
            TICK,
        );
        Self {
            app,
            bus,
            serial,
            clock,
        }
    }

    fn step(&mut self) {
        self.clock.advance(TICK);
        self.app.tick();
    }

    fn press(&mut self) {
        self.app.handle_console(ConsoleEvent::Press);
        self.step();
    }

    fn release(&mut self) {
        self.app.handle_console(ConsoleEvent::Release);
        self.step();
    }

    /// Sensor-space sample whose engine-space rotation is `deg` about X
    fn tilt_x(&mut self, deg: f32) {
        let half = (deg / 2.0).to_radians();
        self.bus
            .inject_sample(OrientationSample::new(half.cos(), half.sin(), 0.0, 0.0));
        self.step();
    }

    /// Sensor-space sample whose engine-space rotation is `deg` about Y
    fn turn_y(&mut self, deg: f32) {
        let half = (deg / 2.0).to_radians();
        // Engine y is the negated sensor y
        self.bus
            .inject_sample(OrientationSample::new(half.cos(), 0.0, -half.sin(), 0.0));
        self.step();
    }

    fn mode(&self) -> InteractionMode {
        self.app.interaction().mode()
    }
}

#[test]
fn unlock_then_stream_pan() {
    let mut rig = Rig::new(ControlConfig::default());

    // Zero pose
    rig.tilt_x(0.0);
    assert!(rig.app.calibrator().is_offset_set());

    // Calibrated X = 350
    rig.tilt_x(-10.0);

    rig.press();
    assert_eq!(rig.mode(), InteractionMode::Hovering(HoverZone::Unlock));
    assert!(rig.app.interaction().surface().is_visible(UiTarget::Container));

    rig.release();
    assert_eq!(rig.mode(), InteractionMode::Unlocked);
    assert!(rig.serial.get_written().is_empty());

    rig.press();
    let lines = rig.serial.written_lines();
    assert_eq!(lines.len(), 1);
    let first = &lines[0];
    assert!(first.starts_with('X'), "{}", first);
    let x: i32 = first[1..first.find(',').unwrap()].parse().unwrap();
    assert!((-45..=45).contains(&x));
    assert_eq!(first, "X20,Y70,Z0,L5");

    // 100 ms later another line goes out
    for _ in 0..7 {
        rig.step();
    }
    assert_eq!(rig.serial.written_lines().len(), 2);

    rig.release();
    assert_eq!(rig.mode(), InteractionMode::Idle);
    let sent = rig.serial.written_lines().len();
    for _ in 0..20 {
        rig.step();
    }
    assert_eq!(rig.serial.written_lines().len(), sent);
}

#[test]
fn unlock_stream_labeled_with_flags() {
    let control = ControlConfig {
        format: PayloadFormat::LabeledWithFlags,
        ..ControlConfig::default()
    };
    let mut rig = Rig::new(control);
    rig.tilt_x(0.0);
    rig.tilt_x(-10.0);

    rig.press();
    rig.release();
    assert_eq!(rig.mode(), InteractionMode::Unlocked);

    rig.press();
    let lines = rig.serial.written_lines();
    assert_eq!(lines.len(), 1);
    let first = &lines[0];
    let x_field = first
        .split(',')
        .find_map(|field| field.strip_prefix("X:"))
        .unwrap();
    let x: f32 = x_field.parse().unwrap();
    assert!((-45.0..=45.0).contains(&x), "{}", first);
    assert!(first.ends_with(",L:1,B:1"), "{}", first);
    assert_eq!(first, "X:20.00,Y:70.00,Z:0.00,L:1,B:1");
}

#[test]
fn recalibration_moves_zero_pose() {
    let mut rig = Rig::new(ControlConfig::default());
    rig.tilt_x(0.0);
    rig.tilt_x(-10.0);

    // Make the current pose the new zero; pointing straight ahead hovers nothing
    rig.app.handle_console(ConsoleEvent::ResetImu);
    rig.tilt_x(-10.0);
    rig.press();
    assert_eq!(rig.mode(), InteractionMode::Hovering(HoverZone::None));
    rig.release();
    assert_eq!(rig.mode(), InteractionMode::Idle);
}

#[test]
fn cancel_sends_nothing() {
    let mut rig = Rig::new(ControlConfig::default());
    rig.tilt_x(0.0);
    rig.turn_y(-20.0);

    rig.press();
    assert_eq!(rig.mode(), InteractionMode::Hovering(HoverZone::Cancel));
    rig.release();
    assert_eq!(rig.mode(), InteractionMode::Idle);
    assert_eq!(
        rig.app.interaction().surface().flashes(),
        vec![UiTarget::ConfirmCancel]
    );
    assert!(rig.serial.get_written().is_empty());
}

#[test]
fn zoom_stream_labeled_format() {
    let control = ControlConfig {
        format: PayloadFormat::Labeled,
        ..ControlConfig::default()
    };
    let mut rig = Rig::new(control);
    rig.tilt_x(0.0);
    rig.tilt_x(-80.0);

    rig.press();
    rig.release();
    assert_eq!(rig.mode(), InteractionMode::ZoomActive);

    // Y = 312.5 sits mid-band: zoom 15
    rig.turn_y(-47.5);
    rig.press();
    assert_eq!(rig.serial.written_lines(), vec!["X:0.00,Y:0.00,Z:15.00"]);

    let slider = UiTarget::Slider(ControlMode::Zoom);
    let level = rig.app.interaction().surface().last_level(slider).unwrap();
    assert!((level - 15.0).abs() < 0.05, "level {}", level);
}
