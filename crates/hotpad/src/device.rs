use std::any::Any;

use crate::catalog::{Catalog, STANDARD};
use crate::control::{Input, InputSource, MotorSink, Output};
use crate::driver::Pad;
use crate::settings::Settings;
use crate::types::{Axis, Button, InstanceId, MotorState, PowerLevel};

/// Source tag of every device registered by this crate.
pub const SOURCE: &str = "SDL_gamecontroller";

/// Host-facing view of a device, independent of where it came from.
pub trait Device: Send + 'static {
    fn name(&self) -> &str;
    fn source(&self) -> &str;
    /// Id the host should prefer when rebinding across sessions.
    fn preferred_id(&self) -> Option<u32> {
        None
    }
    fn sort_priority(&self) -> i32 {
        0
    }
    fn inputs(&self) -> &[Input];
    fn outputs(&self) -> &[Output];
    fn input_state(&self, input: &Input) -> f64;
    fn set_output_state(&mut self, output: &Output, state: f64);
    fn update_input(&mut self);
    fn as_any(&self) -> &dyn Any;
}

/// Map a driver power state onto a battery level.
pub fn battery_level(power: PowerLevel) -> f64 {
    match power {
        PowerLevel::Wired | PowerLevel::Full => 1.0,
        PowerLevel::Medium => 0.5,
        PowerLevel::Low => 0.3,
        PowerLevel::Empty | PowerLevel::Unknown => 0.0,
    }
}

/// Adapter exposing one opened controller as a set of named controls.
pub struct GamepadDevice<P: Pad> {
    pad: P,
    index: u32,
    name: String,
    battery_level: f64,
    motors: MotorState,
    rumble_duration_ms: u32,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl<P: Pad> GamepadDevice<P> {
    pub fn new(pad: P, index: u32, settings: &Settings) -> Self {
        Self::with_catalog(pad, index, &STANDARD, settings)
    }

    pub fn with_catalog(pad: P, index: u32, catalog: &Catalog, settings: &Settings) -> Self {
        let name = pad.name().trim().to_owned();
        Self {
            pad,
            index,
            name,
            battery_level: 0.0,
            motors: MotorState::default(),
            rumble_duration_ms: settings.rumble_duration_ms,
            inputs: catalog.inputs(),
            outputs: catalog.outputs(),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.pad.instance_id()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Push the current motor magnitudes to the hardware.
    pub fn update_motors(&mut self) {
        self.pad.rumble(self.motors.left, self.motors.right, self.rumble_duration_ms);
    }

    pub fn pad(&self) -> &P {
        &self.pad
    }
}

impl<P: Pad> InputSource for GamepadDevice<P> {
    fn button(&self, button: Button) -> bool {
        self.pad.button(button)
    }

    fn axis(&self, axis: Axis) -> i16 {
        self.pad.axis(axis)
    }

    fn battery_level(&self) -> f64 {
        self.battery_level
    }
}

impl<P: Pad> MotorSink for GamepadDevice<P> {
    fn motors(&self) -> MotorState {
        self.motors
    }

    fn commit_motors(&mut self, motors: MotorState) {
        self.motors = motors;
        self.update_motors();
    }
}

impl<P: Pad> Device for GamepadDevice<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> &str {
        SOURCE
    }

    fn preferred_id(&self) -> Option<u32> {
        Some(self.index)
    }

    fn sort_priority(&self) -> i32 {
        -1
    }

    fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    fn input_state(&self, input: &Input) -> f64 {
        input.state(self)
    }

    fn set_output_state(&mut self, output: &Output, state: f64) {
        output.set_state(self, state);
    }

    fn update_input(&mut self) {
        self.pad.update();
        self.battery_level = battery_level(self.pad.power_level());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePad;
    use crate::types::MotorSide;

    fn device(pad: FakePad) -> GamepadDevice<FakePad> {
        GamepadDevice::new(pad, 3, &Settings::default())
    }

    #[test]
    fn battery_mapping_is_exact() {
        assert_eq!(battery_level(PowerLevel::Wired), 1.0);
        assert_eq!(battery_level(PowerLevel::Full), 1.0);
        assert_eq!(battery_level(PowerLevel::Medium), 0.5);
        assert_eq!(battery_level(PowerLevel::Low), 0.3);
        assert_eq!(battery_level(PowerLevel::Empty), 0.0);
        assert_eq!(battery_level(PowerLevel::Unknown), 0.0);
    }

    #[test]
    fn name_is_trimmed() {
        let device = device(FakePad::new("  Xbox Controller \n", 9));
        assert_eq!(device.name(), "Xbox Controller");
        assert_eq!(device.instance_id(), 9);
        assert_eq!(device.source(), SOURCE);
    }

    #[test]
    fn preferred_id_is_construction_index() {
        let device = device(FakePad::new("Pad", 1));
        assert_eq!(device.preferred_id(), Some(3));
        assert_eq!(device.index(), 3);
    }

    #[test]
    fn exposes_standard_controls() {
        let device = device(FakePad::new("Pad", 1));
        assert_eq!(device.inputs().len(), 27);
        assert_eq!(device.outputs().len(), 2);
    }

    #[test]
    fn update_input_refreshes_battery() {
        let mut pad = FakePad::new("Pad", 1);
        pad.power = PowerLevel::Medium;
        let mut device = device(pad);
        assert_eq!(device.battery_level(), 0.0);

        device.update_input();
        assert_eq!(device.battery_level(), 0.5);
        assert_eq!(device.pad().updates, 1);

        let battery = *device.inputs().last().unwrap();
        assert_eq!(device.input_state(&battery), 0.5);
    }

    #[test]
    fn reads_go_through_pad() {
        let mut pad = FakePad::new("Pad", 1);
        pad.buttons = Button::Start.bit();
        pad.axes[Axis::RightY.index()] = Axis::MIN;
        let device = device(pad);

        let value = |name: &str| {
            let input = device
                .inputs()
                .iter()
                .find(|input| input.name() == name)
                .copied()
                .unwrap();
            device.input_state(&input)
        };
        assert_eq!(value("Start"), 1.0);
        assert_eq!(value("Back"), 0.0);
        assert_eq!(value("Right Y-"), 1.0);
        assert_eq!(value("Right Y+"), 0.0);
    }

    #[test]
    fn motor_writes_reach_pad_once_per_change() {
        let mut device = device(FakePad::new("Pad", 1));
        let left = device.outputs()[0];
        let right = device.outputs()[1];

        device.set_output_state(&left, 0.0);
        assert!(device.pad().rumbles.is_empty());

        device.set_output_state(&left, 1.0);
        device.set_output_state(&left, 1.0);
        device.set_output_state(&right, 0.5);

        let rumbles = &device.pad().rumbles;
        assert_eq!(rumbles.len(), 2);
        assert_eq!(rumbles[0], (u16::MAX, 0, Settings::default().rumble_duration_ms));
        assert_eq!(rumbles[1].0, u16::MAX);
        assert_eq!(rumbles[1].1, device.motors().get(MotorSide::Right));
    }
}
