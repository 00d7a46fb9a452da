//! Named controls of a device.
//!
//! Controls are plain descriptors. They never hold on to the device they
//! belong to; the device is lent to them for the duration of a read or write.

use std::borrow::Cow;

use crate::types::{Axis, Button, MotorSide, MotorState, Polarity};

/// Display name of the battery input.
pub const BATTERY_NAME: &str = "Battery";

/// Read access a device grants to its inputs.
pub trait InputSource {
    fn button(&self, button: Button) -> bool;
    fn axis(&self, axis: Axis) -> i16;
    fn battery_level(&self) -> f64;
}

/// Write access a device grants to its motors.
pub trait MotorSink {
    /// Magnitudes of the last commit.
    fn motors(&self) -> MotorState;
    /// Store new magnitudes and push them to the hardware.
    fn commit_motors(&mut self, motors: MotorState);
}

/// A readable control with a state in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Button {
        name: &'static str,
        button: Button,
    },
    /// One half of a stick axis.
    Axis {
        name: &'static str,
        axis: Axis,
        polarity: Polarity,
    },
    Trigger {
        name: &'static str,
        axis: Axis,
    },
    Battery,
}

impl Input {
    pub fn name(&self) -> Cow<'static, str> {
        match *self {
            Input::Button { name, .. } | Input::Trigger { name, .. } => Cow::Borrowed(name),
            Input::Axis { name, polarity, .. } => {
                let sign = match polarity {
                    Polarity::Negative => '-',
                    Polarity::Positive => '+',
                };
                Cow::Owned(format!("{name}{sign}"))
            }
            Input::Battery => Cow::Borrowed(BATTERY_NAME),
        }
    }

    /// Whether the host may use this input to detect user activity.
    /// Battery level changes on its own, so it is not detectable.
    pub fn is_detectable(&self) -> bool {
        !matches!(self, Input::Battery)
    }

    pub fn state<S: InputSource + ?Sized>(&self, source: &S) -> f64 {
        match *self {
            Input::Button { button, .. } => {
                if source.button(button) {
                    1.0
                } else {
                    0.0
                }
            }
            Input::Axis { axis, polarity, .. } => normalize_axis(source.axis(axis), polarity),
            Input::Trigger { axis, .. } => normalize_trigger(source.axis(axis)),
            Input::Battery => source.battery_level(),
        }
    }
}

/// A writable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Motor { name: &'static str, side: MotorSide },
}

impl Output {
    pub fn name(&self) -> Cow<'static, str> {
        let Output::Motor { name, .. } = *self;
        Cow::Borrowed(name)
    }

    /// Request a new state in `[0.0, 1.0]`. Hardware is only touched when
    /// the resulting 16-bit magnitude differs from the committed one.
    pub fn set_state<S: MotorSink + ?Sized>(&self, sink: &mut S, state: f64) {
        let Output::Motor { side, .. } = *self;
        let magnitude = motor_magnitude(state);
        let mut motors = sink.motors();
        if motors.get(side) == magnitude {
            return;
        }
        motors.set(side, magnitude);
        sink.commit_motors(motors);
    }
}

/// Map a raw stick sample onto one polarity. The opposite half reads as 0.
pub fn normalize_axis(raw: i16, polarity: Polarity) -> f64 {
    match polarity {
        Polarity::Positive if raw > 0 => f64::from(raw) / f64::from(Axis::MAX),
        Polarity::Negative if raw < 0 => f64::from(raw) / f64::from(Axis::MIN),
        _ => 0.0,
    }
}

pub fn normalize_trigger(raw: i16) -> f64 {
    f64::from(raw.max(0)) / f64::from(Axis::MAX)
}

/// Convert a requested fraction into a motor magnitude.
pub fn motor_magnitude(state: f64) -> u16 {
    (state.clamp(0.0, 1.0) * f64::from(u16::MAX)) as u16
}
