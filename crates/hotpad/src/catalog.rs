use crate::control::{Input, Output};
use crate::types::{Axis, Button, MotorSide, Polarity};

/// Static table of the controls a device family exposes, in the order they
/// are presented to the host.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub buttons: &'static [(&'static str, Button)],
    pub triggers: &'static [(&'static str, Axis)],
    pub sticks: &'static [(&'static str, Axis)],
    pub motors: &'static [(&'static str, MotorSide)],
}

const BUTTONS: [(&str, Button); 16] = [
    ("Button A", Button::A),
    ("Button B", Button::B),
    ("Button X", Button::X),
    ("Button Y", Button::Y),
    ("Pad N", Button::DPadUp),
    ("Pad S", Button::DPadDown),
    ("Pad W", Button::DPadLeft),
    ("Pad E", Button::DPadRight),
    ("Start", Button::Start),
    ("Back", Button::Back),
    ("Shoulder L", Button::LeftShoulder),
    ("Shoulder R", Button::RightShoulder),
    ("Guide", Button::Guide),
    ("Thumb L", Button::LeftStick),
    ("Thumb R", Button::RightStick),
    ("Touchpad", Button::Touchpad),
];

const TRIGGERS: [(&str, Axis); 2] = [
    ("Trigger L", Axis::TriggerLeft),
    ("Trigger R", Axis::TriggerRight),
];

const STICKS: [(&str, Axis); 4] = [
    ("Left X", Axis::LeftX),
    ("Left Y", Axis::LeftY),
    ("Right X", Axis::RightX),
    ("Right Y", Axis::RightY),
];

const MOTORS: [(&str, MotorSide); 2] =
    [("Motor L", MotorSide::Left), ("Motor R", MotorSide::Right)];

/// Standard game controller layout.
pub static STANDARD: Catalog = Catalog {
    buttons: &BUTTONS,
    triggers: &TRIGGERS,
    sticks: &STICKS,
    motors: &MOTORS,
};

impl Catalog {
    /// Buttons, then triggers, then both halves of every stick axis
    /// (negative first), then the battery.
    pub fn inputs(&self) -> Vec<Input> {
        let mut inputs = Vec::with_capacity(
            self.buttons.len() + self.triggers.len() + self.sticks.len() * 2 + 1,
        );
        inputs.extend(
            self.buttons
                .iter()
                .map(|&(name, button)| Input::Button { name, button }),
        );
        inputs.extend(
            self.triggers
                .iter()
                .map(|&(name, axis)| Input::Trigger { name, axis }),
        );
        for &(name, axis) in self.sticks {
            for polarity in [Polarity::Negative, Polarity::Positive] {
                inputs.push(Input::Axis {
                    name,
                    axis,
                    polarity,
                });
            }
        }
        inputs.push(Input::Battery);
        inputs
    }

    pub fn outputs(&self) -> Vec<Output> {
        self.motors
            .iter()
            .map(|&(name, side)| Output::Motor { name, side })
            .collect()
    }
}
