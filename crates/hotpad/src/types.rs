/// Driver-assigned identifier of an opened controller, stable for as long
/// as the device stays connected.
pub type InstanceId = u32;

/// Logical controller buttons understood by the driver layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Start,
    Back,
    LeftShoulder,
    RightShoulder,
    Guide,
    LeftStick,
    RightStick,
    Touchpad,
}

impl Button {
    pub const ALL: [Button; 16] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::DPadUp,
        Button::DPadDown,
        Button::DPadLeft,
        Button::DPadRight,
        Button::Start,
        Button::Back,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::Guide,
        Button::LeftStick,
        Button::RightStick,
        Button::Touchpad,
    ];

    /// Single-bit mask of the button inside a packed button state.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Analog axes of a controller. Stick axes are signed, triggers only
/// report the positive half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::LeftX,
        Axis::LeftY,
        Axis::RightX,
        Axis::RightY,
        Axis::TriggerLeft,
        Axis::TriggerRight,
    ];

    /// Raw sample at the negative end of a stick axis.
    pub const MIN: i16 = i16::MIN;
    /// Raw sample at the positive end of any axis.
    pub const MAX: i16 = i16::MAX;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Half of a bidirectional axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Negative,
    Positive,
}

/// Rumble motor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSide {
    Left,
    Right,
}

/// Power state reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerLevel {
    #[default]
    Unknown,
    Empty,
    Low,
    Medium,
    Full,
    Wired,
}

impl PowerLevel {
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => PowerLevel::Empty,
            2 => PowerLevel::Low,
            3 => PowerLevel::Medium,
            4 => PowerLevel::Full,
            5 => PowerLevel::Wired,
            _ => PowerLevel::Unknown,
        }
    }
}

/// Last committed rumble magnitudes of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorState {
    pub left: u16,
    pub right: u16,
}

impl MotorState {
    #[inline]
    pub const fn get(self, side: MotorSide) -> u16 {
        match side {
            MotorSide::Left => self.left,
            MotorSide::Right => self.right,
        }
    }

    #[inline]
    pub fn set(&mut self, side: MotorSide, value: u16) {
        match side {
            MotorSide::Left => self.left = value,
            MotorSide::Right => self.right = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_are_distinct() {
        let mut seen = 0u32;
        for button in Button::ALL {
            assert_eq!(seen & button.bit(), 0, "{button:?} overlaps");
            seen |= button.bit();
        }
        assert_eq!(seen.count_ones(), 16);
    }

    #[test]
    fn power_level_survives_packing() {
        for level in [
            PowerLevel::Unknown,
            PowerLevel::Empty,
            PowerLevel::Low,
            PowerLevel::Medium,
            PowerLevel::Full,
            PowerLevel::Wired,
        ] {
            assert_eq!(PowerLevel::from_u8(level.to_u8()), level);
        }
        assert_eq!(PowerLevel::from_u8(200), PowerLevel::Unknown);
    }

    #[test]
    fn motor_state_sides_are_independent() {
        let mut motors = MotorState::default();
        motors.set(MotorSide::Right, 7);
        assert_eq!(motors.get(MotorSide::Left), 0);
        assert_eq!(motors.get(MotorSide::Right), 7);
    }
}
