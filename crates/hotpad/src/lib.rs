//! Runtime discovery of game controllers.
//!
//! A [`Hotplug`] coordinator owns one background thread that talks to the
//! native driver. Every connected controller is wrapped in a
//! [`GamepadDevice`] and handed to a [`HostRegistry`], which owns it until
//! the controller goes away.

mod catalog;
mod control;
mod device;
mod driver;
mod error;
mod hotplug;
mod registry;
mod settings;
mod types;

#[cfg(feature = "sdl2-backend")]
mod sdl;

#[cfg(test)]
mod testing;

pub use crate::catalog::{Catalog, STANDARD};
pub use crate::control::{
    motor_magnitude, normalize_axis, normalize_trigger, Input, InputSource, MotorSink, Output,
    BATTERY_NAME,
};
pub use crate::device::{battery_level, Device, GamepadDevice, SOURCE};
pub use crate::driver::{Driver, DriverEvent, EventPoster, Pad};
pub use crate::error::{Error, Result};
pub use crate::hotplug::Hotplug;
pub use crate::registry::{DeviceList, HostRegistry, RegistryEvent};
pub use crate::settings::{Settings, DEFAULT_RUMBLE_DURATION_MS};
pub use crate::types::{Axis, Button, InstanceId, MotorSide, MotorState, Polarity, PowerLevel};

#[cfg(feature = "sdl2-backend")]
pub use crate::sdl::{SdlDriver, SdlPad, SdlPoster};
