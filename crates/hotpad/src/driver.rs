use crate::error::Result;
use crate::types::{Axis, Button, InstanceId, PowerLevel};

/// Events the coordinator reacts to. Everything else the driver sees is
/// handled or dropped inside the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    /// A controller appeared at the given enumeration index.
    DeviceAdded { index: u32 },
    /// An opened controller went away.
    DeviceRemoved { instance_id: InstanceId },
    /// A kind previously handed out by [`Driver::reserve_events`].
    Custom { kind: u32 },
}

/// Thread-safe handle for pushing custom events into the driver queue.
pub trait EventPoster: Send + Sync + 'static {
    fn post(&self, kind: u32) -> Result<()>;
}

/// Native controller library as seen from the hotplug thread.
///
/// A driver is created on the hotplug thread and never leaves it.
pub trait Driver {
    type Pad: Pad;
    type Poster: EventPoster;

    /// Reserve `count` consecutive custom event kinds, returning the first.
    fn reserve_events(&mut self, count: u32) -> Result<u32>;

    fn poster(&self) -> Self::Poster;

    /// Pop the next queued event without blocking.
    fn poll_event(&mut self) -> Option<DriverEvent>;

    /// Block until an event arrives. `None` means the queue is gone.
    fn wait_event(&mut self) -> Option<DriverEvent>;

    /// Number of devices currently present.
    fn num_devices(&self) -> u32;

    /// Open the controller at `index`. Stale or non-controller indices
    /// yield `None`.
    fn open(&mut self, index: u32) -> Option<Self::Pad>;
}

/// An opened controller. Dropping it releases the native handle.
pub trait Pad: Send + 'static {
    fn name(&self) -> &str;
    fn instance_id(&self) -> InstanceId;
    /// Pull fresh state from the driver.
    ///
    /// Backends whose native handle is confined to the hotplug thread may
    /// only request a refresh here. Reads that follow then see the state
    /// of the previous refresh, one poll behind, and requests made before
    /// the hotplug thread answers collapse into one.
    fn update(&mut self);
    fn button(&self, button: Button) -> bool;
    fn axis(&self, axis: Axis) -> i16;
    fn power_level(&self) -> PowerLevel;
    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32);
}
