//! In-process stand-ins for the native driver.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::driver::{Driver, DriverEvent, EventPoster, Pad};
use crate::error::{Error, Result};
use crate::types::{Axis, Button, InstanceId, PowerLevel};

const FIRST_CUSTOM_EVENT: u32 = 0x8000;

pub(crate) struct FakePad {
    pub(crate) name: String,
    pub(crate) instance_id: InstanceId,
    pub(crate) buttons: u32,
    pub(crate) axes: [i16; 6],
    pub(crate) power: PowerLevel,
    pub(crate) updates: usize,
    pub(crate) rumbles: Vec<(u16, u16, u32)>,
}

impl FakePad {
    pub(crate) fn new(name: &str, instance_id: InstanceId) -> Self {
        Self {
            name: name.to_owned(),
            instance_id,
            buttons: 0,
            axes: [0; 6],
            power: PowerLevel::Unknown,
            updates: 0,
            rumbles: Vec::new(),
        }
    }
}

impl Pad for FakePad {
    fn name(&self) -> &str {
        &self.name
    }

    fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn update(&mut self) {
        self.updates += 1;
    }

    fn button(&self, button: Button) -> bool {
        self.buttons & button.bit() != 0
    }

    fn axis(&self, axis: Axis) -> i16 {
        self.axes[axis.index()]
    }

    fn power_level(&self) -> PowerLevel {
        self.power
    }

    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) {
        self.rumbles.push((low, high, duration_ms));
    }
}

#[derive(Default)]
struct BusState {
    queue: VecDeque<DriverEvent>,
    /// Present devices by enumeration index.
    devices: Vec<Option<(String, InstanceId)>>,
    next_instance: InstanceId,
    next_event: u32,
    closed: bool,
    fail_reservation: bool,
    opens: usize,
}

/// Shared world behind [`FakeDriver`]: an event queue plus the set of
/// currently plugged devices.
#[derive(Default)]
pub(crate) struct FakeBus {
    state: Mutex<BusState>,
    cond: Condvar,
}

impl FakeBus {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap()
    }

    fn push(&self, event: DriverEvent) {
        self.state().queue.push_back(event);
        self.cond.notify_all();
    }

    /// Make a device present without queueing any event.
    pub(crate) fn attach(&self, name: &str) -> (u32, InstanceId) {
        let mut state = self.state();
        state.next_instance += 1;
        let instance_id = state.next_instance;
        state.devices.push(Some((name.to_owned(), instance_id)));
        ((state.devices.len() - 1) as u32, instance_id)
    }

    /// Attach a device and queue its added event.
    pub(crate) fn plug(&self, name: &str) -> (u32, InstanceId) {
        let (index, instance_id) = self.attach(name);
        self.push(DriverEvent::DeviceAdded { index });
        (index, instance_id)
    }

    pub(crate) fn unplug(&self, instance_id: InstanceId) {
        {
            let mut state = self.state();
            for slot in &mut state.devices {
                if slot.as_ref().is_some_and(|(_, id)| *id == instance_id) {
                    *slot = None;
                }
            }
        }
        self.push(DriverEvent::DeviceRemoved { instance_id });
    }

    pub(crate) fn seed(&self, event: DriverEvent) {
        self.push(event);
    }

    /// Make every later event reservation fail.
    pub(crate) fn fail_reservation(&self) {
        self.state().fail_reservation = true;
    }

    pub(crate) fn opens(&self) -> usize {
        self.state().opens
    }

    /// Make pending and future waits return `None`.
    pub(crate) fn close(&self) {
        self.state().closed = true;
        self.cond.notify_all();
    }

    pub(crate) fn driver(self: &Arc<Self>) -> FakeDriver {
        FakeDriver { bus: Arc::clone(self) }
    }
}

pub(crate) struct FakeDriver {
    bus: Arc<FakeBus>,
}

impl Driver for FakeDriver {
    type Pad = FakePad;
    type Poster = FakePoster;

    fn reserve_events(&mut self, count: u32) -> Result<u32> {
        let mut state = self.bus.state();
        if state.fail_reservation {
            return Err(Error::EventRegistration("event space exhausted".into()));
        }
        if state.next_event == 0 {
            state.next_event = FIRST_CUSTOM_EVENT;
        }
        let first = state.next_event;
        state.next_event += count;
        Ok(first)
    }

    fn poster(&self) -> FakePoster {
        FakePoster {
            bus: Arc::clone(&self.bus),
        }
    }

    fn poll_event(&mut self) -> Option<DriverEvent> {
        self.bus.state().queue.pop_front()
    }

    fn wait_event(&mut self) -> Option<DriverEvent> {
        let mut state = self.bus.state();
        loop {
            if let Some(event) = state.queue.pop_front() {
                return Some(event);
            }
            if state.closed {
                return None;
            }
            state = self
                .bus
                .cond
                .wait_timeout(state, Duration::from_millis(50))
                .unwrap()
                .0;
        }
    }

    fn num_devices(&self) -> u32 {
        self.bus.state().devices.len() as u32
    }

    fn open(&mut self, index: u32) -> Option<FakePad> {
        let mut state = self.bus.state();
        let (name, instance_id) = state.devices.get(index as usize)?.clone()?;
        state.opens += 1;
        Some(FakePad::new(&name, instance_id))
    }
}

pub(crate) struct FakePoster {
    bus: Arc<FakeBus>,
}

impl EventPoster for FakePoster {
    fn post(&self, kind: u32) -> Result<()> {
        if self.bus.state().closed {
            return Err(Error::Post("queue closed".into()));
        }
        self.bus.push(DriverEvent::Custom { kind });
        Ok(())
    }
}
