//! Hotplug coordinator.
//!
//! A single background thread owns the driver. It is the only place that
//! opens controllers or touches the driver event queue; other threads talk
//! to it by posting custom events into that queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender};
use log::{debug, error, info, warn};

use crate::device::{Device, GamepadDevice, SOURCE};
use crate::driver::{Driver, DriverEvent, EventPoster};
use crate::error::Result;
use crate::registry::HostRegistry;
use crate::settings::Settings;
use crate::types::InstanceId;

const THREAD_NAME: &str = "hotpad-hotplug";

/// Custom event kinds reserved for one coordinator cycle.
#[derive(Debug, Clone, Copy)]
struct CustomEvents {
    stop: u32,
    populate: u32,
}

/// What the caller of [`Hotplug::init`] gets back once the thread is up.
struct Link {
    poster: Box<dyn EventPoster>,
    events: CustomEvents,
}

impl Link {
    fn post(&self, kind: u32) {
        if let Err(e) = self.poster.post(kind) {
            warn!("hotplug: {e}");
        }
    }
}

/// One init/deinit cycle.
struct Session {
    thread: JoinHandle<()>,
    /// Missing when the driver failed to start.
    link: Option<Link>,
}

/// Owner of the hotplug thread.
#[derive(Default)]
pub struct Hotplug {
    session: Option<Session>,
}

impl Hotplug {
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Start the hotplug thread and block until the driver has started.
    ///
    /// `start` runs on the new thread and builds the driver there. Startup
    /// failures are logged and leave the subsystem without devices; they
    /// are not retried.
    pub fn init<D, F, R>(&mut self, start: F, registry: Arc<R>, settings: Settings)
    where
        D: Driver + 'static,
        F: FnOnce(&Settings) -> Result<D> + Send + 'static,
        R: HostRegistry,
    {
        if self.session.is_some() {
            warn!("hotplug: already initialized");
            return;
        }

        let (ready_tx, ready_rx) = bounded::<Link>(1);
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run(start, registry, settings, ready_tx));
        let thread = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                error!("hotplug: failed to spawn thread: {e}");
                return;
            }
        };

        // Sender is dropped without a message when startup fails.
        let link = ready_rx.recv().ok();
        self.session = Some(Session { thread, link });
    }

    /// Stop the hotplug thread and wait for it. Does nothing if the thread
    /// is not running.
    pub fn deinit(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(link) = &session.link {
            link.post(link.events.stop);
        }
        if session.thread.join().is_err() {
            error!("hotplug: thread panicked");
        }
    }

    /// Ask the hotplug thread to rescan all devices. Returns immediately;
    /// results arrive through the registry.
    pub fn populate_devices(&self) {
        if let Some(link) = self.session.as_ref().and_then(|s| s.link.as_ref()) {
            link.post(link.events.populate);
        }
    }

    /// Whether a hotplug thread was started and its driver came up.
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.link.is_some())
    }
}

impl Drop for Hotplug {
    fn drop(&mut self) {
        self.deinit();
    }
}

fn run<D, F, R>(start: F, registry: Arc<R>, settings: Settings, ready: Sender<Link>)
where
    D: Driver,
    F: FnOnce(&Settings) -> Result<D>,
    R: HostRegistry,
{
    let mut driver = match start(&settings) {
        Ok(driver) => driver,
        Err(e) => {
            error!("hotplug: {e}");
            return;
        }
    };
    let events = match driver.reserve_events(2) {
        Ok(first) => CustomEvents {
            stop: first,
            populate: first + 1,
        },
        Err(e) => {
            error!("hotplug: {e}");
            return;
        }
    };
    let link = Link {
        poster: Box::new(driver.poster()),
        events,
    };

    let mut dispatcher = Dispatcher {
        driver,
        registry,
        settings,
        events,
    };

    // Handle everything already queued before init returns. Devices added
    // here are rejected by a registry that is not accepting yet; the host
    // picks them up with its own populate request, so none is added twice.
    let keep_running = dispatcher.drain();
    let _ = ready.send(link);

    if keep_running {
        dispatcher.run();
    }
    info!("hotplug: stopped");
}

struct Dispatcher<D, R> {
    driver: D,
    registry: Arc<R>,
    settings: Settings,
    events: CustomEvents,
}

impl<D: Driver, R: HostRegistry> Dispatcher<D, R> {
    fn drain(&mut self) -> bool {
        while let Some(event) = self.driver.poll_event() {
            if !self.handle(event) {
                return false;
            }
        }
        true
    }

    fn run(&mut self) {
        loop {
            let Some(event) = self.driver.wait_event() else {
                error!("hotplug: driver event queue closed");
                return;
            };
            if !self.handle(event) {
                return;
            }
        }
    }

    /// Returns `false` once the stop event has been seen.
    fn handle(&mut self, event: DriverEvent) -> bool {
        match event {
            DriverEvent::DeviceAdded { index } => {
                open_and_add(&mut self.driver, self.registry.as_ref(), &self.settings, index);
            }
            DriverEvent::DeviceRemoved { instance_id } => {
                self.registry
                    .remove_device(&|device| is_instance::<D>(device, instance_id));
            }
            DriverEvent::Custom { kind } if kind == self.events.populate => {
                let driver = &mut self.driver;
                let registry = self.registry.as_ref();
                let settings = &self.settings;
                registry.repopulate(SOURCE, &mut || {
                    for index in 0..driver.num_devices() {
                        open_and_add(driver, registry, settings, index);
                    }
                });
            }
            DriverEvent::Custom { kind } if kind == self.events.stop => return false,
            DriverEvent::Custom { kind } => {
                debug!("hotplug: ignoring event kind {kind}");
            }
        }
        true
    }
}

fn is_instance<D: Driver>(device: &dyn Device, instance_id: InstanceId) -> bool {
    device.source() == SOURCE
        && device
            .as_any()
            .downcast_ref::<GamepadDevice<D::Pad>>()
            .is_some_and(|pad| pad.instance_id() == instance_id)
}

fn open_and_add<D, R>(driver: &mut D, registry: &R, settings: &Settings, index: u32)
where
    D: Driver,
    R: HostRegistry + ?Sized,
{
    let Some(pad) = driver.open(index) else {
        debug!("hotplug: controller {index} could not be opened");
        return;
    };
    let device = GamepadDevice::new(pad, index, settings);
    if device.inputs().is_empty() && device.outputs().is_empty() {
        debug!("hotplug: controller {index} has no controls");
        return;
    }

    let name = device.name().to_owned();
    match registry.add_device(Box::new(device)) {
        Ok(()) => info!("hotplug: added {name} at {index}"),
        Err(e) => debug!("hotplug: {name} at {index} not added: {e}"),
    }
}
