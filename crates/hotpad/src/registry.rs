use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::device::Device;
use crate::error::{Error, Result};

/// The host side that owns live devices.
///
/// Registered devices belong to the registry. Once a removal matches a
/// device, nothing outside the registry may still use it.
pub trait HostRegistry: Send + Sync + 'static {
    fn add_device(&self, device: Box<dyn Device>) -> Result<()>;

    /// Drop every registered device the predicate matches.
    fn remove_device(&self, predicate: &dyn Fn(&dyn Device) -> bool);

    /// Drop every device tagged with `source`, then run `enumerate` while
    /// no other repopulation can interleave.
    fn repopulate(&self, source: &str, enumerate: &mut dyn FnMut());
}

/// Registry change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Added {
        name: String,
        source: String,
        preferred_id: Option<u32>,
    },
    Removed {
        name: String,
        source: String,
    },
}

/// Simple in-memory registry.
///
/// Starts closed: devices are rejected until [`DeviceList::set_accepting`]
/// opens it, which is how a host signals that its own setup is complete.
pub struct DeviceList {
    devices: Mutex<Vec<Box<dyn Device>>>,
    population: Mutex<()>,
    accepting: AtomicBool,
    subscribers: Mutex<Vec<Sender<RegistryEvent>>>,
}

impl Default for DeviceList {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceList {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            population: Mutex::new(()),
            accepting: AtomicBool::new(false),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::Release);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// Subscribes to registry changes. Dropped subscribers are cleaned automatically.
    pub fn subscribe(&self) -> Receiver<RegistryEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    pub fn len(&self) -> usize {
        self.devices.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        match self.devices.lock() {
            Ok(devices) => devices.iter().map(|d| d.name().to_owned()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Refresh every device's inputs from the calling thread.
    pub fn update_inputs(&self) {
        if let Ok(mut devices) = self.devices.lock() {
            for device in devices.iter_mut() {
                device.update_input();
            }
        }
    }

    /// Run `f` over the live devices while holding the list.
    pub fn with_devices<T>(&self, f: impl FnOnce(&mut [Box<dyn Device>]) -> T) -> Option<T> {
        let mut devices = self.devices.lock().ok()?;
        Some(f(devices.as_mut_slice()))
    }

    fn broadcast(&self, event: &RegistryEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn take_matching(&self, predicate: &dyn Fn(&dyn Device) -> bool) -> Vec<Box<dyn Device>> {
        let Ok(mut devices) = self.devices.lock() else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        let mut i = 0;
        while i < devices.len() {
            if predicate(devices[i].as_ref()) {
                removed.push(devices.remove(i));
            } else {
                i += 1;
            }
        }
        removed
    }

    fn announce_removed(&self, removed: Vec<Box<dyn Device>>) {
        for device in removed {
            let event = RegistryEvent::Removed {
                name: device.name().to_owned(),
                source: device.source().to_owned(),
            };
            drop(device);
            self.broadcast(&event);
        }
    }
}

impl HostRegistry for DeviceList {
    fn add_device(&self, device: Box<dyn Device>) -> Result<()> {
        if !self.is_accepting() {
            return Err(Error::RegistryNotReady);
        }
        let event = RegistryEvent::Added {
            name: device.name().to_owned(),
            source: device.source().to_owned(),
            preferred_id: device.preferred_id(),
        };
        {
            let Ok(mut devices) = self.devices.lock() else {
                return Err(Error::RegistryNotReady);
            };
            devices.push(device);
        }
        self.broadcast(&event);
        Ok(())
    }

    fn remove_device(&self, predicate: &dyn Fn(&dyn Device) -> bool) {
        let removed = self.take_matching(predicate);
        self.announce_removed(removed);
    }

    fn repopulate(&self, source: &str, enumerate: &mut dyn FnMut()) {
        let _population = self.population.lock();
        let removed = self.take_matching(&|device| device.source() == source);
        self.announce_removed(removed);
        enumerate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GamepadDevice, SOURCE};
    use crate::settings::Settings;
    use crate::testing::FakePad;

    fn pad_device(name: &str, index: u32) -> Box<dyn Device> {
        Box::new(GamepadDevice::new(FakePad::new(name, index + 100), index, &Settings::default()))
    }

    #[test]
    fn rejects_devices_until_accepting() {
        let list = DeviceList::new();
        let err = list.add_device(pad_device("Pad", 0)).unwrap_err();
        assert!(matches!(err, Error::RegistryNotReady));
        assert!(list.is_empty());

        list.set_accepting(true);
        list.add_device(pad_device("Pad", 0)).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_uses_predicate() {
        let list = DeviceList::new();
        list.set_accepting(true);
        list.add_device(pad_device("First", 0)).unwrap();
        list.add_device(pad_device("Second", 1)).unwrap();

        list.remove_device(&|device| device.name() == "First");
        assert_eq!(list.names(), vec!["Second".to_string()]);
    }

    #[test]
    fn repopulate_clears_source_before_enumerating() {
        let list = DeviceList::new();
        list.set_accepting(true);
        list.add_device(pad_device("Old", 0)).unwrap();

        let mut seen_during_enumeration = None;
        list.repopulate(SOURCE, &mut || {
            seen_during_enumeration = Some(list.len());
            list.add_device(pad_device("New", 0)).unwrap();
        });
        assert_eq!(seen_during_enumeration, Some(0));
        assert_eq!(list.names(), vec!["New".to_string()]);
    }

    #[test]
    fn subscribers_see_changes() {
        let list = DeviceList::new();
        list.set_accepting(true);
        let rx = list.subscribe();

        list.add_device(pad_device("Pad", 2)).unwrap();
        list.remove_device(&|_| true);

        assert_eq!(
            rx.try_recv().unwrap(),
            RegistryEvent::Added {
                name: "Pad".into(),
                source: SOURCE.into(),
                preferred_id: Some(2),
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RegistryEvent::Removed {
                name: "Pad".into(),
                source: SOURCE.into(),
            }
        );
    }

    #[test]
    fn update_inputs_reaches_every_device() {
        let list = DeviceList::new();
        list.set_accepting(true);
        list.add_device(pad_device("A", 0)).unwrap();
        list.add_device(pad_device("B", 1)).unwrap();

        list.update_inputs();
        let updates = list
            .with_devices(|devices| {
                devices
                    .iter()
                    .filter_map(|d| d.as_any().downcast_ref::<GamepadDevice<FakePad>>())
                    .map(|d| d.pad().updates)
                    .sum::<usize>()
            })
            .unwrap();
        assert_eq!(updates, 2);
    }
}
