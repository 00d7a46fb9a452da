use ahash::{AHashMap, AHashSet};
use hotpad::Device;

/// Inputs at or above this state count as held.
const HELD_THRESHOLD: f64 = 0.5;

/// Inputs that changed on one device since the previous scan.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Change {
    pub(crate) device: String,
    pub(crate) pressed: Vec<String>,
    pub(crate) released: Vec<String>,
}

/// Tracks which inputs each registered device is holding.
#[derive(Default)]
pub(crate) struct Watcher {
    held: AHashMap<String, Vec<String>>,
}

impl Watcher {
    pub(crate) fn scan(&mut self, devices: &[Box<dyn Device>]) -> Vec<Change> {
        let mut changes = Vec::new();
        let mut seen = AHashSet::with_capacity(devices.len());
        for device in devices {
            let label = label(device.as_ref());
            let now = held_inputs(device.as_ref());
            let before = self.held.remove(&label).unwrap_or_default();

            let pressed: Vec<String> =
                now.iter().filter(|n| !before.contains(n)).cloned().collect();
            let released: Vec<String> =
                before.iter().filter(|n| !now.contains(n)).cloned().collect();
            if !pressed.is_empty() || !released.is_empty() {
                changes.push(Change {
                    device: label.clone(),
                    pressed,
                    released,
                });
            }
            self.held.insert(label.clone(), now);
            seen.insert(label);
        }
        self.held.retain(|label, _| seen.contains(label));
        changes
    }
}

/// Display name that stays distinct for identical controllers.
pub(crate) fn label(device: &dyn Device) -> String {
    match device.preferred_id() {
        Some(id) => format!("{} #{id}", device.name()),
        None => device.name().to_owned(),
    }
}

fn held_inputs(device: &dyn Device) -> Vec<String> {
    device
        .inputs()
        .iter()
        .filter(|input| input.is_detectable())
        .filter(|input| device.input_state(input) >= HELD_THRESHOLD)
        .map(|input| input.name().into_owned())
        .collect()
}

/// Drive every output of the matching devices to `state`.
pub(crate) fn set_motors(
    devices: &mut [Box<dyn Device>],
    matches: impl Fn(&dyn Device) -> bool,
    state: f64,
) {
    for device in devices.iter_mut() {
        if !matches(device.as_ref()) {
            continue;
        }
        let outputs = device.outputs().to_vec();
        for output in &outputs {
            device.set_output_state(output, state);
        }
    }
}
