//! SDL2 game controller driver.
//!
//! SDL must live entirely within the hotplug thread. Pads handed to the
//! host are proxies: their state is mirrored into atomics by the hotplug
//! thread, and rumble/close requests travel back as private SDL events.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info};
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::{Event, EventSender};
use sdl2::joystick::{Joystick, PowerLevel as SdlPowerLevel};
use sdl2::{
    EventPump, EventSubsystem, GameControllerSubsystem, HapticSubsystem, JoystickSubsystem, Sdl,
};

use crate::driver::{Driver, DriverEvent, EventPoster, Pad};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::types::{Axis, Button, InstanceId, PowerLevel};

const HINT_PS4_RUMBLE: &str = "SDL_JOYSTICK_HIDAPI_PS4_RUMBLE";
const HINT_PS5_RUMBLE: &str = "SDL_JOYSTICK_HIDAPI_PS5_RUMBLE";
const HINT_JOY_CONS: &str = "SDL_JOYSTICK_HIDAPI_JOY_CONS";
const HINT_BUTTON_LABELS: &str = "SDL_GAMECONTROLLER_USE_BUTTON_LABELS";

/// Event kinds the driver keeps for itself.
#[derive(Debug, Clone, Copy)]
struct PrivateEvents {
    rumble: u32,
    sync: u32,
    close: u32,
}

/// State shared between the hotplug thread and a pad proxy.
#[derive(Default)]
struct PadShared {
    buttons: AtomicU32,
    axes: [AtomicI16; 6],
    power: AtomicU8,
    /// Low motor in the upper half, high motor in the lower half.
    rumble: AtomicU32,
    rumble_duration_ms: AtomicU32,
    sync_pending: AtomicBool,
}

impl PadShared {
    /// Keep at most one sync in flight. The slot is released again when
    /// `push` could not queue the request.
    fn request_sync(&self, push: impl FnOnce() -> bool) {
        if self.sync_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        if !push() {
            self.sync_pending.store(false, Ordering::Release);
        }
    }
}

struct OpenPad {
    controller: GameController,
    joystick: Option<Joystick>,
    shared: Arc<PadShared>,
}

impl OpenPad {
    fn snapshot(&self) {
        let mut buttons = 0;
        for button in Button::ALL {
            if self.controller.button(sdl_button(button)) {
                buttons |= button.bit();
            }
        }
        self.shared.buttons.store(buttons, Ordering::Relaxed);

        for axis in Axis::ALL {
            self.shared.axes[axis.index()]
                .store(self.controller.axis(sdl_axis(axis)), Ordering::Relaxed);
        }

        let power = self
            .joystick
            .as_ref()
            .and_then(|js| js.power_level().ok())
            .map(power_level)
            .unwrap_or_default();
        self.shared.power.store(power.to_u8(), Ordering::Relaxed);
    }

    fn apply_rumble(&mut self) {
        let packed = self.shared.rumble.load(Ordering::Acquire);
        let ms = self.shared.rumble_duration_ms.load(Ordering::Acquire);
        let (low, high) = ((packed >> 16) as u16, packed as u16);
        if let Err(e) = self.controller.set_rumble(low, high, ms) {
            debug!("sdl: rumble failed on {}: {e}", self.controller.name());
        }
    }
}

/// SDL2-backed [`Driver`].
pub struct SdlDriver {
    // Pads are declared first so they close before the subsystems quit.
    pads: AHashMap<i32, OpenPad>,
    next_token: i32,
    private: PrivateEvents,
    pump: EventPump,
    events: EventSubsystem,
    joysticks: JoystickSubsystem,
    controllers: GameControllerSubsystem,
    _haptic: HapticSubsystem,
    _sdl: Sdl,
}

impl SdlDriver {
    /// Initialize SDL and the subsystems the driver needs. Must be called on
    /// the thread that will use the driver.
    pub fn start(settings: &Settings) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::BackendInit)?;
        let controllers = sdl.game_controller().map_err(Error::BackendInit)?;
        let joysticks = sdl.joystick().map_err(Error::BackendInit)?;
        let haptic = sdl.haptic().map_err(Error::BackendInit)?;
        let events = sdl.event().map_err(Error::BackendInit)?;
        let pump = sdl.event_pump().map_err(Error::BackendInit)?;

        let version = sdl2::version::version();
        info!("sdl: initialized {}.{}.{}", version.major, version.minor, version.patch);
        apply_hints(settings, (version.major, version.minor, version.patch));

        // SAFETY: the kinds are only ever used as plain user events; none
        // of them is registered as a typed custom event.
        let kinds = unsafe { events.register_events(3) }
            .map_err(Error::EventRegistration)?;
        let &[rumble, sync, close] = kinds.as_slice() else {
            return Err(Error::EventRegistration("short event range".into()));
        };

        Ok(Self {
            pads: AHashMap::new(),
            next_token: 0,
            private: PrivateEvents {
                rumble,
                sync,
                close,
            },
            pump,
            events,
            joysticks,
            controllers,
            _haptic: haptic,
            _sdl: sdl,
        })
    }

    fn translate(&mut self, event: Event) -> Option<DriverEvent> {
        match event {
            Event::ControllerDeviceAdded { which, .. } => {
                Some(DriverEvent::DeviceAdded { index: which })
            }
            Event::ControllerDeviceRemoved { which, .. } => {
                Some(DriverEvent::DeviceRemoved { instance_id: which })
            }
            Event::ControllerButtonDown { which, .. }
            | Event::ControllerButtonUp { which, .. }
            | Event::ControllerAxisMotion { which, .. } => {
                self.refresh_instance(which);
                None
            }
            Event::User { type_, code, .. } => self.handle_user(type_, code),
            _ => None,
        }
    }

    fn handle_user(&mut self, kind: u32, token: i32) -> Option<DriverEvent> {
        if kind == self.private.sync {
            if let Some(pad) = self.pads.get(&token) {
                pad.shared.sync_pending.store(false, Ordering::Release);
                pad.snapshot();
            }
        } else if kind == self.private.rumble {
            if let Some(pad) = self.pads.get_mut(&token) {
                pad.apply_rumble();
            }
        } else if kind == self.private.close {
            if let Some(pad) = self.pads.remove(&token) {
                debug!("sdl: closed {}", pad.controller.name());
            }
        } else {
            return Some(DriverEvent::Custom { kind });
        }
        None
    }

    fn refresh_instance(&self, instance_id: InstanceId) {
        for pad in self.pads.values() {
            if pad.controller.instance_id() == instance_id {
                pad.snapshot();
            }
        }
    }
}

fn apply_hints(settings: &Settings, version: (u8, u8, u8)) {
    let flag = |enabled: bool| if enabled { "1" } else { "0" };
    sdl2::hint::set(HINT_PS4_RUMBLE, flag(settings.ps4_rumble));
    sdl2::hint::set(HINT_PS5_RUMBLE, flag(settings.ps5_rumble));
    if version >= (2, 0, 14) {
        sdl2::hint::set(HINT_BUTTON_LABELS, flag(settings.use_button_labels));
    }
    sdl2::hint::set(HINT_JOY_CONS, flag(settings.joy_cons));
}

impl Driver for SdlDriver {
    type Pad = SdlPad;
    type Poster = SdlPoster;

    fn reserve_events(&mut self, count: u32) -> Result<u32> {
        // SAFETY: see `SdlDriver::start`.
        let kinds = unsafe { self.events.register_events(count) }
            .map_err(Error::EventRegistration)?;
        kinds
            .first()
            .copied()
            .ok_or_else(|| Error::EventRegistration("empty event range".into()))
    }

    fn poster(&self) -> SdlPoster {
        SdlPoster {
            sender: self.events.event_sender(),
        }
    }

    fn poll_event(&mut self) -> Option<DriverEvent> {
        while let Some(event) = self.pump.poll_event() {
            if let Some(event) = self.translate(event) {
                return Some(event);
            }
        }
        None
    }

    fn wait_event(&mut self) -> Option<DriverEvent> {
        loop {
            let event = self.pump.wait_event();
            if let Some(event) = self.translate(event) {
                return Some(event);
            }
        }
    }

    fn num_devices(&self) -> u32 {
        match self.joysticks.num_joysticks() {
            Ok(count) => count,
            Err(e) => {
                debug!("sdl: failed to count joysticks: {e}");
                0
            }
        }
    }

    fn open(&mut self, index: u32) -> Option<SdlPad> {
        let controller = match self.controllers.open(index) {
            Ok(controller) => controller,
            Err(e) => {
                debug!("sdl: failed to open controller {index}: {e}");
                return None;
            }
        };
        let joystick = self.joysticks.open(index).ok();

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);

        let pad = OpenPad {
            controller,
            joystick,
            shared: Arc::default(),
        };
        pad.snapshot();

        let proxy = SdlPad {
            token,
            instance_id: pad.controller.instance_id(),
            name: pad.controller.name(),
            shared: Arc::clone(&pad.shared),
            sender: self.events.event_sender(),
            private: self.private,
        };
        self.pads.insert(token, pad);
        Some(proxy)
    }
}

/// Posts custom events into the SDL queue from any thread.
pub struct SdlPoster {
    sender: EventSender,
}

impl EventPoster for SdlPoster {
    fn post(&self, kind: u32) -> Result<()> {
        self.sender
            .push_event(user_event(kind, 0))
            .map_err(Error::Post)
    }
}

/// Host-side proxy of a controller opened by [`SdlDriver`].
pub struct SdlPad {
    token: i32,
    instance_id: InstanceId,
    name: String,
    shared: Arc<PadShared>,
    sender: EventSender,
    private: PrivateEvents,
}

impl SdlPad {
    /// Returns `false` when the request did not make it into the queue.
    fn request(&self, kind: u32) -> bool {
        match self.sender.push_event(user_event(kind, self.token)) {
            Ok(()) => true,
            Err(e) => {
                debug!("sdl: request for {} dropped: {e}", self.name);
                false
            }
        }
    }
}

impl Pad for SdlPad {
    fn name(&self) -> &str {
        &self.name
    }

    fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn update(&mut self) {
        self.shared.request_sync(|| self.request(self.private.sync));
    }

    fn button(&self, button: Button) -> bool {
        self.shared.buttons.load(Ordering::Relaxed) & button.bit() != 0
    }

    fn axis(&self, axis: Axis) -> i16 {
        self.shared.axes[axis.index()].load(Ordering::Relaxed)
    }

    fn power_level(&self) -> PowerLevel {
        PowerLevel::from_u8(self.shared.power.load(Ordering::Relaxed))
    }

    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) {
        let packed = (u32::from(low) << 16) | u32::from(high);
        self.shared
            .rumble_duration_ms
            .store(duration_ms, Ordering::Release);
        self.shared.rumble.store(packed, Ordering::Release);
        self.request(self.private.rumble);
    }
}

impl Drop for SdlPad {
    fn drop(&mut self) {
        self.request(self.private.close);
    }
}

fn user_event(kind: u32, code: i32) -> Event {
    Event::User {
        timestamp: 0,
        window_id: 0,
        type_: kind,
        code,
        data1: ptr::null_mut(),
        data2: ptr::null_mut(),
    }
}

fn sdl_button(button: Button) -> SdlButton {
    match button {
        Button::A => SdlButton::A,
        Button::B => SdlButton::B,
        Button::X => SdlButton::X,
        Button::Y => SdlButton::Y,
        Button::DPadUp => SdlButton::DPadUp,
        Button::DPadDown => SdlButton::DPadDown,
        Button::DPadLeft => SdlButton::DPadLeft,
        Button::DPadRight => SdlButton::DPadRight,
        Button::Start => SdlButton::Start,
        Button::Back => SdlButton::Back,
        Button::LeftShoulder => SdlButton::LeftShoulder,
        Button::RightShoulder => SdlButton::RightShoulder,
        Button::Guide => SdlButton::Guide,
        Button::LeftStick => SdlButton::LeftStick,
        Button::RightStick => SdlButton::RightStick,
        Button::Touchpad => SdlButton::Touchpad,
    }
}

fn sdl_axis(axis: Axis) -> SdlAxis {
    match axis {
        Axis::LeftX => SdlAxis::LeftX,
        Axis::LeftY => SdlAxis::LeftY,
        Axis::RightX => SdlAxis::RightX,
        Axis::RightY => SdlAxis::RightY,
        Axis::TriggerLeft => SdlAxis::TriggerLeft,
        Axis::TriggerRight => SdlAxis::TriggerRight,
    }
}

fn power_level(level: SdlPowerLevel) -> PowerLevel {
    match level {
        SdlPowerLevel::Unknown => PowerLevel::Unknown,
        SdlPowerLevel::Empty => PowerLevel::Empty,
        SdlPowerLevel::Low => PowerLevel::Low,
        SdlPowerLevel::Medium => PowerLevel::Medium,
        SdlPowerLevel::Full => PowerLevel::Full,
        SdlPowerLevel::Wired => PowerLevel::Wired,
        #[allow(unreachable_patterns)]
        _ => PowerLevel::Unknown,
    }
}
