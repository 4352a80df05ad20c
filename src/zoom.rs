//! Zoom ratio ownership and lens switching.
//!
//! The controller never touches the capture pipeline. It decides which lens
//! should be bound and says so through [`ZoomEvent::LensSwitchRequested`];
//! the pipeline rebinds, then reports the new lens' zoom range back through
//! [`ZoomController::update_bounds`].
//!
//! Events raised by an operation are queued and handed to listeners once the
//! operation's state change is complete. [`SharedZoomController`] releases its
//! lock before dispatching, so a listener may call back into it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use serde::Serialize;

use crate::config::ZoomConfig;
use crate::lens::{LensCatalog, LensInfo};
use crate::types::{ActiveRole, LensRole};

/// At or below this ratio the ultra-wide lens is preferred.
pub const ULTRA_WIDE_SWITCH_RATIO: f32 = 0.6;
/// At or above this ratio the main lens is preferred.
pub const MAIN_SWITCH_RATIO: f32 = 0.8;
/// Upper end of the window in which the 1x preset shows as selected.
pub const ONE_X_SELECTED_MAX: f32 = 1.2;

pub const HALF_X_RATIO: f32 = 0.5;
pub const ONE_X_RATIO: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomState {
    pub ratio: f32,
    pub min_ratio: f32,
    pub max_ratio: f32,
    pub active_role: ActiveRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Preset {
    HalfX,
    OneX,
}

impl Preset {
    pub fn ratio(&self) -> f32 {
        match self {
            Preset::HalfX => HALF_X_RATIO,
            Preset::OneX => ONE_X_RATIO,
        }
    }

    pub fn role(&self) -> LensRole {
        match self {
            Preset::HalfX => LensRole::UltraWide,
            Preset::OneX => LensRole::Main,
        }
    }
}

/// Which preset button shows as selected. At most one by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectedPreset {
    HalfX,
    OneX,
    Neither,
}

impl SelectedPreset {
    pub fn for_ratio(ratio: f32) -> SelectedPreset {
        if ratio <= ULTRA_WIDE_SWITCH_RATIO {
            SelectedPreset::HalfX
        } else if (MAIN_SWITCH_RATIO..=ONE_X_SELECTED_MAX).contains(&ratio) {
            SelectedPreset::OneX
        } else {
            SelectedPreset::Neither
        }
    }
}

/// What a renderer needs to draw the zoom controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomUiState {
    pub selected: SelectedPreset,
    /// Slider position in `[0, 1]` over `[min_ratio, max_ratio]`.
    pub slider_position: f32,
    pub half_x_enabled: bool,
    pub one_x_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoomEvent {
    ZoomChanged { ratio: f32 },
    LensSwitchRequested { role: LensRole, lens: LensInfo },
    UiStateChanged(ZoomUiState),
}

pub type ZoomListener = Arc<dyn Fn(&ZoomEvent) + Send + Sync>;

pub struct ZoomController {
    state: ZoomState,
    catalog: LensCatalog,
    listeners: Vec<ZoomListener>,
    pending_events: Vec<ZoomEvent>,
    /// Preset whose ratio the current bounds could not reach yet.
    pending_preset: Option<Preset>,
}

impl std::fmt::Debug for ZoomController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomController")
            .field("state", &self.state)
            .field("catalog", &self.catalog)
            .field("listeners", &self.listeners.len())
            .field("pending_preset", &self.pending_preset)
            .finish()
    }
}

fn clamp_ratio(ratio: f32, min: f32, max: f32) -> f32 {
    if ratio.is_nan() {
        return min;
    }
    ratio.max(min).min(max)
}

impl ZoomController {
    pub fn new(catalog: LensCatalog, config: &ZoomConfig) -> ZoomController {
        let (min_ratio, max_ratio) = ordered(config.min_ratio, config.max_ratio);
        ZoomController {
            state: ZoomState {
                ratio: clamp_ratio(config.initial_ratio, min_ratio, max_ratio),
                min_ratio,
                max_ratio,
                active_role: ActiveRole::Unknown,
            },
            catalog,
            listeners: Vec::new(),
            pending_events: Vec::new(),
            pending_preset: None,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&ZoomEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn ratio(&self) -> f32 {
        self.state.ratio
    }

    pub fn active_role(&self) -> ActiveRole {
        self.state.active_role
    }

    pub fn catalog(&self) -> &LensCatalog {
        &self.catalog
    }

    /// Lens for the active role, if one is known.
    pub fn active_lens(&self) -> Option<&LensInfo> {
        match self.state.active_role {
            ActiveRole::UltraWide => self.catalog.ultra_wide(),
            ActiveRole::Main => self.catalog.main(),
            ActiveRole::Unknown => None,
        }
    }

    pub fn ui_state(&self) -> ZoomUiState {
        let range = self.state.max_ratio - self.state.min_ratio;
        let slider_position = if range > 0.0 {
            ((self.state.ratio - self.state.min_ratio) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let selected = match self.pending_preset {
            Some(Preset::HalfX) => SelectedPreset::HalfX,
            Some(Preset::OneX) => SelectedPreset::OneX,
            None => SelectedPreset::for_ratio(self.state.ratio),
        };
        ZoomUiState {
            selected,
            slider_position,
            half_x_enabled: self.catalog.ultra_wide().is_some(),
            one_x_enabled: self.catalog.main().is_some(),
        }
    }

    /// Clamps and stores `requested`, then checks whether the lens should
    /// change. Returns true when a switch was requested; the caller rebinds
    /// and re-applies the ratio afterwards.
    pub fn set_zoom_ratio(&mut self, requested: f32) -> bool {
        let switched = self.apply_zoom_ratio(requested);
        self.flush();
        switched
    }

    /// Hysteresis between the two lenses. Ratios strictly between the
    /// switch points keep the current lens.
    pub fn resolve_lens_switch(&mut self) -> bool {
        let switched = self.apply_lens_switch();
        self.flush();
        switched
    }

    /// Switches to `role` regardless of the current ratio, if its lens is
    /// known. Returns true when the active role changed.
    pub fn force_role(&mut self, role: LensRole) -> bool {
        let switched = self.apply_force_role(role);
        self.flush();
        switched
    }

    /// Applies a preset button: jump to its ratio and bind its lens even at
    /// the hysteresis boundary.
    ///
    /// When the bounds of the lens still bound cannot reach the preset ratio,
    /// the ratio is clamped and the preset stays pending: the UI keeps
    /// showing it selected and the next [`update_bounds`](Self::update_bounds)
    /// moves to the preset ratio. Without a lens for the preset's role this
    /// is a plain [`set_zoom_ratio`](Self::set_zoom_ratio).
    pub fn press_preset(&mut self, preset: Preset) -> bool {
        let switched = self.apply_preset(preset);
        self.flush();
        switched
    }

    /// Multiplies the current ratio by a pinch gesture's scale factor.
    pub fn apply_pinch(&mut self, scale_factor: f32) -> bool {
        let switched = self.apply_pinch_factor(scale_factor);
        self.flush();
        switched
    }

    /// Maps a slider position in `[0, 1]` linearly onto the zoom range.
    pub fn set_slider(&mut self, position: f32) -> bool {
        let switched = self.apply_slider(position);
        self.flush();
        switched
    }

    /// Called once a rebind reports the bound lens' native zoom range.
    pub fn update_bounds(&mut self, min: f32, max: f32) {
        self.apply_bounds(min, max);
        self.flush();
    }

    fn apply_zoom_ratio(&mut self, requested: f32) -> bool {
        self.pending_preset = None;
        self.state.ratio = clamp_ratio(requested, self.state.min_ratio, self.state.max_ratio);
        debug!("zoom ratio {:.2} (requested {:.2})", self.state.ratio, requested);
        let switched = self.apply_lens_switch();
        self.emit_ui_state();
        self.emit(ZoomEvent::ZoomChanged {
            ratio: self.state.ratio,
        });
        switched
    }

    fn apply_lens_switch(&mut self) -> bool {
        let ratio = self.state.ratio;
        let target = if ratio <= ULTRA_WIDE_SWITCH_RATIO && self.catalog.ultra_wide().is_some() {
            Some(LensRole::UltraWide)
        } else if ratio >= MAIN_SWITCH_RATIO && self.catalog.main().is_some() {
            Some(LensRole::Main)
        } else {
            None
        };
        match target {
            Some(role) => self.switch_to(role),
            None => false,
        }
    }

    fn apply_force_role(&mut self, role: LensRole) -> bool {
        if self.catalog.get(role).is_none() {
            debug!("no {} lens, ignoring forced switch", role);
            return false;
        }
        self.switch_to(role)
    }

    fn apply_preset(&mut self, preset: Preset) -> bool {
        if self.catalog.get(preset.role()).is_none() {
            return self.apply_zoom_ratio(preset.ratio());
        }
        let switched = self.apply_force_role(preset.role());
        self.state.ratio = clamp_ratio(preset.ratio(), self.state.min_ratio, self.state.max_ratio);
        self.pending_preset = (self.state.ratio != preset.ratio()).then_some(preset);
        if self.pending_preset.is_some() {
            debug!(
                "{:?} clamped to {:.2}, waiting for new bounds",
                preset, self.state.ratio
            );
        }
        self.emit_ui_state();
        self.emit(ZoomEvent::ZoomChanged {
            ratio: self.state.ratio,
        });
        switched
    }

    fn apply_pinch_factor(&mut self, scale_factor: f32) -> bool {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return false;
        }
        self.apply_zoom_ratio(self.state.ratio * scale_factor)
    }

    fn apply_slider(&mut self, position: f32) -> bool {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        let ratio = self.state.min_ratio + position * (self.state.max_ratio - self.state.min_ratio);
        self.apply_zoom_ratio(ratio)
    }

    fn apply_bounds(&mut self, min: f32, max: f32) {
        let (min, max) = ordered(min, max);
        self.state.min_ratio = min;
        self.state.max_ratio = max;
        let previous = self.state.ratio;
        let target = match self.pending_preset.take() {
            Some(preset) => preset.ratio(),
            None => previous,
        };
        self.state.ratio = clamp_ratio(target, min, max);
        debug!(
            "zoom bounds [{:.2}, {:.2}], ratio {:.2}",
            min, max, self.state.ratio
        );
        self.emit_ui_state();
        if self.state.ratio != previous {
            self.emit(ZoomEvent::ZoomChanged {
                ratio: self.state.ratio,
            });
        }
    }

    fn switch_to(&mut self, role: LensRole) -> bool {
        if self.state.active_role == ActiveRole::from(role) {
            return false;
        }
        let Some(lens) = self.catalog.get(role).cloned() else {
            return false;
        };
        info!(
            "switching to {} lens {} at zoom {:.2}",
            role, lens.id, self.state.ratio
        );
        self.state.active_role = role.into();
        self.emit(ZoomEvent::LensSwitchRequested { role, lens });
        true
    }

    fn emit_ui_state(&mut self) {
        let ui = self.ui_state();
        self.emit(ZoomEvent::UiStateChanged(ui));
    }

    fn emit(&mut self, event: ZoomEvent) {
        self.pending_events.push(event);
    }

    /// Hands queued events over together with the listeners to deliver them
    /// to.
    fn take_pending(&mut self) -> (Vec<ZoomEvent>, Vec<ZoomListener>) {
        let events = std::mem::take(&mut self.pending_events);
        let listeners = if events.is_empty() {
            Vec::new()
        } else {
            self.listeners.clone()
        };
        (events, listeners)
    }

    fn flush(&mut self) {
        let (events, listeners) = self.take_pending();
        dispatch(&events, &listeners);
    }
}

fn dispatch(events: &[ZoomEvent], listeners: &[ZoomListener]) {
    for event in events {
        for listener in listeners {
            listener(event);
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Controller shared between the UI context and frame-driven logic. Every
/// operation takes the lock once for its whole read-modify-write and
/// dispatches the resulting events after releasing it, so listeners may call
/// back into the shared controller. Events from operations racing on
/// different threads may reach listeners interleaved.
///
/// Operations made through [`lock`](Self::lock) dispatch while the guard is
/// held; listeners must not re-enter the controller in that case.
#[derive(Debug, Clone)]
pub struct SharedZoomController {
    inner: Arc<Mutex<ZoomController>>,
}

impl SharedZoomController {
    pub fn new(controller: ZoomController) -> SharedZoomController {
        SharedZoomController {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ZoomController> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run<R>(&self, op: impl FnOnce(&mut ZoomController) -> R) -> R {
        let (result, events, listeners) = {
            let mut controller = self.lock();
            let result = op(&mut *controller);
            let (events, listeners) = controller.take_pending();
            (result, events, listeners)
        };
        dispatch(&events, &listeners);
        result
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ZoomEvent) + Send + Sync + 'static,
    {
        self.lock().subscribe(listener)
    }

    pub fn set_zoom_ratio(&self, requested: f32) -> bool {
        self.run(|c| c.apply_zoom_ratio(requested))
    }

    pub fn force_role(&self, role: LensRole) -> bool {
        self.run(|c| c.apply_force_role(role))
    }

    pub fn press_preset(&self, preset: Preset) -> bool {
        self.run(|c| c.apply_preset(preset))
    }

    pub fn apply_pinch(&self, scale_factor: f32) -> bool {
        self.run(|c| c.apply_pinch_factor(scale_factor))
    }

    pub fn set_slider(&self, position: f32) -> bool {
        self.run(|c| c.apply_slider(position))
    }

    pub fn update_bounds(&self, min: f32, max: f32) {
        self.run(|c| c.apply_bounds(min, max))
    }

    pub fn state(&self) -> ZoomState {
        self.lock().state()
    }
}
