//! Effect management service used by Chroma animations.
//!
//! Animations never talk to hardware directly. They upload frames, activate
//! them and release them through an [`EffectService`]. The service lives in
//! the ECS world as the [`ChromaEffects`] resource so systems can share it.
//!
//! Status codes follow the Chroma REST convention: `0` is success, anything
//! else is a failure. A `None` response means the call produced no handle at
//! all (for example the session dropped mid-call) and is also a failure.
//!
//! [`LocalEffectService`] is an in-process implementation that records every
//! call. It backs the demo binary and the test suite.

use std::sync::{Arc, Mutex, MutexGuard};

use bevy_ecs::prelude::Resource;
use log::debug;
use rustc_hash::FxHashMap;

use crate::components::animation2d::ColorFrame2D;
use crate::resources::device::ChromaDevice2D;

/// Success status code.
pub const RESULT_SUCCESS: i32 = 0;
/// Returned when an effect id is not known to the service.
pub const RESULT_NOT_FOUND: i32 = 1168;
/// Returned when the service is not connected.
pub const RESULT_NOT_CONNECTED: i32 = 1167;
/// Returned by injected creation failures.
pub const RESULT_FAILED: i32 = -1;

/// Handle returned when a frame is uploaded as a device effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectResponseId {
    pub id: String,
    pub result: i32,
}

impl EffectResponseId {
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}

/// Response to activating or removing an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectIdentifierResponse {
    pub id: String,
    pub result: i32,
}

impl EffectIdentifierResponse {
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}

/// Create, activate and remove device effects.
pub trait EffectService: Send + Sync {
    /// Upload a custom 2D frame for `device`.
    fn create_custom_2d_effect(
        &mut self,
        device: ChromaDevice2D,
        frame: &ColorFrame2D,
    ) -> Option<EffectResponseId>;

    /// Make the effect the one currently shown on its device.
    fn set_effect(&mut self, id: &str) -> Option<EffectIdentifierResponse>;

    /// Release a previously created effect.
    fn remove_effect(&mut self, id: &str) -> Option<EffectIdentifierResponse>;

    /// Whether the session with the lighting service is alive.
    fn is_connected(&self) -> bool;
}

/// Shared effect service resource.
#[derive(Resource)]
pub struct ChromaEffects {
    service: Box<dyn EffectService>,
}

impl ChromaEffects {
    pub fn new(service: impl EffectService + 'static) -> Self {
        ChromaEffects {
            service: Box::new(service),
        }
    }

    pub fn service(&self) -> &dyn EffectService {
        self.service.as_ref()
    }

    pub fn service_mut(&mut self) -> &mut dyn EffectService {
        self.service.as_mut()
    }
}

/// A stored effect inside [`LocalEffectService`].
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEffect {
    pub device: ChromaDevice2D,
    pub frame: ColorFrame2D,
}

#[derive(Debug, Default)]
struct LocalState {
    connected: bool,
    next_id: u64,
    create_calls: usize,
    fail_create_at: Vec<usize>,
    effects: FxHashMap<String, LocalEffect>,
    active: Option<String>,
    activations: Vec<String>,
    removals: Vec<String>,
}

/// In-memory effect service.
///
/// Clones share the same recorded state, so a caller can keep a handle for
/// inspection after moving another clone into [`ChromaEffects`].
#[derive(Debug, Clone)]
pub struct LocalEffectService {
    state: Arc<Mutex<LocalState>>,
}

impl Default for LocalEffectService {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalEffectService {
    /// Create a connected service with no effects.
    pub fn new() -> Self {
        LocalEffectService {
            state: Arc::new(Mutex::new(LocalState {
                connected: true,
                ..LocalState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Toggle the reported connection state.
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    /// Make the `index`-th (zero based) create call fail.
    pub fn fail_create_at(&self, index: usize) {
        self.lock().fail_create_at.push(index);
    }

    /// Number of effects currently stored.
    pub fn effect_count(&self) -> usize {
        self.lock().effects.len()
    }

    pub fn effect(&self, id: &str) -> Option<LocalEffect> {
        self.lock().effects.get(id).cloned()
    }

    /// Id of the effect shown right now.
    pub fn active_effect(&self) -> Option<String> {
        self.lock().active.clone()
    }

    /// Every successful activation, in call order.
    pub fn activations(&self) -> Vec<String> {
        self.lock().activations.clone()
    }

    /// Every successful removal, in call order.
    pub fn removals(&self) -> Vec<String> {
        self.lock().removals.clone()
    }

    /// Number of create calls seen, including failed ones.
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }
}

impl EffectService for LocalEffectService {
    fn create_custom_2d_effect(
        &mut self,
        device: ChromaDevice2D,
        frame: &ColorFrame2D,
    ) -> Option<EffectResponseId> {
        let mut state = self.lock();
        let call = state.create_calls;
        state.create_calls += 1;
        if !state.connected {
            return None;
        }
        if state.fail_create_at.contains(&call) {
            return Some(EffectResponseId {
                id: String::new(),
                result: RESULT_FAILED,
            });
        }

        let id = format!("effect-{}", state.next_id);
        state.next_id += 1;
        state.effects.insert(
            id.clone(),
            LocalEffect {
                device,
                frame: frame.clone(),
            },
        );
        debug!("Created {} effect {}", device, id);
        Some(EffectResponseId {
            id,
            result: RESULT_SUCCESS,
        })
    }

    fn set_effect(&mut self, id: &str) -> Option<EffectIdentifierResponse> {
        let mut state = self.lock();
        let result = if !state.connected {
            RESULT_NOT_CONNECTED
        } else if state.effects.contains_key(id) {
            state.active = Some(id.to_string());
            state.activations.push(id.to_string());
            RESULT_SUCCESS
        } else {
            RESULT_NOT_FOUND
        };
        Some(EffectIdentifierResponse {
            id: id.to_string(),
            result,
        })
    }

    fn remove_effect(&mut self, id: &str) -> Option<EffectIdentifierResponse> {
        let mut state = self.lock();
        let result = if !state.connected {
            RESULT_NOT_CONNECTED
        } else if state.effects.remove(id).is_some() {
            if state.active.as_deref() == Some(id) {
                state.active = None;
            }
            state.removals.push(id.to_string());
            RESULT_SUCCESS
        } else {
            RESULT_NOT_FOUND
        };
        Some(EffectIdentifierResponse {
            id: id.to_string(),
            result,
        })
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }
}
