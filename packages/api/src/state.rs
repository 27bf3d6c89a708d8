use iris_model::InferenceService;
use std::sync::Arc;

pub type AppState = Arc<State>;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Request limits enforced during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_batch_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

pub struct State {
    pub inference: InferenceService,
    pub limits: Limits,
}

impl State {
    pub fn new(inference: InferenceService, limits: Limits) -> Self {
        Self { inference, limits }
    }
}
