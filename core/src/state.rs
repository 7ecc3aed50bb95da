//! Response state and the reducer that moves it.
//!
//! # Design
//! `Phase` is closed: a controller is idle until its first request, loading
//! while a request is in flight, and done once an outcome arrived. The only
//! way between phases is `reduce` with one of the two `Action`s.
//! `ResponseState` is the flat view handed to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Where the most recent request stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Done { status_code: u16, payload: Value },
}

/// Transition requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Loading,
    Done { status_code: u16, payload: Value },
}

pub fn reduce(_: Phase, action: Action) -> Phase {
    match action {
        Action::Loading => Phase::Loading,
        Action::Done {
            status_code,
            payload,
        } => Phase::Done {
            status_code,
            payload,
        },
    }
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Phase::Done { status_code, .. } => Some(*status_code),
            Phase::Idle | Phase::Loading => None,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            Phase::Done { payload, .. } => payload,
            Phase::Idle | Phase::Loading => &NULL,
        }
    }

    pub fn to_state(&self) -> ResponseState {
        ResponseState {
            status_code: self.status_code(),
            payload: self.payload().clone(),
            loading: self.is_loading(),
        }
    }
}

/// Outcome of the most recent call as seen by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseState {
    pub status_code: Option<u16>,
    pub payload: Value,
    pub loading: bool,
}

impl From<&Phase> for ResponseState {
    fn from(phase: &Phase) -> Self {
        phase.to_state()
    }
}
