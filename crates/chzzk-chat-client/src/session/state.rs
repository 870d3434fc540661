//! Session lifecycle and login sub-state.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

/// `Idle -> Dialing -> Running -> Closing -> Closed`; a failed dial goes
/// straight to `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Dialing = 1,
    Running = 2,
    Closing = 3,
    Closed = 4,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionState::Idle,
            1 => SessionState::Dialing,
            2 => SessionState::Running,
            3 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Idle as u8))
    }

    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, next: SessionState) {
        self.0.store(next as u8, Ordering::Release);
    }

    /// Move `from -> to` atomically; on mismatch returns the actual state.
    pub fn transition(&self, from: SessionState, to: SessionState) -> Result<(), SessionState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(SessionState::from_u8)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Login sub-state inside `Running`: the server-assigned sid and whether a
/// login frame has gone out.
#[derive(Debug, Default)]
pub struct LoginState {
    authenticated: AtomicBool,
    sid: Mutex<Option<String>>,
}

impl LoginState {
    pub fn record_login(&self, sid: &str) {
        *self.sid.lock().unwrap_or_else(|e| e.into_inner()) = Some(sid.to_owned());
        self.authenticated.store(true, Ordering::Release);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub fn sid(&self) -> Option<String> {
        self.sid.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
