//! Process-wide settings read at write time.
//!
//! Set these once at start-up; they are not meant to change while writes are in flight.

use std::sync::RwLock;

/// Width of the program name field of a named-program header.
pub const PROGRAM_NAME_LEN: usize = 24;

pub const DEFAULT_PROGRAM_NAME: &str = "iff_codec";

static PROGRAM_NAME: RwLock<Option<String>> = RwLock::new(None);

/// The name written into named-program headers whose container has none of its own.
pub fn default_program_name() -> String {
    let guard = match PROGRAM_NAME.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    guard.clone().unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_owned())
}

pub fn set_default_program_name(name: impl Into<String>) {
    let name = name.into();
    log::debug!("default program name set to {name:?}");

    match PROGRAM_NAME.write() {
        Ok(mut guard) => *guard = Some(name),
        Err(poisoned) => *poisoned.into_inner() = Some(name),
    }
}

/// Reverts to [`DEFAULT_PROGRAM_NAME`].
pub fn reset_default_program_name() {
    match PROGRAM_NAME.write() {
        Ok(mut guard) => *guard = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}
