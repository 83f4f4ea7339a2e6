//! Inbound remote commands.
//!
//! Each actuator has an integer `control` field in the remote store.  The
//! dashboard writes `0`/`1`; the controller writes `-1` back once it has
//! consumed the value so the next poll does not re-apply it.

use core::fmt;

/// A command read from an actuator's `control` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PendingCommand {
    /// Consumption marker; nothing to do.
    NoOp = -1,
    Off = 0,
    On = 1,
}

impl PendingCommand {
    /// Raw integer as stored remotely.
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// The `engaged` value this command asks for, `None` for [`NoOp`](Self::NoOp).
    pub const fn target(self) -> Option<bool> {
        match self {
            Self::NoOp => None,
            Self::Off => Some(false),
            Self::On => Some(true),
        }
    }
}

/// A `control` value outside `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand(pub i32);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command value {}", self.0)
    }
}

impl TryFrom<i32> for PendingCommand {
    type Error = UnknownCommand;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(Self::NoOp),
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            other => Err(UnknownCommand(other)),
        }
    }
}
