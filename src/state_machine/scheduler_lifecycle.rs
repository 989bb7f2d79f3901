// Copyright (c) 2025 - Cowboy AI, Inc.
//! Collection scheduler lifecycle
//!
//! ```text
//!            Start             Tick
//!   Idle ───────────▶ Running ──────┐
//!    │                 │  ▲ ◀──────┘
//!    │ Cancel   Cancel │  │
//!    ▼                 ▼  │ Stop
//! Cancelled ◀──────────┘  └──────▶ Idle
//! ```
//!
//! `Start` and every `Tick` ask for one collection pass. `Cancelled` is
//! terminal.

use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Number of passes launched so far
    Running { passes: u64 },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerInput {
    Start,
    Tick,
    Cancel,
    /// Collector gave up (e.g. its watchers could not start)
    Stop,
}

/// What the scheduler loop should do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    RunPass,
    Exit,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running { passes } => write!(f, "Running({passes})"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl fmt::Display for SchedulerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "Start",
            Self::Tick => "Tick",
            Self::Cancel => "Cancel",
            Self::Stop => "Stop",
        };
        f.write_str(s)
    }
}

impl SchedulerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl StateMachine for SchedulerState {
    type Input = SchedulerInput;
    type Output = SchedulerAction;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use SchedulerInput::*;
        match (self, input) {
            (Self::Idle, Start) => Ok((Self::Running { passes: 1 }, SchedulerAction::RunPass)),
            (Self::Idle, Cancel) => Ok((Self::Cancelled, SchedulerAction::Exit)),
            (Self::Running { passes }, Tick) => Ok((
                Self::Running { passes: passes + 1 },
                SchedulerAction::RunPass,
            )),
            (Self::Running { .. }, Cancel) => Ok((Self::Cancelled, SchedulerAction::Exit)),
            (Self::Running { .. }, Stop) => Ok((Self::Idle, SchedulerAction::Exit)),
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }
}
