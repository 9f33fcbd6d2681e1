use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic input performed when the idle threshold is reached.
#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Nudge the cursor one pixel and back
    #[default]
    Move,
    /// Trace a small square and return
    Jiggle,
    /// Press and release Shift
    Press,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Move => "move",
            ActionKind::Jiggle => "jiggle",
            ActionKind::Press => "press",
        };
        f.write_str(name)
    }
}

/// How a monitoring run came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Interrupted,
    FailSafe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub actions: u64,
    pub outcome: Outcome,
}
