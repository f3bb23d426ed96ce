//! Hand-driven commands for exercising the robot workflow without the real
//! fleet, ESP32 or frontend in the loop.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::api::Command;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("unknown command {command} for {origin}")]
    UnknownCommand { origin: SimSource, command: String },
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
}

/// Which system a simulated command pretends to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSource {
    Frontend,
    MirFleet,
    Esp32,
}

impl SimSource {
    pub const ALL: [SimSource; 3] = [SimSource::Frontend, SimSource::MirFleet, SimSource::Esp32];

    pub fn name(self) -> &'static str {
        match self {
            SimSource::Frontend => "Frontend",
            SimSource::MirFleet => "MiRFleet",
            SimSource::Esp32 => "ESP32",
        }
    }

    pub fn commands(self) -> &'static [SimCommand] {
        match self {
            SimSource::Frontend => &FRONTEND,
            SimSource::MirFleet => &MIR_FLEET,
            SimSource::Esp32 => &ESP32,
        }
    }

    pub fn command(self, name: &str) -> Result<&'static SimCommand, SimulatorError> {
        self.commands()
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SimulatorError::UnknownCommand {
                origin: self,
                command: name.to_string(),
            })
    }
}

impl fmt::Display for SimSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimSource {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimSource::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimulatorError::UnknownSource(s.to_string()))
    }
}

/// A form field: wire key plus the label shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub placeholder: &'static str,
}

const fn field(key: &'static str, placeholder: &'static str) -> Field {
    Field { key, placeholder }
}

const START: Field = field("start", "Start");
const END: Field = field("end", "End");
const LOAD: Field = field("loadCompartment", "Load Compartment");
const UNLOAD: Field = field("unloadCompartment", "Unload Compartment");

/// The wire command a catalog entry produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Reset,
    InitiateLoading,
    LoadingDocked,
    UnloadingDocked,
    LoadingDone,
    UnloadingDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCommand {
    pub name: &'static str,
    pub kind: CommandKind,
    /// Robot status value posted after the command was sent.
    pub status: &'static str,
    pub fields: &'static [Field],
}

const FRONTEND: [SimCommand; 2] = [
    SimCommand {
        name: "Reset",
        kind: CommandKind::Reset,
        status: "Waiting",
        fields: &[],
    },
    SimCommand {
        name: "InitiateLoading",
        kind: CommandKind::InitiateLoading,
        status: "Moving to Start",
        fields: &[START, END, LOAD, UNLOAD],
    },
];

const MIR_FLEET: [SimCommand; 2] = [
    SimCommand {
        name: "LoadingDocked",
        kind: CommandKind::LoadingDocked,
        status: "Pickup",
        fields: &[END, LOAD, UNLOAD],
    },
    SimCommand {
        name: "UnloadingDocked",
        kind: CommandKind::UnloadingDocked,
        status: "Dropoff",
        fields: &[UNLOAD],
    },
];

const ESP32: [SimCommand; 2] = [
    SimCommand {
        name: "LoadingDone",
        kind: CommandKind::LoadingDone,
        status: "Moving to Dropoff",
        fields: &[END, UNLOAD],
    },
    SimCommand {
        name: "UnloadingDone",
        kind: CommandKind::UnloadingDone,
        status: "Done",
        fields: &[],
    },
];

impl SimCommand {
    /// Build the wire command from operator input. Every declared field must
    /// be present and non-blank; fields are checked in display order.
    pub fn build(&self, values: &HashMap<String, String>) -> Result<Command, SimulatorError> {
        for f in self.fields {
            let filled = values.get(f.key).is_some_and(|v| !v.trim().is_empty());
            if !filled {
                return Err(SimulatorError::MissingField(f.placeholder));
            }
        }
        let get = |f: Field| values.get(f.key).map(|v| v.trim().to_string()).unwrap_or_default();

        Ok(match self.kind {
            CommandKind::Reset => Command::Reset,
            CommandKind::InitiateLoading => Command::InitiateLoading {
                start: get(START),
                end: get(END),
                load_compartment: get(LOAD),
                unload_compartment: get(UNLOAD),
            },
            CommandKind::LoadingDocked => Command::LoadingDocked {
                end: get(END),
                load_compartment: get(LOAD),
                unload_compartment: get(UNLOAD),
            },
            CommandKind::UnloadingDocked => Command::UnloadingDocked {
                unload_compartment: get(UNLOAD),
            },
            CommandKind::LoadingDone => Command::LoadingDone {
                task_id: None,
                end: Some(get(END)),
                unload_compartment: Some(get(UNLOAD)),
            },
            CommandKind::UnloadingDone => Command::UnloadingDone { task_id: None },
        })
    }
}
