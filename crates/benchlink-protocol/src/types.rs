//! Core protocol types for the benchlink wire format.
//!
//! Every type in this module travels "on the wire": it is serialized to a
//! single JSON object, sent over the TCP link to the compressor node, and
//! deserialized on the other side.
//!
//! There are exactly two message shapes:
//!
//! - [`Command`]: controller → compressor ("turn on", "set the motor
//!   timeout to 5 minutes", "send me your status").
//! - [`Info`]: compressor → controller ("pressure changed", "motor
//!   started", "here is my full status").
//!
//! Each variant carries only the fields that are meaningful to it. A
//! `PressureChange` has a pressure and nothing else; a `GetStatus` has no
//! payload at all. The receiver applies whatever arrived as a partial update.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Discriminators
// ---------------------------------------------------------------------------

/// The kind of a [`Command`], without its payload.
///
/// On the wire this is the `commandType` string, written in upper snake
/// case (`"SET_MOTOR_TIMEOUT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    On,
    Off,
    OffRelease,
    SetCompressionTimeout,
    SetReleaseTimeout,
    SetMotorTimeout,
    GetStatus,
}

impl CommandType {
    /// Every command type, in wire-enum order.
    pub const ALL: [CommandType; 7] = [
        Self::On,
        Self::Off,
        Self::OffRelease,
        Self::SetCompressionTimeout,
        Self::SetReleaseTimeout,
        Self::SetMotorTimeout,
        Self::GetStatus,
    ];

    /// The wire name of this command type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::OffRelease => "OFF_RELEASE",
            Self::SetCompressionTimeout => "SET_COMPRESSION_TIMEOUT",
            Self::SetReleaseTimeout => "SET_RELEASE_TIMEOUT",
            Self::SetMotorTimeout => "SET_MOTOR_TIMEOUT",
            Self::GetStatus => "GET_STATUS",
        }
    }

    /// Whether commands of this type carry a `timeout` field.
    pub fn takes_timeout(&self) -> bool {
        matches!(
            self,
            Self::SetCompressionTimeout
                | Self::SetReleaseTimeout
                | Self::SetMotorTimeout
        )
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of an [`Info`] event, without its payload.
///
/// On the wire this is the `infoType` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InfoType {
    TurnedOn,
    TurnedOff,
    Releasing,
    Released,
    PressureChange,
    MotorStart,
    MotorStop,
    PressureCountdownEnd,
    ReleaseCountdownEnd,
    MotorCountdownEnd,
    PressureCountdownUpdated,
    ReleaseCountdownUpdate,
    MotorCountdownUpdate,
    SupplyStart,
    SupplyStop,
    TemperatureChange,
    StatusUpdate,
}

impl InfoType {
    /// Every info type, in wire-enum order.
    pub const ALL: [InfoType; 17] = [
        Self::TurnedOn,
        Self::TurnedOff,
        Self::Releasing,
        Self::Released,
        Self::PressureChange,
        Self::MotorStart,
        Self::MotorStop,
        Self::PressureCountdownEnd,
        Self::ReleaseCountdownEnd,
        Self::MotorCountdownEnd,
        Self::PressureCountdownUpdated,
        Self::ReleaseCountdownUpdate,
        Self::MotorCountdownUpdate,
        Self::SupplyStart,
        Self::SupplyStop,
        Self::TemperatureChange,
        Self::StatusUpdate,
    ];

    /// The wire name of this info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TurnedOn => "TURNED_ON",
            Self::TurnedOff => "TURNED_OFF",
            Self::Releasing => "RELEASING",
            Self::Released => "RELEASED",
            Self::PressureChange => "PRESSURE_CHANGE",
            Self::MotorStart => "MOTOR_START",
            Self::MotorStop => "MOTOR_STOP",
            Self::PressureCountdownEnd => "PRESSURE_COUNTDOWN_END",
            Self::ReleaseCountdownEnd => "RELEASE_COUNTDOWN_END",
            Self::MotorCountdownEnd => "MOTOR_COUNTDOWN_END",
            Self::PressureCountdownUpdated => "PRESSURE_COUNTDOWN_UPDATED",
            Self::ReleaseCountdownUpdate => "RELEASE_COUNTDOWN_UPDATE",
            Self::MotorCountdownUpdate => "MOTOR_COUNTDOWN_UPDATE",
            Self::SupplyStart => "SUPPLY_START",
            Self::SupplyStop => "SUPPLY_STOP",
            Self::TemperatureChange => "TEMPERATURE_CHANGE",
            Self::StatusUpdate => "STATUS_UPDATE",
        }
    }
}

impl fmt::Display for InfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CompressorStatus: the full operational snapshot
// ---------------------------------------------------------------------------

/// Everything the compressor node reports about itself.
///
/// This is both the payload of a `STATUS_UPDATE` and the value held by the
/// controller's status mirror. Timer fields are whole minutes.
///
/// `#[serde(rename_all = "camelCase")]` maps `compressor_on` to the wire
/// name `compressorOn`. The container-level `#[serde(default)]` means any
/// field missing from an incoming message decodes as zero/false.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressorStatus {
    pub pressure: f32,
    pub temperature: f32,
    pub compressor_on: bool,
    pub motor_running: bool,
    pub airbrush_in_use: bool,
    pub compression_timer_duration: u32,
    pub compression_time_left: u32,
    pub motor_timer_duration: u32,
    pub motor_time_left: u32,
    pub release_timer_duration: u32,
    pub release_time_left: u32,
}

impl fmt::Display for CompressorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pressure={:.2} temperature={:.2} compressor={} motor={} airbrush={} \
             compression={}/{}min motor={}/{}min release={}/{}min",
            self.pressure,
            self.temperature,
            if self.compressor_on { "on" } else { "off" },
            if self.motor_running { "running" } else { "stopped" },
            if self.airbrush_in_use { "active" } else { "idle" },
            self.compression_time_left,
            self.compression_timer_duration,
            self.motor_time_left,
            self.motor_timer_duration,
            self.release_time_left,
            self.release_timer_duration,
        )
    }
}

// ---------------------------------------------------------------------------
// Command: controller → compressor
// ---------------------------------------------------------------------------

/// A request sent to the compressor node.
///
/// `#[serde(tag = "commandType")]` makes this an internally tagged enum:
/// `Command::SetMotorTimeout { timeout: 5 }` becomes
/// `{ "commandType": "SET_MOTOR_TIMEOUT", "timeout": 5 }` and
/// `Command::GetStatus` becomes `{ "commandType": "GET_STATUS" }` with no
/// timeout key at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Start the compressor.
    On,
    /// Stop the compressor.
    Off,
    /// Stop the compressor and open the release valve.
    OffRelease,
    /// Set how long the compressor may run, in minutes.
    SetCompressionTimeout {
        #[serde(default)]
        timeout: u32,
    },
    /// Set how long the release valve stays open, in minutes.
    SetReleaseTimeout {
        #[serde(default)]
        timeout: u32,
    },
    /// Set how long the motor may run, in minutes.
    SetMotorTimeout {
        #[serde(default)]
        timeout: u32,
    },
    /// Ask the compressor for a full `STATUS_UPDATE`.
    GetStatus,
}

impl Command {
    /// Builds a command from its discriminator and optional timeout.
    ///
    /// The timeout is ignored for types that don't carry one, and defaults
    /// to zero for types that do.
    pub fn from_parts(command_type: CommandType, timeout: Option<u32>) -> Self {
        let timeout = timeout.unwrap_or_default();
        match command_type {
            CommandType::On => Self::On,
            CommandType::Off => Self::Off,
            CommandType::OffRelease => Self::OffRelease,
            CommandType::SetCompressionTimeout => {
                Self::SetCompressionTimeout { timeout }
            }
            CommandType::SetReleaseTimeout => Self::SetReleaseTimeout { timeout },
            CommandType::SetMotorTimeout => Self::SetMotorTimeout { timeout },
            CommandType::GetStatus => Self::GetStatus,
        }
    }

    /// The discriminator of this command.
    pub fn command_type(&self) -> CommandType {
        match self {
            Self::On => CommandType::On,
            Self::Off => CommandType::Off,
            Self::OffRelease => CommandType::OffRelease,
            Self::SetCompressionTimeout { .. } => CommandType::SetCompressionTimeout,
            Self::SetReleaseTimeout { .. } => CommandType::SetReleaseTimeout,
            Self::SetMotorTimeout { .. } => CommandType::SetMotorTimeout,
            Self::GetStatus => CommandType::GetStatus,
        }
    }

    /// The timeout in minutes, for the `SET_*_TIMEOUT` commands.
    pub fn timeout(&self) -> Option<u32> {
        match *self {
            Self::SetCompressionTimeout { timeout }
            | Self::SetReleaseTimeout { timeout }
            | Self::SetMotorTimeout { timeout } => Some(timeout),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Info: compressor → controller
// ---------------------------------------------------------------------------

/// An event or status report from the compressor node.
///
/// Internally tagged on `infoType`. Countdown updates carry the remaining
/// minutes under the mirror field name (`compressionTimeLeft`, ...); the
/// `alias = "timeout"` lets us also read the older shape where the
/// compressor sent the remaining minutes as `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "infoType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Info {
    TurnedOn,
    TurnedOff,
    Releasing,
    Released,
    PressureChange {
        #[serde(default)]
        pressure: f32,
    },
    MotorStart,
    MotorStop,
    PressureCountdownEnd,
    ReleaseCountdownEnd,
    MotorCountdownEnd,
    PressureCountdownUpdated {
        #[serde(rename = "compressionTimeLeft", alias = "timeout", default)]
        compression_time_left: u32,
    },
    ReleaseCountdownUpdate {
        #[serde(rename = "releaseTimeLeft", alias = "timeout", default)]
        release_time_left: u32,
    },
    MotorCountdownUpdate {
        #[serde(rename = "motorTimeLeft", alias = "timeout", default)]
        motor_time_left: u32,
    },
    SupplyStart,
    SupplyStop,
    TemperatureChange {
        #[serde(default)]
        temperature: f32,
    },
    /// A full snapshot. The status fields sit next to `infoType` in the
    /// same flat object, not nested under a key.
    StatusUpdate(CompressorStatus),
}

impl Info {
    /// The discriminator of this event.
    pub fn info_type(&self) -> InfoType {
        match self {
            Self::TurnedOn => InfoType::TurnedOn,
            Self::TurnedOff => InfoType::TurnedOff,
            Self::Releasing => InfoType::Releasing,
            Self::Released => InfoType::Released,
            Self::PressureChange { .. } => InfoType::PressureChange,
            Self::MotorStart => InfoType::MotorStart,
            Self::MotorStop => InfoType::MotorStop,
            Self::PressureCountdownEnd => InfoType::PressureCountdownEnd,
            Self::ReleaseCountdownEnd => InfoType::ReleaseCountdownEnd,
            Self::MotorCountdownEnd => InfoType::MotorCountdownEnd,
            Self::PressureCountdownUpdated { .. } => InfoType::PressureCountdownUpdated,
            Self::ReleaseCountdownUpdate { .. } => InfoType::ReleaseCountdownUpdate,
            Self::MotorCountdownUpdate { .. } => InfoType::MotorCountdownUpdate,
            Self::SupplyStart => InfoType::SupplyStart,
            Self::SupplyStop => InfoType::SupplyStop,
            Self::TemperatureChange { .. } => InfoType::TemperatureChange,
            Self::StatusUpdate(_) => InfoType::StatusUpdate,
        }
    }
}

// ---------------------------------------------------------------------------
// Message: the top-level wire object
// ---------------------------------------------------------------------------

/// One line on the wire.
///
/// Two levels of internal tagging produce a single flat object:
///
/// ```text
/// Message::Command(Command::SetMotorTimeout { timeout: 5 })
///   → {"messageType":"COMMAND","commandType":"SET_MOTOR_TIMEOUT","timeout":5}
///
/// Message::Info(Info::PressureChange { pressure: 2.5 })
///   → {"messageType":"INFO","infoType":"PRESSURE_CHANGE","pressure":2.5}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Command(Command),
    Info(Info),
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<Info> for Message {
    fn from(info: Info) -> Self {
        Self::Info(info)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(cmd) => match cmd.timeout() {
                Some(minutes) => {
                    write!(f, "COMMAND {} ({minutes} min)", cmd.command_type())
                }
                None => write!(f, "COMMAND {}", cmd.command_type()),
            },
            Self::Info(info) => write!(f, "INFO {}", info.info_type()),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
