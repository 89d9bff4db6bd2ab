//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between [`Message`] values and the
//! text that travels on the wire. The server doesn't care HOW messages are
//! serialized; it holds something that implements [`Codec`] and calls it
//! once per line.
//!
//! Currently we provide [`JsonCodec`], which matches what the compressor
//! firmware speaks: one flat JSON object per line.

use crate::{Message, ProtocolError};

/// Converts [`Message`]s to and from their wire text.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the server's session task holds the codec and may be
///   moved between runtime worker threads.
/// - `'static` → the codec owns everything it needs, so it can live inside
///   a spawned task.
///
/// A decode either returns a complete [`Message`] or an error. There is no
/// "half-decoded" result, which is what keeps the status mirror from ever
/// seeing a partially applied update.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message to its wire text, without a line terminator.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails (for example
    /// a non-finite float in a JSON codec).
    fn encode(&self, message: &Message) -> Result<String, ProtocolError>;

    /// Parses one line of raw bytes into a message.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed, not
    /// UTF-8, missing a discriminator, or name a type we don't know.
    fn decode_slice(&self, data: &[u8]) -> Result<Message, ProtocolError>;

    /// Parses one line of text into a message.
    fn decode(&self, line: &str) -> Result<Message, ProtocolError> {
        self.decode_slice(line.as_bytes())
    }

    /// Serializes a message and appends the `\n` frame terminator.
    fn encode_line(&self, message: &Message) -> Result<String, ProtocolError> {
        let mut line = self.encode(message)?;
        line.push('\n');
        Ok(line)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The field layout comes entirely from the serde attributes on the types
/// in this crate, so the codec itself is a thin wrapper.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use benchlink_protocol::{Codec, Command, JsonCodec, Message};
///
/// let codec = JsonCodec;
///
/// let line = codec
///     .encode_line(&Message::Command(Command::SetMotorTimeout { timeout: 5 }))
///     .unwrap();
/// assert_eq!(
///     line,
///     "{\"messageType\":\"COMMAND\",\"commandType\":\"SET_MOTOR_TIMEOUT\",\"timeout\":5}\n"
/// );
///
/// let decoded = codec.decode(line.trim_end()).unwrap();
/// assert_eq!(decoded, Message::Command(Command::SetMotorTimeout { timeout: 5 }));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, message: &Message) -> Result<String, ProtocolError> {
        serde_json::to_string(message).map_err(ProtocolError::Encode)
    }

    fn decode_slice(&self, data: &[u8]) -> Result<Message, ProtocolError> {
        // `from_slice` validates UTF-8 inside string values itself, so a
        // stray high byte surfaces as a decode error like any other.
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Command, CommandType, CompressorStatus, Info};

    fn sample_status() -> CompressorStatus {
        CompressorStatus {
            pressure: 101.3,
            temperature: 25.6,
            compressor_on: true,
            motor_running: false,
            airbrush_in_use: true,
            compression_timer_duration: 10,
            compression_time_left: 1,
            motor_timer_duration: 5,
            motor_time_left: 1,
            release_timer_duration: 8,
            release_time_left: 1,
        }
    }

    fn all_messages() -> Vec<Message> {
        let mut messages: Vec<Message> = CommandType::ALL
            .into_iter()
            .map(|ty| Message::Command(Command::from_parts(ty, Some(12))))
            .collect();
        messages.extend(
            [
                Info::TurnedOn,
                Info::TurnedOff,
                Info::Releasing,
                Info::Released,
                Info::PressureChange { pressure: 3.25 },
                Info::MotorStart,
                Info::MotorStop,
                Info::PressureCountdownEnd,
                Info::ReleaseCountdownEnd,
                Info::MotorCountdownEnd,
                Info::PressureCountdownUpdated {
                    compression_time_left: 4,
                },
                Info::ReleaseCountdownUpdate { release_time_left: 2 },
                Info::MotorCountdownUpdate { motor_time_left: 9 },
                Info::SupplyStart,
                Info::SupplyStop,
                Info::TemperatureChange { temperature: 21.5 },
                Info::StatusUpdate(sample_status()),
            ]
            .map(Message::Info),
        );
        messages
    }

    #[test]
    fn test_round_trip_every_message() {
        let codec = JsonCodec;
        for msg in all_messages() {
            let text = codec.encode(&msg).unwrap();
            let decoded = codec.decode(&text).unwrap();
            assert_eq!(decoded, msg, "round trip changed {text}");
        }
    }

    #[test]
    fn test_encode_line_appends_single_newline() {
        let line = JsonCodec
            .encode_line(&Message::Command(Command::GetStatus))
            .unwrap();
        assert_eq!(
            line,
            "{\"messageType\":\"COMMAND\",\"commandType\":\"GET_STATUS\"}\n"
        );
    }

    #[test]
    fn test_decode_full_status_update() {
        let line = r#"{"messageType":"INFO","infoType":"STATUS_UPDATE","pressure":101.3,"temperature":25.6,"compressorOn":true,"motorRunning":false,"airbrushInUse":true,"compressionTimerDuration":10,"compressionTimeLeft":1,"motorTimerDuration":5,"motorTimeLeft":1,"releaseTimerDuration":8,"releaseTimeLeft":1}"#;
        let msg = JsonCodec.decode(line).unwrap();
        assert_eq!(msg, Message::Info(Info::StatusUpdate(sample_status())));
    }

    #[test]
    fn test_decode_missing_fields_default_to_zero() {
        let msg = JsonCodec
            .decode(r#"{"messageType":"INFO","infoType":"STATUS_UPDATE","pressure":2.0}"#)
            .unwrap();
        let expected = CompressorStatus {
            pressure: 2.0,
            ..CompressorStatus::default()
        };
        assert_eq!(msg, Message::Info(Info::StatusUpdate(expected)));

        let msg = JsonCodec
            .decode(r#"{"messageType":"COMMAND","commandType":"SET_RELEASE_TIMEOUT"}"#)
            .unwrap();
        assert_eq!(
            msg,
            Message::Command(Command::SetReleaseTimeout { timeout: 0 })
        );
    }

    #[test]
    fn test_decode_legacy_countdown_timeout_key() {
        let msg = JsonCodec
            .decode(
                r#"{"messageType":"INFO","infoType":"PRESSURE_COUNTDOWN_UPDATED","timeout":7}"#,
            )
            .unwrap();
        assert_eq!(
            msg,
            Message::Info(Info::PressureCountdownUpdated {
                compression_time_left: 7
            })
        );
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let msg = JsonCodec
            .decode(r#"{"messageType":"INFO","infoType":"TURNED_ON","uptime":42}"#)
            .unwrap();
        assert_eq!(msg, Message::Info(Info::TurnedOn));
    }

    #[test]
    fn test_decode_rejects_unknown_info_type() {
        let result =
            JsonCodec.decode(r#"{"messageType":"INFO","infoType":"NOT_A_TYPE"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_missing_discriminators() {
        for line in [
            r#"{"infoType":"TURNED_ON"}"#,
            r#"{"messageType":"COMMAND"}"#,
            r#"{"messageType":"STATUS","infoType":"TURNED_ON"}"#,
        ] {
            assert!(JsonCodec.decode(line).is_err(), "accepted {line}");
        }
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(JsonCodec.decode("{\"messageType\":").is_err());
        assert!(JsonCodec.decode("not json").is_err());
    }

    #[test]
    fn test_decode_rejects_negative_timeout() {
        let result = JsonCodec.decode(
            r#"{"messageType":"COMMAND","commandType":"SET_MOTOR_TIMEOUT","timeout":-1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_slice_rejects_invalid_utf8() {
        let mut bytes = br#"{"messageType":"INFO","infoType":"TURNED_ON","x":""#.to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(br#""}"#);
        assert!(matches!(
            JsonCodec.decode_slice(&bytes),
            Err(ProtocolError::Decode(_))
        ));
    }
}
