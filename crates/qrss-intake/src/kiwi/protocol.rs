//! KiwiSDR wire format: client commands and server frames.
//!
//! Server frames start with a three-byte tag. `SND` frames carry audio:
//!
//! ```text
//! "SND" | flags: u8 | sequence: u32 LE | s-meter: u16 BE | samples: i16 BE ...
//! ```
//!
//! `MSG` frames carry space-separated `key=value` parameters.

use qrss_spec::Band;

use crate::error::IntakeError;

const SND_HEADER: usize = 3 + 1 + 4 + 2;

/// One decoded audio frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundFrame {
    pub flags: u8,
    pub sequence: u32,
    pub smeter: u16,
    pub samples: Vec<i16>,
}

impl SoundFrame {
    /// Signal strength in dBm.
    pub fn rssi_dbm(&self) -> f64 {
        0.1 * self.smeter as f64 - 127.0
    }
}

/// A frame received from the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    Sound(SoundFrame),
    Message(Vec<(String, Option<String>)>),
    Other(String),
}

/// Decode one websocket payload.
pub fn parse_frame(data: &[u8]) -> Result<ServerFrame, IntakeError> {
    if data.len() < 3 {
        return Err(IntakeError::protocol("?", format!("{} byte frame", data.len())));
    }
    let tag = String::from_utf8_lossy(&data[..3]).into_owned();
    match tag.as_str() {
        "SND" => parse_sound(data).map(ServerFrame::Sound),
        "MSG" => Ok(ServerFrame::Message(parse_message(&String::from_utf8_lossy(
            &data[3..],
        )))),
        _ => Ok(ServerFrame::Other(tag)),
    }
}

fn parse_sound(data: &[u8]) -> Result<SoundFrame, IntakeError> {
    if data.len() < SND_HEADER {
        return Err(IntakeError::protocol(
            "SND",
            format!("header needs {SND_HEADER} bytes, got {}", data.len()),
        ));
    }
    let body = &data[SND_HEADER..];
    if body.len() % 2 != 0 {
        return Err(IntakeError::protocol(
            "SND",
            format!("odd payload length {}", body.len()),
        ));
    }
    let samples = body
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    Ok(SoundFrame {
        flags: data[3],
        sequence: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        smeter: u16::from_be_bytes([data[8], data[9]]),
        samples,
    })
}

/// Split `key=value key2 key3=value3` into pairs.
pub fn parse_message(text: &str) -> Vec<(String, Option<String>)> {
    text.split_whitespace()
        .map(|word| match word.split_once('=') {
            Some((k, v)) => (k.to_string(), Some(v.to_string())),
            None => (word.to_string(), None),
        })
        .collect()
}

/// React to a `MSG` frame.
///
/// Returns a command to send back, or an error when the receiver refuses
/// the session.
pub fn answer_message(params: &[(String, Option<String>)]) -> Result<Option<String>, IntakeError> {
    let mut reply = None;
    for (key, value) in params {
        let value = value.as_deref().unwrap_or("");
        match key.as_str() {
            "too_busy" => {
                return Err(IntakeError::Rejected(format!(
                    "all {value} client slots are taken"
                )))
            }
            "badp" if value == "1" => {
                return Err(IntakeError::Rejected("bad password".to_string()))
            }
            "down" => return Err(IntakeError::Rejected("receiver is down".to_string())),
            "audio_rate" => reply = Some(format!("SET AR OK in={value} out=44100")),
            "sample_rate" => tracing::debug!(sample_rate = value, "receiver sample rate"),
            _ => {}
        }
    }
    Ok(reply)
}

/// Receiver settings that apply to every band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningOptions {
    pub agc: bool,
    pub manual_gain: u32,
    pub identify: String,
}

/// Commands sent right after the websocket opens.
///
/// The receiver is tuned to the band's base frequency in upper sideband
/// with audio compression off.
pub fn setup_commands(band: &Band, options: &TuningOptions) -> Vec<String> {
    let freq_khz = band.base_hz as f64 / 1000.0;
    vec![
        "SET auth t=kiwi p=".to_string(),
        "SET squelch=0 max=0".to_string(),
        format!("SET mod=usb low_cut=300 high_cut=3500 freq={freq_khz:.3}"),
        format!(
            "SET agc={} hang=0 thresh=-100 slope=6 decay=1000 manGain={}",
            u8::from(options.agc),
            options.manual_gain
        ),
        "SET compression=0".to_string(),
        format!("SET ident_user={}", options.identify.replace(' ', "%20")),
    ]
}

pub const KEEPALIVE_COMMAND: &str = "SET keepalive";
