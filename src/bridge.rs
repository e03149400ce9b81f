// Inbound messages posted by the creative's script: `{"type": ..., "message": ...}`.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Raw script message. Missing fields read as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BridgeMessage {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl BridgeMessage {
    pub fn parse(channel: &'static str, json: &str) -> Result<Self, TrackerError> {
        serde_json::from_str(json).map_err(|_| TrackerError::MalformedMessage {
            channel,
            payload: json.to_string(),
        })
    }

    /// The creative reported a successful render.
    pub fn is_render_success(&self) -> bool {
        self.kind == "RENDER_STATUS" && self.message == "Success"
    }
}

/// Video element status reported by the creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Play,
    Pause,
    Ended,
}

impl VideoStatus {
    pub fn from_kind(kind: &str) -> Result<Self, TrackerError> {
        match kind {
            "PLAY" => Ok(VideoStatus::Play),
            "PAUSE" => Ok(VideoStatus::Pause),
            "ENDED" => Ok(VideoStatus::Ended),
            other => Err(TrackerError::UnknownVideoStatus(other.to_string())),
        }
    }
}

/// `true` iff the payload is a successful render report. Other well-formed messages are `false`.
pub fn parse_render_status(json: &str) -> Result<bool, TrackerError> {
    Ok(BridgeMessage::parse("render", json)?.is_render_success())
}

pub fn parse_video_status(json: &str) -> Result<VideoStatus, TrackerError> {
    let message = BridgeMessage::parse("video", json)?;
    VideoStatus::from_kind(&message.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_success() {
        assert!(parse_render_status(r#"{"type":"RENDER_STATUS","message":"Success"}"#).unwrap());
    }

    #[test]
    fn other_render_messages_are_not_success() {
        assert!(!parse_render_status(r#"{"type":"RENDER_STATUS","message":"Failed"}"#).unwrap());
        assert!(!parse_render_status(r#"{"type":"LOG","message":"Success"}"#).unwrap());
        assert!(!parse_render_status("{}").unwrap());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = parse_render_status("RENDER_STATUS Success").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedMessage { channel: "render", .. }));
        assert!(parse_video_status("[1, 2").is_err());
    }

    #[test]
    fn video_statuses() {
        assert_eq!(parse_video_status(r#"{"type":"PLAY"}"#).unwrap(), VideoStatus::Play);
        assert_eq!(
            parse_video_status(r#"{"type":"PAUSE","message":""}"#).unwrap(),
            VideoStatus::Pause
        );
        assert_eq!(parse_video_status(r#"{"type":"ENDED"}"#).unwrap(), VideoStatus::Ended);
        assert!(matches!(
            parse_video_status(r#"{"type":"SEEK"}"#),
            Err(TrackerError::UnknownVideoStatus(_))
        ));
    }
}
