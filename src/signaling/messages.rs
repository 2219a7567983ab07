//! Signaling message types
//!
//! Every frame on the signaling channel is a JSON object with a `type` tag
//! and an optional `payload`:
//!
//! - **Outgoing** ([`OutgoingMessage`]): `offer`, `ice-candidate`, `form`,
//!   plus the host commands `emit-audio`, `change-field` and `interrupt`.
//! - **Incoming** ([`IncomingMessage`]): negotiation (`answer`,
//!   `ice-candidate`) and conversation events (`event-*`). Unrecognized tags
//!   parse to [`IncomingMessage::Unknown`] so newer servers do not break
//!   older clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::Form;

/// SDP description kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

/// Media session description exchanged during negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// One self-contained connectivity candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Payload of `emit-audio`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitAudioPayload {
    pub content: String,
    /// Pre-empt current output instead of queuing behind it
    pub interrupt: bool,
}

/// Payload of `change-field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFieldPayload {
    pub field_name: String,
    pub interrupt: bool,
}

/// Messages sent from the client to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum OutgoingMessage {
    Offer(SessionDescription),
    IceCandidate(IceCandidate),
    Form(Form),
    EmitAudio(EmitAudioPayload),
    ChangeField(ChangeFieldPayload),
    Interrupt,
}

impl OutgoingMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            OutgoingMessage::Offer(_) => "offer",
            OutgoingMessage::IceCandidate(_) => "ice-candidate",
            OutgoingMessage::Form(_) => "form",
            OutgoingMessage::EmitAudio(_) => "emit-audio",
            OutgoingMessage::ChangeField(_) => "change-field",
            OutgoingMessage::Interrupt => "interrupt",
        }
    }
}

/// Payload of `event-focus-changed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusChange {
    #[serde(default)]
    pub previous_name: String,
    pub next_name: String,
}

/// A resolved answer value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldAnswer {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for FieldAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldAnswer::Bool(b) => write!(f, "{b}"),
            FieldAnswer::Number(n) => write!(f, "{n}"),
            FieldAnswer::Text(s) => f.write_str(s),
        }
    }
}

/// Payload of `event-field-resolved`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldResolution {
    pub field_name: String,
    pub answer: FieldAnswer,
}

/// Messages received from the server
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    Answer(SessionDescription),
    IceCandidate(IceCandidate),
    /// `event-start`: the conversation is running
    Start,
    /// `event-end`: the conversation is complete
    End,
    AudioOutStart(String),
    AudioOutEnd(String),
    InputStart(String),
    InputEnd(String),
    FocusChanged(FocusChange),
    FieldResolved(FieldResolution),
    /// Recoverable server error
    Error(String),
    /// Fatal server error; the session is torn down
    CriticalError(String),
    /// Unrecognized `type`; logged and ignored
    Unknown(String),
}

impl IncomingMessage {
    /// Parse a text frame, peeking at `type` first
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            message_type: String,
            #[serde(default)]
            payload: Option<Value>,
        }

        let envelope: Envelope = serde_json::from_str(text)?;
        let payload = envelope.payload;

        let message = match envelope.message_type.as_str() {
            "answer" => IncomingMessage::Answer(from_payload(payload)?),
            "ice-candidate" => IncomingMessage::IceCandidate(from_payload(payload)?),
            "event-start" => IncomingMessage::Start,
            "event-end" => IncomingMessage::End,
            "event-audio-out-start" => IncomingMessage::AudioOutStart(descriptor(payload)),
            "event-audio-out-end" => IncomingMessage::AudioOutEnd(descriptor(payload)),
            "event-input-start" => IncomingMessage::InputStart(descriptor(payload)),
            "event-input-end" => IncomingMessage::InputEnd(descriptor(payload)),
            "event-focus-changed" => IncomingMessage::FocusChanged(from_payload(payload)?),
            "event-field-resolved" => IncomingMessage::FieldResolved(from_payload(payload)?),
            "event-error" => IncomingMessage::Error(descriptor(payload)),
            "event-critical-error" => IncomingMessage::CriticalError(descriptor(payload)),
            other => IncomingMessage::Unknown(other.to_string()),
        };

        Ok(message)
    }

    /// Wire tag, for logging
    pub fn kind(&self) -> &str {
        match self {
            IncomingMessage::Answer(_) => "answer",
            IncomingMessage::IceCandidate(_) => "ice-candidate",
            IncomingMessage::Start => "event-start",
            IncomingMessage::End => "event-end",
            IncomingMessage::AudioOutStart(_) => "event-audio-out-start",
            IncomingMessage::AudioOutEnd(_) => "event-audio-out-end",
            IncomingMessage::InputStart(_) => "event-input-start",
            IncomingMessage::InputEnd(_) => "event-input-end",
            IncomingMessage::FocusChanged(_) => "event-focus-changed",
            IncomingMessage::FieldResolved(_) => "event-field-resolved",
            IncomingMessage::Error(_) => "event-error",
            IncomingMessage::CriticalError(_) => "event-critical-error",
            IncomingMessage::Unknown(kind) => kind,
        }
    }
}

fn from_payload<T: serde::de::DeserializeOwned>(
    payload: Option<Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload.unwrap_or(Value::Null))
}

/// Descriptors are usually strings; anything else is kept as compact JSON
fn descriptor(payload: Option<Value>) -> String {
    match payload {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outgoing_offer_shape() {
        let msg = OutgoingMessage::Offer(SessionDescription::offer("v=0"));
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "offer", "payload": {"type": "offer", "sdp": "v=0"}})
        );
    }

    #[test]
    fn test_outgoing_commands_shape() {
        let value = serde_json::to_value(OutgoingMessage::ChangeField(ChangeFieldPayload {
            field_name: "email".to_string(),
            interrupt: true,
        }))
        .unwrap();
        assert_eq!(
            value,
            json!({"type": "change-field", "payload": {"fieldName": "email", "interrupt": true}})
        );

        let value = serde_json::to_value(OutgoingMessage::Interrupt).unwrap();
        assert_eq!(value, json!({"type": "interrupt"}));
    }

    #[test]
    fn test_outgoing_candidate_shape() {
        let mut candidate = IceCandidate::new("candidate:1 1 udp 2122260223 10.0.0.1 5000 typ host");
        candidate.sdp_mid = Some("0".to_string());
        candidate.sdp_m_line_index = Some(0);
        let value = serde_json::to_value(OutgoingMessage::IceCandidate(candidate)).unwrap();
        assert_eq!(value["type"], "ice-candidate");
        assert_eq!(value["payload"]["sdpMid"], "0");
        assert_eq!(value["payload"]["sdpMLineIndex"], 0);
    }

    #[test]
    fn test_parse_negotiation_messages() {
        let msg = IncomingMessage::parse(
            r#"{"type":"answer","payload":{"type":"answer","sdp":"v=0 remote"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            IncomingMessage::Answer(SessionDescription::answer("v=0 remote"))
        );

        let msg = IncomingMessage::parse(
            r#"{"type":"ice-candidate","payload":{"candidate":"c1","sdpMid":"0","sdpMLineIndex":0}}"#,
        )
        .unwrap();
        match msg {
            IncomingMessage::IceCandidate(c) => {
                assert_eq!(c.candidate, "c1");
                assert_eq!(c.sdp_m_line_index, Some(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"event-start"}"#).unwrap(),
            IncomingMessage::Start
        );
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"event-end","payload":null}"#).unwrap(),
            IncomingMessage::End
        );
        assert_eq!(
            IncomingMessage::parse(
                r#"{"type":"event-focus-changed","payload":{"previousName":"a","nextName":"b"}}"#
            )
            .unwrap(),
            IncomingMessage::FocusChanged(FocusChange {
                previous_name: "a".to_string(),
                next_name: "b".to_string(),
            })
        );
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"event-input-end","payload":"hello"}"#).unwrap(),
            IncomingMessage::InputEnd("hello".to_string())
        );
        assert_eq!(
            IncomingMessage::parse(r#"{"type":"event-critical-error","payload":"boom"}"#)
                .unwrap(),
            IncomingMessage::CriticalError("boom".to_string())
        );
    }

    #[test]
    fn test_parse_field_answers() {
        let cases = [
            (json!("42"), FieldAnswer::Text("42".to_string())),
            (json!(42), FieldAnswer::Number(42.0)),
            (json!(true), FieldAnswer::Bool(true)),
        ];
        for (answer, expected) in cases {
            let text = json!({
                "type": "event-field-resolved",
                "payload": {"fieldName": "b", "answer": answer}
            })
            .to_string();
            match IncomingMessage::parse(&text).unwrap() {
                IncomingMessage::FieldResolved(resolution) => {
                    assert_eq!(resolution.field_name, "b");
                    assert_eq!(resolution.answer, expected);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_object_descriptor() {
        let msg = IncomingMessage::parse(
            r#"{"type":"event-audio-out-start","payload":{"text":"Hi","id":3}}"#,
        )
        .unwrap();
        match msg {
            IncomingMessage::AudioOutStart(chunk) => {
                let value: Value = serde_json::from_str(&chunk).unwrap();
                assert_eq!(value["id"], 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let msg = IncomingMessage::parse(r#"{"type":"event-new-thing","payload":{"x":1}}"#).unwrap();
        assert_eq!(msg, IncomingMessage::Unknown("event-new-thing".to_string()));
        assert_eq!(msg.kind(), "event-new-thing");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(IncomingMessage::parse("not json").is_err());
        assert!(IncomingMessage::parse(r#"{"payload":1}"#).is_err());
        assert!(IncomingMessage::parse(r#"{"type":"answer"}"#).is_err());
    }

    #[test]
    fn test_field_answer_display() {
        assert_eq!(FieldAnswer::Number(42.0).to_string(), "42");
        assert_eq!(FieldAnswer::Bool(false).to_string(), "false");
        assert_eq!(FieldAnswer::Text("x".into()).to_string(), "x");
    }
}
