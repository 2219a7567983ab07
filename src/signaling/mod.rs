//! Signaling protocol spoken with the conversation server

mod messages;

pub use messages::{
    ChangeFieldPayload, EmitAudioPayload, FieldAnswer, FieldResolution, FocusChange,
    IceCandidate, IncomingMessage, OutgoingMessage, SdpType, SessionDescription,
};
