use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};

use veform::signaling::{IceCandidate, SessionDescription};
use veform::transport::{
    AudioConstraints, MediaDevices, MediaStream, MediaTrack, PeerConnection, PeerConnector,
    PeerEvent, PlaybackSink, TrackKind,
};
use veform::{
    ClientConfig, FieldSpec, FieldType, FormBuilder, Platform, SessionState, TransportResult,
    Veform,
};

#[derive(Debug)]
struct Microphone;

impl MediaTrack for Microphone {
    fn id(&self) -> String {
        "mic".to_string()
    }

    fn kind(&self) -> TrackKind {
        TrackKind::Audio
    }

    fn stop(&self) {}
}

struct Devices;

#[async_trait]
impl MediaDevices for Devices {
    async fn get_user_media(&self, _: &AudioConstraints) -> TransportResult<MediaStream> {
        let track: Arc<dyn MediaTrack> = Arc::new(Microphone);
        Ok(MediaStream::new(vec![track]))
    }
}

struct Peer {
    remote: Mutex<Option<SessionDescription>>,
}

#[async_trait]
impl PeerConnection for Peer {
    async fn add_track(&self, _: Arc<dyn MediaTrack>) -> TransportResult<()> {
        Ok(())
    }

    async fn create_offer(&self) -> TransportResult<SessionDescription> {
        Ok(SessionDescription::offer("v=0 client"))
    }

    async fn set_local_description(&self, _: SessionDescription) -> TransportResult<()> {
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> TransportResult<()> {
        *self.remote.lock() = Some(description);
        Ok(())
    }

    async fn add_ice_candidate(&self, _: IceCandidate) -> TransportResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

struct Connector {
    peer: Arc<Peer>,
    events: Mutex<Option<mpsc::UnboundedSender<PeerEvent>>>,
}

#[async_trait]
impl PeerConnector for Connector {
    async fn connect(
        &self,
    ) -> TransportResult<(Arc<dyn PeerConnection>, mpsc::UnboundedReceiver<PeerEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock() = Some(tx);
        Ok((self.peer.clone(), rx))
    }
}

struct Speaker;

#[async_trait]
impl PlaybackSink for Speaker {
    async fn play(&self, _: Arc<dyn MediaTrack>) -> TransportResult<()> {
        Ok(())
    }
}

async fn next_json(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) -> Value {
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Close(_) => panic!("client closed early"),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_session_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Scripted server: handshake, a vetoed input, then end once the host redirects
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let offer = next_json(&mut ws).await;
        assert_eq!(offer["type"], "offer");
        assert_eq!(offer["payload"]["sdp"], "v=0 client");

        let form = next_json(&mut ws).await;
        assert_eq!(form["type"], "form");
        assert_eq!(form["payload"]["fields"].as_array().unwrap().len(), 2);
        assert_eq!(form["payload"]["fields"][1]["type"], "yesNo");

        for message in [
            json!({"type": "answer", "payload": {"type": "answer", "sdp": "v=0 server"}}),
            json!({"type": "event-start"}),
            json!({"type": "event-input-end", "payload": "I'd rather not say"}),
        ] {
            ws.send(Message::Text(message.to_string().into()))
                .await
                .unwrap();
        }

        let command = next_json(&mut ws).await;
        assert_eq!(
            command,
            json!({"type": "change-field", "payload": {"fieldName": "consent", "interrupt": true}})
        );

        for message in [
            json!({"type": "event-field-resolved", "payload": {"fieldName": "consent", "answer": true}}),
            json!({"type": "event-end"}),
        ] {
            ws.send(Message::Text(message.to_string().into()))
                .await
                .unwrap();
        }

        // Drain until the client closes
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let mut builder = FormBuilder::new();
    builder.add_field(FieldSpec::of_type("name", "What is your name?", FieldType::Text));
    builder.add_field(FieldSpec::of_type(
        "consent",
        "May we contact you?",
        FieldType::YesNo,
    ));

    let peer = Arc::new(Peer {
        remote: Mutex::new(None),
    });
    let config = ClientConfig::default().with_server_url(format!("ws://{addr}/ws"));
    let platform = Platform::with_websocket_signaling(
        Arc::new(Devices),
        Arc::new(Connector {
            peer: peer.clone(),
            events: Mutex::new(None),
        }),
        Arc::new(Speaker),
        &config,
    );
    let mut veform = Veform::new(&builder, platform, config);

    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let c = calls.clone();
    veform.on_running_started(move || c.lock().push("running".to_string()));
    let c = calls.clone();
    veform.on_audio_in_end(move |input| {
        c.lock().push(format!("input:{input}"));
        true
    });
    let c = calls.clone();
    veform.on_field_value_changed(move |name, answer| {
        c.lock().push(format!("{name}={answer}"));
    });
    let c = calls.clone();
    veform.on_finished(move || c.lock().push("finished".to_string()));

    veform.start().await.unwrap();

    let handle = veform.handle();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_awaiting_continuation() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("veto was not observed");

    handle.change_field("consent", true).unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while veform.state() != SessionState::Ended {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session did not end");
    assert!(!handle.is_awaiting_continuation());

    assert_eq!(
        *calls.lock(),
        vec!["running", "input:I'd rather not say", "consent=true", "finished"]
    );
    assert_eq!(
        *peer.remote.lock(),
        Some(SessionDescription::answer("v=0 server"))
    );

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_server_fails_start() {
    let config = ClientConfig::default().with_server_url("ws://127.0.0.1:1/ws");
    let platform = Platform::with_websocket_signaling(
        Arc::new(Devices),
        Arc::new(Connector {
            peer: Arc::new(Peer {
                remote: Mutex::new(None),
            }),
            events: Mutex::new(None),
        }),
        Arc::new(Speaker),
        &config,
    );
    let mut builder = FormBuilder::new();
    builder.add_field(FieldSpec::of_type("name", "What is your name?", FieldType::Text));

    let mut veform = Veform::new(builder, platform, config);
    let critical = Arc::new(Mutex::new(Vec::<String>::new()));
    let c = critical.clone();
    veform.on_critical_error(move |message| c.lock().push(message));

    assert!(veform.start().await.is_err());
    assert_eq!(veform.state(), SessionState::Failed);
    assert_eq!(critical.lock().len(), 1);
}
