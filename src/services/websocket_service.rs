use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{BuzzerInboundMessage, BuzzerOutboundMessage},
    services::game_service,
    state::{BuzzerConnection, BuzzerIdentity, SharedState},
};

const IDENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual buzzer WebSocket connection.
///
/// The first frame must identify the device within [`IDENT_TIMEOUT`];
/// afterwards every `buzz` frame is run through the store and answered with
/// per-device feedback. A failing socket only ever takes itself down.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(IDENT_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket identification timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let inbound = match BuzzerInboundMessage::from_json_str(&initial_message) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "failed to parse or validate buzzer message");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let BuzzerInboundMessage::Identification {
        team_id,
        team_name,
        player_name,
    } = inbound
    else {
        warn!("first message was not identification");
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    };

    let identity = BuzzerIdentity {
        team_id,
        team_name,
        player_name,
    };
    let connection_id = Uuid::new_v4();
    state.buzzers().insert(
        connection_id,
        BuzzerConnection {
            id: connection_id,
            identity: identity.clone(),
            tx: outbound_tx.clone(),
        },
    );

    info!(
        id = %connection_id,
        team = %identity.team_name,
        player = %identity.player_name,
        "buzzer connected"
    );

    send_message_to_websocket(
        &outbound_tx,
        &BuzzerOutboundMessage::Ack {
            team_id: identity.team_id,
        },
        "identification ack",
    );

    // Push the current gate state so a reconnecting device renders correctly.
    let locked = state.snapshot().await.buzzer.locked;
    send_message_to_websocket(
        &outbound_tx,
        &BuzzerOutboundMessage::Gate { locked },
        "initial gate state",
    );

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match BuzzerInboundMessage::from_json_str(&text) {
                Ok(BuzzerInboundMessage::Buzz) => {
                    let accepted = game_service::press_buzzer(&state, &identity).await;
                    send_message_to_websocket(
                        &outbound_tx,
                        &BuzzerOutboundMessage::Feedback { accepted },
                        "buzz feedback",
                    );
                }
                Ok(BuzzerInboundMessage::Identification { .. }) => {
                    warn!(id = %connection_id, "ignoring duplicate identification message");
                }
                Ok(BuzzerInboundMessage::Unknown) => {
                    warn!(id = %connection_id, "ignoring unknown buzzer message");
                }
                Err(err) => {
                    warn!(id = %connection_id, error = %err, "failed to parse or validate buzzer message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %connection_id, "buzzer closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %connection_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.buzzers().remove(&connection_id);
    info!(id = %connection_id, "buzzer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Push the gate state to every connected buzzer device, dropping
/// connections whose writer has gone away.
pub fn notify_buzzer_gate(state: &SharedState, locked: bool) {
    let payload = match serde_json::to_string(&BuzzerOutboundMessage::Gate { locked }) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize gate message");
            return;
        }
    };

    let mut stale = Vec::new();
    for connection in state.buzzers().iter() {
        if connection
            .tx
            .send(Message::Text(payload.clone().into()))
            .is_err()
        {
            stale.push(connection.id);
        }
    }

    for id in stale {
        debug!(id = %id, "removing buzzer connection with closed writer");
        state.buzzers().remove(&id);
    }
}

/// Serialize a payload and push it onto the provided WebSocket sender.
/// Delivery failures are logged and otherwise ignored; the read loop notices
/// the dead socket on its own.
fn send_message_to_websocket<T>(tx: &mpsc::UnboundedSender<Message>, value: &T, context: &str)
where
    T: ?Sized + serde::Serialize,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(context, error = %err, "failed to serialize websocket message");
            return;
        }
    };

    if tx.send(Message::Text(payload.into())).is_err() {
        debug!(context, "websocket writer closed; message dropped");
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
