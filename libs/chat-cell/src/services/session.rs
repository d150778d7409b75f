use std::fmt::Display;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::models::{ChatEvent, ChatMessage};
use crate::services::ChatRooms;

/// Relays one connection: frames from `incoming` go to the room, room
/// traffic goes to `outgoing`. Returns when either side closes, after the
/// connection has left the room.
pub async fn run_session<Tx, Rx, E>(rooms: ChatRooms, room: String, sender: String, mut outgoing: Tx, mut incoming: Rx)
where
    Tx: Sink<Message> + Unpin + Send + 'static,
    Rx: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let mut receiver = rooms.join(&room).await;
    info!("{} joined chat room {}", sender, room);

    let mut send_task = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(payload) => {
                    if outgoing.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Chat connection fell behind, {} messages skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let relay_rooms = rooms.clone();
    let relay_room = room.clone();
    let relay_sender = sender.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = incoming.next().await {
            let message = match frame {
                Ok(message) => message,
                Err(e) => {
                    debug!("Chat connection error: {}", e);
                    break;
                }
            };

            match message {
                Message::Text(text) => {
                    let Some(payload) = receive_message(text.as_str(), &relay_sender) else {
                        continue;
                    };
                    relay_rooms.publish(&relay_room, payload).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    // Both tasks must be gone, taking the room receiver with them, before
    // the room can tell whether it is empty.
    let _ = send_task.await;
    let _ = recv_task.await;

    rooms.leave(&room).await;
    info!("{} left chat room {}", sender, room);
}

/// The `receive_message` frame for a client `send_message` frame, stamped
/// with the verified sender. Other frames yield `None`.
fn receive_message(frame: &str, sender: &str) -> Option<String> {
    match serde_json::from_str::<ChatEvent>(frame) {
        Ok(ChatEvent::SendMessage(chat)) => {
            let event = ChatEvent::ReceiveMessage(ChatMessage {
                message: chat.message,
                sender: sender.to_string(),
            });
            serde_json::to_string(&event).ok()
        }
        Ok(ChatEvent::ReceiveMessage(_)) => {
            debug!("Ignoring receive_message frame sent by a client");
            None
        }
        Err(e) => {
            debug!("Ignoring malformed chat frame: {}", e);
            None
        }
    }
}
