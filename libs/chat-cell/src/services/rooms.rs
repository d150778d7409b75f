use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const ROOM_CAPACITY: usize = 100;

pub type RoomSender = broadcast::Sender<String>;
pub type RoomReceiver = broadcast::Receiver<String>;

/// Chat rooms keyed by appointment identifier. A room exists while at least
/// one connection is subscribed to it.
#[derive(Clone, Default)]
pub struct ChatRooms {
    rooms: Arc<RwLock<HashMap<String, RoomSender>>>,
}

impl ChatRooms {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(&self, room: &str) -> RoomReceiver {
        let mut rooms = self.rooms.write().await;
        let sender = rooms.entry(room.to_string()).or_insert_with(|| {
            debug!("Opening chat room {}", room);
            broadcast::channel(ROOM_CAPACITY).0
        });
        sender.subscribe()
    }

    /// Delivers `payload` to every member of `room` and returns how many
    /// there were.
    pub async fn publish(&self, room: &str, payload: String) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(room) {
            Some(sender) => sender.send(payload).unwrap_or(0),
            None => 0,
        }
    }

    /// Call after dropping the member's receiver; the room is closed once
    /// nobody is left in it.
    pub async fn leave(&self, room: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(room).is_some_and(|sender| sender.receiver_count() == 0) {
            rooms.remove(room);
            debug!("Closed empty chat room {}", room);
        }
    }

    pub async fn member_count(&self, room: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room).map(|sender| sender.receiver_count()).unwrap_or(0)
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms.keys().cloned().collect()
    }
}
