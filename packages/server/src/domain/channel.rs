//! Room Channel Registry
//!
//! ルーム → 購読中の接続 の対応表と、その接続群へのファンアウトを担当します。
//! Presence Store とは独立しており、購読はあるが名簿に居ない（あるいはその逆）
//! という状態も表現できます。
//!
//! 配信順序: 同じルームへの broadcast は、各接続の FIFO チャンネルへ呼び出し順に
//! 積まれるため、接続ごとの到着順は投入順と一致します。

use std::collections::HashMap;

use super::{ConnectionId, MessagePusher, OutboundEvent, PusherChannel, RoomId};

pub struct RoomChannelRegistry {
    pusher: Box<dyn MessagePusher>,
    subscribers: HashMap<RoomId, Vec<ConnectionId>>,
    subscriptions: HashMap<ConnectionId, Vec<RoomId>>,
}

impl RoomChannelRegistry {
    pub fn new(pusher: Box<dyn MessagePusher>) -> Self {
        Self {
            pusher,
            subscribers: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }

    /// Make a live connection reachable for broadcasts.
    pub fn attach(&mut self, connection_id: ConnectionId, channel: PusherChannel) {
        self.pusher.register(connection_id, channel);
    }

    /// Drop a connection's outbound channel together with any subscription it
    /// still holds. Returns the rooms that were still subscribed.
    pub fn detach(&mut self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let leftovers = self.rooms_of(connection_id);
        for room_id in &leftovers {
            self.unsubscribe(connection_id, room_id);
        }
        self.pusher.unregister(connection_id);
        leftovers
    }

    /// Subscribe a connection to a room. Returns `false` if it already was.
    pub fn subscribe(&mut self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let connections = self.subscribers.entry(room_id.clone()).or_default();
        if connections.contains(connection_id) {
            return false;
        }
        connections.push(connection_id.clone());
        self.subscriptions
            .entry(connection_id.clone())
            .or_default()
            .push(room_id.clone());
        true
    }

    /// Unsubscribe a connection from a room. Returns `false` if it was not
    /// subscribed.
    pub fn unsubscribe(&mut self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let Some(connections) = self.subscribers.get_mut(room_id) else {
            return false;
        };
        let before = connections.len();
        connections.retain(|id| id != connection_id);
        let removed = connections.len() != before;
        if connections.is_empty() {
            self.subscribers.remove(room_id);
        }

        if let Some(rooms) = self.subscriptions.get_mut(connection_id) {
            rooms.retain(|id| id != room_id);
            if rooms.is_empty() {
                self.subscriptions.remove(connection_id);
            }
        }

        removed
    }

    pub fn is_subscribed(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        self.subscribers
            .get(room_id)
            .is_some_and(|connections| connections.contains(connection_id))
    }

    /// Connections subscribed to a room, in subscription order.
    pub fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.subscribers.get(room_id).cloned().unwrap_or_default()
    }

    /// Rooms a connection is subscribed to, in subscription order.
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.subscriptions
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Deliver an event to a single connection. Returns whether it arrived.
    pub fn push_to(&self, connection_id: &ConnectionId, event: &OutboundEvent) -> bool {
        match self.pusher.push_to(connection_id, event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to push '{}' to '{}': {}", event.kind(), connection_id, e);
                false
            }
        }
    }

    /// Deliver an event to every subscriber of `room_id` except `exclude`.
    ///
    /// Returns the number of connections the event reached.
    pub fn broadcast(
        &self,
        room_id: &RoomId,
        event: &OutboundEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        // Snapshot the subscriber list so delivery never iterates live state.
        let targets: Vec<ConnectionId> = self
            .subscribers(room_id)
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();

        if targets.is_empty() {
            tracing::debug!("No subscribers for '{}' in room '{}'", event.kind(), room_id);
            return 0;
        }

        match self.pusher.push_many(&targets, event) {
            Ok(delivered) => {
                tracing::debug!(
                    "Broadcasted '{}' to {}/{} connection(s) in room '{}'",
                    event.kind(),
                    delivered,
                    targets.len(),
                    room_id
                );
                delivered
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast '{}' in room '{}': {}", event.kind(), room_id, e);
                0
            }
        }
    }

    /// Deliver an event to every subscriber of `room_id`, originator included.
    pub fn broadcast_all(&self, room_id: &RoomId, event: &OutboundEvent) -> usize {
        self.broadcast(room_id, event, None)
    }
}
