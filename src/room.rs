use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::engine::{Departure, GameEngine, JoinError};
use crate::server_protocol::{
    full_message, parse_client_message, pong_message, state_message, ParsedClientMessage,
};

pub type ClientSender = mpsc::Sender<String>;

/// One two-seat room: the match engine plus the broadcast group of admitted
/// connections. Rejected connections never enter `clients`.
pub struct Room {
    game: GameEngine,
    clients: HashMap<String, ClientSender>,
}

impl Room {
    pub fn new(game: GameEngine) -> Self {
        Self {
            game,
            clients: HashMap::new(),
        }
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_member(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Admits the connection and broadcasts the new state, or tells it the
    /// room is full and leaves it outside the broadcast group.
    pub fn connect(
        &mut self,
        client_id: &str,
        tx: ClientSender,
        now_ms: u64,
    ) -> Result<usize, JoinError> {
        match self.game.admit(client_id, now_ms) {
            Ok(slot) => {
                self.clients.insert(client_id.to_string(), tx);
                self.broadcast_state();
                Ok(slot)
            }
            Err(JoinError::RoomFull) => {
                info!(client = client_id, "room full, connection rejected");
                send(&tx, client_id, &full_message());
                Err(JoinError::RoomFull)
            }
            Err(err) => {
                debug!(client = client_id, %err, "duplicate admission ignored");
                Err(err)
            }
        }
    }

    /// Applies one inbound frame. Frames from non-members and frames that do
    /// not parse are dropped silently.
    pub fn handle_message(&mut self, client_id: &str, raw: &str) {
        let Some(tx) = self.clients.get(client_id) else {
            trace!(client = client_id, "frame from non-member dropped");
            return;
        };
        match parse_client_message(raw) {
            Some(ParsedClientMessage::Input(input)) => {
                self.game.set_input(client_id, input);
            }
            Some(ParsedClientMessage::Ping { t }) => {
                send(tx, client_id, &pong_message(t));
            }
            None => {
                debug!(client = client_id, "unrecognised frame dropped");
            }
        }
    }

    pub fn disconnect(&mut self, client_id: &str, now_ms: u64) -> Departure {
        self.clients.remove(client_id);
        let departure = self.game.remove_player(client_id, now_ms);
        if departure != Departure::Unknown {
            self.broadcast_state();
        }
        departure
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.game.step(now_ms);
        self.broadcast_state();
    }

    fn broadcast_state(&self) {
        if self.clients.is_empty() {
            return;
        }
        let payload = state_message(&self.game.build_snapshot()).to_string();
        for (client_id, tx) in &self.clients {
            if tx.try_send(payload.clone()).is_err() {
                trace!(client = %client_id, "state dropped, outbound queue unavailable");
            }
        }
    }
}

fn send(tx: &ClientSender, client_id: &str, message: &Value) {
    if tx.try_send(message.to_string()).is_err() {
        trace!(client = client_id, "message dropped, outbound queue unavailable");
    }
}
