//! The session-scoped message store.

use crate::chat::turn::ChatTurn;

/// An append-only, ordered sequence of chat turns.
///
/// Turns are kept in the order they were appended; role alternation is not
/// enforced. The only way to remove turns is [`MessageStore::clear`], which
/// drops all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    turns: Vec<ChatTurn>,
}

impl MessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a turn to the end.
    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Removes every turn.
    pub fn clear(&mut self) {
        self.turns = Vec::new();
    }

    /// All turns in insertion order.
    pub fn all(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// A detached copy of all turns.
    pub fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns.clone()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if there are no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
