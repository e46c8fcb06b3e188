// Player catalog: the fixed pool of draftable players for a session.

pub mod ingest;
pub mod player;

use std::collections::HashSet;

use tracing::warn;

use crate::draft::pick::Position;
use player::Player;

/// Ordered, immutable collection of players.
///
/// Iteration order is the order players were supplied in; recommendation
/// ties fall back to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    players: Vec<Player>,
}

impl Catalog {
    /// Build a catalog, keeping the first occurrence of any repeated id.
    pub fn new(players: Vec<Player>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(players.len());
        for player in players {
            if seen.insert(player.id.clone()) {
                kept.push(player);
            } else {
                warn!("duplicate player id '{}' in catalog, keeping first", player.id);
            }
        }
        Catalog { players: kept }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players eligible at `pos`, in catalog order.
    pub fn eligible_at(&self, pos: Position) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.positions.contains(&pos))
            .collect()
    }

    /// Case-insensitive substring search over names and ids.
    pub fn search(&self, text: &str) -> Vec<&Player> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle) || p.id.to_lowercase().contains(&needle))
            .collect()
    }
}
