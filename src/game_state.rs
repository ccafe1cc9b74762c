//! Game state as seen by the renderer
//!
//! The authoritative game lives elsewhere (session/server). This module only
//! carries what the drawing code reads: terrain, characters, whose turn it
//! is, who is selected and who is watching. A scenario file in the same
//! shape seeds the client at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ClientError;
use crate::scene::VisualId;
use crate::ui::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

/// Tile coordinates on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        GridPos { x, y }
    }

    /// Neighbouring cell one step in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        GridPos::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainCell {
    /// 0 or 1; picks one of the two terrain sprites
    pub kind: u8,
    pub x: i32,
    pub y: i32,
}

/// Non-interactive decoration drawn on top of the terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedTexture {
    /// Sprite asset name
    pub name: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub current_action_points: u32,
    pub fresh_action_points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    /// Also the sprite asset name
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub position: GridPos,
    pub owner: PlayerId,
    pub stats: Stats,
    /// Sprite drawn for this character, if any. A lookup key into the
    /// scene, not an owning handle.
    #[serde(skip)]
    pub visual: Option<VisualId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub terrain: Vec<TerrainCell>,
    #[serde(default)]
    pub textures: Vec<PlacedTexture>,
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Player whose turn it is, if a turn is in progress
    #[serde(default)]
    pub current_player: Option<PlayerId>,
    #[serde(default)]
    pub selected_character: Option<CharacterId>,
    /// The local user
    pub viewer: PlayerId,
}

impl GameState {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)?;
        let state: GameState = serde_json::from_str(&content)?;
        Ok(state)
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn character_at(&self, position: GridPos) -> Option<&Character> {
        self.characters.iter().find(|c| c.position == position)
    }

    pub fn selected(&self) -> Option<&Character> {
        self.selected_character.and_then(|id| self.character(id))
    }

    pub fn is_owned_by_viewer(&self, character: &Character) -> bool {
        character.owner == self.viewer
    }

    pub fn is_viewer_turn(&self) -> bool {
        self.current_player == Some(self.viewer)
    }

    pub fn in_bounds(&self, position: GridPos) -> bool {
        self.terrain
            .iter()
            .any(|cell| cell.x == position.x && cell.y == position.y)
    }
}
