//! On-screen control panel
//!
//! The panel is a fixed set of widgets: three info labels for the selected
//! character, a directional pad for movement, a second pad for attacks, an
//! end-turn button, and two single-tile cursors ("selected" marks the
//! selected character, "selector" follows the pointer over characters).
//! Widgets live in the scene like any other visual; [`UiContainer`] only
//! remembers their ids.

use serde::Deserialize;

use crate::game_state::CharacterId;
use crate::scene::{Point, VisualId};

pub const UI_LAYER: i32 = 100;
/// Sprite used for both cursors
pub const CURSOR_ASSET: &str = "UI_selector";
pub const SELECTED_TINT: u32 = 0x7af5f5;
pub const FRIENDLY_HOVER_TINT: u32 = 0x00dd00;
pub const HOSTILE_HOVER_TINT: u32 = 0xdd0000;
pub const CURSOR_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Right,
    Down,
}

impl Direction {
    /// Grid step for one move in this direction (y grows downward)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
        }
    }
}

/// What a pressed widget asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Move(Direction),
    Attack(Direction),
    EndTurn,
    SelectCharacter(CharacterId),
}

/// A triggered [`UiAction`] together with where the pointer was
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiEvent {
    pub action: UiAction,
    pub position: Point,
}

/// Four widgets arranged around a centre point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalPad {
    pub up: VisualId,
    pub left: VisualId,
    pub right: VisualId,
    pub down: VisualId,
}

impl DirectionalPad {
    pub fn ids(&self) -> [VisualId; 4] {
        [self.up, self.left, self.right, self.down]
    }
}

/// Ids of every panel widget, filled in by `RenderWorld::draw_ui`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContainer {
    pub name: VisualId,
    pub description: VisualId,
    pub ap: VisualId,
    pub move_pad: DirectionalPad,
    pub attack_pad: DirectionalPad,
    pub end_turn: VisualId,
    pub selected: VisualId,
    pub selector: VisualId,
}

impl UiContainer {
    pub fn labels(&self) -> [VisualId; 3] {
        [self.name, self.description, self.ap]
    }

    /// Move and attack buttons, which are only shown for the viewer's own
    /// characters
    pub fn command_buttons(&self) -> impl Iterator<Item = VisualId> {
        self.move_pad
            .ids()
            .into_iter()
            .chain(self.attack_pad.ids())
    }
}

/// Screen positions of the panel widgets
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiLayout {
    pub name_label: (f32, f32),
    pub description_label: (f32, f32),
    pub ap_label: (f32, f32),
    /// Centre of the movement pad
    pub move_pad: (f32, f32),
    /// Centre of the attack pad
    pub attack_pad: (f32, f32),
    /// Distance from a pad's centre to each of its buttons
    pub pad_spacing: f32,
    pub end_turn: (f32, f32),
    pub label_scale: u32,
    pub button_scale: u32,
    pub label_color: u32,
    pub button_color: u32,
    pub end_turn_color: u32,
}

impl Default for UiLayout {
    fn default() -> Self {
        UiLayout {
            name_label: (1100.0, 40.0),
            description_label: (1100.0, 80.0),
            ap_label: (1100.0, 120.0),
            move_pad: (1180.0, 260.0),
            attack_pad: (1420.0, 260.0),
            pad_spacing: 60.0,
            end_turn: (1100.0, 400.0),
            label_scale: 3,
            button_scale: 2,
            label_color: 0xffffff,
            button_color: 0xffffff,
            end_turn_color: 0xffdd55,
        }
    }
}

impl UiLayout {
    /// Top-left of the button for `direction` on a pad centred at `centre`
    pub fn pad_button(&self, centre: (f32, f32), direction: Direction) -> Point {
        let (dx, dy) = direction.offset();
        Point::new(
            centre.0 + dx as f32 * self.pad_spacing,
            centre.1 + dy as f32 * self.pad_spacing,
        )
    }
}

pub fn point((x, y): (f32, f32)) -> Point {
    Point::new(x, y)
}
