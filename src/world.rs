//! RenderWorld: the single owner of everything on screen
//!
//! The frame loop owns one RenderWorld and hands it the game state it should
//! draw. All scene insertions go through `Scene::add_sprite`, so the layer
//! registry always matches what is on screen.

use log::{debug, info, warn};

use crate::assets::AssetCatalog;
use crate::effects::{Effect, EffectKind, EffectList, EffectStyle};
use crate::error::ClientError;
use crate::game_state::{Character, GameState, GridPos, PlacedTexture, TerrainCell};
use crate::messages::MessageLog;
use crate::scene::{Interaction, Point, Scene, Visual, VisualId};
use crate::ui::{
    point, Direction, DirectionalPad, UiAction, UiContainer, UiEvent, UiLayout, CURSOR_ALPHA,
    CURSOR_ASSET, FRIENDLY_HOVER_TINT, HOSTILE_HOVER_TINT, SELECTED_TINT, UI_LAYER,
};

pub const TERRAIN_LAYER: i32 = 0;
pub const TEXTURE_LAYER: i32 = 1;
pub const CHARACTER_LAYER: i32 = 10;
/// Pixels per grid cell
pub const DEFAULT_TILE_SIZE: f32 = 32.0;
const EFFECT_TEXT_COLOR: u32 = 0xffffff;
const EFFECT_TEXT_SCALE: u32 = 2;

pub const INVALID_EFFECT_MESSAGE: &str = "Invalid effect: No target or name specified.";
pub const INVALID_TARGET_MESSAGE: &str = "Invalid target!";

/// Pointer input already mapped to screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved(Point),
    Pressed(Point),
}

/// Arguments for [`RenderWorld::add_effect`]
///
/// Exactly one of `name` (sprite asset) or `text` picks the visual; if both
/// are given the sprite wins. The target is the character's cell when
/// `target_character` is set, else `target_position`. Without `styles` the
/// effect gets [`EffectStyle::default_highlight`].
#[derive(Debug, Default)]
pub struct EffectRequest<'a> {
    pub name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub target_character: Option<&'a Character>,
    pub target_position: Option<GridPos>,
    pub styles: Option<Vec<EffectStyle>>,
}

enum EffectSource<'a> {
    Sprite(&'a str),
    Text(&'a str),
}

/// Owns the scene, the message and effect lists, the asset catalog and the
/// UI panel
pub struct RenderWorld {
    scene: Scene,
    messages: MessageLog,
    effects: EffectList,
    assets: AssetCatalog,
    layout: UiLayout,
    tile_size: f32,
    ui: Option<UiContainer>,
    /// Character sprite currently under the pointer
    hovered: Option<VisualId>,
}

impl RenderWorld {
    pub fn new(assets: AssetCatalog, layout: UiLayout, tile_size: f32) -> Self {
        RenderWorld {
            scene: Scene::new(),
            messages: MessageLog::new(),
            effects: EffectList::new(),
            assets,
            layout,
            tile_size,
            ui: None,
            hovered: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    pub fn grid_to_pixel(&self, position: GridPos) -> Point {
        Point::new(
            position.x as f32 * self.tile_size,
            position.y as f32 * self.tile_size,
        )
    }

    /// One frame: age messages, age effects, then restore layer order
    ///
    /// `delta` is in frames (1.0 per frame at the target rate).
    pub fn tick(&mut self, delta: f32) -> Result<(), ClientError> {
        self.messages.tick(&mut self.scene, delta);
        self.effects.tick(&mut self.scene, delta);
        self.scene.sort_by_layer()?;
        Ok(())
    }

    /// Adds a message below any still on screen
    pub fn show_message(&mut self, text: &str) -> VisualId {
        self.messages.show(&mut self.scene, text)
    }

    /// Spawns a transient effect on a character or cell
    ///
    /// Invalid requests put a diagnostic message on screen and return
    /// `None` without creating anything.
    pub fn add_effect(&mut self, request: EffectRequest) -> Option<VisualId> {
        let source = match (request.name, request.text) {
            (Some(name), _) => EffectSource::Sprite(name),
            (None, Some(text)) => EffectSource::Text(text),
            (None, None) => {
                warn!("add_effect called without a sprite name or text");
                self.show_message(INVALID_EFFECT_MESSAGE);
                return None;
            }
        };

        let target = match (request.target_character, request.target_position) {
            (Some(character), _) => character.position,
            (None, Some(position)) => position,
            (None, None) => {
                warn!("add_effect called without a target");
                self.show_message(INVALID_TARGET_MESSAGE);
                return None;
            }
        };

        let (kind, visual) = match source {
            EffectSource::Sprite(name) => match self.assets.sprite(name) {
                Some(visual) => (EffectKind::Sprite, visual),
                None => {
                    warn!("add_effect: no sprite named '{}'", name);
                    self.show_message(&format!("Invalid effect: unknown sprite '{}'.", name));
                    return None;
                }
            },
            EffectSource::Text(text) => (
                EffectKind::Text,
                Visual::text(text, EFFECT_TEXT_COLOR, EFFECT_TEXT_SCALE),
            ),
        };

        let styles = request
            .styles
            .unwrap_or_else(|| vec![EffectStyle::default_highlight()]);
        let start = self.grid_to_pixel(target);
        let effect = Effect::spawn(&mut self.scene, kind, visual, start, styles);
        let id = effect.visual();

        debug!(
            "{} effect at ({}, {}) with {} style(s)",
            kind.as_str(),
            target.x,
            target.y,
            effect.styles().len()
        );
        self.effects.push(effect);
        Some(id)
    }

    /// Places a non-interactive sprite on a cell
    ///
    /// Unknown asset names are skipped with a warning.
    pub fn add_texture(&mut self, name: &str, position: GridPos) -> Option<VisualId> {
        let Some(visual) = self.assets.sprite(name) else {
            warn!("add_texture: no sprite named '{}', skipping", name);
            return None;
        };

        let visual = visual.at(self.grid_to_pixel(position));
        Some(self.scene.add_sprite(visual, TEXTURE_LAYER))
    }

    /// Places every scenario decoration; returns how many were placed
    pub fn draw_textures(&mut self, textures: &[PlacedTexture]) -> usize {
        let placed = textures
            .iter()
            .filter(|t| self.add_texture(&t.name, GridPos::new(t.x, t.y)).is_some())
            .count();

        info!("Placed {} of {} textures", placed, textures.len());
        placed
    }

    /// Draws every terrain cell on the background layer
    ///
    /// Kind 0 uses the first catalog sprite, anything else the second.
    /// Returns how many cells were drawn.
    pub fn draw_terrain(&mut self, terrain: &[TerrainCell]) -> usize {
        let mut drawn = 0;
        for cell in terrain {
            let index = if cell.kind == 0 { 0 } else { 1 };
            let Some(visual) = self
                .assets
                .by_index(index)
                .and_then(|id| self.assets.visual(id))
            else {
                warn!("No terrain sprite at catalog index {}", index);
                continue;
            };

            let visual = visual.at(self.grid_to_pixel(GridPos::new(cell.x, cell.y)));
            self.scene.add_sprite(visual, TERRAIN_LAYER);
            drawn += 1;
        }

        info!("Drew {} terrain cells", drawn);
        drawn
    }

    /// Draws each character's sprite and records it on the character
    ///
    /// Characters whose name has no sprite are skipped (logged, nothing on
    /// screen); the rest still draw. Returns how many were drawn.
    pub fn draw_characters(&mut self, characters: &mut [Character]) -> usize {
        let mut drawn = 0;
        for character in characters.iter_mut() {
            let Some(visual) = self.assets.sprite(&character.name) else {
                warn!("No sprite for character '{}', skipping", character.name);
                continue;
            };

            let visual = visual
                .at(self.grid_to_pixel(character.position))
                .interactive(Interaction::Character(character.id));
            character.visual = Some(self.scene.add_sprite(visual, CHARACTER_LAYER));
            drawn += 1;
        }

        info!("Drew {} of {} characters", drawn, characters.len());
        drawn
    }

    /// Builds the control panel and both cursors
    ///
    /// Labels, buttons and cursors start hidden; `update_ui` reveals what
    /// applies to the current selection.
    pub fn draw_ui(&mut self) -> Result<(), ClientError> {
        let cursor = self
            .assets
            .sprite(CURSOR_ASSET)
            .ok_or_else(|| ClientError::MissingAsset(CURSOR_ASSET.to_string()))?;

        let layout = self.layout.clone();
        let label = |world: &mut Self, at: (f32, f32)| {
            let visual = Visual::text("", layout.label_color, layout.label_scale).at(point(at));
            world.scene.add_sprite(hidden(visual), UI_LAYER)
        };

        let name = label(self, layout.name_label);
        let description = label(self, layout.description_label);
        let ap = label(self, layout.ap_label);

        let move_pad = self.draw_pad(layout.move_pad, "", UiAction::Move);
        let attack_pad = self.draw_pad(layout.attack_pad, "ATK ", UiAction::Attack);

        let end_turn = self.scene.add_sprite(
            hidden(
                Visual::text("END TURN", layout.end_turn_color, layout.button_scale)
                    .at(point(layout.end_turn))
                    .interactive(Interaction::Action(UiAction::EndTurn)),
            ),
            UI_LAYER,
        );

        let mut selected = hidden(cursor.clone());
        selected.tint = Some(SELECTED_TINT);
        selected.alpha = CURSOR_ALPHA;
        let selected = self.scene.add_sprite(selected, UI_LAYER);

        let mut selector = hidden(cursor);
        selector.alpha = CURSOR_ALPHA;
        let selector = self.scene.add_sprite(selector, UI_LAYER);

        self.ui = Some(UiContainer {
            name,
            description,
            ap,
            move_pad,
            attack_pad,
            end_turn,
            selected,
            selector,
        });
        info!("UI panel drawn");
        Ok(())
    }

    fn draw_pad(
        &mut self,
        centre: (f32, f32),
        prefix: &str,
        action: fn(Direction) -> UiAction,
    ) -> DirectionalPad {
        let mut button = |direction: Direction| {
            let visual = Visual::text(
                format!("{}{}", prefix, direction.name()),
                self.layout.button_color,
                self.layout.button_scale,
            )
            .at(self.layout.pad_button(centre, direction))
            .interactive(Interaction::Action(action(direction)));
            self.scene.add_sprite(hidden(visual), UI_LAYER)
        };

        DirectionalPad {
            up: button(Direction::Up),
            left: button(Direction::Left),
            right: button(Direction::Right),
            down: button(Direction::Down),
        }
    }

    /// Refreshes the panel for `character` (or for no selection)
    ///
    /// Info labels show only while a character is given. The end-turn
    /// button tracks whether it is the viewer's turn. When `character` is
    /// the selected one, its stats fill the labels, the command buttons
    /// appear if the viewer owns it, and the "selected" cursor moves onto
    /// its sprite.
    pub fn update_ui(
        &mut self,
        character: Option<&Character>,
        game: &GameState,
    ) -> Result<(), ClientError> {
        let ui = self.ui.ok_or(ClientError::UiNotDrawn)?;

        for id in ui.labels() {
            self.set_visible(id, character.is_some());
        }

        if let Some(current) = game.current_player {
            self.set_visible(ui.end_turn, current == game.viewer);
        }

        let Some(character) = character else {
            return Ok(());
        };
        if game.selected_character != Some(character.id) {
            return Ok(());
        }

        self.set_text(ui.name, &character.name);
        self.set_text(ui.description, &character.description);
        self.set_text(
            ui.ap,
            &format!(
                "{} / {}",
                character.stats.current_action_points, character.stats.fresh_action_points
            ),
        );

        let owned = game.is_owned_by_viewer(character);
        for id in ui.command_buttons() {
            self.set_visible(id, owned);
        }

        let sprite_position = character
            .visual
            .and_then(|id| self.scene.get(id))
            .map(|visual| visual.position);
        if let Some(cursor) = self.scene.get_mut(ui.selected) {
            match sprite_position {
                Some(position) => {
                    cursor.position = position;
                    cursor.visible = true;
                }
                None => cursor.visible = false,
            }
        }
        Ok(())
    }

    /// Moves a drawn visual onto a grid cell
    pub fn move_visual(&mut self, id: VisualId, position: GridPos) {
        let target = self.grid_to_pixel(position);
        if let Some(visual) = self.scene.get_mut(id) {
            visual.position = target;
        }
    }

    /// Routes pointer input to hover feedback and widget presses
    ///
    /// Moving over a character shows the selector cursor on it (green for
    /// the viewer's own, red otherwise); moving off hides it. Pressing a
    /// visible button or a character returns the triggered event for the
    /// game logic to handle.
    pub fn handle_pointer(&mut self, event: PointerEvent, game: &GameState) -> Option<UiEvent> {
        match event {
            PointerEvent::Moved(position) => {
                self.update_hover(position, game);
                None
            }
            PointerEvent::Pressed(position) => {
                let (_, visual) = self.scene.hit_test(position)?;
                let action = match visual.interaction? {
                    Interaction::Action(action) => action,
                    Interaction::Character(id) => UiAction::SelectCharacter(id),
                };
                debug!("pointer press at ({}, {}) -> {:?}", position.x, position.y, action);
                Some(UiEvent { action, position })
            }
        }
    }

    fn update_hover(&mut self, position: Point, game: &GameState) {
        let hovered = self.scene.hit_test(position).and_then(|(id, visual)| {
            match visual.interaction {
                Some(Interaction::Character(character)) => Some((id, character, visual.position)),
                _ => None,
            }
        });

        let Some(ui) = self.ui else {
            self.hovered = hovered.map(|(id, _, _)| id);
            return;
        };

        match hovered {
            Some((id, character_id, sprite_position)) => {
                let friendly = game
                    .character(character_id)
                    .is_some_and(|c| game.is_owned_by_viewer(c));
                if let Some(selector) = self.scene.get_mut(ui.selector) {
                    selector.position = sprite_position;
                    selector.visible = true;
                    selector.tint = Some(if friendly {
                        FRIENDLY_HOVER_TINT
                    } else {
                        HOSTILE_HOVER_TINT
                    });
                }
                self.hovered = Some(id);
            }
            None => {
                if self.hovered.take().is_some() {
                    self.set_visible(ui.selector, false);
                }
            }
        }
    }

    fn set_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(visual) = self.scene.get_mut(id) {
            visual.visible = visible;
        }
    }

    fn set_text(&mut self, id: VisualId, text: &str) {
        if let Some(visual) = self.scene.get_mut(id) {
            visual.set_text(text);
        }
    }
}

fn hidden(mut visual: Visual) -> Visual {
    visual.visible = false;
    visual
}

#[cfg(test)]
impl RenderWorld {
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn effects(&self) -> &EffectList {
        &self.effects
    }

    pub fn ui(&self) -> Option<&UiContainer> {
        self.ui.as_ref()
    }
}
