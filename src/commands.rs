//! What pressed widgets do to the game
//!
//! [`RenderWorld::handle_pointer`] only reports which widget fired. The
//! frame loop passes that to [`dispatch`], which forwards it to a
//! [`GameCommands`] implementation. A networked client would send these
//! to its session; [`LocalCommands`] applies them to the local state so
//! the client is playable on its own.

use log::{debug, info};

use crate::effects::EffectStyle;
use crate::error::ClientError;
use crate::game_state::{CharacterId, GameState};
use crate::ui::{Direction, UiAction, UiEvent};
use crate::world::{EffectRequest, RenderWorld};

pub const NOT_YOUR_TURN_MESSAGE: &str = "Not your turn.";
pub const NO_SELECTION_MESSAGE: &str = "No character selected.";
pub const NO_ACTION_POINTS_MESSAGE: &str = "Not enough action points.";
pub const BLOCKED_MESSAGE: &str = "Can't move there.";
pub const NO_TARGET_MESSAGE: &str = "No target there.";
pub const TURN_ENDED_MESSAGE: &str = "Turn ended.";
/// Sprite flashed on the target of an attack
pub const SLASH_ASSET: &str = "slash";

/// Handlers for each kind of widget press
pub trait GameCommands {
    fn select_character(
        &mut self,
        event: &UiEvent,
        character: CharacterId,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError>;

    fn move_button(
        &mut self,
        event: &UiEvent,
        direction: Direction,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError>;

    fn attack_button(
        &mut self,
        event: &UiEvent,
        direction: Direction,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError>;

    fn end_turn(
        &mut self,
        event: &UiEvent,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError>;
}

/// Routes a UI event to the matching handler
pub fn dispatch(
    commands: &mut impl GameCommands,
    event: UiEvent,
    world: &mut RenderWorld,
    game: &mut GameState,
) -> Result<(), ClientError> {
    debug!(
        "dispatching {:?} from ({}, {})",
        event.action, event.position.x, event.position.y
    );
    match event.action {
        UiAction::SelectCharacter(id) => commands.select_character(&event, id, world, game),
        UiAction::Move(direction) => commands.move_button(&event, direction, world, game),
        UiAction::Attack(direction) => commands.attack_button(&event, direction, world, game),
        UiAction::EndTurn => commands.end_turn(&event, world, game),
    }
}

/// Applies commands directly to the local game state
#[derive(Debug, Default)]
pub struct LocalCommands;

/// Floating "-1": waits for the slash, then speeds upward and whitens
fn damage_text_style() -> EffectStyle {
    EffectStyle::new()
        .with_delay(10.0)
        .with_velocity(0.0, -0.5)
        .with_acceleration(0.0, -0.02)
        .with_lifespan(60.0)
        .with_color_fade(0xee0000, 0xffffff)
}

impl LocalCommands {
    /// Selected character if it may act now, else shows why not
    fn acting_character(world: &mut RenderWorld, game: &GameState) -> Option<CharacterId> {
        if !game.is_viewer_turn() {
            world.show_message(NOT_YOUR_TURN_MESSAGE);
            return None;
        }

        let Some(character) = game.selected().filter(|c| game.is_owned_by_viewer(c)) else {
            world.show_message(NO_SELECTION_MESSAGE);
            return None;
        };

        if character.stats.current_action_points == 0 {
            world.show_message(NO_ACTION_POINTS_MESSAGE);
            return None;
        }
        Some(character.id)
    }

    fn spend_action_point(game: &mut GameState, id: CharacterId) {
        if let Some(character) = game.character_mut(id) {
            character.stats.current_action_points =
                character.stats.current_action_points.saturating_sub(1);
        }
    }
}

impl GameCommands for LocalCommands {
    fn select_character(
        &mut self,
        _event: &UiEvent,
        character: CharacterId,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError> {
        game.selected_character = Some(character);
        world.update_ui(game.selected(), game)
    }

    fn move_button(
        &mut self,
        _event: &UiEvent,
        direction: Direction,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError> {
        let Some(id) = Self::acting_character(world, game) else {
            return Ok(());
        };
        let Some(from) = game.character(id).map(|c| c.position) else {
            return Ok(());
        };

        let target = from.step(direction);
        if !game.in_bounds(target) || game.character_at(target).is_some() {
            world.show_message(BLOCKED_MESSAGE);
            return Ok(());
        }

        Self::spend_action_point(game, id);
        if let Some(character) = game.character_mut(id) {
            character.position = target;
            if let Some(visual) = character.visual {
                world.move_visual(visual, target);
            }
            info!("{} moved to ({}, {})", character.name, target.x, target.y);
        }
        world.update_ui(game.selected(), game)
    }

    fn attack_button(
        &mut self,
        _event: &UiEvent,
        direction: Direction,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError> {
        let Some(id) = Self::acting_character(world, game) else {
            return Ok(());
        };
        let Some(from) = game.character(id).map(|c| c.position) else {
            return Ok(());
        };

        let Some(target) = game.character_at(from.step(direction)) else {
            world.show_message(NO_TARGET_MESSAGE);
            return Ok(());
        };

        info!("attack on {}", target.name);
        world.add_effect(EffectRequest {
            name: Some(SLASH_ASSET),
            target_character: Some(target),
            ..Default::default()
        });
        world.add_effect(EffectRequest {
            text: Some("-1"),
            target_character: Some(target),
            styles: Some(vec![damage_text_style()]),
            ..Default::default()
        });

        Self::spend_action_point(game, id);
        world.update_ui(game.selected(), game)
    }

    fn end_turn(
        &mut self,
        _event: &UiEvent,
        world: &mut RenderWorld,
        game: &mut GameState,
    ) -> Result<(), ClientError> {
        if !game.is_viewer_turn() {
            world.show_message(NOT_YOUR_TURN_MESSAGE);
            return Ok(());
        }

        let viewer = game.viewer;
        for character in game.characters.iter_mut().filter(|c| c.owner == viewer) {
            character.stats.current_action_points = character.stats.fresh_action_points;
        }

        info!("turn ended");
        world.show_message(TURN_ENDED_MESSAGE);
        world.update_ui(game.selected(), game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetCatalog, AssetEntry};
    use crate::effects::EffectKind;
    use crate::game_state::{Character, GridPos, PlayerId, Stats, TerrainCell};
    use crate::scene::Point;
    use crate::ui::{UiLayout, CURSOR_ASSET};
    use crate::world::DEFAULT_TILE_SIZE;

    const VIEWER: PlayerId = PlayerId(1);

    fn character(id: u32, name: &str, owner: PlayerId, x: i32, ap: u32) -> Character {
        Character {
            id: CharacterId(id),
            name: name.to_string(),
            description: String::new(),
            position: GridPos::new(x, 0),
            owner,
            stats: Stats {
                current_action_points: ap,
                fresh_action_points: 4,
            },
            visual: None,
        }
    }

    /// Three-cell strip: Knight (viewer) at x=0, Goblin (rival) at x=2
    fn setup() -> (RenderWorld, GameState) {
        let mut game = GameState {
            terrain: (0..3).map(|x| TerrainCell { kind: 0, x, y: 0 }).collect(),
            textures: vec![],
            characters: vec![
                character(1, "Knight", VIEWER, 0, 2),
                character(2, "Goblin", PlayerId(2), 2, 4),
            ],
            current_player: Some(VIEWER),
            selected_character: None,
            viewer: VIEWER,
        };

        let catalog = AssetCatalog::new(vec![
            AssetEntry::new("grass", "grass.png"),
            AssetEntry::new("water", "water.png"),
            AssetEntry::new(CURSOR_ASSET, "selector.png"),
            AssetEntry::new("Knight", "knight.png"),
            AssetEntry::new("Goblin", "goblin.png"),
            AssetEntry::new(SLASH_ASSET, "slash.png"),
        ]);
        let mut world = RenderWorld::new(catalog, UiLayout::default(), DEFAULT_TILE_SIZE);
        world.draw_terrain(&game.terrain);
        world.draw_characters(&mut game.characters);
        world.draw_ui().unwrap();
        (world, game)
    }

    fn press(action: UiAction) -> UiEvent {
        UiEvent {
            action,
            position: Point::default(),
        }
    }

    fn run(world: &mut RenderWorld, game: &mut GameState, action: UiAction) {
        dispatch(&mut LocalCommands, press(action), world, game).unwrap();
    }

    fn last_message(world: &RenderWorld) -> Option<String> {
        world.messages().iter().last().map(|m| m.text().to_string())
    }

    #[test]
    fn test_select_refreshes_panel() {
        let (mut world, mut game) = setup();

        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));

        assert_eq!(game.selected_character, Some(CharacterId(1)));
        let ui = *world.ui().unwrap();
        assert_eq!(world.scene().get(ui.ap).unwrap().text_content(), Some("2 / 4"));
    }

    #[test]
    fn test_move_updates_position_sprite_and_ap() {
        let (mut world, mut game) = setup();
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));

        run(&mut world, &mut game, UiAction::Move(Direction::Right));

        let knight = game.character(CharacterId(1)).unwrap();
        assert_eq!(knight.position, GridPos::new(1, 0));
        assert_eq!(knight.stats.current_action_points, 1);
        let sprite = world.scene().get(knight.visual.unwrap()).unwrap();
        assert_eq!(sprite.position, Point::new(32.0, 0.0));

        let ui = *world.ui().unwrap();
        assert_eq!(world.scene().get(ui.selected).unwrap().position, Point::new(32.0, 0.0));
    }

    #[test]
    fn test_move_blocked_by_edge_and_occupant() {
        let (mut world, mut game) = setup();
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));

        run(&mut world, &mut game, UiAction::Move(Direction::Up));
        assert_eq!(last_message(&world).as_deref(), Some(BLOCKED_MESSAGE));

        run(&mut world, &mut game, UiAction::Move(Direction::Right));
        run(&mut world, &mut game, UiAction::Move(Direction::Right));
        assert_eq!(last_message(&world).as_deref(), Some(BLOCKED_MESSAGE));
        assert_eq!(game.character(CharacterId(1)).unwrap().position, GridPos::new(1, 0));
    }

    #[test]
    fn test_move_without_selection() {
        let (mut world, mut game) = setup();

        run(&mut world, &mut game, UiAction::Move(Direction::Right));

        assert_eq!(last_message(&world).as_deref(), Some(NO_SELECTION_MESSAGE));
    }

    #[test]
    fn test_out_of_action_points() {
        let (mut world, mut game) = setup();
        game.character_mut(CharacterId(1)).unwrap().stats.current_action_points = 0;
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));

        run(&mut world, &mut game, UiAction::Move(Direction::Right));

        assert_eq!(last_message(&world).as_deref(), Some(NO_ACTION_POINTS_MESSAGE));
        assert_eq!(game.character(CharacterId(1)).unwrap().position, GridPos::new(0, 0));
    }

    #[test]
    fn test_attack_spawns_damage_text_on_target() {
        let (mut world, mut game) = setup();
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));
        run(&mut world, &mut game, UiAction::Move(Direction::Right));

        run(&mut world, &mut game, UiAction::Attack(Direction::Right));

        let kinds: Vec<EffectKind> = world.effects().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EffectKind::Sprite, EffectKind::Text]);
        assert!(world
            .effects()
            .iter()
            .all(|e| e.start_position() == Point::new(64.0, 0.0)));
        assert!(world.messages().is_empty());
        assert_eq!(game.character(CharacterId(1)).unwrap().stats.current_action_points, 0);
    }

    #[test]
    fn test_damage_text_waits_then_accelerates() {
        let (mut world, mut game) = setup();
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));
        run(&mut world, &mut game, UiAction::Move(Direction::Right));
        run(&mut world, &mut game, UiAction::Attack(Direction::Right));
        let text = world.effects().iter().last().unwrap().visual();

        for _ in 0..10 {
            world.tick(1.0).unwrap();
        }
        assert_eq!(world.scene().get(text).unwrap().position.y, 0.0);

        world.tick(1.0).unwrap();
        world.tick(1.0).unwrap();
        // velocity -0.52 then -0.54
        let y = world.scene().get(text).unwrap().position.y;
        assert!((y + 1.06).abs() < 1e-4, "y = {}", y);
    }

    #[test]
    fn test_attack_empty_cell() {
        let (mut world, mut game) = setup();
        run(&mut world, &mut game, UiAction::SelectCharacter(CharacterId(1)));

        run(&mut world, &mut game, UiAction::Attack(Direction::Right));

        assert!(world.effects().is_empty());
        assert_eq!(last_message(&world).as_deref(), Some(NO_TARGET_MESSAGE));
        assert_eq!(game.character(CharacterId(1)).unwrap().stats.current_action_points, 2);
    }

    #[test]
    fn test_end_turn_refills_own_action_points() {
        let (mut world, mut game) = setup();
        game.character_mut(CharacterId(2)).unwrap().stats.current_action_points = 1;

        run(&mut world, &mut game, UiAction::EndTurn);

        assert_eq!(game.character(CharacterId(1)).unwrap().stats.current_action_points, 4);
        assert_eq!(game.character(CharacterId(2)).unwrap().stats.current_action_points, 1);
        assert_eq!(last_message(&world).as_deref(), Some(TURN_ENDED_MESSAGE));
    }

    #[test]
    fn test_commands_refused_out_of_turn() {
        let (mut world, mut game) = setup();
        game.current_player = Some(PlayerId(2));

        run(&mut world, &mut game, UiAction::EndTurn);

        assert_eq!(last_message(&world).as_deref(), Some(NOT_YOUR_TURN_MESSAGE));
        assert_eq!(game.character(CharacterId(1)).unwrap().stats.current_action_points, 2);
    }
}
