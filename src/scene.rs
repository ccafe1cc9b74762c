//! Retained scene with layer-ordered draw list
//!
//! SDL2 draws immediately, so the client keeps its own scene: every visual
//! on screen lives here together with a [`VisualEntry`] recording its layer.
//! Once per frame the child list is re-sorted by ascending layer id and the
//! renderer walks it back to front (painter's algorithm).
//!
//! # Layers
//!
//! | Layer | Contents |
//! |---|---|
//! | 0 | Terrain |
//! | 1 | Placed textures |
//! | 10 | Characters |
//! | 50 | Effects |
//! | 100 | UI widgets, cursors, messages |

use std::collections::HashMap;
use std::fmt;

use crate::assets::AssetId;
use crate::game_state::CharacterId;
use crate::text::measure_text;
use crate::ui::UiAction;

/// Lifespan (in frames) over which a fading visual goes from opaque to gone
pub const FADE_FRAMES: f32 = 60.0;

/// Opacity of a fading visual with `lifespan` frames left
///
/// Fully opaque while more than [`FADE_FRAMES`] remain, then fades linearly.
pub fn fade_opacity(lifespan: f32) -> f32 {
    (lifespan / FADE_FRAMES).clamp(0.0, 1.0)
}

/// Splits a 0xRRGGBB colour into channels
pub fn rgb_channels(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xff) as u8,
        ((color >> 8) & 0xff) as u8,
        (color & 0xff) as u8,
    )
}

/// Handle to a visual owned by the [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub(crate) u64);

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visual #{}", self.0)
    }
}

/// Screen-space position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// What a visual draws
#[derive(Debug, Clone, PartialEq)]
pub enum VisualKind {
    /// A catalog sprite, drawn with alpha and colour modulation
    Sprite { asset: AssetId },

    /// Bitmap-font text
    Text {
        content: String,
        color: u32,
        scale: u32,
    },
}

/// What happens when the pointer interacts with a visual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// A UI button that fires an action when pressed
    Action(UiAction),

    /// A character sprite: hover shows the selector, press selects
    Character(CharacterId),
}

/// An on-screen drawable object
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub kind: VisualKind,
    pub position: Point,
    pub width: u32,
    pub height: u32,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub alpha: f32,
    /// Colour modulation for sprites (0xRRGGBB)
    pub tint: Option<u32>,
    pub visible: bool,
    pub interaction: Option<Interaction>,
}

impl Visual {
    /// Creates a sprite visual at the origin
    pub fn sprite(asset: AssetId, width: u32, height: u32) -> Self {
        Visual {
            kind: VisualKind::Sprite { asset },
            position: Point::default(),
            width,
            height,
            alpha: 1.0,
            tint: None,
            visible: true,
            interaction: None,
        }
    }

    /// Creates a text visual at the origin, sized from the bitmap font
    pub fn text(content: impl Into<String>, color: u32, scale: u32) -> Self {
        let content = content.into();
        let (width, height) = measure_text(&content, scale);
        Visual {
            kind: VisualKind::Text {
                content,
                color,
                scale,
            },
            position: Point::default(),
            width,
            height,
            alpha: 1.0,
            tint: None,
            visible: true,
            interaction: None,
        }
    }

    /// Builder-style position setter
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Builder-style interaction setter
    pub fn interactive(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Replaces the content of a text visual and re-measures it
    ///
    /// No effect on sprites.
    pub fn set_text(&mut self, new_content: &str) {
        if let VisualKind::Text { content, scale, .. } = &mut self.kind {
            *content = new_content.to_string();
            let (width, height) = measure_text(new_content, *scale);
            self.width = width;
            self.height = height;
        }
    }

    /// Rebuilds the fill colour of a text visual
    ///
    /// No effect on sprites (use `tint` for those).
    pub fn set_text_color(&mut self, new_color: u32) {
        if let VisualKind::Text { color, .. } = &mut self.kind {
            *color = new_color;
        }
    }

    /// True if `point` lies inside this visual's bounding box
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.y >= self.position.y
            && point.x < self.position.x + self.width as f32
            && point.y < self.position.y + self.height as f32
    }
}

/// Registry record tying a visual to its draw layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualEntry {
    #[allow(dead_code)] // Mirrors the registry key; checked by the scene tests
    pub visual: VisualId,
    /// The higher, the closer to the screen
    pub layer_id: i32,
}

/// Scene consistency failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A child is in the draw list without a layer entry
    UnregisteredVisual(VisualId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnregisteredVisual(id) => {
                write!(f, "{} is in the scene without a layer entry", id)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Owns every on-screen visual and its draw order
#[derive(Debug, Default)]
pub struct Scene {
    visuals: HashMap<VisualId, Visual>,
    entries: HashMap<VisualId, VisualEntry>,
    children: Vec<VisualId>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a layer entry for `visual` and appends it to the draw list
    ///
    /// This is the only way into the scene, so the layer registry always
    /// covers every child.
    pub fn add_sprite(&mut self, visual: Visual, layer_id: i32) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;

        self.entries.insert(id, VisualEntry { visual: id, layer_id });
        self.visuals.insert(id, visual);
        self.children.push(id);
        id
    }

    /// Takes a visual out of the scene along with its layer entry
    pub fn remove(&mut self, id: VisualId) -> Option<Visual> {
        self.entries.remove(&id);
        self.children.retain(|child| *child != id);
        self.visuals.remove(&id)
    }

    pub fn get(&self, id: VisualId) -> Option<&Visual> {
        self.visuals.get(&id)
    }

    pub fn get_mut(&mut self, id: VisualId) -> Option<&mut Visual> {
        self.visuals.get_mut(&id)
    }

    /// Stable re-sort of the draw list by ascending layer id
    ///
    /// Fails if any child lacks a layer entry: that means something put a
    /// visual on screen without going through [`Scene::add_sprite`].
    pub fn sort_by_layer(&mut self) -> Result<(), SceneError> {
        if let Some(missing) = self
            .children
            .iter()
            .find(|id| !self.entries.contains_key(*id))
        {
            return Err(SceneError::UnregisteredVisual(*missing));
        }

        let entries = &self.entries;
        self.children
            .sort_by_key(|id| entries.get(id).map_or(i32::MAX, |entry| entry.layer_id));
        Ok(())
    }

    /// Visible visuals in draw order
    pub fn drawables(&self) -> impl Iterator<Item = &Visual> {
        self.children
            .iter()
            .filter_map(|id| self.visuals.get(id))
            .filter(|visual| visual.visible)
    }

    /// Top-most visible interactive visual under `point`
    pub fn hit_test(&self, point: Point) -> Option<(VisualId, &Visual)> {
        self.children.iter().rev().find_map(|id| {
            let visual = self.visuals.get(id)?;
            (visual.visible && visual.interaction.is_some() && visual.contains(point))
                .then_some((*id, visual))
        })
    }
}

#[cfg(test)]
impl Visual {
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            VisualKind::Text { content, .. } => Some(content),
            VisualKind::Sprite { .. } => None,
        }
    }

    pub fn text_color(&self) -> Option<u32> {
        match &self.kind {
            VisualKind::Text { color, .. } => Some(*color),
            VisualKind::Sprite { .. } => None,
        }
    }
}

#[cfg(test)]
impl Scene {
    pub fn entry(&self, id: VisualId) -> Option<&VisualEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.visuals.contains_key(&id)
    }

    /// Draw order, back to front
    pub fn children(&self) -> &[VisualId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(asset: usize) -> Visual {
        Visual::sprite(AssetId(asset), 32, 32)
    }

    fn layers(scene: &Scene) -> Vec<i32> {
        scene
            .children()
            .iter()
            .map(|id| scene.entry(*id).map(|e| e.layer_id).unwrap_or(-1))
            .collect()
    }

    #[test]
    fn test_fade_opacity() {
        assert_eq!(fade_opacity(0.0), 0.0);
        assert_eq!(fade_opacity(60.0), 1.0);
        assert_eq!(fade_opacity(120.0), 1.0);
        assert_eq!(fade_opacity(-1.0), 0.0);
        assert_eq!(fade_opacity(30.0), 0.5);
    }

    #[test]
    fn test_rgb_channels() {
        assert_eq!(rgb_channels(0x1099bb), (0x10, 0x99, 0xbb));
        assert_eq!(rgb_channels(0xee0000), (0xee, 0, 0));
    }

    #[test]
    fn test_sort_orders_by_layer_regardless_of_insertion() {
        let mut scene = Scene::new();
        let ui = scene.add_sprite(tile(2), 100);
        let character = scene.add_sprite(tile(1), 10);
        let terrain = scene.add_sprite(tile(0), 0);

        scene.sort_by_layer().unwrap();

        assert_eq!(scene.children(), &[terrain, character, ui]);
        assert_eq!(scene.entry(character).unwrap().visual, character);
    }

    #[test]
    fn test_sort_is_stable_within_a_layer() {
        let mut scene = Scene::new();
        let first = scene.add_sprite(tile(0), 10);
        let top = scene.add_sprite(tile(0), 100);
        let second = scene.add_sprite(tile(0), 10);
        let third = scene.add_sprite(tile(0), 10);

        scene.sort_by_layer().unwrap();

        assert_eq!(scene.children(), &[first, second, third, top]);
    }

    #[test]
    fn test_remove_drops_entry_and_child() {
        let mut scene = Scene::new();
        let keep = scene.add_sprite(tile(0), 0);
        let gone = scene.add_sprite(tile(0), 50);

        assert!(scene.remove(gone).is_some());
        assert!(scene.entry(gone).is_none());
        assert!(!scene.contains(gone));
        assert_eq!(scene.children(), &[keep]);
        assert!(scene.remove(gone).is_none());
    }

    #[test]
    fn test_order_after_mixed_insert_and_remove() {
        let mut scene = Scene::new();
        scene.add_sprite(tile(0), 50);
        let removed = scene.add_sprite(tile(0), 0);
        scene.add_sprite(tile(0), 100);
        scene.add_sprite(tile(0), 10);
        scene.remove(removed);
        scene.add_sprite(tile(0), 1);

        scene.sort_by_layer().unwrap();

        assert_eq!(layers(&scene), vec![1, 10, 50, 100]);
    }

    #[test]
    fn test_unregistered_child_fails_sort() {
        let mut scene = Scene::new();
        scene.add_sprite(tile(0), 0);
        scene.children.push(VisualId(999));

        assert_eq!(
            scene.sort_by_layer(),
            Err(SceneError::UnregisteredVisual(VisualId(999)))
        );
    }

    #[test]
    fn test_hit_test_prefers_top_visible_interactive() {
        let mut scene = Scene::new();
        let action = Interaction::Action(UiAction::EndTurn);

        let below = scene.add_sprite(tile(0).interactive(action), 10);
        scene.add_sprite(tile(0), 100);
        let hidden = scene.add_sprite(tile(0).interactive(action), 100);
        scene.get_mut(hidden).unwrap().visible = false;
        scene.sort_by_layer().unwrap();

        let (hit, _) = scene.hit_test(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(hit, below);
        assert!(scene.hit_test(Point::new(40.0, 5.0)).is_none());
    }

    #[test]
    fn test_text_visual_resizes() {
        let mut label = Visual::text("AP", 0xffffff, 2);
        assert_eq!((label.width, label.height), (24, 14));

        label.set_text("3 / 5");
        assert_eq!(label.text_content(), Some("3 / 5"));
        assert_eq!(label.width, 60);

        label.set_text_color(0xee0000);
        assert_eq!(label.text_color(), Some(0xee0000));
    }

    #[test]
    fn test_drawables_skip_hidden() {
        let mut scene = Scene::new();
        scene.add_sprite(tile(0), 0);
        let hidden = scene.add_sprite(tile(1), 0);
        scene.get_mut(hidden).unwrap().visible = false;

        assert_eq!(scene.drawables().count(), 1);
    }
}
