//! Transient animated visuals (projectiles, hit flashes, damage numbers)
//!
//! An effect is a sprite or text visual with a finite lifespan and a list of
//! [`EffectStyle`] segments. Each segment animates one thing, optionally
//! after a delay: motion (velocity + acceleration) and/or colour. Segments
//! run independently and drop off the effect when their own lifespan ends.
//!
//! # Example
//!
//! ```rust
//! // Damage number that waits 10 frames, then rises and fades to white
//! let rise = EffectStyle::new()
//!     .with_delay(10.0)
//!     .with_velocity(0.0, -1.0)
//!     .with_color_fade(0xee0000, 0xffffff)
//!     .with_lifespan(60.0);
//! ```

use log::debug;

use crate::scene::{fade_opacity, rgb_channels, Point, Scene, Visual, VisualId};

/// Frames an effect lives unless a caller says otherwise
pub const EFFECT_LIFESPAN: f32 = 180.0;
pub const EFFECT_LAYER: i32 = 50;
/// Colour of the fallback style attached when a caller supplies none
pub const DEFAULT_EFFECT_COLOR: u32 = 0xee0000;

/// One animation segment of an effect
///
/// Every dimension is optional; an absent one is simply not animated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectStyle {
    velocity: Option<Point>,
    acceleration: Option<Point>,
    delay: Option<f32>,
    lifespan: Option<f32>,
    color_start: Option<u32>,
    color_end: Option<u32>,
    /// Frames this segment has spent animating (after its delay)
    active_frames: f32,
}

impl EffectStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment attached when an effect is created without styles:
    /// no motion, full effect lifespan, warning red
    pub fn default_highlight() -> Self {
        EffectStyle::new()
            .with_lifespan(EFFECT_LIFESPAN)
            .with_color(DEFAULT_EFFECT_COLOR)
    }

    /// Pixels per frame added to the position once active
    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Some(Point::new(x, y));
        self
    }

    /// Pixels per frame added to the velocity once active
    pub fn with_acceleration(mut self, x: f32, y: f32) -> Self {
        self.acceleration = Some(Point::new(x, y));
        self
    }

    /// Frames to wait before animating
    pub fn with_delay(mut self, frames: f32) -> Self {
        self.delay = Some(frames);
        self
    }

    /// Frames to animate before the segment is dropped
    ///
    /// Without a lifespan the segment lasts as long as its effect.
    pub fn with_lifespan(mut self, frames: f32) -> Self {
        self.lifespan = Some(frames);
        self
    }

    /// Recolour to a fixed colour every active frame
    pub fn with_color(mut self, color: u32) -> Self {
        self.color_start = Some(color);
        self
    }

    /// Blend from `start` to `end` over the segment's lifespan
    pub fn with_color_fade(mut self, start: u32, end: u32) -> Self {
        self.color_start = Some(start);
        self.color_end = Some(end);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.lifespan.is_some_and(|frames| frames <= 0.0)
    }

    /// Colour for the current frame, if this segment recolours at all
    fn current_color(&self) -> Option<u32> {
        let start = self.color_start?;
        let (Some(end), Some(remaining)) = (self.color_end, self.lifespan) else {
            return Some(start);
        };

        let total = self.active_frames + remaining.max(0.0);
        let progress = if total > 0.0 {
            (self.active_frames / total).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(blend(start, end, progress))
    }

    /// Runs one frame of this segment against the effect's visual
    ///
    /// While a delay is pending the frame only counts the delay down.
    /// `visual` is `None` once the owning effect has left the scene; the
    /// segment still ages in that case.
    fn advance(&mut self, visual: Option<&mut Visual>, kind: EffectKind, delta: f32) {
        if let Some(delay) = self.delay.as_mut() {
            if *delay > 0.0 {
                *delay -= delta;
                return;
            }
        }

        if let Some(acceleration) = self.acceleration {
            let velocity = self.velocity.get_or_insert_with(Point::default);
            velocity.x += acceleration.x;
            velocity.y += acceleration.y;
        }

        let color = self.current_color();
        if let Some(visual) = visual {
            if let Some(velocity) = self.velocity {
                visual.position.x += velocity.x;
                visual.position.y += velocity.y;
            }
            if let Some(color) = color {
                kind.recolor(visual, color);
            }
        }

        if let Some(lifespan) = self.lifespan.as_mut() {
            *lifespan -= delta;
        }
        self.active_frames += delta;
    }
}

fn blend(start: u32, end: u32, progress: f32) -> u32 {
    let (sr, sg, sb) = rgb_channels(start);
    let (er, eg, eb) = rgb_channels(end);
    let mix = |from: u8, to: u8| -> u32 {
        (from as f32 + (to as f32 - from as f32) * progress).round() as u32
    };
    (mix(sr, er) << 16) | (mix(sg, eg) << 8) | mix(sb, eb)
}

/// What an effect draws, which decides how it is recoloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Catalog sprite, recoloured by tint
    Sprite,
    /// Bitmap text, recoloured by rebuilding its fill colour
    Text,
}

impl EffectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Sprite => "effect",
            EffectKind::Text => "text",
        }
    }

    fn recolor(&self, visual: &mut Visual, color: u32) {
        match self {
            EffectKind::Sprite => visual.tint = Some(color),
            EffectKind::Text => visual.set_text_color(color),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Effect {
    kind: EffectKind,
    visual: VisualId,
    lifespan: f32,
    styles: Vec<EffectStyle>,
    start_position: Point,
}

impl Effect {
    /// Places `visual` at `start_position` on the effect layer and wraps it
    pub fn spawn(
        scene: &mut Scene,
        kind: EffectKind,
        visual: Visual,
        start_position: Point,
        styles: Vec<EffectStyle>,
    ) -> Self {
        let visual = scene.add_sprite(visual.at(start_position), EFFECT_LAYER);
        Effect {
            kind,
            visual,
            lifespan: EFFECT_LIFESPAN,
            styles,
            start_position,
        }
    }

    pub fn visual(&self) -> VisualId {
        self.visual
    }

    pub fn styles(&self) -> &[EffectStyle] {
        &self.styles
    }
}

/// Live effects, in creation order
#[derive(Debug, Default)]
pub struct EffectList {
    effects: Vec<Effect>,
}

impl EffectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Ages every effect and its style segments by `delta` frames
    ///
    /// An effect whose lifespan drops below zero leaves the scene, but its
    /// segments still run this frame before the effect is dropped.
    pub fn tick(&mut self, scene: &mut Scene, delta: f32) {
        let mut i = 0;
        while i < self.effects.len() {
            let effect = &mut self.effects[i];
            effect.lifespan -= delta;
            if let Some(visual) = scene.get_mut(effect.visual) {
                visual.alpha = fade_opacity(effect.lifespan);
            }

            let expired = effect.lifespan < 0.0;
            if expired {
                scene.remove(effect.visual);
            }

            let (kind, visual_id) = (effect.kind, effect.visual);
            for style in effect.styles.iter_mut() {
                style.advance(scene.get_mut(visual_id), kind, delta);
            }
            effect.styles.retain(|style| !style.is_expired());

            if expired {
                let done = self.effects.remove(i);
                debug!(
                    "{} effect from ({}, {}) expired",
                    done.kind.as_str(),
                    done.start_position.x,
                    done.start_position.y
                );
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
impl EffectStyle {
    pub fn velocity(&self) -> Option<Point> {
        self.velocity
    }
}

#[cfg(test)]
impl Effect {
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn lifespan(&self) -> f32 {
        self.lifespan
    }

    pub fn start_position(&self) -> Point {
        self.start_position
    }
}

#[cfg(test)]
impl EffectList {
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetId;

    fn spawn_sprite(scene: &mut Scene, styles: Vec<EffectStyle>) -> Effect {
        Effect::spawn(
            scene,
            EffectKind::Sprite,
            Visual::sprite(AssetId(0), 32, 32),
            Point::new(64.0, 96.0),
            styles,
        )
    }

    fn tick_n(list: &mut EffectList, scene: &mut Scene, frames: usize) {
        for _ in 0..frames {
            list.tick(scene, 1.0);
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(EffectKind::Sprite.as_str(), "effect");
        assert_eq!(EffectKind::Text.as_str(), "text");
    }

    #[test]
    fn test_spawn_positions_on_effect_layer() {
        let mut scene = Scene::new();
        let effect = spawn_sprite(&mut scene, vec![]);

        let visual = scene.get(effect.visual()).unwrap();
        assert_eq!(visual.position, Point::new(64.0, 96.0));
        assert_eq!(scene.entry(effect.visual()).unwrap().layer_id, EFFECT_LAYER);
        assert_eq!(effect.lifespan(), EFFECT_LIFESPAN);
    }

    #[test]
    fn test_style_removed_after_delay_plus_lifespan() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = spawn_sprite(
            &mut scene,
            vec![EffectStyle::new()
                .with_delay(3.0)
                .with_lifespan(5.0)
                .with_velocity(1.0, 0.0)],
        );
        let visual = effect.visual();
        list.push(effect);

        tick_n(&mut list, &mut scene, 3);
        assert_eq!(scene.get(visual).unwrap().position.x, 64.0, "still delayed");
        assert_eq!(list.iter().next().unwrap().styles().len(), 1);

        tick_n(&mut list, &mut scene, 4);
        assert_eq!(scene.get(visual).unwrap().position.x, 68.0);
        assert_eq!(list.iter().next().unwrap().styles().len(), 1);

        tick_n(&mut list, &mut scene, 1);
        assert_eq!(scene.get(visual).unwrap().position.x, 69.0);
        assert!(list.iter().next().unwrap().styles().is_empty());

        tick_n(&mut list, &mut scene, 5);
        assert_eq!(scene.get(visual).unwrap().position.x, 69.0);
    }

    #[test]
    fn test_acceleration_builds_velocity() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = spawn_sprite(
            &mut scene,
            vec![EffectStyle::new()
                .with_acceleration(0.0, 1.0)
                .with_lifespan(10.0)],
        );
        let visual = effect.visual();
        list.push(effect);

        tick_n(&mut list, &mut scene, 3);

        // velocity 1, 2, 3 applied in turn
        assert_eq!(scene.get(visual).unwrap().position.y, 96.0 + 6.0);
        let style = &list.iter().next().unwrap().styles()[0];
        assert_eq!(style.velocity(), Some(Point::new(0.0, 3.0)));
    }

    #[test]
    fn test_sprite_tint_waits_for_delay() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = spawn_sprite(
            &mut scene,
            vec![EffectStyle::new()
                .with_delay(2.0)
                .with_lifespan(10.0)
                .with_color(0x00ff00)],
        );
        let visual = effect.visual();
        list.push(effect);

        tick_n(&mut list, &mut scene, 2);
        assert_eq!(scene.get(visual).unwrap().tint, None);

        tick_n(&mut list, &mut scene, 1);
        assert_eq!(scene.get(visual).unwrap().tint, Some(0x00ff00));
    }

    #[test]
    fn test_text_effect_recolors_fill() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = Effect::spawn(
            &mut scene,
            EffectKind::Text,
            Visual::text("-3", 0xffffff, 2),
            Point::new(0.0, 0.0),
            vec![EffectStyle::default_highlight()],
        );
        let visual = effect.visual();
        list.push(effect);

        list.tick(&mut scene, 1.0);

        let visual = scene.get(visual).unwrap();
        assert_eq!(visual.text_color(), Some(DEFAULT_EFFECT_COLOR));
        assert_eq!(visual.tint, None);
    }

    #[test]
    fn test_color_fade_blends_toward_end() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = spawn_sprite(
            &mut scene,
            vec![EffectStyle::new()
                .with_lifespan(4.0)
                .with_color_fade(0x000000, 0x0000ff)],
        );
        let visual = effect.visual();
        list.push(effect);

        list.tick(&mut scene, 1.0);
        assert_eq!(scene.get(visual).unwrap().tint, Some(0x000000));

        list.tick(&mut scene, 1.0);
        list.tick(&mut scene, 1.0);
        // 2 of 4 frames elapsed
        assert_eq!(scene.get(visual).unwrap().tint, Some(0x000080));
    }

    #[test]
    fn test_effect_expires_below_zero() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        let effect = spawn_sprite(&mut scene, vec![EffectStyle::default_highlight()]);
        let visual = effect.visual();
        list.push(effect);

        list.tick(&mut scene, EFFECT_LIFESPAN - 30.0);
        assert_eq!(scene.get(visual).unwrap().alpha, 0.5);

        list.tick(&mut scene, 30.0);
        assert_eq!(list.len(), 1, "lifespan 0 is not yet expired");
        assert_eq!(scene.get(visual).unwrap().alpha, 0.0);

        list.tick(&mut scene, 1.0);
        assert!(list.is_empty());
        assert!(!scene.contains(visual));
    }

    #[test]
    fn test_segment_without_lifespan_lives_with_effect() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        list.push(spawn_sprite(
            &mut scene,
            vec![EffectStyle::new().with_velocity(1.0, 1.0)],
        ));

        tick_n(&mut list, &mut scene, 100);

        assert_eq!(list.iter().next().unwrap().styles().len(), 1);
    }

    #[test]
    fn test_later_effects_age_when_earlier_one_expires() {
        let mut scene = Scene::new();
        let mut list = EffectList::new();
        list.push(spawn_sprite(&mut scene, vec![]));
        list.tick(&mut scene, 100.0);
        list.push(spawn_sprite(&mut scene, vec![]));

        list.tick(&mut scene, 81.0);

        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().lifespan(), EFFECT_LIFESPAN - 81.0);
    }
}
