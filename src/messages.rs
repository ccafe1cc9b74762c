//! Short-lived on-screen notices
//!
//! Messages stack downward from the top-left corner, one 32px row each.
//! They stay opaque until their last second, fade out, and when one expires
//! every message below it moves up a row so the stack stays gap-free.

use log::debug;

use crate::scene::{fade_opacity, Point, Scene, Visual, VisualId};

/// Frames a message stays on screen
pub const MESSAGE_LIFESPAN: f32 = 180.0;
/// Vertical distance between stacked messages
pub const MESSAGE_ROW_HEIGHT: f32 = 32.0;
/// Top-left of the first message row
pub const MESSAGE_ORIGIN: Point = Point::new(10.0, 10.0);
pub const MESSAGE_LAYER: i32 = 100;
const MESSAGE_COLOR: u32 = 0xff0000;
const MESSAGE_SCALE: u32 = 3;

#[derive(Debug, Clone)]
pub struct DisplayMessage {
    visual: VisualId,
    lifespan: f32,
    text: String,
}

/// Live messages in display order, top to bottom
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<DisplayMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `text` below every live message for [`MESSAGE_LIFESPAN`] frames
    pub fn show(&mut self, scene: &mut Scene, text: &str) -> VisualId {
        self.show_for(scene, text, MESSAGE_LIFESPAN)
    }

    /// Shows `text` below every live message for `lifespan` frames
    pub fn show_for(&mut self, scene: &mut Scene, text: &str, lifespan: f32) -> VisualId {
        let row = self.messages.len() as f32;
        let position = Point::new(
            MESSAGE_ORIGIN.x,
            MESSAGE_ORIGIN.y + MESSAGE_ROW_HEIGHT * row,
        );

        let visual = Visual::text(text, MESSAGE_COLOR, MESSAGE_SCALE).at(position);
        let id = scene.add_sprite(visual, MESSAGE_LAYER);

        debug!("message shown: {}", text);
        self.messages.push(DisplayMessage {
            visual: id,
            lifespan,
            text: text.to_string(),
        });
        id
    }

    /// Ages every message by `delta` frames
    ///
    /// Expired messages (lifespan below zero) leave the scene and the log;
    /// the ones after them shift up a row. Every surviving message is aged
    /// exactly once per call.
    pub fn tick(&mut self, scene: &mut Scene, delta: f32) {
        let mut i = 0;
        while i < self.messages.len() {
            let message = &mut self.messages[i];
            message.lifespan -= delta;
            if let Some(visual) = scene.get_mut(message.visual) {
                visual.alpha = fade_opacity(message.lifespan);
            }

            if message.lifespan < 0.0 {
                let expired = self.messages.remove(i);
                scene.remove(expired.visual);
                debug!("message expired: {}", expired.text);

                for later in &self.messages[i..] {
                    if let Some(visual) = scene.get_mut(later.visual) {
                        visual.position.y -= MESSAGE_ROW_HEIGHT;
                    }
                }
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
impl DisplayMessage {
    pub fn lifespan(&self) -> f32 {
        self.lifespan
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
impl MessageLog {
    pub fn iter(&self) -> impl Iterator<Item = &DisplayMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
