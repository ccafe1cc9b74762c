//! Draws the retained [`Scene`] onto an SDL2 canvas
//!
//! The scene is already in draw order (see [`Scene::sort_by_layer`]), so
//! rendering is a single back-to-front walk (painter's algorithm). Sprites
//! use per-texture alpha and colour modulation; text goes through the
//! bitmap font.
//!
//! # Example
//!
//! ```rust
//! let textures = TextureBank::load(&texture_creator, world.assets());
//! render_scene(&mut canvas, world.scene(), &mut textures)?;
//! ```

use log::{info, warn};
use sdl2::image::LoadTexture;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};

use crate::assets::{AssetCatalog, AssetId};
use crate::scene::{rgb_channels, Scene, Visual, VisualKind};
use crate::text::draw_text;

/// Drawn in place of a sprite whose image failed to load
const MISSING_TEXTURE_COLOR: u32 = 0xff00ff;

/// Converts 0xRRGGBB plus a 0.0..=1.0 opacity into an SDL colour
pub fn to_sdl_color(color: u32, alpha: f32) -> Color {
    let (r, g, b) = rgb_channels(color);
    Color::RGBA(r, g, b, alpha_byte(alpha))
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// GPU textures for every catalog entry, indexed like the catalog
///
/// An entry whose file could not be loaded keeps a `None` slot and is
/// drawn as a flat placeholder rectangle.
pub struct TextureBank<'a> {
    textures: Vec<Option<Texture<'a>>>,
}

impl<'a> TextureBank<'a> {
    pub fn load(texture_creator: &'a TextureCreator<WindowContext>, catalog: &AssetCatalog) -> Self {
        let mut loaded = 0;
        let textures = catalog
            .entries()
            .iter()
            .map(|entry| {
                let path = catalog.resolve_path(entry);
                match texture_creator.load_texture(&path) {
                    Ok(mut texture) => {
                        texture.set_blend_mode(BlendMode::Blend);
                        loaded += 1;
                        Some(texture)
                    }
                    Err(e) => {
                        warn!("Failed to load sprite '{}' from {}: {}", entry.name, path.display(), e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        info!("Loaded {} of {} sprite textures", loaded, textures.len());
        TextureBank { textures }
    }

    fn get_mut(&mut self, id: AssetId) -> Option<&mut Texture<'a>> {
        self.textures.get_mut(id.0).and_then(Option::as_mut)
    }
}

/// Renders every visible visual in the scene's current order
pub fn render_scene(
    canvas: &mut Canvas<Window>,
    scene: &Scene,
    textures: &mut TextureBank,
) -> Result<(), String> {
    canvas.set_blend_mode(BlendMode::Blend);

    for visual in scene.drawables() {
        match &visual.kind {
            VisualKind::Sprite { asset } => render_sprite(canvas, visual, *asset, textures)?,
            VisualKind::Text {
                content,
                color,
                scale,
            } => draw_text(
                canvas,
                content,
                visual.position.x.round() as i32,
                visual.position.y.round() as i32,
                to_sdl_color(*color, visual.alpha),
                *scale,
            )?,
        }
    }

    canvas.set_blend_mode(BlendMode::None);
    Ok(())
}

fn render_sprite(
    canvas: &mut Canvas<Window>,
    visual: &Visual,
    asset: AssetId,
    textures: &mut TextureBank,
) -> Result<(), String> {
    let dest = Rect::new(
        visual.position.x.round() as i32,
        visual.position.y.round() as i32,
        visual.width,
        visual.height,
    );

    let Some(texture) = textures.get_mut(asset) else {
        canvas.set_draw_color(to_sdl_color(MISSING_TEXTURE_COLOR, visual.alpha));
        return canvas.fill_rect(dest);
    };

    let (r, g, b) = rgb_channels(visual.tint.unwrap_or(0xffffff));
    texture.set_color_mod(r, g, b);
    texture.set_alpha_mod(alpha_byte(visual.alpha));
    canvas.copy(texture, None, dest)
}
