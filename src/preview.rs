use anyhow::Result;
use eframe::egui;
use tracing::{debug, warn};

use crate::image_utils::{decode_image, thumbnail, to_color_image, ImageFile, PREVIEW_MAX_SIDE};

/// Allocates and releases the renderable preview of a selected file.
///
/// The picker is the only caller. It calls [`PreviewSource::release`] exactly
/// once for every handle returned by [`PreviewSource::create`]. Creating a
/// handle never fails: a file that cannot be rendered still gets a placeholder.
pub trait PreviewSource {
    type Handle;

    fn create(&mut self, file: &ImageFile) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);
}

/// Thumbnail texture of the selected file, `None` when it could not be decoded.
pub struct PreviewTexture {
    pub texture: Option<egui::TextureHandle>,
    pub size: egui::Vec2,
}

impl PreviewTexture {
    pub fn is_placeholder(&self) -> bool {
        self.texture.is_none()
    }
}

/// Uploads a thumbnail of the selected file as an egui texture.
pub struct TexturePreviews {
    ctx: egui::Context,
    max_side: u32,
}

impl TexturePreviews {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            max_side: PREVIEW_MAX_SIDE,
        }
    }

    fn load(&self, file: &ImageFile) -> Result<PreviewTexture> {
        let image = decode_image(file)?;
        let small = thumbnail(&image, self.max_side)?;
        let size = egui::vec2(small.width() as f32, small.height() as f32);
        let texture = self.ctx.load_texture(
            format!("leafscan-preview-{}", file.name),
            to_color_image(&small),
            egui::TextureOptions::LINEAR,
        );
        debug!(name = %file.name, id = ?texture.id(), "preview texture allocated");
        Ok(PreviewTexture {
            texture: Some(texture),
            size,
        })
    }
}

impl PreviewSource for TexturePreviews {
    type Handle = PreviewTexture;

    fn create(&mut self, file: &ImageFile) -> PreviewTexture {
        self.load(file).unwrap_or_else(|err| {
            warn!(name = %file.name, "no preview available: {err:#}");
            let side = self.max_side as f32;
            PreviewTexture {
                texture: None,
                size: egui::vec2(side, side),
            }
        })
    }

    fn release(&mut self, handle: PreviewTexture) {
        if let Some(texture) = &handle.texture {
            debug!(id = ?texture.id(), "preview texture released");
        }
        // The texture is freed once its last handle is dropped
        drop(handle);
    }
}
