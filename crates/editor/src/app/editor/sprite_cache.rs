use std::collections::HashMap;

use engine::RgbaImage;

use super::items::ItemKind;
use super::sprites::{PixelSprite, SpriteStore};

/// Rasterized sprites keyed by `(kind, display size)`. Purely derived from the
/// store: the whole cache is dropped as soon as the store revision moves.
#[derive(Debug, Default)]
pub(crate) struct SpriteRenderCache {
    revision: Option<u64>,
    images: HashMap<(ItemKind, u32), RgbaImage>,
}

impl SpriteRenderCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_render(
        &mut self,
        store: &SpriteStore,
        kind: ItemKind,
        size: u32,
    ) -> Option<&RgbaImage> {
        if self.revision != Some(store.revision()) {
            self.images.clear();
            self.revision = Some(store.revision());
        }
        let sprite = store.get(kind)?;
        Some(
            self.images
                .entry((kind, size))
                .or_insert_with(|| rasterize(sprite, size)),
        )
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.images.len()
    }
}

/// Scales a sprite to a `size` x `size` image. Each source cell covers the
/// span `[x * size / w, (x + 1) * size / w)`, so cells tile exactly with no
/// gaps even when `size` is not a multiple of the sprite width.
pub(crate) fn rasterize(sprite: &PixelSprite, size: u32) -> RgbaImage {
    let mut image = RgbaImage::new(size, size);
    let (width, height) = (sprite.width() as u32, sprite.height() as u32);
    if width == 0 || height == 0 || size == 0 {
        return image;
    }

    for y in 0..height {
        let top = y * size / height;
        let bottom = (y + 1) * size / height;
        for x in 0..width {
            let Some([r, g, b]) = sprite.pixel(x as usize, y as usize) else {
                continue;
            };
            let left = x * size / width;
            let right = (x + 1) * size / width;
            for py in top..bottom {
                for px in left..right {
                    image.put_pixel(px, py, image::Rgba([r, g, b, 255]));
                }
            }
        }
    }
    image
}
