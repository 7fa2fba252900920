//! Palettized textures.
//!
//! A texture stores one byte per pixel, an index into one of the sixteen
//! palettes of a shared palette block. Smaller mip levels follow the full
//! size image when the stored total size leaves room for them.

use tracing::trace;

use crate::Rc;
use crate::decoder::NodeDecoder;
use crate::error::IResult;
use crate::models::NodeKind;
use crate::models::palette::TexturePalette;
use crate::models::types::RecognizedMinor;
use crate::vector::{Vector2, Vector3};

/// Width of a texture name field.
pub const TEXTURE_NAME_WIDTH: usize = 9;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Texture {
    pub uid: i32,
    pub minor: RecognizedMinor,
    pub width: i32,
    pub height: i32,
    /// Palette indices, full size first, then each successive mip level.
    levels: Vec<Vec<u8>>,
    palette: Rc<TexturePalette>,
}

impl Texture {
    /// Palette indices of every level, full size first.
    pub fn mip_levels(&self) -> &[Vec<u8>] {
        &self.levels
    }

    /// Number of levels including the full size image.
    pub fn mip_level_count(&self) -> usize {
        self.levels.len()
    }

    /// Palette indices of the full size image.
    pub fn pixels(&self) -> &[u8] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn palette(&self) -> &Rc<TexturePalette> {
        &self.palette
    }

    /// Full size image resolved through palette `palette`, as little-endian
    /// RGB565 pixels. `None` if the palette index is out of range.
    pub fn to_rgb565(&self, palette: usize) -> Option<Vec<u8>> {
        let colors = self.palette.palette(palette)?;
        Some(
            self.pixels()
                .iter()
                .flat_map(|&index| colors[index as usize].to_le_bytes())
                .collect(),
        )
    }
}

/// Decode a texture body. The cursor sits right after the type tag and
/// minor word.
pub(crate) fn decode<V2: Vector2, V3: Vector3>(
    decoder: &mut NodeDecoder<'_, '_, V2, V3>,
    name_offset: i32,
    minor: i32,
) -> IResult<(String, Texture)> {
    let minor = RecognizedMinor::from_raw(minor);
    if let Some(raw) = minor.unknown() {
        let position = decoder.reader.position();
        decoder.report(&format!(
            "Found unknown texture minor {raw:X} at {position:X}"
        ));
    }

    decoder.read_unknown_use(0, NodeKind::Texture)?;
    let uid = decoder.reader.read_i32()?;
    let palette_address = decoder.reader.read_i32()?;

    let name = if name_offset != 0 {
        decoder.reader.seek(name_offset)?;
        decoder.reader.read_string(TEXTURE_NAME_WIDTH)?
    } else {
        String::new()
    };
    decoder.seek_should_point_here(palette_address, NodeKind::Texture)?;

    let palette_offset = decoder.reader.read_i32()?;
    decoder.read_unknown_use(0, NodeKind::Texture)?;
    let size = decoder.reader.read_i32()?;
    let size_with_mips = decoder.reader.read_i32()?;
    let width = decoder.reader.read_i32()?;
    let height = decoder.reader.read_i32()?;

    let full_size = decoder.count(size, "texture byte");
    let mut levels = vec![decoder.reader.read_bytes(full_size)?];

    let (mut mip_width, mut mip_height) = (width as i64 / 2, height as i64 / 2);
    let mut mip_size = mip_width * mip_height;
    let mut mip_data = size_with_mips as i64 - size as i64;
    while mip_data >= mip_size && mip_size > 0 {
        levels.push(decoder.reader.read_bytes(mip_size as usize)?);
        mip_data -= mip_size;
        mip_width /= 2;
        mip_height /= 2;
        mip_size = mip_width * mip_height;
    }
    trace!(%name, width, height, levels = levels.len(), "decoded texture");

    let palette = decoder.read_palette(palette_offset);
    Ok((
        name,
        Texture {
            uid,
            minor,
            width,
            height,
            levels,
            palette,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::palette::{COLOR_COUNT, PALETTE_COUNT};
    use crate::models::{NodeKind, TextureMinor};
    use crate::test_support::{FileBuilder, decode};

    const GO: i32 = 0x100;

    /// Write a named texture. Pixel `i` has index `i`. Returns the node
    /// position and where the caller must patch the palette pointer.
    fn texture(
        file: &mut FileBuilder,
        name: &str,
        width: i32,
        height: i32,
        mip_bytes: i32,
    ) -> (usize, usize) {
        let node = file.i32(0);
        file.i32(20);
        file.i32(0);
        file.i32(0);
        file.i32(0x1234);
        let palette_address_at = file.i32(0);
        // the name sits between the header and the body
        let name_at = file.string(name, TEXTURE_NAME_WIDTH);
        file.patch_ptr(node, name_at);
        let body = file.pos();
        file.patch_ptr(palette_address_at, body);

        let palette_at = file.i32(0);
        file.i32(0);
        let size = width * height;
        file.i32(size);
        file.i32(size + mip_bytes);
        file.i32(width);
        file.i32(height);
        let pixels: Vec<u8> = (0..size).map(|i| i as u8).collect();
        file.bytes(&pixels);
        file.bytes(&vec![0xAA; mip_bytes as usize]);
        (node, palette_at)
    }

    fn palette_block(file: &mut FileBuilder) -> usize {
        let at = file.pos();
        for i in 0..(PALETTE_COUNT * COLOR_COUNT) as u16 {
            file.u16(i);
        }
        at
    }

    #[test]
    fn decodes_pixels_mips_and_palette() {
        let mut file = FileBuilder::modern(2, GO);
        let roots = file.root_table(1);
        // 4x4 + 2x2 + 1x1, with 3 spare bytes too few for another level
        let (node, palette_at) = texture(&mut file, "Tex00001", 4, 4, 4 + 1 + 3);
        let block = palette_block(&mut file);
        file.patch_ptr(palette_at, block);
        file.set_slot(roots, 0, node);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert!(messages.is_empty(), "{messages:?}");
        let (_, node) = opt.find_texture("Tex00001").unwrap();
        assert_eq!(node.name(), "Tex00001");
        let texture = node.payload().texture_ref().unwrap();
        assert_eq!(texture.uid, 0x1234);
        assert_eq!(texture.minor.known(), Some(&TextureMinor::Texture));
        assert_eq!((texture.width, texture.height), (4, 4));
        assert_eq!(texture.mip_level_count(), 3);
        assert_eq!(texture.mip_levels()[1].len(), 4);
        assert_eq!(texture.mip_levels()[2].len(), 1);
        assert_eq!(texture.pixels()[5], 5);
        assert!(!texture.palette().is_absent());

        let rgb = texture.to_rgb565(1).unwrap();
        assert_eq!(rgb.len(), 32);
        // pixel 2 of palette 1 is colour 256 + 2
        assert_eq!(u16::from_le_bytes([rgb[4], rgb[5]]), 258);
        assert!(texture.to_rgb565(16).is_none());
        assert!(texture.to_rgb565(usize::MAX / 256).is_none());
    }

    #[test]
    fn palette_is_shared_by_address() {
        let mut file = FileBuilder::modern(2, GO);
        let roots = file.root_table(2);
        let (first, first_palette) = texture(&mut file, "TexA", 2, 2, 0);
        let (second, second_palette) = texture(&mut file, "TexB", 2, 2, 0);
        let block = palette_block(&mut file);
        file.patch_ptr(first_palette, block);
        file.patch_ptr(second_palette, block);
        file.set_slot(roots, 0, first);
        file.set_slot(roots, 1, second);
        let bytes = file.finish();

        let (opt, _) = decode(&bytes);
        let palettes: Vec<_> = opt
            .textures()
            .map(|(_, texture)| Rc::clone(texture.palette()))
            .collect();
        assert_eq!(palettes.len(), 2);
        assert!(Rc::ptr_eq(&palettes[0], &palettes[1]));
    }

    #[test]
    fn palette_inside_header_is_absent() {
        let mut file = FileBuilder::modern(2, GO);
        let roots = file.root_table(1);
        let (node, palette_at) = texture(&mut file, "TexC", 2, 2, 0);
        file.patch_i32(palette_at, GO - 1);
        file.set_slot(roots, 0, node);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert!(messages[0].contains("palette"));
        let (_, texture) = opt.textures().next().unwrap();
        assert!(texture.palette().is_absent());
        assert_eq!(texture.pixels(), [0, 1, 2, 3]);
    }

    #[test]
    fn palette_past_eof_is_absent() {
        let mut file = FileBuilder::modern(2, GO);
        let roots = file.root_table(1);
        let (node, palette_at) = texture(&mut file, "TexD", 2, 2, 0);
        // only part of a palette block
        let block = file.pos();
        file.bytes(&[0; 64]);
        file.patch_ptr(palette_at, block);
        file.set_slot(roots, 0, node);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert_eq!(messages.len(), 1, "{messages:?}");
        let (_, texture) = opt.textures().next().unwrap();
        assert!(texture.palette().is_absent());
    }

    #[test]
    fn unnamed_texture_with_unknown_minor() {
        let mut file = FileBuilder::modern(2, GO);
        let roots = file.root_table(1);
        let node = file.pos();
        file.i32(20);
        file.i32(7);
        file.i32(0);
        file.i32(1);
        let palette_address_at = file.i32(0);
        let body = file.pos();
        file.patch_ptr(palette_address_at, body);
        let palette_at = file.i32(0);
        file.i32(0);
        file.i32(1);
        file.i32(1);
        file.i32(1);
        file.i32(1);
        file.bytes(&[9]);
        let block = palette_block(&mut file);
        file.patch_ptr(palette_at, block);
        file.set_slot(roots, 0, node);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert!(messages[0].contains("unknown texture minor 7"));
        let (_, node) = opt.nodes_of_kind(NodeKind::Texture).next().unwrap();
        assert_eq!(node.name(), "");
        let texture = node.payload().texture_ref().unwrap();
        assert_eq!(texture.minor.unknown(), Some(&7));
        assert_eq!(texture.mip_level_count(), 1);
    }
}
