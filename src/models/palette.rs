use crate::data::OptReader;
use crate::error::IResult;

/// Palettes in a palette block. Each is a lighting level of the same colours.
pub const PALETTE_COUNT: usize = 16;
/// Colours per palette.
pub const COLOR_COUNT: usize = 256;

/// Sixteen 256-entry RGB565 palettes shared by the textures that point at
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TexturePalette {
    colors: Vec<u16>,
    present: bool,
}

impl TexturePalette {
    /// Stand-in used when the stored palette pointer can't be followed. All
    /// colours are zero.
    pub fn absent() -> Self {
        TexturePalette {
            colors: vec![0; PALETTE_COUNT * COLOR_COUNT],
            present: false,
        }
    }

    pub(crate) fn read(reader: &mut OptReader<'_>) -> IResult<Self> {
        let colors = reader.read_u16_array(PALETTE_COUNT * COLOR_COUNT)?;
        Ok(TexturePalette {
            colors,
            present: true,
        })
    }

    pub fn is_absent(&self) -> bool {
        !self.present
    }

    /// RGB565 colour `index` of palette `palette`.
    pub fn color(&self, palette: usize, index: usize) -> Option<u16> {
        if palette >= PALETTE_COUNT || index >= COLOR_COUNT {
            return None;
        }
        self.colors.get(palette * COLOR_COUNT + index).copied()
    }

    /// All colours of one palette.
    pub fn palette(&self, palette: usize) -> Option<&[u16]> {
        if palette >= PALETTE_COUNT {
            return None;
        }
        let start = palette * COLOR_COUNT;
        self.colors.get(start..start + COLOR_COUNT)
    }
}

/// Expand a 5-6-5 packed colour to 8 bits per channel.
pub fn rgb565_to_rgb888(color: u16) -> [u8; 3] {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}
