use crate::decoder::NodeDecoder;
use crate::error::IResult;
use crate::models::NodeKind;
use crate::vector::{Vector2, Vector3};

/// Engine exhaust glow. Colours are packed RGBA.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineGlow<V3> {
    pub inner_color: u32,
    pub outer_color: u32,
    pub center: V3,
    // Axis vectors of unknown use.
    pub x: V3,
    pub y: V3,
    pub z: V3,
}

impl<V3: Vector3> EngineGlow<V3> {
    pub(crate) fn decode<V2: Vector2>(decoder: &mut NodeDecoder<'_, '_, V2, V3>) -> IResult<Self> {
        decoder.read_inline_prefix(NodeKind::EngineGlow)?;
        decoder.read_unknown_use(0, NodeKind::EngineGlow)?;

        let inner_color = decoder.reader.read_u32()?;
        let outer_color = decoder.reader.read_u32()?;
        let center = decoder.vectors.read_vector3(&mut decoder.reader)?;
        // stored y, z, x
        let y = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let z = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let x = decoder.vectors.read_vector3(&mut decoder.reader)?;
        Ok(EngineGlow {
            inner_color,
            outer_color,
            center,
            x,
            y,
            z,
        })
    }
}
