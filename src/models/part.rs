use crate::decoder::NodeDecoder;
use crate::error::IResult;
use crate::models::NodeKind;
use crate::models::types::RecognizedPart;
use crate::vector::{Vector2, Vector3};

/// Targeting and damage metadata for one part of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartDescriptor<V3> {
    pub part_type: RecognizedPart,
    /// Observed values look like a bitmask. 2, 3, 6 and 10 break the part
    /// off when destroyed.
    pub explosion_type: i32,
    pub hitbox_span: V3,
    /// Where the part is targeted from.
    pub hitbox_center: V3,
    pub hitbox_lower_corner: V3,
    pub hitbox_upper_corner: V3,
    /// Parts sharing a target group, target point and part type are one
    /// target.
    pub target_group_id: i32,
    pub target_point: V3,
}

impl<V3: Vector3> PartDescriptor<V3> {
    pub(crate) fn decode<V2: Vector2>(decoder: &mut NodeDecoder<'_, '_, V2, V3>) -> IResult<Self> {
        decoder.read_inline_prefix(NodeKind::PartDescriptor)?;

        let part_type = RecognizedPart::from_raw(decoder.reader.read_u32()?);
        let explosion_type = decoder.reader.read_i32()?;
        let hitbox_span = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let hitbox_center = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let hitbox_lower_corner = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let hitbox_upper_corner = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let target_group_id = decoder.reader.read_i32()?;
        let target_point = decoder.vectors.read_vector3(&mut decoder.reader)?;

        Ok(PartDescriptor {
            part_type,
            explosion_type,
            hitbox_span,
            hitbox_center,
            hitbox_lower_corner,
            hitbox_upper_corner,
            target_group_id,
            target_point,
        })
    }
}
