use crate::decoder::NodeDecoder;
use crate::error::IResult;
use crate::models::NodeKind;
use crate::models::types::RecognizedHardpoint;
use crate::vector::{Vector2, Vector3};

/// A mount point on the model: a weapon, a hangar, a docking point or the
/// cockpit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hardpoint<V3> {
    pub hardpoint_type: RecognizedHardpoint,
    pub location: V3,
}

impl<V3: Vector3> Hardpoint<V3> {
    pub(crate) fn decode<V2: Vector2>(decoder: &mut NodeDecoder<'_, '_, V2, V3>) -> IResult<Self> {
        decoder.read_inline_prefix(NodeKind::Hardpoint)?;

        let hardpoint_type = RecognizedHardpoint::from_raw(decoder.reader.read_u32()?);
        let location = decoder.vectors.read_vector3(&mut decoder.reader)?;
        Ok(Hardpoint {
            hardpoint_type,
            location,
        })
    }
}
