use crate::decoder::{NodeDecoder, NodeHeader};
use crate::error::IResult;
use crate::vector::{Vector2, Vector3};

/// Pivot and rotation axes of a moving part.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationInfo<V3> {
    /// Point the part pivots around.
    pub offset: V3,
    /// Yaws clockwise around this axis, i.e. points down.
    pub yaw_axis: V3,
    /// Rolls right around this axis, i.e. points forward.
    pub roll_axis: V3,
    /// Pitches up around this axis.
    pub pitch_axis: V3,
}

impl<V3: Vector3> RotationInfo<V3> {
    pub(crate) fn decode<V2: Vector2>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
    ) -> IResult<Self> {
        decoder.reader.seek(header.data_address)?;
        let offset = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let yaw_axis = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let roll_axis = decoder.vectors.read_vector3(&mut decoder.reader)?;
        let pitch_axis = decoder.vectors.read_vector3(&mut decoder.reader)?;
        Ok(RotationInfo {
            offset,
            yaw_axis,
            roll_axis,
            pitch_axis,
        })
    }
}
