use crate::decoder::{NodeDecoder, NodeHeader};
use crate::error::IResult;
use crate::models::texture::TEXTURE_NAME_WIDTH;
use crate::vector::{Vector2, Vector3};

/// Use of a texture defined elsewhere, looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureReference {
    pub texture_name: String,
}

impl TextureReference {
    pub(crate) fn decode<V2: Vector2, V3: Vector3>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
    ) -> IResult<Self> {
        decoder.reader.seek(header.data_address)?;
        let texture_name = decoder.reader.read_string(TEXTURE_NAME_WIDTH)?;
        Ok(TextureReference { texture_name })
    }
}
