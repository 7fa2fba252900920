use crate::decoder::{NodeDecoder, NodeHeader};
use crate::error::IResult;
use crate::vector::{Vector2, Vector3};

/// A flat table of vectors that face lists index into: vertex positions,
/// vertex normals or texture coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexTable<V> {
    pub vertices: Vec<V>,
}

impl<V> VertexTable<V> {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex for an index taken from a face. Negative indices never match.
    pub fn get(&self, index: i32) -> Option<&V> {
        usize::try_from(index).ok().and_then(|i| self.vertices.get(i))
    }
}

impl<V3: Vector3> VertexTable<V3> {
    pub(crate) fn decode_vector3<V2: Vector2>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
    ) -> IResult<Self> {
        let count = decoder.count(header.data_count, "vertex");
        decoder.reader.seek(header.data_address)?;
        let vertices = decoder
            .vectors
            .read_vector3_sequence(&mut decoder.reader, count)?;
        Ok(VertexTable { vertices })
    }
}

impl<V2: Vector2> VertexTable<V2> {
    pub(crate) fn decode_vector2<V3: Vector3>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
    ) -> IResult<Self> {
        let count = decoder.count(header.data_count, "texture vertex");
        decoder.reader.seek(header.data_address)?;
        let vertices = decoder
            .vectors
            .read_vector2_sequence(&mut decoder.reader, count)?;
        Ok(VertexTable { vertices })
    }
}
