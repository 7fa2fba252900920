use itertools::Itertools;

use crate::data::parser_utils::{INDEX_TUPLE_SIZE, VECTOR3_SIZE};
use crate::decoder::{NodeDecoder, NodeHeader};
use crate::error::IResult;
use crate::vector::{Vector2, Vector3};

/// Four indices into a sibling table, one per face corner. A `-1` in the
/// last slot makes the face a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceIndices(pub [i32; 4]);

impl FaceIndices {
    pub fn is_triangle(&self) -> bool {
        self.0[3] == -1
    }

    /// Indices of the corners the face actually has.
    pub fn corners(self) -> impl Iterator<Item = usize> {
        self.0
            .into_iter()
            .take_while(|&index| index >= 0)
            .map(|index| index as usize)
    }
}

/// Texture mapping directions along a face's top edge and down its side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureBasisVectors<V3> {
    pub across_top: V3,
    pub down_side: V3,
}

/// Faces of one mesh. Every face has one entry in each list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceList<V3> {
    /// Size hint stored before the faces.
    pub face_list_size: i32,
    pub vertex_refs: Vec<FaceIndices>,
    pub edge_refs: Vec<FaceIndices>,
    pub uv_refs: Vec<FaceIndices>,
    pub normal_refs: Vec<FaceIndices>,
    pub face_normals: Vec<V3>,
    pub basis_vectors: Vec<TextureBasisVectors<V3>>,
}

impl<V3> FaceList<V3> {
    pub fn face_count(&self) -> usize {
        self.vertex_refs.len()
    }
}

impl<V3: Vector3> FaceList<V3> {
    pub(crate) fn decode<V2: Vector2>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
    ) -> IResult<Self> {
        let count = decoder.count(header.data_count, "face");
        decoder.reader.seek(header.data_address)?;
        let face_list_size = decoder.reader.read_i32()?;

        let faces = decoder.reader.read_list(count, 4 * INDEX_TUPLE_SIZE, |r| {
            Ok((
                FaceIndices(r.read_index_tuple()?),
                FaceIndices(r.read_index_tuple()?),
                FaceIndices(r.read_index_tuple()?),
                FaceIndices(r.read_index_tuple()?),
            ))
        })?;
        let (vertex_refs, edge_refs, uv_refs, normal_refs): (Vec<_>, Vec<_>, Vec<_>, Vec<_>) =
            faces.into_iter().multiunzip();

        let face_normals = decoder
            .vectors
            .read_vector3_sequence(&mut decoder.reader, count)?;
        let basis_vectors = Self::read_basis_vectors(decoder, count)?;

        Ok(FaceList {
            face_list_size,
            vertex_refs,
            edge_refs,
            uv_refs,
            normal_refs,
            face_normals,
            basis_vectors,
        })
    }

    /// Some shipped files end a few bytes into the last basis vector. The
    /// missing data reads as zero vectors and is reported once.
    fn read_basis_vectors<V2: Vector2>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        count: usize,
    ) -> IResult<Vec<TextureBasisVectors<V3>>> {
        let remaining = decoder.reader.remaining().len() / (2 * VECTOR3_SIZE);
        let mut basis_vectors = Vec::with_capacity(count.min(remaining + 1));
        let mut truncated = false;
        for face in 0..count {
            let mut read = || -> IResult<V3> {
                if truncated {
                    return Ok(V3::zero());
                }
                match decoder.vectors.read_vector3(&mut decoder.reader) {
                    Ok(v) => Ok(v),
                    Err(e) if e.is_eof() => {
                        decoder.report(&format!("Face list truncated at face {face}: {e}"));
                        truncated = true;
                        Ok(V3::zero())
                    }
                    Err(e) => Err(e),
                }
            };
            let across_top = read()?;
            let down_side = read()?;
            basis_vectors.push(TextureBasisVectors {
                across_top,
                down_side,
            });
        }
        Ok(basis_vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use crate::test_support::{FileBuilder, decode};

    /// One quad and one triangle, with `trim` bytes cut from the end.
    fn face_file(trim: usize) -> Vec<u8> {
        let mut file = FileBuilder::modern(2, 0x100);
        let roots = file.root_table(1);
        let node = file.data_node(1, 2);
        file.i32(0x40);
        for face in [[0, 1, 2, 3], [2, 3, 4, -1]] {
            for _ in 0..4 {
                for index in face {
                    file.i32(index);
                }
            }
        }
        file.vec3([0.0, 0.0, 1.0]);
        file.vec3([0.0, 1.0, 0.0]);
        file.vec3([1.0, 0.0, 0.0]);
        file.vec3([0.0, -1.0, 0.0]);
        file.vec3([1.0, 1.0, 0.0]);
        file.vec3([0.0, 0.0, -1.0]);
        file.set_slot(roots, 0, node);
        let mut bytes = file.finish();

        bytes.truncate(bytes.len() - trim);
        let body = bytes.len() as i32 - 8;
        bytes[4..8].copy_from_slice(&body.to_le_bytes());
        bytes
    }

    #[test]
    fn indices_mark_triangles() {
        let quad = FaceIndices([0, 1, 2, 3]);
        let triangle = FaceIndices([4, 5, 6, -1]);
        assert!(!quad.is_triangle());
        assert!(triangle.is_triangle());
        assert_eq!(quad.corners().collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(triangle.corners().collect::<Vec<_>>(), [4, 5, 6]);
    }

    #[test]
    fn decodes_faces_normals_and_basis() {
        let (opt, messages) = decode(&face_file(0));
        assert!(messages.is_empty(), "{messages:?}");

        let (_, node) = opt.nodes_of_kind(NodeKind::FaceList).next().unwrap();
        let faces = node.payload().face_list_ref().unwrap();
        assert_eq!(faces.face_count(), 2);
        assert_eq!(faces.face_list_size, 0x40);
        assert_eq!(faces.vertex_refs[1], FaceIndices([2, 3, 4, -1]));
        assert_eq!(faces.normal_refs[0], FaceIndices([0, 1, 2, 3]));
        assert!(faces.uv_refs[1].is_triangle());
        assert_eq!(faces.face_normals, vec![[0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
        assert_eq!(faces.basis_vectors[1].across_top, [1.0, 1.0, 0.0]);
        assert_eq!(faces.basis_vectors[1].down_side, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn truncated_basis_vector_is_zero_filled() {
        let (opt, messages) = decode(&face_file(4));
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert!(messages[0].contains("truncated"));

        let (_, node) = opt.nodes_of_kind(NodeKind::FaceList).next().unwrap();
        let faces = node.payload().face_list_ref().unwrap();
        assert_eq!(faces.basis_vectors.len(), 2);
        assert_eq!(faces.basis_vectors[1].across_top, [1.0, 1.0, 0.0]);
        assert_eq!(faces.basis_vectors[1].down_side, [0.0, 0.0, 0.0]);
    }
}
