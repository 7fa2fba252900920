use crate::decoder::{NodeDecoder, NodeHeader};
use crate::error::IResult;
use crate::models::NodeId;
use crate::vector::{Vector2, Vector3};

/// Level-of-detail switch. Each child is one level, paired with the
/// threshold at the same index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LodCollection {
    /// Larger values are nearer. A stored 0 means the level never cuts over
    /// and is kept as infinity.
    pub max_render_distance: Vec<f32>,
}

/// One level of a [`LodCollection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodLevel {
    pub max_render_distance: f32,
    pub node: NodeId,
    /// A finite threshold greater than the previous one. The level can never
    /// be selected and renderers usually skip it.
    pub degenerate: bool,
}

impl LodCollection {
    pub(crate) fn decode<V2: Vector2, V3: Vector3>(
        decoder: &mut NodeDecoder<'_, '_, V2, V3>,
        header: &NodeHeader,
        offset: usize,
    ) -> IResult<Self> {
        if header.child_count != header.data_count {
            decoder.report(&format!(
                "Not the same number of LOD meshes ({}) as LOD offsets ({}) at {offset:X}",
                header.child_count, header.data_count
            ));
        }

        let count = decoder.count(header.data_count, "LOD threshold");
        decoder.reader.seek(header.data_address)?;
        let max_render_distance = decoder.reader.read_list(count, 4, |r| {
            let distance = r.read_f32()?;
            Ok(if distance == 0.0 {
                f32::INFINITY
            } else {
                distance
            })
        })?;
        Ok(LodCollection {
            max_render_distance,
        })
    }

    /// Pair thresholds with the collection's children. Extra entries on
    /// either side are ignored.
    pub fn levels<'a>(&'a self, children: &'a [NodeId]) -> impl Iterator<Item = LodLevel> + 'a {
        let mut previous: Option<f32> = None;
        self.max_render_distance
            .iter()
            .zip(children)
            .map(move |(&max_render_distance, &node)| {
                let degenerate = max_render_distance.is_finite()
                    && previous.is_some_and(|p| max_render_distance > p);
                previous = Some(max_render_distance);
                LodLevel {
                    max_render_distance,
                    node,
                    degenerate,
                }
            })
    }
}
