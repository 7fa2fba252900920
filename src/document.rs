use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use bon::Builder;
use rootcause::prelude::*;
use tracing::debug;

use crate::data::OptReader;
use crate::decoder::{DEFAULT_MAX_DEPTH, NodeDecoder};
use crate::diagnostics::Diagnostics;
use crate::error::OptError;
use crate::header::OptHeader;
use crate::models::{Node, NodeId, NodeKind, Texture};
use crate::vector::{CoordinateTransform, Vector2, Vector3, VectorCodec};

/// Decoding knobs.
#[derive(Builder)]
pub struct ReadOptions<V3 = [f32; 3]> {
    /// Deepest node nesting accepted before decoding fails.
    #[builder(default = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Applied to every 3-vector as it is read.
    coordinate_transform: Option<CoordinateTransform<V3>>,
}

impl<V3> Default for ReadOptions<V3> {
    fn default() -> Self {
        ReadOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            coordinate_transform: None,
        }
    }
}

/// A decoded OPT file: its header, the root nodes and the arena every node
/// lives in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptDocument<V2 = [f32; 2], V3 = [f32; 3]> {
    header: OptHeader,
    roots: Vec<NodeId>,
    nodes: Vec<Node<V2, V3>>,
}

impl<V2: Vector2, V3: Vector3> OptDocument<V2, V3> {
    /// Decode an in-memory file with default options.
    pub fn parse(data: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self, Report<OptError>> {
        Self::parse_with(data, &ReadOptions::default(), diagnostics)
    }

    pub fn parse_with(
        data: &[u8],
        options: &ReadOptions<V3>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self, Report<OptError>> {
        let mut reader = OptReader::new(data);
        let header = OptHeader::read(&mut reader, diagnostics).map_err(Report::new)?;
        reader.set_address(header.address());

        let vectors = VectorCodec::new(options.coordinate_transform.as_deref());
        let mut decoder =
            NodeDecoder::new(reader, header.version, vectors, options.max_depth, diagnostics);
        let roots = decoder.read_roots(&header).map_err(Report::new)?;
        let nodes = decoder.into_nodes();

        debug!(
            version = header.version,
            roots = roots.len(),
            nodes = nodes.len(),
            "decoded OPT document"
        );
        Ok(OptDocument {
            header,
            roots,
            nodes,
        })
    }

    /// Read a whole stream and decode it.
    pub fn read<R: Read>(
        mut source: R,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self, Report<OptError>> {
        let mut data = Vec::new();
        source
            .read_to_end(&mut data)
            .map_err(|e| Report::new(OptError::from(e)))?;
        Self::parse(&data, diagnostics)
    }

    pub fn from_path(
        path: impl AsRef<Path>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self, Report> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(OptError::from)
            .context(format!("Could not read {}", path.display()))?;
        Ok(Self::parse(&data, diagnostics).context(format!("Could not decode {}", path.display()))?)
    }
}

impl<V2, V3> OptDocument<V2, V3> {
    pub fn header(&self) -> &OptHeader {
        &self.header
    }

    /// 0 for legacy files.
    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn global_offset(&self) -> i32 {
        self.header.global_offset
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<V2, V3>> {
        self.nodes.get(id.index())
    }

    /// Every distinct node in decode order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<V2, V3>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk from the roots. A node reachable along several paths
    /// is yielded only the first time, so shared subtrees and cycles are
    /// visited once. Each item carries the depth it was first reached at.
    pub fn depth_first(&self) -> DepthFirst<'_, V2, V3> {
        DepthFirst {
            document: self,
            stack: self.roots.iter().rev().map(|&id| (id, 0)).collect(),
            visited: HashSet::new(),
        }
    }

    /// Reachable nodes of one kind, in traversal order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = (NodeId, &Node<V2, V3>)> {
        self.depth_first()
            .filter(move |(_, node, _)| node.kind() == kind)
            .map(|(id, node, _)| (id, node))
    }

    /// Reachable textures with the node that holds them.
    pub fn textures(&self) -> impl Iterator<Item = (&Node<V2, V3>, &Texture)> {
        self.nodes_of_kind(NodeKind::Texture)
            .filter_map(|(_, node)| Some((node, &**node.payload().texture_ref()?)))
    }

    /// First reachable texture with this name.
    pub fn find_texture(&self, name: &str) -> Option<(NodeId, &Node<V2, V3>)> {
        self.nodes_of_kind(NodeKind::Texture)
            .find(|(_, node)| node.name() == name)
    }
}

/// Iterator returned by [`OptDocument::depth_first`].
pub struct DepthFirst<'a, V2, V3> {
    document: &'a OptDocument<V2, V3>,
    stack: Vec<(NodeId, usize)>,
    visited: HashSet<NodeId>,
}

impl<'a, V2, V3> Iterator for DepthFirst<'a, V2, V3> {
    type Item = (NodeId, &'a Node<V2, V3>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.document.node(id) else {
                continue;
            };
            self.stack
                .extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
            return Some((id, node, depth));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodePayload;
    use crate::test_support::{FileBuilder, decode, try_decode};

    /// A root separator holding a two-quad face list and an eight-vertex
    /// position table.
    fn small_mesh(file: &mut FileBuilder) {
        let roots = file.root_table(1);
        let (sep, table) = file.separator(2);

        let faces = file.data_node(1, 2);
        file.i32(0x80);
        for face in [[0, 1, 2, 3], [4, 5, 6, 7]] {
            for _ in 0..4 {
                for index in face {
                    file.i32(index);
                }
            }
        }
        for _ in 0..2 {
            file.vec3([0.0, 0.0, 1.0]);
        }
        for _ in 0..2 {
            file.vec3([1.0, 0.0, 0.0]);
            file.vec3([0.0, 1.0, 0.0]);
        }

        let positions = file.data_node(3, 8);
        for i in 0..8 {
            file.vec3([i as f32, 0.0, 0.0]);
        }

        file.set_slot(table, 0, faces);
        file.set_slot(table, 1, positions);
        file.set_slot(roots, 0, sep);
    }

    #[test]
    fn decodes_small_mesh() {
        let mut file = FileBuilder::modern(2, 0x00B8_0000);
        small_mesh(&mut file);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert!(messages.is_empty(), "{messages:?}");
        assert_eq!(opt.version(), 2);
        assert_eq!(opt.global_offset(), 0x00B8_0000);
        assert_eq!(opt.roots().len(), 1);
        assert_eq!(opt.len(), 3);

        let root = opt.node(opt.roots()[0]).unwrap();
        assert_eq!(root.kind(), NodeKind::Separator);
        let kinds: Vec<_> = root
            .children()
            .iter()
            .map(|&id| opt.node(id).unwrap().kind())
            .collect();
        assert_eq!(kinds, [NodeKind::FaceList, NodeKind::VertexPositions]);

        let faces = opt.node(root.children()[0]).unwrap().payload().face_list_ref().unwrap();
        assert_eq!(faces.face_count(), 2);
        match opt.node(root.children()[1]).unwrap().payload() {
            NodePayload::VertexPositions(table) => assert_eq!(table.len(), 8),
            other => panic!("unexpected payload {:?}", other.kind()),
        }
        for &child in root.children() {
            assert_eq!(opt.node(child).unwrap().parent(), Some(opt.roots()[0]));
        }
    }

    #[test]
    fn legacy_file_decodes_the_same_tree() {
        let mut file = FileBuilder::legacy(0x1000);
        small_mesh(&mut file);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert!(messages.is_empty(), "{messages:?}");
        assert_eq!(opt.version(), 0);
        assert!(opt.header().is_legacy());
        let kinds: Vec<_> = opt.depth_first().map(|(_, node, _)| node.kind()).collect();
        assert_eq!(
            kinds,
            [NodeKind::Separator, NodeKind::FaceList, NodeKind::VertexPositions]
        );
    }

    #[test]
    fn modern_sentinel_is_zero() {
        let mut file = FileBuilder::modern(3, 0x100);
        small_mesh(&mut file);
        let bytes = file.finish();

        let (opt, messages) = decode(&bytes);
        assert!(messages.is_empty(), "{messages:?}");
        assert_eq!(opt.version(), 3);
    }

    #[test]
    fn depth_first_visits_shared_nodes_once() {
        let mut file = FileBuilder::modern(2, 0x100);
        let roots = file.root_table(2);
        let (a, a_table) = file.separator(2);
        let (b, b_table) = file.separator(1);
        let leaf = file.data_node(23, 0);
        for _ in 0..4 {
            file.vec3([0.0; 3]);
        }
        file.set_slot(a_table, 0, b);
        file.set_slot(a_table, 1, leaf);
        file.set_slot(b_table, 0, a);
        file.set_slot(roots, 0, a);
        file.set_slot(roots, 1, leaf);
        let bytes = file.finish();

        let (opt, _) = decode(&bytes);
        let walk: Vec<_> = opt
            .depth_first()
            .map(|(id, node, depth)| (id.index(), node.kind(), depth))
            .collect();
        assert_eq!(
            walk,
            [
                (0, NodeKind::Separator, 0),
                (1, NodeKind::Separator, 1),
                (2, NodeKind::RotationInfo, 1),
            ]
        );
        assert_eq!(opt.nodes().count(), 3);
    }

    #[test]
    fn length_mismatch_fails() {
        let mut file = FileBuilder::modern(2, 0x100);
        small_mesh(&mut file);
        let mut bytes = file.finish();
        bytes.extend_from_slice(&[0; 4]);

        let (result, messages) = try_decode(&bytes);
        assert!(result.is_err());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("may be corrupt"));
    }

    #[test]
    fn reads_from_a_stream() {
        let mut file = FileBuilder::modern(2, 0x100);
        small_mesh(&mut file);
        let bytes = file.finish();

        let mut sink = |_: &str| {};
        let opt: OptDocument = OptDocument::read(std::io::Cursor::new(bytes), &mut sink).unwrap();
        assert_eq!(opt.len(), 3);
    }

    #[test]
    fn depth_limit_is_configurable() {
        let mut file = FileBuilder::modern(2, 0x100);
        small_mesh(&mut file);
        let bytes = file.finish();

        let options = ReadOptions::builder().max_depth(1).build();
        let mut sink = |_: &str| {};
        let result: Result<OptDocument, _> = OptDocument::parse_with(&bytes, &options, &mut sink);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut sink = |_: &str| {};
        let result: Result<OptDocument, _> =
            OptDocument::from_path("/nonexistent/FILE.OPT", &mut sink);
        assert!(result.is_err());
    }
}
