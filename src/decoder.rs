//! Builds the node arena.
//!
//! A node's kind is not fully given by its header. Several header shapes
//! exist in shipped files and are told apart by looking at the first three
//! words:
//!
//! * `[name][20][minor]`: texture with a name pointer in front of the tag.
//! * `[name][0][1][child table]`: a node that only names its single child.
//! * `[0][type]...`: unnamed node of `type`.
//! * `[20][minor]...`: unnamed texture.
//! * `[name][type]...`: named node of `type`.
//!
//! "name" means a word that can only be a pointer, i.e. greater than the
//! global offset.
//!
//! Decoded nodes are cached by stored address. A node is registered in the
//! cache before its body is read, so a reference cycle resolves to the node
//! already being decoded instead of recursing forever.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::Rc;
use crate::data::OptReader;
use crate::diagnostics::Diagnostics;
use crate::error::{IResult, OptError};
use crate::header::OptHeader;
use crate::models::palette::TexturePalette;
use crate::models::types::NodeType;
use crate::models::{
    EngineGlow, FaceList, Hardpoint, LodCollection, Node, NodeId, NodeKind, NodePayload,
    OpaqueNode, PartDescriptor, RotationInfo, TextureReference, VertexTable, texture,
};
use crate::recognized::RawEnum;
use crate::vector::{Vector2, Vector3, VectorCodec};

/// Nesting depth accepted when no other limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;
/// Width of the name field of a named node.
pub const NODE_NAME_WIDTH: usize = 100;
/// Width of the name field of a name-only wrapper node.
pub const NAME_NODE_WIDTH: usize = 32;
/// Type tag that marks a texture.
const TEXTURE_MAJOR: i32 = NodeType::Texture as i32;

/// How the first header words were interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeTag {
    Texture { name_offset: i32, minor: i32 },
    NameWrapper { name_offset: i32 },
    Generic { name_offset: i32, node_type: i32 },
    Unknown { major: i32, minor: i32 },
}

/// The structured part of a six-word header, read after the type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeHeader {
    pub child_count: i32,
    pub child_table: i32,
    pub data_count: i32,
    pub data_address: i32,
}

struct DecodedNode<V2, V3> {
    name: String,
    children: Vec<NodeId>,
    payload: NodePayload<V2, V3>,
}

impl<V2, V3> DecodedNode<V2, V3> {
    fn leaf(name: String, payload: NodePayload<V2, V3>) -> Self {
        DecodedNode {
            name,
            children: Vec::new(),
            payload,
        }
    }
}

pub(crate) struct NodeDecoder<'a, 'd, V2, V3> {
    pub(crate) reader: OptReader<'a>,
    pub(crate) vectors: VectorCodec<'d, V3>,
    diagnostics: &'d mut dyn Diagnostics,
    version: u32,
    max_depth: usize,
    depth: usize,
    cache: HashMap<i32, NodeId>,
    palettes: HashMap<i32, Rc<TexturePalette>>,
    nodes: Vec<Node<V2, V3>>,
}

impl<'a, 'd, V2: Vector2, V3: Vector3> NodeDecoder<'a, 'd, V2, V3> {
    pub(crate) fn new(
        reader: OptReader<'a>,
        version: u32,
        vectors: VectorCodec<'d, V3>,
        max_depth: usize,
        diagnostics: &'d mut dyn Diagnostics,
    ) -> Self {
        NodeDecoder {
            reader,
            vectors,
            diagnostics,
            version,
            max_depth,
            depth: 0,
            cache: HashMap::new(),
            palettes: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    pub(crate) fn into_nodes(self) -> Vec<Node<V2, V3>> {
        self.nodes
    }

    pub(crate) fn report(&mut self, message: &str) {
        self.diagnostics.report(message);
    }

    /// Decode the root part table named by the file header.
    pub(crate) fn read_roots(&mut self, header: &OptHeader) -> IResult<Vec<NodeId>> {
        let count = self.count(header.root_count, "root table");
        self.read_children(count, header.root_table, None)
    }

    /// Interpret a stored count, treating negative values as empty.
    pub(crate) fn count(&mut self, raw: i32, what: &str) -> usize {
        usize::try_from(raw).unwrap_or_else(|_| {
            let position = self.reader.position();
            self.report(&format!(
                "Negative {what} count {raw} at {position:X}, treated as empty"
            ));
            0
        })
    }

    /// Read a word whose meaning is unknown but whose value is always the
    /// same in known files.
    pub(crate) fn read_unknown_use(&mut self, expected: i32, context: NodeKind) -> IResult<i32> {
        let position = self.reader.position();
        let found = self.reader.read_i32()?;
        if found != expected {
            self.report(&format!(
                "Unknown use field normally containing {expected:X} contains {found:X} at {position:X} in a {context}"
            ));
        }
        Ok(found)
    }

    /// Read a pointer that normally targets the byte right after itself and
    /// follow it. Any skipped gap is reported.
    pub(crate) fn follow_pointer_to_next_byte(&mut self, context: NodeKind) -> IResult<()> {
        let stored = self.reader.read_i32()?;
        self.seek_should_point_here(stored, context)
    }

    /// Jump to `stored` if the cursor isn't already there, reporting the gap.
    pub(crate) fn seek_should_point_here(&mut self, stored: i32, context: NodeKind) -> IResult<()> {
        let position = self.reader.position() as i64;
        let target = self.reader.stream_position_of(stored);
        if target != position {
            self.report(&format!(
                "Skipping unknown {} bytes at {position:X} in a {context}",
                target - position
            ));
            self.reader.seek(stored)?;
        }
        Ok(())
    }

    /// The prefix shared by inline payloads: three unknown-use words then a
    /// pointer to the payload proper.
    pub(crate) fn read_inline_prefix(&mut self, context: NodeKind) -> IResult<()> {
        self.read_unknown_use(0, context)?;
        self.read_unknown_use(0, context)?;
        self.read_unknown_use(1, context)?;
        self.follow_pointer_to_next_byte(context)
    }

    /// Decode `count` children through the address table at `table`. Zero
    /// slots are skipped.
    pub(crate) fn read_children(
        &mut self,
        count: usize,
        table: i32,
        parent: Option<NodeId>,
    ) -> IResult<Vec<NodeId>> {
        let mut children = Vec::with_capacity(count.min(self.reader.len() / 4));
        for index in 0..count {
            self.reader.seek(table as i64 + 4 * index as i64)?;
            let stored = self.reader.read_i32()?;
            if stored == 0 {
                continue;
            }
            children.push(self.read_node_at(stored, parent)?);
        }
        Ok(children)
    }

    /// Legacy inline child list: count, table pointer, sentinel, reverse
    /// pointer, then the table itself.
    fn read_inline_children(&mut self, parent: NodeId, context: NodeKind) -> IResult<Vec<NodeId>> {
        let raw_count = self.reader.read_i32()?;
        if raw_count == 0 {
            return Ok(Vec::new());
        }
        let table = self.reader.read_i32()?;

        let sentinel = if self.version <= 2 { 1 } else { 0 };
        self.read_unknown_use(sentinel, context)?;
        // points back at the node header
        self.reader.read_i32()?;
        self.seek_should_point_here(table, context)?;

        let count = self.count(raw_count, "child");
        self.read_children(count, table, Some(parent))
    }

    fn read_node_header(&mut self) -> IResult<NodeHeader> {
        Ok(NodeHeader {
            child_count: self.reader.read_i32()?,
            child_table: self.reader.read_i32()?,
            data_count: self.reader.read_i32()?,
            data_address: self.reader.read_i32()?,
        })
    }

    /// Read a name elsewhere in the file without moving the cursor.
    fn read_name_at(&mut self, stored: i32, width: usize) -> IResult<String> {
        if stored == 0 {
            return Ok(String::new());
        }
        let resume = self.reader.position();
        self.reader.seek(stored)?;
        let name = self.reader.read_string(width)?;
        self.reader.seek_position(resume)?;
        Ok(name)
    }

    fn read_tag(&mut self) -> IResult<NodeTag> {
        let address = self.reader.address();
        let w0 = self.reader.read_i32()?;
        let w1 = self.reader.read_i32()?;

        if address.is_plausible(w0 as i64) {
            match (w1, self.reader.peek_i32()) {
                (TEXTURE_MAJOR, Some(minor)) => {
                    self.reader.read_i32()?;
                    return Ok(NodeTag::Texture {
                        name_offset: w0,
                        minor,
                    });
                }
                // Indistinguishable from a named separator with one child;
                // files in the wild use it as a name wrapper.
                (0, Some(1)) => {
                    self.reader.read_i32()?;
                    return Ok(NodeTag::NameWrapper { name_offset: w0 });
                }
                _ => {}
            }
        }

        Ok(match w0 {
            0 => NodeTag::Generic {
                name_offset: 0,
                node_type: w1,
            },
            TEXTURE_MAJOR => NodeTag::Texture {
                name_offset: 0,
                minor: w1,
            },
            _ if address.is_plausible(w0 as i64) => NodeTag::Generic {
                name_offset: w0,
                node_type: w1,
            },
            _ => NodeTag::Unknown {
                major: w0,
                minor: w1,
            },
        })
    }

    /// Decode the node a stored pointer refers to, or return the id it was
    /// given the first time it was reached.
    pub(crate) fn read_node_at(&mut self, stored: i32, parent: Option<NodeId>) -> IResult<NodeId> {
        if let Some(&id) = self.cache.get(&stored) {
            trace!(stored, %id, "recycling node");
            return Ok(id);
        }

        self.reader.seek(stored)?;
        let offset = self.reader.position();
        if self.depth >= self.max_depth {
            return Err(OptError::RecursionLimit {
                depth: self.max_depth,
                offset,
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::reserved(offset, parent));
        self.cache.insert(stored, id);

        self.depth += 1;
        let decoded = self.decode_node(id, offset);
        self.depth -= 1;
        let decoded = decoded?;

        let node = &mut self.nodes[id.index()];
        node.name = decoded.name;
        node.children = decoded.children;
        node.payload = decoded.payload;
        trace!(%id, offset, kind = %node.payload.kind(), "decoded node");
        Ok(id)
    }

    fn decode_node(&mut self, id: NodeId, offset: usize) -> IResult<DecodedNode<V2, V3>> {
        match self.read_tag()? {
            NodeTag::Texture { name_offset, minor } => {
                let (name, texture) = texture::decode(self, name_offset, minor)?;
                Ok(DecodedNode::leaf(name, NodePayload::Texture(Rc::new(texture))))
            }
            NodeTag::NameWrapper { name_offset } => {
                let child_table = self.reader.read_i32()?;
                let name = self.read_name_at(name_offset, NAME_NODE_WIDTH)?;
                let children = self.read_children(1, child_table, Some(id))?;
                Ok(DecodedNode {
                    name,
                    children,
                    payload: NodePayload::NameNode,
                })
            }
            NodeTag::Generic {
                name_offset,
                node_type,
            } => {
                let name = self.read_name_at(name_offset, NODE_NAME_WIDTH)?;
                self.decode_typed(id, offset, name, name_offset, node_type)
            }
            NodeTag::Unknown { major, minor } => {
                self.report(&format!(
                    "Unknown node header {major:X} {minor:X} at {offset:X}"
                ));
                Ok(DecodedNode::leaf(
                    String::new(),
                    NodePayload::Opaque(OpaqueNode { major, minor }),
                ))
            }
        }
    }

    fn decode_typed(
        &mut self,
        id: NodeId,
        offset: usize,
        name: String,
        major: i32,
        node_type: i32,
    ) -> IResult<DecodedNode<V2, V3>> {
        let Some(node_type) = NodeType::from_raw(node_type) else {
            self.report(&format!(
                "Found unknown node type {node_type:X} at {offset:X}"
            ));
            return Ok(DecodedNode::leaf(
                name,
                NodePayload::Opaque(OpaqueNode {
                    major,
                    minor: node_type,
                }),
            ));
        };

        let payload = match node_type {
            NodeType::Separator => {
                let children = self.read_inline_children(id, NodeKind::Separator)?;
                return Ok(DecodedNode {
                    name,
                    children,
                    payload: NodePayload::Separator,
                });
            }
            NodeType::Hardpoint => NodePayload::Hardpoint(Hardpoint::decode(self)?),
            NodeType::PartDescriptor => NodePayload::PartDescriptor(PartDescriptor::decode(self)?),
            NodeType::EngineGlow => NodePayload::EngineGlow(EngineGlow::decode(self)?),
            NodeType::FaceList => {
                return self.decode_structured(id, name, |decoder, header| {
                    Ok(NodePayload::FaceList(FaceList::decode(decoder, header)?))
                });
            }
            NodeType::VertexPosition => {
                return self.decode_structured(id, name, |decoder, header| {
                    let table = VertexTable::decode_vector3(decoder, header)?;
                    Ok(NodePayload::VertexPositions(table))
                });
            }
            NodeType::VertexNormal => {
                return self.decode_structured(id, name, |decoder, header| {
                    let table = VertexTable::decode_vector3(decoder, header)?;
                    Ok(NodePayload::VertexNormals(table))
                });
            }
            NodeType::TextureVertex => {
                return self.decode_structured(id, name, |decoder, header| {
                    let table = VertexTable::decode_vector2(decoder, header)?;
                    Ok(NodePayload::TextureVertices(table))
                });
            }
            NodeType::MeshLod => {
                return self.decode_structured(id, name, |decoder, header| {
                    let lod = LodCollection::decode(decoder, header, offset)?;
                    Ok(NodePayload::LodCollection(lod))
                });
            }
            NodeType::RotationInfo => {
                return self.decode_structured(id, name, |decoder, header| {
                    Ok(NodePayload::RotationInfo(RotationInfo::decode(decoder, header)?))
                });
            }
            NodeType::SkinSelector => {
                return self.decode_structured(id, name, |_, _| Ok(NodePayload::SkinCollection));
            }
            NodeType::TextureReferenceByName => {
                return self.decode_structured(id, name, |decoder, header| {
                    let reference = TextureReference::decode(decoder, header)?;
                    Ok(NodePayload::TextureReference(reference))
                });
            }
            unsupported @ (NodeType::Transform
            | NodeType::Translation
            | NodeType::Rotation
            | NodeType::Scale
            | NodeType::Def
            | NodeType::Material
            | NodeType::MaterialBinding
            | NodeType::VertexNormalBinding
            | NodeType::TextureVertexBinding
            | NodeType::QuadMesh
            | NodeType::FaceSet
            | NodeType::TriangleStripSet
            | NodeType::Group
            | NodeType::BaseColour
            | NodeType::Texture) => {
                debug!(%unsupported, offset, "node type has no decoder");
                self.report(&format!(
                    "Found unsupported node type {unsupported} at {offset:X}"
                ));
                NodePayload::Opaque(OpaqueNode {
                    major,
                    minor: unsupported.raw(),
                })
            }
        };
        Ok(DecodedNode::leaf(name, payload))
    }

    /// Nodes whose payload sits at the header's data address and whose
    /// children are listed in the header's child table.
    fn decode_structured(
        &mut self,
        id: NodeId,
        name: String,
        payload: impl FnOnce(&mut Self, &NodeHeader) -> IResult<NodePayload<V2, V3>>,
    ) -> IResult<DecodedNode<V2, V3>> {
        let header = self.read_node_header()?;
        let payload = payload(self, &header)?;

        let count = self.count(header.child_count, "child");
        let children = self.read_children(count, header.child_table, Some(id))?;
        Ok(DecodedNode {
            name,
            children,
            payload,
        })
    }

    /// Palette block at `stored`, shared between every texture pointing at
    /// the same address. Pointers into the header or past the end yield an
    /// absent palette.
    pub(crate) fn read_palette(&mut self, stored: i32) -> Rc<TexturePalette> {
        if let Some(palette) = self.palettes.get(&stored) {
            return Rc::clone(palette);
        }

        let address = self.reader.address();
        if !address.is_plausible(stored as i64) {
            self.report(&format!(
                "Texture palette offset {stored:X} is not past global offset {:X}, palette skipped",
                address.global_offset()
            ));
            return Rc::new(TexturePalette::absent());
        }

        let resume = self.reader.position();
        let palette = self
            .reader
            .seek(stored)
            .and_then(|_| TexturePalette::read(&mut self.reader));
        let palette = match palette {
            Ok(palette) => palette,
            Err(e) => {
                self.report(&format!("Texture palette at {stored:X} unreadable: {e}"));
                TexturePalette::absent()
            }
        };
        self.reader.restore_position(resume);

        let palette = Rc::new(palette);
        if !palette.is_absent() {
            self.palettes.insert(stored, Rc::clone(&palette));
        }
        palette
    }
}
