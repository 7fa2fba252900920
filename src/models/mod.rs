use std::fmt;

use variantly::Variantly;

use crate::Rc;

/// Hardpoint payload
pub mod hardpoint;
/// Engine glow payload
pub mod engine_glow;
/// Face list payload
pub mod face_list;
/// LOD group payload
pub mod lod;
/// Texture palette block
pub mod palette;
/// Part descriptor payload
pub mod part;
/// Rotation pivot payload
pub mod rotation;
/// Texture payload
pub mod texture;
/// Texture reference payload
pub mod texture_ref;
/// Stored enumerations
pub mod types;
/// Vertex, normal and texture coordinate tables
pub mod vertex;

pub use engine_glow::EngineGlow;
pub use face_list::{FaceIndices, FaceList, TextureBasisVectors};
pub use hardpoint::Hardpoint;
pub use lod::{LodCollection, LodLevel};
pub use palette::TexturePalette;
pub use part::PartDescriptor;
pub use rotation::RotationInfo;
pub use texture::Texture;
pub use texture_ref::TextureReference;
pub use types::{HardpointType, NodeType, PartType, TextureMinor};
pub use vertex::VertexTable;

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A decoded node.
///
/// Nodes referenced from more than one place are decoded once, so `parent`
/// records the first node that reached this one. The same id may appear in
/// several `children` lists.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node<V2, V3> {
    pub(crate) offset_in_file: usize,
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) payload: NodePayload<V2, V3>,
}

impl<V2, V3> Node<V2, V3> {
    /// Placeholder registered before the body is decoded.
    pub(crate) fn reserved(offset_in_file: usize, parent: Option<NodeId>) -> Self {
        Node {
            offset_in_file,
            name: String::new(),
            parent,
            children: Vec::new(),
            payload: NodePayload::Opaque(OpaqueNode::default()),
        }
    }

    /// Stream position of the node header.
    pub fn offset_in_file(&self) -> usize {
        self.offset_in_file
    }

    /// Empty for unnamed nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn payload(&self) -> &NodePayload<V2, V3> {
        &self.payload
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }
}

/// The raw type tag of a node this crate does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpaqueNode {
    pub major: i32,
    pub minor: i32,
}

#[derive(Debug, Clone, Variantly)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodePayload<V2, V3> {
    Separator,
    FaceList(FaceList<V3>),
    VertexPositions(VertexTable<V3>),
    VertexNormals(VertexTable<V3>),
    TextureVertices(VertexTable<V2>),
    Hardpoint(Hardpoint<V3>),
    RotationInfo(RotationInfo<V3>),
    PartDescriptor(PartDescriptor<V3>),
    Texture(Rc<Texture>),
    LodCollection(LodCollection),
    SkinCollection,
    /// Wraps a single child and gives it a name.
    NameNode,
    EngineGlow(EngineGlow<V3>),
    TextureReference(TextureReference),
    Opaque(OpaqueNode),
}

/// Payload discriminant, for filtering without matching on data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Variantly)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Separator,
    FaceList,
    VertexPositions,
    VertexNormals,
    TextureVertices,
    Hardpoint,
    RotationInfo,
    PartDescriptor,
    Texture,
    LodCollection,
    SkinCollection,
    NameNode,
    EngineGlow,
    TextureReference,
    Opaque,
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Separator,
        NodeKind::FaceList,
        NodeKind::VertexPositions,
        NodeKind::VertexNormals,
        NodeKind::TextureVertices,
        NodeKind::Hardpoint,
        NodeKind::RotationInfo,
        NodeKind::PartDescriptor,
        NodeKind::Texture,
        NodeKind::LodCollection,
        NodeKind::SkinCollection,
        NodeKind::NameNode,
        NodeKind::EngineGlow,
        NodeKind::TextureReference,
        NodeKind::Opaque,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Separator => "Separator",
            NodeKind::FaceList => "FaceList",
            NodeKind::VertexPositions => "VertexPositions",
            NodeKind::VertexNormals => "VertexNormals",
            NodeKind::TextureVertices => "TextureVertices",
            NodeKind::Hardpoint => "Hardpoint",
            NodeKind::RotationInfo => "RotationInfo",
            NodeKind::PartDescriptor => "PartDescriptor",
            NodeKind::Texture => "Texture",
            NodeKind::LodCollection => "LodCollection",
            NodeKind::SkinCollection => "SkinCollection",
            NodeKind::NameNode => "NameNode",
            NodeKind::EngineGlow => "EngineGlow",
            NodeKind::TextureReference => "TextureReference",
            NodeKind::Opaque => "Opaque",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;

    /// Case-insensitive match on the kind name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown node kind '{s}'"))
    }
}

impl<V2, V3> NodePayload<V2, V3> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Separator => NodeKind::Separator,
            NodePayload::FaceList(_) => NodeKind::FaceList,
            NodePayload::VertexPositions(_) => NodeKind::VertexPositions,
            NodePayload::VertexNormals(_) => NodeKind::VertexNormals,
            NodePayload::TextureVertices(_) => NodeKind::TextureVertices,
            NodePayload::Hardpoint(_) => NodeKind::Hardpoint,
            NodePayload::RotationInfo(_) => NodeKind::RotationInfo,
            NodePayload::PartDescriptor(_) => NodeKind::PartDescriptor,
            NodePayload::Texture(_) => NodeKind::Texture,
            NodePayload::LodCollection(_) => NodeKind::LodCollection,
            NodePayload::SkinCollection => NodeKind::SkinCollection,
            NodePayload::NameNode => NodeKind::NameNode,
            NodePayload::EngineGlow(_) => NodeKind::EngineGlow,
            NodePayload::TextureReference(_) => NodeKind::TextureReference,
            NodePayload::Opaque(_) => NodeKind::Opaque,
        }
    }
}
