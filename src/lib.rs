//! Decoder for OPT files, the hierarchical binary 3D model container used by
//! the X-Wing / TIE Fighter / X-Wing Alliance engine.
//!
//! The entry point is [`OptDocument`]. Decoding builds an arena of typed nodes
//! (meshes, vertex tables, textures, hardpoints, LOD groups, part metadata)
//! while tolerating the inconsistencies found in shipped game assets. Every
//! tolerated anomaly is reported through a caller-supplied [`Diagnostics`]
//! sink.
//!
//! ```no_run
//! use xwopt::{OptDocument, NodeKind, TracingDiagnostics};
//!
//! let data = std::fs::read("TIEFTR.OPT").unwrap();
//! let opt: OptDocument = OptDocument::parse(&data, &mut TracingDiagnostics).unwrap();
//! for (_, node) in opt.nodes_of_kind(NodeKind::Texture) {
//!     println!("{}", node.name());
//! }
//! ```

/// Stored pointer <-> stream position translation
pub mod address;
/// Byte-level readers shared by the header and node decoders
pub mod data;
/// The node graph builder
pub mod decoder;
/// Sinks for tolerated anomalies
pub mod diagnostics;
/// The decoded document and its traversals
pub mod document;
/// Error definitions
pub mod error;
/// Top-of-file header parsing
pub mod header;
/// Node payload types, one module per node kind
pub mod models;
/// Generic wrapper for values that may or may not match a known variant.
pub mod recognized;
/// Caller-supplied vector types and how they are read
pub mod vector;

#[cfg(test)]
pub(crate) mod test_support;

pub use address::AddressTranslator;
pub use diagnostics::{Diagnostics, IgnoreDiagnostics, TracingDiagnostics};
pub use document::{OptDocument, ReadOptions};
pub use error::OptError;
pub use header::OptHeader;
pub use models::{Node, NodeId, NodeKind, NodePayload};
pub use recognized::Recognized;
pub use vector::{Vector2, Vector3};

#[cfg(feature = "arc")]
pub type Rc<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub type Rc<T> = std::rc::Rc<T>;
