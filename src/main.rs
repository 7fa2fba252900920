use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use rootcause::prelude::*;

use xwopt::models::NodePayload;
use xwopt::{Diagnostics, Node, NodeKind, OptDocument, ReadOptions};

/// Dump the node tree of OPT model files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print the decoded documents as JSON
    #[clap(long)]
    json: bool,

    /// Only list nodes of this kind, e.g. Texture or Hardpoint
    #[clap(short, long)]
    kind: Option<NodeKind>,

    /// Deepest node nesting to accept
    #[clap(long, default_value_t = xwopt::decoder::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// .opt file(s) or directories containing them
    paths: Vec<PathBuf>,
}

struct Decoded {
    path: PathBuf,
    document: Result<OptDocument, Report>,
    diagnostics: Vec<String>,
}

fn collect_paths(inputs: Vec<PathBuf>) -> Result<Vec<PathBuf>, Report> {
    let mut paths = Vec::with_capacity(inputs.len());
    for path in inputs {
        if path.is_dir() {
            for entry in fs::read_dir(&path).context("Failed to list directory")? {
                let entry = entry?;
                let is_opt = entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("opt"));
                if entry.file_type()?.is_file() && is_opt {
                    paths.push(entry.path());
                }
            }
        } else {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_document(
    path: &Path,
    max_depth: usize,
    diagnostics: &mut dyn Diagnostics,
) -> Result<OptDocument, Report> {
    let data = fs::read(path).context("Failed to read OPT file")?;
    let options = ReadOptions::builder().max_depth(max_depth).build();
    Ok(OptDocument::parse_with(&data, &options, diagnostics).context("Failed to decode OPT file")?)
}

fn decode(path: &Path, max_depth: usize) -> Decoded {
    let mut diagnostics = Vec::new();
    let document = read_document(path, max_depth, &mut |message: &str| {
        diagnostics.push(message.to_owned())
    });
    Decoded {
        path: path.to_owned(),
        document,
        diagnostics,
    }
}

fn describe(node: &Node<[f32; 2], [f32; 3]>) -> String {
    match node.payload() {
        NodePayload::FaceList(faces) => {
            let triangles = faces.vertex_refs.iter().filter(|f| f.is_triangle()).count();
            format!("{} faces, {triangles} triangles", faces.face_count())
        }
        NodePayload::VertexPositions(table)
        | NodePayload::VertexNormals(table) => format!("{} vectors", table.len()),
        NodePayload::TextureVertices(table) => format!("{} coordinates", table.len()),
        NodePayload::Hardpoint(hardpoint) => {
            format!("{} at {:?}", hardpoint.hardpoint_type, hardpoint.location)
        }
        NodePayload::PartDescriptor(part) => {
            format!("{} target group {}", part.part_type, part.target_group_id)
        }
        NodePayload::Texture(texture) => format!(
            "{}x{}, {} levels{}",
            texture.width,
            texture.height,
            texture.mip_level_count(),
            if texture.palette().is_absent() {
                ", no palette"
            } else {
                ""
            }
        ),
        NodePayload::LodCollection(lod) => lod
            .levels(node.children())
            .map(|level| {
                let marker = if level.degenerate { "!" } else { "" };
                format!("{}{marker}", level.max_render_distance)
            })
            .join(" "),
        NodePayload::TextureReference(reference) => reference.texture_name.clone(),
        NodePayload::Opaque(opaque) => format!("tag {:X}:{:X}", opaque.major, opaque.minor),
        NodePayload::RotationInfo(rotation) => format!("pivot {:?}", rotation.offset),
        NodePayload::EngineGlow(glow) => format!("center {:?}", glow.center),
        NodePayload::Separator | NodePayload::SkinCollection | NodePayload::NameNode => {
            String::new()
        }
    }
}

fn print_document(document: &OptDocument, kind: Option<NodeKind>) {
    println!(
        "version {} global offset 0x{:X}, {} nodes",
        document.version(),
        document.global_offset(),
        document.len()
    );
    for (id, node, depth) in document.depth_first() {
        if kind.is_some_and(|kind| node.kind() != kind) {
            continue;
        }
        let indent = if kind.is_some() { 0 } else { depth * 2 };
        println!(
            "{:indent$}{id} {} {:?} @0x{:X} {}",
            "",
            node.kind(),
            node.name(),
            node.offset_in_file(),
            describe(node)
        );
    }
}

fn main() -> Result<(), Report> {
    let args = Args::parse();
    let paths = collect_paths(args.paths)?;

    let decoded: Vec<Decoded> = paths
        .par_iter()
        .map(|path| decode(path, args.max_depth))
        .collect();

    let mut failures = 0;
    for Decoded {
        path,
        document,
        diagnostics,
    } in decoded
    {
        for message in &diagnostics {
            eprintln!("{}: {message}", path.display());
        }
        match document {
            Ok(document) if args.json => {
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
            Ok(document) => {
                println!("{}:", path.display());
                print_document(&document, args.kind);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {e:?}", path.display());
            }
        }
    }

    if failures > 0 {
        return Err(rootcause::report!("{failures} file(s) failed to decode"));
    }
    Ok(())
}
