//! Runnable surface for the builder core (spec.md 6.3). Generates a
//! synthetic grid mesh (no `.obj` loading — this binary exercises the
//! hierarchy builders, not a mesh importer), builds a sub-BVH with the
//! requested strategy, validates it, prints basic stats, and optionally
//! writes the result to a cache file.
//!
//! Grounded on the teacher's `bin/cli.rs` (a thin `fn main()` wiring
//! options into a single library call) and `bin/serial_render.rs` for
//! the pattern of parsing a handful of positional args by hand rather
//! than pulling in a CLI-parsing crate the teacher doesn't otherwise use.

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

use log::info;

use tracer_bvh::{build_binned_bvh, build_binned_fast_bvh, build_spatial_split_bvh, cache, validate, BuildConfig, Triangle, Vertex};

enum Strategy {
    Binned,
    BinnedFast,
    SpatialSplit,
}

struct Options {
    strategy: Strategy,
    grid_size: usize,
    cache_path: Option<String>,
}

fn parse_args() -> Options {
    let mut strategy = Strategy::Binned;
    let mut grid_size = 64;
    let mut cache_path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fast" => strategy = Strategy::BinnedFast,
            "--sbvh" => strategy = Strategy::SpatialSplit,
            "--grid-size" => {
                if let Some(value) = args.next() {
                    grid_size = value.parse().unwrap_or(grid_size);
                }
            }
            "--cache" => cache_path = args.next(),
            other => eprintln!("ignoring unrecognized argument: {}", other),
        }
    }

    Options { strategy, grid_size, cache_path }
}

/// A grid of disjoint unit triangles, spaced two units apart along x, so
/// the builder has something nontrivial to split without needing a mesh
/// file on disk.
fn synthetic_grid_mesh(n: usize) -> (Vec<Vertex>, Vec<Triangle>) {
    let mut vertices = Vec::with_capacity(n * 3);
    let mut triangles = Vec::with_capacity(n);
    for i in 0..n {
        let x = i as f32 * 2.0;
        let base = vertices.len() as u32;
        vertices.push(Vertex::new([x, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        vertices.push(Vertex::new([x + 1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        vertices.push(Vertex::new([x, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        triangles.push(Triangle::new([base, base + 1, base + 2], 0));
    }
    (vertices, triangles)
}

fn max_depth(nodes: &[tracer_bvh::SubBvhNode], node_index: u32) -> u32 {
    let node = nodes[node_index as usize];
    if node.is_leaf() {
        0
    } else {
        let left = node.left_child_index();
        1 + max_depth(nodes, left).max(max_depth(nodes, left + 1))
    }
}

fn max_leaf_size(nodes: &[tracer_bvh::SubBvhNode]) -> u32 {
    nodes.iter().map(|n| n.triangle_count).max().unwrap_or(0)
}

fn main() -> ExitCode {
    env_logger::init();
    let options = parse_args();
    let config = BuildConfig::default();

    let (vertices, triangles) = synthetic_grid_mesh(options.grid_size);
    info!("built synthetic mesh: {} vertices, {} triangles", vertices.len(), triangles.len());

    let result = match options.strategy {
        Strategy::Binned => build_binned_bvh(&vertices, &triangles, &config),
        Strategy::BinnedFast => build_binned_fast_bvh(&vertices, &triangles, &config),
        Strategy::SpatialSplit => build_spatial_split_bvh(&vertices, &triangles, &config),
    };

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("build failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("nodes: {}", output.nodes.len());
    println!("max depth: {}", max_depth(&output.nodes, output.root_index));
    println!("max leaf size: {}", max_leaf_size(&output.nodes));
    println!("triangle buffer length: {}", output.triangles.len());

    let failures = validate(&output.nodes, output.root_index, &vertices, &output.triangles);
    if failures.is_empty() {
        println!("validation: ok");
    } else {
        println!("validation: {} failure(s)", failures.len());
        for failure in &failures {
            println!("  {:?}", failure);
        }
    }

    if let Some(path) = options.cache_path {
        let cached = cache::CachedBvh { root_index: output.root_index, nodes: output.nodes, triangles: output.triangles };
        match File::create(&path).map(BufWriter::new).and_then(|w| {
            cache::write(w, &cached).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
        }) {
            Ok(()) => println!("wrote cache to {}", path),
            Err(e) => {
                eprintln!("failed to write cache: {}", e);
                return ExitCode::FAILURE;
            }
        }

        match File::open(&path).map(BufReader::new).and_then(|r| {
            cache::read(r).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
        }) {
            Ok(Some(_)) => println!("verified cache reloads"),
            Ok(None) => eprintln!("cache version mismatch on reload (unexpected just after writing)"),
            Err(e) => eprintln!("failed to reload cache: {}", e),
        }
    }

    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
