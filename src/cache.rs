//! Persistent sub-BVH cache file (spec.md 6.1): a little-endian,
//! unpadded binary dump of a build's node array and reordered triangle
//! buffer, so a rebuild can be skipped across runs when the source mesh
//! hasn't changed.
//!
//! Grounded on `ssoj13-alembic-rs/src/util/error.rs`'s error-taxonomy
//! style (`thiserror`, `#[from] std::io::Error`) and its binary reader's
//! use of explicit magic/version fields to reject a stale file rather
//! than trying to interpret it.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytemuck::{Pod, Zeroable};

use crate::error::{BvhError, Result};
use crate::geometry::Triangle;
use crate::nodes::SubBvhNode;

const FORMAT_VERSION: u32 = 1;

/// Sanity ceiling on a single header count's implied allocation size, so a
/// corrupt or adversarial count can't drive an out-of-memory allocation
/// before the read even has a chance to hit EOF and report `CorruptCache`
/// the normal way.
const MAX_CACHE_ALLOC_BYTES: usize = 1 << 30;

/// A loaded (or about-to-be-written) sub-BVH cache entry.
#[derive(Debug, Clone)]
pub struct CachedBvh {
    pub root_index: u32,
    pub nodes: Vec<SubBvhNode>,
    pub triangles: Vec<Triangle>,
}

/// Write a cache file. Format: version, root index, node count + nodes,
/// triangle count + triangles, trailing newline.
pub fn write<W: Write>(mut w: W, cache: &CachedBvh) -> Result<()> {
    w.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    w.write_u32::<LittleEndian>(cache.root_index)?;

    w.write_u32::<LittleEndian>(cache.nodes.len() as u32)?;
    for node in &cache.nodes {
        w.write_all(bytemuck::bytes_of(node))?;
    }

    w.write_u32::<LittleEndian>(cache.triangles.len() as u32)?;
    for tri in &cache.triangles {
        w.write_all(bytemuck::bytes_of(tri))?;
    }

    w.write_all(b"\n")?;
    Ok(())
}

/// Read a cache file. Returns `Ok(None)` on a version mismatch (spec's
/// `FileVersionMismatch` — not an error, just "go rebuild"); returns
/// `Err(BvhError::CorruptCache)` on a short read or an implausible count
/// that would overflow the allocation.
pub fn read<R: Read>(mut r: R) -> Result<Option<CachedBvh>> {
    let version = r.read_u32::<LittleEndian>().map_err(eof_to_corrupt)?;
    if version != FORMAT_VERSION {
        return Ok(None);
    }

    let root_index = r.read_u32::<LittleEndian>().map_err(eof_to_corrupt)?;

    let node_count = r.read_u32::<LittleEndian>().map_err(eof_to_corrupt)? as usize;
    check_alloc_size(node_count, std::mem::size_of::<SubBvhNode>())?;
    let mut nodes = vec![SubBvhNode::zeroed(); node_count];
    for node in &mut nodes {
        read_pod(&mut r, node)?;
    }

    let triangle_count = r.read_u32::<LittleEndian>().map_err(eof_to_corrupt)? as usize;
    check_alloc_size(triangle_count, std::mem::size_of::<Triangle>())?;
    let mut triangles = vec![Triangle::zeroed(); triangle_count];
    for tri in &mut triangles {
        read_pod(&mut r, tri)?;
    }

    if root_index as usize >= nodes.len().max(1) && node_count > 0 {
        return Err(BvhError::CorruptCache(format!(
            "root index {} out of range for {} nodes",
            root_index, node_count
        )));
    }

    Ok(Some(CachedBvh { root_index, nodes, triangles }))
}

/// Reject a header count whose implied allocation overflows `usize` or
/// exceeds `MAX_CACHE_ALLOC_BYTES`, before `vec![_; count]` ever runs.
fn check_alloc_size(count: usize, element_size: usize) -> Result<()> {
    match count.checked_mul(element_size) {
        Some(bytes) if bytes <= MAX_CACHE_ALLOC_BYTES => Ok(()),
        _ => Err(BvhError::CorruptCache(format!(
            "count {} of {}-byte elements exceeds the {}-byte cache allocation ceiling",
            count, element_size, MAX_CACHE_ALLOC_BYTES
        ))),
    }
}

fn read_pod<R: Read, T: Pod>(r: &mut R, out: &mut T) -> Result<()> {
    let bytes = bytemuck::bytes_of_mut(out);
    r.read_exact(bytes).map_err(eof_to_corrupt)
}

fn eof_to_corrupt(e: std::io::Error) -> BvhError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        BvhError::CorruptCache("file is shorter than its header claims".into())
    } else {
        BvhError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    fn sample() -> CachedBvh {
        let mut node = SubBvhNode::empty();
        node.set_bounds(crate::aabb::Aabb32::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)));
        node.make_leaf(0, 1);
        CachedBvh { root_index: 0, nodes: vec![node], triangles: vec![Triangle::new([0, 1, 2], 0)] }
    }

    #[test]
    fn round_trips_through_a_byte_buffer() {
        let cache = sample();
        let mut buf = Vec::new();
        write(&mut buf, &cache).unwrap();

        let loaded = read(&buf[..]).unwrap().unwrap();
        assert_eq!(loaded.root_index, cache.root_index);
        assert_eq!(loaded.nodes, cache.nodes);
        assert_eq!(loaded.triangles, cache.triangles);
    }

    #[test]
    fn version_mismatch_yields_none_not_an_error() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(999).unwrap();
        let result = read(&buf[..]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn implausible_node_count_is_rejected_before_allocating() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(FORMAT_VERSION).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(u32::MAX).unwrap();

        let err = read(&buf[..]).unwrap_err();
        assert!(matches!(err, BvhError::CorruptCache(_)));
    }

    #[test]
    fn truncated_file_is_corrupt_cache_error() {
        let cache = sample();
        let mut buf = Vec::new();
        write(&mut buf, &cache).unwrap();
        buf.truncate(buf.len() - 10);

        let err = read(&buf[..]).unwrap_err();
        assert!(matches!(err, BvhError::CorruptCache(_)));
    }
}
