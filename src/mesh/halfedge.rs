// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;
use slotmap::SlotMap;
use smallvec::SmallVec;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// Implements indexing traits so the mesh can be accessed via ids, as if it
/// were a collection of arenas.
pub mod mesh_index_impls;

/// Builds a [`HalfEdgeMesh`] from a dense position table and a triangle
/// index table, including boundary half-edge synthesis and pair-merging.
pub mod construct;

/// One-ring traversal primitives: half-edges and vertices around a vertex,
/// valence, and the boundary predicates built on top of them.
pub mod traversal;
pub use traversal::*;

/// Vertex / edge / face counts, boundary-loop count, connected-component
/// count and genus.
pub mod stats;
pub use stats::MeshStats;

/// Area-weighted per-vertex normal computation.
pub mod normals;

/// Row-sparse neighborhood operator assembly (uniform and cotangent
/// weighting) backing both smoothers.
pub mod laplacian;
pub use laplacian::Weighting;

/// The Biconjugate-Gradient-Stabilized sparse solver used by the implicit
/// smoother.
pub mod solver;

/// Explicit and implicit Laplacian smoothing operators.
pub mod smoothing;

/// Vertex/index buffers suitable for handing to an external renderer.
pub mod render;
pub use render::RenderBuffers;

/// A mesh is intrinsically a cyclic pointer graph (twin-twin, next-prev,
/// face-edge back-references). Rather than fight Rust's ownership model with
/// `Rc<RefCell<_>>` everywhere, every entity lives in a `slotmap` arena and
/// cross-references are `u32`-backed handles (`VertexId`, `HalfEdgeId`,
/// `FaceId`). This removes lifetime entanglement entirely and makes boundary
/// merging (see `construct.rs`) a pure index manipulation.
///
/// `HalfEdge` mesh construction algorithms are intrinsically some kind of
/// linked list traversal. To keep a malformed mesh from ever causing an
/// infinite loop, ring-walking code below bails out with a panic after this
/// many steps, which should be far more than any real triangle mesh's
/// one-ring will ever need.
pub const MAX_RING_ITERATIONS: usize = 8192;

#[derive(Debug, Clone)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from. `None` once a boundary
    /// half-edge has been merged away by the constructor (see
    /// `construct.rs`); such half-edges stay allocated, but unreferenced,
    /// until the mesh is cleared.
    pub start: Option<VertexId>,
    pub next: Option<HalfEdgeId>,
    pub prev: Option<HalfEdgeId>,
    pub twin: Option<HalfEdgeId>,
    /// `None` for boundary half-edges.
    pub face: Option<FaceId>,
    /// Fixed at creation: interior half-edges are never boundary and vice
    /// versa.
    pub boundary: bool,
    /// Scratch bit, owned by whichever operator is currently running.
    /// Operators must reset it on entry; it is not assumed to start at
    /// zero.
    pub flag: bool,
    pub valid: bool,
}

impl HalfEdge {
    fn interior(start: VertexId) -> Self {
        HalfEdge {
            start: Some(start),
            next: None,
            prev: None,
            twin: None,
            face: None,
            boundary: false,
            flag: false,
            valid: true,
        }
    }

    fn boundary(start: VertexId) -> Self {
        HalfEdge {
            start: Some(start),
            next: None,
            prev: None,
            twin: None,
            face: None,
            boundary: true,
            flag: false,
            valid: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Default blue, matching the original viewer's `VCOLOR_BLUE` default.
    pub color: Vec3,
    /// Dense `0..V` index, assigned once construction completes. Stable
    /// thereafter: nothing after construction renumbers vertices.
    pub index: u32,
    /// Scratch field, e.g. for connected-component grouping. Owned by
    /// whichever operator is currently running.
    pub flag: i32,
    pub valid: bool,
    /// The most recently written outgoing half-edge. Purely a lookup aid:
    /// any one of the vertex's incident half-edges would do, since every
    /// ring traversal visits the full one-ring regardless of where it
    /// starts.
    pub(crate) halfedge: Option<HalfEdgeId>,
    /// Transient incidence multiset, populated during construction and
    /// cleared once boundary merging completes. Not meaningful afterwards.
    pub(crate) adjacent: SmallVec<[HalfEdgeId; 8]>,
}

pub const VERTEX_COLOR_BLUE: Vec3 = Vec3::new(0.2, 0.4, 1.0);

impl Vertex {
    fn new(position: Vec3) -> Self {
        Vertex {
            position,
            normal: Vec3::ZERO,
            color: VERTEX_COLOR_BLUE,
            index: 0,
            flag: 0,
            valid: true,
            halfedge: None,
            adjacent: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Face {
    pub halfedge: Option<HalfEdgeId>,
    pub valid: bool,
}

/// Owns the three entity arenas, the dense ordered id sequences derived from
/// them, and the dirty flags an external renderer polls.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) halfedges: SlotMap<HalfEdgeId, HalfEdge>,
    pub(crate) faces: SlotMap<FaceId, Face>,

    /// Vertices in construction order; `vertex_order[i]` is the vertex whose
    /// `index` field equals `i`.
    pub(crate) vertex_order: Vec<VertexId>,
    /// All interior half-edges, one per face corner.
    pub(crate) interior_halfedges: Vec<HalfEdgeId>,
    /// Boundary half-edges still in use after merging (i.e. `start.is_some()`).
    pub(crate) boundary_halfedges: Vec<HalfEdgeId>,
    /// All faces, in construction order.
    pub(crate) face_order: Vec<FaceId>,

    positions_dirty: bool,
    normals_dirty: bool,
    colors_dirty: bool,
}

impl HalfEdgeMesh {
    pub(crate) fn empty() -> Self {
        HalfEdgeMesh {
            vertices: SlotMap::with_key(),
            halfedges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            vertex_order: Vec::new(),
            interior_halfedges: Vec::new(),
            boundary_halfedges: Vec::new(),
            face_order: Vec::new(),
            positions_dirty: true,
            normals_dirty: true,
            colors_dirty: true,
        }
    }

    /// Releases all entities and resets the dirty flags, as if the mesh had
    /// just been created.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_order.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_order.len()
    }

    pub fn num_interior_halfedges(&self) -> usize {
        self.interior_halfedges.len()
    }

    pub fn num_boundary_halfedges(&self) -> usize {
        self.boundary_halfedges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_order.iter().copied()
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_order.iter().copied()
    }

    pub fn interior_halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.interior_halfedges.iter().copied()
    }

    pub fn boundary_halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.boundary_halfedges.iter().copied()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self[id]
    }

    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self[id]
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self[id]
    }

    /// The other two half-edges of a face's triangle, reached by following
    /// `next` from its designated half-edge.
    pub fn face_halfedges(&self, face: FaceId) -> [HalfEdgeId; 3] {
        let h0 = self[face].halfedge.expect("face should have a halfedge");
        let h1 = self[h0].next.expect("interior halfedge should have a next");
        let h2 = self[h1].next.expect("interior halfedge should have a next");
        [h0, h1, h2]
    }

    pub fn face_vertices(&self, face: FaceId) -> [VertexId; 3] {
        self.face_halfedges(face)
            .map(|h| self[h].start.expect("interior halfedge should have a start"))
    }

    pub fn is_boundary_face(&self, face: FaceId) -> bool {
        self.face_halfedges(face).iter().any(|&h| {
            let twin = self[h].twin.expect("interior halfedge should have a twin");
            self[twin].boundary
        })
    }

    pub fn positions_dirty(&self) -> bool {
        self.positions_dirty
    }

    pub fn normals_dirty(&self) -> bool {
        self.normals_dirty
    }

    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    pub fn mark_positions_dirty(&mut self) {
        self.positions_dirty = true;
    }

    pub fn mark_normals_dirty(&mut self) {
        self.normals_dirty = true;
    }

    pub fn mark_colors_dirty(&mut self) {
        self.colors_dirty = true;
    }

    pub fn clear_positions_dirty(&mut self) {
        self.positions_dirty = false;
    }

    pub fn clear_normals_dirty(&mut self) {
        self.normals_dirty = false;
    }

    pub fn clear_colors_dirty(&mut self) {
        self.colors_dirty = false;
    }
}
