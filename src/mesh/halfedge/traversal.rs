// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-ring traversal: walking the half-edges (and, derived from them, the
//! vertices) incident to a vertex by repeatedly stepping `prev -> twin`.

use super::*;

/// Iterates the half-edges outgoing from a vertex, in fan order. Yields
/// every interior half-edge around the vertex plus, if the vertex sits on a
/// boundary loop, exactly one boundary half-edge.
pub struct OneRingHalfEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: Option<HalfEdgeId>,
    steps: usize,
}

impl<'a> Iterator for OneRingHalfEdges<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let current = self.current?;
        self.steps += 1;
        assert!(
            self.steps <= MAX_RING_ITERATIONS,
            "one-ring traversal exceeded {} steps; mesh is malformed",
            MAX_RING_ITERATIONS
        );

        let prev = self.mesh[current]
            .prev
            .expect("halfedge should have a prev");
        let stepped = self.mesh[prev].twin.expect("halfedge should have a twin");
        self.current = if stepped == self.start {
            None
        } else {
            Some(stepped)
        };
        Some(current)
    }
}

impl HalfEdgeMesh {
    /// The half-edges outgoing from `vertex`, starting at its designated
    /// half-edge and walking `prev -> twin` until the fan closes.
    pub fn one_ring_halfedges(&self, vertex: VertexId) -> OneRingHalfEdges<'_> {
        let start = self[vertex]
            .halfedge
            .expect("vertex should have a halfedge");
        OneRingHalfEdges {
            mesh: self,
            start,
            current: Some(start),
            steps: 0,
        }
    }

    /// The vertices at the far end of each one-ring half-edge, i.e. the
    /// immediate neighbors of `vertex`.
    pub fn one_ring_vertices(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.one_ring_halfedges(vertex).map(move |h| {
            let next = self[h].next.expect("halfedge should have a next");
            self[next].start.expect("halfedge should have a start")
        })
    }

    /// Number of edges incident to `vertex` (counting a boundary gap, if
    /// present, as one edge).
    pub fn valence(&self, vertex: VertexId) -> usize {
        self.one_ring_halfedges(vertex).count()
    }

    /// Whether `vertex` lies on a boundary loop.
    pub fn is_boundary_vertex(&self, vertex: VertexId) -> bool {
        self.one_ring_halfedges(vertex).any(|h| self[h].boundary)
    }
}
