// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction-time failures. Everything past construction that can break
//! (a half-edge with no `next`, a vertex with no designated half-edge) only
//! happens on a mesh that construction itself would have rejected, so those
//! cases panic instead of threading a `Result` through every traversal.

use thiserror::Error;

use crate::mesh::halfedge::VertexId;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("polygon has only {0} vertices, triangles need at least 3")]
    DegeneratePolygon(usize),

    #[error("triangle index {0} is out of range for a {1}-vertex position table")]
    IndexOutOfRange(u32, usize),

    #[error("directed edge ({0:?} -> {1:?}) appears in more than one face; surface is non-manifold or inconsistently wound")]
    DuplicateDirectedEdge(u32, u32),

    #[error("vertex {0:?} is not referenced by any triangle")]
    DisconnectedVertex(VertexId),

    #[error("vertex {0:?} one-ring is not a closed fan; mesh is non-manifold at this vertex")]
    NonManifoldVertex(VertexId),
}
