// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Area-weighted per-vertex normals, accumulated over each vertex's one-ring
//! triangle fan.

use glam::Vec3;

use crate::geom;

use super::*;

impl HalfEdgeMesh {
    /// Recomputes every vertex normal as the area-weighted average of its
    /// incident face normals, then clears the normals-dirty flag.
    pub fn compute_vertex_normals(&mut self) {
        for &v in &self.vertex_order {
            self.vertices[v].normal = Vec3::ZERO;
        }

        for &face in &self.face_order {
            let [a, b, c] = self.face_vertices(face);
            let (p, q, r) = (
                self.vertices[a].position,
                self.vertices[b].position,
                self.vertices[c].position,
            );
            let area = geom::triangle_area(p, q, r);
            let normal = geom::triangle_normal(p, q, r);
            let weighted = normal * area;

            self.vertices[a].normal += weighted;
            self.vertices[b].normal += weighted;
            self.vertices[c].normal += weighted;
        }

        for &v in &self.vertex_order {
            let normal = self.vertices[v].normal;
            self.vertices[v].normal = if normal == Vec3::ZERO {
                Vec3::ZERO
            } else {
                normal.normalize()
            };
        }

        self.clear_normals_dirty();
    }
}
