// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat vertex/index buffers handed off to an external renderer. The mesh
//! itself never touches a GPU; this is the one place its dense vertex order
//! becomes visible outside the crate.

use glam::Vec3;

use super::*;

/// Position, normal and color buffers in dense vertex-index order, plus a
/// flat `3 * num_faces` triangle index buffer.
#[derive(Debug, Clone)]
pub struct RenderBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl HalfEdgeMesh {
    /// Builds render buffers from the current positions/normals/colors and
    /// clears the dirty flags, as if a renderer had just consumed them.
    pub fn generate_render_buffers(&mut self) -> RenderBuffers {
        let n = self.num_vertices();
        let mut positions = vec![Vec3::ZERO; n];
        let mut normals = vec![Vec3::ZERO; n];
        let mut colors = vec![Vec3::ZERO; n];

        for &v in &self.vertex_order {
            let i = self.vertices[v].index as usize;
            let vertex = &self.vertices[v];
            positions[i] = vertex.position;
            normals[i] = vertex.normal;
            colors[i] = vertex.color;
        }

        let mut indices = Vec::with_capacity(self.num_faces() * 3);
        for &face in &self.face_order {
            for v in self.face_vertices(face) {
                indices.push(self.vertices[v].index);
            }
        }

        self.clear_positions_dirty();
        self.clear_normals_dirty();
        self.clear_colors_dirty();

        RenderBuffers {
            positions,
            normals,
            colors,
            indices,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_buffer_references_every_vertex() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh = HalfEdgeMesh::build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        mesh.compute_vertex_normals();
        let buffers = mesh.generate_render_buffers();
        assert_eq!(buffers.positions.len(), 3);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
        assert!(!mesh.positions_dirty());
        assert!(!mesh.colors_dirty());
    }
}
