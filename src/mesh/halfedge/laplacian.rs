// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Row-sparse neighborhood averaging operator `W`, assembled with either
//! uniform or cotangent weighting. The Laplacian itself is `P = W - I`; both
//! the explicit and implicit smoothers build on top of it.

use ndarray::Array1;
use smallvec::SmallVec;

use crate::geom;

use super::*;

/// Selects how neighbor contributions are weighted when assembling `W`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// `w_ij = 1 / valence(i)` for every neighbor `j`.
    Uniform,
    /// `w_ij = (cot(alpha_ij) + cot(beta_ij))`, row-normalized to sum to 1.
    Cotangent,
}

/// A row-sparse, row-stochastic neighbor-averaging operator over a mesh's
/// dense vertex indices.
#[derive(Debug, Clone)]
pub struct SparseLaplacian {
    rows: Vec<SmallVec<[(u32, f64); 8]>>,
}

impl SparseLaplacian {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.rows[i].iter().map(|&(_, w)| w).sum()
    }

    /// Number of neighbor entries stored for row `i`. Exposed mainly so
    /// tests can confirm every one-ring neighbor made it into the row,
    /// rather than just that whatever did sum to one.
    pub fn row_len(&self, i: usize) -> usize {
        self.rows[i].len()
    }

    /// The weighted-neighbor-average `W * x`.
    pub fn average(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            out[i] = row.iter().map(|&(j, w)| w * x[j as usize]).sum();
        }
        out
    }

    /// The explicit Laplacian operator `P * x = W * x - x`.
    pub fn matvec(&self, x: &Array1<f64>) -> Array1<f64> {
        self.average(x) - x
    }

    /// The implicit system's matrix-vector product, `(I - lambda * P) * x`,
    /// as needed by the BiCGSTAB solver.
    pub fn implicit_matvec(&self, x: &Array1<f64>, lambda: f64) -> Array1<f64> {
        x - lambda * self.matvec(x)
    }
}

impl HalfEdgeMesh {
    /// Assembles the neighbor-averaging operator over this mesh's vertices.
    pub fn assemble_laplacian(&self, weighting: Weighting) -> SparseLaplacian {
        let n = self.num_vertices();
        let mut rows = vec![SmallVec::new(); n];

        for &v in &self.vertex_order {
            let i = self.vertices[v].index as usize;
            rows[i] = match weighting {
                Weighting::Uniform => self.uniform_row(v),
                Weighting::Cotangent => self.cotangent_row(v),
            };
        }

        SparseLaplacian { rows }
    }

    fn uniform_row(&self, v: VertexId) -> SmallVec<[(u32, f64); 8]> {
        let neighbors: Vec<VertexId> = self.one_ring_vertices(v).collect();
        let valence = neighbors.len();
        if valence == 0 {
            return SmallVec::new();
        }
        let w = 1.0 / valence as f64;
        neighbors
            .into_iter()
            .map(|nb| (self[nb].index, w))
            .collect()
    }

    fn cotangent_row(&self, v: VertexId) -> SmallVec<[(u32, f64); 8]> {
        let p = self[v].position;
        let mut raw: SmallVec<[(u32, f64); 8]> = SmallVec::new();

        // Every one-ring slot contributes an entry, whether the outgoing
        // half-edge for that slot is itself interior or boundary: a mesh
        // boundary edge's *interior* representative starts at whichever
        // endpoint the original triangle wound it from, which need not be
        // `v`, so the slot reached from `v` is sometimes the boundary
        // half-edge itself. Skipping those entirely (as opposed to just
        // skipping their own missing face) used to drop that neighbor from
        // the row altogether.
        for h in self.one_ring_halfedges(v) {
            let next = self[h].next.expect("halfedge should have a next");
            let neighbor = self[next].start.expect("halfedge should have a start");
            let q = self[neighbor].position;

            let mut weight = 0.0;

            if !self[h].boundary {
                let opposite = self[next].next.expect("interior halfedge should have a next");
                let third = self[opposite]
                    .start
                    .expect("interior halfedge should have a start");
                weight += geom::triangle_cot(self[third].position, p, q) as f64;
            }

            let twin = self[h].twin.expect("halfedge should have a twin");
            if !self[twin].boundary {
                let twin_next = self[twin]
                    .next
                    .expect("interior halfedge should have a next");
                let twin_opposite = self[twin_next]
                    .next
                    .expect("interior halfedge should have a next");
                let twin_third = self[twin_opposite]
                    .start
                    .expect("interior halfedge should have a start");
                weight += geom::triangle_cot(self[twin_third].position, q, p) as f64;
            }

            raw.push((self[neighbor].index, weight));
        }

        let total: f64 = raw.iter().map(|&(_, w)| w).sum();
        if total.abs() > 1e-12 {
            for entry in raw.iter_mut() {
                entry.1 /= total;
            }
            raw
        } else {
            self.uniform_row(v)
        }
    }
}

#[cfg(test)]
mod test {
    use glam::Vec3;

    use super::*;

    fn hex_fan() -> HalfEdgeMesh {
        let mut positions = vec![Vec3::ZERO];
        let rim = 6;
        for i in 0..rim {
            let theta = std::f32::consts::TAU * (i as f32) / (rim as f32);
            positions.push(Vec3::new(theta.cos(), theta.sin(), 0.0));
        }
        let mut triangles = vec![];
        for i in 0..rim {
            let a = 1 + i as u32;
            let b = 1 + ((i + 1) % rim) as u32;
            triangles.push([0u32, a, b]);
        }
        HalfEdgeMesh::build_from_triangles(&positions, &triangles).unwrap()
    }

    #[test]
    fn uniform_rows_sum_to_one() {
        let mesh = hex_fan();
        let op = mesh.assemble_laplacian(Weighting::Uniform);
        for i in 0..op.len() {
            assert!((op.row_sum(i) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cotangent_rows_sum_to_one() {
        let mesh = hex_fan();
        let op = mesh.assemble_laplacian(Weighting::Cotangent);
        for i in 0..op.len() {
            assert!((op.row_sum(i) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn cotangent_row_keeps_every_one_ring_neighbor_on_the_boundary() {
        // Rim vertices of the hex fan are boundary vertices whose two rim
        // edges are each owned, on the interior side, by a different
        // endpoint (one rim edge's interior halfedge starts at this vertex,
        // the other's starts at the neighboring rim vertex). A cotangent row
        // that only followed its own interior outgoing halfedges would miss
        // the neighbor reached through the other rim edge entirely.
        let mesh = hex_fan();
        let op = mesh.assemble_laplacian(Weighting::Cotangent);
        let rim_vertex = mesh.vertex_ids().nth(1).unwrap();
        assert_eq!(mesh.valence(rim_vertex), 3);
        assert_eq!(op.row_len(mesh[rim_vertex].index as usize), 3);
    }

    #[test]
    fn single_triangle_cotangent_row_covers_both_neighbors() {
        // Every vertex of a lone triangle is a boundary vertex with
        // valence 2; both neighbors must appear in the cotangent row even
        // though one of the two incident edges is represented, from this
        // vertex, only by a boundary outgoing halfedge.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        let op = mesh.assemble_laplacian(Weighting::Cotangent);
        for v in mesh.vertex_ids() {
            assert_eq!(op.row_len(mesh[v].index as usize), 2);
        }
    }

    #[test]
    fn laplacian_of_constant_field_is_zero() {
        let mesh = hex_fan();
        let op = mesh.assemble_laplacian(Weighting::Uniform);
        let x = Array1::from_elem(op.len(), 3.5);
        let px = op.matvec(&x);
        for &value in px.iter() {
            assert!(value.abs() < 1e-9);
        }
    }
}
