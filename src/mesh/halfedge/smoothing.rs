// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Explicit and implicit Laplacian smoothing, each available with uniform or
//! cotangent weighting. Explicit smoothing is a single operator application;
//! implicit smoothing solves one linear system per axis with [`solver::bicgstab`].

use glam::Vec3;
use ndarray::Array1;

use super::laplacian::Weighting;
use super::solver::{self, SolveReport};
use super::*;

fn gather_axes(mesh: &HalfEdgeMesh) -> [Array1<f64>; 3] {
    let n = mesh.num_vertices();
    let mut xs = Array1::zeros(n);
    let mut ys = Array1::zeros(n);
    let mut zs = Array1::zeros(n);
    for &v in &mesh.vertex_order {
        let i = mesh[v].index as usize;
        let p = mesh[v].position;
        xs[i] = p.x as f64;
        ys[i] = p.y as f64;
        zs[i] = p.z as f64;
    }
    [xs, ys, zs]
}

fn scatter_axes(mesh: &mut HalfEdgeMesh, axes: &[Array1<f64>; 3]) {
    for &v in &mesh.vertex_order {
        let i = mesh[v].index as usize;
        mesh.vertices[v].position = Vec3::new(
            axes[0][i] as f32,
            axes[1][i] as f32,
            axes[2][i] as f32,
        );
    }
}

impl HalfEdgeMesh {
    /// One explicit smoothing pass with uniform weighting:
    /// `X' = X + lambda * P_uniform * X`.
    pub fn explicit_smooth_uniform(&mut self, lambda: f64) {
        self.explicit_smooth(Weighting::Uniform, lambda)
    }

    /// One explicit smoothing pass with cotangent weighting:
    /// `X' = X + lambda * P_cotangent * X`.
    pub fn explicit_smooth_cotangent(&mut self, lambda: f64) {
        self.explicit_smooth(Weighting::Cotangent, lambda)
    }

    fn explicit_smooth(&mut self, weighting: Weighting, lambda: f64) {
        let op = self.assemble_laplacian(weighting);
        let axes = gather_axes(self);

        let smoothed: [Array1<f64>; 3] = std::array::from_fn(|k| {
            let p = op.matvec(&axes[k]);
            &axes[k] + lambda * p
        });

        scatter_axes(self, &smoothed);
        self.mark_positions_dirty();
        self.compute_vertex_normals();
    }

    /// Implicit smoothing: solves `(I - lambda * P) X' = X` independently for
    /// each of the x/y/z axes via BiCGSTAB, using the current positions as
    /// both the right-hand side and the warm-start guess. Returns one
    /// [`SolveReport`] per axis.
    pub fn implicit_smooth(
        &mut self,
        weighting: Weighting,
        lambda: f64,
        max_iters: usize,
        tolerance: f64,
    ) -> [SolveReport; 3] {
        let op = self.assemble_laplacian(weighting);
        let axes = gather_axes(self);

        let solve_axis = |b: &Array1<f64>| -> (Array1<f64>, SolveReport) {
            solver::bicgstab(
                |x: &Array1<f64>| op.implicit_matvec(x, lambda),
                b,
                b.clone(),
                max_iters,
                tolerance,
            )
        };

        let (x_sol, rx) = solve_axis(&axes[0]);
        let (y_sol, ry) = solve_axis(&axes[1]);
        let (z_sol, rz) = solve_axis(&axes[2]);

        scatter_axes(self, &[x_sol, y_sol, z_sol]);
        self.mark_positions_dirty();
        self.compute_vertex_normals();

        [rx, ry, rz]
    }
}

#[cfg(test)]
mod test {
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
    fn explicit_smoothing_keeps_centroid_fixed() {
        let mut mesh = hex_fan();
        let centroid_before: Vec3 =
            mesh.vertex_ids().map(|v| mesh[v].position).sum::<Vec3>() / mesh.num_vertices() as f32;

        mesh.explicit_smooth_uniform(0.3);

        let centroid_after: Vec3 =
            mesh.vertex_ids().map(|v| mesh[v].position).sum::<Vec3>() / mesh.num_vertices() as f32;
        assert!((centroid_before - centroid_after).length() < 1e-4);
    }

    #[test]
    fn implicit_smoothing_keeps_symmetric_fan_center_at_origin() {
        let mut mesh = hex_fan();
        let center = mesh.vertex_ids().next().unwrap();

        let reports = mesh.implicit_smooth(Weighting::Uniform, 0.5, 500, 1e-9);
        for report in reports {
            assert!(report.converged);
        }

        assert!(mesh.vertex(center).position.length() < 1e-4);
    }
}
