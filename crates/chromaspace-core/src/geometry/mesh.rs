//! CPU meshes in normalized (pre-embedding) coordinates.
//!
//! Vertices carry color coordinates, not render positions: the embedding
//! is applied in the vertex stage, so one subdivided unit cube becomes a
//! cube under the cartesian embedding and a cylinder under the cylindrical one.

use bytemuck::{Pod, Zeroable};

/// A single vertex: the normalized color coordinate it represents.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub input: [f32; 3],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a subdivided quad spanned by `origin + s*u + t*v`, s,t ∈ [0,1].
    fn push_grid(&mut self, origin: [f32; 3], u: [f32; 3], v: [f32; 3], nu: u32, nv: u32) {
        let base = self.vertices.len() as u32;
        for j in 0..=nv {
            let t = j as f32 / nv as f32;
            for i in 0..=nu {
                let s = i as f32 / nu as f32;
                let input = std::array::from_fn(|c| origin[c] + s * u[c] + t * v[c]);
                self.vertices.push(MeshVertex { input });
            }
        }
        let stride = nu + 1;
        for j in 0..nv {
            for i in 0..nu {
                let a = base + j * stride + i;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                self.indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }
    }
}

/// The six faces of [0,1]³, subdivided `nx × ny × nz`.
///
/// Under the cylindrical embedding X is the turn, so `nx` sets how round
/// the cylinder looks.
pub fn unit_cube(nx: u32, ny: u32, nz: u32) -> Mesh {
    let (nx, ny, nz) = (nx.max(1), ny.max(1), nz.max(1));
    let mut mesh = Mesh::default();
    const X: [f32; 3] = [1.0, 0.0, 0.0];
    const Y: [f32; 3] = [0.0, 1.0, 0.0];
    const Z: [f32; 3] = [0.0, 0.0, 1.0];

    // z = 0 and z = 1
    mesh.push_grid([0.0, 0.0, 0.0], X, Y, nx, ny);
    mesh.push_grid([0.0, 0.0, 1.0], X, Y, nx, ny);
    // y = 0 and y = 1
    mesh.push_grid([0.0, 0.0, 0.0], X, Z, nx, nz);
    mesh.push_grid([0.0, 1.0, 0.0], X, Z, nx, nz);
    // x = 0 and x = 1
    mesh.push_grid([0.0, 0.0, 0.0], Y, Z, ny, nz);
    mesh.push_grid([1.0, 0.0, 0.0], Y, Z, ny, nz);
    mesh
}

/// The [0,1]² plane at z = 0, used for axis strips.
pub fn plane(nu: u32, nv: u32) -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_grid([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], nu.max(1), nv.max(1));
    mesh
}

/// Unit sphere centered on the origin, used for cursors.
pub fn sphere(latitudes: u32, longitudes: u32) -> Mesh {
    let (lat, lon) = (latitudes.max(2), longitudes.max(3));
    let mut mesh = Mesh::default();
    for j in 0..=lat {
        let theta = std::f32::consts::PI * j as f32 / lat as f32;
        for i in 0..=lon {
            let phi = std::f32::consts::TAU * i as f32 / lon as f32;
            mesh.vertices.push(MeshVertex {
                input: [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()],
            });
        }
    }
    let stride = lon + 1;
    for j in 0..lat {
        for i in 0..lon {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}
