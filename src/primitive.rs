use glam::{DVec2, DVec3, dvec3};

use crate::{error::Error, mesh::Mesh};

impl Mesh {
    /// Makes a box with the following topology, spanning from the min point to
    /// the max point.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn quad_box(min: DVec3, max: DVec3) -> Result<Self, Error> {
        const BOX_POS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const BOX_IDX: [(u32, u32, u32, u32); 6] = [
            (0, 3, 2, 1),
            (0, 1, 5, 4),
            (1, 2, 6, 5),
            (2, 3, 7, 6),
            (3, 0, 4, 7),
            (4, 5, 6, 7),
        ];
        let mut qbox = Self::with_capacity(8, 12, 6);
        let pos = BOX_POS.map(|(xf, yf, zf)| {
            dvec3(
                if xf { max.x } else { min.x },
                if yf { max.y } else { min.y },
                if zf { max.z } else { min.z },
            )
        });
        let verts = qbox.add_vertices(&pos);
        debug_assert_eq!(verts, 0..8);
        for (a, b, c, d) in BOX_IDX {
            qbox.add_quad_face(a.into(), b.into(), c.into(), d.into())?;
        }
        Ok(qbox)
    }

    /// Create a mesh representing a box with quadrilateral faces, of size 1,
    /// spanning from the origin to (1, 1, 1).
    pub fn unit_box() -> Result<Self, Error> {
        Self::quad_box(DVec3::ZERO, DVec3::ONE)
    }

    /// Flat grid of `nx` by `ny` quads in the XY plane, with its lower left
    /// corner at the origin.
    ///
    /// Vertex `(i, j)` has the index `j * (nx + 1) + i`, and face `(i, j)` has
    /// the index `j * nx + i`.
    /// ```text
    ///    8-----9----10----11
    ///    |     |     |     |
    ///    4-----5-----6-----7
    ///    |     |     |     |
    ///    0-----1-----2-----3
    /// ```
    pub fn quad_grid(nx: u32, ny: u32, size: DVec2) -> Result<Self, Error> {
        let (nvx, nvy) = (nx + 1, ny + 1);
        let nfaces = (nx * ny) as usize;
        let nedges = (nx * nvy + ny * nvx) as usize;
        let mut mesh = Self::with_capacity((nvx * nvy) as usize, nedges, nfaces);
        let step = size / DVec2::new(nx.max(1) as f64, ny.max(1) as f64);
        for j in 0..nvy {
            for i in 0..nvx {
                mesh.add_vertex(dvec3(i as f64 * step.x, j as f64 * step.y, 0.));
            }
        }
        let vi = |i: u32, j: u32| j * nvx + i;
        for j in 0..ny {
            for i in 0..nx {
                mesh.add_quad_face(
                    vi(i, j).into(),
                    vi(i + 1, j).into(),
                    vi(i + 1, j + 1).into(),
                    vi(i, j + 1).into(),
                )?;
            }
        }
        Ok(mesh)
    }
}
