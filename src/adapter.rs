use arrayvec::ArrayVec;
use glam::DVec3;

use crate::{
    element::{EH, FH, HH, Handle, VH},
    error::Error,
    mesh::Mesh,
    status::Status,
};

/// One corner of a face loop: a halfedge of the face, its edge, and the two
/// vertices it runs between in the winding direction of the face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    pub halfedge: HH,
    pub edge: EH,
    pub start: VH,
    pub end: VH,
}

/// Everything the connect operation needs from the mesh it edits.
///
/// The operation only ever appends elements through this trait, so handles
/// that exist before a rebuild keep pointing at the same elements until the
/// mesh is replaced by a clone of its snapshot.
pub trait GeometryAdapter: Clone {
    fn num_edges(&self) -> usize;

    /// The faces on either side of an edge. Boundary edges have one.
    fn edge_faces(&self, e: EH) -> ArrayVec<FH, 2>;

    fn edge_vertices(&self, e: EH) -> (VH, VH);

    /// Corners of a face in winding order. Repeated calls on an unmodified
    /// face start at the same corner.
    fn face_loop(&self, f: FH) -> Vec<Corner>;

    /// Split `e` with a new vertex `fraction` of the way from `start`. The new
    /// edge spans `start` to the new vertex, `e` keeps the rest.
    fn split_edge(&mut self, e: EH, start: VH, fraction: f64) -> Result<(VH, EH), Error>;

    /// Split a face along non crossing edges connecting pairs of its
    /// vertices.
    fn split_face_edgenet(&mut self, f: FH, bridges: &[(VH, VH)]) -> Result<Vec<FH>, Error>;

    fn point(&self, v: VH) -> Result<DVec3, Error>;

    fn set_point(&mut self, v: VH, pos: DVec3) -> Result<(), Error>;

    fn edge_status(&self, e: EH) -> Result<Status, Error>;

    fn set_edge_status(&mut self, e: EH, status: Status) -> Result<(), Error>;

    /// Clear the selected and tagged flags of every element.
    fn clear_selection(&mut self);

    fn is_valid_edge(&self, e: EH) -> bool {
        (e.index() as usize) < self.num_edges()
    }

    fn edge_length(&self, e: EH) -> Result<f64, Error> {
        let (a, b) = self.edge_vertices(e);
        Ok(self.point(a)?.distance(self.point(b)?))
    }

    /// Modify the status of an edge in place.
    fn update_edge_status(&mut self, e: EH, f: impl FnOnce(&mut Status)) -> Result<(), Error> {
        let mut status = self.edge_status(e)?;
        f(&mut status);
        self.set_edge_status(e, status)
    }

    /// Handles of all edges with the selected flag set, in ascending order.
    fn selected_edges(&self) -> Vec<EH> {
        (0..(self.num_edges() as u32))
            .map(EH::from)
            .filter(|e| self.edge_status(*e).is_ok_and(|s| s.selected()))
            .collect()
    }
}

impl GeometryAdapter for Mesh {
    fn num_edges(&self) -> usize {
        Mesh::num_edges(self)
    }

    fn edge_faces(&self, e: EH) -> ArrayVec<FH, 2> {
        self.ef_iter(e).collect()
    }

    fn edge_vertices(&self, e: EH) -> (VH, VH) {
        Mesh::edge_vertices(self, e)
    }

    fn face_loop(&self, f: FH) -> Vec<Corner> {
        self.fh_ccw_iter(f)
            .map(|h| Corner {
                halfedge: h,
                edge: h.edge(),
                start: self.from_vertex(h),
                end: self.to_vertex(h),
            })
            .collect()
    }

    fn split_edge(&mut self, e: EH, start: VH, fraction: f64) -> Result<(VH, EH), Error> {
        Mesh::split_edge(self, e, start, fraction)
    }

    fn split_face_edgenet(&mut self, f: FH, bridges: &[(VH, VH)]) -> Result<Vec<FH>, Error> {
        Mesh::split_face_edgenet(self, f, bridges)
    }

    fn point(&self, v: VH) -> Result<DVec3, Error> {
        Mesh::point(self, v)
    }

    fn set_point(&mut self, v: VH, pos: DVec3) -> Result<(), Error> {
        Mesh::set_point(self, v, pos)
    }

    fn edge_status(&self, e: EH) -> Result<Status, Error> {
        Mesh::edge_status(self, e)
    }

    /// Also flushes the selected flag to the two vertices of the edge.
    fn set_edge_status(&mut self, e: EH, status: Status) -> Result<(), Error> {
        Mesh::set_edge_status(self, e, status)?;
        if status.selected() {
            self.select_edge(e, true)?;
        }
        Ok(())
    }

    fn clear_selection(&mut self) {
        Mesh::clear_selection(self)
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use super::GeometryAdapter;
    use crate::{element::Handle, mesh::Mesh};

    #[test]
    fn t_face_loop_is_stable() {
        let mesh = Mesh::unit_box().expect("Cannot create box");
        for f in mesh.faces() {
            let corners = mesh.face_loop(f);
            assert_eq!(corners.len(), 4);
            assert_eq!(corners, mesh.face_loop(f));
            for (i, c) in corners.iter().enumerate() {
                assert_eq!(c.end, corners[(i + 1) % 4].start);
                assert_eq!(c.edge, c.halfedge.edge());
            }
        }
        // The loop starts at the edge running from the last vertex to the
        // first vertex of the face.
        let starts: Vec<u32> = mesh
            .face_loop(1.into())
            .iter()
            .map(|c| c.start.index())
            .collect();
        assert_eq!(starts, [4, 0, 1, 5]);
    }

    #[test]
    fn t_selected_edges_and_status() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        let e = mesh
            .find_edge(0.into(), 1.into())
            .expect("Cannot find edge");
        assert!(GeometryAdapter::selected_edges(&mesh).is_empty());
        mesh.update_edge_status(e, |s| s.set_selected(true))
            .expect("Cannot update status");
        assert_eq!(GeometryAdapter::selected_edges(&mesh), [e]);
        assert!(
            mesh.vertex_status(1.into())
                .expect("Cannot read status")
                .selected()
        );
        assert_eq!(mesh.edge_faces(e).len(), 2);
        assert_eq!(GeometryAdapter::edge_length(&mesh, e).expect("No length"), 1.);
        let (v, _) =
            GeometryAdapter::split_edge(&mut mesh, e, 1.into(), 0.5).expect("Cannot split");
        assert_eq!(mesh.point(v).expect("Cannot read point"), dvec3(0.5, 0., 0.));
        GeometryAdapter::clear_selection(&mut mesh);
        assert!(GeometryAdapter::selected_edges(&mesh).is_empty());
    }
}
