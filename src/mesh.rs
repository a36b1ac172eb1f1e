use glam::DVec3;

use crate::{
    element::{EH, FH, HH, HasTopology, VH},
    error::Error,
    iterator,
    property::{EProperty, VProperty},
    status::Status,
    topol::{TopolCache, Topology},
};

/// Polygon mesh with 64 bit vertex positions and per element status flags.
///
/// Cloning a mesh produces a fully independent copy, which is how the connect
/// session keeps the snapshot it rebuilds from.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub(crate) topol: Topology,
    pub(crate) points: VProperty<DVec3>,
    pub(crate) vstatus: VProperty<Status>,
    pub(crate) estatus: EProperty<Status>,
}

/// Two meshes are equal when they have identical connectivity, positions and
/// status flags.
impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.topol == other.topol
            && *self.points == *other.points
            && *self.vstatus == *other.vstatus
            && *self.estatus == *other.estatus
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HasTopology for Mesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl Mesh {
    pub fn new() -> Self {
        Mesh {
            topol: Topology::new(),
            points: VProperty::new(DVec3::ZERO),
            vstatus: VProperty::new(Status::default()),
            estatus: EProperty::new(Status::default()),
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        Mesh {
            topol: Topology::with_capacity(nverts, nedges, nfaces),
            points: VProperty::with_capacity(nverts, DVec3::ZERO),
            vstatus: VProperty::with_capacity(nverts, Status::default()),
            estatus: EProperty::with_capacity(nedges, Status::default()),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        self.topol.halfedges()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.topol.faces()
    }

    pub fn point(&self, v: VH) -> Result<DVec3, Error> {
        self.points.get(v)
    }

    pub fn set_point(&mut self, v: VH, pos: DVec3) -> Result<(), Error> {
        self.points.set(v, pos)
    }

    /// All vertex positions, indexed by vertex.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn vertex_status(&self, v: VH) -> Result<Status, Error> {
        self.vstatus.get(v)
    }

    pub fn set_vertex_status(&mut self, v: VH, status: Status) -> Result<(), Error> {
        self.vstatus.set(v, status)
    }

    pub fn edge_status(&self, e: EH) -> Result<Status, Error> {
        self.estatus.get(e)
    }

    pub fn set_edge_status(&mut self, e: EH, status: Status) -> Result<(), Error> {
        self.estatus.set(e, status)
    }

    /// Mark an edge and its two vertices as selected or deselected.
    pub fn select_edge(&mut self, e: EH, flag: bool) -> Result<(), Error> {
        self.estatus.get(e)?;
        self.estatus[e].set_selected(flag);
        let (h, oh) = e.halfedges();
        for v in [self.topol.to_vertex(h), self.topol.to_vertex(oh)] {
            self.vstatus[v].set_selected(flag);
        }
        Ok(())
    }

    /// Edges whose selected flag is set.
    pub fn selected_edges(&self) -> impl Iterator<Item = EH> + use<'_> {
        self.edges().filter(|e| self.estatus[*e].selected())
    }

    /// Clear the selected and tagged flags of every vertex and edge.
    pub fn clear_selection(&mut self) {
        for s in self.vstatus.iter_mut().chain(self.estatus.iter_mut()) {
            s.set_selected(false);
            s.set_tagged(false);
            s.set_bridge(false);
        }
    }

    pub fn from_vertex(&self, h: HH) -> VH {
        self.topol.from_vertex(h)
    }

    pub fn to_vertex(&self, h: HH) -> VH {
        self.topol.to_vertex(h)
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.topol.next_halfedge(h)
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.topol.halfedge_face(h)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.topol.find_halfedge(from, to)
    }

    /// The edge connecting the two vertices, if there is one.
    pub fn find_edge(&self, a: VH, b: VH) -> Option<EH> {
        self.find_halfedge(a, b).map(|h| h.edge())
    }

    pub fn face_valence(&self, f: FH) -> usize {
        self.topol.face_valence(f)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        self.topol.vertex_valence(v)
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        self.topol.is_boundary_edge(e)
    }

    /// The two end points of the edge, in the order of its first halfedge.
    pub fn edge_vertices(&self, e: EH) -> (VH, VH) {
        let h = e.halfedge(false);
        (self.topol.from_vertex(h), self.topol.to_vertex(h))
    }

    pub fn edge_length(&self, e: EH) -> Result<f64, Error> {
        let (a, b) = self.edge_vertices(e);
        Ok(self.point(a)?.distance(self.point(b)?))
    }

    pub fn fh_ccw_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_ccw_iter(&self.topol, f)
    }

    pub fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_ccw_iter(&self.topol, f)
    }

    pub fn fe_ccw_iter(&self, f: FH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::fe_ccw_iter(&self.topol, f)
    }

    pub fn ef_iter(&self, e: EH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ef_iter(&self.topol, e)
    }

    pub fn vf_ccw_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_ccw_iter(&self.topol, v)
    }

    pub fn vv_ccw_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_ccw_iter(&self.topol, v)
    }

    pub fn add_vertex(&mut self, pos: DVec3) -> VH {
        let v = self.topol.add_vertex();
        self.points.push(pos);
        self.vstatus.push_default();
        v
    }

    pub fn add_vertices(&mut self, positions: &[DVec3]) -> std::ops::Range<u32> {
        let start = self.num_vertices() as u32;
        for pos in positions {
            self.add_vertex(*pos);
        }
        start..(self.num_vertices() as u32)
    }

    pub fn add_face(&mut self, verts: &[VH]) -> Result<FH, Error> {
        let mut cache = TopolCache::default();
        self.add_face_with_cache(verts, &mut cache)
    }

    pub(crate) fn add_face_with_cache(
        &mut self,
        verts: &[VH],
        cache: &mut TopolCache,
    ) -> Result<FH, Error> {
        let nedges = self.num_edges();
        let f = self.topol.add_face(verts, cache)?;
        self.sync_edge_props(nedges);
        Ok(f)
    }

    pub fn add_tri_face(&mut self, v0: VH, v1: VH, v2: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2])
    }

    pub fn add_quad_face(&mut self, v0: VH, v1: VH, v2: VH, v3: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2, v3])
    }

    /// Give every edge added since there were `from` edges a default status.
    pub(crate) fn sync_edge_props(&mut self, from: usize) {
        debug_assert_eq!(self.estatus.len(), from);
        for _ in from..self.num_edges() {
            self.estatus.push_default();
        }
    }

    /// Centroid of the vertices of a face.
    pub fn face_centroid(&self, f: FH) -> DVec3 {
        let (count, total) = self
            .fv_ccw_iter(f)
            .fold((0usize, DVec3::ZERO), |(count, total), v| {
                (count + 1, total + self.points[v])
            });
        total / (count.max(1) as f64)
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use super::Mesh;

    #[test]
    fn t_quad_mesh() {
        let mut mesh = Mesh::new();
        let verts = mesh.add_vertices(&[
            dvec3(0., 0., 0.),
            dvec3(1., 0., 0.),
            dvec3(1., 1., 0.),
            dvec3(0., 1., 0.),
        ]);
        assert_eq!(verts, 0..4);
        let f = mesh
            .add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.estatus.len(), 4);
        assert_eq!(mesh.face_valence(f), 4);
        assert_eq!(mesh.face_centroid(f), dvec3(0.5, 0.5, 0.));
        let e = mesh
            .find_edge(1.into(), 2.into())
            .expect("Cannot find edge");
        assert_eq!(mesh.edge_length(e).expect("Cannot compute length"), 1.0);
    }

    #[test]
    fn t_selection_flags() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(&[dvec3(0., 0., 0.), dvec3(1., 0., 0.), dvec3(0., 1., 0.)]);
        mesh.add_tri_face(0.into(), 1.into(), 2.into())
            .expect("Cannot add face");
        let e = mesh
            .find_edge(0.into(), 1.into())
            .expect("Cannot find edge");
        mesh.select_edge(e, true).expect("Cannot select edge");
        assert_eq!(mesh.selected_edges().collect::<Vec<_>>(), [e]);
        assert!(
            mesh.vertex_status(0.into())
                .expect("Cannot read status")
                .selected()
        );
        let copy = mesh.clone();
        assert_eq!(copy, mesh);
        mesh.clear_selection();
        assert_eq!(mesh.selected_edges().count(), 0);
        assert_ne!(copy, mesh);
    }

    #[test]
    fn t_mesh_equality() {
        let mesh = Mesh::unit_box().expect("Cannot create box");
        let mut moved = mesh.clone();
        assert_eq!(moved, mesh);
        moved
            .set_point(0.into(), dvec3(0., 0., -1.))
            .expect("Cannot set point");
        assert_ne!(moved, mesh);
        let mut selected = mesh.clone();
        selected.select_edge(0.into(), true).expect("Cannot select edge");
        assert_ne!(selected, mesh);
        let mut split = mesh.clone();
        split
            .split_edge(0.into(), split.edge_vertices(0.into()).0, 0.5)
            .expect("Cannot split edge");
        assert_ne!(split, mesh);
    }
}
