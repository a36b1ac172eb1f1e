use crate::{
    element::{HasTopology, Handle},
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

fn broken(msg: String) -> Error {
    Error::InvalidTopology(msg)
}

fn check_vertices(mesh: &Topology, hvisited: &mut [bool]) -> Result<(), Error> {
    hvisited.fill(false);
    for v in mesh.vertices() {
        if let Some(h) = mesh.vertex_halfedge(v) {
            if (h.index() as usize) >= mesh.num_halfedges() {
                return Err(broken(format!("{v} points to invalid halfedge {h}")));
            }
            // The outgoing halfedge must be a boundary halfedge, or none of the
            // halfedges are boundary.
            if !mesh.is_boundary_halfedge(h)
                && iterator::voh_ccw_iter(mesh, v).any(|h| mesh.is_boundary_halfedge(h))
            {
                return Err(broken(format!("outgoing halfedge of {v} is not boundary")));
            }
            if mesh.from_vertex(h) != v {
                return Err(broken(format!("outgoing halfedge of {v} starts elsewhere")));
            }
        }
        // Check ccw iterator.
        for h in iterator::voh_ccw_iter(mesh, v) {
            if std::mem::replace(&mut hvisited[h.index() as usize], true) {
                return Err(broken(format!("outgoing halfedges of {v} repeat")));
            }
        }
        // Check cw iterator.
        for h in iterator::voh_cw_iter(mesh, v) {
            if !std::mem::replace(&mut hvisited[h.index() as usize], false) {
                return Err(broken(format!("outgoing halfedges of {v} disagree")));
            }
        }
    }
    Ok(())
}

fn check_halfedges(mesh: &Topology, hflags: &mut [bool]) -> Result<(), Error> {
    for h in mesh.halfedges() {
        let head = mesh.to_vertex(h);
        let tail = mesh.from_vertex(h);
        if head == tail {
            return Err(broken(format!("{h} is degenerate")));
        }
        let (prev, next) = (mesh.prev_halfedge(h), mesh.next_halfedge(h));
        if mesh.next_halfedge(prev) != h
            || mesh.prev_halfedge(next) != h
            || head != mesh.from_vertex(next)
            || tail != mesh.to_vertex(prev)
        {
            return Err(broken(format!("{h} has invalid links")));
        }
        if !iterator::voh_ccw_iter(mesh, tail).any(|hh| hh == h)
            || !iterator::vih_ccw_iter(mesh, head).any(|hh| hh == h)
        {
            return Err(broken(format!("{h} is not around its vertices")));
        }
    }
    // Every halfedge is in exactly one loop, and the loop has one face.
    for h in mesh.halfedges() {
        if hflags[h.index() as usize] {
            continue;
        }
        let f = mesh.halfedge_face(h);
        for h in iterator::loop_ccw_iter(mesh, h) {
            if std::mem::replace(&mut hflags[h.index() as usize], true) {
                return Err(broken(format!("loop of {h} is broken")));
            }
            if mesh.halfedge_face(h) != f {
                return Err(broken(format!("loop of {h} has mixed faces")));
            }
        }
    }
    hflags.fill(false);
    Ok(())
}

fn check_faces(mesh: &Topology) -> Result<(), Error> {
    for f in mesh.faces() {
        let h = mesh.face_halfedge(f);
        if mesh.halfedge_face(h) != Some(f) {
            return Err(broken(format!("{f} and {h} are not linked")));
        }
        if mesh.face_valence(f) < 3 {
            return Err(broken(format!("{f} has fewer than 3 sides")));
        }
    }
    Ok(())
}

impl Topology {
    pub fn check(&self) -> Result<(), Error> {
        let mut hvisited = vec![false; self.num_halfedges()].into_boxed_slice();
        check_vertices(self, &mut hvisited)?;
        check_halfedges(self, &mut hvisited)?;
        check_faces(self)
    }
}

impl Mesh {
    /// Check the topology of the mesh, and that every element has its
    /// properties.
    ///
    /// This function will return an error if any errors are found.
    pub fn check_topology(&self) -> Result<(), Error> {
        let topol = self.topology();
        if self.points.len() != topol.num_vertices() || self.vstatus.len() != topol.num_vertices()
        {
            return Err(broken("vertex properties are out of sync".into()));
        }
        if self.estatus.len() != topol.num_edges() {
            return Err(broken("edge properties are out of sync".into()));
        }
        topol.check()
    }
}
