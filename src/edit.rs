use crate::{
    element::{EH, FH, HH, VH},
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

impl Topology {
    /// Split the edge of `h` by inserting `v` into it.
    ///
    /// A new edge is created between the tail of `h` and `v`, and the edge of
    /// `h` is shortened to span `v` to the head of `h`.
    /// ```text
    ///    tail ------------ h ------------> head
    ///    tail --- hnew ---> v ----- h ----> head
    /// ```
    pub(crate) fn split_edge(&mut self, h: HH, v: VH) -> EH {
        let oh = h.opposite();
        let vfrom = self.from_vertex(h);
        let (ph, noh) = (self.prev_halfedge(h), self.next_halfedge(oh));
        let (fh, foh) = (self.halfedge_face(h), self.halfedge_face(oh));
        let enew = self.new_edge(vfrom, v, ph, h, oh, noh);
        let (hnew, ohnew) = enew.halfedges();
        // Rewire halfedge -> vertex.
        self.halfedge_mut(oh).vertex = v;
        // Rewire halfedge -> halfedge.
        self.link_halfedges(hnew, h);
        self.link_halfedges(oh, ohnew);
        self.link_halfedges(ph, hnew);
        self.link_halfedges(ohnew, noh);
        // Rewire halfedge -> face.
        self.halfedge_mut(hnew).face = fh;
        self.halfedge_mut(ohnew).face = foh;
        // Rewire vertex -> halfedge.
        self.set_vertex_halfedge(v, h);
        self.adjust_outgoing_halfedge(v);
        if self.vertex_halfedge(vfrom) == Some(h) {
            self.set_vertex_halfedge(vfrom, hnew);
            self.adjust_outgoing_halfedge(vfrom);
        }
        enew
    }

    /// Find the halfedge of face `f` that points at `v`.
    fn face_incoming_halfedge(&self, f: FH, v: VH) -> Result<HH, Error> {
        iterator::fh_ccw_iter(self, f)
            .find(|h| self.to_vertex(*h) == v)
            .ok_or(Error::VertexNotInFace(v, f))
    }

    /// Split face `f` in two with a new edge from `a` to `b`.
    ///
    /// ```text
    ///    +-----a-----+        +-----a-----+
    ///    |           |        |     |     |
    ///    |     f     |  --->  | new |  f  |
    ///    |           |        |     |     |
    ///    +-----b-----+        +-----b-----+
    /// ```
    /// The original face keeps the loop running from `b` to `a` and the new
    /// face gets the loop running from `a` to `b`. Returns the new edge and
    /// the new face.
    pub(crate) fn split_face(&mut self, f: FH, a: VH, b: VH) -> Result<(EH, FH), Error> {
        if a == b {
            return Err(Error::DegenerateSplit(a, b));
        }
        let ha = self.face_incoming_halfedge(f, a)?;
        let hb = self.face_incoming_halfedge(f, b)?;
        let (ha_next, hb_next) = (self.next_halfedge(ha), self.next_halfedge(hb));
        if self.to_vertex(ha_next) == b || self.to_vertex(hb_next) == a {
            return Err(Error::DegenerateSplit(a, b));
        }
        let enew = self.new_edge(a, b, ha, hb_next, hb, ha_next);
        let (h, oh) = enew.halfedges();
        self.link_halfedges(ha, h);
        self.link_halfedges(h, hb_next);
        self.link_halfedges(hb, oh);
        self.link_halfedges(oh, ha_next);
        self.face_mut(f).halfedge = h;
        let kept: Vec<HH> = iterator::loop_ccw_iter(self, h).collect();
        for hh in kept {
            self.halfedge_mut(hh).face = Some(f);
        }
        let fnew = self.new_face(oh);
        let moved: Vec<HH> = iterator::loop_ccw_iter(self, oh).collect();
        for hh in moved {
            self.halfedge_mut(hh).face = Some(fnew);
        }
        Ok((enew, fnew))
    }
}

impl Mesh {
    /// Split an edge with a new vertex placed `fraction` of the way from
    /// `start` to the other end of the edge.
    ///
    /// If successful, the new vertex and the new edge are returned. The new
    /// edge spans from `start` to the new vertex, and `e` keeps the remaining
    /// part, so calling this repeatedly with the returned vertex as the new
    /// start walks along the original edge.
    pub fn split_edge(&mut self, e: EH, start: VH, fraction: f64) -> Result<(VH, EH), Error> {
        if !(fraction > 0. && fraction < 1.) {
            return Err(Error::InvalidSplitFraction(fraction));
        }
        if !self.topol.is_valid_edge(e) {
            return Err(Error::OutOfBoundsAccess);
        }
        let (a, b) = self.edge_vertices(e);
        let h = if start == a {
            e.halfedge(false)
        } else if start == b {
            e.halfedge(true)
        } else {
            return Err(Error::NotAnEndpoint(start, e));
        };
        let p0 = self.point(start)?;
        let p1 = self.point(self.to_vertex(h))?;
        if !p0.is_finite() || !p1.is_finite() || p0.distance_squared(p1) == 0. {
            return Err(Error::DegenerateEdge(e));
        }
        let v = self.add_vertex(p0.lerp(p1, fraction));
        let nedges = self.num_edges();
        let enew = self.topol.split_edge(h, v);
        self.sync_edge_props(nedges);
        Ok((v, enew))
    }

    /// Split a face in two by connecting two of its vertices with a new edge.
    pub fn split_face(&mut self, f: FH, a: VH, b: VH) -> Result<(EH, FH), Error> {
        if !self.topol.is_valid_face(f) {
            return Err(Error::OutOfBoundsAccess);
        }
        let nedges = self.num_edges();
        let out = self.topol.split_face(f, a, b)?;
        self.sync_edge_props(nedges);
        Ok(out)
    }

    /// Split a face along a network of new edges.
    ///
    /// Each pair of vertices in `bridges` is connected by a new edge inside
    /// whichever piece of `f` currently has both vertices on its boundary.
    /// The edges must not cross, otherwise no piece contains both end points
    /// and [`Error::EdgeNetworkNotPlanar`] is returned. All the resulting
    /// faces are returned, starting with `f`.
    pub fn split_face_edgenet(&mut self, f: FH, bridges: &[(VH, VH)]) -> Result<Vec<FH>, Error> {
        let mut faces = vec![f];
        for &(a, b) in bridges {
            let target = faces
                .iter()
                .copied()
                .find(|g| {
                    let (has_a, has_b) = self
                        .fv_ccw_iter(*g)
                        .fold((false, false), |(ha, hb), v| (ha || v == a, hb || v == b));
                    has_a && has_b
                })
                .ok_or(Error::EdgeNetworkNotPlanar(f))?;
            let (_, fnew) = self.split_face(target, a, b)?;
            faces.push(fnew);
        }
        Ok(faces)
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use crate::{element::Handle, error::Error, mesh::Mesh};

    fn unit_quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertices(&[
            dvec3(0., 0., 0.),
            dvec3(1., 0., 0.),
            dvec3(1., 1., 0.),
            dvec3(0., 1., 0.),
        ]);
        mesh.add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        mesh
    }

    #[test]
    fn t_box_split_edge() {
        let mut qbox = Mesh::unit_box().expect("Cannot create box");
        let h = qbox
            .find_halfedge(4.into(), 5.into())
            .expect("Cannot find halfedge");
        let e = h.edge();
        let oh = h.opposite();
        let (v, enew) = qbox.split_edge(e, 4.into(), 0.25).expect("Cannot split edge");
        assert_eq!(qbox.point(v).expect("Cannot read point"), dvec3(0.25, 0., 1.));
        let (hnew, ohnew) = enew.halfedges();
        assert_eq!(qbox.from_vertex(hnew), 4.into());
        assert_eq!(qbox.to_vertex(hnew), v);
        assert_eq!(qbox.from_vertex(h), v);
        assert_eq!(qbox.to_vertex(oh), v);
        assert_eq!(qbox.next_halfedge(hnew), h);
        assert_eq!(qbox.next_halfedge(oh), ohnew);
        assert_eq!(qbox.halfedge_face(h), qbox.halfedge_face(hnew));
        assert_eq!(qbox.halfedge_face(oh), qbox.halfedge_face(ohnew));
        assert_eq!(qbox.num_edges(), 13);
        assert_eq!(v.valence(&qbox), 2);
        qbox.check_topology().expect("Topology is broken");
    }

    #[test]
    fn t_split_edge_from_either_end() {
        let mut mesh = unit_quad();
        let e = mesh.find_edge(1.into(), 2.into()).expect("Cannot find edge");
        let (v0, _) = mesh.split_edge(e, 2.into(), 0.5).expect("Cannot split edge");
        let (v1, e1) = mesh.split_edge(e, v0, 0.5).expect("Cannot split edge");
        assert_eq!(mesh.point(v0).expect("Cannot read point"), dvec3(1., 0.5, 0.));
        assert_eq!(mesh.point(v1).expect("Cannot read point"), dvec3(1., 0.25, 0.));
        let (a, b) = mesh.edge_vertices(e1);
        assert!((a == v0 && b == v1) || (a == v1 && b == v0));
        // The original edge keeps the last piece.
        let (a, b) = mesh.edge_vertices(e);
        assert!((a == v1 && b == 1.into()) || (a == 1.into() && b == v1));
        assert_eq!(mesh.face_valence(0.into()), 6);
        mesh.check_topology().expect("Topology is broken");
    }

    #[test]
    fn t_split_edge_errors() {
        let mut mesh = unit_quad();
        let e = mesh.find_edge(0.into(), 1.into()).expect("Cannot find edge");
        assert!(matches!(
            mesh.split_edge(e, 2.into(), 0.5),
            Err(Error::NotAnEndpoint(_, _))
        ));
        assert!(matches!(
            mesh.split_edge(e, 0.into(), 1.0),
            Err(Error::InvalidSplitFraction(_))
        ));
        mesh.set_point(1.into(), dvec3(0., 0., 0.))
            .expect("Cannot set point");
        assert!(matches!(
            mesh.split_edge(e, 0.into(), 0.5),
            Err(Error::DegenerateEdge(_))
        ));
        assert_eq!(mesh.num_vertices(), 4);
    }

    #[test]
    fn t_split_face() {
        let mut mesh = unit_quad();
        let (e, fnew) = mesh
            .split_face(0.into(), 0.into(), 2.into())
            .expect("Cannot split face");
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.face_valence(0.into()), 3);
        assert_eq!(mesh.face_valence(fnew), 3);
        assert!(!mesh.is_boundary_edge(e));
        let mut verts: Vec<u32> = mesh.fv_ccw_iter(fnew).map(|v| v.index()).collect();
        verts.sort();
        assert_eq!(verts, [0, 1, 2]);
        mesh.check_topology().expect("Topology is broken");
        // Adjacent vertices are already connected.
        assert!(matches!(
            mesh.split_face(0.into(), 2.into(), 3.into()),
            Err(Error::DegenerateSplit(_, _))
        ));
        assert!(matches!(
            mesh.split_face(fnew, 3.into(), 0.into()),
            Err(Error::VertexNotInFace(_, _))
        ));
    }

    #[test]
    fn t_split_face_edgenet() {
        let mut mesh = unit_quad();
        let bottom = mesh.find_edge(0.into(), 1.into()).expect("Cannot find edge");
        let top = mesh.find_edge(2.into(), 3.into()).expect("Cannot find edge");
        let (b0, _) = mesh.split_edge(bottom, 0.into(), 0.5).expect("Cannot split");
        let (t0, _) = mesh.split_edge(top, 3.into(), 0.5).expect("Cannot split");
        let right = mesh.find_edge(1.into(), 2.into()).expect("Cannot find edge");
        let (r0, _) = mesh.split_edge(right, 1.into(), 0.5).expect("Cannot split");
        let faces = mesh
            .split_face_edgenet(0.into(), &[(b0, t0), (r0, b0)])
            .expect("Cannot split face");
        assert_eq!(faces.len(), 3);
        assert_eq!(mesh.num_faces(), 3);
        let mut valences: Vec<usize> = faces.iter().map(|f| mesh.face_valence(*f)).collect();
        valences.sort();
        assert_eq!(valences, [3, 4, 4]);
        mesh.check_topology().expect("Topology is broken");
    }

    #[test]
    fn t_split_face_edgenet_crossing() {
        let mut mesh = unit_quad();
        // The two diagonals cross.
        assert!(matches!(
            mesh.split_face_edgenet(0.into(), &[(0.into(), 2.into()), (1.into(), 3.into())]),
            Err(Error::EdgeNetworkNotPlanar(_))
        ));
    }
}
