use crate::{
    element::{Edge, Face, Halfedge, Handle, Vertex, EH, FH, HH, VH},
    error::Error,
    iterator,
};

/// An edge of a face that is being added. It either already exists in the
/// mesh as a boundary halfedge, or it will be created once all the checks
/// pass and the links are known.
enum TentativeEdge {
    Old(HH),
    New {
        index: u32,
        from: VH,
        to: VH,
        prev: Option<HH>,
        next: Option<HH>,
        opp_prev: Option<HH>,
        opp_next: Option<HH>,
    },
}

/// Scratch buffers reused across calls to [`Topology::add_face`].
#[derive(Default)]
pub(crate) struct TopolCache {
    loop_halfedges: Vec<Option<HH>>,
    needs_adjust: Vec<bool>,
    next_cache: Vec<(HH, HH)>,
    tentative: Vec<TentativeEdge>,
    halfedges: Vec<HH>,
}

impl TopolCache {
    fn clear(&mut self) {
        self.loop_halfedges.clear();
        self.needs_adjust.clear();
        self.next_cache.clear();
        self.tentative.clear();
        self.halfedges.clear();
    }
}

/// Connectivity of a polygon mesh, stored as a halfedge data structure.
///
/// The two halfedges of an edge are stored next to each other, so the
/// opposite of a halfedge and the edge of a halfedge are bit operations on
/// the index. Elements are only ever appended, so handles stay valid for the
/// lifetime of the topology.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl Topology {
    pub fn new() -> Self {
        Topology {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            faces: Vec::with_capacity(nfaces),
        }
    }

    fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v.index() as usize]
    }

    pub(crate) fn halfedge(&self, h: HH) -> &Halfedge {
        &self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    pub(crate) fn face_mut(&mut self, f: FH) -> &mut Face {
        &mut self.faces[f.index() as usize]
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertices[v.index() as usize].halfedge
    }

    pub fn to_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    pub fn from_vertex(&self, h: HH) -> VH {
        self.halfedge(h.opposite()).vertex
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.halfedge(h).face
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f.index() as usize].halfedge
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).face.is_none()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let (h, oh) = e.halfedges();
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(oh)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex_halfedge(v) {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        (v.index() as usize) < self.vertices.len()
    }

    pub fn is_valid_edge(&self, e: EH) -> bool {
        (e.index() as usize) < self.edges.len()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        (f.index() as usize) < self.faces.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.num_edges() * 2
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        (0..(self.num_halfedges() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        iterator::voh_ccw_iter(self, from).find(|h| self.to_vertex(*h) == to)
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        /* If just the first outgoing halfedge is on the boundary, the vertex is
         * on the boundary. If any outgoing halfedge apart from the first is on
         * the boundary, there is more than one gap when circulating around the
         * vertex, making it non-manifold. So we skip the first halfedge.
         */
        iterator::voh_ccw_iter(self, v)
            .skip(1)
            .all(|h| !self.is_boundary_halfedge(h))
    }

    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VH) {
        let h = iterator::voh_ccw_iter(self, v).find(|h| self.is_boundary_halfedge(*h));
        if let Some(h) = h {
            self.vertex_mut(v).halfedge = Some(h);
        }
    }

    pub fn add_vertex(&mut self) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(Vertex { halfedge: None });
        vi.into()
    }

    pub(crate) fn set_vertex_halfedge(&mut self, v: VH, h: HH) {
        self.vertex_mut(v).halfedge = Some(h);
    }

    pub(crate) fn new_edge(
        &mut self,
        from: VH,
        to: VH,
        prev: HH,
        next: HH,
        opp_prev: HH,
        opp_next: HH,
    ) -> EH {
        let ei = self.edges.len() as u32;
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next,
                    prev,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: opp_next,
                    prev: opp_prev,
                },
            ],
        });
        ei.into()
    }

    pub(crate) fn new_face(&mut self, halfedge: HH) -> FH {
        let fi = self.faces.len() as u32;
        self.faces.push(Face { halfedge });
        fi.into()
    }

    pub(crate) fn link_halfedges(&mut self, hprev: HH, hnext: HH) {
        self.halfedge_mut(hprev).next = hnext;
        self.halfedge_mut(hnext).prev = hprev;
    }

    /// Add a face bounded by the given loop of vertices.
    ///
    /// The vertices must be on the boundary, and every consecutive pair must
    /// either be unconnected or connected by a boundary halfedge. If these
    /// conditions are not met an error is returned and the topology is left
    /// untouched.
    pub(crate) fn add_face(&mut self, verts: &[VH], cache: &mut TopolCache) -> Result<FH, Error> {
        let nverts = verts.len();
        cache.clear();
        cache.loop_halfedges.reserve(nverts);
        cache.needs_adjust.reserve(nverts);
        cache.next_cache.reserve(nverts * 6);
        for (i, &v) in verts.iter().enumerate() {
            if !self.is_boundary_vertex(v) {
                return Err(Error::ComplexVertex(v));
            }
            let h = self.find_halfedge(v, verts[(i + 1) % nverts]);
            if let Some(h) = h {
                if !self.is_boundary_halfedge(h) {
                    return Err(Error::ComplexHalfedge(h));
                }
            }
            cache.loop_halfedges.push(h);
            cache.needs_adjust.push(false);
        }
        // Two consecutive existing halfedges that aren't linked yet need the
        // patch between them moved out of the way.
        for i in 0..nverts {
            let (prev, next) = match (
                cache.loop_halfedges[i],
                cache.loop_halfedges[(i + 1) % nverts],
            ) {
                (Some(prev), Some(next)) if self.next_halfedge(prev) != next => (prev, next),
                _ => continue,
            };
            let boundprev = {
                let mut out = next.opposite();
                loop {
                    out = self.next_halfedge(out).opposite();
                    if self.is_boundary_halfedge(out) {
                        break;
                    }
                }
                out
            };
            let boundnext = self.next_halfedge(boundprev);
            if boundprev == prev {
                return Err(Error::PatchRelinkingFailed);
            }
            debug_assert!(
                self.is_boundary_halfedge(boundprev) && self.is_boundary_halfedge(boundnext)
            );
            let pstart = self.next_halfedge(prev);
            let pend = self.prev_halfedge(next);
            cache
                .next_cache
                .extend_from_slice(&[(boundprev, pstart), (pend, boundnext), (prev, next)]);
        }
        // No more errors past this point, only bookkeeping.
        cache.tentative.reserve(nverts);
        {
            let mut ei = self.edges.len() as u32;
            cache
                .tentative
                .extend((0..nverts).map(|i| match cache.loop_halfedges[i] {
                    Some(h) => TentativeEdge::Old(h),
                    None => TentativeEdge::New {
                        index: {
                            let current = ei;
                            ei += 1;
                            current << 1
                        },
                        from: verts[i],
                        to: verts[(i + 1) % nverts],
                        prev: None,
                        next: None,
                        opp_prev: None,
                        opp_next: None,
                    },
                }));
        }
        for (i, j) in (0..nverts).map(|i| (i, (i + 1) % nverts)) {
            let (e0, e1) = if j == 0 {
                let (right, left) = cache.tentative.split_at_mut(i);
                (&mut left[0], &mut right[0])
            } else {
                let (left, right) = cache.tentative.split_at_mut(j);
                (&mut left[left.len() - 1], &mut right[0])
            };
            let v = verts[j];
            match (e0, e1) {
                (TentativeEdge::Old(_), TentativeEdge::Old(innernext)) => {
                    cache.needs_adjust[j] = self.vertex_halfedge(v) == Some(*innernext);
                }
                (
                    TentativeEdge::New {
                        index: innerprev,
                        opp_prev,
                        next,
                        ..
                    },
                    TentativeEdge::Old(innernext),
                ) => {
                    let innernext = *innernext;
                    let innerprev: HH = (*innerprev).into();
                    let outernext = innerprev.opposite();
                    let boundprev = self.prev_halfedge(innernext);
                    cache.next_cache.push((boundprev, outernext));
                    *opp_prev = Some(boundprev);
                    cache.next_cache.push((innerprev, innernext));
                    *next = Some(innernext);
                    self.set_vertex_halfedge(v, outernext);
                }
                (
                    TentativeEdge::Old(innerprev),
                    TentativeEdge::New {
                        index: innernext,
                        prev,
                        opp_next,
                        ..
                    },
                ) => {
                    let innerprev = *innerprev;
                    let innernext: HH = (*innernext).into();
                    let outerprev = innernext.opposite();
                    let boundnext = self.next_halfedge(innerprev);
                    cache.next_cache.push((outerprev, boundnext));
                    *opp_next = Some(boundnext);
                    cache.next_cache.push((innerprev, innernext));
                    *prev = Some(innerprev);
                    self.set_vertex_halfedge(v, boundnext);
                }
                (
                    TentativeEdge::New {
                        index: innerprev,
                        next,
                        opp_prev,
                        ..
                    },
                    TentativeEdge::New {
                        index: innernext,
                        prev,
                        opp_next,
                        ..
                    },
                ) => {
                    let innerprev: HH = (*innerprev).into();
                    let innernext: HH = (*innernext).into();
                    let outernext = innerprev.opposite();
                    let outerprev = innernext.opposite();
                    if let Some(boundnext) = self.vertex_halfedge(v) {
                        let boundprev = self.prev_halfedge(boundnext);
                        cache
                            .next_cache
                            .extend(&[(boundprev, outernext), (outerprev, boundnext)]);
                        *next = Some(innernext);
                        *opp_prev = Some(boundprev);
                        *prev = Some(innerprev);
                        *opp_next = Some(boundnext);
                    } else {
                        self.set_vertex_halfedge(v, outernext);
                        *next = Some(innernext);
                        *opp_prev = Some(outerprev);
                        *prev = Some(innerprev);
                        *opp_next = Some(outernext);
                    }
                }
            };
        }
        cache.halfedges.reserve(cache.tentative.len());
        for tedge in &cache.tentative {
            let h = match tedge {
                TentativeEdge::Old(h) => *h,
                TentativeEdge::New {
                    index,
                    from,
                    to,
                    prev,
                    next,
                    opp_prev,
                    opp_next,
                } => {
                    let (Some(prev), Some(next), Some(opp_prev), Some(opp_next)) =
                        (*prev, *next, *opp_prev, *opp_next)
                    else {
                        return Err(Error::InvalidTopology(format!(
                            "unable to link the new edge from {from} to {to}"
                        )));
                    };
                    let ei = self.new_edge(*from, *to, prev, next, opp_prev, opp_next);
                    debug_assert_eq!(*index >> 1, ei.index(), "Failed to create an edge loop");
                    (*index).into()
                }
            };
            cache.halfedges.push(h);
        }
        let fnew = self.new_face(match cache.tentative.last() {
            Some(TentativeEdge::Old(h)) => *h,
            Some(TentativeEdge::New { index, .. }) => (*index).into(),
            None => return Err(Error::InvalidTopology("face has no vertices".into())),
        });
        for h in &cache.halfedges {
            self.halfedge_mut(*h).face = Some(fnew);
        }
        for (prev, next) in cache.next_cache.drain(..) {
            self.link_halfedges(prev, next);
        }
        for (i, v) in verts.iter().enumerate() {
            if cache.needs_adjust[i] {
                self.adjust_outgoing_halfedge(*v);
            }
        }
        Ok(fnew)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_ccw_iter(self, v).count()
    }

    pub fn face_valence(&self, f: FH) -> usize {
        iterator::fh_ccw_iter(self, f).count()
    }
}
