/*!
Builds the new topology of a connect operation.

Selected edges are grouped by the faces they border. Every face with at least
two selected edges gets its edges ordered along the face loop, each selected
edge is split into `segments + 1` pieces, and the new vertices on cyclically
adjacent edges are connected by bridging edges that split the face.
*/

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use tracing::debug;

use crate::{
    adapter::GeometryAdapter,
    element::{EH, FH, VH},
    error::Error,
};

/// A selected edge as seen from one of its faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupEdge {
    pub edge: EH,
    /// The vertex the face loop enters the edge from.
    pub start: VH,
    pub from: DVec3,
    pub to: DVec3,
}

/// The selected edges of one face, in face loop order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedGroup {
    pub face: FH,
    pub edges: Vec<GroupEdge>,
    /// Length of the shortest edge in the group.
    pub min_length: f64,
}

/// Everything derived from the selection during a rebuild. It refers to
/// handles in the live mesh, and is discarded whenever the live mesh is
/// restored from its snapshot.
#[derive(Clone, Debug, Default)]
pub struct ConnectState {
    pub(crate) groups: Vec<OrderedGroup>,
    /// New vertices of each original edge.
    pub(crate) chains: BTreeMap<EH, Vec<VH>>,
    /// Original edge of every piece created by splitting it.
    pub(crate) lineage: BTreeMap<EH, EH>,
    /// Position of every chain vertex right after the split.
    pub(crate) rest: BTreeMap<VH, DVec3>,
    /// End points of each original edge at the time of grouping.
    pub(crate) endpoints: BTreeMap<EH, (DVec3, DVec3)>,
    pub(crate) min_ref_length: f64,
    pub(crate) tagged: BTreeSet<EH>,
    /// Bridging edges. These are never treated as part of the user's
    /// selection.
    pub(crate) ignored: BTreeSet<EH>,
}

/// Group the selected edges by the faces they border.
///
/// Faces with fewer than two selected edges are dropped, and nothing is
/// grouped when only one edge is selected.
pub fn group_by_face<A: GeometryAdapter>(
    mesh: &A,
    selected: &BTreeSet<EH>,
) -> Result<BTreeMap<FH, Vec<EH>>, Error> {
    let mut groups: BTreeMap<FH, Vec<EH>> = BTreeMap::new();
    if selected.len() < 2 {
        return Ok(groups);
    }
    for &e in selected {
        if !mesh.is_valid_edge(e) {
            return Err(Error::UnknownEdge(e));
        }
        for f in mesh.edge_faces(e) {
            groups.entry(f).or_default().push(e);
        }
    }
    groups.retain(|_, edges| edges.len() > 1);
    Ok(groups)
}

/// Order the edges of a group the way the face loop visits them, and record
/// the direction the face runs along each of them.
pub fn order_group_ccw<A: GeometryAdapter>(
    mesh: &A,
    face: FH,
    group: &[EH],
) -> Result<OrderedGroup, Error> {
    let mut edges = Vec::with_capacity(group.len());
    let mut min_length = f64::INFINITY;
    for corner in mesh.face_loop(face) {
        if !group.contains(&corner.edge) {
            continue;
        }
        let from = mesh.point(corner.start)?;
        let to = mesh.point(corner.end)?;
        min_length = min_length.min(from.distance(to));
        edges.push(GroupEdge {
            edge: corner.edge,
            start: corner.start,
            from,
            to,
        });
    }
    if edges.len() != group.len() {
        return Err(Error::InvalidTopology(format!(
            "face {face} borders {} of its {} selected edges",
            edges.len(),
            group.len()
        )));
    }
    Ok(OrderedGroup {
        face,
        edges,
        min_length,
    })
}

/// Fraction of the way from `from` to `to` that `p` projects to.
fn fraction_along(from: DVec3, to: DVec3, p: DVec3) -> f64 {
    let ab = to - from;
    ab.dot(p - from) / ab.length_squared()
}

/// Walk the ring of edges across quads that contains `e`.
///
/// From each quad the walk steps to the edge opposite the current one, and
/// continues into the face on the other side. It stops at boundaries, at faces
/// that aren't quads, and when the ring closes on itself.
pub fn edge_ring<A: GeometryAdapter>(mesh: &A, e: EH) -> Result<Vec<EH>, Error> {
    if !mesh.is_valid_edge(e) {
        return Err(Error::UnknownEdge(e));
    }
    let mut ring = vec![e];
    let mut visited = BTreeSet::from([e]);
    for face in mesh.edge_faces(e) {
        let (mut cur_e, mut cur_f) = (e, face);
        loop {
            let corners = mesh.face_loop(cur_f);
            if corners.len() != 4 {
                break;
            }
            let Some(i) = corners.iter().position(|c| c.edge == cur_e) else {
                break;
            };
            let opposite = corners[(i + 2) % 4].edge;
            if !visited.insert(opposite) {
                break;
            }
            ring.push(opposite);
            match mesh.edge_faces(opposite).into_iter().find(|f| *f != cur_f) {
                Some(f) => (cur_e, cur_f) = (opposite, f),
                None => break,
            }
        }
    }
    Ok(ring)
}

fn mark_edge<A: GeometryAdapter>(mesh: &mut A, e: EH, bridge: bool) -> Result<(), Error> {
    mesh.update_edge_status(e, |s| {
        s.set_tagged(true);
        if bridge {
            s.set_bridge(true);
        } else {
            s.set_selected(true);
        }
    })
}

impl ConnectState {
    /// Run the whole topology pass on `mesh`.
    ///
    /// `mesh` is expected to be a fresh copy of the snapshot that `selected`
    /// refers to. On error `mesh` is left partially modified, and the caller
    /// must restore it.
    pub fn build<A: GeometryAdapter>(
        mesh: &mut A,
        selected: &BTreeSet<EH>,
        segments: u32,
    ) -> Result<Self, Error> {
        let mut state = ConnectState::default();
        for &e in selected {
            if !mesh.is_valid_edge(e) {
                return Err(Error::UnknownEdge(e));
            }
            mark_edge(mesh, e, false)?;
            state.tagged.insert(e);
        }
        let groups = group_by_face(mesh, selected)?;
        if groups.is_empty() {
            debug!(
                "{} selected edges do not share any faces, nothing to connect",
                selected.len()
            );
            return Ok(state);
        }
        let mut min_length = f64::INFINITY;
        for (face, edges) in &groups {
            let ordered = order_group_ccw(mesh, *face, edges)?;
            min_length = min_length.min(ordered.min_length);
            for ge in &ordered.edges {
                state.endpoints.insert(ge.edge, (ge.from, ge.to));
            }
            state.groups.push(ordered);
        }
        state.min_ref_length = if min_length.is_finite() {
            min_length
        } else {
            0.
        };
        debug!(
            "Connecting {} faces, shortest selected edge is {}",
            state.groups.len(),
            state.min_ref_length
        );
        let groups = std::mem::take(&mut state.groups);
        for group in &groups {
            for ge in &group.edges {
                state.subdivide_and_chain(mesh, ge, segments)?;
            }
            state.connect_and_reface(mesh, group, segments)?;
        }
        state.groups = groups;
        debug!(
            "Created {} vertices and {} bridging edges",
            state.rest.len(),
            state.ignored.len()
        );
        Ok(state)
    }

    /// Split a selected edge into `segments + 1` pieces, starting from the
    /// vertex the face loop enters it from, and return its new vertices ordered
    /// from that vertex.
    ///
    /// An edge is only split the first time it is visited. Later visits from
    /// other faces reorder the existing vertices for the visiting face.
    pub fn subdivide_and_chain<A: GeometryAdapter>(
        &mut self,
        mesh: &mut A,
        edge: &GroupEdge,
        segments: u32,
    ) -> Result<&[VH], Error> {
        if !self.chains.contains_key(&edge.edge) {
            let mut chain = Vec::with_capacity(segments as usize);
            let mut start = edge.start;
            for i in 0..segments {
                let fraction = 1. / ((segments - i) as f64 + 1.);
                let (v, enew) = mesh
                    .split_edge(edge.edge, start, fraction)
                    .map_err(|source| Error::SubdivisionFailed {
                        edge: edge.edge,
                        source: Box::new(source),
                    })?;
                self.rest.insert(v, mesh.point(v)?);
                self.lineage.insert(enew, edge.edge);
                self.tagged.insert(enew);
                mark_edge(mesh, enew, false)?;
                chain.push(v);
                start = v;
            }
            self.chains.insert(edge.edge, chain);
        }
        let rest = &self.rest;
        let chain = self
            .chains
            .get_mut(&edge.edge)
            .ok_or(Error::UnknownEdge(edge.edge))?;
        let key = |v: &VH| {
            rest.get(v)
                .map_or(f64::NAN, |p| fraction_along(edge.from, edge.to, *p))
        };
        chain.sort_by(|a, b| key(a).total_cmp(&key(b)));
        Ok(chain.as_slice())
    }

    /// Connect the new vertices of cyclically adjacent edges of a group and
    /// split the face along the new edges.
    ///
    /// For every pair of adjacent edges `(a, b)`, the first `ceil(n / 2)`
    /// vertices of `b` are connected with the last vertices of `a`, working
    /// inwards. A vertex pair is never connected twice.
    pub fn connect_and_reface<A: GeometryAdapter>(
        &mut self,
        mesh: &mut A,
        group: &OrderedGroup,
        segments: u32,
    ) -> Result<Vec<FH>, Error> {
        let count = group.edges.len();
        let half = segments.div_ceil(2) as usize;
        let mut bridges: Vec<(VH, VH)> = Vec::new();
        let mut connected: BTreeSet<(VH, VH)> = BTreeSet::new();
        for i in 0..count {
            let chain_a = self.chain(group.edges[i].edge)?;
            let chain_b = self.chain(group.edges[(i + 1) % count].edge)?;
            for j in 0..half.min(chain_a.len()).min(chain_b.len()) {
                let vb = chain_b[j];
                let va = chain_a[chain_a.len() - 1 - j];
                if connected.insert((vb.min(va), vb.max(va))) {
                    bridges.push((vb, va));
                }
            }
        }
        let before = mesh.num_edges() as u32;
        let faces = mesh.split_face_edgenet(group.face, &bridges)?;
        for e in (before..(mesh.num_edges() as u32)).map(EH::from) {
            mark_edge(mesh, e, true)?;
            self.tagged.insert(e);
            self.ignored.insert(e);
        }
        Ok(faces)
    }

    fn chain(&self, e: EH) -> Result<&[VH], Error> {
        self.chains
            .get(&e)
            .map(|c| c.as_slice())
            .ok_or(Error::UnknownEdge(e))
    }

    /// New vertices of an original edge, ordered for the last face that
    /// visited it.
    pub fn chain_of(&self, e: EH) -> Option<&[VH]> {
        self.chains.get(&e).map(|c| c.as_slice())
    }

    /// The faces that took part in the operation, with their ordered edges.
    pub fn groups(&self) -> &[OrderedGroup] {
        &self.groups
    }

    /// Length of the shortest grouped selected edge, or zero if nothing was
    /// grouped.
    pub fn min_ref_length(&self) -> f64 {
        self.min_ref_length
    }

    /// The original edge a piece was split from. Edges that were not created
    /// by a split map to themselves.
    pub fn original_edge(&self, e: EH) -> EH {
        self.lineage.get(&e).copied().unwrap_or(e)
    }

    pub fn is_tagged(&self, e: EH) -> bool {
        self.tagged.contains(&e)
    }

    pub fn is_ignored(&self, e: EH) -> bool {
        self.ignored.contains(&e)
    }

    pub fn rest_position(&self, v: VH) -> Option<DVec3> {
        self.rest.get(&v).copied()
    }
}
