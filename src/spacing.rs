/*!
Positions the new vertices along their original edges.

Vertices are scaled about the midpoint of their edge, always starting from
their rest positions, so applying the same parameters twice gives the same
result. Only positions are changed here, never the topology.
*/

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::{adapter::GeometryAdapter, builder::ConnectState, element::VH, error::Error};

/// How the spacing of the new vertices is made consistent across edges of
/// different lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvenMode {
    /// Each edge is scaled by the pinch factor alone.
    #[default]
    None,
    /// The outermost new vertices are the same distance from the midpoint on
    /// every edge.
    In,
    /// The outermost new vertices are the same distance from the ends on
    /// every edge.
    Out,
}

impl EvenMode {
    /// The next mode in the order `None`, `In`, `Out`.
    pub fn cycle(self) -> Self {
        match self {
            EvenMode::None => EvenMode::In,
            EvenMode::In => EvenMode::Out,
            EvenMode::Out => EvenMode::None,
        }
    }
}

impl std::fmt::Display for EvenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EvenMode::None => "NO",
            EvenMode::In => "IN",
            EvenMode::Out => "OUT",
        })
    }
}

/// Distance from the midpoint of an edge to its outermost new vertex, when
/// the vertices are evenly spaced.
fn natural_distance(length: f64, segments: u32) -> f64 {
    let n = segments as f64;
    (length / 2.) * (n - 1.) / (n + 1.)
}

/// Scale factor from the pinch alone.
///
/// Positive pinch pushes the vertices apart, up to the point where the
/// outermost vertices reach the ends of the edge. Negative pinch pulls them
/// together, down to the midpoint.
pub fn pinch_factor(pinch: i32, segments: u32) -> f64 {
    if segments <= 1 {
        return 1.;
    }
    let n = segments as f64;
    let pinch = pinch as f64;
    if pinch >= 0. {
        (1. + 0.01 * pinch / ((n - 1.) / 2.)).clamp(1., 1. + 2. / (n - 1.))
    } else {
        (1. + 0.01 * pinch).clamp(0., 1.)
    }
}

/// Scale factor for the new vertices of an edge of length `edge_length`.
///
/// In the even modes, the edges are measured against the shortest selected
/// edge, `min_ref_length`, so that the shortest edge gets the plain pinch
/// factor.
pub fn compute_scale_factor(
    pinch: i32,
    mode: EvenMode,
    min_ref_length: f64,
    edge_length: f64,
    segments: u32,
) -> f64 {
    if segments <= 1 {
        return 1.;
    }
    let base = pinch_factor(pinch, segments);
    let d_edge = natural_distance(edge_length, segments);
    let d_min = natural_distance(min_ref_length, segments) * base;
    match mode {
        EvenMode::None => base,
        // Degenerate edge, nothing to even out.
        EvenMode::In | EvenMode::Out if !d_edge.is_normal() => 1.,
        EvenMode::In => d_min / d_edge,
        EvenMode::Out => {
            let to_end_min = min_ref_length / 2. - d_min;
            let to_end = edge_length / 2. - d_edge;
            (d_edge + (to_end - to_end_min)) / d_edge
        }
    }
}

/// Place each vertex of `chain` at `mid + (rest - mid) * factor`, where `mid`
/// is the midpoint of `start` and `end`.
pub fn apply<A: GeometryAdapter>(
    mesh: &mut A,
    chain: &[VH],
    rest: &BTreeMap<VH, DVec3>,
    start: DVec3,
    end: DVec3,
    factor: f64,
) -> Result<(), Error> {
    let mid = (start + end) * 0.5;
    for &v in chain {
        let p = rest.get(&v).copied().ok_or(Error::OutOfBoundsAccess)?;
        mesh.set_point(v, mid + (p - mid) * factor)?;
    }
    Ok(())
}

impl ConnectState {
    /// Move every new vertex to where `pinch` and `mode` put it. Each edge is
    /// moved exactly once, even when it borders several faces.
    pub fn reposition<A: GeometryAdapter>(
        &self,
        mesh: &mut A,
        pinch: i32,
        mode: EvenMode,
        segments: u32,
    ) -> Result<(), Error> {
        let mut processed = BTreeSet::new();
        for group in &self.groups {
            for ge in &group.edges {
                if !processed.insert(ge.edge) {
                    continue;
                }
                let Some(chain) = self.chains.get(&ge.edge) else {
                    continue;
                };
                let (start, end) = self
                    .endpoints
                    .get(&ge.edge)
                    .copied()
                    .unwrap_or((ge.from, ge.to));
                let factor = compute_scale_factor(
                    pinch,
                    mode,
                    self.min_ref_length,
                    start.distance(end),
                    segments,
                );
                apply(mesh, chain, &self.rest, start, end, factor)?;
            }
        }
        Ok(())
    }
}
