use crate::{
    element::{EH, FH, HH, VH},
    topol::Topology,
};

struct OutgoingHalfedgeIter<'a, const CCW: bool> {
    topol: &'a Topology,
    hstart: Option<HH>,
    hcurrent: Option<HH>,
}

impl Iterator for OutgoingHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.prev_halfedge(current).opposite();
        self.hcurrent = match self.hstart {
            Some(start) if start != next => Some(next),
            _ => None,
        };
        Some(current)
    }
}

impl Iterator for OutgoingHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.next_halfedge(current.opposite());
        self.hcurrent = match self.hstart {
            Some(start) if start != next => Some(next),
            _ => None,
        };
        Some(current)
    }
}

/// Walks the `next` links of a halfedge loop exactly once, starting at the
/// given halfedge.
struct LoopHalfedgeIter<'a> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let next = self.topol.next_halfedge(current);
        self.hcurrent = if next == self.hstart {
            None
        } else {
            Some(next)
        };
        Some(current)
    }
}

pub(crate) fn voh_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    let h = topol.vertex_halfedge(v);
    OutgoingHalfedgeIter::<true> {
        topol,
        hstart: h,
        hcurrent: h,
    }
}

pub(crate) fn voh_cw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    let h = topol.vertex_halfedge(v);
    OutgoingHalfedgeIter::<false> {
        topol,
        hstart: h,
        hcurrent: h,
    }
}

pub(crate) fn vih_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    voh_ccw_iter(topol, v).map(|h| h.opposite())
}

pub(crate) fn vv_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = VH> + use<'_> {
    voh_ccw_iter(topol, v).map(|h| topol.to_vertex(h))
}

pub(crate) fn vf_ccw_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + use<'_> {
    voh_ccw_iter(topol, v).filter_map(|h| topol.halfedge_face(h))
}

pub(crate) fn ef_iter(topol: &Topology, e: EH) -> impl Iterator<Item = FH> + use<'_> {
    let (h, oh) = e.halfedges();
    [h, oh]
        .into_iter()
        .filter_map(|h| topol.halfedge_face(h))
}

/// Iterate the loop that contains `h`, starting at `h`.
pub(crate) fn loop_ccw_iter(topol: &Topology, h: HH) -> impl Iterator<Item = HH> + use<'_> {
    LoopHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: Some(h),
    }
}

pub(crate) fn fh_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = HH> + use<'_> {
    loop_ccw_iter(topol, topol.face_halfedge(f))
}

pub(crate) fn fv_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + use<'_> {
    fh_ccw_iter(topol, f).map(|h| topol.to_vertex(h))
}

pub(crate) fn fe_ccw_iter(topol: &Topology, f: FH) -> impl Iterator<Item = EH> + use<'_> {
    fh_ccw_iter(topol, f).map(|h| h.edge())
}

#[cfg(test)]
mod test {
    use crate::{
        element::Handle,
        topol::test::{holey_strip, quad_box},
    };

    use super::*;

    #[test]
    fn t_box_vv_ccw_iter() {
        let qbox = quad_box();
        for (v, expected) in [(0u32, [4, 3, 1]), (5, [4, 1, 6]), (6, [7, 5, 2])] {
            let mut vs: Vec<u32> = vv_ccw_iter(&qbox, v.into()).map(|x| x.index()).collect();
            let mut expected = expected.to_vec();
            // Start is arbitrary, only the set and count matter here.
            vs.sort();
            expected.sort();
            assert_eq!(vs, expected);
        }
    }

    #[test]
    fn t_box_voh_ccw_and_cw_agree() {
        let qbox = quad_box();
        for v in qbox.vertices() {
            let ccw: Vec<_> = voh_ccw_iter(&qbox, v).collect();
            let mut cw: Vec<_> = voh_cw_iter(&qbox, v).collect();
            assert_eq!(ccw.len(), 3);
            cw[1..].reverse();
            assert_eq!(ccw, cw);
            assert!(vih_ccw_iter(&qbox, v).all(|h| qbox.to_vertex(h) == v));
        }
    }

    #[test]
    fn t_box_fv_ccw_iter() {
        let qbox = quad_box();
        for (fi, vis) in [
            (0u32, [0, 3, 2, 1]),
            (1u32, [0, 1, 5, 4]),
            (2u32, [1, 2, 6, 5]),
            (3u32, [2, 3, 7, 6]),
            (4u32, [3, 0, 4, 7]),
            (5u32, [4, 5, 6, 7]),
        ] {
            assert_eq!(
                fv_ccw_iter(&qbox, fi.into())
                    .map(|x| x.index())
                    .collect::<Vec<_>>(),
                vis
            );
        }
    }

    #[test]
    fn t_box_fe_ccw_iter_is_stable() {
        let qbox = quad_box();
        for f in qbox.faces() {
            let first: Vec<_> = fe_ccw_iter(&qbox, f).collect();
            let second: Vec<_> = fe_ccw_iter(&qbox, f).collect();
            assert_eq!(first, second);
            assert_eq!(first.len(), 4);
        }
    }

    #[test]
    fn t_strip_ef_iter() {
        let mesh = holey_strip();
        let e = mesh
            .find_halfedge(1.into(), 5.into())
            .expect("Cannot find halfedge")
            .edge();
        assert_eq!(ef_iter(&mesh, e).count(), 2);
        let e = mesh
            .find_halfedge(0.into(), 1.into())
            .expect("Cannot find halfedge")
            .edge();
        assert_eq!(
            ef_iter(&mesh, e).map(|f| f.index()).collect::<Vec<_>>(),
            [0]
        );
    }
}
