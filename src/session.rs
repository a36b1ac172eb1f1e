/*!
Interactive connect session.

A [`Session`] owns a snapshot of the mesh taken when it starts and a live copy
that is edited. Changing the number of segments or the selection rebuilds the
live mesh from the snapshot. Changing the pinch or the even mode only moves
the new vertices. A session ends with [`Session::commit`], which returns the
edited mesh, or [`Session::cancel`], which returns the snapshot.
*/

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    adapter::GeometryAdapter,
    builder::{ConnectState, edge_ring},
    element::EH,
    error::Error,
    hud::{HudEntry, HudLine, layout},
    input::{InputEvent, Outcome},
    prefs::Preferences,
    spacing::EvenMode,
};

pub const SEGMENTS_MIN: u32 = 1;
pub const SEGMENTS_MAX: u32 = 1000;
pub const PINCH_MIN: i32 = -100;
pub const PINCH_MAX: i32 = 100;

/// Parameters of the connect operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of new vertices on each selected edge.
    pub segments: u32,
    pub pinch: i32,
    pub even: EvenMode,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            segments: SEGMENTS_MIN,
            pinch: 0,
            even: EvenMode::None,
        }
    }
}

fn parse_integer(text: &str) -> Result<i64, Error> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| Error::NotAnInteger(text.to_string()))
}

/// Text that is still being typed, and is not worth reporting.
fn is_partial(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "-"
}

pub struct Session<A: GeometryAdapter> {
    snapshot: A,
    live: A,
    selected: BTreeSet<EH>,
    params: Params,
    state: ConnectState,
    /// Pinch at the start of the current drag.
    drag_pinch: i32,
    selection_enabled: bool,
}

impl<A: GeometryAdapter> Session<A> {
    /// Start a session on `mesh`, connecting the edges selected in it.
    ///
    /// The selection flags are cleared from the snapshot. Nothing is built
    /// until [`Session::rebuild_topology`] is called.
    pub fn new(mut mesh: A, params: Params, prefs: &Preferences) -> Self {
        let selected: BTreeSet<EH> = mesh.selected_edges().into_iter().collect();
        mesh.clear_selection();
        let params = Params {
            segments: params.segments.clamp(SEGMENTS_MIN, SEGMENTS_MAX),
            pinch: params.pinch.clamp(PINCH_MIN, PINCH_MAX),
            even: params.even,
        };
        info!(
            "Starting connect session with {} selected edges",
            selected.len()
        );
        Session {
            live: mesh.clone(),
            snapshot: mesh,
            selected,
            params,
            state: ConnectState::default(),
            drag_pinch: params.pinch,
            selection_enabled: prefs.selection_enabled,
        }
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// The mesh being edited.
    pub fn mesh(&self) -> &A {
        &self.live
    }

    /// The mesh as it was when the session started.
    pub fn snapshot(&self) -> &A {
        &self.snapshot
    }

    /// Edges of the snapshot the session connects.
    pub fn selected_edges(&self) -> &BTreeSet<EH> {
        &self.selected
    }

    pub fn state(&self) -> &ConnectState {
        &self.state
    }

    /// Restore the live mesh from the snapshot, and forget everything derived
    /// from it.
    pub fn reset_to_snapshot(&mut self) {
        self.live = self.snapshot.clone();
        self.state = ConnectState::default();
    }

    fn rollback(&mut self, err: &Error) {
        error!("Connecting edges failed, restoring the original mesh: {err}");
        self.reset_to_snapshot();
    }

    /// Rebuild the live mesh from the snapshot with the current selection and
    /// number of segments, then position the new vertices.
    ///
    /// Either everything succeeds, or the live mesh is restored to the
    /// snapshot and the error is returned.
    pub fn rebuild_topology(&mut self) -> Result<(), Error> {
        self.reset_to_snapshot();
        let Params {
            segments,
            pinch,
            even,
        } = self.params;
        let result = ConnectState::build(&mut self.live, &self.selected, segments)
            .and_then(|state| {
                state.reposition(&mut self.live, pinch, even, segments)?;
                Ok(state)
            });
        match result {
            Ok(state) => {
                info!(
                    "Connected {} faces with {} segments",
                    state.groups().len(),
                    segments
                );
                self.state = state;
                Ok(())
            }
            Err(e) => {
                self.rollback(&e);
                Err(e)
            }
        }
    }

    /// Move the new vertices for the current pinch and even mode without
    /// touching the topology.
    pub fn reposition(&mut self) -> Result<(), Error> {
        let Params {
            segments,
            pinch,
            even,
        } = self.params;
        debug!("Repositioning with pinch {pinch} and even mode {even}");
        if let Err(e) = self
            .state
            .reposition(&mut self.live, pinch, even, segments)
        {
            self.rollback(&e);
            return Err(e);
        }
        Ok(())
    }

    /// Set the number of segments, clamped to its range, and rebuild if it
    /// changed.
    pub fn set_segments(&mut self, segments: u32) -> Result<(), Error> {
        let segments = segments.clamp(SEGMENTS_MIN, SEGMENTS_MAX);
        if segments == self.params.segments {
            return Ok(());
        }
        self.params.segments = segments;
        self.rebuild_topology()
    }

    /// Set the pinch, clamped to its range, and reposition.
    pub fn set_pinch(&mut self, pinch: i32) -> Result<(), Error> {
        self.params.pinch = pinch.clamp(PINCH_MIN, PINCH_MAX);
        self.reposition()
    }

    pub fn set_even(&mut self, even: EvenMode) -> Result<(), Error> {
        self.params.even = even;
        self.reposition()
    }

    pub fn cycle_even(&mut self) -> Result<(), Error> {
        self.set_even(self.params.even.cycle())
    }

    /// Set the number of segments from text typed by the user.
    ///
    /// Invalid text is rejected with an error and the current value is kept.
    /// Empty text is ignored.
    pub fn submit_segments_text(&mut self, text: &str) -> Result<(), Error> {
        if is_partial(text) {
            return Ok(());
        }
        let value = parse_integer(text)?;
        if !(SEGMENTS_MIN as i64..=SEGMENTS_MAX as i64).contains(&value) {
            return Err(Error::OutOfRange {
                value,
                min: SEGMENTS_MIN as i64,
                max: SEGMENTS_MAX as i64,
            });
        }
        self.set_segments(value as u32)
    }

    /// Set the pinch from text typed by the user.
    ///
    /// Invalid text is rejected with an error and the current value is kept.
    /// Empty text and a lone minus sign are ignored.
    pub fn submit_pinch_text(&mut self, text: &str) -> Result<(), Error> {
        if is_partial(text) {
            return Ok(());
        }
        let value = parse_integer(text)?;
        if !(PINCH_MIN as i64..=PINCH_MAX as i64).contains(&value) {
            return Err(Error::OutOfRange {
                value,
                min: PINCH_MIN as i64,
                max: PINCH_MAX as i64,
            });
        }
        self.drag_pinch = value as i32;
        self.set_pinch(value as i32)
    }

    /// Update the set of connected edges from the selection of the live mesh.
    ///
    /// Selected edges that the session didn't create are added. Edges the
    /// session selected that are no longer selected are removed, pieces of
    /// split edges removing the edge they were split from. Bridging edges are
    /// never added or removed. A single new edge is expanded to its edge ring,
    /// unless `extend` is set.
    ///
    /// Returns whether the selection changed, in which case the live mesh was
    /// rebuilt.
    pub fn sync_selection(&mut self, live_selected: &[EH], extend: bool) -> Result<bool, Error> {
        let live: BTreeSet<EH> = live_selected.iter().copied().collect();
        let mut added: BTreeSet<EH> = live
            .iter()
            .copied()
            .filter(|e| !self.state.is_tagged(*e) && !self.state.is_ignored(*e))
            .collect();
        let removed: BTreeSet<EH> = self
            .state
            .tagged
            .iter()
            .filter(|e| !live.contains(*e) && !self.state.is_ignored(**e))
            .map(|e| self.state.original_edge(*e))
            .collect();
        if added.is_empty() && removed.is_empty() {
            return Ok(false);
        }
        if added.len() == 1 && !extend {
            if let Some(&e) = added.first() {
                if self.snapshot.is_valid_edge(e) {
                    added.extend(edge_ring(&self.snapshot, e)?);
                }
            }
        }
        added.retain(|e| {
            let known = self.snapshot.is_valid_edge(*e);
            if !known {
                warn!("Ignoring selected edge {e}, it is not in the original mesh");
            }
            known
        });
        debug!(
            "Selection changed, {} edges added and {} removed",
            added.len(),
            removed.len()
        );
        self.selected.extend(added);
        self.selected.retain(|e| !removed.contains(e));
        self.rebuild_topology()?;
        Ok(true)
    }

    /// Lines of text describing the current parameters.
    pub fn hud(&self, prefs: &Preferences) -> Vec<HudLine> {
        layout(
            &[
                HudEntry {
                    label: "Pinch",
                    value: self.params.pinch.to_string(),
                    hint: "(CTRL + Mouse)",
                },
                HudEntry {
                    label: "Segments",
                    value: self.params.segments.to_string(),
                    hint: "(CTRL + MouseWheel)",
                },
                HudEntry {
                    label: "Even",
                    value: self.params.even.to_string(),
                    hint: "(E)",
                },
            ],
            prefs,
        )
    }

    /// Handle one input event.
    ///
    /// Errors caused by invalid text input are returned and the session keeps
    /// running. Any other failure has already rolled the live mesh back, and
    /// ends the session with [`Outcome::Cancelled`].
    pub fn handle(&mut self, event: InputEvent) -> Result<Outcome, Error> {
        let result = match event {
            InputEvent::Drag { dx } => {
                let pinch = self.drag_pinch.saturating_add(dx / 2).clamp(PINCH_MIN, PINCH_MAX);
                self.set_pinch(pinch)
            }
            InputEvent::DragEnd => {
                self.drag_pinch = self.params.pinch;
                Ok(())
            }
            InputEvent::Wheel { up } => {
                let segments = if up {
                    self.params.segments.saturating_add(1)
                } else {
                    self.params.segments.saturating_sub(1)
                };
                self.set_segments(segments)
            }
            InputEvent::CycleEven => self.cycle_even(),
            InputEvent::SegmentsText(text) => self.submit_segments_text(&text),
            InputEvent::PinchText(text) => self.submit_pinch_text(&text),
            InputEvent::SelectionChanged { selected, extend } => {
                if self.selection_enabled {
                    self.sync_selection(&selected, extend).map(|_| ())
                } else {
                    Ok(())
                }
            }
            InputEvent::Confirm => return Ok(Outcome::Finished),
            InputEvent::Cancel => return Ok(Outcome::Cancelled),
        };
        match result {
            Ok(()) => Ok(Outcome::Running),
            Err(e) if e.is_input_error() => {
                warn!("Rejected input: {e}");
                Err(e)
            }
            Err(_) => Ok(Outcome::Cancelled),
        }
    }

    /// End the session, keeping the edits. The selection flags are cleared.
    pub fn commit(mut self) -> A {
        info!(
            "Committing connect with {} segments and pinch {}",
            self.params.segments, self.params.pinch
        );
        self.live.clear_selection();
        self.live
    }

    /// End the session, discarding the edits.
    pub fn cancel(self) -> A {
        info!("Cancelled connect, restoring the original mesh");
        self.snapshot
    }
}

#[cfg(test)]
mod test {
    use glam::dvec2;

    use super::*;
    use crate::mesh::Mesh;

    fn quad_with_opposite_edges() -> Mesh {
        let mut mesh = Mesh::quad_grid(1, 1, dvec2(1., 1.)).expect("Cannot create grid");
        for (a, b) in [(0u32, 1u32), (2, 3)] {
            let e = mesh.find_edge(a.into(), b.into()).expect("Cannot find edge");
            mesh.select_edge(e, true).expect("Cannot select edge");
        }
        mesh
    }

    fn started(mesh: Mesh, params: Params, prefs: &Preferences) -> Session<Mesh> {
        let mut session = Session::new(mesh, params, prefs);
        session.rebuild_topology().expect("Cannot rebuild");
        session
    }

    #[test]
    fn t_session_quad() {
        let original = quad_with_opposite_edges();
        let session = started(
            original.clone(),
            Params {
                segments: 2,
                ..Default::default()
            },
            &Preferences::default(),
        );
        assert_eq!(session.selected_edges().len(), 2);
        assert_eq!(session.mesh().num_vertices(), 8);
        assert_eq!(session.mesh().num_faces(), 3);
        assert_eq!(session.snapshot().selected_edges().count(), 0);
        let result = session.commit();
        assert_eq!(result.num_edges(), 10);
        assert_eq!(result.selected_edges().count(), 0);
    }

    #[test]
    fn t_segments_change_rebuilds() {
        let mut session = started(
            quad_with_opposite_edges(),
            Params::default(),
            &Preferences::default(),
        );
        assert_eq!(session.mesh().num_faces(), 2);
        session.set_segments(3).expect("Cannot set segments");
        assert_eq!(session.mesh().num_vertices(), 10);
        assert_eq!(session.mesh().num_faces(), 4);
        session.set_segments(0).expect("Cannot set segments");
        assert_eq!(session.params().segments, 1);
        assert_eq!(session.mesh().num_vertices(), 6);
        session.set_segments(u32::MAX).expect("Cannot set segments");
        assert_eq!(session.params().segments, SEGMENTS_MAX);
        assert_eq!(session.mesh().num_vertices(), 4 + 2 * SEGMENTS_MAX as usize);
        // The wheel cannot go past the upper bound.
        assert_eq!(
            session
                .handle(InputEvent::Wheel { up: true })
                .expect("Cannot handle event"),
            Outcome::Running
        );
        assert_eq!(session.params().segments, SEGMENTS_MAX);
    }

    #[test]
    fn t_text_input() {
        let mut session = started(
            quad_with_opposite_edges(),
            Params::default(),
            &Preferences::default(),
        );
        assert!(matches!(
            session.submit_segments_text("two"),
            Err(Error::NotAnInteger(_))
        ));
        assert!(matches!(
            session.submit_pinch_text("150"),
            Err(Error::OutOfRange { value: 150, .. })
        ));
        assert!(matches!(
            session.submit_segments_text("0"),
            Err(Error::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            session.submit_segments_text("4294967295"),
            Err(Error::OutOfRange {
                value: 4294967295,
                max: 1000,
                ..
            })
        ));
        assert!(matches!(
            session.handle(InputEvent::SegmentsText("1001".into())),
            Err(Error::OutOfRange { value: 1001, .. })
        ));
        assert_eq!(session.params(), Params::default());
        session.submit_pinch_text("-").expect("Partial input is ignored");
        session.submit_pinch_text("").expect("Empty input is ignored");
        session.submit_pinch_text("-40").expect("Cannot set pinch");
        session.submit_segments_text(" 4 ").expect("Cannot set segments");
        assert_eq!(session.params().pinch, -40);
        assert_eq!(session.params().segments, 4);
    }

    #[test]
    fn t_failed_rebuild_rolls_back() {
        let mut mesh = quad_with_opposite_edges();
        // Collapse the bottom edge so it cannot be split.
        mesh.set_point(1.into(), glam::dvec3(0., 0., 0.))
            .expect("Cannot set point");
        let mut session = Session::new(mesh, Params::default(), &Preferences::default());
        assert!(matches!(
            session.rebuild_topology(),
            Err(Error::SubdivisionFailed { .. })
        ));
        assert_eq!(session.mesh(), session.snapshot());
        assert!(session.state().groups().is_empty());
        assert_eq!(
            session
                .handle(InputEvent::Wheel { up: true })
                .expect("Fatal errors end the session"),
            Outcome::Cancelled
        );
        assert_eq!(session.mesh(), session.snapshot());
    }

    #[test]
    fn t_drag_pinch() {
        let mut session = started(
            quad_with_opposite_edges(),
            Params {
                segments: 3,
                ..Default::default()
            },
            &Preferences::default(),
        );
        let run = |s: &mut Session<Mesh>, e| s.handle(e).expect("Cannot handle event");
        assert_eq!(run(&mut session, InputEvent::Drag { dx: 41 }), Outcome::Running);
        assert_eq!(session.params().pinch, 20);
        run(&mut session, InputEvent::Drag { dx: 500 });
        assert_eq!(session.params().pinch, 100);
        run(&mut session, InputEvent::Drag { dx: 60 });
        assert_eq!(session.params().pinch, 30);
        run(&mut session, InputEvent::DragEnd);
        run(&mut session, InputEvent::Drag { dx: -20 });
        assert_eq!(session.params().pinch, 20);
        run(&mut session, InputEvent::CycleEven);
        assert_eq!(session.params().even, EvenMode::In);
        assert_eq!(run(&mut session, InputEvent::Confirm), Outcome::Finished);
    }

    #[test]
    fn t_hud_lines() {
        let session = started(
            quad_with_opposite_edges(),
            Params {
                segments: 2,
                pinch: -5,
                even: EvenMode::Out,
            },
            &Preferences::default(),
        );
        let texts: Vec<String> = session
            .hud(&Preferences::default())
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(
            texts,
            [
                "Pinch: -5 (CTRL + Mouse)",
                "Segments: 2 (CTRL + MouseWheel)",
                "Even: OUT (E)",
                "Accept (Enter) Cancel (ESC)",
            ]
        );
    }

    #[test]
    fn t_selection_sync() {
        // Three quads in a row, the bottom edges of the first two selected.
        let mut mesh = Mesh::quad_grid(3, 1, dvec2(3., 1.)).expect("Cannot create grid");
        let edge = |m: &Mesh, a: u32, b: u32| {
            m.find_edge(a.into(), b.into()).expect("Cannot find edge")
        };
        let (e01, e12, e45, e56) = (
            edge(&mesh, 0, 1),
            edge(&mesh, 1, 2),
            edge(&mesh, 4, 5),
            edge(&mesh, 5, 6),
        );
        for e in [e01, e45] {
            mesh.select_edge(e, true).expect("Cannot select edge");
        }
        let prefs = Preferences {
            selection_enabled: true,
            ..Default::default()
        };
        let mut session = started(
            mesh,
            Params {
                segments: 2,
                ..Default::default()
            },
            &prefs,
        );
        assert_eq!(session.mesh().num_faces(), 5);
        // Nothing changed.
        let live = GeometryAdapter::selected_edges(session.mesh());
        assert!(!session.sync_selection(&live, false).expect("Cannot sync"));
        // Select two more edges of the middle quad.
        let mut live = live;
        live.extend([e12, e56]);
        assert!(session.sync_selection(&live, true).expect("Cannot sync"));
        assert_eq!(session.selected_edges().len(), 4);
        assert_eq!(session.mesh().num_faces(), 7);
        // Deselecting a piece of a split edge removes the whole edge.
        let piece = session
            .state()
            .lineage
            .iter()
            .find(|(_, orig)| **orig == e12)
            .map(|(piece, _)| *piece)
            .expect("Edge was not split");
        let live: Vec<EH> = GeometryAdapter::selected_edges(session.mesh())
            .into_iter()
            .filter(|e| *e != piece)
            .collect();
        assert!(session.sync_selection(&live, false).expect("Cannot sync"));
        assert!(!session.selected_edges().contains(&e12));
        assert_eq!(session.selected_edges().len(), 3);
    }

    #[test]
    fn t_selection_ignored_when_disabled() {
        let mut session = started(
            quad_with_opposite_edges(),
            Params::default(),
            &Preferences::default(),
        );
        let outcome = session
            .handle(InputEvent::SelectionChanged {
                selected: Vec::new(),
                extend: false,
            })
            .expect("Cannot handle event");
        assert_eq!(outcome, Outcome::Running);
        assert_eq!(session.selected_edges().len(), 2);
    }

    #[test]
    fn t_cancel_restores_original() {
        let original = quad_with_opposite_edges();
        let mut session = started(original.clone(), Params::default(), &Preferences::default());
        session.set_segments(4).expect("Cannot set segments");
        session.set_pinch(70).expect("Cannot set pinch");
        session.set_even(EvenMode::Out).expect("Cannot set even");
        assert_eq!(
            session.handle(InputEvent::Cancel).expect("Cannot cancel"),
            Outcome::Cancelled
        );
        let mut expected = original;
        expected.clear_selection();
        assert_eq!(session.cancel(), expected);
    }
}
