/*!
An interactive connect-edges operator for polygon meshes, built on a halfedge
mesh inspired by [OpenMesh](https://www.graphics.rwth-aachen.de/software/openmesh/).

# Overview

+ Selected edges that border the same face are split into evenly spaced
  segments, and the new vertices on neighbouring edges of each face are joined
  by bridging edges that split the face. See [`ConnectState`].

+ The new vertices can then be pinched together or pushed apart along their
  edges, optionally evened out across edges of different lengths. Only the
  positions change, never the topology. See [`compute_scale_factor`] and
  [`EvenMode`].

+ A [`Session`] drives the operation interactively. It keeps a snapshot of the
  mesh it started from, and rebuilds from that snapshot whenever the number of
  segments or the selection changes. Committing returns the edited mesh and
  cancelling returns the snapshot unchanged.

+ The operator works with any mesh that implements [`GeometryAdapter`]. This
  crate provides [`Mesh`], a halfedge polygon mesh with `f64` positions using
  the [`glam`](https://crates.io/crates/glam) crate. Meshes can be loaded from
  OBJ files with the `obj` feature, which is enabled by default.
*/

mod adapter;
mod builder;
mod check;
mod edit;
mod element;
mod error;
mod hud;
mod input;
mod iterator;
mod macros;
mod mesh;
#[cfg(feature = "obj")]
mod obj;
mod prefs;
mod primitive;
mod property;
mod session;
mod spacing;
mod status;
mod topol;

pub use adapter::{Corner, GeometryAdapter};
pub use builder::{ConnectState, GroupEdge, OrderedGroup, edge_ring, group_by_face, order_group_ccw};
pub use element::{EH, FH, HH, Handle, HasTopology, VH};
pub use error::Error;
pub use hud::HudLine;
pub use input::{InputEvent, Outcome};
pub use mesh::Mesh;
pub use prefs::Preferences;
pub use property::{EProperty, Property, VProperty};
pub use session::{PINCH_MAX, PINCH_MIN, Params, SEGMENTS_MAX, SEGMENTS_MIN, Session};
pub use spacing::{EvenMode, apply, compute_scale_factor, pinch_factor};
pub use status::Status;
pub use topol::Topology;
