use thiserror::Error;

use crate::element::{EH, FH, HH, VH};

#[derive(Debug, Error)]
pub enum Error {
    // Properties.
    #[error("property access out of bounds")]
    OutOfBoundsAccess,
    // Topology.
    #[error("vertex {0} is not manifold")]
    ComplexVertex(VH),
    #[error("halfedge {0} is not manifold")]
    ComplexHalfedge(HH),
    #[error("unable to relink the patch around a new face")]
    PatchRelinkingFailed,
    #[error("vertex {0} is not on the boundary of face {1}")]
    VertexNotInFace(VH, FH),
    #[error("cannot split a face between {0} and {1}, they are already connected")]
    DegenerateSplit(VH, VH),
    #[error("the edge network on face {0} is not planar")]
    EdgeNetworkNotPlanar(FH),
    #[error("edge {0} has zero length")]
    DegenerateEdge(EH),
    #[error("vertex {0} is not an endpoint of edge {1}")]
    NotAnEndpoint(VH, EH),
    #[error("invalid split fraction {0}")]
    InvalidSplitFraction(f64),
    #[error("mesh topology is broken: {0}")]
    InvalidTopology(String),
    // Connect operation.
    #[error("failed to subdivide edge {edge}")]
    SubdivisionFailed {
        edge: EH,
        #[source]
        source: Box<Error>,
    },
    #[error("edge {0} does not exist in the original mesh")]
    UnknownEdge(EH),
    // User input.
    #[error("please enter an integer value, got {0:?}")]
    NotAnInteger(String),
    #[error("please enter a number between {min} and {max}, got {value}")]
    OutOfRange { value: i64, min: i64, max: i64 },
    // Preferences.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    // Obj.
    #[error("failed to load obj: {0}")]
    ObjLoadFailed(String),
    #[error("obj has {0} coordinates, which is not a multiple of 3")]
    IncorrectNumberOfCoordinates(usize),
}

impl Error {
    /// Errors caused by the user typing something unusable. These are reported
    /// and the previous value is kept. Everything else aborts the current
    /// rebuild.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::NotAnInteger(_) | Error::OutOfRange { .. })
    }
}
