use crate::element::EH;

/// A discrete input event delivered to a running session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The pointer moved `dx` pixels horizontally since the drag started,
    /// while the drag modifier is held.
    Drag { dx: i32 },
    /// The drag modifier was released.
    DragEnd,
    /// The wheel turned while the modifier is held.
    Wheel { up: bool },
    CycleEven,
    /// Text typed into the segments field.
    SegmentsText(String),
    /// Text typed into the pinch field.
    PinchText(String),
    /// The user changed the selection of the live mesh. `selected` holds all
    /// the edges that are selected now. With `extend`, a single new edge is
    /// added as is, otherwise it is expanded to its edge ring.
    SelectionChanged { selected: Vec<EH>, extend: bool },
    Confirm,
    Cancel,
}

/// State of a session after it handled an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Running,
    /// The user confirmed. Take the result with `Session::commit`.
    Finished,
    /// The user cancelled, or a rebuild failed and was rolled back. Take the
    /// original mesh with `Session::cancel`.
    Cancelled,
}
