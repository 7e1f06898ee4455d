//! Top-level design container.
//!
//! A [`Design`] owns the metamodel binding, the identity manager, the
//! stable and transient frames, the constraint list and the linear
//! undo/redo history. New versions are produced transactionally: derive a
//! transient frame, mutate it through a [`FrameEditor`], then ask the
//! design to accept it. Acceptance verifies the frame and either freezes
//! it into a stable frame on the history or reports the violations and
//! leaves the transient frame open.

mod design;
mod editor;

#[cfg(test)]
mod tests;

pub use design::Design;
pub use editor::FrameEditor;
