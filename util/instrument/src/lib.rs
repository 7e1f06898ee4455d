//! Import and export of raw designs.
//!
//! The raw representation ([`RawDesign`]) is the foreign, untyped shape a
//! design takes outside the store: snapshots with raw identifiers, frames
//! listing snapshot references, named references and lists. The
//! [`Loader`] validates and materializes a raw design — into a new
//! [`Design`](atelier_design::Design) or into an open transient frame —
//! and the [`Extractor`] produces the raw form back. Loading stages all
//! work on a scratch identity manager and touches the target only in the
//! final phase, so a failed load leaves the target unchanged.

mod error;
mod extract;
mod file;
mod load;
mod raw;
mod value;

pub use error::{Collection, ItemError, ItemErrorKind, LoaderError, RawIdKind};
pub use extract::Extractor;
pub use file::{Export, Import};
pub use load::{IdentityStrategy, Loader, LoaderOptions};
pub use raw::{
    RawDesign, RawFrame, RawId, RawList, RawReference, RawSnapshot, RawStructure,
};
pub use value::{decode_variant, encode_variant, CodedValue, CodingError};

/// Name of the system reference designating the current frame.
pub const CURRENT_FRAME_REFERENCE: &str = "current_frame";
/// Name of the system list holding the undoable frames.
pub const UNDO_LIST: &str = "undo";
/// Name of the system list holding the redoable frames.
pub const REDO_LIST: &str = "redo";
