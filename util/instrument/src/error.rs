use atelier_error::impl_error_conversion_with_kind;
use atelier_types::{AttributeError, StructuralKind};
use derive_more::Display;
use thiserror::Error;

use crate::raw::RawId;

/// Which identifier namespace a raw id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RawIdKind {
    Object,
    Snapshot,
    Frame,
}

/// The raw collection an item error points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Collection {
    Snapshots,
    Frames,
    UserReferences,
    SystemReferences,
    UserLists,
    SystemLists,
}

/// Per-item loading failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemErrorKind {
    /// The same raw id occurs twice within one collection.
    #[error("duplicate foreign id {0}")]
    DuplicateForeignId(RawId),

    /// A reference or list names an entity type the loader does not know.
    #[error("unknown entity type {0:?}")]
    UnknownEntityType(String),

    /// Two references or lists share a name within one collection.
    #[error("duplicate name {0:?}")]
    DuplicateName(String),

    /// A raw id does not resolve to anything in this load.
    #[error("unknown id {0}")]
    UnknownId(RawId),

    /// A provided id clashes with the target identity space.
    #[error("{kind} id {raw} conflicts with an existing id")]
    ReservationConflict { kind: RawIdKind, raw: RawId },

    /// The raw snapshot names no object type.
    #[error("missing object type")]
    MissingObjectType,

    /// The named object type is not part of the metamodel.
    #[error("unknown object type {0:?}")]
    UnknownObjectType(String),

    /// The structural component is malformed.
    #[error("invalid structural type {0:?}")]
    InvalidStructuralType(String),

    /// The structural component disagrees with the object type.
    #[error("structural type mismatch, expected {expected}")]
    StructuralTypeMismatch { expected: StructuralKind },

    /// A frame contains two snapshots of the same object.
    #[error("duplicate object {0}")]
    DuplicateObject(RawId),

    /// A snapshot structurally depends on an object missing from its
    /// frame.
    #[error("broken structural integrity around {0}")]
    BrokenStructuralIntegrity(RawId),

    /// The parent relation within a frame contains a cycle.
    #[error("parent/child cycle")]
    ParentChildCycle,

    /// The same snapshot resolves to different children in different
    /// frames.
    #[error("children mismatch")]
    ChildrenMismatch,

    /// An attribute is not declared by the type or not convertible.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// An item error wrapped with its position for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{collection}[{index}]: {kind}")]
pub struct ItemError {
    pub collection: Collection,
    pub index: usize,
    pub kind: ItemErrorKind,
}

impl ItemError {
    pub(crate) fn new(collection: Collection, index: usize, kind: ItemErrorKind) -> Self {
        ItemError {
            collection,
            index,
            kind,
        }
    }
}

/// Loading failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// A failure tied to one item of one raw collection.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// Frames are present but no current frame is designated.
    #[error("missing current frame reference")]
    MissingCurrentFrame,

    /// A design-level reference names an unknown frame.
    #[error("unknown frame id {0}")]
    UnknownFrameId(RawId),
}

impl_error_conversion_with_kind!(
    LoaderError,
    atelier_error::ErrorKind::Loader,
    atelier_error::Error
);

impl LoaderError {
    /// The item error, when the failure is tied to a collection item.
    pub fn item(&self) -> Option<&ItemError> {
        match self {
            LoaderError::Item(item) => Some(item),
            _ => None,
        }
    }
}
