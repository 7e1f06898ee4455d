//! Core types of the atelier store.
//!
//! The crate defines the identifier newtypes, the [`Variant`] value model
//! with its conversion and comparison rules, the structural shape of
//! objects, the immutable-once-frozen [`ObjectSnapshot`], and the metamodel
//! description consumed by the rest of the workspace.
//!
//! [`Variant`]: crate::value::Variant
//! [`ObjectSnapshot`]: crate::snapshot::ObjectSnapshot

pub mod id;
pub mod metamodel;
pub mod snapshot;
pub mod structure;
pub mod value;

pub use id::{FrameId, ObjectId, SnapshotId};
pub use metamodel::{AttributeDescriptor, Metamodel, ObjectType, StaticMetamodel, TypeFlags};
pub use snapshot::{AttributeError, Children, ObjectSnapshot, SnapshotState};
pub use structure::{Structure, StructuralKind};
pub use value::{AtomArray, AtomType, AtomValue, ValueError, ValueType, Variant};
