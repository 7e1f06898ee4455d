//! Frame verification.
//!
//! Acceptance of a transient frame runs three verifiers in order:
//! referential integrity, hierarchy coherence, and metamodel constraints.
//! The first two guard invariants the mutation API maintains — their
//! violation is a programmer error — while constraint violations are
//! ordinary user errors the caller fixes and retries.

mod constraint;
mod error;
mod integrity;
mod predicate;

pub use constraint::{Constraint, ConstraintVerifier, Requirement};
pub use error::{ConstraintViolation, HierarchyError, IntegrityError};
pub use integrity::{HierarchyVerifier, IntegrityVerifier};
pub use predicate::Predicate;

use atelier_error::Error;

/// Trait for verification.
pub trait Verifier {
    /// Verifies the target held by the verifier.
    fn verify(&self) -> Result<(), Error>;
}
