use std::fmt;

use atelier_error::impl_error_conversion_with_kind;
use atelier_types::ObjectId;
use thiserror::Error;

/// Broken structural references within a frame.
///
/// These indicate a defect in the code that populated the frame, not a
/// recoverable user condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A structural dependency points to an object absent from the frame.
    #[error("object {object} depends on {missing} which is not in the frame")]
    MissingDependency { object: ObjectId, missing: ObjectId },
}

/// Broken parent/child hierarchy within a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// A snapshot names a parent which does not list it as a child.
    #[error("object {child} names parent {parent} which does not list it as a child")]
    MissingChildEntry { parent: ObjectId, child: ObjectId },

    /// A snapshot lists a child which does not point back at it.
    #[error("object {parent} lists child {child} which does not point back at it")]
    MissingParentPointer { parent: ObjectId, child: ObjectId },

    /// The parent relation contains a cycle through the given object.
    #[error("parent/child cycle through object {0}")]
    ParentCycle(ObjectId),
}

/// Constraint violations collected over a frame.
///
/// Surfaced as a user error from frame acceptance; the transient frame
/// stays open so the caller can fix the population and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Offending objects per violated constraint, in constraint order.
    pub violations: Vec<(String, Vec<ObjectId>)>,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "constraint violation: ")?;
        for (index, (name, objects)) in self.violations.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{name} (")?;
            for (position, object) in objects.iter().enumerate() {
                if position > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{object}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl_error_conversion_with_kind!(
    IntegrityError,
    atelier_error::ErrorKind::Verification,
    atelier_error::Error
);
impl_error_conversion_with_kind!(
    HierarchyError,
    atelier_error::ErrorKind::Verification,
    atelier_error::Error
);
impl_error_conversion_with_kind!(
    ConstraintViolation,
    atelier_error::ErrorKind::Verification,
    atelier_error::Error
);
