//! Referential-integrity and hierarchy verification.

use std::collections::HashSet;

use atelier_error::Error;
use atelier_store::Frame;
use atelier_types::ObjectId;

use crate::error::{HierarchyError, IntegrityError};
use crate::Verifier;

/// Verifies that every structural dependency of every snapshot — edge
/// endpoints and parents — resolves to an object within the frame.
pub struct IntegrityVerifier<'a> {
    frame: &'a dyn Frame,
}

impl<'a> IntegrityVerifier<'a> {
    pub fn new(frame: &'a dyn Frame) -> Self {
        IntegrityVerifier { frame }
    }
}

impl Verifier for IntegrityVerifier<'_> {
    fn verify(&self) -> Result<(), Error> {
        for snapshot in self.frame.snapshots() {
            for dependency in snapshot.structural_dependencies() {
                if !self.frame.contains(dependency) {
                    return Err(IntegrityError::MissingDependency {
                        object: snapshot.object_id(),
                        missing: dependency,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Verifies parent/child coherence in both directions and that the parent
/// relation forms a forest.
pub struct HierarchyVerifier<'a> {
    frame: &'a dyn Frame,
}

impl<'a> HierarchyVerifier<'a> {
    pub fn new(frame: &'a dyn Frame) -> Self {
        HierarchyVerifier { frame }
    }

    fn check_coherence(&self) -> Result<(), HierarchyError> {
        for snapshot in self.frame.snapshots() {
            if let Some(parent) = snapshot.parent() {
                let lists_child = self
                    .frame
                    .object(parent)
                    .map(|owner| owner.children().contains(snapshot.object_id()))
                    .unwrap_or(false);
                if !lists_child {
                    return Err(HierarchyError::MissingChildEntry {
                        parent,
                        child: snapshot.object_id(),
                    });
                }
            }
            for child in snapshot.children().iter() {
                let points_back = self
                    .frame
                    .object(child)
                    .map(|owned| owned.parent() == Some(snapshot.object_id()))
                    .unwrap_or(false);
                if !points_back {
                    return Err(HierarchyError::MissingParentPointer {
                        parent: snapshot.object_id(),
                        child,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), HierarchyError> {
        let mut cleared: HashSet<ObjectId> = HashSet::new();
        for snapshot in self.frame.snapshots() {
            let mut trail: HashSet<ObjectId> = HashSet::new();
            let mut current = snapshot.object_id();
            loop {
                if cleared.contains(&current) {
                    break;
                }
                if !trail.insert(current) {
                    return Err(HierarchyError::ParentCycle(current));
                }
                match self.frame.object(current).and_then(|owner| owner.parent()) {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            cleared.extend(trail);
        }
        Ok(())
    }
}

impl Verifier for HierarchyVerifier<'_> {
    fn verify(&self) -> Result<(), Error> {
        self.check_coherence()?;
        self.check_acyclic()?;
        Ok(())
    }
}
