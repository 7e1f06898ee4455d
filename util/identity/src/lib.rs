//! Allocator and gatekeeper for unique identifiers across a design.
//!
//! All identifier kinds (objects, snapshots, frames) draw from the single
//! unsigned integer space this manager administers. An id is either
//! `free`, `reserved` (spoken for, revocable) or `used` (permanent). Once
//! used, an id never becomes available again; reservations are working
//! state and are emptied at the end of every successful load or accept.

use std::collections::HashSet;

use atelier_error::impl_error_conversion_with_kind;
use thiserror::Error;

/// Failures of reservation and claiming.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The id is permanently taken.
    #[error("id {0} is already used")]
    AlreadyUsed(u64),
}

impl_error_conversion_with_kind!(
    IdentityError,
    atelier_error::ErrorKind::Identity,
    atelier_error::Error
);

/// Identity allocator of a design.
#[derive(Clone, Debug)]
pub struct IdentityManager {
    used: HashSet<u64>,
    reserved: HashSet<u64>,
    counter: u64,
}

impl Default for IdentityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityManager {
    /// Creates an empty manager; the first allocated id is `1`.
    pub fn new() -> Self {
        IdentityManager {
            used: HashSet::new(),
            reserved: HashSet::new(),
            counter: 1,
        }
    }

    /// Whether the id is permanently taken.
    pub fn is_used(&self, id: u64) -> bool {
        self.used.contains(&id)
    }

    /// Whether the id is currently reserved.
    pub fn is_reserved(&self, id: u64) -> bool {
        self.reserved.contains(&id)
    }

    /// Whether the id is neither used nor reserved.
    pub fn is_free(&self, id: u64) -> bool {
        !self.is_used(id) && !self.is_reserved(id)
    }

    fn advance(&mut self) -> u64 {
        while !self.is_free(self.counter) {
            self.counter += 1;
        }
        let id = self.counter;
        self.counter += 1;
        id
    }

    /// Returns the next free id and marks it reserved.
    pub fn next(&mut self) -> u64 {
        let id = self.advance();
        self.reserved.insert(id);
        id
    }

    /// Returns the next free id and marks it used directly.
    pub fn allocate(&mut self) -> u64 {
        let id = self.advance();
        self.used.insert(id);
        id
    }

    /// Reserves a specific id; idempotent when already reserved.
    pub fn reserve(&mut self, id: u64) -> Result<(), IdentityError> {
        if self.is_used(id) {
            return Err(IdentityError::AlreadyUsed(id));
        }
        self.reserved.insert(id);
        Ok(())
    }

    /// Reserves the id when it is free; reports whether the reservation
    /// took place.
    pub fn reserve_if_free(&mut self, id: u64) -> bool {
        if self.is_free(id) {
            self.reserved.insert(id);
            true
        } else {
            false
        }
    }

    /// Moves a reserved id to used, or claims a free id directly.
    pub fn use_id(&mut self, id: u64) -> Result<(), IdentityError> {
        if self.is_used(id) {
            return Err(IdentityError::AlreadyUsed(id));
        }
        self.reserved.remove(&id);
        self.used.insert(id);
        Ok(())
    }

    /// Drops a reservation; used ids are never released.
    pub fn release(&mut self, id: u64) {
        self.reserved.remove(&id);
    }

    /// Drops every outstanding reservation.
    pub fn release_all_reservations(&mut self) {
        self.reserved.clear();
    }

    /// Number of used ids.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Number of outstanding reservations.
    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }
}
