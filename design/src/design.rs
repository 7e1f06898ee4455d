use std::collections::BTreeMap;
use std::sync::Arc;

use atelier_error::Error;
use atelier_identity::IdentityManager;
use atelier_store::{Frame, FrameState, StableFrame, TransientFrame};
use atelier_types::{FrameId, Metamodel, ObjectId};
use atelier_verification::{
    ConstraintViolation, Constraint, ConstraintVerifier, HierarchyVerifier, IntegrityVerifier,
    Verifier,
};
use log::debug;

use crate::editor::FrameEditor;

impl std::fmt::Debug for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Design")
            .field("metamodel", &self.metamodel.name())
            .field("identity", &self.identity)
            .field("stable_frames", &self.stable_frames)
            .field("transient_frames", &self.transient_frames)
            .field("constraints", &self.constraints)
            .field("current_frame", &self.current_frame)
            .field("undo_list", &self.undo_list)
            .field("redo_list", &self.redo_list)
            .field("named_frames", &self.named_frames)
            .finish()
    }
}

/// The top-level container of frames, history and metamodel binding.
pub struct Design {
    metamodel: Arc<dyn Metamodel>,
    identity: IdentityManager,
    stable_frames: BTreeMap<FrameId, StableFrame>,
    transient_frames: BTreeMap<FrameId, TransientFrame>,
    constraints: Vec<Constraint>,
    current_frame: Option<FrameId>,
    undo_list: Vec<FrameId>,
    redo_list: Vec<FrameId>,
    named_frames: BTreeMap<String, FrameId>,
}

impl Design {
    /// Creates an empty design bound to a metamodel and its constraints.
    pub fn new(metamodel: Arc<dyn Metamodel>, constraints: Vec<Constraint>) -> Self {
        Design {
            metamodel,
            identity: IdentityManager::new(),
            stable_frames: BTreeMap::new(),
            transient_frames: BTreeMap::new(),
            constraints,
            current_frame: None,
            undo_list: Vec::new(),
            redo_list: Vec::new(),
            named_frames: BTreeMap::new(),
        }
    }

    /// Reassembles a design from previously extracted parts.
    ///
    /// This is the commit primitive of import tooling: the parts are
    /// trusted to be mutually consistent, the assembly itself cannot fail.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        metamodel: Arc<dyn Metamodel>,
        constraints: Vec<Constraint>,
        identity: IdentityManager,
        frames: Vec<StableFrame>,
        current_frame: Option<FrameId>,
        undo_list: Vec<FrameId>,
        redo_list: Vec<FrameId>,
        named_frames: BTreeMap<String, FrameId>,
    ) -> Self {
        let stable_frames: BTreeMap<FrameId, StableFrame> =
            frames.into_iter().map(|frame| (frame.id(), frame)).collect();
        for id in undo_list
            .iter()
            .chain(redo_list.iter())
            .chain(current_frame.iter())
            .chain(named_frames.values())
        {
            debug_assert!(stable_frames.contains_key(id), "restored unknown frame {id}");
        }
        Design {
            metamodel,
            identity,
            stable_frames,
            transient_frames: BTreeMap::new(),
            constraints,
            current_frame,
            undo_list,
            redo_list,
            named_frames,
        }
    }

    /// The metamodel the design enforces.
    pub fn metamodel(&self) -> &Arc<dyn Metamodel> {
        &self.metamodel
    }

    /// The constraint list.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The identity manager.
    pub fn identity(&self) -> &IdentityManager {
        &self.identity
    }

    /// Low-level mutable access to the identity manager, for import
    /// tooling which stages reservations before inserting snapshots.
    pub fn identity_mut(&mut self) -> &mut IdentityManager {
        &mut self.identity
    }

    /// Stable frame by id.
    pub fn frame(&self, id: FrameId) -> Option<&StableFrame> {
        self.stable_frames.get(&id)
    }

    /// Whether a stable frame with this id exists.
    pub fn contains_frame(&self, id: FrameId) -> bool {
        self.stable_frames.contains_key(&id)
    }

    /// Stable frames in ascending id order.
    pub fn frames(&self) -> impl Iterator<Item = &StableFrame> {
        self.stable_frames.values()
    }

    /// Id of the current frame, if any frame was accepted.
    pub fn current_frame_id(&self) -> Option<FrameId> {
        self.current_frame
    }

    /// The current frame.
    pub fn current_frame(&self) -> Option<&StableFrame> {
        self.current_frame.and_then(|id| self.stable_frames.get(&id))
    }

    /// Frames undoable from the current one, oldest first.
    pub fn undo_list(&self) -> &[FrameId] {
        &self.undo_list
    }

    /// Frames redoable from the current one, oldest first.
    pub fn redo_list(&self) -> &[FrameId] {
        &self.redo_list
    }

    /// Stable frame registered under a name.
    pub fn frame_named(&self, name: &str) -> Option<&StableFrame> {
        self.named_frames
            .get(name)
            .and_then(|id| self.stable_frames.get(id))
    }

    /// Named frame references.
    pub fn named_frames(&self) -> &BTreeMap<String, FrameId> {
        &self.named_frames
    }

    /// Registers a stable frame under a name.
    ///
    /// Panics when the frame does not exist.
    pub fn set_frame_name(&mut self, name: impl Into<String>, id: FrameId) {
        assert!(
            self.stable_frames.contains_key(&id),
            "naming unknown frame {id}",
        );
        self.named_frames.insert(name.into(), id);
    }

    /// Creates an empty open transient frame.
    pub fn create_frame(&mut self) -> FrameId {
        let id = FrameId::new(self.identity.next());
        self.transient_frames.insert(id, TransientFrame::new(id));
        id
    }

    /// Creates an open transient frame pre-populated with every snapshot
    /// of the given stable frame as shared references.
    ///
    /// Panics when the base frame does not exist.
    pub fn derive_frame(&mut self, base: FrameId) -> FrameId {
        let id = FrameId::new(self.identity.next());
        let base = match self.stable_frames.get(&base) {
            Some(frame) => frame,
            None => panic!("deriving from unknown frame {base}"),
        };
        let frame = TransientFrame::derived(id, base);
        self.transient_frames.insert(id, frame);
        id
    }

    /// Transient frame by id.
    pub fn transient_frame(&self, id: FrameId) -> Option<&TransientFrame> {
        self.transient_frames.get(&id)
    }

    /// Mutable transient frame by id, for import tooling; interactive
    /// mutation goes through [`Design::edit`].
    pub fn transient_frame_mut(&mut self, id: FrameId) -> Option<&mut TransientFrame> {
        self.transient_frames.get_mut(&id)
    }

    /// Opens the mutation API over a transient frame.
    ///
    /// Panics when the frame does not belong to this design.
    pub fn edit(&mut self, id: FrameId) -> FrameEditor<'_> {
        let metamodel = Arc::clone(&self.metamodel);
        let frame = match self.transient_frames.get_mut(&id) {
            Some(frame) => frame,
            None => panic!("editing unknown frame {id}"),
        };
        FrameEditor::new(metamodel, &mut self.identity, frame)
    }

    /// Accepts a transient frame and appends it to the history: the
    /// previous current frame goes onto the undo list, the redo list is
    /// cleared and the accepted frame becomes current.
    ///
    /// On a constraint violation the error lists every violated
    /// constraint with its offending objects; the transient frame stays
    /// open and untouched. Broken referential integrity or hierarchy is a
    /// programmer error and panics.
    pub fn accept(&mut self, frame: FrameId) -> Result<FrameId, Error> {
        self.accept_frame(frame, true)
    }

    /// Accepts a transient frame without touching the history. The frame
    /// becomes stable and addressable, but is not current, undoable or
    /// redoable.
    pub fn accept_detached(&mut self, frame: FrameId) -> Result<FrameId, Error> {
        self.accept_frame(frame, false)
    }

    fn accept_frame(&mut self, id: FrameId, append_history: bool) -> Result<FrameId, Error> {
        let frame = match self.transient_frames.get(&id) {
            Some(frame) => frame,
            None => panic!("accepting frame {id} which is not transient in this design"),
        };
        assert_eq!(frame.state(), FrameState::Open, "accepting frame {id} twice");
        assert!(
            !self.stable_frames.contains_key(&id),
            "accepting frame {id} which is already stable",
        );

        if let Err(error) = IntegrityVerifier::new(frame).verify() {
            panic!("frame {id} has broken referential integrity: {error}");
        }
        if let Err(error) = HierarchyVerifier::new(frame).verify() {
            panic!("frame {id} has a broken hierarchy: {error}");
        }
        ConstraintVerifier::new(frame, &self.constraints).verify()?;

        let frame = self
            .transient_frames
            .remove(&id)
            .expect("transient frame checked above");
        for raw in frame.introduced_ids() {
            // An id may already be permanent when a snapshot continues an
            // object line that another stable frame holds.
            let _ = self.identity.use_id(raw);
        }
        for raw in frame.retired_ids() {
            self.identity.release(*raw);
        }
        self.identity
            .use_id(id.raw())
            .unwrap_or_else(|error| panic!("frame id {id} already taken: {error}"));

        let stable = frame.freeze();
        debug!(
            "design: accepted frame {} with {} snapshots (history: {})",
            id,
            stable.len(),
            append_history,
        );
        self.stable_frames.insert(id, stable);

        if append_history {
            if let Some(previous) = self.current_frame {
                self.undo_list.push(previous);
            }
            self.redo_list.clear();
            self.current_frame = Some(id);
        }
        Ok(id)
    }

    /// Drops a transient frame without history effects and releases every
    /// id it reserved. Always safe.
    pub fn discard(&mut self, frame: FrameId) {
        let mut frame = match self.transient_frames.remove(&frame) {
            Some(frame) => frame,
            None => panic!("discarding frame {frame} which is not transient in this design"),
        };
        for raw in frame.introduced_ids() {
            self.identity.release(raw);
        }
        for raw in frame.retired_ids() {
            self.identity.release(*raw);
        }
        let id = frame.id();
        self.identity.release(id.raw());
        frame.discard();
        debug!("design: discarded frame {id}");
    }

    /// Moves the current frame back to `to`, which must be on the undo
    /// list. The frames between `to` and the old current frame, the old
    /// current frame included, move onto the front of the redo list.
    ///
    /// Panics when `to` is not undoable.
    pub fn undo(&mut self, to: FrameId) {
        let index = self
            .undo_list
            .iter()
            .position(|id| *id == to)
            .unwrap_or_else(|| panic!("undo to frame {to} which is not on the undo list"));
        let mut moved = self.undo_list.split_off(index);
        moved.remove(0);
        if let Some(current) = self.current_frame {
            moved.push(current);
        }
        moved.extend(self.redo_list.drain(..));
        self.redo_list = moved;
        self.current_frame = Some(to);
        debug!("design: undo to frame {to}");
    }

    /// Moves the current frame forward to `to`, which must be on the redo
    /// list. The inverse of [`Design::undo`].
    ///
    /// Panics when `to` is not redoable.
    pub fn redo(&mut self, to: FrameId) {
        let index = self
            .redo_list
            .iter()
            .position(|id| *id == to)
            .unwrap_or_else(|| panic!("redo to frame {to} which is not on the redo list"));
        let mut taken: Vec<FrameId> = self.redo_list.drain(..=index).collect();
        taken.pop();
        if let Some(current) = self.current_frame {
            self.undo_list.push(current);
        }
        self.undo_list.extend(taken);
        self.current_frame = Some(to);
        debug!("design: redo to frame {to}");
    }

    /// Adds a constraint after checking it over every stable frame, in
    /// ascending frame-id order. Any violation anywhere rejects the
    /// constraint and reports every violator.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), Error> {
        let mut violators: Vec<ObjectId> = Vec::new();
        for frame in self.stable_frames.values() {
            for violator in constraint.check(frame) {
                if !violators.contains(&violator) {
                    violators.push(violator);
                }
            }
        }
        if !violators.is_empty() {
            return Err(ConstraintViolation {
                violations: vec![(constraint.name().to_string(), violators)],
            }
            .into());
        }
        self.constraints.push(constraint);
        Ok(())
    }
}
