//! Interactive gesture state machine.
//!
//! An [`EditSession`] owns a mesh and lets at most one tool hold a gesture
//! at a time:
//!
//! ```text
//! Idle -> Previewing -> Active -> Confirmed
//!                           \---> Cancelled
//! ```
//!
//! Previewing never mutates. Beginning a gesture snapshots the mesh so the
//! tool can mutate speculatively; confirming yields an [`UndoRecord`] and
//! cancelling restores the snapshot exactly.

use mesh_types::{BRepMesh, MeshSnapshot, TopologyResult};
use tracing::{debug, info};

use crate::error::{EditResult, GestureError};

/// Lifecycle state of an edit session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GestureState {
    /// No tool is engaged.
    #[default]
    Idle,
    /// A tool shows hover feedback without mutating.
    Previewing,
    /// A tool has mutated the mesh speculatively.
    Active,
    /// The last gesture was kept.
    Confirmed,
    /// The last gesture was rolled back.
    Cancelled,
}

impl GestureState {
    /// Whether a new gesture may start from this state.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Idle | Self::Confirmed | Self::Cancelled)
    }
}

/// Interactive tools that can hold a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Face creation and bridging.
    CreateFace,
    /// Extrusion drag.
    Extrude,
    /// Loop cut with slide.
    LoopCut,
    /// Knife stroke.
    Knife,
    /// Face subdivision.
    Subdivide,
    /// Vertex merge.
    Merge,
    /// Deletion.
    Delete,
    /// Duplicate or separate.
    Duplicate,
}

/// Before and after snapshots of one confirmed gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoRecord {
    /// Tool that produced the change.
    pub tool: ToolKind,
    /// Mesh state before the gesture began.
    pub before: MeshSnapshot,
    /// Mesh state after confirmation.
    pub after: MeshSnapshot,
}

impl UndoRecord {
    /// Put `mesh` back into its pre-gesture state.
    ///
    /// # Errors
    ///
    /// Returns the snapshot restore error; `mesh` is untouched in that case.
    pub fn undo(&self, mesh: &mut BRepMesh) -> TopologyResult<()> {
        mesh.restore_in_place(&self.before)
    }

    /// Re-apply the gesture to `mesh`.
    ///
    /// # Errors
    ///
    /// Returns the snapshot restore error; `mesh` is untouched in that case.
    pub fn redo(&self, mesh: &mut BRepMesh) -> TopologyResult<()> {
        mesh.restore_in_place(&self.after)
    }
}

/// A mesh plus the gesture currently running on it.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    mesh: BRepMesh,
    state: GestureState,
    tool: Option<ToolKind>,
    snapshot: Option<MeshSnapshot>,
}

impl EditSession {
    /// Start an idle session on `mesh`.
    #[must_use]
    pub fn new(mesh: BRepMesh) -> Self {
        Self {
            mesh,
            ..Self::default()
        }
    }

    /// The mesh, for read-only queries in any state.
    #[must_use]
    pub const fn mesh(&self) -> &BRepMesh {
        &self.mesh
    }

    /// Give up the session and return its mesh.
    ///
    /// An active gesture is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Rollback`] if the active gesture cannot be
    /// rolled back.
    pub fn into_mesh(mut self) -> Result<BRepMesh, GestureError> {
        if self.state == GestureState::Active {
            self.cancel()?;
        }
        Ok(self.mesh)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    /// Tool holding the session while previewing or active.
    #[must_use]
    pub const fn active_tool(&self) -> Option<ToolKind> {
        match self.state {
            GestureState::Previewing | GestureState::Active => self.tool,
            _ => None,
        }
    }

    /// Enter hover feedback for `tool`.
    ///
    /// Switching the previewed tool is allowed; previewing while a gesture
    /// is active is not.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Busy`] while a gesture is active.
    pub fn preview(&mut self, tool: ToolKind) -> Result<&BRepMesh, GestureError> {
        self.ensure_not_active()?;
        self.state = GestureState::Previewing;
        self.tool = Some(tool);
        debug!(?tool, "Previewing");
        Ok(&self.mesh)
    }

    /// Start a gesture for `tool`, snapshotting the mesh for rollback.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Busy`] while another gesture is active.
    pub fn begin(&mut self, tool: ToolKind) -> Result<(), GestureError> {
        self.ensure_not_active()?;
        self.snapshot = Some(self.mesh.snapshot());
        self.state = GestureState::Active;
        self.tool = Some(tool);
        debug!(?tool, revision = self.mesh.revision(), "Gesture started");
        Ok(())
    }

    /// Mutable access to the mesh during an active gesture.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidTransition`] outside an active gesture.
    pub fn active_mesh(&mut self) -> Result<&mut BRepMesh, GestureError> {
        if self.state != GestureState::Active {
            return Err(GestureError::InvalidTransition {
                from: self.state,
                action: "edit",
            });
        }
        Ok(&mut self.mesh)
    }

    /// Keep the speculative mutation and release the tool.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidTransition`] outside an active gesture.
    pub fn confirm(&mut self) -> Result<UndoRecord, GestureError> {
        let (tool, before) = match (self.state, self.tool, self.snapshot.take()) {
            (GestureState::Active, Some(tool), Some(before)) => (tool, before),
            _ => {
                return Err(GestureError::InvalidTransition {
                    from: self.state,
                    action: "confirm",
                });
            }
        };
        self.state = GestureState::Confirmed;
        let record = UndoRecord {
            tool,
            before,
            after: self.mesh.snapshot(),
        };
        info!(?tool, revision = self.mesh.revision(), "Gesture confirmed");
        Ok(record)
    }

    /// Roll back an active gesture, or leave preview.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidTransition`] when nothing is running,
    /// or [`GestureError::Rollback`] if the snapshot cannot be restored. A
    /// failed rollback leaves the mesh and the gesture as they were.
    pub fn cancel(&mut self) -> Result<(), GestureError> {
        match self.state {
            GestureState::Active => {
                if let Some(snapshot) = &self.snapshot {
                    self.mesh.restore_in_place(snapshot)?;
                }
                self.snapshot = None;
                debug!(tool = ?self.tool, "Gesture cancelled");
            }
            GestureState::Previewing => {}
            from => {
                return Err(GestureError::InvalidTransition {
                    from,
                    action: "cancel",
                });
            }
        }
        self.state = GestureState::Cancelled;
        Ok(())
    }

    /// Run `edit` as one gesture: begin, apply, then confirm on success or
    /// cancel on failure.
    ///
    /// # Errors
    ///
    /// Returns the gesture error if the session is busy, or the edit's own
    /// error after the mesh has been rolled back.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_edit::{EditSession, ToolKind, extrude};
    /// use mesh_types::{Selection, Vector3, unit_quad};
    ///
    /// let mut session = EditSession::new(unit_quad());
    /// let (_, record) = session.run(ToolKind::Extrude, |mesh| {
    ///     let selection = Selection::faces(mesh.face_ids());
    ///     let extrusion = extrude(mesh, &selection)?;
    ///     extrusion.apply_offset(mesh, Vector3::z());
    ///     Ok(extrusion)
    /// })?;
    ///
    /// assert_eq!(session.mesh().face_count(), 6);
    /// assert_eq!(record.before.faces.len(), 1);
    /// # Ok::<(), mesh_edit::EditError>(())
    /// ```
    pub fn run<T>(
        &mut self,
        tool: ToolKind,
        edit: impl FnOnce(&mut BRepMesh) -> EditResult<T>,
    ) -> EditResult<(T, UndoRecord)> {
        self.begin(tool)?;
        match edit(&mut self.mesh) {
            Ok(value) => Ok((value, self.confirm()?)),
            Err(err) => {
                self.cancel()?;
                Err(err)
            }
        }
    }

    fn ensure_not_active(&self) -> Result<(), GestureError> {
        match (self.state, self.tool) {
            (GestureState::Active, Some(active)) => Err(GestureError::Busy { active }),
            _ => Ok(()),
        }
    }
}
