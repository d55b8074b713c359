use tracing::debug;

use super::{State, WorkflowError, WorkflowGraph};

/// Address of a scope: the chain of `(parallel state id, branch index)`
/// pairs leading to it from the top level.
type ScopePath = Vec<(String, usize)>;

/// Why a move request left the graph untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The drop slot's preceding state is not in the workflow.
    UnknownAnchor,
    /// The dragged state is not in the workflow.
    UnknownState,
    /// The dragged state starts its scope.
    NoPredecessor,
    /// The state already sits right after the anchor.
    Unchanged,
    /// The anchor lives inside one of the dragged state's own branches.
    IntoOwnBranch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Ignored(NoOpReason),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }
}

impl WorkflowGraph {
    /// Relocates `active_id` so that it directly follows `after_id`.
    ///
    /// `after_id` is the state a drop slot is attached to. Requests that
    /// cannot be honoured are ignored and reported through
    /// [`MoveOutcome::Ignored`]. The relink runs on a deep copy that only
    /// replaces `self` once every scope of the copy has been rebuilt and
    /// walked; an error means the graph was already malformed and is left
    /// as it was.
    pub fn move_state(
        &mut self,
        active_id: &str,
        after_id: &str,
    ) -> Result<MoveOutcome, WorkflowError> {
        let outcome = self.plan_move(active_id, after_id);
        let (active_path, predecessor, anchor_path) = match outcome {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(active = %active_id, after = %after_id, ?reason, "move ignored");
                return Ok(MoveOutcome::Ignored(reason));
            }
        };

        let mut draft = self.clone();
        draft.relink(&active_path, active_id, &predecessor, &anchor_path, after_id)?;
        draft.rebuild(None)?;
        draft.validate()?;
        *self = draft;

        debug!(active = %active_id, after = %after_id, "move committed");
        Ok(MoveOutcome::Moved)
    }

    fn plan_move(
        &self,
        active_id: &str,
        after_id: &str,
    ) -> Result<(ScopePath, String, ScopePath), NoOpReason> {
        let anchor_path = self.scope_path(after_id).ok_or(NoOpReason::UnknownAnchor)?;
        let active_path = self.scope_path(active_id).ok_or(NoOpReason::UnknownState)?;
        let scope = self
            .scope_at(&active_path)
            .ok_or(NoOpReason::UnknownState)?;
        let predecessor = scope
            .predecessor_of(active_id)
            .ok_or(NoOpReason::NoPredecessor)?;

        if after_id == active_id || after_id == predecessor.id {
            return Err(NoOpReason::Unchanged);
        }
        if anchor_path.iter().any(|(owner, _)| owner == active_id) {
            return Err(NoOpReason::IntoOwnBranch);
        }

        Ok((active_path, predecessor.id.clone(), anchor_path))
    }

    fn relink(
        &mut self,
        active_path: &[(String, usize)],
        active_id: &str,
        predecessor_id: &str,
        anchor_path: &[(String, usize)],
        anchor_id: &str,
    ) -> Result<(), WorkflowError> {
        let source = self
            .scope_at_mut(active_path)
            .ok_or_else(|| WorkflowError::NotFound(active_id.to_string()))?;
        let mut active = source
            .states
            .remove(active_id)
            .ok_or_else(|| WorkflowError::NotFound(active_id.to_string()))?;
        let predecessor = source
            .states
            .get_mut(predecessor_id)
            .ok_or_else(|| WorkflowError::NotFound(predecessor_id.to_string()))?;
        if active.end {
            predecessor.next = None;
            predecessor.end = true;
        } else {
            predecessor.next = active.next.take();
        }
        active.end = false;
        active.next = None;

        let target = self
            .scope_at_mut(anchor_path)
            .ok_or_else(|| WorkflowError::NotFound(anchor_id.to_string()))?;
        let anchor = target
            .states
            .get_mut(anchor_id)
            .ok_or_else(|| WorkflowError::NotFound(anchor_id.to_string()))?;
        if anchor.end {
            anchor.end = false;
            anchor.next = Some(active_id.to_string());
            active.end = true;
        } else {
            active.next = anchor.next.replace(active_id.to_string());
        }
        target.states.insert(active_id.to_string(), active);
        Ok(())
    }

    fn scope_path(&self, id: &str) -> Option<ScopePath> {
        if self.states.contains_key(id) {
            return Some(Vec::new());
        }
        for state in self.states.values() {
            for (index, branch) in state.branches.iter().enumerate() {
                if let Some(mut path) = branch.scope_path(id) {
                    path.insert(0, (state.id.clone(), index));
                    return Some(path);
                }
            }
        }
        None
    }

    fn scope_at(&self, path: &[(String, usize)]) -> Option<&WorkflowGraph> {
        let Some(((owner, index), rest)) = path.split_first() else {
            return Some(self);
        };
        self.states.get(owner)?.branches.get(*index)?.scope_at(rest)
    }

    fn scope_at_mut(&mut self, path: &[(String, usize)]) -> Option<&mut WorkflowGraph> {
        let Some(((owner, index), rest)) = path.split_first() else {
            return Some(self);
        };
        self.states
            .get_mut(owner)?
            .branches
            .get_mut(*index)?
            .scope_at_mut(rest)
    }

    fn predecessor_of(&self, id: &str) -> Option<&State> {
        self.states
            .values()
            .find(|state| state.next.as_deref() == Some(id))
    }
}
