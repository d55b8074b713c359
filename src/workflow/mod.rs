//! Workflow graph model.
//!
//! A workflow is a tree of scopes. Each scope is a singly linked list of
//! states threaded through `next`, from the scope's start state to its one
//! end state. Parallel states own an ordered list of branch scopes that are
//! laid out side by side.

mod edit;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;

pub use edit::{MoveOutcome, NoOpReason};
pub use error::WorkflowError;

pub use crate::ir::StateKind;
use crate::ir::{Parameters, StateDefinition, WorkflowDefinition};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: String,
    pub kind: StateKind,
    pub next: Option<String>,
    pub end: bool,
    pub comment: Option<String>,
    pub parameters: Parameters,
    /// Only populated for [`StateKind::Parallel`].
    pub branches: Vec<WorkflowGraph>,
}

impl State {
    pub fn is_branch_root(&self) -> bool {
        self.kind == StateKind::Parallel && !self.branches.is_empty()
    }

    pub fn to_definition(&self) -> StateDefinition {
        StateDefinition {
            kind: self.kind,
            next: self.next.clone(),
            end: self.end,
            comment: self.comment.clone(),
            parameters: self.parameters.trimmed(),
            branches: self.branches.iter().map(WorkflowGraph::serialize).collect(),
        }
    }
}

/// One scope of a workflow: the top level or a branch of a Parallel state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowGraph {
    start_id: String,
    end_id: String,
    states: BTreeMap<String, State>,
    parent: Option<String>,
}

impl WorkflowGraph {
    /// Builds the scope tree from a plain definition.
    ///
    /// Ids come from the state map keys and must be unique across the whole
    /// tree. Every scope is walked once so that cycles, dangling `Next`
    /// references and orphan states are reported here instead of hanging a
    /// later layout pass.
    pub fn from_definition(definition: &WorkflowDefinition) -> Result<Self, WorkflowError> {
        let mut seen = HashSet::new();
        let graph = Self::build_scope(definition, None, &mut seen)?;
        graph.validate()?;
        Ok(graph)
    }

    fn build_scope(
        definition: &WorkflowDefinition,
        parent: Option<&str>,
        seen: &mut HashSet<String>,
    ) -> Result<Self, WorkflowError> {
        if !definition.states.contains_key(&definition.start_at) {
            return Err(WorkflowError::MalformedGraph(format!(
                "start state '{}' is not declared in its scope",
                definition.start_at
            )));
        }

        let mut states = BTreeMap::new();
        for (id, state) in &definition.states {
            if !seen.insert(id.clone()) {
                return Err(WorkflowError::MalformedGraph(format!(
                    "state id '{id}' is declared more than once"
                )));
            }
            let branches = match state.kind {
                StateKind::Parallel => {
                    if state.branches.is_empty() {
                        return Err(WorkflowError::MalformedGraph(format!(
                            "parallel state '{id}' has no branches"
                        )));
                    }
                    state
                        .branches
                        .iter()
                        .map(|branch| Self::build_scope(branch, Some(id), seen))
                        .collect::<Result<Vec<_>, _>>()?
                }
                _ => {
                    if !state.branches.is_empty() {
                        return Err(WorkflowError::MalformedGraph(format!(
                            "{} state '{id}' cannot own branches",
                            state.kind.as_str()
                        )));
                    }
                    Vec::new()
                }
            };
            states.insert(
                id.clone(),
                State {
                    id: id.clone(),
                    kind: state.kind,
                    next: state.next.clone(),
                    end: state.end,
                    comment: state.comment.clone(),
                    parameters: state.parameters.clone(),
                    branches,
                },
            );
        }

        let end_id = find_end(&states)?;
        Ok(Self {
            start_id: definition.start_at.clone(),
            end_id,
            states,
            parent: parent.map(str::to_string),
        })
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn end_id(&self) -> &str {
        &self.end_id
    }

    /// Id of the Parallel state owning this scope, `None` at the top level.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// Looks `id` up in this scope only.
    pub fn resolve(&self, id: &str) -> Result<&State, WorkflowError> {
        self.states
            .get(id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))
    }

    /// Depth-first lookup through this scope and every nested branch.
    pub fn find(&self, id: &str) -> Option<&State> {
        if let Some(state) = self.states.get(id) {
            return Some(state);
        }
        self.states
            .values()
            .flat_map(|state| state.branches.iter())
            .find_map(|branch| branch.find(id))
    }

    /// Total number of states in this scope and all nested branches.
    pub fn state_count(&self) -> usize {
        self.states
            .values()
            .map(|state| 1 + state.branches.iter().map(Self::state_count).sum::<usize>())
            .sum()
    }

    /// States of this scope in `next` order, start first and end last.
    pub fn sequence(&self) -> Result<Vec<&State>, WorkflowError> {
        let mut visited = HashSet::new();
        let mut ordered = Vec::with_capacity(self.states.len());
        let mut current = self.start_id.as_str();
        loop {
            if !visited.insert(current) {
                return Err(WorkflowError::MalformedGraph(format!(
                    "cycle through state '{current}'"
                )));
            }
            let state = self.states.get(current).ok_or_else(|| {
                WorkflowError::MalformedGraph(format!(
                    "'{current}' is referenced but not declared in this scope"
                ))
            })?;
            ordered.push(state);
            if state.end {
                break;
            }
            current = state.next.as_deref().ok_or_else(|| {
                WorkflowError::MalformedGraph(format!(
                    "state '{}' has neither Next nor End",
                    state.id
                ))
            })?;
        }

        if ordered.len() != self.states.len() {
            let mut orphans: Vec<&str> = self
                .states
                .keys()
                .map(String::as_str)
                .filter(|id| !visited.contains(id))
                .collect();
            orphans.sort_unstable();
            return Err(WorkflowError::MalformedGraph(format!(
                "unreachable states: {}",
                orphans.join(", ")
            )));
        }
        Ok(ordered)
    }

    /// Checks the linked-list invariants of this scope and every branch.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        for state in self.sequence()? {
            for branch in &state.branches {
                branch.validate()?;
            }
        }
        Ok(())
    }

    /// Plain tree without derived ids or scope bookkeeping.
    pub fn serialize(&self) -> WorkflowDefinition {
        WorkflowDefinition {
            start_at: self.start_id.clone(),
            states: self
                .states
                .iter()
                .map(|(id, state)| (id.clone(), state.to_definition()))
                .collect(),
        }
    }

    /// Recomputes the cached end id and parent reference of every scope.
    fn rebuild(&mut self, parent: Option<&str>) -> Result<(), WorkflowError> {
        self.parent = parent.map(str::to_string);
        self.end_id = find_end(&self.states)?;
        for state in self.states.values_mut() {
            let owner = state.id.as_str();
            for branch in &mut state.branches {
                branch.rebuild(Some(owner))?;
            }
        }
        Ok(())
    }
}

impl TryFrom<&WorkflowDefinition> for WorkflowGraph {
    type Error = WorkflowError;

    fn try_from(definition: &WorkflowDefinition) -> Result<Self, Self::Error> {
        Self::from_definition(definition)
    }
}

fn find_end(states: &BTreeMap<String, State>) -> Result<String, WorkflowError> {
    let mut ends = states.values().filter(|state| state.end);
    let Some(end) = ends.next() else {
        return Err(WorkflowError::MalformedGraph(
            "scope has no End state".to_string(),
        ));
    };
    if let Some(other) = ends.next() {
        return Err(WorkflowError::MalformedGraph(format!(
            "scope has several End states ('{}', '{}')",
            end.id, other.id
        )));
    }
    if end.next.is_some() {
        return Err(WorkflowError::MalformedGraph(format!(
            "End state '{}' also declares Next",
            end.id
        )));
    }
    Ok(end.id.clone())
}
