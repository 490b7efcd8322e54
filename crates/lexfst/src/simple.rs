// Arena transducer store: contiguous state ids, per-state arc lists and
// hashed first-match lookup.

use hashbrown::{HashMap, HashSet};

use crate::arc::{Arc, StateId};
use crate::{FstError, Label};

/// Unweighted transducer held as an arena of states.
///
/// Each state owns its outgoing arcs in insertion order; states refer to
/// each other only by id, so cycles back to the start state need no
/// ownership tricks. Two hash indices map `(state, ilabel)` and
/// `(state, ilabel, olabel)` to the first matching arc, which keeps trie
/// insertion on wide start states constant time per symbol.
#[derive(Debug, Clone)]
pub struct SimpleFst<L: Label> {
    epsilon: L,
    states: Vec<Vec<Arc<L>>>,
    finals: Vec<bool>,
    start: Option<StateId>,
    input_index: HashMap<(StateId, L), usize>,
    pair_index: HashMap<(StateId, L, L), usize>,
}

impl<L: Label> SimpleFst<L> {
    /// Create an empty transducer. `epsilon` is the label treated as "no
    /// symbol" by [`accepts`](Self::accepts) and [`add_self_loops`](Self::add_self_loops).
    pub fn new(epsilon: L) -> Self {
        Self {
            epsilon,
            states: Vec::new(),
            finals: Vec::new(),
            start: None,
            input_index: HashMap::new(),
            pair_index: HashMap::new(),
        }
    }

    pub fn epsilon(&self) -> &L {
        &self.epsilon
    }

    /// Allocate a fresh state. Ids are handed out contiguously from 0.
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(Vec::new());
        self.finals.push(false);
        id
    }

    /// Allocate `count` states and return the id of the first one.
    pub fn add_states(&mut self, count: usize) -> StateId {
        let first = self.states.len() as StateId;
        self.states.resize_with(self.states.len() + count, Vec::new);
        self.finals.resize(self.finals.len() + count, false);
        first
    }

    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_arcs(&self) -> usize {
        self.states.iter().map(Vec::len).sum()
    }

    pub fn set_start(&mut self, state: StateId) -> Result<(), FstError> {
        self.check_state(state)?;
        self.start = Some(state);
        Ok(())
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn set_final(&mut self, state: StateId) -> Result<(), FstError> {
        self.check_state(state)?;
        self.finals[state as usize] = true;
        Ok(())
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.get(state as usize).copied().unwrap_or(false)
    }

    /// Allocate a state and make it the start state, also final when
    /// `is_final` is set.
    pub fn add_start_state(&mut self, is_final: bool) -> StateId {
        let state = self.add_state();
        self.start = Some(state);
        self.finals[state as usize] = is_final;
        state
    }

    /// Append an arc. Duplicates are not filtered.
    ///
    /// # Panics
    ///
    /// If `src` or `dst` has not been allocated by this transducer. Use
    /// [`try_add_arc`](Self::try_add_arc) for ids of unknown origin.
    pub fn add_arc(&mut self, src: StateId, dst: StateId, ilabel: L, olabel: L) {
        if let Err(err) = self.check_arc(src, dst) {
            panic!("cannot add arc {src} -> {dst}: {err}");
        }
        self.push_arc(src, dst, ilabel, olabel);
    }

    /// Append an arc after checking that both endpoints exist.
    pub fn try_add_arc(&mut self, src: StateId, dst: StateId, ilabel: L, olabel: L) -> Result<(), FstError> {
        self.check_arc(src, dst)?;
        self.push_arc(src, dst, ilabel, olabel);
        Ok(())
    }

    fn check_arc(&self, src: StateId, dst: StateId) -> Result<(), FstError> {
        self.check_state(src)?;
        self.check_state(dst)
    }

    fn push_arc(&mut self, src: StateId, dst: StateId, ilabel: L, olabel: L) {
        let arcs = &mut self.states[src as usize];
        let position = arcs.len();
        self.input_index
            .entry((src, ilabel.clone()))
            .or_insert(position);
        self.pair_index
            .entry((src, ilabel.clone(), olabel.clone()))
            .or_insert(position);
        arcs.push(Arc::new(src, dst, ilabel, olabel));
    }

    /// First arc leaving `state` that consumes `ilabel`, whatever it emits.
    pub fn find_arc(&self, state: StateId, ilabel: &L) -> Option<&Arc<L>> {
        let position = *self.input_index.get(&(state, ilabel.clone()))?;
        self.states.get(state as usize)?.get(position)
    }

    /// First arc leaving `state` labeled `ilabel:olabel`.
    pub fn find_arc_with_output(&self, state: StateId, ilabel: &L, olabel: &L) -> Option<&Arc<L>> {
        let position = *self
            .pair_index
            .get(&(state, ilabel.clone(), olabel.clone()))?;
        self.states.get(state as usize)?.get(position)
    }

    /// Outgoing arcs of `state` in insertion order. Unknown states have none.
    pub fn arcs(&self, state: StateId) -> &[Arc<L>] {
        self.states
            .get(state as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over all state ids.
    pub fn state_ids(&self) -> std::ops::Range<StateId> {
        0..self.states.len() as StateId
    }

    /// States entered by at least one arc that consumes a non-epsilon input.
    pub fn emitting_states(&self) -> Vec<StateId> {
        let mut seen = vec![false; self.states.len()];
        for arc in self.states.iter().flatten() {
            if arc.ilabel != self.epsilon {
                seen[arc.dst as usize] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter(|&(_, &emitting)| emitting)
            .map(|(id, _)| id as StateId)
            .collect()
    }

    /// Add an `ilabel:olabel` self loop on every emitting state.
    ///
    /// The emitting set is taken before any loop is added, so loops on a
    /// non-epsilon label do not turn further states into emitting ones.
    /// Returns the number of loops added.
    pub fn add_self_loops(&mut self, ilabel: L, olabel: L) -> usize {
        let emitting = self.emitting_states();
        for &state in &emitting {
            self.push_arc(state, state, ilabel.clone(), olabel.clone());
        }
        emitting.len()
    }

    /// Whether some path from the start state consumes exactly `input` and
    /// ends in a final state. Epsilon inputs are followed freely.
    pub fn accepts(&self, input: &[L]) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        let mut current = self.epsilon_closure([start].into_iter().collect());
        for label in input {
            let next: HashSet<StateId> = current
                .iter()
                .flat_map(|&state| self.arcs(state))
                .filter(|arc| &arc.ilabel == label)
                .map(|arc| arc.dst)
                .collect();
            if next.is_empty() {
                return false;
            }
            current = self.epsilon_closure(next);
        }
        current.iter().any(|&state| self.is_final(state))
    }

    fn epsilon_closure(&self, mut states: HashSet<StateId>) -> HashSet<StateId> {
        let mut pending: Vec<StateId> = states.iter().copied().collect();
        while let Some(state) = pending.pop() {
            for arc in self.arcs(state) {
                if arc.ilabel == self.epsilon && states.insert(arc.dst) {
                    pending.push(arc.dst);
                }
            }
        }
        states
    }

    fn check_state(&self, state: StateId) -> Result<(), FstError> {
        if (state as usize) < self.states.len() {
            Ok(())
        } else {
            Err(FstError::UnknownState(state))
        }
    }
}
