// Arcs and state identifiers of the arena store.

/// State identifier. States are numbered contiguously from 0 in allocation
/// order and never removed.
pub type StateId = u32;

/// Labeled, unweighted transition.
///
/// Arcs live in the outgoing list of their source state, so `src` is kept
/// alongside `dst` only to make printed arcs self-contained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arc<L> {
    pub src: StateId,
    pub dst: StateId,
    pub ilabel: L,
    pub olabel: L,
}

impl<L> Arc<L> {
    pub fn new(src: StateId, dst: StateId, ilabel: L, olabel: L) -> Self {
        Self {
            src,
            dst,
            ilabel,
            olabel,
        }
    }

    /// True if the arc returns to its own source state.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_detection() {
        assert!(Arc::new(3, 3, 'x', 'x').is_self_loop());
        assert!(!Arc::new(3, 4, 'x', 'x').is_self_loop());
    }

    #[test]
    fn arcs_compare_by_all_fields() {
        let a = Arc::new(0, 1, "a", "A");
        assert_eq!(a, Arc::new(0, 1, "a", "A"));
        assert_ne!(a, Arc::new(0, 1, "a", "<eps>"));
    }
}
