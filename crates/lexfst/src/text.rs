// AT&T text serialization, the interchange format read by `fstcompile`.
//
// One arc per line as `src\tdst\tilabel\tolabel`, one line holding only the
// state id for each final state. The start state is printed first because
// `fstcompile` takes the source of the first line as the initial state.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::arc::StateId;
use crate::simple::SimpleFst;
use crate::{FstError, Label};

impl<L: Label> SimpleFst<L> {
    /// Render the transducer in AT&T text format.
    ///
    /// Output is deterministic: states in id order (start state first), arcs
    /// in insertion order, each final line after the state's arcs. An empty
    /// transducer without a start state renders as the empty string.
    pub fn get_txt(&self) -> String {
        let mut txt = String::new();
        let Some(start) = self.start() else {
            return txt;
        };
        self.write_state(&mut txt, start);
        for state in self.state_ids().filter(|&s| s != start) {
            self.write_state(&mut txt, state);
        }
        txt
    }

    /// Write [`get_txt`](Self::get_txt) to `path`.
    pub fn write_txt(&self, path: impl AsRef<Path>) -> Result<(), FstError> {
        let path = path.as_ref();
        fs::write(path, self.get_txt()).map_err(|source| FstError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            states = self.num_states(),
            arcs = self.num_arcs(),
            "wrote transducer text"
        );
        Ok(())
    }

    fn write_state(&self, txt: &mut String, state: StateId) {
        for arc in self.arcs(state) {
            // Writing into a String cannot fail.
            let _ = writeln!(txt, "{}\t{}\t{}\t{}", arc.src, arc.dst, arc.ilabel, arc.olabel);
        }
        if self.is_final(state) {
            let _ = writeln!(txt, "{state}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transducer_prints_nothing() {
        let fst: SimpleFst<u32> = SimpleFst::new(0);
        assert_eq!(fst.get_txt(), "");
    }

    #[test]
    fn start_state_without_arcs_prints_final_line() {
        let mut fst = SimpleFst::new(0u32);
        let s = fst.add_state();
        fst.set_start(s).unwrap();
        fst.set_final(s).unwrap();
        assert_eq!(fst.get_txt(), "0\n");
    }

    #[test]
    fn arcs_and_finals_in_state_order() {
        let mut fst = SimpleFst::new(0u32);
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        fst.set_start(s0).unwrap();
        fst.set_final(s0).unwrap();
        fst.add_arc(s0, s1, 5, 7);
        fst.add_arc(s1, s0, 2, 0);
        assert_eq!(fst.get_txt(), "0\t1\t5\t7\n0\n1\t0\t2\t0\n");
    }

    #[test]
    fn non_zero_start_is_printed_first() {
        let mut fst = SimpleFst::new("<eps>");
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        fst.set_start(s1).unwrap();
        fst.set_final(s0).unwrap();
        fst.add_arc(s1, s0, "a", "A");
        assert_eq!(fst.get_txt(), "1\t0\ta\tA\n0\n");
    }

    #[test]
    fn write_txt_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.txt");
        let mut fst = SimpleFst::new('-');
        let s0 = fst.add_state();
        fst.set_start(s0).unwrap();
        fst.set_final(s0).unwrap();
        fst.add_arc(s0, s0, 'x', 'y');

        fst.write_txt(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0\t0\tx\ty\n0\n");
    }

    #[test]
    fn write_txt_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("lexicon.txt");
        let fst = SimpleFst::new(0u32);
        match fst.write_txt(&path) {
            Err(FstError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
