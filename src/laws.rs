//! Law sheet for the outcome algebra.
//!
//! This module is the formal record of every algebraic law the combinator
//! set commits to preserving. Extensions to the algebra must not violate
//! these laws.
//!
//! # Law Classification
//!
//! - **Unconditional**: holds for all inputs and all callback behavior.
//! - **Conditional on purity**: holds when the callbacks involved do not
//!   panic; a panicking callback moves the result to the defect branch,
//!   which the law tables below account for separately.
//!
//! # Chain Laws (Conditional on purity)
//!
//! | Law | Statement |
//! |-----|-----------|
//! | CHAIN-ASSOC | `a.and_then(f).and_then(g)` = `a.and_then(\|v\| f(v).and_then(g))` |
//! | CHAIN-LEFT-ID | `success(x).and_then(f)` = `f(x)` |
//! | CHAIN-RIGHT-ID | `a.and_then(success)` = `a` |
//!
//! # Defect Laws (Unconditional)
//!
//! | Law | Statement |
//! |-----|-----------|
//! | DEFECT-FROM-PANIC | a panicking callback in `map`/`inspect`/`and_then`/`through`/`recover` produces Defect, never Failure |
//! | DEFECT-OPACITY | `map`, `map_failure`, `and_then`, `through`, `recover`, `recover_with` leave Defect untouched |
//! | DEFECT-NO-DEMOTE | no combinator converts Defect into Failure |
//!
//! # Recovery Laws
//!
//! | Law | Statement |
//! |-----|-----------|
//! | RECOVER-SKIP-DEFECT | `defect(d).recover(f)` = `defect(d)` for any `f` |
//! | RECOVER-SUPPRESS | a failed recovery appends the recovered-from error to the suppressed list, earliest first |
//!
//! # Finalization Laws (`and_finally`)
//!
//! | Original | Finalizer | Result |
//! |----------|-----------|--------|
//! | `Success(v)` | `Success(())` | `Success(v)` |
//! | `Success(v)` | `Failure(e)` | `Failure(e)` |
//! | `Failure(e1)` | `Success(())` | `Failure(e1)` |
//! | `Failure(e1)` | `Failure(e2)` | `Failure(combine(e1, e2))`, both causes retained |
//! | `Defect(d)` | any | `Defect(d)` |
//!
//! The finalizer runs on every branch; only its effect on the result
//! varies.

#[cfg(test)]
mod tests {
    use crate::defect::DefectPayload;
    use crate::error::TagError;
    use crate::outcome::Outcome;

    type Out = Outcome<i64, TagError>;

    fn failure(tag: &'static str) -> Out {
        Outcome::failure(TagError::new(tag, "law"))
    }

    fn f(v: i64) -> Out {
        Outcome::success(v + 1)
    }

    fn g(v: i64) -> Out {
        if v % 2 == 0 {
            Outcome::success(v * 2)
        } else {
            failure("Odd")
        }
    }

    #[test]
    fn chain_assoc_for_success_roots() {
        for seed in [0, 1, 2, 7] {
            let left = Out::success(seed).and_then(f).and_then(g);
            let right = Out::success(seed).and_then(|v| f(v).and_then(g));
            assert_eq!(left, right);
        }
    }

    #[test]
    fn chain_assoc_for_failure_roots() {
        let left = failure("Root").and_then(f).and_then(g);
        let right = failure("Root").and_then(|v| f(v).and_then(g));
        assert_eq!(left, right);
        assert_eq!(left, failure("Root"));
    }

    #[test]
    fn chain_left_identity() {
        for seed in [0, 3] {
            assert_eq!(Out::success(seed).and_then(g), g(seed));
        }
    }

    #[test]
    fn chain_right_identity() {
        assert_eq!(Out::success(9).and_then(Outcome::success), Out::success(9));
        assert_eq!(failure("Root").and_then(Outcome::success), failure("Root"));
    }

    #[test]
    fn defect_from_panic_in_every_transformer() {
        assert!(Out::success(1).map(|_| -> i64 { panic!("m") }).is_defect());
        assert!(Out::success(1).inspect(|_| panic!("i")).is_defect());
        assert!(Out::success(1).and_then(|_| -> Out { panic!("c") }).is_defect());
        assert!(
            Out::success(1)
                .through(|_| -> Outcome<(), TagError> { panic!("t") })
                .is_defect()
        );
        assert!(failure("E").recover(|_, _| panic!("r")).is_defect());
        assert!(
            failure("E")
                .map_failure(|_| -> TagError { panic!("mf") })
                .is_defect()
        );
    }

    #[test]
    fn defect_opacity_across_the_combinator_set() {
        let defect = || Out::defect(DefectPayload::msg("bug"));
        assert_eq!(defect().map(|v| v + 1), defect());
        assert_eq!(defect().and_then(f), defect());
        assert_eq!(defect().through(|_| Outcome::success(())), defect());
        assert_eq!(defect().map_failure(|e| e), defect());
        assert_eq!(defect().recover(|_, _| Outcome::success(0)), defect());
        assert_eq!(
            defect().recover_with(|e, _| Outcome::<i64, TagError>::failure(e)),
            defect()
        );
    }

    #[test]
    fn recover_skips_defect_for_any_handler() {
        let d = Out::defect(DefectPayload::msg("bug"));
        let handlers: Vec<fn(&TagError, &[TagError]) -> Out> = vec![
            |_, _| Outcome::success(0),
            |e, _| Outcome::failure(e.clone()),
            |_, _| panic!("never invoked"),
        ];
        for handler in handlers {
            assert_eq!(d.clone().recover(handler), d);
        }
    }

    #[test]
    fn recover_suppression_is_earliest_first() {
        let out = failure("One")
            .recover(|_, _| failure("Two"))
            .recover(|_, _| failure("Three"));
        let failed = out.as_failure().expect("failure");
        assert_eq!(failed.error().tag(), "Three");
        let tags: Vec<_> = failed.suppressed().iter().map(TagError::tag).collect();
        assert_eq!(tags, ["One", "Two"]);
    }

    #[test]
    fn finalization_table_holds() {
        let fin_ok = || Outcome::<(), TagError>::success(());
        let fin_err = || Outcome::<(), TagError>::failure(TagError::new("Fin", "close"));

        assert_eq!(Out::success(1).and_finally(fin_ok), Outcome::success(1));
        assert_eq!(
            Out::success(1)
                .and_finally(fin_err)
                .as_failure()
                .map(|f| f.error().tag()),
            Some("Fin")
        );
        assert_eq!(failure("Prog").and_finally(fin_ok), failure("Prog"));

        let combined = failure("Prog").and_finally(fin_err);
        let failed = combined.as_failure().expect("combined failure");
        let causes: Vec<_> = failed.error().causes().iter().map(TagError::tag).collect();
        assert_eq!(causes, ["Prog", "Fin"]);

        let d = Out::defect(DefectPayload::msg("bug"));
        assert_eq!(d.clone().and_finally(fin_err), d);
    }

    #[test]
    fn finalizer_runs_on_every_branch() {
        use std::cell::Cell;
        let runs = Cell::new(0);
        let fin = || {
            runs.set(runs.get() + 1);
            Outcome::<(), TagError>::success(())
        };
        let _ = Out::success(1).and_finally(fin);
        let _ = failure("E").and_finally(fin);
        let _ = Out::defect(DefectPayload::msg("bug")).and_finally(fin);
        assert_eq!(runs.get(), 3);
    }
}
