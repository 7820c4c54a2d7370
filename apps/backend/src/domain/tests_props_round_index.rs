//! Property tests for the round index and scoring under arbitrary call orders.
//!
//! Properties tested:
//! - The round index never decreases and never exceeds the round count
//! - Each round contributes at most one point per player
//! - `end_round` succeeds at most once per started round

use proptest::prelude::*;
use time::Duration;

use crate::config::ROUND_COUNT;
use crate::domain::test_session_helpers::{playing_session, Seated, T0};
use crate::domain::Answer;

#[derive(Debug, Clone)]
enum Op {
    Start,
    HostAnswer(bool),
    GuestAnswer(bool),
    End,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        any::<bool>().prop_map(Op::HostAnswer),
        any::<bool>().prop_map(Op::GuestAnswer),
        Just(Op::End),
    ]
}

const CODES: [&str; ROUND_COUNT] = ["FR", "DE", "JP", "BR", "AU"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_round_index_is_monotonic_and_bounded(ops in prop::collection::vec(op(), 0..60)) {
        let Seated { mut session, host, guest } = playing_session();
        let mut previous = session.current_round();
        let mut ended = 0usize;

        for (step, op) in ops.into_iter().enumerate() {
            let now = T0 + Duration::seconds(step as i64);
            let active = CODES[session.current_round().saturating_sub(1).min(ROUND_COUNT - 1)];
            let code = |ok: bool| if ok { active } else { "XX" };
            match op {
                Op::Start => { let _ = session.start_next_round(now); }
                Op::HostAnswer(ok) => {
                    let answer = Answer::new(code(ok), "");
                    let _ = session.submit_answer(&host, answer, now);
                }
                Op::GuestAnswer(ok) => {
                    let answer = Answer::new(code(ok), "");
                    let _ = session.submit_answer(&guest, answer, now);
                }
                Op::End => {
                    if session.end_round().is_ok() {
                        ended += 1;
                    }
                }
            }

            let current = session.current_round();
            prop_assert!(current >= previous);
            prop_assert!(current <= ROUND_COUNT);
            prop_assert!(ended <= current);
            previous = current;
        }

        let (host_score, guest_score) = session.scores();
        prop_assert!(host_score as usize <= ended);
        prop_assert!(guest_score as usize <= ended);
    }
}
