use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::RwLock;
use time::Duration;

use crate::domain::test_session_helpers::{
    empty_session, loaded_session, playing_session, Seated, ROUND_SECS, T0,
};
use crate::domain::{Answer, ConnectionHandle, MatchState, Winner};
use crate::errors::DomainError;

#[test]
fn begin_playing_requires_two_players_and_content() {
    let mut session = empty_session();
    let (a, _) = ConnectionHandle::channel();
    let (b, _) = ConnectionHandle::channel();
    session.claim_seat(None, a).unwrap();
    session.claim_seat(None, b).unwrap();
    assert!(matches!(
        session.begin_playing(),
        Err(DomainError::InvalidState(_))
    ));
    assert_eq!(session.state(), MatchState::Waiting);

    let mut session = loaded_session();
    let (a, _) = ConnectionHandle::channel();
    session.claim_seat(None, a).unwrap();
    assert!(session.begin_playing().is_err());
    assert_eq!(session.state(), MatchState::Waiting);
}

#[test]
fn begin_playing_twice_is_a_noop() {
    let Seated { mut session, .. } = playing_session();
    assert!(!session.begin_playing().unwrap());
    assert_eq!(session.state(), MatchState::Playing);
}

#[test]
fn first_round_notice_hides_answer_key() {
    let Seated { mut session, .. } = playing_session();
    let notice = session.start_next_round(T0).unwrap();

    assert_eq!(notice.round_index, 1);
    assert_eq!(notice.deadline, T0 + Duration::seconds(ROUND_SECS as i64));
    assert_eq!(session.current_round(), 1);

    let json = serde_json::to_value(&notice).unwrap();
    assert_eq!(json["roundIndex"], 1);
    assert_eq!(json["imageUrl"], "https://img.test/fr.jpg");
    assert!(json.get("countryCode").is_none());
    assert!(json.get("countryName").is_none());
    assert!(json.get("coordinates").is_none());
}

#[test]
fn both_answers_end_round_and_score_correct_player() {
    let Seated {
        mut session,
        host,
        guest,
    } = playing_session();
    session.start_next_round(T0).unwrap();

    session
        .submit_answer(&host, Answer::new("FR", "France"), T0 + Duration::seconds(4))
        .unwrap();
    assert!(!session.should_end_round(T0 + Duration::seconds(5)));
    session
        .submit_answer(&guest, Answer::new("DE", "Germany"), T0 + Duration::seconds(6))
        .unwrap();
    assert!(session.should_end_round(T0 + Duration::seconds(6)));

    let result = session.end_round().unwrap();
    assert_eq!(result.round_index, 1);
    assert_eq!((result.host_score, result.guest_score), (1, 0));
    assert_eq!(result.correct_answer, Answer::new("FR", "France"));

    let host_view = result.host_answer.unwrap();
    assert!(host_view.correct);
    assert_eq!(host_view.label, "France (FR)");
    let guest_view = result.guest_answer.unwrap();
    assert!(!guest_view.correct);
    assert_eq!(guest_view.label, "Germany (DE)");
    assert_eq!(session.scores(), (1, 0));
}

#[test]
fn second_end_round_loses_the_race() {
    let Seated { mut session, .. } = playing_session();
    session.start_next_round(T0).unwrap();
    session.end_round().unwrap();

    let err = session.end_round().unwrap_err();
    assert_eq!(err, DomainError::AlreadyFinished(1));
    assert!(err.is_race_loss());
    assert_eq!(session.scores(), (0, 0));
}

#[test]
fn concurrent_end_round_completes_once() {
    for _ in 0..50 {
        let Seated {
            mut session, host, ..
        } = playing_session();
        session.start_next_round(T0).unwrap();
        session
            .submit_answer(&host, Answer::new("FR", "France"), T0)
            .unwrap();
        let session = Arc::new(RwLock::new(session));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let session = Arc::clone(&session);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    session.write().end_round()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let lost = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::AlreadyFinished(1))))
            .count();
        assert_eq!((ok, lost), (1, 1));
        assert_eq!(session.read().scores(), (1, 0));
    }
}

#[test]
fn timeout_without_answers_scores_nobody() {
    let Seated { mut session, .. } = playing_session();
    session.start_next_round(T0).unwrap();

    let deadline = T0 + Duration::seconds(ROUND_SECS as i64);
    assert!(!session.should_end_round(deadline - Duration::milliseconds(1)));
    assert!(session.should_end_round(deadline));

    let result = session.end_round().unwrap();
    assert!(result.host_answer.is_none());
    assert!(result.guest_answer.is_none());
    assert_eq!((result.host_score, result.guest_score), (0, 0));
}

#[test]
fn last_answer_wins_before_round_ends() {
    let Seated {
        mut session, host, ..
    } = playing_session();
    session.start_next_round(T0).unwrap();

    session
        .submit_answer(&host, Answer::new("DE", ""), T0 + Duration::seconds(1))
        .unwrap();
    session
        .submit_answer(&host, Answer::new("FR", ""), T0 + Duration::seconds(2))
        .unwrap();
    let result = session.end_round().unwrap();
    assert_eq!(result.host_score, 1);
}

#[test]
fn answer_after_round_end_is_rejected() {
    let Seated {
        mut session, host, ..
    } = playing_session();
    session.start_next_round(T0).unwrap();
    session.end_round().unwrap();

    let err = session
        .submit_answer(&host, Answer::new("FR", ""), T0 + Duration::seconds(31))
        .unwrap_err();
    assert_eq!(err, DomainError::AlreadyFinished(1));
    assert_eq!(session.scores(), (0, 0));
}

#[test]
fn submit_before_first_round_has_no_round() {
    let Seated {
        mut session, host, ..
    } = playing_session();
    let err = session
        .submit_answer(&host, Answer::new("FR", ""), T0)
        .unwrap_err();
    assert_eq!(err, DomainError::NoSuchRound(0));
}

#[test]
fn stranger_cannot_submit() {
    let Seated { mut session, .. } = playing_session();
    session.start_next_round(T0).unwrap();
    let err = session
        .submit_answer(&"stranger".into(), Answer::new("FR", ""), T0)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotAParticipant(_)));
}

#[test]
fn cannot_start_next_round_while_one_is_running() {
    let Seated { mut session, .. } = playing_session();
    session.start_next_round(T0).unwrap();
    assert!(matches!(
        session.start_next_round(T0),
        Err(DomainError::InvalidState(_))
    ));
    assert_eq!(session.current_round(), 1);
}

fn play_match(host_correct: [bool; 5], guest_correct: [bool; 5]) -> Seated {
    let mut seated = playing_session();
    let codes = ["FR", "DE", "JP", "BR", "AU"];
    for round in 0..5 {
        let now = T0 + Duration::seconds(40 * round as i64);
        seated.session.start_next_round(now).unwrap();
        let pick = |ok: bool| if ok { codes[round] } else { "XX" };
        seated
            .session
            .submit_answer(&seated.host, Answer::new(pick(host_correct[round]), ""), now)
            .unwrap();
        seated
            .session
            .submit_answer(&seated.guest, Answer::new(pick(guest_correct[round]), ""), now)
            .unwrap();
        seated.session.end_round().unwrap();
    }
    seated
}

#[test]
fn full_match_host_wins_three_two() {
    let Seated { mut session, .. } = play_match(
        [true, true, true, false, false],
        [false, true, false, true, false],
    );
    assert!(!session.has_rounds_remaining());
    assert_eq!(
        session.start_next_round(T0).unwrap_err(),
        DomainError::AllRoundsPlayed
    );
    assert_eq!(session.current_round(), 5);

    let end = session.finish().unwrap();
    assert_eq!((end.host_score, end.guest_score), (3, 2));
    assert_eq!(end.winner, Winner::Host);
    assert_eq!(session.state(), MatchState::Finished);
    assert!(session.finish().is_none());
}

#[test]
fn full_match_tie() {
    let Seated { mut session, .. } = play_match(
        [true, false, true, false, false],
        [false, true, false, true, false],
    );
    let end = session.finish().unwrap();
    assert_eq!(end.winner, Winner::Tie);

    let json = serde_json::to_value(&end).unwrap();
    assert_eq!(json["winner"], "tie");
    assert_eq!(json["hostScore"], 2);
}

#[test]
fn finished_match_rejects_answers_and_rounds() {
    let Seated {
        mut session, host, ..
    } = play_match([false; 5], [false; 5]);
    session.finish().unwrap();

    assert!(matches!(
        session.submit_answer(&host, Answer::new("AU", ""), T0),
        Err(DomainError::InvalidState(_))
    ));
    assert!(matches!(
        session.begin_playing(),
        Err(DomainError::InvalidState(_))
    ));
}

#[test]
fn view_hides_answer_key_of_running_round() {
    let Seated {
        mut session, host, ..
    } = playing_session();
    session.start_next_round(T0).unwrap();
    session
        .submit_answer(&host, Answer::new("FR", ""), T0)
        .unwrap();
    session.end_round().unwrap();
    session.start_next_round(T0 + Duration::seconds(33)).unwrap();

    let view = session.view();
    assert_eq!(view.current_round, 2);
    assert_eq!(view.rounds.len(), 2);
    assert!(view.rounds[0].finished);
    assert_eq!(
        view.rounds[0].correct_answer,
        Some(Answer::new("FR", "France"))
    );
    assert!(view.rounds[0].host_answer.is_some());
    assert!(!view.rounds[1].finished);
    assert!(view.rounds[1].correct_answer.is_none());
}

#[test]
fn content_cannot_be_replaced_after_round_start() {
    let Seated { mut session, .. } = playing_session();
    session.start_next_round(T0).unwrap();
    let replacement = crate::domain::test_session_helpers::content("IT", "Italy", 0.0, 0.0);
    assert!(session.install_content(0, replacement.clone()).is_err());
    assert!(session.install_content(1, replacement).is_ok());
}
