use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::RwLock;
use time::Duration;

use crate::domain::test_session_helpers::{empty_session, playing_session, Seated, T0};
use crate::domain::{Answer, ConnectionHandle, PlayerId, Role};
use crate::errors::DomainError;

#[test]
fn seats_fill_host_then_guest() {
    let mut session = empty_session();
    let (a, _) = ConnectionHandle::channel();
    let (b, _) = ConnectionHandle::channel();
    let (c, _) = ConnectionHandle::channel();

    let (role_a, id_a) = session.claim_seat(None, a).unwrap();
    let (role_b, id_b) = session.claim_seat(None, b).unwrap();
    assert_eq!(role_a, Role::Host);
    assert_eq!(role_b, Role::Guest);
    assert_ne!(id_a, id_b);
    assert_eq!(session.participant_count(), 2);

    let err = session.claim_seat(None, c).unwrap_err();
    assert_eq!(err, DomainError::RoleFull(Role::Guest));
    assert_eq!(session.participant_count(), 2);
}

#[test]
fn one_connection_cannot_take_both_seats() {
    let mut session = empty_session();
    let (conn, _) = ConnectionHandle::channel();

    let (role, host) = session.claim_seat(None, conn.clone()).unwrap();
    assert_eq!(role, Role::Host);

    let err = session.claim_seat(None, conn.clone()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
    assert_eq!(session.participant_count(), 1);
    assert_eq!(session.player_id(Role::Guest), None);

    // reclaiming its own seat is still fine
    let (role, again) = session.claim_seat(Some(&host), conn).unwrap();
    assert_eq!((role, again), (Role::Host, host));
}

#[test]
fn bind_role_rejects_claimed_slot_without_id() {
    let mut session = empty_session();
    let (a, _) = ConnectionHandle::channel();
    let (b, _) = ConnectionHandle::channel();
    session.bind_role(Role::Guest, None, a).unwrap();
    assert_eq!(
        session.bind_role(Role::Guest, None, b).unwrap_err(),
        DomainError::RoleFull(Role::Guest)
    );
}

#[test]
fn unknown_id_cannot_reconnect() {
    let mut session = empty_session();
    let (a, _) = ConnectionHandle::channel();
    let (b, _) = ConnectionHandle::channel();
    session.claim_seat(None, a).unwrap();

    let bogus = PlayerId::from("not-a-player");
    assert_eq!(
        session.claim_seat(Some(&bogus), b.clone()).unwrap_err(),
        DomainError::CannotReconnect
    );
    assert_eq!(
        session.bind_role(Role::Host, Some(&bogus), b).unwrap_err(),
        DomainError::CannotReconnect
    );
}

#[test]
fn reconnect_keeps_scores_and_round_index() {
    let Seated {
        mut session,
        host,
        guest,
    } = playing_session();
    session.start_next_round(T0).unwrap();
    session
        .submit_answer(&host, Answer::new("FR", ""), T0 + Duration::seconds(2))
        .unwrap();
    session
        .submit_answer(&guest, Answer::new("FR", ""), T0 + Duration::seconds(3))
        .unwrap();
    session.end_round().unwrap();
    session.start_next_round(T0 + Duration::seconds(10)).unwrap();

    let (fresh, mut rx) = ConnectionHandle::channel();
    let fresh_id = fresh.conn_id();
    let (role, id) = session.claim_seat(Some(&host), fresh).unwrap();
    assert_eq!(role, Role::Host);
    assert_eq!(id, host);
    assert_eq!(session.scores(), (1, 1));
    assert_eq!(session.current_round(), 2);

    let bound: Vec<_> = session.connections().collect();
    let (_, handle) = bound
        .iter()
        .find(|(r, _)| *r == Role::Host)
        .expect("host bound");
    assert_eq!(handle.conn_id(), fresh_id);
    handle.send(&Arc::from("ping")).unwrap();
    assert_eq!(rx.try_recv().unwrap().as_ref(), "ping");
}

#[test]
fn stale_detach_keeps_newer_connection() {
    let mut session = empty_session();
    let (first, _) = ConnectionHandle::channel();
    let first_id = first.conn_id();
    let (_, host) = session.claim_seat(None, first).unwrap();

    let (second, _) = ConnectionHandle::channel();
    let second_id = second.conn_id();
    session.claim_seat(Some(&host), second).unwrap();

    assert!(!session.detach(Role::Host, first_id));
    assert_eq!(session.connections().count(), 1);
    assert!(session.detach(Role::Host, second_id));
    assert_eq!(session.connections().count(), 0);
    // the seat stays claimed for a later reconnect
    assert_eq!(session.player_id(Role::Host), Some(&host));
}

#[test]
fn concurrent_claims_for_same_role_admit_one() {
    for _ in 0..50 {
        let session = Arc::new(RwLock::new(empty_session()));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let session = Arc::clone(&session);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let (conn, _) = ConnectionHandle::channel();
                    barrier.wait();
                    session.write().bind_role(Role::Host, None, conn)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(DomainError::RoleFull(Role::Host))))
            .count();
        assert_eq!((ok, full), (1, 1));
        assert_eq!(session.read().participant_count(), 1);
    }
}
