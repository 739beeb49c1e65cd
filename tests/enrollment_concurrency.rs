//! Capacity under concurrent enrollment, through the public handler API.

use std::sync::Arc;

use futures::future::join_all;
use live_classes::adapters::memory::InMemorySessionStore;
use live_classes::application::{EnrollCommand, EnrollHandler, WithdrawCommand, WithdrawHandler};
use live_classes::domain::foundation::{SessionId, Timestamp, UserId};
use live_classes::domain::session::{Session, SessionDraft, SessionError};
use live_classes::ports::SessionRepository;

async fn seeded(capacity: i64) -> (Arc<InMemorySessionStore>, SessionId) {
    let store = Arc::new(InMemorySessionStore::new());
    let draft = SessionDraft {
        class_title: Some("Async Rust Workshop".to_string()),
        thumbnail: Some("https://cdn.example.com/async.png".to_string()),
        session_date: Some(Timestamp::now().plus_days(2).date().to_string()),
        start_time: Some("14:00".to_string()),
        meeting_link: Some("https://meet.google.com/abc-defg-hij".to_string()),
        instructor: Some("Ann Lee".to_string()),
        max_participants: Some(capacity),
        ..Default::default()
    };
    let session = Session::create(SessionId::new(), draft, Timestamp::now()).unwrap();
    store.save(&session).await.unwrap();
    (store, *session.id())
}

fn user(n: usize) -> UserId {
    UserId::new(format!("student-{}", n)).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_enrollments_never_exceed_capacity() {
    let (store, id) = seeded(3).await;
    let handler = Arc::new(EnrollHandler::new(store.clone(), 5));

    let tasks: Vec<_> = (0..20)
        .map(|n| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(EnrollCommand {
                        session_id: id,
                        user_id: user(n),
                    })
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    for outcome in join_all(tasks).await {
        match outcome.unwrap() {
            Ok(_) => admitted += 1,
            Err(SessionError::SessionFull) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    let stored = store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(admitted, 3);
    assert_eq!(stored.enrolled_count(), 3);
    assert_eq!(stored.version(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_seat_goes_to_exactly_one_of_two() {
    let (store, id) = seeded(1).await;
    let handler = Arc::new(EnrollHandler::new(store.clone(), 5));

    let a = tokio::spawn({
        let handler = handler.clone();
        async move { handler.handle(EnrollCommand { session_id: id, user_id: user(1) }).await }
    });
    let b = tokio::spawn({
        let handler = handler.clone();
        async move { handler.handle(EnrollCommand { session_id: id, user_id: user(2) }).await }
    });
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    assert!(a.is_ok() ^ b.is_ok());
    let loser = if a.is_ok() { b } else { a };
    assert_eq!(loser.unwrap_err(), SessionError::SessionFull);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn withdrawals_free_seats_for_waiting_students() {
    let (store, id) = seeded(2).await;
    let enroll = Arc::new(EnrollHandler::new(store.clone(), 10));
    let withdraw = Arc::new(WithdrawHandler::new(store.clone(), 10));

    for n in 0..2 {
        enroll
            .handle(EnrollCommand { session_id: id, user_id: user(n) })
            .await
            .unwrap();
    }

    let leaving = tokio::spawn({
        let withdraw = withdraw.clone();
        async move { withdraw.handle(WithdrawCommand { session_id: id, user_id: user(0) }).await }
    });
    leaving.await.unwrap().unwrap();

    let joining = enroll
        .handle(EnrollCommand { session_id: id, user_id: user(7) })
        .await
        .unwrap();

    assert_eq!(joining.enrolled_count(), 2);
    assert!(joining.is_enrolled(&user(7)));
    assert!(!joining.is_enrolled(&user(0)));
}
