use newsfeed_core::db::{open_db, open_db_in_memory};
use newsfeed_core::{
    FriendshipRepository, FriendshipService, FriendshipServiceError, NewUser,
    SqliteFriendshipRepository, SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::new(username, None))
        .unwrap()
}

fn service(
    conn: &Connection,
) -> FriendshipService<SqliteUserRepository<'_>, SqliteFriendshipRepository<'_>> {
    FriendshipService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteFriendshipRepository::try_new(conn).unwrap(),
    )
}

fn edge_count(conn: &Connection, from: i64, to: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM friendships WHERE from_user_id = ?1 AND to_user_id = ?2;",
        [from, to],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn follow_creates_one_edge() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let cosmo = create_user(&conn, "cosmo");
    let service = service(&conn);

    let edge = service.follow(lucky.id, cosmo.id).unwrap();
    assert_eq!(edge.from_user_id, lucky.id);
    assert_eq!(edge.to_user_id, cosmo.id);
    assert!(service.has_followed(lucky.id, cosmo.id).unwrap());
    assert!(!service.has_followed(cosmo.id, lucky.id).unwrap());
}

#[test]
fn duplicate_follow_is_rejected_and_keeps_one_edge() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let cosmo = create_user(&conn, "cosmo");
    let service = service(&conn);

    service.follow(lucky.id, cosmo.id).unwrap();
    let err = service.follow(lucky.id, cosmo.id).unwrap_err();

    assert!(matches!(
        err,
        FriendshipServiceError::DuplicateEdge { from, to } if from == lucky.id && to == cosmo.id
    ));
    assert_eq!(edge_count(&conn, lucky.id, cosmo.id), 1);
}

#[test]
fn self_follow_is_always_rejected() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let service = service(&conn);

    let err = service.follow(lucky.id, lucky.id).unwrap_err();
    assert!(matches!(err, FriendshipServiceError::SelfFollow(id) if id == lucky.id));

    // Even for ids that do not exist: the check runs before any lookup.
    let err = service.follow(404, 404).unwrap_err();
    assert!(matches!(err, FriendshipServiceError::SelfFollow(404)));
    assert_eq!(edge_count(&conn, lucky.id, lucky.id), 0);
}

#[test]
fn follow_missing_target_fails_before_writing() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let service = service(&conn);

    let err = service.follow(lucky.id, 404).unwrap_err();
    assert!(matches!(err, FriendshipServiceError::NotFoundTarget(404)));

    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM friendships;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn unfollow_reports_deleted_count() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let cosmo = create_user(&conn, "cosmo");
    let service = service(&conn);

    assert_eq!(service.unfollow(lucky.id, cosmo.id).unwrap(), 0);

    service.follow(lucky.id, cosmo.id).unwrap();
    service.follow(cosmo.id, lucky.id).unwrap();
    assert_eq!(service.unfollow(lucky.id, cosmo.id).unwrap(), 1);
    assert_eq!(edge_count(&conn, lucky.id, cosmo.id), 0);
    assert_eq!(edge_count(&conn, cosmo.id, lucky.id), 1);

    assert_eq!(service.unfollow(lucky.id, cosmo.id).unwrap(), 0);
}

#[test]
fn unfollow_rejects_self_and_missing_target() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let service = service(&conn);

    assert!(matches!(
        service.unfollow(lucky.id, lucky.id).unwrap_err(),
        FriendshipServiceError::SelfFollow(_)
    ));
    assert!(matches!(
        service.unfollow(lucky.id, 404).unwrap_err(),
        FriendshipServiceError::NotFoundTarget(404)
    ));
}

#[test]
fn listings_are_ordered_by_edge_time_descending() {
    let conn = setup();
    let target = create_user(&conn, "target");
    let early = create_user(&conn, "early");
    let middle = create_user(&conn, "middle");
    let late = create_user(&conn, "late");
    let graph = SqliteFriendshipRepository::try_new(&conn).unwrap();

    // Insert out of time order so row id order and time order disagree.
    graph.insert_edge(middle.id, target.id, 2_000).unwrap();
    graph.insert_edge(late.id, target.id, 3_000).unwrap();
    graph.insert_edge(early.id, target.id, 1_000).unwrap();
    graph.insert_edge(target.id, early.id, 10).unwrap();
    graph.insert_edge(target.id, late.id, 30).unwrap();
    graph.insert_edge(target.id, middle.id, 20).unwrap();

    let service = service(&conn);

    let followers = service.followers_of(target.id).unwrap();
    let names: Vec<&str> = followers.iter().map(|l| l.user.username.as_str()).collect();
    assert_eq!(names, vec!["late", "middle", "early"]);
    let times: Vec<i64> = followers.iter().map(|l| l.created_at).collect();
    assert_eq!(times, vec![3_000, 2_000, 1_000]);

    let followings = service.followings_of(target.id).unwrap();
    let names: Vec<&str> = followings.iter().map(|l| l.user.username.as_str()).collect();
    assert_eq!(names, vec!["late", "middle", "early"]);

    assert_eq!(
        service.follower_ids(target.id).unwrap(),
        vec![late.id, middle.id, early.id]
    );
}

#[test]
fn edges_created_in_the_same_millisecond_order_by_id() {
    let conn = setup();
    let target = create_user(&conn, "target");
    let a = create_user(&conn, "a");
    let b = create_user(&conn, "b");
    let graph = SqliteFriendshipRepository::try_new(&conn).unwrap();

    graph.insert_edge(a.id, target.id, 500).unwrap();
    graph.insert_edge(b.id, target.id, 500).unwrap();

    assert_eq!(graph.follower_ids(target.id).unwrap(), vec![b.id, a.id]);
}

#[test]
fn deleted_accounts_leave_tombstoned_edges() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let cosmo = create_user(&conn, "cosmo");
    let pixel = create_user(&conn, "pixel");
    let service = service(&conn);
    service.follow(lucky.id, cosmo.id).unwrap();
    service.follow(pixel.id, cosmo.id).unwrap();

    SqliteUserRepository::try_new(&conn)
        .unwrap()
        .delete_user(lucky.id)
        .unwrap();

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM friendships WHERE to_user_id = ?1;",
            [cosmo.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 2, "edge rows survive account deletion");

    let followers = service.followers_of(cosmo.id).unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].user.id, pixel.id);
    assert_eq!(service.follower_ids(cosmo.id).unwrap(), vec![pixel.id]);
}

#[test]
fn concurrent_duplicate_follows_produce_one_edge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    let (from, to) = {
        let conn = open_db(&path).unwrap();
        (create_user(&conn, "lucky").id, create_user(&conn, "cosmo").id)
    };

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = service(&conn);
                barrier.wait();
                service.follow(from, to).map(|_| ())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(FriendshipServiceError::DuplicateEdge { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 1);

    let conn = open_db(&path).unwrap();
    assert_eq!(edge_count(&conn, from, to), 1);
}
