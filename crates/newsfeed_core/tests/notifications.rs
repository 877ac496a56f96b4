use newsfeed_core::db::open_db_in_memory;
use newsfeed_core::{
    CommentService, ContentRef, LikeService, NewTweet, NewUser, NotificationService, PageQuery,
    SqliteCommentRepository, SqliteLikeRepository, SqliteNotificationRepository,
    SqliteTweetRepository, SqliteUserRepository, SubjectKind, Tweet, TweetRepository, User,
    UserRepository,
};
use rusqlite::Connection;

type SqliteNotificationService<'conn> = NotificationService<
    SqliteTweetRepository<'conn>,
    SqliteCommentRepository<'conn>,
    SqliteNotificationRepository<'conn>,
>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::new(username, None))
        .unwrap()
}

fn store_tweet(conn: &Connection, author: &User, content: &str) -> Tweet {
    SqliteTweetRepository::try_new(conn)
        .unwrap()
        .create_tweet(&NewTweet::new(author.id, content))
        .unwrap()
}

fn notifier(conn: &Connection) -> SqliteNotificationService<'_> {
    NotificationService::new(
        SqliteTweetRepository::try_new(conn).unwrap(),
        SqliteCommentRepository::try_new(conn).unwrap(),
        SqliteNotificationRepository::try_new(conn).unwrap(),
    )
}

fn notification_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM notifications;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn comment_on_own_tweet_sends_nothing() {
    let conn = setup();
    let lucky = create_user(&conn, "lucky");
    let tweet = store_tweet(&conn, &lucky, "mine only");
    let notifier = notifier(&conn);
    let comments = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        &notifier,
    );

    comments.create_comment(lucky.id, tweet.id, "talking to myself").unwrap();

    assert_eq!(notification_count(&conn), 0);
}

#[test]
fn comment_on_someone_elses_tweet_notifies_author() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let commenter = create_user(&conn, "commenter");
    let tweet = store_tweet(&conn, &author, "hello world");
    let notifier = notifier(&conn);
    let comments = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        &notifier,
    );

    let comment = comments.create_comment(commenter.id, tweet.id, "hi back").unwrap();

    let inbox = notifier
        .list_notifications(author.id, &PageQuery::default())
        .unwrap();
    assert_eq!(inbox.len(), 1);
    let notification = &inbox[0];
    assert_eq!(notification.actor_user_id, commenter.id);
    assert_eq!(notification.subject_kind, SubjectKind::Comment);
    assert_eq!(notification.subject_id, comment.id);
    assert_eq!(notification.target, ContentRef::Tweet(tweet.id));
    assert!(notification.unread);

    assert!(notifier
        .list_notifications(commenter.id, &PageQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn like_notifies_tweet_and_comment_owners() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let commenter = create_user(&conn, "commenter");
    let fan = create_user(&conn, "fan");
    let tweet = store_tweet(&conn, &author, "likeable");
    let notifier = notifier(&conn);
    let comments = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    let likes = LikeService::new(
        SqliteLikeRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteCommentRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    let comment = comments.create_comment(commenter.id, tweet.id, "nice").unwrap();

    likes.like(fan.id, ContentRef::Tweet(tweet.id)).unwrap();
    likes.like(fan.id, ContentRef::Comment(comment.id)).unwrap();

    let author_inbox = notifier
        .list_notifications(author.id, &PageQuery::default())
        .unwrap();
    let kinds: Vec<SubjectKind> = author_inbox.iter().map(|n| n.subject_kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&SubjectKind::Comment));
    assert!(kinds.contains(&SubjectKind::Like));

    let commenter_inbox = notifier
        .list_notifications(commenter.id, &PageQuery::default())
        .unwrap();
    assert_eq!(commenter_inbox.len(), 1);
    assert_eq!(commenter_inbox[0].actor_user_id, fan.id);
    assert_eq!(commenter_inbox[0].target, ContentRef::Comment(comment.id));
}

#[test]
fn liking_twice_keeps_one_like_and_one_notification() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let fan = create_user(&conn, "fan");
    let tweet = store_tweet(&conn, &author, "popular");
    let notifier = notifier(&conn);
    let likes = LikeService::new(
        SqliteLikeRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteCommentRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    let target = ContentRef::Tweet(tweet.id);

    let first = likes.like(fan.id, target).unwrap();
    let second = likes.like(fan.id, target).unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.like.id, second.like.id);
    assert_eq!(likes.like_count(target).unwrap(), 1);
    assert_eq!(notification_count(&conn), 1);
}

#[test]
fn liking_own_tweet_sends_nothing() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let tweet = store_tweet(&conn, &author, "self love");
    let notifier = notifier(&conn);
    let likes = LikeService::new(
        SqliteLikeRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteCommentRepository::try_new(&conn).unwrap(),
        &notifier,
    );

    assert!(likes.like(author.id, ContentRef::Tweet(tweet.id)).unwrap().created);
    assert_eq!(notification_count(&conn), 0);
}

#[test]
fn inbox_tracks_unread_until_marked_read() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let fan = create_user(&conn, "fan");
    let other_fan = create_user(&conn, "other_fan");
    let tweet = store_tweet(&conn, &author, "inbox test");
    let notifier = notifier(&conn);
    let likes = LikeService::new(
        SqliteLikeRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteCommentRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    likes.like(fan.id, ContentRef::Tweet(tweet.id)).unwrap();
    likes.like(other_fan.id, ContentRef::Tweet(tweet.id)).unwrap();

    assert_eq!(notifier.unread_count(author.id).unwrap(), 2);
    assert_eq!(notifier.mark_all_read(author.id).unwrap(), 2);
    assert_eq!(notifier.unread_count(author.id).unwrap(), 0);
    assert_eq!(notifier.mark_all_read(author.id).unwrap(), 0);

    let inbox = notifier
        .list_notifications(author.id, &PageQuery::default())
        .unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|n| !n.unread));
    // Newest first: the second like arrived last.
    assert_eq!(inbox[0].actor_user_id, other_fan.id);
}

#[test]
fn inbox_ignores_notifications_from_deleted_actors() {
    let conn = setup();
    let author = create_user(&conn, "author");
    let commenter = create_user(&conn, "commenter");
    let fan = create_user(&conn, "fan");
    let tweet = store_tweet(&conn, &author, "hello world");
    let notifier = notifier(&conn);
    let comments = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    let likes = LikeService::new(
        SqliteLikeRepository::try_new(&conn).unwrap(),
        SqliteTweetRepository::try_new(&conn).unwrap(),
        SqliteCommentRepository::try_new(&conn).unwrap(),
        &notifier,
    );
    comments.create_comment(commenter.id, tweet.id, "bye soon").unwrap();
    likes.like(fan.id, ContentRef::Tweet(tweet.id)).unwrap();

    SqliteUserRepository::try_new(&conn)
        .unwrap()
        .delete_user(commenter.id)
        .unwrap();

    let inbox = notifier
        .list_notifications(author.id, &PageQuery::default())
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(notifier.unread_count(author.id).unwrap(), 1);
    assert_eq!(notifier.mark_all_read(author.id).unwrap(), 1);
    assert_eq!(notifier.unread_count(author.id).unwrap(), 0);
}

#[test]
fn notification_for_missing_subject_is_reported() {
    let conn = setup();
    let fan = create_user(&conn, "fan");
    let notifier = notifier(&conn);
    let like = newsfeed_core::Like {
        id: 1,
        user_id: fan.id,
        target: ContentRef::Tweet(404),
        created_at: 0,
    };

    let err = notifier.send_like_notification(&like).unwrap_err();
    assert!(matches!(
        err,
        newsfeed_core::NotificationServiceError::SubjectNotFound(ContentRef::Tweet(404))
    ));
}
