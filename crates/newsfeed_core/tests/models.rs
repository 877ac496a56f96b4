use newsfeed_core::{ContentRef, Notification, SubjectKind, Tweet};
use serde_json::json;

#[test]
fn content_ref_uses_content_type_and_object_id() {
    let value = serde_json::to_value(ContentRef::Comment(9)).unwrap();
    assert_eq!(value, json!({ "content_type": "comment", "object_id": 9 }));

    let parsed: ContentRef =
        serde_json::from_value(json!({ "content_type": "tweet", "object_id": 3 })).unwrap();
    assert_eq!(parsed, ContentRef::Tweet(3));

    assert!(serde_json::from_value::<ContentRef>(
        json!({ "content_type": "photo", "object_id": 3 })
    )
    .is_err());
}

#[test]
fn tweet_serializes_flat_fields() {
    let tweet = Tweet {
        id: 1,
        author_id: 2,
        content: "hello".to_string(),
        created_at: 1_700_000_000_000,
    };

    assert_eq!(
        serde_json::to_value(&tweet).unwrap(),
        json!({
            "id": 1,
            "author_id": 2,
            "content": "hello",
            "created_at": 1_700_000_000_000_i64,
        })
    );
}

#[test]
fn notification_nests_target_reference() {
    let notification = Notification {
        id: 5,
        recipient_user_id: 1,
        actor_user_id: 2,
        subject_kind: SubjectKind::Like,
        subject_id: 11,
        target: ContentRef::Tweet(7),
        unread: true,
        created_at: 0,
    };

    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["subject_kind"], json!("like"));
    assert_eq!(value["target"], json!({ "content_type": "tweet", "object_id": 7 }));
    assert_eq!(value["unread"], json!(true));
}
