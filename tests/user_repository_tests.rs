use session_auth::{
    models::{UserChange, UserFilter},
    repositories::user_repository::{
        parse_change, RepositoryError, SqliteUserRepository, UserRepository,
    },
    test_utils::test_helpers,
};

async fn setup() -> SqliteUserRepository {
    let pool = test_helpers::create_test_db().await.unwrap();
    SqliteUserRepository::new(pool)
}

#[tokio::test]
async fn test_insert_assigns_ids() {
    let repository = setup().await;

    let first = repository.insert_user("one@example.com", "h1").await.unwrap();
    let second = repository.insert_user("two@example.com", "h2").await.unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(second.hashed_password, "h2");
    assert!(second.session_id.is_none());
    assert!(second.reset_token.is_none());
}

#[tokio::test]
async fn test_insert_duplicate_email() {
    let repository = setup().await;

    repository.insert_user("dup@example.com", "h1").await.unwrap();
    let result = repository.insert_user("dup@example.com", "h2").await;

    assert!(matches!(result, Err(RepositoryError::AlreadyExists)));
}

#[tokio::test]
async fn test_find_user_by_combined_fields() {
    let repository = setup().await;

    let user = repository.insert_user("find@example.com", "h").await.unwrap();
    repository
        .update_user(user.id, vec![UserChange::SessionId(Some("tok".to_string()))])
        .await
        .unwrap();

    let found = repository
        .find_user_by(UserFilter::by_session_id("tok").with_email("find@example.com"))
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let mismatch = repository
        .find_user_by(UserFilter::by_session_id("tok").with_email("other@example.com"))
        .await
        .unwrap();
    assert!(mismatch.is_none());
}

#[tokio::test]
async fn test_empty_filter_matches_nothing() {
    let repository = setup().await;

    repository.insert_user("any@example.com", "h").await.unwrap();

    let found = repository.find_user_by(UserFilter::default()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_update_unknown_user() {
    let repository = setup().await;

    let result = repository
        .update_user(42, vec![UserChange::ResetToken(Some("t".to_string()))])
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));

    let result = repository.update_user(42, vec![]).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_update_applies_parsed_changes() {
    let repository = setup().await;

    let user = repository.insert_user("parse@example.com", "h").await.unwrap();

    let changes = vec![
        parse_change("reset_token", Some("r1".to_string())).unwrap(),
        parse_change("email", Some("renamed@example.com".to_string())).unwrap(),
    ];
    repository.update_user(user.id, changes).await.unwrap();

    let updated = repository
        .find_user_by(UserFilter::by_id(user.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.email, "renamed@example.com");
    assert_eq!(updated.reset_token.as_deref(), Some("r1"));

    assert!(matches!(
        parse_change("id", Some("7".to_string())),
        Err(RepositoryError::InvalidField(_))
    ));
}

#[tokio::test]
async fn test_session_ids_are_unique() {
    let repository = setup().await;

    let a = repository.insert_user("a@example.com", "h").await.unwrap();
    let b = repository.insert_user("b@example.com", "h").await.unwrap();

    repository
        .update_user(a.id, vec![UserChange::SessionId(Some("same".to_string()))])
        .await
        .unwrap();
    let result = repository
        .update_user(b.id, vec![UserChange::SessionId(Some("same".to_string()))])
        .await;
    assert!(matches!(result, Err(RepositoryError::AlreadyExists)));

    // Cleared sessions do not collide
    repository
        .update_user(a.id, vec![UserChange::SessionId(None)])
        .await
        .unwrap();
    repository
        .update_user(b.id, vec![UserChange::SessionId(None)])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_users() {
    let repository = setup().await;

    for i in 0..5 {
        repository
            .insert_user(&format!("user{}@example.com", i), "h")
            .await
            .unwrap();
    }

    let users = repository.list_users(None, None).await.unwrap();
    assert_eq!(users.len(), 5);
    assert_eq!(users[0].email, "user0@example.com");

    let limited = repository.list_users(Some(3), None).await.unwrap();
    assert_eq!(limited.len(), 3);

    let offset = repository.list_users(Some(10), Some(2)).await.unwrap();
    assert_eq!(offset.len(), 3);
    assert_eq!(offset[0].email, "user2@example.com");
}
