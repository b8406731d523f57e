use crate::common;

use axum::http::StatusCode;
use boilerplate::domain::auth::{NewRefreshToken, RefreshTokenRepository};
use boilerplate::domain::keys::{KeyRepository, KeyType, NewSigningKey};
use boilerplate::domain::oauth::{OAuthIdentity, OAuthIdentityRepository, OAuthProvider};
use boilerplate::domain::users::{DuplicateEmail, NewUser, Role, UpdateUser, UserFilter, UserRepository};
use boilerplate::infrastructure::repositories::keys::MySqlKeyRepository;
use boilerplate::infrastructure::repositories::oauth_identities::MySqlOAuthIdentityRepository;
use boilerplate::infrastructure::repositories::refresh_tokens::MySqlRefreshTokenRepository;
use boilerplate::infrastructure::repositories::users::MySqlUserRepository;
use boilerplate::presentation::router::app;
use boilerplate::shared::pagination::{FindAllQuery, QueryError, SortOrder};
use serde_json::json;
use serial_test::serial;
use time::{Duration, OffsetDateTime};

fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role,
    }
}

#[tokio::test]
#[serial]
async fn test_user_email_unique_among_active_users() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = MySqlUserRepository::new(pool.clone());

    let jane = repo.create(new_user("Jane@Example.com", Role::User)).await.unwrap();
    assert_eq!(jane.email, "jane@example.com");

    let err = repo
        .create(new_user("jane@example.com", Role::User))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<DuplicateEmail>().is_some());

    // Soft-deleted rows release the email.
    assert!(repo.soft_delete(jane.id).await.unwrap());
    let replacement = repo.create(new_user("jane@example.com", Role::User)).await.unwrap();

    // Restoring the old row would collide with the replacement.
    let err = repo.restore(jane.id).await.unwrap_err();
    assert!(err.downcast_ref::<DuplicateEmail>().is_some());

    assert!(repo.delete(replacement.id).await.unwrap());
    assert!(repo.restore(jane.id).await.unwrap());
    assert!(repo.find_by_id(jane.id).await.unwrap().is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_user_soft_delete_hides_row() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = MySqlUserRepository::new(pool.clone());

    let user = repo.create(new_user("gone@example.com", Role::User)).await.unwrap();
    assert!(repo.soft_delete(user.id).await.unwrap());
    assert!(!repo.soft_delete(user.id).await.unwrap());

    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    assert!(repo.find_by_email("gone@example.com").await.unwrap().is_none());
    let deleted = repo.find_by_id_with_deleted(user.id).await.unwrap().unwrap();
    assert!(deleted.deleted_at.is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_user_update_and_email_conflict() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = MySqlUserRepository::new(pool.clone());

    let a = repo.create(new_user("a@example.com", Role::User)).await.unwrap();
    repo.create(new_user("b@example.com", Role::User)).await.unwrap();

    let updated = repo
        .update(
            a.id,
            UpdateUser {
                name: Some("Alice".to_string()),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.role, Role::Admin);
    assert!(updated.updated_at >= a.updated_at);

    let err = repo
        .update(
            a.id,
            UpdateUser {
                email: Some("B@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<DuplicateEmail>().is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_user_list_search_filter_sort() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = MySqlUserRepository::new(pool.clone());

    let mut admin = new_user("admin@example.com", Role::Admin);
    admin.name = "Zed Admin".to_string();
    repo.create(admin).await.unwrap();
    let mut john = new_user("john@example.com", Role::User);
    john.name = "John Smith".to_string();
    repo.create(john).await.unwrap();
    let gone = repo.create(new_user("gone@example.com", Role::User)).await.unwrap();
    repo.soft_delete(gone.id).await.unwrap();

    let all = repo
        .list(&FindAllQuery::default(), &UserFilter::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);

    let with_deleted = FindAllQuery {
        with_deleted: Some("TRUE".to_string()),
        ..Default::default()
    };
    let page = repo
        .list(&with_deleted, &UserFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let page = repo
        .list(
            &with_deleted,
            &UserFilter {
                allow_with_deleted: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);

    let search = FindAllQuery {
        query: Some("smith".to_string()),
        ..Default::default()
    };
    let page = repo.list(&search, &UserFilter::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].email, "john@example.com");

    let page = repo
        .list(
            &FindAllQuery::default(),
            &UserFilter {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let page = repo
        .list(
            &FindAllQuery::default(),
            &UserFilter {
                created_before: Some(OffsetDateTime::now_utc() - Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let sorted = FindAllQuery {
        sort: Some(SortOrder::Asc),
        sort_field: Some("name".to_string()),
        ..Default::default()
    };
    let page = repo.list(&sorted, &UserFilter::default()).await.unwrap();
    assert_eq!(page.items[0].name, "John Smith");
    assert_eq!(page.items[1].name, "Zed Admin");

    let bad = FindAllQuery {
        sort: Some(SortOrder::Asc),
        sort_field: Some("password_hash".to_string()),
        ..Default::default()
    };
    let err = repo.list(&bad, &UserFilter::default()).await.unwrap_err();
    assert!(err.downcast_ref::<QueryError>().is_some());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_tokens_cascade_with_user() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let users = MySqlUserRepository::new(pool.clone());
    let tokens = MySqlRefreshTokenRepository::new(pool.clone());

    let user = users.create(new_user("jane@example.com", Role::User)).await.unwrap();
    let hash = "a".repeat(64);
    tokens
        .create(NewRefreshToken {
            user_id: user.id,
            token_hash: hash.clone(),
        })
        .await
        .unwrap();
    tokens
        .create(NewRefreshToken {
            user_id: user.id,
            token_hash: "b".repeat(64),
        })
        .await
        .unwrap();

    let found = tokens.find_active_for_user(user.id, &hash).await.unwrap().unwrap();
    assert!(found.is_active);
    assert!(
        tokens
            .find_active_for_user(uuid::Uuid::new_v4(), &hash)
            .await
            .unwrap()
            .is_none()
    );

    assert!(tokens.delete_by_hash(&hash).await.unwrap());
    assert!(!tokens.delete_by_hash(&hash).await.unwrap());

    assert!(users.delete(user.id).await.unwrap());
    assert_eq!(tokens.delete_by_user_id(user.id).await.unwrap(), 0);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_oauth_identities_link_and_drop_unverified() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let users = MySqlUserRepository::new(pool.clone());
    let identities = MySqlOAuthIdentityRepository::new(pool.clone());

    let user = users.create(new_user("octo@example.com", Role::User)).await.unwrap();
    let github = OAuthIdentity {
        provider: OAuthProvider::Github,
        subject: "42".to_string(),
        user_id: user.id,
        email_verified: true,
    };
    identities.link(github.clone()).await.unwrap();
    identities
        .link(OAuthIdentity {
            provider: OAuthProvider::Facebook,
            subject: "42".to_string(),
            user_id: user.id,
            email_verified: false,
        })
        .await
        .unwrap();
    assert!(identities.link(github.clone()).await.is_err());

    let found = identities.find(OAuthProvider::Github, "42").await.unwrap();
    assert_eq!(found, Some(github));
    assert!(identities.find(OAuthProvider::Google, "42").await.unwrap().is_none());

    assert_eq!(identities.delete_unverified_for_user(user.id).await.unwrap(), 1);
    assert!(identities.find(OAuthProvider::Facebook, "42").await.unwrap().is_none());

    assert!(users.delete(user.id).await.unwrap());
    assert!(identities.find(OAuthProvider::Github, "42").await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_signing_keys_latest_and_purge() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = MySqlKeyRepository::new(pool.clone());

    let first = repo
        .create(NewSigningKey {
            encrypted_key: "first".to_string(),
            key_type: KeyType::Access,
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = repo
        .create(NewSigningKey {
            encrypted_key: "second".to_string(),
            key_type: KeyType::Access,
        })
        .await
        .unwrap();

    let latest = repo.find_latest(KeyType::Access).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert!(repo.find_latest(KeyType::Refresh).await.unwrap().is_none());
    assert_eq!(
        repo.find_by_id(first.id).await.unwrap().unwrap().encrypted_key,
        "first"
    );

    let removed = repo
        .delete_older_than(KeyType::Access, second.created_at)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(repo.find_by_id(first.id).await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_full_stack_register_and_refresh() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = app(common::db_state(pool.clone()));

    let (status, headers, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/v1/auth/register",
            json!({
                "email": "jane@example.com",
                "password": "password123",
                "name": "Jane Doe",
                "confirmPassword": "password123"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
    let cookie = common::cookie_pair(&headers, "refreshToken").unwrap();

    let (status, _, body) = common::send(
        &app,
        common::authed("GET", &format!("/api/v1/users/{}", user_id), &access, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "jane@example.com");

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/auth/refresh")
        .header("cookie", cookie)
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _, _) = common::send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = common::send(&app, common::authed("GET", "/health", &access, None)).await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup_test_db(&pool).await;
}
