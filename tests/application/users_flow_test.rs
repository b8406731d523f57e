use crate::common;

use boilerplate::application::users::create::{CreateUserRequest, CreateUserUseCase};
use boilerplate::application::users::delete::DeleteUserUseCase;
use boilerplate::application::users::get::GetUserUseCase;
use boilerplate::application::users::list::{ListUsersQuery, ListUsersUseCase};
use boilerplate::application::users::restore::RestoreUserUseCase;
use boilerplate::application::users::update::{UpdateUserRequest, UpdateUserUseCase};
use boilerplate::domain::users::Role;
use boilerplate::shared::error::AppError;
use boilerplate::shared::pagination::SortOrder;

#[tokio::test]
async fn test_admin_manages_user_lifecycle() {
    let state = common::mock_state();
    let admin = common::seed_user(&state, "admin@example.com", "password123", Role::Admin).await;

    let created = CreateUserUseCase::new(state.user_repo.clone(), state.password_service.clone())
        .execute(
            CreateUserRequest {
                name: "Bob".to_string(),
                email: "Bob@Example.com".to_string(),
                password: "password123".to_string(),
                role: None,
            },
            &admin,
        )
        .await
        .unwrap();
    assert_eq!(created.email, "bob@example.com");

    let updated = UpdateUserUseCase::new(state.user_repo.clone(), state.password_service.clone())
        .execute(
            created.id,
            UpdateUserRequest {
                name: Some("Robert".to_string()),
                ..Default::default()
            },
            &admin,
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Robert");

    let delete = DeleteUserUseCase::new(state.user_repo.clone(), state.refresh_token_repo.clone());
    delete.execute(created.id, false, &admin).await.unwrap();

    let get = GetUserUseCase::new(state.user_repo.clone());
    assert!(matches!(
        get.execute(created.id, &admin).await,
        Err(AppError::NotFound(_))
    ));

    let restored = RestoreUserUseCase::new(state.user_repo.clone())
        .execute(created.id, &admin)
        .await
        .unwrap();
    assert_eq!(restored.name, "Robert");
    assert!(get.execute(created.id, &admin).await.is_ok());

    delete.execute(created.id, true, &admin).await.unwrap();
    assert!(
        state
            .user_repo
            .find_by_id_with_deleted(created.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_listing_pages_and_sorts() {
    let state = common::mock_state();
    let admin = common::seed_user(&state, "admin@example.com", "password123", Role::Admin).await;
    for i in 0..12 {
        common::seed_user(
            &state,
            &format!("user{:02}@example.com", i),
            "password123",
            Role::User,
        )
        .await;
    }

    let use_case = ListUsersUseCase::new(state.user_repo.clone());

    let first = use_case
        .execute(ListUsersQuery::default(), &admin)
        .await
        .unwrap();
    assert_eq!(first.total, 13);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.next_page, Some(2));
    assert_eq!(first.prev_page, None);

    let second = use_case
        .execute(
            ListUsersQuery {
                page: Some(2),
                ..Default::default()
            },
            &admin,
        )
        .await
        .unwrap();
    assert_eq!(second.items.len(), 3);
    assert_eq!(second.next_page, None);
    assert_eq!(second.prev_page, Some(1));

    let sorted = use_case
        .execute(
            ListUsersQuery {
                sort: Some(SortOrder::Asc),
                sort_field: Some("email".to_string()),
                limit: Some(2),
                ..Default::default()
            },
            &admin,
        )
        .await
        .unwrap();
    assert_eq!(sorted.items[0].email, "admin@example.com");
    assert_eq!(sorted.items[1].email, "user00@example.com");
}

#[tokio::test]
async fn test_unknown_sort_field_is_bad_request() {
    let state = common::mock_state();
    let admin = common::seed_user(&state, "admin@example.com", "password123", Role::Admin).await;

    let result = ListUsersUseCase::new(state.user_repo.clone())
        .execute(
            ListUsersQuery {
                sort: Some(SortOrder::Asc),
                sort_field: Some("password_hash".to_string()),
                ..Default::default()
            },
            &admin,
        )
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
