//! Token-gated content flow tests: the verify → authorize → query chain,
//! owner-or-permission deletion, and media upload against the in-memory
//! collaborators.

use chrono::Utc;
use content_core::config::PaginationSettings;
use content_core::db::{ContentStore, MemoryContentStore};
use content_core::error::ContentError;
use content_core::models::NewContentItem;
use content_core::storage::{BlobStorage, MemoryBlobStorage};
use content_core::{ContentFilter, ContentService, PageBuilder, SortOrder};
use identity_core::config::JwtSettings;
use identity_core::db::{AccountStore, MemoryAccountStore};
use identity_core::models::{RoleDefinition, UserAccount};
use identity_core::{IdentityError, RoleDirectory, TokenService};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct Harness {
    service: ContentService,
    tokens: TokenService,
    blobs: Arc<MemoryBlobStorage>,
    store: Arc<MemoryContentStore>,
    accounts: Arc<MemoryAccountStore>,
}

fn token_service() -> TokenService {
    TokenService::new(&JwtSettings {
        secret: "content-flow-test-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 2_592_000,
    })
}

async fn harness() -> Harness {
    let accounts = Arc::new(MemoryAccountStore::new());
    let store = Arc::new(MemoryContentStore::new());
    let blobs = Arc::new(MemoryBlobStorage::new());
    let roles = Arc::new(RoleDirectory::new(vec![
        RoleDefinition::new(
            "admin",
            &["content.read", "content.create", "content.delete"],
        ),
        RoleDefinition::new("author", &["content.read", "content.create"]),
        RoleDefinition::new("reader", &["content.read"]),
    ]));
    let tokens = token_service();
    let pages = PageBuilder::new(
        store.clone(),
        &PaginationSettings {
            cursor_secret: "content-flow-cursor-secret".to_string(),
            default_page_size: 20,
            max_page_size: 100,
        },
    );

    let service = ContentService::new(
        tokens.clone(),
        roles,
        accounts.clone(),
        store.clone(),
        pages,
        blobs.clone(),
        Duration::from_secs(3600),
    );

    Harness {
        service,
        tokens,
        blobs,
        store,
        accounts,
    }
}

async fn seed_user(harness: &Harness, role: &str, disabled: bool) -> (Uuid, String) {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let account = UserAccount {
        id,
        username: format!("user-{}", id),
        email: format!("user-{}@example.com", id),
        role: role.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        disabled,
        created_at: now,
        updated_at: now,
    };
    harness.accounts.create(&account).await.unwrap();

    let token = harness
        .tokens
        .issue_access_token(id, Uuid::new_v4())
        .unwrap();

    (id, token)
}

fn payload(title: &str) -> NewContentItem {
    NewContentItem {
        title: title.to_string(),
        body: "lorem".to_string(),
        blobs: Vec::new(),
    }
}

#[tokio::test]
async fn author_creates_and_lists_content() {
    let h = harness().await;
    let (author_id, token) = seed_user(&h, "author", false).await;

    let created = h.service.create_content(&token, payload("hello")).await.unwrap();
    assert_eq!(created.owner_id, author_id);

    let page = h
        .service
        .list_content(&token, ContentFilter::default(), SortOrder::NewestFirst, None, None)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, created.id);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn reader_cannot_create_content() {
    let h = harness().await;
    let (_, token) = seed_user(&h, "reader", false).await;

    let result = h.service.create_content(&token, payload("nope")).await;
    assert!(matches!(result, Err(ContentError::PermissionDenied)));
}

#[tokio::test]
async fn owner_or_moderator_may_delete() {
    let h = harness().await;
    let (_, author_token) = seed_user(&h, "author", false).await;
    let (_, other_author_token) = seed_user(&h, "author", false).await;
    let (_, admin_token) = seed_user(&h, "admin", false).await;

    let first = h
        .service
        .create_content(&author_token, payload("mine"))
        .await
        .unwrap();
    let second = h
        .service
        .create_content(&author_token, payload("also mine"))
        .await
        .unwrap();

    // Another author owns neither item and lacks content.delete
    let denied = h.service.delete_content(&other_author_token, first.id).await;
    assert!(matches!(denied, Err(ContentError::PermissionDenied)));

    // The owner passes the ownership arm
    h.service
        .delete_content(&author_token, first.id)
        .await
        .unwrap();

    // The admin passes the permission arm
    h.service
        .delete_content(&admin_token, second.id)
        .await
        .unwrap();

    assert!(h.store.find_by_id(first.id).await.unwrap().is_none());
    assert!(h.store.find_by_id(second.id).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_actor_is_denied_even_with_a_valid_token() {
    let h = harness().await;
    // Valid signature, but no account row behind the subject
    let token = h
        .tokens
        .issue_access_token(Uuid::new_v4(), Uuid::new_v4())
        .unwrap();

    let result = h
        .service
        .list_content(&token, ContentFilter::default(), SortOrder::NewestFirst, None, None)
        .await;
    assert!(matches!(result, Err(ContentError::PermissionDenied)));
}

#[tokio::test]
async fn disabled_actor_is_denied() {
    let h = harness().await;
    let (_, token) = seed_user(&h, "author", true).await;

    let result = h.service.create_content(&token, payload("nope")).await;
    assert!(matches!(result, Err(ContentError::PermissionDenied)));
}

#[tokio::test]
async fn garbage_token_fails_verification() {
    let h = harness().await;

    let result = h
        .service
        .list_content("garbage", ContentFilter::default(), SortOrder::NewestFirst, None, None)
        .await;
    assert!(matches!(
        result,
        Err(ContentError::Identity(IdentityError::TokenMalformed))
    ));
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let h = harness().await;
    let (user_id, _) = seed_user(&h, "author", false).await;
    let refresh = h
        .tokens
        .issue_refresh_token(user_id, Uuid::new_v4(), "jti-0")
        .unwrap();

    let result = h.service.create_content(&refresh, payload("nope")).await;
    assert!(matches!(
        result,
        Err(ContentError::Identity(IdentityError::TokenKindMismatch))
    ));
}

#[tokio::test]
async fn media_upload_and_presigned_download() {
    let h = harness().await;
    let (_, token) = seed_user(&h, "author", false).await;

    let reference = h
        .service
        .upload_media(&token, vec![0u8; 1024], "image/png")
        .await
        .unwrap();
    assert_eq!(reference.size, 1024);
    assert!(h.blobs.object_exists(&reference.key).await.unwrap());

    let item = h
        .service
        .create_content(
            &token,
            NewContentItem {
                title: "with media".to_string(),
                body: "…".to_string(),
                blobs: vec![reference.clone()],
            },
        )
        .await
        .unwrap();

    let url = h
        .service
        .media_download_url(&token, item.id, &reference.key)
        .await
        .unwrap();
    assert!(url.contains(&reference.key));

    let missing = h
        .service
        .media_download_url(&token, item.id, "content/unknown")
        .await;
    assert!(matches!(missing, Err(ContentError::NotFound)));
}

#[tokio::test]
async fn reader_cannot_upload_media() {
    let h = harness().await;
    let (_, token) = seed_user(&h, "reader", false).await;

    let result = h.service.upload_media(&token, vec![1, 2, 3], "image/png").await;
    assert!(matches!(result, Err(ContentError::PermissionDenied)));
}
