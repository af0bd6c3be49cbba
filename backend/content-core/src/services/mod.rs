//! Token-gated content flows.
//!
//! The gate order is the system's control flow: verify the access token,
//! resolve the actor, evaluate permissions, then touch storage. Authorization
//! fails closed: an actor that cannot be resolved is denied, never allowed.

use crate::db::ContentStore;
use crate::error::{ContentError, Result};
use crate::models::{BlobReference, ContentItem, ContentStatus, NewContentItem, Page};
use crate::pagination::{ContentFilter, PageBuilder, QuerySignature, SortOrder};
use crate::storage::BlobStorage;
use chrono::Utc;
use identity_core::db::AccountStore;
use identity_core::models::UserAccount;
use identity_core::{RoleDirectory, TokenService};
use sqlx::types::Json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const PERM_CONTENT_READ: &str = "content.read";
pub const PERM_CONTENT_CREATE: &str = "content.create";
pub const PERM_CONTENT_DELETE: &str = "content.delete";

pub struct ContentService {
    tokens: TokenService,
    roles: Arc<RoleDirectory>,
    accounts: Arc<dyn AccountStore>,
    store: Arc<dyn ContentStore>,
    pages: PageBuilder,
    blobs: Arc<dyn BlobStorage>,
    presign_ttl: Duration,
}

impl ContentService {
    pub fn new(
        tokens: TokenService,
        roles: Arc<RoleDirectory>,
        accounts: Arc<dyn AccountStore>,
        store: Arc<dyn ContentStore>,
        pages: PageBuilder,
        blobs: Arc<dyn BlobStorage>,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            tokens,
            roles,
            accounts,
            store,
            pages,
            blobs,
            presign_ttl,
        }
    }

    /// List content strictly after `cursor` under the given query shape.
    pub async fn list_content(
        &self,
        access_token: &str,
        filter: ContentFilter,
        sort: SortOrder,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Page> {
        let actor = self.resolve_actor(access_token).await?;
        if !self.roles.authorize(&actor.role, PERM_CONTENT_READ) {
            return Err(ContentError::PermissionDenied);
        }

        let signature = QuerySignature::new(filter, sort);
        self.pages.build_page(&signature, cursor, limit).await
    }

    /// Create a content item owned by the actor.
    pub async fn create_content(
        &self,
        access_token: &str,
        payload: NewContentItem,
    ) -> Result<ContentItem> {
        let actor = self.resolve_actor(access_token).await?;
        if !self.roles.authorize(&actor.role, PERM_CONTENT_CREATE) {
            return Err(ContentError::PermissionDenied);
        }

        let now = Utc::now();
        let item = ContentItem {
            id: Uuid::new_v4(),
            owner_id: actor.id,
            title: payload.title,
            body: payload.body,
            status: ContentStatus::Published,
            blobs: Json(payload.blobs),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.store.insert(&item).await?;
        tracing::info!(content_id = %item.id, owner_id = %actor.id, "content created");

        Ok(item)
    }

    /// Soft-delete a content item. Owner-or-permission: authors remove their
    /// own work, moderators remove anyone's.
    pub async fn delete_content(&self, access_token: &str, content_id: Uuid) -> Result<()> {
        let actor = self.resolve_actor(access_token).await?;
        let item = self
            .store
            .find_by_id(content_id)
            .await?
            .ok_or(ContentError::NotFound)?;

        let allowed = self.roles.authorize_owner_or_permission(
            actor.id,
            item.owner_id,
            &actor.role,
            PERM_CONTENT_DELETE,
        );
        if !allowed {
            return Err(ContentError::PermissionDenied);
        }

        self.store.soft_delete(content_id).await
    }

    /// Store a media object for later attachment to content.
    ///
    /// Success here does not mean the object is readable yet; the blob store
    /// is eventually consistent and callers may poll `object_exists`.
    pub async fn upload_media(
        &self,
        access_token: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobReference> {
        let actor = self.resolve_actor(access_token).await?;
        if !self.roles.authorize(&actor.role, PERM_CONTENT_CREATE) {
            return Err(ContentError::PermissionDenied);
        }

        let key = format!("content/{}/{}", actor.id, Uuid::new_v4());
        self.blobs.put_object(&key, bytes, content_type).await
    }

    /// Time-limited download URL for a blob referenced by a content item.
    pub async fn media_download_url(
        &self,
        access_token: &str,
        content_id: Uuid,
        blob_key: &str,
    ) -> Result<String> {
        let actor = self.resolve_actor(access_token).await?;
        if !self.roles.authorize(&actor.role, PERM_CONTENT_READ) {
            return Err(ContentError::PermissionDenied);
        }

        let item = self
            .store
            .find_by_id(content_id)
            .await?
            .ok_or(ContentError::NotFound)?;

        if !item.blobs.iter().any(|blob| blob.key == blob_key) {
            return Err(ContentError::NotFound);
        }

        self.blobs
            .presigned_download_url(blob_key, self.presign_ttl)
            .await
    }

    async fn resolve_actor(&self, access_token: &str) -> Result<UserAccount> {
        let claims = self
            .tokens
            .verify(access_token, identity_core::TokenKind::Access)?;
        let user_id = claims.subject_id()?;

        match self.accounts.find_by_id(user_id).await? {
            Some(account) if account.is_active() => Ok(account),
            // Fail closed: unresolvable or disabled actors are denied
            _ => Err(ContentError::PermissionDenied),
        }
    }
}
