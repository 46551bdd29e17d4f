//! Query/mutation façade over the admin API.
//!
//! The CLI talks to this layer only. Queries consult the resource cache
//! and hit the transport on a miss; mutations always hit the transport and
//! invalidate the tags they touch, so the next read refetches. Nothing is
//! updated optimistically and nothing retries automatically.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::auth::TokenStore;
use crate::api::client::{ApiRequest, Transport};
use crate::api::error::ApiError;
use crate::api::types::{
    unwrap_data, Booking, LoginData, LoginRequest, Room, RoomPayload, UploadCredential,
};
use crate::cache::{CachedValue, ResourceCache, ResourceKind, ResourceTag};

/// The single entry point for reads and writes against the API.
///
/// Owns the resource cache (sole writer) and integrates the token store:
/// a successful login deposits the issued token, exactly like the web
/// dashboard's login flow priming its auth state and cookie.
pub struct ResourceStore<T: Transport> {
    transport: T,
    tokens: Arc<TokenStore>,
    cache: Mutex<ResourceCache>,
}

impl<T: Transport> ResourceStore<T> {
    pub fn new(transport: T, tokens: Arc<TokenStore>) -> Self {
        Self {
            transport,
            tokens,
            cache: Mutex::new(ResourceCache::new()),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All rooms. Cached under {Room, LIST} and tagged with each room id,
    /// so any room mutation stalls the list.
    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        let key = ResourceTag::list(ResourceKind::Room);
        if let Some(CachedValue::Rooms(rooms)) = self.cache.lock().await.lookup(&key) {
            log::debug!("Cache hit: room list");
            return Ok(rooms.clone());
        }

        self.cache.lock().await.mark_loading(key);
        let fetched = self
            .transport
            .execute(ApiRequest::Get {
                path: "/admin/rooms".to_string(),
            })
            .await
            .and_then(unwrap_data::<Vec<Room>>);

        match fetched {
            Ok(rooms) => {
                let mut tags = vec![key];
                tags.extend(
                    rooms
                        .iter()
                        .map(|r| ResourceTag::id(ResourceKind::Room, r.id)),
                );
                self.cache
                    .lock()
                    .await
                    .populate(key, CachedValue::Rooms(rooms.clone()), tags);
                Ok(rooms)
            }
            Err(e) => {
                self.cache.lock().await.mark_error(key, e.to_string());
                Err(e)
            }
        }
    }

    /// A single room by id. Cached under {Room, id}.
    pub async fn room(&self, id: u64) -> Result<Room, ApiError> {
        let key = ResourceTag::id(ResourceKind::Room, id);
        if let Some(CachedValue::Room(room)) = self.cache.lock().await.lookup(&key) {
            log::debug!("Cache hit: room {}", id);
            return Ok((**room).clone());
        }

        self.cache.lock().await.mark_loading(key);
        let fetched = self
            .transport
            .execute(ApiRequest::Get {
                path: format!("/admin/rooms/{}", id),
            })
            .await
            .and_then(unwrap_data::<Room>);

        match fetched {
            Ok(room) => {
                self.cache.lock().await.populate(
                    key,
                    CachedValue::Room(Box::new(room.clone())),
                    vec![key],
                );
                Ok(room)
            }
            Err(e) => {
                self.cache.lock().await.mark_error(key, e.to_string());
                Err(e)
            }
        }
    }

    /// All bookings. Read-only on the admin surface.
    pub async fn bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let key = ResourceTag::list(ResourceKind::Booking);
        if let Some(CachedValue::Bookings(bookings)) = self.cache.lock().await.lookup(&key) {
            log::debug!("Cache hit: booking list");
            return Ok(bookings.clone());
        }

        self.cache.lock().await.mark_loading(key);
        let fetched = self
            .transport
            .execute(ApiRequest::Get {
                path: "/admin/bookings".to_string(),
            })
            .await
            .and_then(unwrap_data::<Vec<Booking>>);

        match fetched {
            Ok(bookings) => {
                let mut tags = vec![key];
                tags.extend(
                    bookings
                        .iter()
                        .map(|b| ResourceTag::id(ResourceKind::Booking, b.id)),
                );
                self.cache
                    .lock()
                    .await
                    .populate(key, CachedValue::Bookings(bookings.clone()), tags);
                Ok(bookings)
            }
            Err(e) => {
                self.cache.lock().await.mark_error(key, e.to_string());
                Err(e)
            }
        }
    }

    /// Fresh signed upload credential. Deliberately bypasses the cache:
    /// the signature is only valid near its timestamp.
    pub async fn upload_signature(&self) -> Result<UploadCredential, ApiError> {
        self.transport
            .execute(ApiRequest::Get {
                path: "/admin/uploads/signature".to_string(),
            })
            .await
            .and_then(unwrap_data::<UploadCredential>)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Authenticate and deposit the issued token in the token store.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;

        let data: LoginData = self
            .transport
            .execute(ApiRequest::PostJson {
                path: "/admin/auth/login".to_string(),
                body,
            })
            .await
            .and_then(unwrap_data)?;

        self.tokens
            .set_token(data.token.clone())
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        log::info!("Logged in as {}", email);
        Ok(data.token)
    }

    /// End the session: clear the token (memory and vault) and drop all
    /// cached entries.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.tokens
            .clear_token()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        self.cache.lock().await.clear();
        log::info!("Logged out");
        Ok(())
    }

    /// Create a room. Invalidates {Room, LIST}.
    pub async fn create_room(&self, payload: &RoomPayload) -> Result<Room, ApiError> {
        let body =
            serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))?;
        let room: Room = self
            .transport
            .execute(ApiRequest::PostJson {
                path: "/admin/rooms".to_string(),
                body,
            })
            .await
            .and_then(unwrap_data)?;

        self.invalidate(&[ResourceTag::list(ResourceKind::Room)])
            .await;
        Ok(room)
    }

    /// Update a room (multipart PUT). Invalidates {Room, id} and
    /// {Room, LIST}.
    pub async fn update_room(&self, id: u64, payload: &RoomPayload) -> Result<Room, ApiError> {
        let room: Room = self
            .transport
            .execute(ApiRequest::PutMultipart {
                path: format!("/admin/rooms/{}", id),
                fields: payload.multipart_fields(),
            })
            .await
            .and_then(unwrap_data)?;

        self.invalidate(&[
            ResourceTag::id(ResourceKind::Room, id),
            ResourceTag::list(ResourceKind::Room),
        ])
        .await;
        Ok(room)
    }

    /// Delete a room. Invalidates {Room, id} and {Room, LIST}.
    pub async fn delete_room(&self, id: u64) -> Result<(), ApiError> {
        self.transport
            .execute(ApiRequest::Delete {
                path: format!("/admin/rooms/{}", id),
            })
            .await?;

        self.invalidate(&[
            ResourceTag::id(ResourceKind::Room, id),
            ResourceTag::list(ResourceKind::Room),
        ])
        .await;
        Ok(())
    }

    async fn invalidate(&self, touched: &[ResourceTag]) {
        let count = self.cache.lock().await.invalidate(touched);
        log::debug!("Invalidated {} cache entries", count);
    }
}
