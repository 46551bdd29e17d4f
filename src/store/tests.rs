//! Unit tests for the query/mutation façade.
//!
//! Uses a scripted Transport so no network is involved: each test queues
//! the responses it expects the API to return, then asserts on the call
//! log and the resulting cache states.

#[cfg(test)]
mod facade_tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use crate::api::auth::TokenStore;
    use crate::api::client::{ApiRequest, Transport};
    use crate::api::error::ApiError;
    use crate::api::types::{Amenities, RoomPayload};
    use crate::cache::{EntryState, ResourceKind, ResourceTag};
    use crate::store::ResourceStore;

    // ── Scripted transport ───────────────────────────────────────────────

    /// Pops pre-queued responses in order and records every request.
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Value, ApiError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn push_ok(&self, body: Value) {
            self.responses.lock().unwrap().push_back(Ok(body));
        }

        fn push_err(&self, err: ApiError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for Arc<ScriptedTransport> {
        async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method(), request.path()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport called more times than scripted")
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn temp_vault(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("guesthouse-facade-test-{}", std::process::id()))
            .join(name)
            .join("token.json")
    }

    fn make_store(name: &str) -> (Arc<ScriptedTransport>, ResourceStore<Arc<ScriptedTransport>>) {
        let transport = Arc::new(ScriptedTransport::new());
        let tokens = Arc::new(TokenStore::new(temp_vault(name)));
        let store = ResourceStore::new(Arc::clone(&transport), tokens);
        (transport, store)
    }

    fn room_json(id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "A room",
            "price": 100.0,
            "size": 25,
            "capacity": 2,
            "features": [],
            "images": []
        })
    }

    fn booking_json(id: u64) -> Value {
        json!({
            "id": id,
            "bookingId": "clx123abc",
            "guestInfo": {
                "name": "John Doe",
                "email": "john.doe@example.com",
                "phone": "123-456-7890"
            },
            "roomInfo": { "id": 101, "name": "The Sunrise Suite", "price": 150.5 },
            "checkIn": "2025-11-20T14:00:00Z",
            "checkOut": "2025-11-25T11:00:00Z",
            "createdAt": "2025-10-01T10:30:00Z",
            "guestCount": { "adults": 2, "children": 1 },
            "totalPrice": 752.5,
            "status": "Confirmed"
        })
    }

    fn draft_payload(name: &str) -> RoomPayload {
        RoomPayload {
            name: name.to_string(),
            description: "A room".to_string(),
            price: 100.0,
            size: 25,
            capacity: 2,
            amenities: Amenities::default(),
            features: vec![],
            images: vec![],
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_room_list_second_read_is_a_cache_hit() {
        let (transport, store) = make_store("list-hit");
        transport.push_ok(json!({ "success": true, "data": [room_json(1, "Garden Room")] }));

        let first = store.rooms().await.unwrap();
        let second = store.rooms().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), vec!["GET /admin/rooms"]);
    }

    #[tokio::test]
    async fn test_room_detail_second_read_is_a_cache_hit() {
        let (transport, store) = make_store("detail-hit");
        transport.push_ok(json!({ "success": true, "data": room_json(5, "Sunrise Suite") }));

        let first = store.room(5).await.unwrap();
        let second = store.room(5).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), vec!["GET /admin/rooms/5"]);
    }

    #[tokio::test]
    async fn test_booking_list_second_read_is_a_cache_hit() {
        let (transport, store) = make_store("bookings-hit");
        transport.push_ok(json!({ "success": true, "data": [booking_json(1)] }));

        let bookings = store.bookings().await.unwrap();
        assert_eq!(bookings[0].guest_info.name, "John Doe");

        let again = store.bookings().await.unwrap();
        assert_eq!(bookings, again);
        assert_eq!(transport.calls(), vec!["GET /admin/bookings"]);
    }

    #[tokio::test]
    async fn test_upload_signature_is_never_cached() {
        let (transport, store) = make_store("signature");
        transport.push_ok(json!({ "data": { "timestamp": 1700000000, "signature": "sig-a" } }));
        transport.push_ok(json!({ "data": { "timestamp": 1700000060, "signature": "sig-b" } }));

        let first = store.upload_signature().await.unwrap();
        let second = store.upload_signature().await.unwrap();

        assert_eq!(first.signature, "sig-a");
        assert_eq!(second.signature, "sig-b");
        assert_eq!(transport.calls().len(), 2);
    }

    // ── Invalidation ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_update_room_forces_refetch_of_item_and_list() {
        let (transport, store) = make_store("update-invalidates");
        transport.push_ok(json!({ "data": [room_json(5, "Sunrise Suite")] }));
        transport.push_ok(json!({ "data": room_json(5, "Sunrise Suite") }));

        store.rooms().await.unwrap();
        store.room(5).await.unwrap();

        transport.push_ok(json!({ "data": room_json(5, "Sunset Suite") }));
        store.update_room(5, &draft_payload("Sunset Suite")).await.unwrap();

        // Both entries are stalled, not populated.
        let cache = store.cache.lock().await;
        assert!(matches!(
            cache.state(&ResourceTag::list(ResourceKind::Room)),
            Some(EntryState::Invalidated)
        ));
        assert!(matches!(
            cache.state(&ResourceTag::id(ResourceKind::Room, 5)),
            Some(EntryState::Invalidated)
        ));
        drop(cache);

        // The next reads go back to the transport.
        transport.push_ok(json!({ "data": [room_json(5, "Sunset Suite")] }));
        transport.push_ok(json!({ "data": room_json(5, "Sunset Suite") }));
        let rooms = store.rooms().await.unwrap();
        let room = store.room(5).await.unwrap();

        assert_eq!(rooms[0].name, "Sunset Suite");
        assert_eq!(room.name, "Sunset Suite");
        assert_eq!(
            transport.calls(),
            vec![
                "GET /admin/rooms",
                "GET /admin/rooms/5",
                "PUT /admin/rooms/5",
                "GET /admin/rooms",
                "GET /admin/rooms/5",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_room_invalidates_list_but_not_unrelated_items() {
        let (transport, store) = make_store("create-invalidates");
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        transport.push_ok(json!({ "data": room_json(1, "Garden Room") }));

        store.rooms().await.unwrap();
        store.room(1).await.unwrap();

        transport.push_ok(json!({ "data": room_json(2, "Attic Loft") }));
        store.create_room(&draft_payload("Attic Loft")).await.unwrap();

        // List refetches; the untouched item entry still serves from cache.
        transport.push_ok(json!({
            "data": [room_json(1, "Garden Room"), room_json(2, "Attic Loft")]
        }));
        store.rooms().await.unwrap();
        store.room(1).await.unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                "GET /admin/rooms",
                "GET /admin/rooms/1",
                "POST /admin/rooms",
                "GET /admin/rooms",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_room_forces_refetch_of_list() {
        let (transport, store) = make_store("delete-invalidates");
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        store.rooms().await.unwrap();

        transport.push_ok(Value::Null); // 204, empty body
        store.delete_room(1).await.unwrap();

        transport.push_ok(json!({ "data": [] }));
        let rooms = store.rooms().await.unwrap();

        assert!(rooms.is_empty());
        assert_eq!(
            transport.calls(),
            vec![
                "GET /admin/rooms",
                "DELETE /admin/rooms/1",
                "GET /admin/rooms",
            ]
        );
    }

    // ── Errors ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_failed_read_is_errored_then_retried_on_next_read() {
        let (transport, store) = make_store("read-error");
        transport.push_err(ApiError::Transport("connection refused".to_string()));

        assert!(store.rooms().await.is_err());
        {
            let cache = store.cache.lock().await;
            assert!(matches!(
                cache.state(&ResourceTag::list(ResourceKind::Room)),
                Some(EntryState::Error(_))
            ));
        }

        // No automatic retry happened; the next explicit read refetches.
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        let rooms = store.rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_create_surfaces_field_errors_and_leaves_cache_alone() {
        let (transport, store) = make_store("create-rejected");
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        store.rooms().await.unwrap();

        transport.push_err(ApiError::Validation {
            message: "Validation failed".to_string(),
            field_errors: [("name".to_string(), vec!["Name is required".to_string()])]
                .into_iter()
                .collect(),
        });

        let err = store.create_room(&draft_payload("")).await.unwrap_err();
        match err {
            ApiError::Validation { field_errors, .. } => {
                assert_eq!(field_errors["name"], vec!["Name is required"]);
            }
            other => panic!("expected Validation, got {:?}", other),
        }

        // The populated list entry is untouched: no refetch on next read.
        store.rooms().await.unwrap();
        assert_eq!(
            transport.calls(),
            vec!["GET /admin/rooms", "POST /admin/rooms"]
        );
    }

    #[tokio::test]
    async fn test_401_is_surfaced_without_clearing_the_session() {
        let transport = Arc::new(ScriptedTransport::new());
        let tokens = Arc::new(TokenStore::new(temp_vault("unauthorized")));
        tokens.set_token("tok123".to_string()).await.unwrap();
        let store = ResourceStore::new(Arc::clone(&transport), Arc::clone(&tokens));

        transport.push_err(ApiError::Auth {
            message: "Invalid token".to_string(),
        });

        let err = store.rooms().await.unwrap_err();
        assert!(matches!(err, ApiError::Auth { .. }));
        // Observed behavior: the token survives a 401.
        assert_eq!(tokens.token().await.as_deref(), Some("tok123"));
        tokens.clear_token().await.unwrap();
    }

    // ── Auth integration ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_login_deposits_token_in_store_and_vault() {
        let transport = Arc::new(ScriptedTransport::new());
        let vault_path = temp_vault("login");
        let tokens = Arc::new(TokenStore::new(vault_path.clone()));
        let store = ResourceStore::new(Arc::clone(&transport), Arc::clone(&tokens));

        transport.push_ok(json!({ "data": { "token": "tok123" } }));
        let issued = store
            .login("admin@guesthouse.com", "Password123!")
            .await
            .unwrap();

        assert_eq!(issued, "tok123");
        assert_eq!(tokens.token().await.as_deref(), Some("tok123"));

        // The vault entry holds the token with its cookie-style attributes.
        let raw = std::fs::read_to_string(&vault_path).unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["token"], "tok123");
        assert_eq!(stored["secure"], true);
        assert_eq!(stored["same_site"], "strict");

        store.logout().await.unwrap();
        assert!(tokens.token().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_cached_entries() {
        let (transport, store) = make_store("logout-cache");
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        store.rooms().await.unwrap();

        store.logout().await.unwrap();

        // Cache was dropped with the session: the next read refetches.
        transport.push_ok(json!({ "data": [room_json(1, "Garden Room")] }));
        store.rooms().await.unwrap();
        assert_eq!(transport.calls().len(), 2);
    }
}
