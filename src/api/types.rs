//! Request and response types for the guesthouse admin API.
//!
//! All structs use camelCase serialization to match the API's JSON format.
//! Every response is wrapped in the `{success, message, data}` envelope;
//! callers unwrap `data` with [`unwrap_data`] before anything is cached.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Standard response envelope around every API payload.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Parse an envelope body and extract its `data` payload.
pub fn unwrap_data<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    let envelope: Envelope<T> =
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("envelope has no data field".to_string()))
}

/// Login request body sent to POST /admin/auth/login.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload of POST /admin/auth/login: `{data: {token}}`.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
}

/// Time-limited signed credential from GET /admin/uploads/signature.
///
/// Never cached -- the signature is only valid close to its timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadCredential {
    pub timestamp: i64,
    pub signature: String,
}

/// A room image as stored by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomImage {
    pub url: String,
    pub public_id: String,
    pub is_primary: bool,
}

/// Boolean amenity flags, flattened into the room object on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Amenities {
    #[serde(default)]
    pub free_wifi: bool,
    #[serde(default)]
    pub shower: bool,
    #[serde(default)]
    pub airport_transport: bool,
    #[serde(default)]
    pub balcony: bool,
    #[serde(default)]
    pub refrigerator: bool,
    #[serde(rename = "support24_7", default)]
    pub support_24_7: bool,
    #[serde(default)]
    pub work_desk: bool,
    #[serde(default)]
    pub fitness_center: bool,
    #[serde(default)]
    pub swimming_pool: bool,
}

/// A room as returned by GET /admin/rooms and GET /admin/rooms/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub size: u32,
    pub capacity: u32,
    #[serde(flatten)]
    pub amenities: Amenities,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<RoomImage>,
}

/// Outgoing room fields for create (JSON body) and update (multipart).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub size: u32,
    pub capacity: u32,
    #[serde(flatten)]
    pub amenities: Amenities,
    pub features: Vec<String>,
    pub images: Vec<RoomImage>,
}

impl RoomPayload {
    /// Start an update payload from a fetched room (CLI edit flow).
    pub fn from_room(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            description: room.description.clone(),
            price: room.price,
            size: room.size,
            capacity: room.capacity,
            amenities: room.amenities.clone(),
            features: room.features.clone(),
            images: room.images.clone(),
        }
    }

    /// Flatten into multipart text fields for PUT /admin/rooms/{id}.
    ///
    /// Scalar fields go out verbatim; `features` and `images` are sent as
    /// JSON-encoded strings since multipart carries only text parts.
    pub fn multipart_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), self.description.clone()),
            ("price".to_string(), self.price.to_string()),
            ("size".to_string(), self.size.to_string()),
            ("capacity".to_string(), self.capacity.to_string()),
        ];
        for (key, value) in [
            ("freeWifi", self.amenities.free_wifi),
            ("shower", self.amenities.shower),
            ("airportTransport", self.amenities.airport_transport),
            ("balcony", self.amenities.balcony),
            ("refrigerator", self.amenities.refrigerator),
            ("support24_7", self.amenities.support_24_7),
            ("workDesk", self.amenities.work_desk),
            ("fitnessCenter", self.amenities.fitness_center),
            ("swimmingPool", self.amenities.swimming_pool),
        ] {
            fields.push((key.to_string(), value.to_string()));
        }
        fields.push((
            "features".to_string(),
            serde_json::to_string(&self.features).unwrap_or_else(|_| "[]".to_string()),
        ));
        fields.push((
            "images".to_string(),
            serde_json::to_string(&self.images).unwrap_or_else(|_| "[]".to_string()),
        ));
        fields
    }
}

/// Booking lifecycle states as rendered in the bookings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    #[serde(rename = "Checked-in")]
    CheckedIn,
    Completed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::CheckedIn => "Checked-in",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Guest contact details attached to a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The room a booking refers to (denormalized subset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRoomRef {
    pub id: u64,
    pub name: String,
    pub price: f64,
}

/// Head counts for a stay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestCount {
    pub adults: u32,
    pub children: u32,
}

/// A booking as returned by GET /admin/bookings.
///
/// Bookings are created by guests through the public site; the admin
/// surface only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    pub booking_id: String,
    pub guest_info: GuestInfo,
    pub room_info: BookingRoomRef,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
    pub guest_count: GuestCount,
    pub total_price: f64,
    pub status: BookingStatus,
}
