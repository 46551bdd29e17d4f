//! CLI command handlers for the admin flows.
//!
//! Each handler drives the façade, renders the result to stdout and maps
//! failures to a printable message: validation errors per field, anything
//! else as a single line. Destructive mutations prompt for confirmation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::api::error::ApiError;
use crate::api::types::{Booking, Room, RoomImage, RoomPayload};
use crate::state::AppState;
use crate::upload::UploadFile;

/// Flags for `rooms create`. All core fields are required, matching the
/// create form's required inputs.
#[derive(Args, Debug)]
pub struct CreateRoomFlags {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: String,
    /// Price per night in dollars
    #[arg(long)]
    pub price: f64,
    /// Size in square meters
    #[arg(long)]
    pub size: u32,
    /// Maximum number of guests
    #[arg(long)]
    pub capacity: u32,
    /// Feature label; repeat for multiple
    #[arg(long = "feature")]
    pub features: Vec<String>,
    #[arg(long)]
    pub free_wifi: bool,
    #[arg(long)]
    pub shower: bool,
    #[arg(long)]
    pub airport_transport: bool,
    #[arg(long)]
    pub balcony: bool,
    #[arg(long)]
    pub refrigerator: bool,
    #[arg(long = "support-24-7")]
    pub support_24_7: bool,
    #[arg(long)]
    pub work_desk: bool,
    #[arg(long)]
    pub fitness_center: bool,
    #[arg(long)]
    pub swimming_pool: bool,
    /// Image file; repeat for multiple. The first becomes the primary image.
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

/// Flags for `rooms update`. Omitted flags keep the fetched value;
/// amenity flags take an explicit true/false. Any `--image` replaces the
/// room's whole image set.
#[derive(Args, Debug)]
pub struct UpdateRoomFlags {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub size: Option<u32>,
    #[arg(long)]
    pub capacity: Option<u32>,
    /// Feature label; repeat for multiple. Replaces the whole feature list.
    #[arg(long = "feature")]
    pub features: Vec<String>,
    #[arg(long)]
    pub free_wifi: Option<bool>,
    #[arg(long)]
    pub shower: Option<bool>,
    #[arg(long)]
    pub airport_transport: Option<bool>,
    #[arg(long)]
    pub balcony: Option<bool>,
    #[arg(long)]
    pub refrigerator: Option<bool>,
    #[arg(long = "support-24-7")]
    pub support_24_7: Option<bool>,
    #[arg(long)]
    pub work_desk: Option<bool>,
    #[arg(long)]
    pub fitness_center: Option<bool>,
    #[arg(long)]
    pub swimming_pool: Option<bool>,
    /// Image file; repeat for multiple. Replaces all existing images.
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

// ── Auth ──────────────────────────────────────────────────────────────────

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(), String> {
    println!("Signing in...");
    state
        .store
        .login(email, password)
        .await
        .map_err(|e| render_error(&e))?;
    println!("Logged in as {}. Session valid for 1 day.", email);
    Ok(())
}

pub async fn logout(state: &AppState) -> Result<(), String> {
    state.store.logout().await.map_err(|e| render_error(&e))?;
    println!("Logged out.");
    Ok(())
}

// ── Rooms ─────────────────────────────────────────────────────────────────

pub async fn rooms_list(state: &AppState) -> Result<(), String> {
    println!("Loading rooms...");
    let rooms = state.store.rooms().await.map_err(|e| render_error(&e))?;

    if rooms.is_empty() {
        println!("No rooms yet.");
        return Ok(());
    }

    println!(
        "{:<5} {:<28} {:>12} {:>10} {:>9} {:>7}",
        "ID", "NAME", "PRICE/NIGHT", "SIZE", "CAPACITY", "IMAGES"
    );
    for room in &rooms {
        println!(
            "{:<5} {:<28} {:>12} {:>10} {:>9} {:>7}",
            room.id,
            truncate(&room.name, 28),
            format!("${:.2}", room.price),
            format!("{} sqm", room.size),
            room.capacity,
            room.images.len()
        );
    }
    Ok(())
}

pub async fn room_show(state: &AppState, id: u64) -> Result<(), String> {
    println!("Loading room {}...", id);
    let room = state.store.room(id).await.map_err(|e| render_error(&e))?;

    println!("Room {}: {}", room.id, room.name);
    println!("  {}", room.description);
    println!(
        "  ${:.2}/night, {} sqm, sleeps {}",
        room.price, room.size, room.capacity
    );

    let amenities = amenity_labels(&room);
    if !amenities.is_empty() {
        println!("  Amenities: {}", amenities.join(", "));
    }
    if !room.features.is_empty() {
        println!("  Features: {}", room.features.join(", "));
    }
    for image in &room.images {
        let marker = if image.is_primary { " (primary)" } else { "" };
        println!("  Image: {}{}", image.url, marker);
    }
    Ok(())
}

pub async fn room_create(state: &AppState, flags: CreateRoomFlags) -> Result<(), String> {
    let mut payload = RoomPayload {
        name: flags.name,
        description: flags.description,
        price: flags.price,
        size: flags.size,
        capacity: flags.capacity,
        amenities: crate::api::types::Amenities {
            free_wifi: flags.free_wifi,
            shower: flags.shower,
            airport_transport: flags.airport_transport,
            balcony: flags.balcony,
            refrigerator: flags.refrigerator,
            support_24_7: flags.support_24_7,
            work_desk: flags.work_desk,
            fitness_center: flags.fitness_center,
            swimming_pool: flags.swimming_pool,
        },
        features: flags.features,
        images: Vec::new(),
    };

    if !flags.images.is_empty() {
        payload.images = upload_images(state, &flags.images).await?;
    }

    println!("Saving room...");
    let room = state
        .store
        .create_room(&payload)
        .await
        .map_err(|e| render_error(&e))?;
    println!("Created room {} ({}).", room.id, room.name);
    Ok(())
}

pub async fn room_update(state: &AppState, id: u64, flags: UpdateRoomFlags) -> Result<(), String> {
    // Start from the current server state so omitted flags keep their value.
    println!("Loading room {}...", id);
    let room = state.store.room(id).await.map_err(|e| render_error(&e))?;
    let mut payload = RoomPayload::from_room(&room);

    if let Some(name) = flags.name {
        payload.name = name;
    }
    if let Some(description) = flags.description {
        payload.description = description;
    }
    if let Some(price) = flags.price {
        payload.price = price;
    }
    if let Some(size) = flags.size {
        payload.size = size;
    }
    if let Some(capacity) = flags.capacity {
        payload.capacity = capacity;
    }
    if !flags.features.is_empty() {
        payload.features = flags.features;
    }

    let amenities = &mut payload.amenities;
    if let Some(v) = flags.free_wifi {
        amenities.free_wifi = v;
    }
    if let Some(v) = flags.shower {
        amenities.shower = v;
    }
    if let Some(v) = flags.airport_transport {
        amenities.airport_transport = v;
    }
    if let Some(v) = flags.balcony {
        amenities.balcony = v;
    }
    if let Some(v) = flags.refrigerator {
        amenities.refrigerator = v;
    }
    if let Some(v) = flags.support_24_7 {
        amenities.support_24_7 = v;
    }
    if let Some(v) = flags.work_desk {
        amenities.work_desk = v;
    }
    if let Some(v) = flags.fitness_center {
        amenities.fitness_center = v;
    }
    if let Some(v) = flags.swimming_pool {
        amenities.swimming_pool = v;
    }

    // New images replace the whole existing set; a failed batch leaves the
    // room's current images in place.
    if !flags.images.is_empty() {
        payload.images = upload_images(state, &flags.images).await?;
    }

    println!("Saving room {}...", id);
    let updated = state
        .store
        .update_room(id, &payload)
        .await
        .map_err(|e| render_error(&e))?;
    println!("Updated room {} ({}).", updated.id, updated.name);
    Ok(())
}

pub async fn room_delete(state: &AppState, id: u64, yes: bool) -> Result<(), String> {
    if !yes && !confirm(&format!("Delete room {}? This cannot be undone.", id))? {
        println!("Aborted.");
        return Ok(());
    }

    state
        .store
        .delete_room(id)
        .await
        .map_err(|e| render_error(&e))?;
    println!("Deleted room {}.", id);
    Ok(())
}

// ── Bookings ──────────────────────────────────────────────────────────────

pub async fn bookings_list(state: &AppState) -> Result<(), String> {
    println!("Loading bookings...");
    let bookings = state.store.bookings().await.map_err(|e| render_error(&e))?;

    if bookings.is_empty() {
        println!("No bookings yet.");
        return Ok(());
    }

    println!(
        "{:<5} {:<22} {:<22} {:<23} {:>7} {:>10} {:<11}",
        "ID", "GUEST", "ROOM", "STAY", "GUESTS", "TOTAL", "STATUS"
    );
    for booking in &bookings {
        println!(
            "{:<5} {:<22} {:<22} {:<23} {:>7} {:>10} {:<11}",
            booking.id,
            truncate(&booking.guest_info.name, 22),
            truncate(&booking.room_info.name, 22),
            stay_dates(booking),
            booking.guest_count.adults + booking.guest_count.children,
            format!("${:.2}", booking.total_price),
            booking.status.to_string()
        );
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────

/// Run the two-phase upload: fresh signature, then the parallel batch.
async fn upload_images(state: &AppState, paths: &[PathBuf]) -> Result<Vec<RoomImage>, String> {
    let coordinator = state.uploads.as_ref().ok_or_else(|| {
        "Image host not configured: set CLOUDINARY_CLOUD_NAME and CLOUDINARY_API_KEY".to_string()
    })?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        files.push(UploadFile { file_name, bytes });
    }

    println!("Preparing upload...");
    let credential = state
        .store
        .upload_signature()
        .await
        .map_err(|e| render_error(&e))?;

    println!("Uploading {} image(s)...", files.len());
    coordinator
        .upload_batch(&credential, &files)
        .await
        .map_err(|e| render_error(&e))
}

/// Map an API failure to its user-visible form: field errors one per
/// line, everything else as the error's display string.
fn render_error(err: &ApiError) -> String {
    match err {
        ApiError::Validation {
            message,
            field_errors,
        } => {
            let mut out = message.clone();
            for (field, messages) in field_errors {
                for m in messages {
                    out.push_str(&format!("\n  {}: {}", field, m));
                }
            }
            out
        }
        other => other.to_string(),
    }
}

/// Prompt on stdin; only an explicit yes proceeds.
fn confirm(question: &str) -> Result<bool, String> {
    print!("{} [y/N] ", question);
    std::io::stdout()
        .flush()
        .map_err(|e| format!("Failed to flush stdout: {}", e))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| format!("Failed to read confirmation: {}", e))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn stay_dates(booking: &Booking) -> String {
    format!(
        "{} - {}",
        booking.check_in.format("%Y-%m-%d"),
        booking.check_out.format("%Y-%m-%d")
    )
}

fn amenity_labels(room: &Room) -> Vec<&'static str> {
    let a = &room.amenities;
    [
        (a.free_wifi, "Free Wifi"),
        (a.shower, "Shower"),
        (a.airport_transport, "Airport Transport"),
        (a.balcony, "Balcony"),
        (a.refrigerator, "Refrigerator"),
        (a.support_24_7, "24/7 Support"),
        (a.work_desk, "Work Desk"),
        (a.fitness_center, "Fitness Center"),
        (a.swimming_pool, "Swimming Pool"),
    ]
    .into_iter()
    .filter_map(|(enabled, label)| enabled.then_some(label))
    .collect()
}
