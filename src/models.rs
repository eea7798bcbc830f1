use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account profile as exposed over the API. The password hash never leaves
/// the service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub contact: String,
    pub address: String,
    pub postal_code: String,
    pub state: String,
    pub fat_number: String,
    pub company_logo: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Voucher {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    /// Pre-rendered QR payload (base64 data URI), if the client supplied one.
    pub qr_code: Option<String>,
    pub template: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub logo_url: Option<String>,
    pub show_logo: bool,
    pub show_qr_code: bool,
    pub show_expiry_date: bool,
    pub status: String,
    pub redemptions: i32,
    pub total_redemptions: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What a scanner sees after validating a code: enough to present the
/// voucher, nothing that identifies the owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherSnapshot {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub status: String,
    pub redemptions: i32,
    pub total_redemptions: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
