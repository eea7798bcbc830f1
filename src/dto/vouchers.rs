use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Voucher;

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateVoucherRequest {
    pub name: String,
    /// Server-generated when absent; must be unique when supplied.
    pub code: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    /// Optional pre-rendered QR payload (base64 data URI).
    pub qr_code: Option<String>,
    pub template: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
    pub logo_url: Option<String>,
    pub show_logo: Option<bool>,
    pub show_qr_code: Option<bool>,
    pub show_expiry_date: Option<bool>,
    /// `draft` or `active`; defaults to `active`.
    pub status: Option<String>,
    pub total_redemptions: Option<i32>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct VoucherList {
    pub items: Vec<Voucher>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ValidateRequest {
    pub code: String,
}
