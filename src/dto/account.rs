use serde::Deserialize;
use utoipa::ToSchema;

/// Partial profile update; absent fields are left unchanged. The email is
/// immutable after registration and deliberately has no field here.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
    pub fat_number: Option<String>,
    pub company_logo: Option<String>,
}
