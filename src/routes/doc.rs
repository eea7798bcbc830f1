use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        account::UpdateAccountRequest,
        auth::{LoginRequest, RegisterRequest, SessionResponse},
        vouchers::{CreateVoucherRequest, ValidateRequest, VoucherList},
    },
    models::{UserProfile, Voucher, VoucherSnapshot},
    response::{ApiResponse, Meta},
    routes::{account, auth, geo, health, params, vouchers},
    services::geo_service::DistrictLookup,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        account::get_account,
        account::update_account,
        vouchers::list_vouchers,
        vouchers::create_voucher,
        vouchers::get_voucher,
        vouchers::delete_voucher,
        vouchers::publish_voucher,
        vouchers::voucher_pdf,
        vouchers::validate_code,
        vouchers::redeem_voucher,
        geo::postal_code_lookup,
    ),
    components(
        schemas(
            UserProfile,
            Voucher,
            VoucherSnapshot,
            RegisterRequest,
            LoginRequest,
            SessionResponse,
            UpdateAccountRequest,
            CreateVoucherRequest,
            ValidateRequest,
            VoucherList,
            DistrictLookup,
            params::Pagination,
            params::VoucherListQuery,
            Meta,
            ApiResponse<Voucher>,
            ApiResponse<VoucherList>,
            ApiResponse<VoucherSnapshot>,
            ApiResponse<UserProfile>,
            ApiResponse<SessionResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and session endpoints"),
        (name = "Account", description = "Account profile endpoints"),
        (name = "Vouchers", description = "Voucher management and PDF rendering"),
        (name = "Redemption", description = "Code validation and redemption"),
        (name = "Geo", description = "Postal-code district lookup"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
