pub mod account_service;
pub mod auth_service;
pub mod geo_service;
pub mod redemption_service;
pub mod voucher_service;
