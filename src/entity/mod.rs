pub mod audit_logs;
pub mod sessions;
pub mod users;
pub mod vouchers;

pub use audit_logs::Entity as AuditLogs;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
pub use vouchers::Entity as Vouchers;
