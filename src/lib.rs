use actix_web::web;

pub mod auth;
pub mod debts;
pub mod error;
pub mod expenses;
pub mod schemas;
pub mod token;

use crate::error::ApiError;

pub const DB_NAME: &str = "PocketLedger";

/// Registers every route plus the JSON deserialization error handler, so the
/// server and the integration tests mount the exact same application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_errors = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into());
    cfg.app_data(json_errors)
        .service(auth::register)
        .service(auth::login)
        .service(expenses::add_expense)
        .service(expenses::all_expenses)
        .service(expenses::delete_expense)
        .service(debts::add_debt)
        .service(debts::all_debts)
        .service(debts::delete_debt)
        .service(debts::settle_debt);
}
