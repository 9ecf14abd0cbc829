// handlers/protected/mod.rs - endpoints behind `require_auth`
//
// GET reads the query string; POST/PUT/DELETE read a JSON body and
// pass the CSRF guard before anything else.

pub mod clients;
pub mod dashboard;
pub mod invoices;
pub mod projects;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use crate::validation::FieldErrors;

fn ensure_valid(errors: FieldErrors) -> ApiResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}
