// handlers/public/mod.rs - endpoints reachable without a logged-in session
//
// Both are rate limited per client address and CSRF-checked on POST.

pub mod auth;
pub mod contact;
