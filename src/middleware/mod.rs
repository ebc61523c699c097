// SPDX-License-Identifier: MIT

//! Middleware modules (authentication, route guards, security headers).

pub mod auth;
pub mod guard;
pub mod security;

pub use auth::require_auth;
pub use guard::require_active;
