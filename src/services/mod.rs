// SPDX-License-Identifier: MIT

//! Service layer: external collaborators and pure domain logic.

pub mod fees;
pub mod identity;
pub mod notify;
pub mod unlock;

pub use identity::IdentityService;
pub use notify::Notifier;
