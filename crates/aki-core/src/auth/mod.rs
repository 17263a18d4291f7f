//! Session lifecycle: session record, provider contract, controller and driver.
//!
//! ## Module Structure
//!
//! - `session.rs`: the `Session` record and the derived `SessionMode`
//! - `errors.rs`: provider error types and the error-code → message table
//! - `provider.rs`: the `IdentityProvider` contract and auth-state subscriptions
//! - `controller.rs`: `SessionController` (token lifecycle, login, logout)
//! - `driver.rs`: task that owns the controller and serializes all session events

pub mod controller;
pub mod driver;
pub mod errors;
pub mod provider;
pub mod session;

pub use controller::SessionController;
pub use driver::{SessionClient, SessionCommand, SessionHandle, SessionUpdate, spawn_session};
pub use errors::{AuthErrorCode, AuthFailure, ProviderError, ProviderErrorKind, ProviderResult};
pub use provider::{AuthStateEvent, AuthStateSubscription, IdentityProvider, Subscribers};
pub use session::{Identity, Interface, Session, SessionMode, TokenAction};
