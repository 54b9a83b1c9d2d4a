//! Thin clients for the managed identity and document-store platform.
//! No admin SDK exists for this platform in Rust, so the handful of REST
//! calls the service needs live here, behind injectable traits.

mod credentials;
mod error;
mod firestore;
mod identity;
mod token;

pub use credentials::ServiceAccount;
pub use error::PlatformError;
pub use firestore::{Document, DocumentStore, FieldValue, Firestore};
pub use identity::{GoogleIdentity, IdentityProvider, UserRecord, VerifiedToken};
pub use token::TokenSource;
