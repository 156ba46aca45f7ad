// Authentication module
// Credential storage, token refresh and session lifecycle

mod session;
mod store;
mod types;

pub mod refresh;

pub use session::Session;
pub use store::{CredentialStore, MemoryStore, SqliteStore};
pub use types::{CredentialPair, ACCESS_KEY, REFRESH_KEY};
