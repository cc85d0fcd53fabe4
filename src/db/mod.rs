/// Postgres persistence for users, chirps and refresh tokens

pub mod chirps;
mod refresh_tokens;
pub mod users;

pub use chirps::{ChirpRecord, SortOrder};
pub use users::UserRecord;
