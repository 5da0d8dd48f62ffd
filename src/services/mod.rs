// Service exports
pub mod auth;
pub mod exchange;
pub mod supabase;

pub use auth::{AuthError, SessionVerifier};
pub use exchange::{ExchangeError, ExchangeService};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
