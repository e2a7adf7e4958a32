pub mod error;
pub mod gate;
pub mod policy;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::GateError;
pub use gate::{Gate, MeteredEndpoint, API_KEY_HEADER};
pub use policy::TierPolicy;
pub use types::{Credential, Role, Tier};

/// Prefix on every issued token.
pub const KEY_PREFIX: &str = "olx_";
const KEY_BODY_LEN: usize = 32;

/// Fresh random token: `olx_` followed by 32 alphanumeric characters.
pub fn generate_token() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_BODY_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", KEY_PREFIX, body)
}
