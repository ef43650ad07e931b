pub mod builder;
pub mod key_pool;
pub mod manager;
pub mod rate_gate;

pub use builder::DispatchManagerBuilder;
pub use key_pool::{Credential, CredentialState, CredentialStats, FailureReason, KeyPool};
pub use manager::DispatchManager;
pub use rate_gate::{PacingScope, RateGate};
