mod outcome;
pub use outcome::Outcome;

mod ttl;
pub use ttl::Ttl;

mod run_policy;
pub use run_policy::RunPolicy;

/// Timeout value in milliseconds.
///
/// Used in run policies where an explicit time limit per attempt is required.
pub type TimeoutMs = u64;
