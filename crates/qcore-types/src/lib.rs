//! Shared vocabulary for the quantum execution core: the closed error
//! taxonomy every crate returns, and the identifier newtypes that cross
//! crate boundaries (circuit IR <-> provider contract <-> dispatcher).
//!
//! Nothing in this crate depends on any other core crate — it exists so
//! that `qcore-ir`, `qcore-sim`, `qcore-hal`, and `qcore-sched` can all
//! speak the same error and identifier vocabulary without depending on
//! each other.

mod error;
mod ids;

pub use error::{CoreResult, ErrorKind};
pub use ids::{Bitstring, Counts, DeviceName, GateTag, JobId, ProviderTag};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ErrorKind::ProviderUnavailable { retryable: true }.is_retryable());
        assert!(!ErrorKind::ProviderUnavailable { retryable: false }.is_retryable());
        assert!(
            ErrorKind::ProviderThrottled {
                retry_after: std::time::Duration::from_secs(1)
            }
            .is_retryable()
        );
        assert!(!ErrorKind::ProviderUnauthorized.is_retryable());
        assert!(!ErrorKind::Timeout.is_retryable());
    }

    #[test]
    fn device_name_display() {
        let name = DeviceName::new("local-sim-0");
        assert_eq!(name.to_string(), "local-sim-0");
    }

    #[test]
    fn job_id_roundtrips_through_serde() {
        let id = JobId::new_v4();
        let json = serde_json::to_string(&id).unwrap();
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
