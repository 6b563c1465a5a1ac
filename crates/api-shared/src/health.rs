use crate::pb::HealthRes;

/// Simple health service that can be used by both gRPC and REST APIs
///
/// The engine is pure and has no backing store, so being able to answer is being healthy.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "LLaMAid is alive".into(),
        }
    }
}
