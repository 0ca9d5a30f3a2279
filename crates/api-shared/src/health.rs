use crate::dto::HealthRes;

/// Health service shared by the server binaries.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports the service as alive.
    ///
    /// This is a liveness check only; it does not touch the patient store.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Health Record System is alive".into(),
        }
    }
}
