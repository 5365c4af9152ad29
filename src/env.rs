//! Environment variable names and host lookups used to fill the default
//! resource attributes.
//!
//! These are purely helpers; [`LogFormatter`](crate::formatter::LogFormatter)
//! only reads them once, when the configuration is resolved.

/// Logical service name reported as `service.name`.
pub const OTEL_SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";

/// Fallback `service.name` when [`OTEL_SERVICE_NAME_ENV`] is unset.
pub const DEFAULT_SERVICE_NAME: &str = "unknown_service";

/// Fallback `service.instance.id` when the host name cannot be resolved.
pub const DEFAULT_INSTANCE_ID: &str = "unknown";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Service name from the environment.
pub fn service_name() -> String {
    env_or(OTEL_SERVICE_NAME_ENV, DEFAULT_SERVICE_NAME)
}

/// Host name of the machine, used as the default instance id.
pub fn instance_id() -> String {
    sysinfo::System::host_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_INSTANCE_ID.to_string())
}
