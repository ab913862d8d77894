//! # Constants
//!
//! Shared constants used throughout the runtime.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Annotation holding the name of the external resource a managed resource
/// corresponds to
pub const ANNOTATION_EXTERNAL_NAME: &str = "managed.octopilot.io/external-name";

/// Annotation recording the namespace of the secret a propagated secret was copied from
pub const ANNOTATION_PROPAGATE_FROM_NAMESPACE: &str =
    "from.propagate.managed.octopilot.io/namespace";

/// Annotation recording the name of the secret a propagated secret was copied from
pub const ANNOTATION_PROPAGATE_FROM_NAME: &str = "from.propagate.managed.octopilot.io/name";

/// Annotation recording the UID of the secret a propagated secret was copied from
pub const ANNOTATION_PROPAGATE_FROM_UID: &str = "from.propagate.managed.octopilot.io/uid";

/// Prefix of the annotations a source secret carries for every destination it
/// may be propagated to. The full key is `<prefix>/<destination owner UID>`.
pub const ANNOTATION_PROPAGATE_TO_PREFIX: &str = "to.propagate.managed.octopilot.io";

/// Secret type of connection secrets written by this runtime
pub const SECRET_TYPE_CONNECTION: &str = "connection.managed.octopilot.io/v1alpha1";

/// Default field manager used for writes against the API server
pub const DEFAULT_FIELD_MANAGER: &str = "managed-runtime";

/// Default finalizer token added to managed resources
pub const DEFAULT_FINALIZER: &str = "finalizer.managed.octopilot.io";

/// Default per-request timeout against the API server (seconds)
pub const DEFAULT_STORE_REQUEST_TIMEOUT_SECS: u64 = 30;
