//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_ELEMENT_ID: &str = "element_id";
pub const FIELD_RELATION_ID: &str = "relation_id";
pub const FIELD_CONSUMER_ID: &str = "consumer_id";
pub const FIELD_PROVIDER_ID: &str = "provider_id";
pub const FIELD_ACTION_TYPE: &str = "action_type";
pub const FIELD_ALGORITHM: &str = "algorithm";

// Collection sizes
pub const FIELD_ELEMENT_COUNT: &str = "element_count";
pub const FIELD_RELATION_COUNT: &str = "relation_count";
pub const FIELD_CLUSTER_COUNT: &str = "cluster_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
