//! Canonical schema constants for structured logging
//!
//! Every `log_op_*` macro and every span in the workspace uses these keys.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Reconciliation identifiers
pub const FIELD_MODULE_PATH: &str = "module_path";
pub const FIELD_STATUS: &str = "status";

// Collection sizes
pub const FIELD_REQUIREMENTS_LEN: &str = "requirements_len";
pub const FIELD_VENDOR_LEN: &str = "vendor_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
