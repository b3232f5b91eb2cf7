//! Manifest readers for modrec
//!
//! - `go.mod` module manifests ([`gomod`])
//! - govendor `vendor.json` legacy manifests ([`govendor`])
//! - `go mod why` explanations for the report ([`why`])

pub mod errors;
pub mod gomod;
pub mod govendor;
pub mod why;

pub use gomod::{parse_go_mod_file, parse_go_mod_str, GoMod};
pub use govendor::{parse_vendor_file, parse_vendor_str, VendorFile};
pub use why::{ExplainError, ExplainWhy, Explanation, GoModWhy};
