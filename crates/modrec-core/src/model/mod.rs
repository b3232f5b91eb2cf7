pub mod canonical;
pub mod requirement;

pub use canonical::{CanonicalVersion, VersionSource};
pub use requirement::{ModuleRequirement, VendorEntry};
