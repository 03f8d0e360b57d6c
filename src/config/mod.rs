/// Configuration subsystem - settings and preferences
///
/// This module handles loading configuration from .driftpenrc files,
/// providing centralized settings management for the entire application.

pub mod rc;

// Re-export public interface
pub use rc::{RcConfig, RcLoader};
