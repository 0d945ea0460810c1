//! Module registry collaborator seam.
//!
//! The host application owns the set of module types. This crate only
//! ever asks it for a default instance when adding a node, and for
//! validation verdicts; module-specific settings stay opaque.

use serde::{Deserialize, Serialize};

use gridboard_model::{Module, NodeId};

/// Outcome of validating one module's settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Report with no findings.
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// Whether the module passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record one finding.
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Per-module-type factory and validator.
///
/// `create_default` must build the module (and any pre-populated
/// children) using only `id` and IDs the caller will regenerate; in
/// practice default instances are leaves or empty containers.
pub trait ModuleRegistry {
    /// Default instance for a type tag, or `None` for unknown types.
    fn create_default(&self, type_name: &str, id: NodeId) -> Option<Module>;

    /// Validate module settings. The default accepts everything.
    fn validate(&self, module: &Module) -> ValidationReport {
        let _ = module;
        ValidationReport::valid()
    }
}
