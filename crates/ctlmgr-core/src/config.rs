// ── Runtime panel configuration ──
//
// Describes *which* controller manager the panel talks to. The TUI builds
// a `PanelConfig` from files, env and flags and hands it in; core never
// reads config sources itself.

/// Namespace used when no configuration source provides one.
pub const DEFAULT_NAMESPACE_PREFIX: &str = "/campero";

/// Read once at activation, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Prepended verbatim to `/controller_manager/...`.
    pub namespace_prefix: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.into(),
        }
    }
}

impl PanelConfig {
    pub fn new(namespace_prefix: impl Into<String>) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
        }
    }
}
