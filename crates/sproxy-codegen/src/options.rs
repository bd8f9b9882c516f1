//! Emitter configuration

use sproxy_classfile::class::DEFAULT_MAJOR_VERSION;
use sproxy_model::EmitOverrides;

/// Bridge class whose static entry points the generated bodies call
pub const DEFAULT_BRIDGE: &str = "sproxy.runtime.Bridge";

/// Marker interface appended to every generated class
pub const DEFAULT_MARKER: &str = "sproxy.runtime.StaticProxy";

/// Options controlling class emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Binary name of the bridge class
    pub bridge: String,
    /// Marker interface appended after the declared interfaces, if any
    pub marker: Option<String>,
    /// Class file major version
    pub major_version: u16,
    /// Whether to write the `SourceFile` attribute
    pub source_file: bool,
    /// Whether to generate `finalize()` when the class does not declare one
    pub finalize: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            bridge: DEFAULT_BRIDGE.to_string(),
            marker: Some(DEFAULT_MARKER.to_string()),
            major_version: DEFAULT_MAJOR_VERSION,
            source_file: true,
            finalize: true,
        }
    }
}

impl EmitOptions {
    /// Apply the `[emit]` table of a declaration file
    pub fn apply(&mut self, overrides: &EmitOverrides) -> &mut Self {
        if let Some(bridge) = &overrides.bridge {
            self.bridge = bridge.clone();
        }
        if let Some(marker) = &overrides.marker {
            self.marker = (!marker.is_empty()).then(|| marker.clone());
        }
        if let Some(major) = overrides.major_version {
            self.major_version = major;
        }
        if let Some(source_file) = overrides.source_file {
            self.source_file = source_file;
        }
        if let Some(finalize) = overrides.finalize {
            self.finalize = finalize;
        }
        self
    }

    /// Disable the marker interface
    pub fn without_marker(mut self) -> Self {
        self.marker = None;
        self
    }
}

impl From<&EmitOverrides> for EmitOptions {
    fn from(overrides: &EmitOverrides) -> Self {
        let mut options = EmitOptions::default();
        options.apply(overrides);
        options
    }
}
