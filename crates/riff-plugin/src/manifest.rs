//! Plugin manifest types
//!
//! The manifest (`plugin.yaml`) is embedded at build time and describes the
//! plugin to the host.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::{PluginError, Result};

const EMBEDDED_MANIFEST: &str = include_str!("../plugin.yaml");

/// Plugin manifest (plugin.yaml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Tool name the host registers.
    pub name: String,

    /// Plugin version (semver)
    pub version: String,

    /// Version of the host tool API this plugin speaks.
    pub api_version: String,

    /// Human-readable description
    pub description: String,

    /// Plugin author
    #[serde(default)]
    pub author: Option<String>,

    /// What the host must provide
    #[serde(default)]
    pub requirements: Requirements,
}

/// Host requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Oldest agent version that can load the plugin.
    #[serde(default)]
    pub min_agent_version: Option<String>,
}

impl PluginManifest {
    /// Parse and validate a manifest.
    pub fn parse(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// The manifest compiled into this binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_MANIFEST)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PluginError::InvalidManifest("name is empty".into()));
        }
        self.semver()?;
        if let Some(min) = &self.requirements.min_agent_version {
            Version::parse(min).map_err(|e| {
                PluginError::InvalidManifest(format!("min_agent_version {min:?}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Parsed plugin version.
    pub fn semver(&self) -> Result<Version> {
        Version::parse(&self.version)
            .map_err(|e| PluginError::InvalidManifest(format!("version {:?}: {e}", self.version)))
    }

    /// Check that an agent of `agent_version` may load this plugin.
    pub fn check_agent_version(&self, agent_version: &str) -> Result<()> {
        let Some(min) = &self.requirements.min_agent_version else {
            return Ok(());
        };
        let agent = Version::parse(agent_version).map_err(|e| {
            PluginError::RequirementNotMet(format!("agent version {agent_version:?}: {e}"))
        })?;
        let req = VersionReq::parse(&format!(">={min}"))
            .map_err(|e| PluginError::InvalidManifest(e.to_string()))?;

        if req.matches(&agent) {
            Ok(())
        } else {
            Err(PluginError::RequirementNotMet(format!(
                "agent version {agent} is older than {min}"
            )))
        }
    }
}

/// Version and provenance of this build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Crate version.
    pub version: &'static str,
    /// Short git commit, `unknown` outside a checkout.
    pub git_commit: &'static str,
    /// UTC build timestamp.
    pub build_time: &'static str,
}

impl BuildInfo {
    /// Information recorded when this binary was built.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: env!("RIFF_GIT_COMMIT"),
            build_time: env!("RIFF_BUILD_TIME"),
        }
    }
}
