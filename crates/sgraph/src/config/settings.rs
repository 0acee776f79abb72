//! # Scene Configuration
//!
//! Serializable settings for the scene graph library and its tools. The
//! core never reads these from a global; callers pass them to
//! [`MeshGenerator::from_config`](crate::geometry::MeshGenerator::from_config)
//! and [`SgCloneMap::from_config`](crate::scene::SgCloneMap::from_config).

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Smallest division number accepted by every mesh primitive
pub const MIN_DIVISION_NUMBER: u32 = 4;

/// # Mesh Generator Configuration
///
/// Tessellation parameters for generated primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGeneratorConfig {
    /// Number of divisions around curved primitives
    pub division_number: u32,
    /// Whether generated meshes get per-corner normals
    pub normal_generation: bool,
}

impl Default for MeshGeneratorConfig {
    fn default() -> Self {
        Self {
            division_number: 20,
            normal_generation: true,
        }
    }
}

/// # Clone Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// Clone payload objects (arrays, materials, textures) instead of sharing them
    pub non_node_cloning: bool,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self { non_node_cloning: true }
    }
}

/// # Scene Configuration
///
/// Top-level settings file, loadable from TOML or RON through [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fallback log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Mesh generation settings
    pub mesh: MeshGeneratorConfig,
    /// Cloning settings
    pub cloning: CloneConfig,
}

impl SceneConfig {
    /// Set the fallback log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the division number for curved primitives
    pub fn with_division_number(mut self, division_number: u32) -> Self {
        self.mesh.division_number = division_number;
        self
    }

    /// Enable or disable normal generation for generated meshes
    pub fn with_normal_generation(mut self, enabled: bool) -> Self {
        self.mesh.normal_generation = enabled;
        self
    }

    /// Enable or disable payload cloning
    pub fn with_non_node_cloning(mut self, enabled: bool) -> Self {
        self.cloning.non_node_cloning = enabled;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mesh.division_number < MIN_DIVISION_NUMBER {
            return Err(ConfigError::Validation(format!(
                "mesh.division_number must be at least {}, got {}",
                MIN_DIVISION_NUMBER, self.mesh.division_number
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Validation("log_level must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mesh: MeshGeneratorConfig::default(),
            cloning: CloneConfig::default(),
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.mesh.division_number, 20);
        assert!(config.mesh.normal_generation);
        assert!(config.cloning.non_node_cloning);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = SceneConfig::default()
            .with_log_level("debug")
            .with_division_number(8)
            .with_normal_generation(false)
            .with_non_node_cloning(false);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.mesh.division_number, 8);
        assert!(!config.mesh.normal_generation);
        assert!(!config.cloning.non_node_cloning);
    }

    #[test]
    fn test_validate_rejects_small_division_number() {
        let config = SceneConfig::default().with_division_number(3);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SceneConfig = toml::from_str("[mesh]\ndivision_number = 12\n").unwrap();
        assert_eq!(config.mesh.division_number, 12);
        assert!(config.mesh.normal_generation);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_ron_parse() {
        let config: SceneConfig = ron::from_str("(log_level: \"warn\", cloning: (non_node_cloning: false))").unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(!config.cloning.non_node_cloning);
        assert_eq!(config.mesh, MeshGeneratorConfig::default());
    }
}
