//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Prefix of environment overrides; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "CONSENSUS_";

const PROJECT_FILENAMES: [&str; 2] = ["consensus.toml", ".consensus.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CONSENSUS_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./consensus.toml` or `./.consensus.toml`
    /// 4. Global: `<config dir>/rule-consensus/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        Self::files(global.as_deref(), Self::project_config_path().as_deref(), config_path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Merge the file layers on top of the defaults, lowest priority first.
    fn files(global: Option<&Path>, project: Option<&Path>, explicit: Option<&PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in [global, project, explicit.map(PathBuf::as_path)]
            .into_iter()
            .flatten()
        {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/rule-consensus/config.toml if set,
    /// otherwise falls back to ~/.config/rule-consensus/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rule-consensus").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILENAMES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] {}API__BASE_URL, {}PROJECT__ID, ...", ENV_PREFIX, ENV_PREFIX);

        if let Some(path) = explicit {
            let marker = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", marker, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./consensus.toml or ./.consensus.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileOutputFormat;
    use consensus_domain::{MemberId, ProjectId};
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.api.timeout_seconds, 10);
        assert!(config.project.id.is_none());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("rule-consensus"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("consensus.toml");
        fs::write(
            &global,
            "[api]\nbase_url = \"https://global.example.org\"\ntimeout_seconds = 30\n\n[project]\nmember = 10\n",
        )
        .unwrap();
        fs::write(
            &project,
            "[api]\nbase_url = \"https://project.example.org\"\n\n[project]\nid = 4\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::files(Some(&global), Some(&project), None)
            .extract()
            .unwrap();

        assert_eq!(config.api.base_url, "https://project.example.org");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.project.id, Some(ProjectId::new(4)));
        assert_eq!(config.project.member, Some(MemberId::new(10)));
        assert_eq!(config.output.format, FileOutputFormat::Table);
    }

    #[test]
    fn test_explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("consensus.toml");
        let explicit = dir.path().join("ci.toml");
        fs::write(&project, "[output]\nformat = \"table\"\n").unwrap();
        fs::write(&explicit, "[output]\nformat = \"json\"\ncolor = false\n").unwrap();

        let config: FileConfig = ConfigLoader::files(None, Some(&project), Some(&explicit))
            .extract()
            .unwrap();

        assert_eq!(config.output.format, FileOutputFormat::Json);
        assert!(!config.output.color);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.toml");
        fs::write(&explicit, "[output]\nformat = \"yaml\"\n").unwrap();

        let result: Result<FileConfig, _> =
            ConfigLoader::files(None, None, Some(&explicit)).extract();
        assert!(result.is_err());
    }
}
