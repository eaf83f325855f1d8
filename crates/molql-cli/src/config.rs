use crate::cli::QueryOptions;
use crate::error::{CliError, Result};
use molql::engine::config::QueryConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialQueryConfig {
    max_nesting_depth: Option<usize>,
    query_range_cutoff: Option<usize>,
    script_range_cutoff: Option<usize>,
    remap_interval_cutoff: Option<usize>,
}

/// Contents of a CLI configuration file. Every key is optional; unset keys
/// fall back to the engine defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    query: Option<PartialQueryConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named in `options` (if any) and applies the command
    /// line overrides on top.
    pub fn load(options: &QueryOptions) -> Result<QueryConfig> {
        let partial = match &options.config {
            Some(path) => {
                debug!("Reading configuration from {:?}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        partial.merge_with_cli(options)
    }

    pub fn merge_with_cli(mut self, options: &QueryOptions) -> Result<QueryConfig> {
        self.apply_set_values(&options.set_values)?;
        let query = self.query.take().unwrap_or_default();

        let mut builder = QueryConfig::builder();
        if let Some(depth) = options.max_depth.or(query.max_nesting_depth) {
            builder = builder.max_nesting_depth(depth);
        }
        if let Some(cutoff) = query.query_range_cutoff {
            builder = builder.query_range_cutoff(cutoff);
        }
        if let Some(cutoff) = query.script_range_cutoff {
            builder = builder.script_range_cutoff(cutoff);
        }
        if let Some(cutoff) = query.remap_interval_cutoff {
            builder = builder.remap_interval_cutoff(cutoff);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        debug!("Final query configuration: {:?}", config);
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let value: usize = value_str.trim().parse().map_err(|_| {
                CliError::Config(format!("Invalid integer value for {}: {}", key, value_str))
            })?;

            let query = self.query.get_or_insert_with(Default::default);
            match key.trim() {
                "query.max-nesting-depth" => query.max_nesting_depth = Some(value),
                "query.query-range-cutoff" => query.query_range_cutoff = Some(value),
                "query.script-range-cutoff" => query.script_range_cutoff = Some(value),
                "query.remap-interval-cutoff" => query.remap_interval_cutoff = Some(value),
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molql::engine::config::{DEFAULT_MAX_NESTING_DEPTH, DEFAULT_SCRIPT_RANGE_CUTOFF};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("molql.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn options_for(path: Option<PathBuf>) -> QueryOptions {
        QueryOptions {
            config: path,
            ..Default::default()
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn no_file_gives_engine_defaults() {
            let config = PartialConfig::load(&QueryOptions::default()).unwrap();
            assert_eq!(config, QueryConfig::default());
        }

        #[test]
        fn file_values_override_defaults() {
            let dir = tempdir().unwrap();
            let path = write_config_file(
                &dir,
                "[query]\nmax-nesting-depth = 32\nscript-range-cutoff = 4\n",
            );
            let config = PartialConfig::load(&options_for(Some(path))).unwrap();
            assert_eq!(config.max_nesting_depth, 32);
            assert_eq!(config.script_range_cutoff, 4);
            assert_eq!(
                config.query_range_cutoff,
                QueryConfig::default().query_range_cutoff
            );
        }

        #[test]
        fn unknown_keys_are_rejected() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "[query]\nmax-depth = 3\n");
            let result = PartialConfig::load(&options_for(Some(path)));
            assert!(matches!(result, Err(CliError::FileParsing { .. })));
        }

        #[test]
        fn unknown_tables_are_rejected() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "[forcefield]\ns-factor = 1.0\n");
            let result = PartialConfig::load(&options_for(Some(path)));
            assert!(matches!(result, Err(CliError::FileParsing { .. })));
        }

        #[test]
        fn missing_file_is_an_io_error() {
            let dir = tempdir().unwrap();
            let options = options_for(Some(dir.path().join("absent.toml")));
            assert!(matches!(PartialConfig::load(&options), Err(CliError::Io(_))));
        }
    }

    mod overrides {
        use super::*;

        #[test]
        fn max_depth_flag_beats_the_file() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "[query]\nmax-nesting-depth = 32\n");
            let options = QueryOptions {
                config: Some(path),
                max_depth: Some(8),
                set_values: Vec::new(),
            };
            assert_eq!(PartialConfig::load(&options).unwrap().max_nesting_depth, 8);
        }

        #[test]
        fn set_values_apply_over_the_file() {
            let dir = tempdir().unwrap();
            let path = write_config_file(&dir, "[query]\nscript-range-cutoff = 4\n");
            let options = QueryOptions {
                config: Some(path),
                max_depth: None,
                set_values: vec!["query.script-range-cutoff=20".to_string()],
            };
            let config = PartialConfig::load(&options).unwrap();
            assert_eq!(config.script_range_cutoff, 20);
            assert_eq!(config.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        }

        #[test]
        fn malformed_set_values_are_rejected() {
            for bad in ["query.script-range-cutoff", "query.script-range-cutoff=x", "query.nope=1"] {
                let options = QueryOptions {
                    set_values: vec![bad.to_string()],
                    ..Default::default()
                };
                assert!(
                    matches!(PartialConfig::load(&options), Err(CliError::Config(_))),
                    "{bad} should be rejected"
                );
            }
        }

        #[test]
        fn invalid_values_fail_validation() {
            let options = QueryOptions {
                max_depth: Some(0),
                ..Default::default()
            };
            assert!(matches!(PartialConfig::load(&options), Err(CliError::Config(_))));
        }

        #[test]
        fn untouched_keys_keep_their_defaults() {
            let options = QueryOptions {
                set_values: vec!["query.max-nesting-depth=10".to_string()],
                ..Default::default()
            };
            let config = PartialConfig::load(&options).unwrap();
            assert_eq!(config.max_nesting_depth, 10);
            assert_eq!(config.script_range_cutoff, DEFAULT_SCRIPT_RANGE_CUTOFF);
        }
    }
}
