use crate::descriptor::PluginInfo;
use crate::loader::LoaderOptions;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	pub logging: LoggingConfig,
	pub loader: LoaderOptions,
	/// Component libraries available to the fallback resolution phase.
	#[serde(default)]
	pub libraries: Vec<LibraryConfig>,
	/// Plug-ins the host loads at startup.
	#[serde(default)]
	pub plugins: Vec<PluginInfo>,
}

impl AppConfig {
	/// Loads the embedded defaults, then `config.toml` from the working directory
	/// (if present), then `PLUGIN_LOADER__*` environment variables.
	pub fn new() -> Result<Self, config::ConfigError> {
		Self::builder()
			.add_source(config::File::with_name("config.toml").required(false))
			.add_source(
				config::Environment::with_prefix("PLUGIN_LOADER")
					.separator("__")
					.try_parsing(true),
			)
			.build()?
			.try_deserialize()
	}

	/// Loads the embedded defaults overridden by a TOML document.
	pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
		Self::builder()
			.add_source(config::File::from_str(toml, config::FileFormat::Toml))
			.build()?
			.try_deserialize()
	}

	fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
		config::Config::builder().add_source(config::File::from_str(
			include_str!("defaults.toml"),
			config::FileFormat::Toml,
		))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
	// Unknown levels fall back to INFO
	pub level: String,
}

impl LoggingConfig {
	pub fn level_filter(&self) -> LevelFilter {
		self.level.parse().unwrap_or(LevelFilter::INFO)
	}
}

/// A component library declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryConfig {
	pub name: String,
	/// Directory scanned for dynamic libraries.
	pub directory: Option<PathBuf>,
	/// Explicit assets, scanned after those found in `directory`.
	#[serde(default)]
	pub assets: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::library::LibraryMatch;

	#[test]
	fn defaults() {
		let config = AppConfig::from_toml("").unwrap();
		assert_eq!(config.logging.level_filter(), LevelFilter::INFO);
		assert_eq!(config.loader, LoaderOptions::default());
		assert!(config.libraries.is_empty());
		assert!(config.plugins.is_empty());
	}

	#[test]
	fn override_defaults() {
		let config = AppConfig::from_toml(
			r#"
			[logging]
			level = "debug"

			[loader]
			fallback = false
			library_match = "exact"

			[[libraries]]
			name = "greetings"
			directory = "plugins/greetings"

			[[libraries]]
			name = "sequences"
			assets = ["lib/libsequences.so"]

			[[plugins]]
			name = "greeter"
			contract = "greetings.Greeter"
			implementation = "Greetings.English, greetings"

			[[plugins]]
			name = "unbound"
			"#,
		)
		.unwrap();

		assert_eq!(config.logging.level_filter(), LevelFilter::DEBUG);
		assert!(!config.loader.fallback);
		assert_eq!(config.loader.library_match, LibraryMatch::Exact);
		assert_eq!(
			config.libraries,
			vec![
				LibraryConfig {
					name: String::from("greetings"),
					directory: Some(PathBuf::from("plugins/greetings")),
					assets: Vec::new(),
				},
				LibraryConfig {
					name: String::from("sequences"),
					directory: None,
					assets: vec![PathBuf::from("lib/libsequences.so")],
				},
			]
		);
		assert_eq!(
			config.plugins,
			vec![
				PluginInfo::new("greeter", "greetings.Greeter", "Greetings.English, greetings"),
				PluginInfo::new("unbound", "", ""),
			]
		);
	}

	#[test]
	fn unknown_level_falls_back_to_info() {
		let logging = LoggingConfig {
			level: String::from("chatty"),
		};
		assert_eq!(logging.level_filter(), LevelFilter::INFO);
	}
}
