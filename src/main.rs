use anyhow::Context;
use plugin_loader::native::{ContractAdapters, NativeLibraries};
use plugin_loader::{AppConfig, Descriptor, PluginInfo, PluginLoader, TypeRegistry};
use plugin_loader_api::PluginObjectBox;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logger(level: LevelFilter) {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.compact()
				.with_ansi(true)
				.with_file(false)
				.with_line_number(false)
				.with_target(false)
				.with_writer(std::io::stderr),
		)
		.with(
			EnvFilter::builder()
				.with_default_directive(level.into())
				.from_env_lossy(),
		)
		.init();
}

/// Outcome of loading one configured plug-in, printed as JSON.
#[derive(Debug, Serialize)]
struct LoadReport {
	plugin: String,
	implementation: String,
	loaded: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	type_name: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	contracts: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = AppConfig::new()?;
	init_logger(config.logging.level_filter());

	match run(&config) {
		Ok(true) => Ok(()),
		Ok(false) => std::process::exit(1),
		Err(error) => {
			error!("Failed to load plug-ins due to error: {error:#}");
			std::process::exit(2);
		}
	}
}

/// Loads every configured plug-in. Returns whether all of them loaded.
fn run(config: &AppConfig) -> anyhow::Result<bool> {
	let libraries = NativeLibraries::from_config(&config.libraries, ContractAdapters::new())
		.context("Failed to collect component libraries")?;
	let loader = PluginLoader::new(Arc::new(TypeRegistry::new()), Arc::new(libraries))
		.with_options(config.loader);

	info!(
		plugins = config.plugins.len(),
		libraries = config.libraries.len(),
		"Loading configured plug-ins"
	);

	let reports: Vec<LoadReport> = config
		.plugins
		.iter()
		.map(|plugin| load(&loader, plugin))
		.collect();
	let success = reports.iter().all(|report| report.loaded);

	serde_json::to_writer_pretty(std::io::stdout().lock(), &reports)
		.context("Failed to write load reports")?;
	println!();

	Ok(success)
}

fn load(loader: &PluginLoader, plugin: &PluginInfo) -> LoadReport {
	let mut report = LoadReport {
		plugin: plugin.name().to_owned(),
		implementation: plugin.implementation().to_owned(),
		loaded: false,
		type_name: None,
		contracts: Vec::new(),
		error: None,
	};

	match loader.load::<PluginObjectBox, _>(plugin) {
		Ok(object) => {
			let contracts: Vec<String> = object
				.contracts()
				.into_iter()
				.map(|contract| contract.into_string())
				.collect();
			let declared = plugin.contract();
			if !declared.is_empty() && !contracts.iter().any(|contract| contract == declared) {
				warn!(
					plugin = %plugin.name(),
					contract = %declared,
					"Plug-in does not advertise its declared contract"
				);
			}
			report.loaded = true;
			report.type_name = Some(object.type_name().into_string());
			report.contracts = contracts;
		}
		Err(failure) => {
			error!("{failure}");
			report.error = Some(failure.to_string());
		}
	}
	report
}
