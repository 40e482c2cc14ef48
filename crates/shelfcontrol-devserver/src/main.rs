//! `shelfcontrol-devserver` command-line entry point.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelfcontrol_devserver::{ConfigSource, DevServer, DevSettings, OverrideSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shelfcontrol-devserver")]
#[command(about = "Development server for the ShelfControl web shell", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Settings file (defaults to ./shelfcontrol-dev.toml when present)
	#[arg(short, long, value_name = "FILE", global = true)]
	config: Option<PathBuf>,

	/// Address to listen on
	#[arg(short, long, value_name = "ADDR", global = true)]
	listen: Option<SocketAddr>,

	/// Directory with the built application
	#[arg(long, value_name = "DIR", global = true)]
	static_root: Option<PathBuf>,

	/// Public path the application is served under
	#[arg(long, value_name = "PATH", global = true)]
	base_url: Option<String>,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Serve the application (default)
	Serve,

	/// Print the client route table
	Routes,
}

impl Cli {
	fn overrides(&self) -> OverrideSource {
		OverrideSource::new()
			.set("listen", self.listen.map(|addr| addr.to_string()))
			.set(
				"static_root",
				self.static_root
					.as_ref()
					.map(|dir| dir.to_string_lossy().into_owned()),
			)
			.set("base_url", self.base_url.clone())
	}
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "info",
		1 => "shelfcontrol_devserver=debug,info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_routes(settings: &DevSettings) -> anyhow::Result<()> {
	let table = shelfcontrol_app::route_table().context("failed to build the route table")?;
	let base = settings.base_path();

	for record in table.records() {
		println!(
			"{:<12} {:<28} props={}",
			record.name(),
			base.join(record.pattern().as_str()),
			record.props()
		);
	}
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let extra: Vec<Box<dyn ConfigSource>> = vec![Box::new(cli.overrides())];
	let settings =
		DevSettings::load(cli.config.as_deref(), extra).context("failed to load settings")?;

	match cli.command.unwrap_or(Commands::Serve) {
		Commands::Routes => print_routes(&settings),
		Commands::Serve => {
			for rule in &settings.proxy {
				tracing::info!(prefix = %rule.prefix, target = settings.target_of(rule), "proxying");
			}
			let server = DevServer::bind(&settings)
				.await
				.context("failed to start the dev server")?;
			server.serve().await?;
			Ok(())
		}
	}
}
