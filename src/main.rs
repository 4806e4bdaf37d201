mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod form;
mod logging;
mod order_draft;
mod query;
mod session;
#[cfg(test)]
mod test_support;
mod ui;

use clap::Parser;
use color_eyre::config::HookBuilder;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "crmtui")]
#[command(about = "A terminal CRM for clients, products and orders")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/crmtui/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// GraphQL endpoint, overriding the config file
  #[arg(short, long)]
  url: Option<String>,

  /// Keep the session in memory only; nothing is written to disk
  #[arg(long)]
  ephemeral: bool,
}

/// Restore the terminal before the panic report is printed, or it is lost
/// in the alternate screen
fn install_hooks() -> Result<()> {
  let (panic_hook, eyre_hook) = HookBuilder::default().into_hooks();
  eyre_hook.install()?;

  let panic_hook = panic_hook.into_panic_hook();
  std::panic::set_hook(Box::new(move |info| {
    let _ = app::restore_terminal();
    panic_hook(info);
  }));
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  install_hooks()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.url {
    config.api.url = url;
  }

  let log_dir = logging::default_log_dir().unwrap_or_else(|| std::env::temp_dir().join("crmtui"));
  let _log_guard = logging::init(&log_dir)?;
  info!(endpoint = %config.api.url, ephemeral = args.ephemeral, "starting crmtui");

  let storage = if args.ephemeral {
    session::LocalStorage::open_in_memory()?
  } else {
    session::LocalStorage::open()?
  };
  let session = session::Session::new(storage, config::Config::token_override());
  let crm = api::CachedCrmClient::new(&config, session)?;

  let mut events = event::EventHandler::new(config.tick_rate());
  let ctx = ui::view::ViewContext {
    crm,
    notifier: events.notifier(),
  };

  let mut app = app::App::new(&config, ctx);
  app.run(&mut events).await?;

  info!("exiting");
  Ok(())
}
