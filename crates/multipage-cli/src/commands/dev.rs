//! `multipage dev`.

use multipage_config::ConfigContext;
use multipage_core::{DevRouter, PageConfigSource};

use crate::cli::{DevArgs, GlobalArgs};
use crate::commands::utils;
use crate::dev::{DevConfig, DevServer};
use crate::error::Result;
use crate::ui;

/// Serve every page from its template until Ctrl-C.
pub async fn execute(args: DevArgs, global: &GlobalArgs) -> Result<()> {
    let root = utils::project_root(global.cwd.as_deref())?;
    let loaded = utils::load_options(&root, args.config.as_deref(), &ConfigContext::cli_serve())?;
    let source = PageConfigSource::from(loaded.options.page_configs.clone());

    let router = DevRouter::new(&root, &loaded.options, &source, &args.strategy)?;
    let config = DevConfig::from_args(&args, root)?;
    let url = config.server_url();

    if router.pages().next().is_none() {
        ui::warning("No pages found; only static files will be served");
    }
    if !global.quiet {
        for page in router.pages() {
            ui::info(&format!("  {url}/{}  ({}, {})", page.name(), page.strategy, page.entry.file));
        }
    }

    let open = config.open;
    let server = DevServer::new(config, router);
    if open {
        utils::open_browser(&url);
    }
    server.start().await
}
