//! `multipage check`: show what a build would do without running it.

use multipage_config::ConfigContext;
use multipage_core::{plan, PageConfigSource, StrategyConfigBuilder};

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs, global: &GlobalArgs) -> Result<()> {
    let root = utils::project_root(global.cwd.as_deref())?;
    let loaded = utils::load_options(&root, args.config.as_deref(), &ConfigContext::cli_build())?;
    let options = &loaded.options;
    let source = PageConfigSource::from(options.page_configs.clone());

    let plan = plan(&root, options, &source)?;
    let builder = StrategyConfigBuilder::new(&root, options, &source);

    let mut missing = 0;
    for (strategy, pages) in &plan.groups {
        let strategy_config = builder.strategy_config(strategy)?;
        println!("{strategy}");
        for page in plan.group(strategy) {
            let page_config = builder.page_config(page, strategy);
            let template = builder.resolve_template(page.name(), page_config.as_ref(), strategy_config);
            let shown = template
                .path
                .strip_prefix(&root)
                .unwrap_or(&template.path)
                .display()
                .to_string();
            println!("  {:<20} {:<32} {}", page.name(), page.entry.file, shown);
            if !template.path.is_file() {
                missing += 1;
                ui::warning(&format!("Template for '{}' not found: {shown}", page.name()));
            }
        }
        tracing::debug!(strategy = %strategy, count = pages.len(), "checked strategy group");
    }

    if missing == 0 {
        ui::success(&format!(
            "{} page(s) in {} strategy group(s)",
            plan.pages.len(),
            plan.groups.len()
        ));
    }
    Ok(())
}
