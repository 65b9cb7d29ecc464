//! Destroy command - delete a resource and its state file

use console::style;
use std::path::Path;

use crate::GlobalArgs;
use crate::display::print_diagnostics;
use crate::error::Result;

pub async fn run(args: &GlobalArgs, resource_type: &str, state_path: &Path) -> Result<()> {
    super::require_url(args)?;
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;
    let prior = super::load_value(state_path, &resource.schema())?;

    let plan = resource.plan(Some(&prior), None)?;
    let applied = resource.apply(&plan.change).await?;
    super::remove_state(state_path)?;

    if args.json {
        println!(
            "{:#}",
            serde_json::json!({
                "type": resource_type,
                "destroyed": true,
                "diagnostics": applied.diagnostics,
            })
        );
        return Ok(());
    }

    println!(
        "{} {} destroyed; removed {}",
        style("✓").green().bold(),
        style(resource_type).bold(),
        state_path.display()
    );
    print_diagnostics(&applied.diagnostics);
    Ok(())
}
