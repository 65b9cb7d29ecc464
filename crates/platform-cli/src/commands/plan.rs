//! Plan command - show the change apply would make

use std::path::Path;

use crate::GlobalArgs;
use crate::display::{print_diagnostics, print_plan};
use crate::error::Result;

pub async fn run(
    args: &GlobalArgs,
    resource_type: &str,
    config_path: &Path,
    state_path: Option<&Path>,
) -> Result<()> {
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;
    let schema = resource.schema();

    let config = super::load_value(config_path, &schema)?;
    let prior = super::load_state(state_path, &schema)?;
    let plan = resource.plan(prior.as_ref(), Some(&config))?;

    if args.json {
        let replace: Vec<String> = plan
            .change
            .requires_replace
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{:#}",
            serde_json::json!({
                "type": resource_type,
                "action": plan.change.action().as_str(),
                "requires_replace": replace,
                "planned": plan.change.planned.as_ref().map(|v| v.to_json()),
                "diagnostics": plan.diagnostics,
            })
        );
        return Ok(());
    }

    print_plan(resource_type, &plan.change);
    print_diagnostics(&plan.diagnostics);
    Ok(())
}
