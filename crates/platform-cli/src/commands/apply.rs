//! Apply command - create, update or replace a resource

use console::style;
use std::path::Path;

use crate::GlobalArgs;
use crate::display::{action_style, print_diagnostics, print_state};
use crate::error::Result;

pub async fn run(
    args: &GlobalArgs,
    resource_type: &str,
    config_path: &Path,
    state_path: Option<&Path>,
) -> Result<()> {
    super::require_url(args)?;
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;
    let schema = resource.schema();

    let config = super::load_value(config_path, &schema)?;
    let prior = super::load_state(state_path, &schema)?;
    let plan = resource.plan(prior.as_ref(), Some(&config))?;
    let action = plan.change.action();

    let applied = resource.apply(&plan.change).await?;
    let mut diagnostics = plan.diagnostics;
    diagnostics.extend(applied.diagnostics);

    match (&applied.state, state_path) {
        (Some(state), _) => super::save_state(state_path, state)?,
        (None, Some(path)) => super::remove_state(path)?,
        (None, None) => {}
    }

    // Without a state file, stdout carries only the state document
    if state_path.is_none() {
        return Ok(());
    }

    if args.json {
        println!(
            "{:#}",
            serde_json::json!({
                "type": resource_type,
                "action": action.as_str(),
                "state": applied.state.as_ref().map(|v| v.to_json()),
                "diagnostics": diagnostics,
            })
        );
        return Ok(());
    }

    println!(
        "{} {} {}",
        style("✓").green().bold(),
        style(resource_type).bold(),
        action_style(action)
    );
    if let Some(state) = &applied.state {
        print_state(resource_type, state);
    }
    print_diagnostics(&diagnostics);
    Ok(())
}
