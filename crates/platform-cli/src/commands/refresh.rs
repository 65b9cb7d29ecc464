//! Refresh command - re-read a resource into its state file

use console::style;
use std::path::Path;

use crate::GlobalArgs;
use crate::display::print_state;
use crate::error::Result;

pub async fn run(args: &GlobalArgs, resource_type: &str, state_path: &Path) -> Result<()> {
    super::require_url(args)?;
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;
    let prior = super::load_value(state_path, &resource.schema())?;

    let fresh = resource.read(&prior).await?;
    match &fresh {
        Some(state) => super::save_state(Some(state_path), state)?,
        None => super::remove_state(state_path)?,
    }

    if args.json {
        println!(
            "{:#}",
            serde_json::json!({
                "type": resource_type,
                "exists": fresh.is_some(),
                "state": fresh.as_ref().map(|v| v.to_json()),
            })
        );
        return Ok(());
    }

    match fresh {
        Some(state) => {
            println!("{} Refreshed {}", style("✓").green().bold(), state_path.display());
            print_state(resource_type, &state);
        }
        None => println!(
            "{} {} no longer exists; removed {}",
            style("⚠").yellow(),
            style(resource_type).bold(),
            state_path.display()
        ),
    }
    Ok(())
}
