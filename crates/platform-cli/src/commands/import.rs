//! Import command - bring an existing resource under management

use console::style;
use std::path::Path;

use crate::GlobalArgs;
use crate::display::print_state;
use crate::error::{CliError, Result};

pub async fn run(
    args: &GlobalArgs,
    resource_type: &str,
    id: &str,
    state_path: Option<&Path>,
) -> Result<()> {
    super::require_url(args)?;
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;

    let Some(state) = resource.import(id).await? else {
        return Err(CliError::usage(
            format!("cannot import {} '{}': it does not exist", resource_type, id),
            "stages are imported as 'name' or 'name:project_key'",
        ));
    };

    super::save_state(state_path, &state)?;

    if let Some(path) = state_path {
        if args.json {
            println!("{:#}", serde_json::json!({"type": resource_type, "state": state.to_json()}));
        } else {
            println!("{} Imported into {}", style("✓").green().bold(), path.display());
            print_state(resource_type, &state);
        }
    }
    Ok(())
}
