//! Validate command - check a configuration without calling the platform

use console::style;
use std::path::Path;

use crate::GlobalArgs;
use crate::display::print_diagnostics;
use crate::error::{CliError, Result};

pub async fn run(args: &GlobalArgs, resource_type: &str, config_path: &Path) -> Result<()> {
    let provider = super::provider(args, true).await?;
    let resource = super::resource(&provider, resource_type)?;
    let config = super::load_value(config_path, &resource.schema())?;

    let diags = resource.validate(&config);
    let errors = diags.errors().count();

    if args.json {
        println!(
            "{:#}",
            serde_json::json!({
                "valid": errors == 0,
                "type": resource_type,
                "diagnostics": diags,
            })
        );
    } else {
        println!(
            "{} Validating {} against {}",
            style("→").blue(),
            config_path.display(),
            style(resource_type).bold()
        );
        print_diagnostics(&diags);
        if errors == 0 {
            println!("{} Configuration is valid", style("✓").green().bold());
        }
    }

    if errors > 0 {
        return Err(CliError::validation_with_help(
            format!("{} error(s) in {}", errors, config_path.display()),
            "fix the attributes listed above and run validate again",
        ));
    }
    Ok(())
}
