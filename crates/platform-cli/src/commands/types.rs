//! Types command - list resource types

use console::style;

use crate::GlobalArgs;
use crate::error::Result;

pub async fn run(args: &GlobalArgs) -> Result<()> {
    let provider = super::provider(args, false).await?;
    let names: Vec<&str> = provider.type_names().collect();

    if args.json {
        println!("{:#}", serde_json::json!(names));
        return Ok(());
    }

    for name in names {
        println!("{} {}", style("•").blue(), name);
    }
    Ok(())
}
