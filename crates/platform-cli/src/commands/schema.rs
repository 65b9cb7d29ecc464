//! Schema command - print a resource schema as JSON

use crate::GlobalArgs;
use crate::error::Result;

pub async fn run(args: &GlobalArgs, resource_type: &str) -> Result<()> {
    let provider = super::provider(args, false).await?;
    let resource = super::resource(&provider, resource_type)?;

    println!("{:#}", resource.schema().to_json());
    Ok(())
}
