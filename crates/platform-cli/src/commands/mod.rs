//! CLI commands

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod schema;
pub mod types;
pub mod validate;

use std::path::Path;

use platform_client::{PlatformClient, ProviderMeta};
use platform_core::{Schema, Value};
use platform_resources::{HostResource, Provider};
use tracing::{debug, warn};

use crate::GlobalArgs;
use crate::error::{CliError, Result};

/// Base URL used when commands that never call the platform run without `--url`
const OFFLINE_URL: &str = "http://localhost:8082/";

/// Build the provider from the global flags
///
/// Versions not given on the command line are discovered from the platform
/// when `discover` is set and a URL is configured.
pub async fn provider(args: &GlobalArgs, discover: bool) -> Result<Provider> {
    let url = args.url.as_deref();
    let client = match (url, args.token.as_deref()) {
        (Some(url), Some(token)) => PlatformClient::with_bearer_token(url, token),
        (Some(url), None) => PlatformClient::new(url),
        (None, _) => PlatformClient::new(OFFLINE_URL),
    }
    .map_err(CliError::provider)?;

    let mut access = args.access_version.clone();
    let mut platform = args.platform_version.clone();

    if discover && url.is_some() && (access.is_none() || platform.is_none()) {
        match client.fetch_versions().await {
            Ok(versions) => {
                debug!(platform = %versions.platform, access = %versions.access, "discovered versions");
                access.get_or_insert(versions.access);
                platform.get_or_insert(versions.platform);
            }
            Err(e) => warn!(error = %e, "could not discover platform versions"),
        }
    }

    let meta = ProviderMeta::new(client)
        .with_access_version(access.unwrap_or_default())
        .with_platform_version(platform.unwrap_or_default());
    Ok(Provider::new(meta))
}

/// Require a URL for commands that talk to the platform
pub fn require_url(args: &GlobalArgs) -> Result<()> {
    if args.url.is_none() {
        return Err(CliError::usage(
            "no platform URL configured",
            "pass --url or set PLATFORM_URL",
        ));
    }
    Ok(())
}

pub fn resource<'p>(provider: &'p Provider, resource_type: &str) -> Result<&'p dyn HostResource> {
    Ok(provider.resource(resource_type)?)
}

/// Read a JSON object and shape it by the schema
pub fn load_value(path: &Path, schema: &Schema) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| CliError::input(path, e.to_string()))?;
    if !json.is_object() {
        return Err(CliError::input(path, "expected a JSON object"));
    }
    Value::from_json(&json, &schema.object_type()).map_err(|e| CliError::input(path, e.to_string()))
}

/// Prior state, if the state file exists
pub fn load_state(path: Option<&Path>, schema: &Schema) -> Result<Option<Value>> {
    match path {
        Some(path) if path.exists() => load_value(path, schema).map(Some),
        _ => Ok(None),
    }
}

/// Write state to `path`, or print it when no path is given
pub fn save_state(path: Option<&Path>, state: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&state.to_json())
        .map_err(|e| CliError::input(path.unwrap_or(Path::new("-")), e.to_string()))?;

    match path {
        Some(path) => {
            std::fs::write(path, rendered + "\n").map_err(|e| CliError::io(path, e))?;
            debug!(path = %path.display(), "state written");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

pub fn remove_state(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CliError::io(path, e)),
    }
}
