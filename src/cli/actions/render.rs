use crate::cli::commands::output::Options;
use crate::saml::{render, ConfigSnapshot, FallbackPolicy, RemoteIdpMetadata};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub config: ConfigSnapshot,
    pub policy: FallbackPolicy,
    pub output: Options,
}

/// Resolve the metadata and render it in the requested format.
///
/// # Errors
/// Returns an error if the entity id cannot be resolved or the rendered
/// output cannot be serialized.
pub fn build(args: &Args) -> Result<String> {
    let metadata = RemoteIdpMetadata::resolve_with(&args.config, args.policy)
        .context("could not resolve remote IdP metadata")?;

    if metadata.has_no_endpoints() {
        warn!(
            entity_id = metadata.entity_id(),
            "no SSO or SLO bindings configured, metadata has no endpoints"
        );
    }

    render(&metadata, args.output.format).context("could not render metadata")
}

/// Execute the render action.
/// # Errors
/// Returns an error if resolution fails or the output cannot be written.
pub fn execute(args: &Args) -> Result<()> {
    debug!(policy = args.policy.name(), format = ?args.output.format, "render");

    let rendered = build(args)?;

    match &args.output.path {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .with_context(|| format!("Failed to write metadata to {}", path.display()))?;
            info!(path = %path.display(), "metadata written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write metadata to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::saml::{keys, Format};
    use std::path::PathBuf;

    fn args(config: ConfigSnapshot, format: Format, path: Option<PathBuf>) -> Args {
        Args {
            config,
            policy: FallbackPolicy::Uniform,
            output: Options { format, path },
        }
    }

    #[test]
    fn test_build_missing_entity_id() {
        let err = build(&args(ConfigSnapshot::default(), Format::Json, None)).unwrap_err();
        assert!(format!("{err:#}").contains("missing IdP entity id"));
    }

    #[test]
    fn test_execute_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "idp-metadata-{}-saml20-idp-remote.php",
            std::process::id()
        ));
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, "https://idp.example/saml")
            .with(keys::DEFAULT_BINDING, "/idp");

        execute(&args(config, Format::Php, Some(path.clone()))).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(written.starts_with("<?php"));
        assert!(written.contains("'Location' => 'https://idp.example/saml/idp',"));
        assert!(written.contains("'index' => 0,"));
    }

    #[test]
    fn test_execute_unwritable_path() {
        let config = ConfigSnapshot::default().with(keys::BASE_URL, "https://idp.example/saml");
        let path = PathBuf::from("/nonexistent-dir/idp-metadata/out.json");

        let err = execute(&args(config, Format::Json, Some(path))).unwrap_err();
        assert!(err.to_string().contains("Failed to write metadata"));
    }
}
