//! `hooksync sync` command.

use crate::cli::SyncArgs;
use crate::context::ServiceContext;
use crate::hooks::{HookConfig, Policy};
use crate::sync::manifest::ManifestGenerator;
use crate::sync::{self, SyncRequest};

/// Builds the sync request described by `args`.
#[must_use]
pub fn request_from(args: &SyncArgs) -> SyncRequest {
    let mut request = SyncRequest::new(args.policy);
    if let Some(message) = &args.message {
        request.commit_message.clone_from(message);
    }
    request.hooks = args.config.clone().map(HookConfig::Path);
    request
}

/// Execute the `sync` command with the given service context.
///
/// # Errors
///
/// Returns an error string if the manifest cannot be loaded, the sync fails,
/// or the policy is `fail` and the files drifted.
pub fn run_with_context(ctx: &ServiceContext, args: &SyncArgs) -> Result<(), String> {
    let request = request_from(args);
    let result = if request.policy == Policy::None {
        // No manifest is needed when nothing will be compared.
        let generator = ManifestGenerator::new(ctx.fs.as_ref(), &ctx.root, sync::manifest::Manifest::default());
        sync::sync_dynamic_files(ctx, &generator, &request)
    } else {
        let path = args.manifest.clone().unwrap_or_else(|| ctx.settings.dynamic_manifest.clone());
        let generator =
            ManifestGenerator::load(ctx.fs.as_ref(), &ctx.root, &path).map_err(|e| e.to_string())?;
        sync::sync_dynamic_files(ctx, &generator, &request)
    }
    .map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| format!("Failed to serialize result: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", sync::format_sync(&result));
    }

    if args.policy == Policy::Fail && !result.passed() {
        return Err("Dynamic files are out of date".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cassette::config::CassetteConfig;
    use crate::settings::Settings;
    use crate::sync::DEFAULT_MESSAGE;

    fn args(policy: Policy) -> SyncArgs {
        SyncArgs { policy, message: None, manifest: None, config: None, json: false }
    }

    #[test]
    fn request_uses_default_message_and_optional_hooks() {
        let request = request_from(&args(Policy::Commit));
        assert_eq!(request.commit_message, DEFAULT_MESSAGE);
        assert!(request.hooks.is_none());

        let mut with_hooks = args(Policy::Amend);
        with_hooks.config = Some(PathBuf::from(".pre-commit-config.yaml"));
        with_hooks.message = Some("chore: regenerate".into());
        let request = request_from(&with_hooks);
        assert_eq!(request.commit_message, "chore: regenerate");
        assert_eq!(request.hooks, Some(HookConfig::Path(PathBuf::from(".pre-commit-config.yaml"))));
    }

    #[test]
    fn none_policy_reads_no_manifest() {
        let ctx = ServiceContext::replaying_from(
            "/work",
            Settings::default(),
            &CassetteConfig::panic_on_unspecified(),
        )
        .unwrap();
        assert!(run_with_context(&ctx, &args(Policy::None)).is_ok());
    }

    #[test]
    fn fail_with_drift_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dynamic.yaml"), "files:\n  VERSION: \"2\\n\"\n").unwrap();
        let ctx = ServiceContext::live(dir.path(), Settings::default());
        let mut args = args(Policy::Fail);
        args.manifest = Some(PathBuf::from("dynamic.yaml"));

        let err = run_with_context(&ctx, &args).unwrap_err();
        assert_eq!(err, "Dynamic files are out of date");
        assert!(!dir.path().join("VERSION").exists());
    }
}
