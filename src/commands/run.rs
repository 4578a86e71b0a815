//! `hooksync run` command.

use crate::cli::RunArgs;
use crate::context::ServiceContext;
use crate::hooks::{self, report, HookConfig, Policy, ReconciliationRequest, Reconciliation, Scope};

/// Builds the reconciliation request described by `args`.
#[must_use]
pub fn request_from(ctx: &ServiceContext, args: &RunArgs) -> ReconciliationRequest {
    let config = args.config.clone().unwrap_or_else(|| ctx.settings.hook_config.clone());
    let mut request = ReconciliationRequest::new(args.policy, HookConfig::Path(config));
    if let Some(message) = &args.message {
        request = request.with_message(message.clone());
    }
    if let (Some(from), Some(to)) = (&args.from_ref, &args.to_ref) {
        request = request.with_scope(Scope::Range { from: from.clone(), to: to.clone() });
    }
    request
}

/// Execute the `run` command with the given service context.
///
/// # Errors
///
/// Returns an error string if the run fails, or if the policy is `fail` and
/// the hooks did not pass.
pub fn run_with_context(ctx: &ServiceContext, args: &RunArgs) -> Result<(), String> {
    let request = request_from(ctx, args);
    let result = hooks::reconcile(ctx, &request).map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| format!("Failed to serialize result: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format_reconciliation(&result));
    }

    if args.policy == Policy::Fail && !result.passed() {
        return Err(format!("Hooks failed: {}", result.outcome.counts));
    }
    Ok(())
}

fn format_reconciliation(result: &Reconciliation) -> String {
    let mut text = report::format_outcome(&result.outcome);
    if let Some(proposal) = &result.proposal {
        text.push_str(&format!(
            "\nProposed {} into {}: {}\n",
            proposal.branch, proposal.base, proposal.change_request.url
        ));
    }
    text
}
