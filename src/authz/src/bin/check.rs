//! # Attribute Rules Checker
//!
//! Evaluates a claims document against the constraints declared for an
//! operation and prints the decision.
//!
//! ```text
//! attrs-check <operation-id> <request-path> < claims.json
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ATTRS_RULES` - Path to the JSON rules file (default: rules.json)
//! - `RUST_LOG` - Log level (default: info)
//!
//! ## Exit status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Allowed |
//! | 1 | Rejected |
//! | 2 | No rule applies |
//! | 3 | Misconfigured rules (bad pattern, unresolvable validator, malformed rules file) |
//! | 4 | Any other failure (usage, unreadable rules file, malformed claims) |

use anyhow::{bail, Context};
use secured_attrs::{
    AttributeRuleEvaluator, AttrsError, ClaimsBag, Outcome, PatternCache, RequestContext,
    RuleChain, RulesConfig, SecuredAttributesRule, ValidatorRegistry,
};
use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_RULES_PATH: &str = "rules.json";

/// Process exit code for a completed run
fn exit_code(result: &anyhow::Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Permit) => 0,
        Ok(Outcome::Deny) => 1,
        Ok(Outcome::Defer) => 2,
        Err(e) => match e.downcast_ref::<AttrsError>() {
            Some(cause) if cause.is_configuration_defect() => 3,
            _ => 4,
        },
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run();
    if let Err(e) = &result {
        eprintln!("attrs-check: {:#}", e);
    }
    ExitCode::from(exit_code(&result))
}

fn run() -> anyhow::Result<Outcome> {
    let mut args = std::env::args().skip(1);
    let (Some(operation), Some(path)) = (args.next(), args.next()) else {
        bail!("usage: attrs-check <operation-id> <request-path> < claims.json");
    };

    let rules_path =
        std::env::var("ATTRS_RULES").unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());
    let config = RulesConfig::from_file(&rules_path)
        .with_context(|| format!("failed to load rules from {}", rules_path))?;

    let patterns = PatternCache::shared();
    let validators = Arc::new(ValidatorRegistry::with_defaults());
    if let Err(e) = config.validate(&patterns, &validators) {
        error!(error = %e, "Rules configuration rejected");
        return Err(e).context("invalid rules configuration");
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read claims from stdin")?;
    let claims = if input.trim().is_empty() {
        None
    } else {
        Some(ClaimsBag::from_json_str(&input).context("claims must be a JSON object")?)
    };

    let evaluator = AttributeRuleEvaluator::new(patterns, validators);
    let chain = RuleChain::new().with_rule(SecuredAttributesRule::new(
        config.into_operation_rules(),
        evaluator,
    ));

    let request = RequestContext::new(path).with_operation(operation);
    let decision = chain
        .check(&request, claims.as_ref())
        .context("evaluation aborted by misconfigured rule")?;

    info!(operation = ?request.operation, path = %request.path, %decision, "Evaluated request");
    println!("{}", decision);

    Ok(Outcome::from(decision))
}
