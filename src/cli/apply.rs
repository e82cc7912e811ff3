use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::ExtractPatchError;
use crate::rewrite::{StepReport, compile_rules, rewrite_text};
use crate::rules::{DEFAULT_TARGET, gold_price_rules};
use crate::target::{Access, LockedTarget, content_hash};

pub const FUNCTION_UPDATED_MESSAGE: &str = "✅ Updated extractGoldPrice function";
pub const ALL_UPDATED_MESSAGE: &str = "✅ All extraction functions updated with debug support";

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[arg(long, help = "Run the rules and report without writing the file")]
    pub dry_run: bool,
    #[arg(
        long,
        help = "Fail without writing if any rule matched nothing"
    )]
    pub strict: bool,
    #[arg(long, help = "Print a JSON report instead of the status lines")]
    pub json: bool,
    #[arg(
        value_name = "FILE",
        env = "EXTRACTPATCH_FILE",
        default_value = DEFAULT_TARGET,
        help = "File holding extractGoldPrice"
    )]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub file: String,
    pub dry_run: bool,
    pub written: bool,
    pub source_hash: String,
    pub output_hash: String,
    pub steps: Vec<StepReport>,
    pub summary: ApplySummary,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ApplySummary {
    pub rules_total: usize,
    pub rules_matched: usize,
    pub rules_unmatched: usize,
}

pub enum ApplyCommandOutput {
    Text(String),
    Json(ApplyResponse),
}

/// Run the rewrite. In text mode the first status line goes to `emit` once
/// the rules have run and before the file is written, so a failed write is
/// visible after it.
pub fn run_apply<E>(args: ApplyArgs, mut emit: E) -> Result<ApplyCommandOutput, ExtractPatchError>
where
    E: FnMut(&str),
{
    let json = args.json;
    let response = apply_to_file(args, || {
        if !json {
            emit(FUNCTION_UPDATED_MESSAGE);
        }
    })?;
    if json {
        return Ok(ApplyCommandOutput::Json(response));
    }
    Ok(ApplyCommandOutput::Text(ALL_UPDATED_MESSAGE.to_string()))
}

fn apply_to_file<F>(args: ApplyArgs, before_write: F) -> Result<ApplyResponse, ExtractPatchError>
where
    F: FnOnce(),
{
    let rules = compile_rules(gold_price_rules())?;
    let access = if args.dry_run {
        Access::ReadOnly
    } else {
        Access::ReadWrite
    };
    let (target, source) = LockedTarget::open(&args.file, access)?;

    let outcome = rewrite_text(&source, &rules);
    let unmatched = outcome.unmatched();
    if args.strict && !unmatched.is_empty() {
        return Err(ExtractPatchError::UnmatchedRules {
            path: target.path().display().to_string(),
            rules: unmatched.iter().map(|rule| rule.to_string()).collect(),
        });
    }

    before_write();
    let written = outcome.changed() && !args.dry_run;
    if written {
        target.write(&outcome.text)?;
    }
    tracing::info!(
        path = %target.path().display(),
        written,
        dry_run = args.dry_run,
        unmatched = unmatched.len(),
        "rewrite finished"
    );

    let rules_total = outcome.steps.len();
    let rules_unmatched = unmatched.len();
    Ok(ApplyResponse {
        file: target.path().display().to_string(),
        dry_run: args.dry_run,
        written,
        source_hash: target.source_hash().to_string(),
        output_hash: content_hash(outcome.text.as_bytes()),
        summary: ApplySummary {
            rules_total,
            rules_matched: rules_total - rules_unmatched,
            rules_unmatched,
        },
        steps: outcome.steps,
    })
}
