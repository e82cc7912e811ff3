use clap::Args;
use serde::Serialize;

use crate::rules::{DEFAULT_TARGET, RewriteRule, gold_price_rules};

#[derive(Debug, Args)]
pub struct RulesArgs {}

#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub default_target: &'static str,
    pub rules: Vec<RewriteRule>,
}

pub fn run_rules(_args: RulesArgs) -> RulesResponse {
    RulesResponse {
        default_target: DEFAULT_TARGET,
        rules: gold_price_rules().to_vec(),
    }
}
