use clap::{Parser, Subcommand};

pub mod apply;
pub mod rules;

#[derive(Debug, Parser)]
#[command(name = "extractpatch", version)]
#[command(about = "Tag extractGoldPrice returns with the heuristic that produced them")]
#[command(
    long_about = "Rewrites extractGoldPrice in market.ts so every return yields { price, method } instead of a bare price. Each rewrite rule reports how often it matched."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Run the rewrite rules against the target file")]
    Apply(apply::ApplyArgs),
    #[command(about = "List the built-in rewrite rules in application order")]
    Rules(rules::RulesArgs),
}
