//! Implementation of the `promptscore rules` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{RuleCatalog, RuleDefinition};

#[derive(Debug, Serialize)]
pub struct RulesOutput {
    pub rules: Vec<RuleDefinition>,
}

impl CommandOutput for RulesOutput {
    fn to_human(&self) -> String {
        let catalog = RuleCatalog::standard();
        TableFormatter::new().format_rules(&catalog)
    }
}

pub fn execute(json_mode: bool) -> Result<()> {
    let rules = RuleCatalog::standard().rules().to_vec();
    output(&RulesOutput { rules }, json_mode);
    Ok(())
}
