//! Command: list the tool registry for a platform.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ListOpts};
use crate::logging::Log;
use crate::platform::Host;
use crate::registry::{Stage, catalog};

/// Print every tool that applies to the target platform, grouped by stage.
///
/// # Errors
///
/// Returns an error if no platform is given and detection fails.
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &dyn Log) -> Result<()> {
    let host = match opts.target {
        Some(platform) => Host::new(platform, None)?,
        None => CommandSetup::init(global, log)?.host,
    };

    for stage in Stage::ALL {
        let lines = stage_lines(&host, stage);
        if lines.is_empty() {
            continue;
        }
        log.stage(&stage.to_string());
        for line in lines {
            log.info(&line);
        }
    }
    Ok(())
}

/// One line per applicable tool of `stage`: name and install steps.
#[must_use]
pub fn stage_lines(host: &Host, stage: Stage) -> Vec<String> {
    catalog::by_stage(stage)
        .into_iter()
        .filter(|tool| tool.applies_to(host.platform))
        .map(|tool| {
            let steps = tool.recipe_for(host).map_or_else(
                || "unsupported".to_string(),
                |recipe| {
                    recipe
                        .steps
                        .iter()
                        .map(crate::registry::Step::describe)
                        .collect::<Vec<_>>()
                        .join("; ")
                },
            );
            format!("{:<22} {steps}", tool.name)
        })
        .collect()
}
