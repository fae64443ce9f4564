//! Optional tool detection.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Report which optional tools (e.g. `mise`) are on `PATH`.
///
/// A missing tool only marks the task skipped; linking proceeds regardless.
#[derive(Debug)]
pub struct ProbeTools;

impl Task for ProbeTools {
    fn name(&self) -> &str {
        "Probe optional tools"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.optional_tools.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut missing = Vec::new();

        for tool in &ctx.config.optional_tools {
            if !ctx.executor.which(tool) {
                ctx.log.debug(&format!("{tool}: not found on PATH"));
                missing.push(tool.as_str());
                continue;
            }

            match ctx.executor.run_unchecked(tool, &["--version"]) {
                Ok(result) if result.success => {
                    let version = result.first_line().unwrap_or("unknown version");
                    ctx.log.info(&format!("{tool}: {version}"));
                }
                Ok(result) => ctx.log.warn(&format!(
                    "{tool} --version exited with {}",
                    result.code.map_or_else(|| "signal".to_string(), |c| c.to_string())
                )),
                Err(e) => ctx.log.warn(&format!("{tool}: {e:#}")),
            }
        }

        if missing.is_empty() {
            Ok(TaskResult::Ok)
        } else {
            Ok(TaskResult::Skipped(format!(
                "not found: {}",
                missing.join(", ")
            )))
        }
    }
}
