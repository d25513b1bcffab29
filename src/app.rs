use crate::cli::Cli;
use crate::config::Config;
use crate::consts::EXIT_CONFIG;
use crate::runner::{RunPlan, run_update};
use crate::utils::{debug_log, set_debug};

/// Load config, build the plan and run it. Returns the process exit code.
pub(crate) fn run(cli: Cli) -> i32 {
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_CONFIG;
        }
    };

    let cli = cli.with_config(config);
    set_debug(cli.debug);
    let dry_run = cli.dry_run;

    let plan = match cli.into_plan() {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_CONFIG;
        }
    };

    if dry_run {
        return print_plan(&plan);
    }

    match run_update(&plan) {
        Ok(outcome) => {
            if let Some(e) = &outcome.log_error {
                eprintln!("Error: {e}");
            }
            debug_log(format!(
                "Script {} in {:.1}s (exit code {})",
                if outcome.exit.success() { "succeeded" } else { "failed" },
                outcome.elapsed.as_secs_f64(),
                outcome.exit.code()
            ));
            outcome.exit.code()
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// Print the merged plan and the command it would run, as JSON
fn print_plan(plan: &RunPlan) -> i32 {
    let resolved = match plan.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let command = plan.command(&resolved);

    let value = serde_json::json!({
        "plan": plan,
        "workdir": resolved.workspace.root(),
        "log_path": resolved.log_path,
        "script_path": resolved.script_path,
        "command": command.as_ref().ok().map(ToString::to_string),
        "activation_error": command.as_ref().err().map(ToString::to_string),
    });

    match serde_json::to_string_pretty(&value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}
