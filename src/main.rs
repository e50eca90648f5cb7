// Resolves an instance's profile and prints the effective configuration.
//
//   patchwork                  list instances
//   patchwork <id>             print the resolved profile
//   patchwork <id> --update    also fetch libraries and build the modded jar

use std::process::ExitCode;

use patchwork_lib::core::error::LauncherResult;
use patchwork_lib::core::state::AppState;
use patchwork_lib::core::update::{update_game, UpdateContext};
use patchwork_lib::core::version::RuleContext;

async fn run(args: &[String]) -> LauncherResult<()> {
    let state = AppState::new()?;

    let Some(id) = args.first() else {
        for config in state.instance_manager.list().await? {
            println!("{}\t{}\t{}\t{}", config.id, config.name, config.kind, config.minecraft_version);
        }
        return Ok(());
    };

    let instance = state.instance_manager.open(id).await?;
    let resolved = instance.resolved()?;
    let rules = RuleContext::client();

    if args.iter().any(|a| a == "--update") {
        let libraries_dir = state.paths.libraries_dir();
        let ctx = UpdateContext {
            instance: instance.dirs(),
            libraries_dir: &libraries_dir,
            catalog: state.catalog.as_ref(),
            fetcher: state.downloader.as_ref(),
            rules: rules.clone(),
        };
        let report = update_game(&ctx, &resolved).await?;
        tracing::info!("{:?}", report);
    }

    let mut summary = resolved.summary(&rules);
    summary["patches"] = instance
        .profile()
        .patches()
        .iter()
        .map(|p| serde_json::json!({ "fileId": p.file_id, "name": p.name, "version": p.version, "order": p.order }))
        .collect();
    summary["settings"] = serde_json::to_value(instance.effective_settings(&state.launcher_settings))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    patchwork_lib::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_resolution_failure() => {
            tracing::error!("No valid profile available: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
