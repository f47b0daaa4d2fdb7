//! CLI subcommand handlers.

use crate::render;
use crate::{Commands, ConfigAction, OutputOptions};
use qpaudio_core::config::workspace_config_path;
use qpaudio_core::simulation::load::RESULTS_REVEAL_DELAY;
use qpaudio_core::simulation::{MODEL_LOAD_STEPS, PhasePlan, UnlearnPhase, total_load_duration};
use qpaudio_core::{DemoSession, EraserConfig, SeedManager, config_exists, init_workspace_config};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let mut seeds = seed.map_or_else(SeedManager::from_entropy, SeedManager::new);
    tracing::info!(seed = seeds.global_seed, "Demo seed selected");

    match command {
        Commands::Config { action } => handle_config(action, workspace, config_path),
        Commands::Speakers => {
            let config = load(workspace, config_path)?;
            handle_speakers(&config, options)
        }
        Commands::Load => {
            let config = load(workspace, config_path)?;
            handle_load(&config, &mut seeds, options).await
        }
        Commands::Predict { speaker } => {
            let config = load(workspace, config_path)?;
            handle_predict(&config, &speaker, &mut seeds, options).await
        }
        Commands::Unlearn { speaker } => {
            let config = load(workspace, config_path)?;
            handle_unlearn(&config, &speaker, &mut seeds, options).await
        }
        Commands::Demo { speaker } => {
            let config = load(workspace, config_path)?;
            let speaker = match speaker {
                Some(s) => s,
                None => {
                    let ids = config.catalog.ids();
                    let mut rng = seeds.rng_for("select");
                    ids.choose(&mut rng)
                        .map(|s| s.to_string())
                        .ok_or_else(|| anyhow::anyhow!("speaker catalog is empty"))?
                }
            };
            handle_unlearn(&config, &speaker, &mut seeds, options).await
        }
    }
}

fn load(workspace: &Path, config_path: Option<&Path>) -> anyhow::Result<EraserConfig> {
    qpaudio_core::load_config(Some(workspace), config_path, None)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn pause(duration: Duration, options: OutputOptions) {
    if options.pace > 0.0 && !options.json {
        tokio::time::sleep(duration.mul_f64(options.pace)).await;
    }
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if init_workspace_config(workspace)? {
                println!(
                    "Created default configuration at: {}",
                    config_path.display()
                );
            } else {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace, config_path)?;
            if config_path.is_none() && !config_exists(Some(workspace)) {
                println!("# No configuration file found; showing defaults.");
            }
            println!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn handle_speakers(config: &EraserConfig, options: OutputOptions) -> anyhow::Result<()> {
    if options.json {
        return print_json(config.catalog.speakers());
    }
    print!("{}", render::speakers_table(&config.catalog));
    Ok(())
}

/// Load the model, printing the progress script in text mode.
async fn load_model(
    session: &mut DemoSession<'_>,
    seeds: &mut SeedManager,
    options: OutputOptions,
) -> anyhow::Result<()> {
    tracing::debug!(
        script_ms = total_load_duration().as_millis() as u64,
        pace = options.pace,
        "Loading model"
    );
    if options.shows_progress() {
        println!("Loading audio model...");
        for step in &MODEL_LOAD_STEPS {
            pause(step.duration(), options).await;
            println!("{}", render::load_step_line(step));
        }
        pause(RESULTS_REVEAL_DELAY, options).await;
        println!();
    }
    let mut rng = seeds.rng_for("load");
    session.load_model(&mut rng);
    Ok(())
}

async fn handle_load(
    config: &EraserConfig,
    seeds: &mut SeedManager,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let mut session = DemoSession::new(config)?;
    load_model(&mut session, seeds, options).await?;
    let Some(model) = session.model() else {
        anyhow::bail!("model session missing after load");
    };
    if options.json {
        return print_json(model);
    }
    print!("{}", render::model_panel(model, &config.catalog));
    Ok(())
}

async fn handle_predict(
    config: &EraserConfig,
    speaker: &str,
    seeds: &mut SeedManager,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let mut session = DemoSession::new(config)?;
    load_model(&mut session, seeds, options).await?;
    let mut rng = seeds.rng_for("predict");
    let prediction = session.predict(speaker, &mut rng)?;

    if options.json {
        return print_json(&serde_json::json!({
            "session": session.model(),
            "prediction": prediction,
        }));
    }
    if options.shows_progress() {
        print_selection(&session, config, speaker);
    }
    println!("Pre-unlearning prediction ({speaker}):");
    print!("{}", render::prediction_panel(&prediction, &config.catalog));
    Ok(())
}

fn print_selection(session: &DemoSession<'_>, config: &EraserConfig, speaker: &str) {
    let Some(model) = session.model() else {
        return;
    };
    if let Some(metrics) = model.metrics.get(speaker) {
        print!(
            "{}",
            render::speaker_stats(&config.catalog, metrics, &model.summary.spectrogram)
        );
        if let Some(s) = config.catalog.get(speaker) {
            println!("  Audio: {}", s.audio_path());
        }
        println!();
    }
}

/// Walk the phase plan, pacing each progress tick.
async fn play_phases(plan: &PhasePlan, options: OutputOptions) {
    for phase in UnlearnPhase::ALL {
        println!("{}", render::phase_line(phase, "Running"));
        if phase == UnlearnPhase::QuantumLossOptimization {
            let ticks = plan.ticks(phase);
            let per_epoch = ticks.len() / plan.epochs.len().max(1);
            for (i, epoch) in plan.epochs.iter().enumerate() {
                for tick in ticks.iter().skip(i * per_epoch).take(per_epoch) {
                    pause(tick.delay, options).await;
                }
                println!("{}", render::epoch_line(epoch));
            }
        } else {
            for tick in plan.ticks(phase) {
                pause(tick.delay, options).await;
            }
        }
        println!("{}", render::phase_line(phase, "Completed"));
    }
    println!("{}", render::completion_line(plan));
}

async fn handle_unlearn(
    config: &EraserConfig,
    speaker: &str,
    seeds: &mut SeedManager,
    options: OutputOptions,
) -> anyhow::Result<()> {
    let mut session = DemoSession::new(config)?;
    load_model(&mut session, seeds, options).await?;

    let mut predict_rng = seeds.rng_for("predict");
    let pre_prediction = session.predict(speaker, &mut predict_rng)?;

    let mut rng = seeds.rng_for("unlearn");
    let run = session.begin_unlearning(speaker, &mut rng)?.clone();

    if options.shows_progress() {
        print_selection(&session, config, speaker);
        println!("Pre-unlearning prediction ({speaker}):");
        print!(
            "{}",
            render::prediction_panel(&pre_prediction, &config.catalog)
        );
        println!();
        println!("Applying unlearning to {speaker}...");
        play_phases(&run.plan, options).await;
        pause(Duration::from_millis(700), options).await;
        println!();
    }

    let report = session.finish_unlearning(&mut rng)?;
    if options.json {
        return print_json(&serde_json::json!({
            "session": session.model(),
            "pre_prediction": pre_prediction,
            "report": report,
        }));
    }
    print!("{}", render::report_panel(&report, &config.catalog));
    Ok(())
}
