use anyhow::{Context, Result};
use cv2interview::backend::create_backend;
use cv2interview::config::Config;
use cv2interview::session::FileSessionStore;
use cv2interview::state::WorkflowState;
use cv2interview::workflow::{UploadWorkflow, UploadedFile};
use indicatif::ProgressBar;
use inquire::Select;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load()?;
    config.ensure_directories()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("dashboard") => show_dashboard(&config).await,
        Some(path) => run_workflow(&config, Path::new(path)).await,
        None => {
            eprintln!("Usage: cv2interview <resume.pdf>");
            eprintln!("       cv2interview dashboard");
            std::process::exit(2);
        }
    }
}

async fn run_workflow(config: &Config, path: &Path) -> Result<()> {
    let backend = create_backend(&config.backend);
    let store = Box::new(FileSessionStore::new(config.session_folder.clone())?);
    let mut workflow = UploadWorkflow::new(backend, store);

    if workflow.state() == WorkflowState::Review {
        println!("Resuming previous session (start over to upload a new CV).");
    } else {
        let content =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let media_type = if name.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        };

        workflow.select_file(UploadedFile {
            name,
            media_type: media_type.to_string(),
            content,
        })?;

        let spinner = spinner("Uploading CV and extracting profile...");
        let result = workflow.upload_and_extract().await;
        spinner.finish_and_clear();
        if let Err(e) = result {
            eprintln!("{}", e);
            anyhow::bail!("extraction failed; run again to retry");
        }
    }

    print_profile(&workflow);

    loop {
        let action = Select::new(
            "Next action:",
            vec![
                "Generate interview questions",
                "Career recommendation",
                "Both (concurrently)",
                "Start over",
                "Quit",
            ],
        )
        .prompt()?;

        let result = match action {
            "Generate interview questions" => {
                let spinner = spinner("Generating interview questions...");
                let result = workflow.generate_questions().await;
                spinner.finish_and_clear();
                result
            }
            "Career recommendation" => {
                let spinner = spinner("Generating career recommendation...");
                let result = workflow.recommend_career().await;
                spinner.finish_and_clear();
                result
            }
            "Both (concurrently)" => {
                let spinner = spinner("Generating questions and recommendation...");
                let result = workflow.analyze_all().await;
                spinner.finish_and_clear();
                result
            }
            "Start over" => {
                workflow.restart()?;
                println!("Session cleared.");
                return Ok(());
            }
            _ => return Ok(()),
        };

        match result {
            Ok(()) => print_results(&workflow),
            // Failures are scoped to the step; the menu doubles as the retry
            // affordance.
            Err(e) => eprintln!("{}\nPick the same action to retry.", e),
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_profile(workflow: &UploadWorkflow) {
    let Some(profile) = workflow.profile() else {
        return;
    };
    match &profile.structured {
        Some(p) => {
            println!("\nSkills:");
            for skill in &p.skills {
                println!("  - {}", skill);
            }
            println!("Experience:");
            for entry in &p.experience {
                println!("  - {}, {} ({})", entry.title, entry.company, entry.duration);
                if !entry.description.is_empty() {
                    println!("      {}", entry.description);
                }
            }
            println!("Education:");
            for entry in &p.education {
                println!("  - {}, {} ({})", entry.degree, entry.institution, entry.year);
            }
        }
        None => {
            // Structured parse failed; show the model text as-is.
            println!("\nProfile:\n{}", profile.raw_text);
        }
    }
}

fn print_results(workflow: &UploadWorkflow) {
    if let Some(questions) = workflow.questions() {
        println!("\nInterview questions:");
        for (i, question) in questions.iter().enumerate() {
            println!("{:>3}. {}", i + 1, question);
        }
    }
    if let Some(recommendation) = workflow.recommendation() {
        println!("\nCareer recommendation:\n{}", recommendation);
    }
}

async fn show_dashboard(config: &Config) -> Result<()> {
    let backend = create_backend(&config.backend);

    let health = backend.health().await?;
    println!(
        "Backend: {} (version {})",
        health.status,
        health.version.as_deref().unwrap_or("unknown")
    );

    let overview = backend.dashboard_overview(30).await?;
    let summary = &overview.summary;
    println!(
        "Last 30 days: {} CVs processed, success rate {:.1}, {} interview sessions, health score {:.1}",
        summary.total_processed,
        summary.success_rate,
        summary.total_interviews,
        summary.health_score
    );

    let skills = backend.skills_analytics().await?;
    if !skills.skill_frequencies.is_empty() {
        println!("\nTop skills:");
        for (name, count) in skills.top_skills(10) {
            println!("  {:>4}  {}", count, name);
        }
    }
    if !skills.trending_up.is_empty() {
        println!("Trending up: {}", skills.trending_up.join(", "));
    }

    let careers = backend.career_analytics().await?;
    if !careers.role_frequencies.is_empty() {
        println!("\nTop recommended roles:");
        for (name, count) in careers.top_roles(10) {
            println!("  {:>4}  {}", count, name);
        }
    }
    if !careers.confidence_distribution.is_empty() {
        println!("\nConfidence distribution:");
        for (bucket, count) in &careers.confidence_distribution {
            println!("  {:>4}  {}", count, bucket);
        }
    }

    Ok(())
}
