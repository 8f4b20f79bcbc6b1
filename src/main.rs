// fitagent — Personal fitness assistant in Rust
// License: Apache-2.0

use anyhow::Context;
use clap::{Parser, Subcommand};
use fitagent::config::Config;
use fitagent::document::{DocumentExporter, ExportedDocument};
use fitagent::profile::{Gender, Goal, NutritionTargets, ProfileStore};
use fitagent::prompt::Persona;
use fitagent::provider::factory::create_client;
use fitagent::provider::CompletionClient;
use fitagent::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOGO: &str = "🏋️";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "fitagent",
    about = "fitagent — Personal fitness assistant with LLM personas",
    version
)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or update personal information
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Replace the fitness goals (no goals clears them)
    Goals {
        /// muscle-gain, weight-loss, endurance, rehab
        goals: Vec<Goal>,
    },
    /// Show or update nutrition targets
    Nutrition {
        #[command(subcommand)]
        action: NutritionAction,
    },
    /// Manage special notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },
    /// Ask one of the agent personas a question
    Ask {
        /// workout, nutrition, rehab or calculator
        persona: Persona,
        /// The question
        #[arg(required = true)]
        question: Vec<String>,
        /// Also export the response to this file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Generate or revise the AI nutrition plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Print the text of a workout plan PDF
    Extract {
        /// PDF file
        path: PathBuf,
    },
    /// Delete all stored data
    Reset {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Interactive session (responses can be exported at the end)
    Session,
    /// Show configuration and store status
    Status,
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Update personal info; omitted fields keep their value
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// Kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// Centimetres
        #[arg(long)]
        height: Option<f64>,
        /// male, female or other
        #[arg(long)]
        gender: Option<Gender>,
    },
}

#[derive(Subcommand)]
enum NutritionAction {
    /// Print targets, macro breakdown and the current plan
    Show,
    /// Update targets; omitted fields keep their value
    Set {
        #[arg(long)]
        calories: Option<f64>,
        #[arg(long)]
        protein: Option<f64>,
        #[arg(long)]
        fat: Option<f64>,
        #[arg(long)]
        carbs: Option<f64>,
    },
}

#[derive(Subcommand)]
enum NotesAction {
    /// List notes with their index
    List,
    /// Append a note
    Add { text: Vec<String> },
    /// Replace the note at INDEX
    Edit { index: usize, text: Vec<String> },
    /// Delete the note at INDEX (later notes move up)
    Delete { index: usize },
}

#[derive(Subcommand)]
enum PlanAction {
    /// Generate a meal plan from the profile
    Generate,
    /// Ask for changes to the current plan
    Revise {
        #[arg(required = true)]
        feedback: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    fitagent::logger::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Profile { action }) => profile_cmd(&cfg, action),
        Some(Commands::Goals { goals }) => goals_cmd(&cfg, goals),
        Some(Commands::Nutrition { action }) => nutrition_cmd(&cfg, action),
        Some(Commands::Notes { action }) => notes_cmd(&cfg, action),
        Some(Commands::Ask {
            persona,
            question,
            export,
        }) => ask_cmd(&cfg, persona, &question.join(" "), export).await,
        Some(Commands::Plan { action }) => plan_cmd(&cfg, action).await,
        Some(Commands::Extract { path }) => extract_cmd(&path),
        Some(Commands::Reset { yes }) => reset_cmd(&cfg, yes),
        Some(Commands::Session) | None => interactive_mode(&cfg).await,
        Some(Commands::Status) => {
            status_cmd(&cfg);
            Ok(())
        }
        Some(Commands::Version) => {
            version_cmd();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} Error: {:#}", LOGO, e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Profile commands
// ---------------------------------------------------------------------------

fn profile_cmd(cfg: &Config, action: ProfileAction) -> anyhow::Result<()> {
    let mut session = open_session(cfg)?;
    match action {
        ProfileAction::Show => print_profile(&session),
        ProfileAction::Set {
            name,
            age,
            weight,
            height,
            gender,
        } => {
            let mut personal = session.profile().personal.clone();
            personal.name = name.or(personal.name);
            personal.age = age.or(personal.age);
            personal.weight = weight.or(personal.weight);
            personal.height = height.or(personal.height);
            personal.gender = gender.or(personal.gender);
            session.save_profile(personal)?;
            println!("✅ Profile saved!");
        }
    }
    Ok(())
}

fn goals_cmd(cfg: &Config, goals: Vec<Goal>) -> anyhow::Result<()> {
    let mut session = open_session(cfg)?;
    let doc = session.save_goals(goals)?;
    if doc.goals.is_empty() {
        println!("✅ Goals cleared.");
    } else {
        println!("✅ Goals saved: {}", join(&doc.goals));
    }
    Ok(())
}

fn nutrition_cmd(cfg: &Config, action: NutritionAction) -> anyhow::Result<()> {
    let mut session = open_session(cfg)?;
    match action {
        NutritionAction::Show => print_nutrition(&session),
        NutritionAction::Set {
            calories,
            protein,
            fat,
            carbs,
        } => {
            let current = session.profile().nutrition.or_defaults();
            let targets = NutritionTargets {
                calories: calories.or(current.calories),
                protein: protein.or(current.protein),
                fat: fat.or(current.fat),
                carbs: carbs.or(current.carbs),
            };
            session.save_nutrition(targets)?;
            println!("✅ Nutrition saved!");
            print_nutrition(&session);
        }
    }
    Ok(())
}

fn notes_cmd(cfg: &Config, action: NotesAction) -> anyhow::Result<()> {
    let mut session = open_session(cfg)?;
    match action {
        NotesAction::List => print_notes(&session),
        NotesAction::Add { text } => {
            let index = session.add_note(&text.join(" "))?;
            println!("✅ Note {} added!", index);
        }
        NotesAction::Edit { index, text } => {
            session.edit_note(index, &text.join(" "))?;
            println!("✅ Note {} saved!", index);
        }
        NotesAction::Delete { index } => {
            let removed = session.delete_note(index)?;
            println!("🗑️  Deleted note {}: {}", index, removed);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Completion commands
// ---------------------------------------------------------------------------

async fn ask_cmd(
    cfg: &Config,
    persona: Persona,
    question: &str,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    cfg.validate()?;
    let mut session = open_session(cfg)?;

    let response = session.request_completion(persona, question).await?;
    println!("💡 {}:\n\n{}\n", persona, response);

    if let Some(path) = export {
        let doc = session.export_responses();
        write_export(&doc, &path)?;
    }
    Ok(())
}

async fn plan_cmd(cfg: &Config, action: PlanAction) -> anyhow::Result<()> {
    cfg.validate()?;
    let mut session = open_session(cfg)?;

    let plan = match action {
        PlanAction::Generate => session.generate_nutrition_plan().await?,
        PlanAction::Revise { feedback } => {
            session
                .revise_nutrition_plan(&feedback.join(" "))
                .await?
        }
    };
    println!("🍎 Your Nutrition Plan:\n\n{}\n", plan);
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// Readline loop over one session. Plain input goes to the current persona.
async fn interactive_mode(cfg: &Config) -> anyhow::Result<()> {
    let mut session = open_session(cfg)?;
    let mut persona = Persona::Workout;

    println!(
        "{} fitagent v{} — AI Fitness Assistant",
        LOGO,
        fitagent::VERSION
    );
    println!("Ask {} anything, or type /help. Type 'exit' or Ctrl+D to quit.\n", persona);
    if let Err(e) = cfg.validate() {
        println!("⚠️  {} (questions will fail until this is fixed)\n", e);
    }

    let mut rl = rustyline::DefaultEditor::new().context("failed to initialize readline")?;

    loop {
        match rl.readline(&format!("{} [{}] > ", LOGO, persona)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }
                let _ = rl.add_history_entry(trimmed);

                if !trimmed.starts_with('/') {
                    ask_in_session(&mut session, persona, trimmed).await;
                    continue;
                }

                let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
                let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");
                match parts[0] {
                    "/persona" => match arg.parse::<Persona>() {
                        Ok(p) => {
                            persona = p;
                            println!("Now talking to {}.\n", persona);
                        }
                        Err(e) => println!("⚠️  {}\n", e),
                    },
                    "/ask" => {
                        let mut split = arg.splitn(2, ' ');
                        let target = split.next().unwrap_or("").parse::<Persona>();
                        let question = split.next().unwrap_or("");
                        match target {
                            Ok(p) => ask_in_session(&mut session, p, question).await,
                            Err(e) => println!("⚠️  {}\n", e),
                        }
                    }
                    "/plan" => match session.generate_nutrition_plan().await {
                        Ok(plan) => println!("\n🍎 {}\n", plan),
                        Err(e) => eprintln!("{} Error: {}\n", LOGO, e),
                    },
                    "/revise" => match session.revise_nutrition_plan(arg).await {
                        Ok(plan) => println!("\n🍎 {}\n", plan),
                        Err(e) => eprintln!("{} Error: {}\n", LOGO, e),
                    },
                    "/responses" => {
                        if session.responses().is_empty() {
                            println!("No responses yet.\n");
                        }
                        for (name, text) in session.responses().as_sections() {
                            println!("--- {} ---\n{}\n", name, text);
                        }
                    }
                    "/export" => {
                        if session.responses().is_empty() {
                            println!("Nothing to export yet.\n");
                            continue;
                        }
                        let doc = session.export_responses();
                        let path = if arg.is_empty() {
                            PathBuf::from(doc.file_name())
                        } else {
                            PathBuf::from(arg)
                        };
                        if let Err(e) = write_export(&doc, &path) {
                            eprintln!("{} Error: {:#}\n", LOGO, e);
                        }
                    }
                    "/profile" => print_profile(&session),
                    "/reset" => match session.reset() {
                        Ok(()) => println!("🔄 Data reset.\n"),
                        Err(e) => eprintln!("{} Error: {}\n", LOGO, e),
                    },
                    "/help" => {
                        println!("Commands:");
                        println!("  <question>             — Ask the current persona");
                        println!("  /persona <name>        — Switch persona (workout, nutrition, rehab, calculator)");
                        println!("  /ask <persona> <text>  — Ask a specific persona");
                        println!("  /plan                  — Generate a nutrition plan");
                        println!("  /revise <changes>      — Revise the nutrition plan");
                        println!("  /responses             — Show responses from this session");
                        println!("  /export [path]         — Export responses to PDF");
                        println!("  /profile               — Show the stored profile");
                        println!("  /reset                 — Delete all stored data");
                        println!("  exit                   — Quit\n");
                    }
                    other => println!("Unknown command: {} (try /help)\n", other),
                }
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("\nUse 'exit' to quit or Ctrl+D to exit.");
            }
            Err(e) => {
                eprintln!("Readline error: {}", e);
                break;
            }
        }
    }

    if !session.responses().is_empty() {
        println!(
            "\n{} response(s) were not exported. Use /export next time to keep them.",
            session.responses().len()
        );
    }
    println!("Goodbye! 👋");
    Ok(())
}

async fn ask_in_session(session: &mut Session, persona: Persona, question: &str) {
    match session.request_completion(persona, question).await {
        Ok(response) => println!("\n💡 {}:\n{}\n", persona, response),
        Err(e) => eprintln!("{} Error: {}\n", LOGO, e),
    }
}

// ---------------------------------------------------------------------------
// Other commands
// ---------------------------------------------------------------------------

fn extract_cmd(path: &Path) -> anyhow::Result<()> {
    let text = fitagent::extract::pdf_text_from_file(path)?;
    println!("{}", text);
    Ok(())
}

fn reset_cmd(cfg: &Config, yes: bool) -> anyhow::Result<()> {
    let store = open_store(cfg)?;
    if !yes {
        println!(
            "This deletes {}. Re-run with --yes to confirm.",
            store.path().display()
        );
        return Ok(());
    }
    store.reset()?;
    println!("🔄 Data reset.");
    Ok(())
}

fn version_cmd() {
    println!("{} fitagent v{}", LOGO, fitagent::VERSION);
    println!("  Built with Rust 🦀");
}

fn status_cmd(cfg: &Config) {
    println!("{} fitagent Status\n", LOGO);

    match Config::default_path() {
        Ok(p) if p.exists() => println!("  Config:  ✅ {}", p.display()),
        Ok(p) => println!("  Config:  ⏭️  {} (not found, using defaults)", p.display()),
        Err(e) => println!("  Config:  ❌ {}", e),
    }

    match open_store(cfg) {
        Ok(store) => match store.load() {
            Ok(_) if store.path().exists() => println!("  Store:   ✅ {}", store.path().display()),
            Ok(_) => println!("  Store:   ⏭️  {} (empty)", store.path().display()),
            Err(e) => println!("  Store:   ❌ {}", e),
        },
        Err(e) => println!("  Store:   ❌ {}", e),
    }

    println!("  Model:   {}", cfg.completion.model);
    match cfg.validate() {
        Ok(()) => println!("  API key: ✅ configured"),
        Err(e) => println!("  API key: ❌ {}", e),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&str>) -> Config {
    let config_path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        Config::default_path().unwrap_or_else(|_| PathBuf::from("config.json"))
    };

    Config::load(&config_path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Config::default()
    })
}

fn open_store(cfg: &Config) -> anyhow::Result<ProfileStore> {
    Ok(ProfileStore::in_dir(&cfg.data_dir()?))
}

fn open_session(cfg: &Config) -> anyhow::Result<Session> {
    let client: Arc<dyn CompletionClient> = Arc::from(create_client(cfg)?);
    let session = Session::start(
        open_store(cfg)?,
        client,
        DocumentExporter::from_config(&cfg.export),
    )?
    .with_export_title(cfg.export.title.clone())
    .with_revision_temperature(cfg.completion.revision_temperature);
    Ok(session)
}

fn write_export(doc: &ExportedDocument, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, &doc.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "📄 Exported {} ({}, {} bytes) to {}",
        doc.file_name(),
        doc.mime(),
        doc.bytes.len(),
        path.display()
    );
    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_profile(session: &Session) {
    let doc = session.profile();
    let p = &doc.personal;
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "—".to_string());

    println!("👤 Personal Information");
    println!("  Name:    {}", or_dash(p.name.clone()));
    println!("  Age:     {}", or_dash(p.age.map(|a| a.to_string())));
    println!("  Weight:  {}", or_dash(p.weight.map(|w| format!("{} kg", w))));
    println!("  Height:  {}", or_dash(p.height.map(|h| format!("{} cm", h))));
    println!("  Gender:  {}", or_dash(p.gender.map(|g| g.to_string())));
    println!("🎯 Goals:  {}", if doc.goals.is_empty() { "—".to_string() } else { join(&doc.goals) });
    println!();
    print_notes(session);
}

fn print_notes(session: &Session) {
    let notes = &session.profile().notes;
    println!("📝 Special Notes");
    if notes.is_empty() {
        println!("  (none)");
    }
    for (i, note) in notes.iter().enumerate() {
        println!("  [{}] {}", i, note);
    }
}

fn print_nutrition(session: &Session) {
    let doc = session.profile();
    let targets = doc.nutrition.or_defaults();
    let value = |v: Option<f64>| v.unwrap_or_default();

    println!("🍎 Nutrition Targets{}", if doc.nutrition.is_empty() { " (defaults, not saved)" } else { "" });
    println!("  Calories: {}", value(targets.calories));

    let macros = [
        ("Protein", value(targets.protein)),
        ("Fat", value(targets.fat)),
        ("Carbs", value(targets.carbs)),
    ];
    let max = macros.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    println!("📊 Macro Breakdown (g)");
    for (label, grams) in macros {
        let width = if max > 0.0 {
            ((grams / max) * 40.0).round() as usize
        } else {
            0
        };
        println!("  {:<8}{} {}", label, "█".repeat(width), grams);
    }

    if let Some(ref plan) = doc.nutrition_plan {
        println!("\n### Your Nutrition Plan:\n{}", plan);
    }
}
