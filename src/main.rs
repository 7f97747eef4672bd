//! easygit - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use git2::Repository;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use easygit::commit::{FileStatus, FsFileSource, analyze_changes};
use easygit::config::Settings;
use easygit::git::{GitPusher, open_repository, relativize, resolve_from_cwd, workdir};
use easygit::payment::{PaymentMethod, SimulatedGateway};
use easygit::pricing::{FreeUsageState, calculate_resource_usage};
use easygit::profile::{JsonFileStore, Profile, UserProfile};
use easygit::update::{UpdatePlan, execute_update, plan_update};

/// Commit and push selected files with a suggested message and a usage-based price.
#[derive(Parser, Debug)]
#[command(name = "easygit")]
#[command(about = "Commit and push selected files with a suggested message and a usage-based price")]
#[command(version)]
struct Cli {
    /// Path to the profile store (default: $EASYGIT_STORE or <config dir>/easygit/profile.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print a single JSON object instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a directory is inside a git work tree
    Check {
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Show which selected files changed and the suggested commit message
    Analyze {
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Files to analyze (absolute, or relative to the current directory)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the resource usage and price of committing the selected files
    Price {
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Files to price (absolute, or relative to the current directory)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Pay if needed, then commit and push the selected files
    Update {
        /// Repository path
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Files to commit (absolute, or relative to the current directory)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Commit message (defaults to the suggested message)
        #[arg(short, long)]
        message: Option<String>,

        /// Payment method for a paid update
        #[arg(long, value_enum)]
        pay_with: Option<PaymentMethod>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show the plan without paying, committing, or pushing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Show free usage availability and recent activity
    History,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the saved profile
    Show,

    /// Save the profile
    Set {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        github_username: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json;
    match run(cli) {
        Ok(payload) => {
            if json_output {
                println!("{}", envelope(payload));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if json_output {
                println!("{}", json!({ "success": false, "error": format!("{e:#}") }));
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "easygit=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Wrap a command payload as `{"success": true, ...payload}`.
fn envelope(payload: Value) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = payload {
        object.extend(fields);
    }
    Value::Object(object)
}

fn run(cli: Cli) -> Result<Value> {
    let settings = Settings::resolve(cli.store.as_deref());
    let quiet = cli.json;

    match cli.command {
        Command::Check { repo } => check(&repo, quiet),
        Command::Analyze { repo, files } => analyze(&repo, &files, &settings, quiet),
        Command::Price { repo, files } => price(&repo, &files, &settings, quiet),
        Command::Update {
            repo,
            files,
            message,
            pay_with,
            yes,
            dry_run,
        } => update(
            &repo,
            &files,
            UpdateOptions {
                message,
                pay_with,
                yes,
                dry_run,
            },
            &settings,
            quiet,
        ),
        Command::Profile { action } => profile(action, &settings, quiet),
        Command::History => history(&settings, quiet),
    }
}

fn open(repo: &Path) -> Result<(Repository, PathBuf)> {
    let repository = open_repository(repo)
        .with_context(|| format!("Cannot use {} as a repository", repo.display()))?;
    let root = workdir(&repository)?.to_path_buf();
    Ok((repository, root))
}

/// Command-line paths are relative to the current directory, like any shell argument.
fn absolute_files(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    files
        .iter()
        .map(|f| resolve_from_cwd(f).map_err(anyhow::Error::from))
        .collect()
}

fn relative_files(root: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    absolute_files(files)?
        .iter()
        .map(|f| relativize(root, f).map_err(anyhow::Error::from))
        .collect()
}

fn load_profile(settings: &Settings) -> Result<Profile<JsonFileStore>> {
    let store = JsonFileStore::open(&settings.store_path).context("Failed to load profile")?;
    Ok(Profile::new(store))
}

fn check(repo: &Path, quiet: bool) -> Result<Value> {
    let (_repository, root) = open(repo)?;
    if !quiet {
        println!("✓ Git repository: {}", root.display());
    }
    Ok(json!({ "path": root }))
}

fn analyze(repo: &Path, files: &[PathBuf], settings: &Settings, quiet: bool) -> Result<Value> {
    let (repository, root) = open(repo)?;
    let files = relative_files(&root, files)?;
    let source = FsFileSource::new(&root);

    let analysis = analyze_changes(&repository, &files, &source, settings.sample_limit)
        .context("Failed to analyze changes")?;

    if !quiet {
        println!("Changes ({} of {} selected files):", analysis.changes.len(), files.len());
        for change in &analysis.changes {
            println!("  {} {}", status_tag(change.status), change.path);
        }
        println!();
        println!("Suggested message: {}", analysis.suggested_message);
    }

    Ok(serde_json::to_value(&analysis)?)
}

fn price(repo: &Path, files: &[PathBuf], settings: &Settings, quiet: bool) -> Result<Value> {
    let (repository, root) = open(repo)?;
    let files = relative_files(&root, files)?;
    let source = FsFileSource::new(&root);

    let usage = calculate_resource_usage(&repository, &files, &source)
        .context("Failed to calculate resource usage")?;
    let free = load_profile(settings)?.free_usage().is_eligible(Utc::now());

    if !quiet {
        println!("Resource usage: {:.3} units", usage.resource_usage);
        if free {
            println!("Price:          FREE (using your free update, one every 3 months)");
        } else {
            println!("Price:          ${:.2}", usage.price);
        }
        if usage.has_merge_conflicts {
            println!();
            println!("Merge conflicts detected: usage is doubled.");
        }
    }

    let mut payload = serde_json::to_value(usage)?;
    payload["freeUsageAvailable"] = Value::Bool(free);
    Ok(payload)
}

struct UpdateOptions {
    message: Option<String>,
    pay_with: Option<PaymentMethod>,
    yes: bool,
    dry_run: bool,
}

fn update(
    repo: &Path,
    files: &[PathBuf],
    options: UpdateOptions,
    settings: &Settings,
    quiet: bool,
) -> Result<Value> {
    let (repository, root) = open(repo)?;
    let source = FsFileSource::new(&root);
    let mut profile = load_profile(settings)?;
    let now = Utc::now();

    let files = absolute_files(files)?;
    let plan = plan_update(&repository, &files, &source, &profile, now, settings.sample_limit)
        .context("Failed to prepare update")?;
    let message = options
        .message
        .unwrap_or_else(|| plan.analysis.suggested_message.clone());

    if !quiet {
        print_plan(&plan, &message);
    }

    if options.dry_run {
        if !quiet {
            println!();
            println!("Dry run complete. No changes made.");
        }
        return Ok(json!({ "plan": plan, "message": message }));
    }

    if !options.yes {
        let confirmed = Confirm::new()
            .with_prompt("Proceed?")
            .default(true)
            .interact()
            .context("Confirmation prompt failed (use --yes to skip it)")?;
        if !confirmed {
            bail!("Cancelled");
        }
    }

    let outcome = execute_update(
        &repository,
        &plan,
        &message,
        &SimulatedGateway,
        options.pay_with,
        &GitPusher,
        &mut profile,
        now,
    )
    .context("Failed to update repository")?;

    if !quiet {
        println!();
        println!("  [DONE] Created commit {}", outcome.commit);
        println!("  [DONE] Pushed {}", plan.repository);
        println!();
        println!("✓ Repository updated successfully!");
    }

    Ok(json!({
        "commit": outcome.commit.to_string(),
        "record": outcome.record,
    }))
}

fn print_plan(plan: &UpdatePlan, message: &str) {
    println!("Repository: {}", plan.repository);
    println!("Files ({}):", plan.files.len());
    for change in &plan.analysis.changes {
        println!("  {} {}", status_tag(change.status), change.path);
    }
    println!();
    println!("Commit message: {}", message);
    if plan.free {
        println!("Price:          FREE (using your free update, one every 3 months)");
    } else {
        println!("Price:          ${:.2}", plan.usage.price);
    }
    if plan.usage.has_merge_conflicts {
        println!();
        println!("Merge conflicts detected: resolve them before pushing.");
    }
}

fn status_tag(status: FileStatus) -> &'static str {
    match status {
        FileStatus::New => "[NEW]     ",
        FileStatus::Modified => "[MODIFIED]",
    }
}

fn profile(action: ProfileCommand, settings: &Settings, quiet: bool) -> Result<Value> {
    let mut profile = load_profile(settings)?;

    match action {
        ProfileCommand::Show => {
            let user = profile.user();
            if !quiet {
                match &user {
                    Some(u) => {
                        println!("Name:            {}", u.name);
                        println!("Email:           {}", u.email);
                        if !u.github_username.is_empty() {
                            println!("GitHub username: {}", u.github_username);
                        }
                    }
                    None => println!("No profile saved. Run `easygit profile set`."),
                }
            }
            Ok(json!({ "user": user }))
        }
        ProfileCommand::Set {
            name,
            email,
            github_username,
        } => {
            let user = UserProfile {
                name,
                email,
                github_username,
            };
            profile.save_user(&user).context("Error saving settings")?;
            if !quiet {
                println!("✓ Settings saved successfully!");
            }
            Ok(json!({ "user": user }))
        }
    }
}

fn history(settings: &Settings, quiet: bool) -> Result<Value> {
    let profile = load_profile(settings)?;
    let window = profile.free_usage();
    let state = window.state(Utc::now());
    let records = profile.history();

    if !quiet {
        match state {
            FreeUsageState::Available => println!("You have a free usage available."),
            FreeUsageState::CoolingDown { until } => {
                println!("Next free update: {}", until.format("%Y-%m-%d"))
            }
        }

        if records.is_empty() {
            println!("No recent activity.");
        } else {
            println!();
            println!("{:<12} {:<24} {:>8} {:>10}", "Date", "Repository", "Files", "Price");
            for record in &records {
                println!(
                    "{:<12} {:<24} {:>8} {:>10}",
                    record.date.format("%Y-%m-%d"),
                    record.repository,
                    format!("{} files", record.file_count),
                    record.price_label()
                );
            }
        }
    }

    Ok(json!({
        "freeUsageAvailable": state == FreeUsageState::Available,
        "history": records,
    }))
}
