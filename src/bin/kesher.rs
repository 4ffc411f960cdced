//! Kesher CLI - developer tool for the Kesher core
//!
//! Commands operate on a JSON state snapshot file:
//! - check-in: record a mood check-in
//! - sleep: record a night of sleep
//! - status: print the dashboard summary
//! - dispatch: apply raw JSON actions (argument or NDJSON on stdin)
//! - scenarios: list training scenarios and completion
//! - chat: talk to the chat companion over stdin
//! - doctor: diagnose configuration and snapshot health

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kesher_core::chat::{ChatSession, CompletionClient, OpenAiClient};
use kesher_core::health::HealthAction;
use kesher_core::training;
use kesher_core::types::{parse_date, CheckInDraft, Mood, SleepQuality, SleepSample};
use kesher_core::{Action, AppState, Config, KesherError, KESHER_VERSION};

/// Kesher - peer-support check-ins, risk scoring and buddies
#[derive(Parser)]
#[command(name = "kesher")]
#[command(version = KESHER_VERSION)]
#[command(about = "Operate on a Kesher state snapshot", long_about = None)]
struct Cli {
    /// State snapshot file (created on first write)
    #[arg(long, global = true, default_value = "kesher-state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a mood check-in for today (or --date)
    CheckIn {
        #[arg(long)]
        mood: Mood,

        #[arg(long)]
        note: Option<String>,

        /// Calendar day (YYYY-MM-DD), defaults to today in UTC
        #[arg(long)]
        date: Option<String>,
    },

    /// Record a night of sleep
    Sleep {
        #[arg(long)]
        hours: f64,

        #[arg(long)]
        quality: Option<SleepQuality>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Print the dashboard summary
    Status {
        /// Evaluate as of this date instead of today
        #[arg(long)]
        today: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a JSON action, or NDJSON actions from stdin when omitted
    Dispatch {
        action: Option<String>,
    },

    /// List training scenarios
    Scenarios {
        /// Mark a scenario as completed
        #[arg(long)]
        complete: Option<u32>,
    },

    /// Chat with the companion; one message per stdin line
    Chat {
        /// Configuration file (defaults to $KESHER_CONFIG or kesher.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Diagnose configuration and snapshot health
    Doctor {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kesher_core=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), KesherCliError> {
    match cli.command {
        Commands::CheckIn { mood, note, date } => cmd_check_in(&cli.state, mood, note, date.as_deref()),
        Commands::Sleep { hours, quality, date } => cmd_sleep(&cli.state, hours, quality, date.as_deref()),
        Commands::Status { today, json } => cmd_status(&cli.state, today.as_deref(), json),
        Commands::Dispatch { action } => cmd_dispatch(&cli.state, action.as_deref()),
        Commands::Scenarios { complete } => cmd_scenarios(&cli.state, complete),
        Commands::Chat { config } => cmd_chat(config.as_deref()),
        Commands::Doctor { config, json } => cmd_doctor(&cli.state, config.as_deref(), json),
    }
}

fn load_state(path: &Path) -> Result<AppState, KesherCliError> {
    if !path.exists() {
        return Ok(AppState::new());
    }
    let contents = fs::read_to_string(path)?;
    Ok(AppState::from_json(&contents)?)
}

fn save_state(path: &Path, state: &AppState) -> Result<(), KesherCliError> {
    fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, KesherCliError> {
    let config = match path {
        Some(path) => Config::load_file(&path.to_string_lossy())?,
        None => Config::load()?,
    };
    Ok(config)
}

fn date_or_today(date: Option<&str>) -> Result<NaiveDate, KesherCliError> {
    match date {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(Utc::now().date_naive()),
    }
}

fn cmd_check_in(
    state_path: &Path,
    mood: Mood,
    note: Option<String>,
    date: Option<&str>,
) -> Result<(), KesherCliError> {
    let mut state = load_state(state_path)?;
    let mut draft = CheckInDraft::new(date_or_today(date)?, mood);
    if let Some(note) = note {
        draft = draft.with_note(note);
    }

    let now = Utc::now();
    state.dispatch(Action::Health(HealthAction::AddCheckIn(draft)), now)?;
    save_state(state_path, &state)?;

    println!(
        "Streak {} (longest {}), risk {}",
        state.health.current_streak(now.date_naive()),
        state.health.longest_streak(),
        state.health.risk_level.map_or("unset", |l| l.as_str())
    );
    Ok(())
}

fn cmd_sleep(
    state_path: &Path,
    hours: f64,
    quality: Option<SleepQuality>,
    date: Option<&str>,
) -> Result<(), KesherCliError> {
    let mut state = load_state(state_path)?;
    let sample = SleepSample::new(date_or_today(date)?, hours, quality);

    state.dispatch(Action::Health(HealthAction::AddSleepSample(sample)), Utc::now())?;
    save_state(state_path, &state)?;

    println!(
        "Risk {}",
        state.health.risk_level.map_or("unset", |l| l.as_str())
    );
    Ok(())
}

fn cmd_status(state_path: &Path, today: Option<&str>, json: bool) -> Result<(), KesherCliError> {
    let state = load_state(state_path)?;
    let summary = state.summary(date_or_today(today)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Kesher Status ({})", summary.today);
    println!("===================");
    println!("Streak:         {} (longest {})", summary.current_streak, summary.longest_streak);
    println!(
        "Risk level:     {}",
        summary.risk_level.map_or("unset", |l| l.as_str())
    );
    if let Some(days) = summary.assessment.days_since_last_check_in {
        println!("Last check-in:  {} day(s) ago", days);
    }
    if let Some(mood) = summary.latest_mood {
        println!("Latest mood:    {}", mood.as_str());
    }
    println!("Notifications:  {} unread", summary.unread_notifications);
    println!("Buddies:        {} ({} unread alerts)", summary.buddies, summary.unread_alerts);
    println!("XP:             {} (level {})", summary.xp_points, summary.level);
    Ok(())
}

fn cmd_dispatch(state_path: &Path, action: Option<&str>) -> Result<(), KesherCliError> {
    let mut state = load_state(state_path)?;
    let mut applied = 0usize;

    match action {
        Some(json) => {
            state.dispatch_json(json, Utc::now())?;
            applied += 1;
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                state.dispatch_json(trimmed, Utc::now())?;
                applied += 1;
            }
        }
    }

    if applied == 0 {
        return Err(KesherCliError::NoActions);
    }
    save_state(state_path, &state)?;
    info!(applied, "actions applied");
    Ok(())
}

fn cmd_scenarios(state_path: &Path, complete: Option<u32>) -> Result<(), KesherCliError> {
    let mut state = load_state(state_path)?;

    if let Some(id) = complete {
        state.dispatch(Action::CompleteScenario(id), Utc::now())?;
        save_state(state_path, &state)?;
    }

    for progress in training::catalog(&state.badges) {
        let scenario = progress.scenario;
        println!(
            "  {} {} {:?} {} XP, {}-{} min: {}",
            if progress.completed { "[x]" } else { "[ ]" },
            scenario.id,
            scenario.difficulty,
            scenario.xp_reward,
            scenario.duration_minutes.0,
            scenario.duration_minutes.1,
            scenario.title,
        );
    }
    println!("XP {} (level {})", state.badges.xp_points, state.badges.level);
    Ok(())
}

fn cmd_chat(config: Option<&Path>) -> Result<(), KesherCliError> {
    let config = load_config(config)?;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let client = OpenAiClient::new(&config.chat);
        let mut session = ChatSession::new(client, &config.chat, Utc::now());
        chat_loop(&mut session, io::stdin().lock(), &mut io::stdout()).await
    })
}

/// Greeting, then one reply per input line; every reply is flushed
async fn chat_loop<C: CompletionClient, R: BufRead, W: Write>(
    session: &mut ChatSession<C>,
    input: R,
    out: &mut W,
) -> Result<(), KesherCliError> {
    if let Some(greeting) = session.messages().first() {
        writeln!(out, "< {}", greeting.text)?;
        out.flush()?;
    }

    for line in input.lines() {
        let line = line?;
        if line.trim() == "/sos" {
            let notice = session.sos(Utc::now());
            writeln!(out, "< {}", notice.text)?;
            out.flush()?;
            continue;
        }
        if let Some(reply) = session.send(&line, Utc::now()).await {
            writeln!(out, "< {}", reply.text)?;
        }
        out.flush()?;
    }
    Ok(())
}

fn cmd_doctor(state_path: &Path, config: Option<&Path>, json: bool) -> Result<(), KesherCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "kesher_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Kesher core version {}", KESHER_VERSION),
    });

    match load_config(config) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!("Chat model {} at {}", config.chat.model, config.chat.endpoint),
            });
            checks.push(if config.chat.api_key.is_some() {
                DoctorCheck {
                    name: "api_key".to_string(),
                    status: CheckStatus::Ok,
                    message: "OPENAI_API_KEY is set".to_string(),
                }
            } else {
                DoctorCheck {
                    name: "api_key".to_string(),
                    status: CheckStatus::Warning,
                    message: "OPENAI_API_KEY is not set; chat replies will use the fallback".to_string(),
                }
            });
        }
        Err(e) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: CliError::from(e).message,
        }),
    }

    if state_path.exists() {
        checks.push(match load_state(state_path) {
            Ok(state) => DoctorCheck {
                name: "state".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Snapshot valid ({} check-ins, {} sleep samples, {} buddies)",
                    state.health.check_ins.len(),
                    state.health.sleep_data.len(),
                    state.buddy.buddies.len()
                ),
            },
            Err(e) => DoctorCheck {
                name: "state".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            },
        });
    } else {
        checks.push(DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Warning,
            message: "Snapshot file does not exist yet".to_string(),
        });
    }

    checks.push(if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive chat)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch dispatch ready)".to_string(),
        }
    });

    let report = DoctorReport {
        version: KESHER_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Kesher Doctor Report");
        println!("====================");
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error)) {
        Err(KesherCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum KesherCliError {
    Io(io::Error),
    Core(KesherError),
    Json(serde_json::Error),
    NoActions,
    DoctorFailed,
}

impl From<io::Error> for KesherCliError {
    fn from(e: io::Error) -> Self {
        KesherCliError::Io(e)
    }
}

impl From<KesherError> for KesherCliError {
    fn from(e: KesherError) -> Self {
        KesherCliError::Core(e)
    }
}

impl From<serde_json::Error> for KesherCliError {
    fn from(e: serde_json::Error) -> Self {
        KesherCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<KesherCliError> for CliError {
    fn from(e: KesherCliError) -> Self {
        match e {
            KesherCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            KesherCliError::Core(e) => {
                let (code, hint) = match &e {
                    KesherError::JsonError(_) => ("JSON_ERROR", "Check the snapshot or action JSON"),
                    KesherError::ConfigError(_) => ("CONFIG_ERROR", "Check kesher.toml syntax"),
                    KesherError::IoError { .. } => ("IO_ERROR", "Check file paths and permissions"),
                    KesherError::DateParseError(_) => ("DATE_ERROR", "Dates use YYYY-MM-DD"),
                    KesherError::UnknownScenario(_) => ("UNKNOWN_SCENARIO", "Run 'kesher scenarios' for valid ids"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            KesherCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            KesherCliError::NoActions => CliError {
                code: "NO_ACTIONS".to_string(),
                message: "No actions found in input".to_string(),
                hint: Some("Pass an action argument or pipe NDJSON actions on stdin".to_string()),
            },
            KesherCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
