use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use admin_console::api::ApiError;
use admin_console::api::types::{LlmLogQuery, ScheduledTaskUpdateRequest};
use admin_console::app::Console;
use admin_console::cli::{self, OutputFormat};
use admin_console::config::{self, ConsoleConfig};

#[derive(Debug, Parser)]
#[command(name = "admin-console")]
#[command(about = "Operator console for the admin backend")]
struct App {
    /// Output format for list screens: table (default), json
    #[arg(long, global = true, default_value = "table")]
    format: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        username: String,
        /// Password (otherwise ADMIN_CONSOLE_PASSWORD or a line from stdin)
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the logged-in operator
    Whoami,
    /// List sidebar menu entries
    Menu,
    /// Navigate to a screen path and show where the guard lands
    Open { target: String },
    /// Scheduled tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// LLM provider config and call logs
    Llm {
        #[command(subcommand)]
        action: LlmAction,
    },
    /// Backend key/value configuration
    SysConfig {
        #[command(subcommand)]
        action: SysConfigAction,
    },
    /// Manage admin-console configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum TaskAction {
    /// List scheduled tasks
    List,
    /// Update a task
    Update {
        task_key: String,
        /// Enable or disable the task
        #[arg(long)]
        enabled: Option<bool>,
        /// New cron expression
        #[arg(long)]
        cron: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a task
    Delete { task_key: String },
    /// Trigger a task once, now
    Run { task_key: String },
    /// Reload all schedules from storage
    Refresh,
}

#[derive(Debug, Subcommand)]
enum LlmAction {
    /// Show the LLM provider configuration
    Config {
        /// Print API keys unmasked
        #[arg(long)]
        show_keys: bool,
    },
    /// Save (part of) the LLM provider configuration
    SaveConfig {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        model_id: Option<String>,
        /// JSON file holding the full account list
        #[arg(long)]
        accounts: Option<PathBuf>,
    },
    /// List call logs, newest first
    Logs {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        task_type: Option<String>,
    },
    /// Show one call log
    Log { id: i64 },
}

#[derive(Debug, Subcommand)]
enum SysConfigAction {
    /// List configuration entries
    List,
    /// Set one entry
    Set { key: String, value: Option<String> },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Print the config file location
    Path,
}

fn main() -> ExitCode {
    let app = App::parse();
    let config = config::load();
    init_tracing(&config);

    match run(app, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &ConsoleConfig) {
    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Global error report. Failures that asked to be handled locally stay quiet.
fn report(err: &anyhow::Error) {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        if api.skips_global_error() {
            return;
        }
        eprintln!("{} {api}", "error:".red().bold());
        if api.is_auth_denied() {
            eprintln!("  session ended, run `admin-console login` again");
        }
        return;
    }
    eprintln!("{} {err:#}", "error:".red().bold());
}

fn run(app: App, config: ConsoleConfig) -> anyhow::Result<()> {
    let fmt = OutputFormat::from_str_opt(Some(&app.format));

    // Local configuration commands never touch the backend or the session.
    let command = match app.command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => cli::run_config_show(),
                ConfigAction::Init { force } => cli::run_config_init(force),
                ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
                ConfigAction::Path => cli::run_config_path(),
            };
        }
        other => other,
    };

    let console = Console::from_config(config);

    match command {
        Commands::Login { username, password } => cli::run_login(&console, &username, password),
        Commands::Logout => cli::run_logout(&console),
        Commands::Whoami => cli::run_whoami(&console),
        Commands::Menu => cli::run_menu(&console, fmt),
        Commands::Open { target } => cli::run_open(&console, &target),
        Commands::Tasks { action } => match action {
            TaskAction::List => cli::run_tasks_list(&console, fmt),
            TaskAction::Update {
                task_key,
                enabled,
                cron,
                description,
            } => {
                let update = ScheduledTaskUpdateRequest {
                    enabled: enabled.map(i32::from),
                    cron_expression: cron,
                    description,
                };
                cli::run_tasks_update(&console, &task_key, update)
            }
            TaskAction::Delete { task_key } => cli::run_tasks_delete(&console, &task_key),
            TaskAction::Run { task_key } => cli::run_tasks_run(&console, &task_key),
            TaskAction::Refresh => cli::run_tasks_refresh(&console),
        },
        Commands::Llm { action } => match action {
            LlmAction::Config { show_keys } => cli::run_llm_config(&console, fmt, show_keys),
            LlmAction::SaveConfig {
                api_url,
                model_id,
                accounts,
            } => cli::run_llm_save_config(&console, api_url, model_id, accounts.as_deref()),
            LlmAction::Logs {
                page,
                size,
                task_type,
            } => {
                let query = LlmLogQuery {
                    page,
                    size,
                    task_type,
                };
                cli::run_llm_logs(&console, query, fmt)
            }
            LlmAction::Log { id } => cli::run_llm_log(&console, id, fmt),
        },
        Commands::SysConfig { action } => match action {
            SysConfigAction::List => cli::run_sys_config_list(&console, fmt),
            SysConfigAction::Set { key, value } => cli::run_sys_config_set(&console, &key, value),
        },
        // Handled above.
        Commands::Config { .. } => Ok(()),
    }
}
