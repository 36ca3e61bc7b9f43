//! CLI screens of the admin console.
//!
//! Each screen first navigates through the router, so the authentication
//! guard decides whether it may open, then calls the typed endpoints:
//! - `login` / `logout` / `whoami`: session
//! - `menu` / `open`: navigation
//! - `tasks ...`: scheduled tasks
//! - `llm ...`: LLM provider config and call logs
//! - `sys-config ...`: key/value system configuration
//! - `config ...`: local console configuration

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::types::{
    LlmConfigAccountItem, LlmConfigRequest, LlmConfigResponse, LlmLogPageResult, LlmLogQuery,
    LlmRequestLogItem, LoginRequest, ScheduledTaskItem, ScheduledTaskUpdateRequest, SysConfigItem,
    SysConfigUpdateRequest,
};
use crate::api::ApiError;
use crate::app::Console;
use crate::config;
use crate::constants::LOGIN_ROUTE;
use crate::menu::{self, MenuItem};
use crate::router::Location;

/// Output format for list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation helpers
// ---------------------------------------------------------------------------

/// Open a protected screen, printing its title.
///
/// Fails when the guard sends the operator to the login screen instead.
fn enter(console: &Console, path: &str) -> Result<Location> {
    let location = console.open(path)?;
    if location.name == Some(LOGIN_ROUTE) {
        anyhow::bail!(
            "not logged in. Run `admin-console login` first (requested {})",
            location.query_value("from").unwrap_or(path)
        );
    }
    println!("{}", console.router.title().bold().cyan());
    println!("{}", "=".repeat(60));
    Ok(location)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Log in. The password comes from the argument, `ADMIN_CONSOLE_PASSWORD`,
/// or the first line of stdin, in that order.
pub fn run_login(console: &Console, username: &str, password: Option<String>) -> Result<()> {
    let location = console.open("/login")?;
    if location.name != Some(LOGIN_ROUTE) {
        let name = console.session.principal_name().unwrap_or_default();
        println!("{} {}", "Already logged in as".green(), name.bold());
        return Ok(());
    }

    let password = match password.or_else(|| std::env::var("ADMIN_CONSOLE_PASSWORD").ok()) {
        Some(password) => password,
        None => read_password_line()?,
    };

    let request = LoginRequest {
        username: username.to_string(),
        password,
    };

    match console.login(&request) {
        Ok(issued) => {
            println!("{} {}", "Logged in as".green(), issued.username.bold());
            println!("  {}", console.router.title().dimmed());
            Ok(())
        }
        Err(err) => {
            let message = match &err {
                ApiError::LoginRejected => "Login failed: invalid username or password".to_string(),
                other => format!("Login failed: {other}"),
            };
            eprintln!("{}", message.red());
            Err(err.into())
        }
    }
}

fn read_password_line() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn run_logout(console: &Console) -> Result<()> {
    console.logout();
    println!("{}", "Logged out.".green());
    Ok(())
}

pub fn run_whoami(console: &Console) -> Result<()> {
    console.session.restore_from_storage();
    match console.session.principal_name() {
        Some(name) if console.session.is_authenticated() => {
            println!("{} {}", "Logged in as".green(), name.bold());
            println!("  backend: {}", console.api.client().base_url());
        }
        _ => println!("{}", "Not logged in.".yellow()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

pub fn run_menu(console: &Console, format: OutputFormat) -> Result<()> {
    let items: &[MenuItem] = &menu::SIDEBAR_MENUS;
    if format == OutputFormat::Json {
        return print_json(&items);
    }

    enter(console, "/")?;
    for item in items {
        println!(
            "  {:<18} {:<20} {}",
            item.title.bold(),
            item.path,
            dash(item.icon).dimmed()
        );
    }
    Ok(())
}

/// Navigate to an arbitrary location and report where the guard landed.
pub fn run_open(console: &Console, target: &str) -> Result<()> {
    let location = console.open(target)?;
    println!("{} {}", "Title:   ".bold(), console.router.title());
    println!("{} {}", "Location:".bold(), location.full_path);
    if let Some(item) = menu::find_menu_by_path(&location.path) {
        println!("{} {}", "Menu:    ".bold(), item.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scheduled tasks
// ---------------------------------------------------------------------------

pub fn run_tasks_list(console: &Console, format: OutputFormat) -> Result<()> {
    enter(console, "/scheduled-task")?;
    let tasks = console.api.get_scheduled_task_list()?;

    match format {
        OutputFormat::Json => print_json(&tasks),
        OutputFormat::Table => {
            print_tasks_table(&tasks);
            Ok(())
        }
    }
}

fn print_tasks_table(tasks: &[ScheduledTaskItem]) {
    if tasks.is_empty() {
        println!("{}", "No scheduled tasks.".yellow());
        return;
    }

    println!(
        "  {:<24} {:<20} {:<8} Description",
        "Task", "Cron", "Enabled"
    );
    println!("  {}", "-".repeat(70));
    for task in tasks {
        let enabled = if task.is_enabled() {
            "yes".green()
        } else {
            "no".red()
        };
        println!(
            "  {:<24} {:<20} {:<8} {}",
            truncate(&task.task_key, 24),
            dash(task.cron_expression.as_deref()),
            enabled,
            dash(task.description.as_deref()),
        );
    }
}

pub fn run_tasks_update(
    console: &Console,
    task_key: &str,
    update: ScheduledTaskUpdateRequest,
) -> Result<()> {
    enter(console, "/scheduled-task")?;
    if update == ScheduledTaskUpdateRequest::default() {
        anyhow::bail!("nothing to update: pass --enabled, --cron or --description");
    }
    console.api.update_scheduled_task(task_key, &update)?;
    println!("{} {}", "Updated".green(), task_key.bold());
    Ok(())
}

pub fn run_tasks_delete(console: &Console, task_key: &str) -> Result<()> {
    enter(console, "/scheduled-task")?;
    console.api.delete_scheduled_task(task_key)?;
    println!("{} {}", "Deleted".green(), task_key.bold());
    Ok(())
}

pub fn run_tasks_run(console: &Console, task_key: &str) -> Result<()> {
    enter(console, "/scheduled-task")?;
    console.api.run_scheduled_task(task_key)?;
    println!("{} {}", "Triggered".green(), task_key.bold());
    Ok(())
}

pub fn run_tasks_refresh(console: &Console) -> Result<()> {
    enter(console, "/scheduled-task")?;
    console.api.refresh_scheduled_tasks()?;
    println!("{}", "Scheduler refreshed.".green());
    Ok(())
}

// ---------------------------------------------------------------------------
// LLM configuration
// ---------------------------------------------------------------------------

pub fn run_llm_config(console: &Console, format: OutputFormat, show_keys: bool) -> Result<()> {
    enter(console, "/llm-config")?;
    let cfg = console.api.get_llm_config()?;

    match format {
        OutputFormat::Json => print_json(&cfg),
        OutputFormat::Table => {
            print_llm_config(&cfg, show_keys);
            Ok(())
        }
    }
}

fn print_llm_config(cfg: &LlmConfigResponse, show_keys: bool) {
    println!("  {} {}", "API URL:".bold(), dash(Some(cfg.api_url.as_str())));
    println!("  {} {}", "Model:  ".bold(), dash(Some(cfg.model_id.as_str())));
    println!();

    if cfg.accounts.is_empty() {
        println!("{}", "No accounts configured.".yellow());
        return;
    }

    println!("  {:<16} {:<24} {:<8} API key", "Name", "Account", "Status");
    println!("  {}", "-".repeat(70));
    for account in &cfg.accounts {
        let key = if show_keys {
            account.api_key.clone()
        } else {
            mask_key(&account.api_key)
        };
        let status = account
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:<24} {:<8} {}",
            truncate(&account.name, 16),
            truncate(&account.account, 24),
            status,
            key
        );
    }
}

/// Show only the last four characters of a secret.
fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(8))
}

pub fn run_llm_save_config(
    console: &Console,
    api_url: Option<String>,
    model_id: Option<String>,
    accounts_file: Option<&Path>,
) -> Result<()> {
    enter(console, "/llm-config")?;

    let accounts = accounts_file
        .map(|path| -> Result<Vec<LlmConfigAccountItem>> {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array of accounts", path.display()))
        })
        .transpose()?;

    let request = LlmConfigRequest {
        api_url,
        model_id,
        accounts,
    };
    if request == LlmConfigRequest::default() {
        anyhow::bail!("nothing to save: pass --api-url, --model-id or --accounts");
    }

    console.api.save_llm_config(&request)?;
    println!("{}", "LLM configuration saved.".green());
    Ok(())
}

// ---------------------------------------------------------------------------
// LLM call logs
// ---------------------------------------------------------------------------

pub fn run_llm_logs(console: &Console, query: LlmLogQuery, format: OutputFormat) -> Result<()> {
    enter(console, "/llm-logs")?;
    let page = console.api.get_llm_log_page(&query)?;

    match format {
        OutputFormat::Json => print_json(&page),
        OutputFormat::Table => {
            print_log_page(&page, query.page.unwrap_or(1));
            Ok(())
        }
    }
}

fn print_log_page(page: &LlmLogPageResult, current: u32) {
    if page.list.is_empty() {
        println!("{}", "No call logs.".yellow());
        return;
    }

    println!(
        "  {:>8} {:<20} {:<16} {:<10} {:>8} {:>12}",
        "ID", "Time", "Task type", "Status", "ms", "Tokens in/out"
    );
    println!("  {}", "-".repeat(80));
    for (i, log) in page.list.iter().enumerate() {
        let tokens = format!(
            "{}/{}",
            log.input_tokens.unwrap_or_default(),
            log.output_tokens.unwrap_or_default()
        );
        let line = format!(
            "  {:>8} {:<20} {:<16} {:<10} {:>8} {:>12}",
            log.id.map(|id| id.to_string()).unwrap_or_default(),
            dash(log.create_time.as_deref()),
            truncate(dash(log.task_type.as_deref()), 16),
            dash(log.status.as_deref()),
            log.request_duration_ms.unwrap_or_default(),
            tokens,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!();
    println!(
        "  page {current} of {} ({} records)",
        page.pages, page.total
    );
}

pub fn run_llm_log(console: &Console, id: i64, format: OutputFormat) -> Result<()> {
    enter(console, "/llm-logs")?;
    let log = console.api.get_llm_log_by_id(id)?;

    match format {
        OutputFormat::Json => print_json(&log),
        OutputFormat::Table => {
            print_log_detail(&log);
            Ok(())
        }
    }
}

fn print_log_detail(log: &LlmRequestLogItem) {
    let fields = [
        ("ID", log.id.map(|v| v.to_string())),
        ("Time", log.create_time.clone()),
        ("Model", log.model_type.clone()),
        ("Account", log.account_name.clone()),
        ("Task type", log.task_type.clone()),
        ("Biz key", log.biz_key.clone()),
        ("Status", log.status.clone()),
        ("Duration ms", log.request_duration_ms.map(|v| v.to_string())),
        ("Input tokens", log.input_tokens.map(|v| v.to_string())),
        ("Output tokens", log.output_tokens.map(|v| v.to_string())),
    ];
    for (label, value) in fields {
        println!("  {:<14} {}", format!("{label}:").bold(), dash(value.as_deref()));
    }

    println!();
    println!("{}", "Prompt".bold().cyan());
    println!("{}", dash(log.prompt.as_deref()));
    println!();
    println!("{}", "Response".bold().cyan());
    println!("{}", dash(log.response.as_deref()));
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

pub fn run_sys_config_list(console: &Console, format: OutputFormat) -> Result<()> {
    enter(console, "/sys-config")?;
    let items = console.api.get_config_list()?;

    match format {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Table => {
            print_sys_config(&items);
            Ok(())
        }
    }
}

fn print_sys_config(items: &[SysConfigItem]) {
    if items.is_empty() {
        println!("{}", "No configuration entries.".yellow());
        return;
    }

    println!("  {:<32} {:<30} Updated", "Key", "Value");
    println!("  {}", "-".repeat(80));
    for item in items {
        println!(
            "  {:<32} {:<30} {}",
            truncate(&item.config_key, 32),
            truncate(dash(item.config_value.as_deref()), 30),
            dash(item.updated_at.as_deref()).dimmed(),
        );
    }
}

pub fn run_sys_config_set(console: &Console, key: &str, value: Option<String>) -> Result<()> {
    enter(console, "/sys-config")?;
    console.api.update_config(
        key,
        &SysConfigUpdateRequest {
            config_value: value,
        },
    )?;
    println!("{} {}", "Updated".green(), key.bold());
    Ok(())
}

// ---------------------------------------------------------------------------
// admin-console config
// ---------------------------------------------------------------------------

/// Show the effective configuration as TOML.
pub fn run_config_show() -> Result<()> {
    println!("{}", config::show_effective_config()?);
    Ok(())
}

/// Write the default configuration file.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

/// Set a single dotted key in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} {key} = {value}", "Set".green());
    Ok(())
}

pub fn run_config_path() -> Result<()> {
    match config::global_config_file() {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", "Could not determine home directory.".yellow()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
