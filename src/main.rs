//! `admin-console` command-line front end.
//!
//! Every command builds a `ConsoleState`, restores the persisted session
//! where a screen would, and prints JSON to stdout. Logs and errors go to
//! stderr so stdout stays machine-readable.

use std::path::PathBuf;
use std::process::ExitCode;

use admin_console::config::{ConfigError, ConsoleConfig, normalize_base_url};
use admin_console::net::types::RegisterData;
use admin_console::services::dashboard::{ChartPeriod, DEFAULT_LIST_LIMIT, ExportFormat, ExportKind};
use admin_console::services::users::{
    BulkAction, CreateUserRequest, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Role, SortBy, SortOrder, UpdateUserRequest,
    UsersFilters,
};
use admin_console::{ApiError, AuthError, ConsoleState};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not signed in; run `admin-console login` first")]
    NotAuthenticated,
    #[error("sign-in failed: {0}")]
    LoginFailed(String),
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("output encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "admin-console", about = "Admin console API client")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:3001/api
    #[arg(long, env = "CONSOLE_API_URL")]
    api_url: Option<String>,

    /// Never contact the backend; serve the offline fallback identity.
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// File holding the persisted session.
    #[arg(long, env = "CONSOLE_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    Logout,
    Whoami,
    Profile,
    Dashboard(DashboardCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct DashboardCommand {
    #[command(subcommand)]
    command: Option<DashboardSubcommand>,
}

#[derive(Subcommand, Debug)]
enum DashboardSubcommand {
    /// Full dashboard, falling back to labelled example data.
    Overview,
    Stats,
    Sales {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },
    Activities {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },
    Chart {
        #[arg(value_enum)]
        series: ChartSeries,
        #[arg(long, default_value_t = ChartPeriod::Month)]
        period: ChartPeriod,
    },
    Export {
        kind: ExportKind,
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartSeries {
    Sales,
    Users,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort_by: Option<SortBy>,
        #[arg(long)]
        sort_order: Option<SortOrder>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = Role::User)]
        role: Role,
    },
    Update {
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: String,
    },
    Toggle {
        id: String,
    },
    ResetPassword {
        id: String,
    },
    Stats,
    Export {
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    Bulk {
        action: BulkAction,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "admin_console=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = normalize_base_url(&url);
    }
    if cli.mock {
        config.use_mock_api = true;
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }

    let state = ConsoleState::from_config(&config)?;
    tracing::debug!(base_url = %config.api.base_url, mock = config.use_mock_api, "console configured");

    match cli.command {
        Command::Login { email, password } => run_login(&state, &email, &password).await,
        Command::Signup { name, email, password, confirm_password } => {
            let data = RegisterData { name, email, password, confirm_password };
            if state.session.register(&data).await {
                print_json(&state.session.snapshot())
            } else {
                Err(CliError::LoginFailed(last_error(&state)))
            }
        }
        Command::ForgotPassword { email } => {
            let message = state.auth.request_password_reset(&email)?;
            print_json(&json!({ "message": message }))
        }
        Command::Logout => {
            state.session.logout().await;
            print_json(&state.session.snapshot())
        }
        Command::Whoami => {
            state.session.initialize().await;
            print_json(&state.session.snapshot())
        }
        Command::Profile => {
            require_login(&state).await?;
            print_json(&state.auth.get_user_profile().await?)
        }
        Command::Dashboard(dashboard) => {
            require_login(&state).await?;
            run_dashboard(&state, dashboard.command.unwrap_or(DashboardSubcommand::Overview)).await
        }
        Command::Users(users) => {
            require_login(&state).await?;
            run_users(&state, users.command).await
        }
    }
}

async fn run_login(state: &ConsoleState, email: &str, password: &str) -> Result<(), CliError> {
    if state.session.login(email, password).await {
        print_json(&state.session.snapshot())
    } else {
        Err(CliError::LoginFailed(last_error(state)))
    }
}

async fn run_dashboard(state: &ConsoleState, command: DashboardSubcommand) -> Result<(), CliError> {
    let dashboard = &state.dashboard;
    match command {
        DashboardSubcommand::Overview => {
            let view = dashboard.load_dashboard().await;
            if view.is_example() {
                tracing::warn!("showing example dashboard data");
            }
            print_json(&view)
        }
        DashboardSubcommand::Stats => print_json(&dashboard.get_stats().await?),
        DashboardSubcommand::Sales { limit } => print_json(&dashboard.get_recent_sales(limit).await?),
        DashboardSubcommand::Activities { limit } => print_json(&dashboard.get_system_activities(limit).await?),
        DashboardSubcommand::Chart { series: ChartSeries::Sales, period } => {
            print_json(&dashboard.get_sales_chart(period).await?)
        }
        DashboardSubcommand::Chart { series: ChartSeries::Users, period } => {
            print_json(&dashboard.get_users_chart(period).await?)
        }
        DashboardSubcommand::Export { kind, format } => print_json(&dashboard.export_data(kind, format).await?),
    }
}

async fn run_users(state: &ConsoleState, command: UsersSubcommand) -> Result<(), CliError> {
    let users = &state.users;
    match command {
        UsersSubcommand::List { page, limit, role, active, search, sort_by, sort_order } => {
            let filters = UsersFilters { role, is_active: active, search, sort_by, sort_order };
            print_json(&users.get_users(page, limit, &filters).await?)
        }
        UsersSubcommand::Get { id } => print_json(&users.get_user_by_id(&id).await?),
        UsersSubcommand::Create { username, email, name, password, role } => {
            let request = CreateUserRequest { username, email, name, password, role };
            print_json(&users.create_user(&request).await?)
        }
        UsersSubcommand::Update { id, username, email, name, role, active } => {
            let request = UpdateUserRequest { username, email, name, role, is_active: active };
            if request.is_empty() {
                return Err(CliError::EmptyUpdate);
            }
            print_json(&users.update_user(&id, &request).await?)
        }
        UsersSubcommand::Delete { id } => print_json(&users.delete_user(&id).await?),
        UsersSubcommand::Toggle { id } => print_json(&users.toggle_user_status(&id).await?),
        UsersSubcommand::ResetPassword { id } => print_json(&users.reset_user_password(&id).await?),
        UsersSubcommand::Stats => print_json(&users.get_user_stats().await?),
        UsersSubcommand::Export { format } => print_json(&users.export_users(format).await?),
        UsersSubcommand::Bulk { action, ids } => print_json(&users.bulk_action(action, &ids).await?),
    }
}

/// Restore the persisted session and refuse to continue without one.
async fn require_login(state: &ConsoleState) -> Result<(), CliError> {
    state.session.initialize().await;
    if state.session.snapshot().requires_login() {
        return Err(CliError::NotAuthenticated);
    }
    Ok(())
}

fn last_error(state: &ConsoleState) -> String {
    state.session.snapshot().error.unwrap_or_else(|| "unknown error".to_owned())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
