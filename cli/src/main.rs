use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use reqwest::header::{COOKIE, LOCATION};
use serde_json::{Value, json};
use session::access::{EdgeDecision, EdgeGuard, EdgeOptions, RouteClass, RouteTable};
use session::config::SessionConfig;
use session::navigate::NavigationLog;
use session::notify::TracingNotifier;
use session::store::{FileStorage, JarCookies, LocalStore, MemoryStorage};
use session::{HttpClient, SessionContext, SessionRepository, token};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend call failed: {0}")]
    Api(#[from] session::ApiError),
    #[error("login failed: {0}")]
    Login(#[from] session::LoginError),
    #[error("invalid route table: {0}")]
    RouteTable(#[from] session::RouteTableError),
    #[error("invalid token: {0}")]
    Token(#[from] session::TokenError),
    #[error("health check failed: HTTP {0}")]
    HealthCheck(u16),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storefront-cli", about = "Storefront session and access-control tooling")]
struct Cli {
    #[arg(long, env = "STOREFRONT_URL", default_value = "http://127.0.0.1:3000")]
    server_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a token's claims and whether it has expired.
    Decode { token: String },
    /// Show how a path is classified by the route table.
    Route(RouteArgs),
    /// Run the edge decision offline for a path and cookie pair.
    Check(CheckArgs),
    /// Request a page from the server without following redirects.
    Ping(PingArgs),
    /// Sign in against the backend and print the resulting cookie header.
    Login(LoginArgs),
}

#[derive(Args, Debug)]
struct TableArgs {
    #[arg(long, env = "ROUTE_TABLE_PATH")]
    table: Option<PathBuf>,
}

impl TableArgs {
    fn load(&self) -> Result<RouteTable, CliError> {
        match &self.table {
            Some(path) => Ok(RouteTable::load(path)?),
            None => Ok(RouteTable::storefront()),
        }
    }
}

#[derive(Args, Debug)]
struct RouteArgs {
    path: String,
    #[command(flatten)]
    table: TableArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    path: String,
    /// Value of the `token` cookie.
    #[arg(long)]
    token: Option<String>,
    /// Value of the `userData` cookie (user profile JSON).
    #[arg(long)]
    user: Option<String>,
    #[arg(long, env = "EDGE_REJECT_EXPIRED", default_value_t = false)]
    reject_expired: bool,
    #[command(flatten)]
    table: TableArgs,
}

#[derive(Args, Debug)]
struct PingArgs {
    #[arg(long, default_value = "/healthz")]
    path: String,
    /// Raw `Cookie` header to send.
    #[arg(long)]
    cookie: Option<String>,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "STOREFRONT_PASSWORD")]
    password: String,
    /// Overrides `BACKEND_URL`.
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Decode { token } => run_decode(&token),
        Command::Route(args) => run_route(&args),
        Command::Check(args) => run_check(&args),
        Command::Ping(args) => run_ping(&cli.server_url, &args).await,
        Command::Login(args) => run_login(args).await,
    }
}

fn run_decode(raw: &str) -> Result<(), CliError> {
    let claims = token::decode(raw)?;
    print_json(&json!({
        "claims": claims,
        "expires_at_ms": claims.expires_at_ms(),
        "expired": token::is_expired(raw),
    }))
}

fn run_route(args: &RouteArgs) -> Result<(), CliError> {
    let table = args.table.load()?;
    print_json(&describe_class(&args.path, &table.classify(&args.path)))
}

fn run_check(args: &CheckArgs) -> Result<(), CliError> {
    let guard = EdgeGuard::new(args.table.load()?, EdgeOptions { reject_expired_tokens: args.reject_expired });
    let decision = guard.evaluate(&args.path, args.token.as_deref(), args.user.as_deref());
    print_json(&describe_decision(&args.path, decision))
}

async fn run_ping(server_url: &str, args: &PingArgs) -> Result<(), CliError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let url = format!("{}/{}", server_url.trim_end_matches('/'), args.path.trim_start_matches('/'));
    let mut request = client.get(url);
    if let Some(cookie) = &args.cookie {
        request = request.header(COOKIE, cookie);
    }
    let response = request.send().await?;
    let status = response.status();
    if status.is_server_error() {
        return Err(CliError::HealthCheck(status.as_u16()));
    }
    let location = response.headers().get(LOCATION).and_then(|v| v.to_str().ok());
    match location {
        Some(location) => println!("{} -> {location}", status.as_u16()),
        None => println!("{}", status.as_u16()),
    }
    Ok(())
}

async fn run_login(args: LoginArgs) -> Result<(), CliError> {
    let mut config = SessionConfig::from_env();
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    let local: Arc<dyn LocalStore> = match &config.storage_path {
        Some(path) => Arc::new(FileStorage::open(path.clone())),
        None => Arc::new(MemoryStorage::new()),
    };
    let cookies = Arc::new(JarCookies::new());
    let repository = SessionRepository::new(local, cookies.clone());
    let http = HttpClient::new(config.backend_url.clone())?.with_session(repository.clone());
    let ctx = SessionContext::new(repository, Arc::new(NavigationLog::new()), Arc::new(TracingNotifier));

    let user = session::api::login(&http, &ctx, &args.email, &args.password).await?;
    print_json(&json!({
        "user": user,
        "home": user.role.home().path(),
        "address_complete": user.address_complete(),
        "cookie": cookies.header_value(),
    }))
}

fn describe_class(path: &str, class: &RouteClass) -> Value {
    match class {
        RouteClass::Bypass => json!({ "path": path, "class": "bypass" }),
        RouteClass::Public => json!({ "path": path, "class": "public" }),
        RouteClass::Protected { role, prefix, known } => json!({
            "path": path,
            "class": "protected",
            "role": role,
            "prefix": prefix,
            "known": known,
        }),
        RouteClass::Authenticated => json!({ "path": path, "class": "authenticated" }),
    }
}

fn describe_decision(path: &str, decision: EdgeDecision) -> Value {
    match decision {
        EdgeDecision::Allow => json!({ "path": path, "decision": "allow" }),
        EdgeDecision::Redirect(target) => json!({ "path": path, "decision": "redirect", "location": target.path() }),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
