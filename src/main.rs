use admin_console_core::{
    AuthSession, ConsoleState, HttpRepository, Navigator, PrivilegeSet, RepositoryState,
    StaticSession,
    config::{AppConfig, Env},
    notifications::TracingNotifier,
};
use std::{env, process::ExitCode, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Route inspector for the console: builds the route index exactly as the client does,
/// logs it, and optionally runs the authorization gate for one pathname.
///
/// Usage: `admin-console [pathname]`. Privileges are read from `CONSOLE_PRIVILEGES`
/// (comma-separated); leaving it unset simulates a session that is still resolving.
fn main() -> ExitCode {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging, pretty locally and JSON in production.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "admin_console_core=debug,admin_console=debug".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Console core starting in {:?} mode", config.env);

    // 3. Route Index (fatal when the declaration is malformed)
    let repo = Arc::new(HttpRepository::new(&config.api_base_url)) as RepositoryState;
    let state = match ConsoleState::new(config, repo) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: route declaration is invalid");
            return ExitCode::FAILURE;
        }
    };

    for (pattern, privileges) in state.routes.iter() {
        let required: Vec<&str> = privileges.iter().collect();
        tracing::info!(pattern, ?required, "route");
    }

    // 4. Optional gate check for one pathname.
    let Some(target) = env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let session = match env::var("CONSOLE_PRIVILEGES") {
        Ok(raw) => StaticSession::signed_in(PrivilegeSet::parse_list(&raw)),
        Err(_) => StaticSession::resolving(PrivilegeSet::new()),
    };

    let mut router = state.router("/");
    router.navigate(&target);
    let location = router.location().clone();

    let mut gate = state.gate();
    let decision = gate.evaluate(&location, session.privileges(), &mut router, &TracingNotifier);

    tracing::info!(
        pathname = %location.pathname,
        params = ?location.params,
        ?decision,
        landed_on = %router.location().href(),
        "gate evaluated"
    );

    ExitCode::SUCCESS
}
