/**
 * EduSync Command Line Entry Point
 *
 * Restores the persisted session, optionally logs in, then loads and
 * prints the results view (live or offline sample data).
 *
 * Usage: edusync [email password]
 */
use edusync::client::dashboard::Dashboard;
use edusync::client::{
    AuthSessionManager, AvailabilityProber, Config, Credentials, FileSessionStore, ResultsView,
    TracingNotifier,
};
use edusync::shared::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "edusync=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = match std::env::var("EDUSYNC_CONFIG") {
        Ok(path) => Config::from_app(AppConfig::load(&path)?),
        Err(_) => Config::new(),
    };
    tracing::info!(server_url = %config.server_url(), "starting");

    let session_file = config
        .session_file()
        .ok_or("no data directory available for the session file")?;
    let store = Arc::new(FileSessionStore::new(session_file));
    let prober = AvailabilityProber::from_config(&config);
    let manager = Arc::new(AuthSessionManager::new(config, store, Arc::new(TracingNotifier))?);
    manager.start();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [email, password] = args.as_slice() {
        if let Err(e) = manager.login(&Credentials::new(email.as_str(), password.as_str())).await {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }

    let Some(user) = manager.current_user() else {
        println!("Not signed in. Usage: edusync <email> <password>");
        return Ok(());
    };
    println!("Signed in as {} ({})", user.display_name(), user.role);

    let view = ResultsView::new(&manager, prober, user.is_student());
    view.mount().await;
    let state = view.state();

    if let Some(banner) = &state.banner {
        println!("! {} [{}]", banner.message, banner.retry_label);
    } else if state.error.is_none() {
        match Dashboard::load(manager.api(), &user).await {
            Ok(dashboard) => {
                if let Some(stats) = dashboard.stats {
                    println!(
                        "Completed {} / {} assessments, average {}%",
                        stats.completed, stats.total, stats.avg_score
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "dashboard unavailable"),
        }
    }
    if let Some(error) = &state.error {
        eprintln!("{}", error);
    }

    for row in view.rows() {
        println!(
            "{:<28} {:<30} {:<20} {:>10} {}",
            row.assessment,
            row.course,
            row.student,
            row.score,
            if row.passed { "Passed" } else { "Failed" }
        );
    }

    view.unmount();
    manager.stop_revalidation();
    Ok(())
}
