use alumni_app::console::Console;
use alumni_app::provider::firebase;
use alumni_app::splash::SplashView;
use alumni_app::{logging, App, Config, ProfileRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().any(|arg| arg == "--version" || arg == "-V") {
        println!("alumni {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. Set ALUMNI__FIREBASE__API_KEY and \
             ALUMNI__FIREBASE__PROJECT_ID or provide alumni.toml",
            e
        )
    })?;

    logging::init(&config.logging.level);
    tracing::info!("Starting alumni client for project {}", config.firebase.project_id);

    // Backends
    let (auth, store) = firebase::connect(&config.firebase);
    let profiles = ProfileRepository::new(store);

    // Splash timer and session subscription start together
    let app = App::start(auth.clone(), config.splash.duration());

    let console = Console::stdio(auth, profiles, SplashView::new(config.splash.fade_in()));
    let result = console.run(&app).await;

    app.shutdown().await;
    result?;
    Ok(())
}
