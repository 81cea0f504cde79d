use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eng_workbook::{config::Settings, content, handlers, paths, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eng_workbook=debug,exercise_grader=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();

  let library = content::load_lessons(&settings.lessons_dir).expect("Failed to load lessons");
  tracing::info!(
    "Loaded {} lessons ({} exercises) from {}",
    library.lessons.len(),
    library.exercise_count(),
    settings.lessons_dir.display()
  );

  if !Path::new(paths::GRADER_JS).exists() {
    tracing::warn!(
      "{} not found; exercises will not be interactive. Build with --features rebuild-wasm",
      paths::GRADER_JS
    );
  }

  let state = AppState::new(library, settings.static_dir.clone());
  let app = handlers::router(state);

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
