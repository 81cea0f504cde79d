pub mod lessons;

use askama::Template;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::filters;
use crate::state::AppState;

/// A lesson entry on the index page
pub struct LessonSummary {
  pub number: u8,
  pub title: String,
  pub description: Option<String>,
  pub exercise_count: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub lessons: Vec<LessonSummary>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/lesson/{number}", get(lessons::lesson_page))
    .route("/health", get(health))
    .nest_service("/static", ServeDir::new(&state.static_dir))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
  let lessons = state
    .library
    .lessons
    .iter()
    .map(|l| LessonSummary {
      number: l.lesson,
      title: l.title.clone(),
      description: l.description.clone(),
      exercise_count: l.exercises.len(),
    })
    .collect();

  let template = IndexTemplate { lessons };
  Html(template.render().unwrap_or_default())
}

pub async fn health() -> &'static str {
  "ok"
}

pub use lessons::lesson_page;
