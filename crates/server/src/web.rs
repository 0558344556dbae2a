//! Single-page web form for interactive predictions.
//!
//! Routes:
//! - `GET /`        empty form
//! - `POST /`       url-encoded form submission, re-renders the form with one message
//! - `GET /health`  bundle identity and service counters as JSON

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    extract::{FromRef, State, rejection::FormRejection},
    response::Html,
    routing::get,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ServeConfig;
use crate::error::PredictError;
use crate::inference::{InferenceService, PredictionRequest};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub start_time: Instant,
}

impl FromRef<AppState> for Arc<InferenceService> {
    fn from_ref(input: &AppState) -> Self {
        input.service.clone()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// What to show under the form after a submission
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Prediction(String),
    Rejected(String),
    Failed(String),
}

impl Outcome {
    fn text(&self) -> String {
        match self {
            Outcome::Prediction(genre) => format!("Predicted Genre: {}", genre),
            Outcome::Rejected(message) => message.clone(),
            Outcome::Failed(reason) => format!("Error during prediction: {}", reason),
        }
    }
}

async fn index() -> Html<String> {
    Html(render_page(None))
}

async fn submit(
    State(service): State<Arc<InferenceService>>,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> Html<String> {
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            warn!("Rejected form submission: {}", rejection.body_text());
            return Html(render_page(Some(&Outcome::Failed(rejection.body_text()))));
        }
    };

    // Tree traversal is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || service.predict(&request)).await;

    let outcome = match outcome {
        Ok(Ok(genre)) => Outcome::Prediction(genre),
        Ok(Err(PredictError::Validation(message))) => Outcome::Rejected(message),
        Ok(Err(err)) => {
            warn!("Prediction failed: {}", err);
            Outcome::Failed(err.to_string())
        }
        Err(err) => {
            warn!("Prediction task did not complete: {}", err);
            Outcome::Failed("internal error".to_string())
        }
    };
    Html(render_page(Some(&outcome)))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    bundle_version: String,
    created_at: String,
    classes: Vec<String>,
    n_features: usize,
    classified: u64,
    uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let manifest = state.service.bundle().manifest();
    Json(HealthResponse {
        status: "ok",
        bundle_version: manifest.bundle_version.to_string(),
        created_at: manifest.created_at.to_rfc3339(),
        classes: manifest.classes.clone(),
        n_features: manifest.n_features,
        classified: state.service.classified_count(),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

// ============================================================================
// Page rendering
// ============================================================================

/// Escape text for inclusion in HTML content or attribute values
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Optional inputs: (form name, label, numeric)
const FORM_FIELDS: &[(&str, &str, bool)] = &[
    ("language", "Language", false),
    ("country", "Country", false),
    ("content_rating", "Content Rating", false),
    ("rating", "Rating", true),
    ("votes", "Votes", true),
    ("budget", "Budget (USD)", true),
    ("duration", "Duration (min)", true),
];

fn render_page(outcome: Option<&Outcome>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Movie Genre Predictor</title>\n</head>\n<body>\n\
         <h1>Movie Genre Predictor</h1>\n<form method=\"post\" action=\"/\">\n\
         <label for=\"description\">Description</label><br>\n\
         <textarea id=\"description\" name=\"description\" rows=\"5\" cols=\"60\"></textarea><br>\n",
    );
    for &(name, label, numeric) in FORM_FIELDS {
        let kind = if numeric { "number\" step=\"any" } else { "text" };
        html.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n<input id=\"{name}\" name=\"{name}\" type=\"{kind}\"><br>\n"
        ));
    }
    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    if let Some(outcome) = outcome {
        let class = match outcome {
            Outcome::Prediction(_) => "prediction",
            Outcome::Rejected(_) => "validation",
            Outcome::Failed(_) => "error",
        };
        html.push_str(&format!(
            "<p class=\"{}\">{}</p>\n",
            class,
            html_escape(&outcome.text())
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

// ============================================================================
// Router and server
// ============================================================================

pub fn make_app(service: Arc<InferenceService>) -> Router {
    let state = AppState {
        service,
        start_time: Instant::now(),
    };

    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run_server(service: Arc<InferenceService>, config: &ServeConfig) -> Result<()> {
    let app = make_app(service);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving the genre form on http://{}", addr);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(html_escape("Drama"), "Drama");
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(
            Outcome::Prediction("Action".to_string()).text(),
            "Predicted Genre: Action"
        );
        assert_eq!(
            Outcome::Failed("bad number".to_string()).text(),
            "Error during prediction: bad number"
        );
    }

    #[test]
    fn test_render_page_without_outcome_has_form() {
        let page = render_page(None);
        assert!(page.contains("name=\"description\""));
        assert!(page.contains("name=\"content_rating\""));
        assert!(!page.contains("<p class="));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(3725)), "1:02:05");
    }
}
