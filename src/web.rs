use crate::engine::{Engine, EngineError};
use axum::{
    extract::{Form, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    engine: Arc<Engine>,
}

pub fn start_daemon(engine: Arc<Engine>, listen: &str) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_app(engine, listen).await });
}

async fn start_app(engine: Arc<Engine>, listen: &str) {
    let shared_state = Arc::new(SharedState { engine });

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    let app = Router::new()
        .route("/", get(index).post(ask))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(listen).await.unwrap();
    log::info!("listening on {listen}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn index(State(state): State<Arc<SharedState>>) -> Html<String> {
    let engine = state.engine.clone();
    let preview = tokio::task::block_in_place(move || engine.corpus_preview());

    Html(render_page(&preview_or_notice(preview), None))
}

#[derive(Debug, Deserialize)]
struct AskForm {
    user_text: String,
}

async fn ask(
    State(state): State<Arc<SharedState>>,
    Form(payload): Form<AskForm>,
) -> Html<String> {
    log::debug!("question: {:?}", payload.user_text);

    let engine = state.engine.clone();
    let (preview, output) = tokio::task::block_in_place(move || {
        let preview = engine.corpus_preview();
        let output = engine.answer(&payload.user_text);
        (preview, output)
    });

    let output = match output {
        Ok(html) => html,
        Err(err) => {
            log::error!("query failed: {err}");
            no_data_fragment()
        }
    };

    Html(render_page(&preview_or_notice(preview), Some(&output)))
}

/// A scrape abort means there is no corpus at all; the page says so
/// instead of failing the request.
fn preview_or_notice(preview: Result<String, EngineError>) -> String {
    match preview {
        Ok(preview) => preview,
        Err(err) => {
            log::error!("corpus unavailable: {err}");
            "No news data available.".to_string()
        }
    }
}

fn no_data_fragment() -> String {
    "<p>No news data available.</p>".to_string()
}

fn render_page(preview: &str, output: Option<&str>) -> String {
    let answer_section = output
        .map(|html| format!("<section class=\"answer\">{html}</section>"))
        .unwrap_or_default();

    // preview is normalized text (lowercase alphabetic words), safe to
    // inline without escaping; the answer fragment is HTML on purpose
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>newsrag</title></head>
<body>
<h1>Ask the news</h1>
<section class="preview"><h2>Corpus preview</h2><p>{preview}</p></section>
<form method="post" action="/">
  <input type="text" name="user_text" placeholder="Ask a question about today's news">
  <button type="submit">Ask</button>
</form>
{answer_section}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_without_answer_has_no_answer_section() {
        let page = render_page("price rose today", None);
        assert!(page.contains("price rose today"));
        assert!(page.contains("name=\"user_text\""));
        assert!(!page.contains("class=\"answer\""));
    }

    #[test]
    fn page_embeds_answer_fragment_verbatim() {
        let page = render_page("preview text", Some("<h3>Title</h3><p>Body</p>"));
        assert!(page.contains("<h3>Title</h3><p>Body</p>"));
    }
}
