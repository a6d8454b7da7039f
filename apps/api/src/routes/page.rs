use axum::response::Html;

/// The browser form. It only talks to the JSON session API.
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
