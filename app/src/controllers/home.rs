use web::config::AppConfig;
use web::{text, Request, Response};

/// Landing line for the views group
pub async fn index(req: Request) -> Response {
    let name = req
        .config()
        .borrow::<AppConfig>()
        .map(|app| app.name.as_str())
        .unwrap_or("LexAI");
    text(format!("{} is running", name))
}
