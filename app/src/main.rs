use lexai::{bootstrap, config, routes};
use web::Application;

#[tokio::main]
async fn main() {
    let result = Application::new()
        .config(config::register_all)
        .routes(routes::register)
        .bootstrap(bootstrap::register)
        .run()
        .await;

    if let Err(err) = result {
        tracing::error!(error = %err, "startup failed");
        eprintln!("lexai: {}", err);
        std::process::exit(1);
    }
}
