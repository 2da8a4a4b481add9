use actix_web::{middleware, App, HttpServer};
use log::info;
use mrtblog_backend_rs::{config::AppConfig, configure_app, db::Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    let store = Store::new(config.database_url());
    store.init().await.map_err(std::io::Error::other)?;

    let bind = (config.server_host.clone(), config.server_port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(configure_app(store.clone(), config.clone()))
    })
    .bind(bind.clone())?;
    info!("server started at http://{}:{}", bind.0, bind.1);
    server.run().await
}
