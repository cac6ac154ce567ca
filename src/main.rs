use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use mongodb::Client;
use tracing_subscriber::EnvFilter;

use pocketledger::{configure, token::TokenService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let uri = std::env::var("MONGODB_URI").expect("You need to add the MONGODB_URI to the env");
    let secret = std::env::var("TOKEN_SECRET").expect("You need to add the TOKEN_SECRET to the env");

    let client = Client::with_uri_str(uri).await.expect("failed to connect");
    tracing::info!("connected to the database");

    let tokens = TokenService::new(secret.as_bytes());
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .configure(configure)
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
