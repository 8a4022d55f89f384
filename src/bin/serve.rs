use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use clap::Parser;

use crazy_eights::server::{Lobby, RoomConfig};

#[derive(Parser, Debug)]
#[command(about = "Crazy Eights multiplayer relay server", version)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Seconds a player gets per turn before a forced draw.
    #[arg(long, default_value_t = 30)]
    turn_timeout: u64,
    /// Seconds a disconnected player may reconnect before forfeiting.
    #[arg(long, default_value_t = 30)]
    grace_period: u64,
}

async fn health(lobby: web::Data<Arc<Lobby>>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "rooms": lobby.room_count().await,
        "connections": lobby.connection_count(),
    }))
}

async fn ws(
    req: HttpRequest,
    body: web::Payload,
    lobby: web::Data<Arc<Lobby>>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;
    actix_web::rt::spawn(lobby.get_ref().clone().bridge(session, stream));
    Ok(response)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ServeArgs::parse();
    let lobby = Arc::new(Lobby::new(RoomConfig {
        turn_timeout: Duration::from_secs(args.turn_timeout),
        grace_period: Duration::from_secs(args.grace_period),
        ..RoomConfig::default()
    }));
    log::info!("listening on {}:{}", args.bind, args.port);
    HttpServer::new({
        let lobby = lobby.clone();
        move || {
            App::new()
                .app_data(web::Data::new(lobby.clone()))
                .route("/health", web::get().to(health))
                .route("/ws", web::get().to(ws))
        }
    })
    .bind((args.bind.as_str(), args.port))?
    .run()
    .await?;
    Ok(())
}
