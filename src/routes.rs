use crate::{
    api::{checkin, user},
    auth::middleware::auth_middleware,
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, middleware::from_fn, web};
use serde_json::json;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // finish() only rejects a zero period or burst
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(health);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _| AppError::invalid(err.to_string()).into()),
            )
            .service(
                web::scope("/checkin")
                    // /checkin
                    .service(web::resource("").route(web::post().to(checkin::check_in)))
                    // /checkin/checkout
                    .service(web::resource("/checkout").route(web::put().to(checkin::check_out)))
                    // /checkin/active
                    .service(web::resource("/active").route(web::get().to(checkin::active)))
                    // /checkin/history
                    .service(web::resource("/history").route(web::get().to(checkin::history)))
                    // /checkin/clients
                    .service(web::resource("/clients").route(web::get().to(checkin::list_clients))),
            )
            .service(
                web::scope("/users")
                    // /users/team
                    .service(web::resource("/team").route(web::get().to(user::team))),
            ),
    );
}
