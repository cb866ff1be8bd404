mod auth;
mod config;
mod credentials;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod provisioning;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use credentials::hash_password;
pub use provisioning::{ProvisionResult, provision_admin};

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Later calls (tests build many rockets) are no-ops.
pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=friendlist=debug
    //   RUST_LOG=info,friendlist::routes=trace
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    let _ = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
}

fn ensure_rocket_secret_key() {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    // Only enforced outside the debug profile.
    if profile != "debug" && std::env::var("ROCKET_SECRET_KEY").is_err() {
        panic!(
            "ROCKET_SECRET_KEY is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    vec![
        RouteSpec {
            path: "/",
            routes: app_routes::home::routes(),
        },
        RouteSpec {
            path: "/",
            routes: app_routes::user::routes(),
        },
        RouteSpec {
            path: "/",
            routes: app_routes::dashboard::routes(),
        },
        RouteSpec {
            path: "/",
            routes: app_routes::contact::routes(),
        },
        RouteSpec {
            path: "/admin",
            routes: app_routes::admin::routes(),
        },
        RouteSpec {
            path: "/health",
            routes: app_routes::health::routes(),
        },
    ]
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_rocket_secret_key();

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    let mut rocket = rocket::custom(figment)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .manage(config);

    for spec in collect_route_specs() {
        rocket = rocket.mount(spec.path, spec.routes);
    }

    rocket.register(
        "/",
        catchers![
            app_routes::error::not_found,
            app_routes::error::unprocessable_entity,
            app_routes::error::internal_error
        ],
    )
}
