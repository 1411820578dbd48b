use rocket::*;
use tracing::{info, warn};

mod config;
mod database;
mod leaderboard;
mod logging;
mod requests;
mod service;
#[cfg(test)]
mod tests;

use config::Config;
use requests::IndexPage;
use service::ScoreService;

#[launch]
async fn rocket() -> _ {
    logging::init();
    let config = Config::from_env();

    // Missing settings or an unreachable store do not stop the server,
    // requests fail with a 500 instead
    let service = match config.store_settings() {
        Err(err) => {
            warn!("{}", err);
            ScoreService::unavailable()
        }
        Ok(settings) => match database::connect(&settings).await {
            Ok(store) => {
                info!("using score table {:?}", settings.table);
                ScoreService::new(store)
            }
            Err(err) => {
                warn!("failed to connect to the score store: {}", err);
                ScoreService::unavailable()
            }
        },
    };

    build(service, IndexPage::new(config.index_template))
}

/// Mounts the routes and catchers around an already constructed service.
pub fn build(service: ScoreService, index_page: IndexPage) -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![requests::index, requests::get_scores, requests::save_score],
        )
        .register(
            "/",
            catchers![requests::not_found, requests::internal_error],
        )
        .manage::<ScoreService>(service)
        .manage::<IndexPage>(index_page)
}
