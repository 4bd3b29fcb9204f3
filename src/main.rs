use std::env;

use nc_news::db::{self, fixtures, Settings};

fn seed(pool: &db::Pool) -> db::Result<()> {
    let mut connection = pool.get()?;
    fixtures::reset(&mut connection)?;
    Ok(())
}

#[rocket::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings: {}", e);
            std::process::exit(1);
        }
    };
    let pool = match db::init_pool(&settings) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if env::args().nth(1).as_deref() == Some("seed") {
        if let Err(e) = seed(&pool) {
            eprintln!("failed to seed {}: {}", settings.environment, e);
            std::process::exit(1);
        }
        println!("seeded {} database", settings.environment);
        return;
    }

    // Rocket installs the logger when the instance is built.
    let rocket = nc_news::rocket(pool);
    log::info!(
        "starting in {} with {} database connections",
        settings.environment,
        settings.pool_size
    );
    if let Err(e) = rocket.launch().await {
        eprintln!("server stopped: {}", e);
        std::process::exit(1);
    }
}
