use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use dotenv::dotenv;
use rocket::tokio::task;
use std::env;

use crate::types::ApiError;

pub mod fixtures;
pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
        Diesel(::diesel::result::Error);
    }
}

const DEFAULT_ENVIRONMENT: &str = "development";

/// Runtime settings resolved from the process environment and the
/// `.env.<environment>` / `.env` files.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: String,
    pub database_url: String,
    pub pool_size: u32,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        let environment =
            env::var("NC_NEWS_ENV").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
        dotenv::from_filename(format!(".env.{}", environment)).ok();
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let pool_size = match env::var("DATABASE_POOL_SIZE") {
            Ok(size) => size.parse::<u32>()?,
            Err(_) => default_pool_size(&environment),
        };

        Ok(Settings {
            environment,
            database_url,
            pool_size,
        })
    }
}

// Hosted databases cap connections per client.
fn default_pool_size(environment: &str) -> u32 {
    match environment {
        "production" => 2,
        _ => 10,
    }
}

/// Checks a connection out of the pool and runs `f` with it on the blocking
/// thread pool, keeping the async workers free while queries run or a
/// checkout waits.
pub async fn run<F, T>(pool: &Pool, f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&mut PgConnection) -> std::result::Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    task::spawn_blocking(move || {
        let mut connection: DbConnection = pool.get()?;
        f(&mut connection)
    })
    .await?
}

pub fn init_pool(settings: &Settings) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(settings.database_url.as_str());
    let pool = Pool::builder().max_size(settings.pool_size).build(manager)?;
    Ok(pool)
}
