#![recursion_limit = "256"]

#[macro_use]
extern crate rocket;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod api;
pub mod article;
pub mod comment;
pub mod db;
pub mod topic;
pub mod types;
pub mod users;
pub mod utils;

use rocket::{Build, Rocket};

/// Builds the application around an already constructed pool.
pub fn rocket(pool: db::Pool) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .mount("/api", routes![api::endpoints, api::ping])
        .mount("/api", routes![topic::list, topic::create])
        .mount(
            "/api",
            routes![
                article::list,
                article::get,
                article::create,
                article::update_votes
            ],
        )
        .mount("/api", routes![comment::list, comment::add, comment::remove])
        .mount("/api", routes![users::list])
        .register(
            "/",
            catchers![
                api::not_found,
                api::bad_request,
                api::unprocessable,
                api::internal_error
            ],
        )
}
