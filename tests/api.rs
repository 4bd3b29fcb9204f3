//! End-to-end behaviour against PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL` set and `cargo test -- --ignored`. Each test
//! owns a single pooled connection inside a transaction that is never
//! committed, with the schema and seed rows recreated at the start of it.

use diesel::connection::Connection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Error as PoolError};
use r2d2::CustomizeConnection;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::{json, Value};
use std::env;

use nc_news::db::{fixtures, Pool};

#[derive(Debug)]
struct SeededTransaction;

impl CustomizeConnection<PgConnection, PoolError> for SeededTransaction {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), PoolError> {
        connection
            .begin_test_transaction()
            .map_err(PoolError::QueryError)?;
        fixtures::reset(connection).map_err(PoolError::QueryError)
    }
}

fn client() -> Client {
    let url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = Pool::builder()
        .max_size(1)
        .connection_customizer(Box::new(SeededTransaction))
        .build(ConnectionManager::<PgConnection>::new(url))
        .expect("test database pool");
    Client::tracked(nc_news::rocket(pool)).expect("valid rocket instance")
}

fn json(response: LocalResponse) -> Value {
    response.into_json::<Value>().expect("json body")
}

fn get(client: &Client, path: &str) -> (Status, Value) {
    let response = client.get(path).dispatch();
    (response.status(), json(response))
}

fn post(client: &Client, path: &str, body: Value) -> (Status, Value) {
    let response = client
        .post(path)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    (response.status(), json(response))
}

fn patch(client: &Client, path: &str, body: Value) -> (Status, Value) {
    let response = client
        .patch(path)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    (response.status(), json(response))
}

fn is_sorted<T: PartialOrd>(values: &[T], descending: bool) -> bool {
    values.windows(2).all(|pair| {
        if descending {
            pair[0] >= pair[1]
        } else {
            pair[0] <= pair[1]
        }
    })
}

fn numbers(items: &Value, key: &str) -> Vec<i64> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item[key].as_i64().expect("number"))
        .collect()
}

fn strings(items: &Value, key: &str) -> Vec<String> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item[key].as_str().expect("string").to_string())
        .collect()
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_topics() {
    let client = client();
    let (status, body) = get(&client, "/api/topics");
    assert_eq!(status, Status::Ok);
    assert_eq!(strings(&body["topics"], "slug"), vec!["mitch", "cats", "paper"]);
    assert!(body["topics"][0]["description"].is_string());
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn creates_topics() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/topics",
        json!({
            "slug": "new-topic",
            "description": "A new topic description.",
            "extra_property": "ignore this"
        }),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(
        body["topic"],
        json!({ "slug": "new-topic", "description": "A new topic description." })
    );

    let (_, body) = get(&client, "/api/topics");
    assert_eq!(body["topics"].as_array().map(Vec::len), Some(4));
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn serves_article_with_comment_count() {
    let client = client();
    let (status, body) = get(&client, "/api/articles/1");
    assert_eq!(status, Status::Ok);
    let article = &body["article"];
    assert_eq!(article["article_id"], 1);
    assert_eq!(article["title"], "Living in the shadow of a great man");
    assert_eq!(article["topic"], "mitch");
    assert_eq!(article["author"], "butter_bridge");
    assert_eq!(article["body"], "I find this existence challenging");
    assert_eq!(article["created_at"], "2020-07-09T20:11:00.000Z");
    assert_eq!(article["votes"], 100);
    assert!(article["article_img_url"].is_string());
    assert_eq!(article["comment_count"], 4);

    let (_, body) = get(&client, "/api/articles/2");
    assert_eq!(body["article"]["comment_count"], 0);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn repeated_reads_are_identical() {
    let client = client();
    let first = get(&client, "/api/articles/1");
    let second = get(&client, "/api/articles/1");
    assert_eq!(first, second);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn unknown_article_is_not_found() {
    let client = client();
    let (status, body) = get(&client, "/api/articles/9999");
    assert_eq!(status, Status::NotFound);
    assert_eq!(body, json!({ "msg": "Article not found" }));

    let (status, body) = patch(&client, "/api/articles/9999", json!({ "inc_votes": 1 }));
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["msg"], "Article not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_articles_newest_first_without_body() {
    let client = client();
    let (status, body) = get(&client, "/api/articles");
    assert_eq!(status, Status::Ok);
    let articles = body["articles"].as_array().expect("articles");
    assert_eq!(articles.len(), 6);
    for article in articles {
        assert!(article.get("body").is_none());
        assert!(article["comment_count"].is_i64());
        assert!(article["article_img_url"].is_string());
    }
    assert!(is_sorted(&strings(&body["articles"], "created_at"), true));

    let counts: Vec<(i64, i64)> = numbers(&body["articles"], "article_id")
        .into_iter()
        .zip(numbers(&body["articles"], "comment_count"))
        .collect();
    for (id, count) in counts {
        let expected = match id {
            1 => 4,
            3 | 5 => 2,
            6 => 1,
            _ => 0,
        };
        assert_eq!(count, expected, "comment_count of article {}", id);
    }
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn sorts_articles_by_whitelisted_columns() {
    let client = client();
    for order in &["asc", "desc"] {
        let descending = *order == "desc";

        let (status, body) = get(&client, &format!("/api/articles?sort_by=votes&order={}", order));
        assert_eq!(status, Status::Ok);
        assert!(is_sorted(&numbers(&body["articles"], "votes"), descending));

        let (_, body) = get(
            &client,
            &format!("/api/articles?sort_by=comment_count&order={}", order),
        );
        assert!(is_sorted(&numbers(&body["articles"], "comment_count"), descending));

        let (_, body) = get(&client, &format!("/api/articles?sort_by=created_at&order={}", order));
        assert!(is_sorted(&strings(&body["articles"], "created_at"), descending));
    }

    let (_, body) = get(&client, "/api/articles?order=asc");
    assert_eq!(body["articles"][0]["title"], "Z");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn filters_articles_by_topic() {
    let client = client();
    let (status, body) = get(&client, "/api/articles?topic=cats");
    assert_eq!(status, Status::Ok);
    assert_eq!(strings(&body["articles"], "topic"), vec!["cats"]);

    let (status, body) = get(&client, "/api/articles?topic=not-a-topic");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["articles"], json!([]));
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn created_article_reads_back() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/articles",
        json!({
            "title": "New Article",
            "topic": "mitch",
            "author": "butter_bridge",
            "body": "This is a new article body.",
            "article_img_url": "https://example.com/image.jpg",
            "extra_property": "ignore this"
        }),
    );
    assert_eq!(status, Status::Created);
    let created = body["article"].clone();
    assert_eq!(created["votes"], 0);
    assert_eq!(created["title"], "New Article");
    assert!(created["created_at"].is_string());
    assert!(created.get("extra_property").is_none());

    let id = created["article_id"].as_i64().expect("article_id");
    let (status, body) = get(&client, &format!("/api/articles/{}", id));
    assert_eq!(status, Status::Ok);
    let article = &body["article"];
    let keys = [
        "article_id",
        "title",
        "topic",
        "author",
        "body",
        "created_at",
        "votes",
        "article_img_url",
    ];
    for key in &keys {
        assert_eq!(article[*key], created[*key], "{}", key);
    }
    assert_eq!(article["comment_count"], 0);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn created_article_gets_default_image() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/articles",
        json!({ "title": "Plain", "topic": "paper", "author": "lurker", "body": "words" }),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(body["article"]["article_img_url"], nc_news::article::DEFAULT_ARTICLE_IMG_URL);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn article_needs_existing_topic_and_author() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/articles",
        json!({ "title": "T", "topic": "mitch", "author": "non_existent_author", "body": "b" }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["msg"], "Bad request");

    let (status, body) = post(
        &client,
        "/api/articles",
        json!({
            "title": "T",
            "topic": "non_existent_topic",
            "author": "butter_bridge",
            "body": "b"
        }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["msg"], "Bad request");

    let (_, body) = get(&client, "/api/articles");
    assert_eq!(body["articles"].as_array().map(Vec::len), Some(6));
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn vote_increments_are_additive() {
    let client = client();
    let (status, body) = patch(&client, "/api/articles/1", json!({ "inc_votes": 1 }));
    assert_eq!(status, Status::Ok);
    assert_eq!(body["article"]["votes"], 101);
    assert_eq!(body["article"]["article_id"], 1);

    let (_, body) = patch(&client, "/api/articles/1", json!({ "inc_votes": -1 }));
    assert_eq!(body["article"]["votes"], 100);

    let (_, body) = patch(&client, "/api/articles/2", json!({ "inc_votes": -10 }));
    assert_eq!(body["article"]["votes"], -10);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_comments_newest_first() {
    let client = client();
    let (status, body) = get(&client, "/api/articles/1/comments");
    assert_eq!(status, Status::Ok);
    assert_eq!(numbers(&body["comments"], "article_id"), vec![1, 1, 1, 1]);
    assert!(is_sorted(&strings(&body["comments"], "created_at"), true));

    let (status, body) = get(&client, "/api/articles/2/comments");
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({ "comments": [] }));

    let (status, body) = get(&client, "/api/articles/999999/comments");
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["msg"], "Article not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn posts_comments() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/articles/2/comments",
        json!({
            "username": "butter_bridge",
            "body": "A nice comment.",
            "extra_property": "ignore this"
        }),
    );
    assert_eq!(status, Status::Created);
    let comment = &body["comment"];
    assert!(comment["comment_id"].is_i64());
    assert_eq!(comment["article_id"], 2);
    assert_eq!(comment["author"], "butter_bridge");
    assert_eq!(comment["body"], "A nice comment.");
    assert_eq!(comment["votes"], 0);
    assert!(comment["created_at"].is_string());
    assert!(comment.get("extra_property").is_none());

    let (_, body) = get(&client, "/api/articles/2");
    assert_eq!(body["article"]["comment_count"], 1);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn comment_needs_existing_article_and_user() {
    let client = client();
    let (status, body) = post(
        &client,
        "/api/articles/9999/comments",
        json!({ "username": "butter_bridge", "body": "This is a new comment." }),
    );
    assert_eq!(status, Status::NotFound);
    assert_eq!(body, json!({ "msg": "Article not found" }));

    let (status, body) = post(
        &client,
        "/api/articles/1/comments",
        json!({ "username": "non_existent_user", "body": "This is a new comment." }),
    );
    assert_eq!(status, Status::NotFound);
    assert_eq!(body, json!({ "msg": "User not found" }));

    let (status, body) = post(
        &client,
        "/api/articles/9999/comments",
        json!({ "username": "non_existent_user", "body": "Both missing." }),
    );
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["msg"], "Article not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn deletes_comments() {
    let client = client();
    let response = client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::NoContent);
    assert!(response.into_string().unwrap_or_default().is_empty());

    let response = client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json(response), json!({ "msg": "Comment not found" }));

    let response = client.delete("/api/comments/9999").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json(response)["msg"], "Comment not found");

    let (_, body) = get(&client, "/api/articles/1");
    assert_eq!(body["article"]["comment_count"], 3);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_users() {
    let client = client();
    let (status, body) = get(&client, "/api/users");
    assert_eq!(status, Status::Ok);
    assert_eq!(
        strings(&body["users"], "username"),
        vec!["butter_bridge", "icellusedkars", "rogersop", "lurker"]
    );
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn vote_overflow_is_bad_request() {
    let client = client();
    // The out-of-range error aborts the test transaction, so nothing follows it.
    let (status, body) = patch(&client, "/api/articles/1", json!({ "inc_votes": i32::MAX }));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["msg"], "Bad request");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn duplicate_topic_is_bad_request() {
    let client = client();
    // The unique violation aborts the test transaction, so nothing follows it.
    let (status, body) = post(
        &client,
        "/api/topics",
        json!({ "slug": "mitch", "description": "again" }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["msg"], "Bad request");
}
