use chrono::{SecondsFormat, Utc};
use rocket::serde::json::Json;
use serde_json::Value;

use crate::types::{BAD_REQUEST, INTERNAL_ERROR};

lazy_static! {
    static ref ENDPOINTS: Value = json!({
        "GET /api": {
            "description": "serves up a json representation of all the available endpoints of the api"
        },
        "GET /api/ping": {
            "description": "health check",
            "exampleResponse": { "message": "OK", "timestamp": "2024-01-01T00:00:00.000Z" }
        },
        "GET /api/topics": {
            "description": "serves an array of all topics",
            "queries": [],
            "exampleResponse": {
                "topics": [{ "slug": "football", "description": "Footie!" }]
            }
        },
        "POST /api/topics": {
            "description": "adds a topic; slug and description are required",
            "exampleRequest": { "slug": "football", "description": "Footie!" },
            "exampleResponse": {
                "topic": { "slug": "football", "description": "Footie!" }
            }
        },
        "GET /api/articles": {
            "description": "serves an array of all articles without their body",
            "queries": ["topic", "sort_by", "order"],
            "sortBy": ["created_at", "votes", "comment_count"],
            "order": ["asc", "desc"],
            "exampleResponse": {
                "articles": [{
                    "article_id": 1,
                    "title": "Seafood substitutions are increasing",
                    "topic": "cooking",
                    "author": "weegembump",
                    "created_at": "2018-05-30T15:59:13.341Z",
                    "votes": 0,
                    "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
                    "comment_count": 6
                }]
            }
        },
        "POST /api/articles": {
            "description": "adds an article; title, topic, author and body are required",
            "exampleRequest": {
                "title": "Seafood substitutions are increasing",
                "topic": "cooking",
                "author": "weegembump",
                "body": "Text from the article..",
                "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700"
            },
            "exampleResponse": {
                "article": {
                    "article_id": 14,
                    "title": "Seafood substitutions are increasing",
                    "topic": "cooking",
                    "author": "weegembump",
                    "body": "Text from the article..",
                    "created_at": "2018-05-30T15:59:13.341Z",
                    "votes": 0,
                    "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700"
                }
            }
        },
        "GET /api/articles/:article_id": {
            "description": "serves a single article with its comment_count",
            "exampleResponse": {
                "article": {
                    "article_id": 1,
                    "title": "Seafood substitutions are increasing",
                    "topic": "cooking",
                    "author": "weegembump",
                    "body": "Text from the article..",
                    "created_at": "2018-05-30T15:59:13.341Z",
                    "votes": 0,
                    "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
                    "comment_count": 6
                }
            }
        },
        "PATCH /api/articles/:article_id": {
            "description": "adds inc_votes (which may be negative) to the article's votes",
            "exampleRequest": { "inc_votes": 1 },
            "exampleResponse": {
                "article": {
                    "article_id": 1,
                    "title": "Seafood substitutions are increasing",
                    "topic": "cooking",
                    "author": "weegembump",
                    "body": "Text from the article..",
                    "created_at": "2018-05-30T15:59:13.341Z",
                    "votes": 1,
                    "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700"
                }
            }
        },
        "GET /api/articles/:article_id/comments": {
            "description": "serves the comments of an article, newest first",
            "exampleResponse": {
                "comments": [{
                    "comment_id": 1,
                    "body": "Text of the comment",
                    "article_id": 1,
                    "author": "weegembump",
                    "votes": 0,
                    "created_at": "2018-05-30T15:59:13.341Z"
                }]
            }
        },
        "POST /api/articles/:article_id/comments": {
            "description": "adds a comment to an article; username and body are required",
            "exampleRequest": { "username": "weegembump", "body": "Text of the comment" },
            "exampleResponse": {
                "comment": {
                    "comment_id": 19,
                    "body": "Text of the comment",
                    "article_id": 1,
                    "author": "weegembump",
                    "votes": 0,
                    "created_at": "2018-05-30T15:59:13.341Z"
                }
            }
        },
        "DELETE /api/comments/:comment_id": {
            "description": "deletes a comment and responds with no content"
        },
        "GET /api/users": {
            "description": "serves an array of all users",
            "exampleResponse": {
                "users": [{
                    "username": "weegembump",
                    "name": "Gemma",
                    "avatar_url": "https://example.com/avatar.png"
                }]
            }
        }
    });
}

#[get("/")]
pub fn endpoints() -> Json<&'static Value> {
    Json(&*ENDPOINTS)
}

#[get("/ping")]
pub fn ping() -> Json<Value> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    Json(json!({ "message": "OK", "timestamp": timestamp }))
}

#[catch(404)]
pub fn not_found() -> Json<Value> {
    Json(json!({ "message": "Not found" }))
}

// Bodies Rocket itself refuses before a handler runs.
#[catch(400)]
pub fn bad_request() -> Json<Value> {
    Json(json!({ "msg": BAD_REQUEST }))
}

#[catch(422)]
pub fn unprocessable() -> Json<Value> {
    Json(json!({ "msg": BAD_REQUEST }))
}

#[catch(500)]
pub fn internal_error() -> Json<Value> {
    Json(json!({ "msg": INTERNAL_ERROR }))
}
