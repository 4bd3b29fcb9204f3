use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::{delete, insert_into};
use diesel::{Insertable, Queryable, Selectable};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use std::borrow::Cow;

use crate::article::{Article, ARTICLE_NOT_FOUND};
use crate::db::schema::comments;
use crate::db::{self, Pool};
use crate::types::*;
use crate::users::models::User;
use crate::utils::{parse_id, required, serialize_date};

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const COMMENT_NOT_FOUND: &str = "Comment not found";
pub const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

impl Comment {
    pub fn load_for_article(
        article_id: i32,
        connection: &mut PgConnection,
    ) -> QueryResult<Vec<Comment>> {
        comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .select(Comment::as_select())
            .load(connection)
    }

    /// Returns whether a row was removed.
    pub fn delete_by_id(id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
        let deleted = delete(comments::table.find(id)).execute(connection)?;
        Ok(deleted > 0)
    }
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = comments)]
pub struct NewComment {
    article_id: i32,
    author: String,
    body: String,
}

impl NewComment {
    pub fn insert(&self, connection: &mut PgConnection) -> QueryResult<Comment> {
        insert_into(comments::table)
            .values(self)
            .returning(Comment::as_returning())
            .get_result(connection)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentBody {
    username: Option<String>,
    body: Option<String>,
}

impl CommentBody {
    fn into_new_comment(self, article_id: i32) -> Result<NewComment, ApiError> {
        match (required(self.username), required(self.body)) {
            (Some(author), Some(body)) => Ok(NewComment {
                article_id,
                author,
                body,
            }),
            _ => Err(ApiError::BadRequest(Cow::Borrowed(MISSING_FIELDS))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

#[get("/articles/<article_id>/comments")]
pub async fn list(pool: &State<Pool>, article_id: &str) -> ApiResult<CommentsResponse> {
    let id = parse_id(article_id)?;
    let comments = db::run(pool, move |connection| {
        if !Article::exists(id, connection)? {
            return Err(ApiError::not_found(ARTICLE_NOT_FOUND));
        }
        Ok(Comment::load_for_article(id, connection)?)
    })
    .await?;
    Ok(Json(CommentsResponse { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    pool: &State<Pool>,
    article_id: &str,
    details: JsonBody<'_, CommentBody>,
) -> Result<Custom<Json<CommentResponse>>, ApiError> {
    let id = parse_id(article_id)?;
    let new_comment = details?.into_inner().into_new_comment(id)?;
    let comment = db::run(pool, move |connection| {
        // Both parents must exist before the insert; the article is checked first.
        if !Article::exists(id, connection)? {
            return Err(ApiError::not_found(ARTICLE_NOT_FOUND));
        }
        if !User::exists(&new_comment.author, connection)? {
            return Err(ApiError::not_found(USER_NOT_FOUND));
        }
        Ok(new_comment.insert(connection)?)
    })
    .await?;
    Ok(Custom(Status::Created, Json(CommentResponse { comment })))
}

#[delete("/comments/<comment_id>")]
pub async fn remove(pool: &State<Pool>, comment_id: &str) -> Result<Status, ApiError> {
    let id = parse_id(comment_id)?;
    let deleted =
        db::run(pool, move |connection| Ok(Comment::delete_by_id(id, connection)?)).await?;
    if deleted {
        Ok(Status::NoContent)
    } else {
        Err(ApiError::not_found(COMMENT_NOT_FOUND))
    }
}
