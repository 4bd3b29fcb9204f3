use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text, Timestamp};
use diesel::{insert_into, select, sql_query, update};
use diesel::{Insertable, Queryable, QueryableByName, Selectable};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use std::str::FromStr;

use crate::db::schema::articles;
use crate::db::{self, Pool};
use crate::topic::Topic;
use crate::types::*;
use crate::users::models::User;
use crate::utils::{parse_id, required, serialize_date};

pub const ARTICLE_NOT_FOUND: &str = "Article not found";

pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

static COMMENT_COUNT: &str = "CAST((SELECT COUNT(*) FROM comments \
     WHERE comments.article_id = articles.article_id) AS INTEGER) AS comment_count";

static SELECT_ARTICLE: &str = "SELECT articles.article_id, articles.title, articles.topic, \
     articles.author, articles.body, articles.created_at, articles.votes, \
     articles.article_img_url";

static SELECT_ARTICLE_SUMMARY: &str = "SELECT articles.article_id, articles.title, \
     articles.topic, articles.author, articles.created_at, articles.votes, \
     articles.article_img_url";

/// A stored article row, as returned by writes.
#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = articles)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    pub votes: i32,
    pub article_img_url: String,
}

/// A single article with its live comment count.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

/// Listing projection: no body, plus the live comment count.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

impl Article {
    pub fn exists(id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(articles::table.find(id))).get_result(connection)
    }

    pub fn load_detail(
        id: i32,
        connection: &mut PgConnection,
    ) -> QueryResult<Option<ArticleDetail>> {
        let query = format!(
            "{}, {} FROM articles WHERE articles.article_id = $1",
            SELECT_ARTICLE, COMMENT_COUNT
        );
        sql_query(query)
            .bind::<Integer, _>(id)
            .get_result::<ArticleDetail>(connection)
            .optional()
    }

    /// `votes = votes + delta` in a single statement, so concurrent
    /// increments are never lost.
    pub fn increment_votes(
        id: i32,
        delta: i32,
        connection: &mut PgConnection,
    ) -> QueryResult<Option<Article>> {
        update(articles::table.find(id))
            .set(articles::votes.eq(articles::votes + delta))
            .returning(Article::as_returning())
            .get_result(connection)
            .optional()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortBy {
    CreatedAt,
    Votes,
    CommentCount,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "articles.created_at",
            SortBy::Votes => "articles.votes",
            SortBy::CommentCount => "comment_count",
        }
    }
}

impl FromStr for SortBy {
    type Err = ApiError;
    fn from_str(s: &str) -> Result<SortBy, ApiError> {
        match s {
            "created_at" => Ok(SortBy::CreatedAt),
            "votes" => Ok(SortBy::Votes),
            "comment_count" => Ok(SortBy::CommentCount),
            _ => Err(ApiError::bad_request()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = ApiError;
    fn from_str(s: &str) -> Result<Order, ApiError> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(ApiError::bad_request()),
        }
    }
}

fn single<'a>(values: &[&'a str]) -> Result<Option<&'a str>, ApiError> {
    match values {
        [] => Ok(None),
        [value] => Ok(Some(*value)),
        _ => Err(ApiError::bad_request()),
    }
}

#[derive(Debug, PartialEq)]
pub struct ArticleQuery {
    pub sort_by: SortBy,
    pub order: Order,
    pub topic: Option<String>,
}

impl ArticleQuery {
    /// Each of `sort_by` and `order` may be given at most once; a repeated
    /// key is rejected like an unknown value.
    pub fn parse(
        sort_by: &[&str],
        order: &[&str],
        topic: Option<&str>,
    ) -> Result<ArticleQuery, ApiError> {
        let sort_by = single(sort_by)?.map_or(Ok(SortBy::CreatedAt), |s| s.parse())?;
        let order = single(order)?.map_or(Ok(Order::Desc), |s| s.parse())?;
        let topic = topic.filter(|t| !t.is_empty()).map(str::to_string);
        Ok(ArticleQuery {
            sort_by,
            order,
            topic,
        })
    }

    fn order_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, articles.article_id ASC",
            self.sort_by.column(),
            self.order.keyword()
        )
    }

    pub fn load(&self, connection: &mut PgConnection) -> QueryResult<Vec<ArticleSummary>> {
        match self.topic {
            Some(ref topic) => {
                let query = format!(
                    "{}, {} FROM articles WHERE articles.topic = $1 {}",
                    SELECT_ARTICLE_SUMMARY,
                    COMMENT_COUNT,
                    self.order_clause()
                );
                sql_query(query).bind::<Text, _>(topic).load(connection)
            }
            None => {
                let query = format!(
                    "{}, {} FROM articles {}",
                    SELECT_ARTICLE_SUMMARY,
                    COMMENT_COUNT,
                    self.order_clause()
                );
                sql_query(query).load(connection)
            }
        }
    }
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    title: String,
    topic: String,
    author: String,
    body: String,
    article_img_url: String,
}

impl NewArticle {
    pub fn insert(&self, connection: &mut PgConnection) -> QueryResult<Article> {
        insert_into(articles::table)
            .values(self)
            .returning(Article::as_returning())
            .get_result(connection)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateArticle {
    title: Option<String>,
    topic: Option<String>,
    author: Option<String>,
    body: Option<String>,
    article_img_url: Option<String>,
}

impl Validate for CreateArticle {
    type Valid = NewArticle;
    fn validate(self) -> Result<NewArticle, ApiError> {
        let title = required(self.title);
        let topic = required(self.topic);
        let author = required(self.author);
        let body = required(self.body);
        match (title, topic, author, body) {
            (Some(title), Some(topic), Some(author), Some(body)) => Ok(NewArticle {
                title,
                topic,
                author,
                body,
                article_img_url: required(self.article_img_url)
                    .unwrap_or_else(|| DEFAULT_ARTICLE_IMG_URL.to_string()),
            }),
            _ => Err(ApiError::bad_request()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteUpdate {
    inc_votes: Option<i32>,
}

impl Validate for VoteUpdate {
    type Valid = i32;
    fn validate(self) -> Result<i32, ApiError> {
        self.inc_votes.ok_or_else(ApiError::bad_request)
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
}

#[get("/articles?<sort_by>&<order>&<topic>")]
pub async fn list(
    pool: &State<Pool>,
    sort_by: Vec<&str>,
    order: Vec<&str>,
    topic: Option<&str>,
) -> ApiResult<ArticlesResponse> {
    let query = ArticleQuery::parse(&sort_by, &order, topic)?;
    let articles = db::run(pool, move |connection| Ok(query.load(connection)?)).await?;
    Ok(Json(ArticlesResponse { articles }))
}

#[get("/articles/<article_id>")]
pub async fn get(
    pool: &State<Pool>,
    article_id: &str,
) -> ApiResult<ArticleResponse<ArticleDetail>> {
    let id = parse_id(article_id)?;
    let article = db::run(pool, move |connection| {
        Article::load_detail(id, connection)?
            .ok_or_else(|| ApiError::not_found(ARTICLE_NOT_FOUND))
    })
    .await?;
    Ok(Json(ArticleResponse { article }))
}

#[post("/articles", data = "<create>")]
pub async fn create(
    pool: &State<Pool>,
    create: JsonBody<'_, CreateArticle>,
) -> Result<Custom<Json<ArticleResponse<Article>>>, ApiError> {
    let new_article = create?.into_inner().validate()?;
    let article = db::run(pool, move |connection| {
        // Checked up front so the insert never trips the foreign keys.
        if !Topic::exists(&new_article.topic, connection)?
            || !User::exists(&new_article.author, connection)?
        {
            return Err(ApiError::bad_request());
        }
        Ok(new_article.insert(connection)?)
    })
    .await?;
    Ok(Custom(Status::Created, Json(ArticleResponse { article })))
}

#[patch("/articles/<article_id>", data = "<vote>")]
pub async fn update_votes(
    pool: &State<Pool>,
    article_id: &str,
    vote: JsonBody<'_, VoteUpdate>,
) -> ApiResult<ArticleResponse<Article>> {
    let id = parse_id(article_id)?;
    let inc_votes = vote?.into_inner().validate()?;
    let article = db::run(pool, move |connection| {
        Article::increment_votes(id, inc_votes, connection)?
            .ok_or_else(|| ApiError::not_found(ARTICLE_NOT_FOUND))
    })
    .await?;
    Ok(Json(ArticleResponse { article }))
}
