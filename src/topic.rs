use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::{insert_into, select};
use diesel::{Insertable, Queryable, Selectable};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;

use crate::db::schema::topics;
use crate::db::{self, Pool};
use crate::types::*;
use crate::utils::required;

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

impl Topic {
    pub fn load_all(connection: &mut PgConnection) -> QueryResult<Vec<Topic>> {
        topics::table.select(Topic::as_select()).load(connection)
    }

    pub fn exists(slug: &str, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(topics::table.find(slug))).get_result(connection)
    }
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = topics)]
pub struct NewTopic {
    slug: String,
    description: String,
}

impl NewTopic {
    pub fn insert(&self, connection: &mut PgConnection) -> QueryResult<Topic> {
        insert_into(topics::table)
            .values(self)
            .returning(Topic::as_returning())
            .get_result(connection)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTopic {
    slug: Option<String>,
    description: Option<String>,
}

impl Validate for CreateTopic {
    type Valid = NewTopic;
    fn validate(self) -> Result<NewTopic, ApiError> {
        match (required(self.slug), required(self.description)) {
            (Some(slug), Some(description)) => Ok(NewTopic { slug, description }),
            _ => Err(ApiError::bad_request()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    topic: Topic,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

#[get("/topics")]
pub async fn list(pool: &State<Pool>) -> ApiResult<TopicsResponse> {
    let topics = db::run(pool, |connection| Ok(Topic::load_all(connection)?)).await?;
    Ok(Json(TopicsResponse { topics }))
}

#[post("/topics", data = "<create>")]
pub async fn create(
    pool: &State<Pool>,
    create: JsonBody<'_, CreateTopic>,
) -> Result<Custom<Json<TopicResponse>>, ApiError> {
    let new_topic = create?.into_inner().validate()?;
    let topic = db::run(pool, move |connection| Ok(new_topic.insert(connection)?)).await?;
    Ok(Custom(Status::Created, Json(TopicResponse { topic })))
}
