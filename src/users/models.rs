use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use diesel::{Queryable, Selectable};

use crate::db::schema::users;

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = users)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn load_all(connection: &mut PgConnection) -> QueryResult<Vec<User>> {
        users::table.select(User::as_select()).load(connection)
    }

    pub fn exists(name: &str, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(users::table.filter(users::username.eq(name)))).get_result(connection)
    }
}
