//! Schema creation and the seed data set shared by the `seed` command and
//! the integration tests.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::QueryResult;

static SCHEMA: &str = include_str!("sql/schema.sql");
static SEED: &str = include_str!("sql/seed.sql");

/// Drops and recreates every table.
pub fn create_schema(connection: &mut PgConnection) -> QueryResult<()> {
    connection.batch_execute(SCHEMA)
}

/// Recreates the schema and loads the seed rows.
pub fn reset(connection: &mut PgConnection) -> QueryResult<()> {
    create_schema(connection)?;
    connection.batch_execute(SEED)
}
