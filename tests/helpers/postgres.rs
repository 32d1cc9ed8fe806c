use super::TestServer;
use axum::Router;
use chrono::{DateTime, Utc};
pub(crate) use deadpool_diesel::postgres::{
    Manager as TestManager, Pool as TestPool, Runtime as TestRuntime,
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use std::sync::Arc;
use studygram_progress::engine::{ProgressEngine, RequirementMode};
use studygram_progress::init_test_router;
use studygram_progress::model::Achievement;
use studygram_progress::schema;
use studygram_progress::store::{GamificationStore, PgStore};
use uuid::Uuid;

const CREATE_TABLES: &str =
    include_str!("../../migrations/2025-06-01-000000_create_progress_tables/up.sql");
const SEED_CATALOG: &str =
    include_str!("../../migrations/2025-06-01-000100_seed_achievement_catalog/up.sql");

// test structs

#[derive(Insertable)]
#[diesel(table_name = schema::courses)]
struct TestNewCourse<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = schema::study_sessions)]
struct TestNewStudySession {
    pub user_id: Uuid,
    pub duration_minutes: i32,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::assessment_attempts)]
struct TestNewAssessmentAttempt {
    pub user_id: Uuid,
    pub assessment_id: i64,
}

#[derive(Insertable)]
#[diesel(table_name = schema::group_members)]
struct TestNewGroupMember {
    pub group_id: i64,
    pub user_id: Uuid,
}

// test infra setup

pub fn get_test_db_pool(db_url: &str) -> TestPool {
    let manager = TestManager::new(db_url, TestRuntime::Tokio1);
    TestPool::builder(manager)
        .max_size(15)
        .build()
        .expect("Failed to create test database pool")
}

/// Engine, router and pool bound to a throwaway schema of the database
/// named by `TEST_DATABASE_URL`.
pub struct PgTestEnvironment {
    pub server: TestServer,
    pub engine: ProgressEngine,
    pub pool: TestPool,
    admin_pool: TestPool,
    schema: String,
}

/// Returns `None` (and the calling test passes vacuously) when
/// `TEST_DATABASE_URL` is not set.
pub async fn setup_pg_environment(catalog: Vec<Achievement>) -> Option<PgTestEnvironment> {
    let Ok(db_url) = std::env::var("TEST_DATABASE_URL") else {
        println!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };

    let schema = format!("progress_test_{}", Uuid::new_v4().simple());
    let admin_pool = get_test_db_pool(&db_url);
    run_sql(&admin_pool, format!("CREATE SCHEMA {}", schema)).await;

    let separator = if db_url.contains('?') { '&' } else { '?' };
    let scoped_url = format!("{}{}options=-csearch_path%3D{}", db_url, separator, schema);
    let pool = get_test_db_pool(&scoped_url);
    run_sql(&pool, CREATE_TABLES.to_string()).await;

    let store = PgStore::new(pool.clone());
    for achievement in &catalog {
        store
            .save_achievement(achievement)
            .await
            .expect("Failed to save test achievement");
    }

    let engine = ProgressEngine::new(Arc::new(store), RequirementMode::FirstMatch);
    let app: Router = init_test_router(engine.clone());
    let server = TestServer::new(app).expect("Failed to create TestServer");

    Some(PgTestEnvironment {
        server,
        engine,
        pool,
        admin_pool,
        schema,
    })
}

impl PgTestEnvironment {
    pub async fn apply_seed_catalog(&self) {
        run_sql(&self.pool, SEED_CATALOG.to_string()).await;
    }

    pub async fn teardown(self) {
        run_sql(
            &self.admin_pool,
            format!("DROP SCHEMA {} CASCADE", self.schema),
        )
        .await;
    }

    pub async fn add_course(&self, user_id: Uuid) {
        self.insert(move |conn| {
            diesel::insert_into(schema::courses::table)
                .values(&TestNewCourse {
                    user_id,
                    title: "Linear Algebra",
                })
                .execute(conn)
        })
        .await;
    }

    pub async fn add_study_session(&self, user_id: Uuid, minutes: i32, ended: bool) {
        self.insert(move |conn| {
            diesel::insert_into(schema::study_sessions::table)
                .values(&TestNewStudySession {
                    user_id,
                    duration_minutes: minutes,
                    ended_at: ended.then(Utc::now),
                })
                .execute(conn)
        })
        .await;
    }

    pub async fn add_assessment_attempt(&self, user_id: Uuid) {
        self.insert(move |conn| {
            diesel::insert_into(schema::assessment_attempts::table)
                .values(&TestNewAssessmentAttempt {
                    user_id,
                    assessment_id: 1,
                })
                .execute(conn)
        })
        .await;
    }

    pub async fn add_group_membership(&self, user_id: Uuid, group_id: i64) {
        self.insert(move |conn| {
            diesel::insert_into(schema::group_members::table)
                .values(&TestNewGroupMember { group_id, user_id })
                .execute(conn)
        })
        .await;
    }

    async fn insert<F>(&self, query: F)
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<usize> + Send + 'static,
    {
        let conn = self.pool.get().await.expect("Failed to get conn for insert");
        conn.interact(query)
            .await
            .expect("Database interaction failed during insert")
            .expect("Failed to insert test row");
    }
}

async fn run_sql(pool: &TestPool, sql: String) {
    let conn = pool.get().await.expect("Failed to get conn for setup");
    conn.interact(move |conn| conn.batch_execute(&sql))
        .await
        .expect("Database interaction failed during setup")
        .expect("Failed to run setup SQL");
}
