use super::{ActivityQuery, GamificationStore};
use crate::errors::AppError;
use crate::model::activity::{FILE_VIEW, NewUserAchievement, SESSION_COMPLETE};
use crate::model::achievement::AchievementRow;
use crate::model::{
    Achievement, ActivityStats, NewXpActivity, ProgressRow, UserProgress, XpActivity,
};
use crate::schema::{
    achievements::dsl as ach_dsl, assessment_attempts::dsl as aa_dsl, courses::dsl as courses_dsl,
    group_members::dsl as gm_dsl, study_sessions::dsl as ss_dsl,
    user_achievements::dsl as ua_dsl, user_progress::dsl as up_dsl,
    xp_activities::dsl as xa_dsl,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use deadpool_diesel::Runtime;
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// PostgreSQL backend on a deadpool-diesel connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        PgStore { pool }
    }

    pub fn connect(conn_str: &str, max_size: u32) -> anyhow::Result<Self> {
        let manager = Manager::new(conn_str, Runtime::Tokio1);
        let pool = Pool::builder(manager).max_size(max_size as usize).build()?;
        Ok(PgStore::new(pool))
    }

    async fn run<T, F>(&self, query: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DieselError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.pool.get().await?;
        debug!("DB connection object obtained from pool for interaction");

        match conn.interact(query).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(diesel_err)) => {
                error!("Diesel query failed within interaction: {:?}", diesel_err);
                Err(AppError::from(diesel_err))
            }
            Err(interact_err) => Err(AppError::from(interact_err)),
        }
    }
}

fn ensure_progress(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<usize> {
    diesel::insert_into(up_dsl::user_progress)
        .values(&ProgressRow::new(user_id))
        .on_conflict(up_dsl::user_id)
        .do_nothing()
        .execute(conn)
}

fn lock_progress(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<ProgressRow> {
    up_dsl::user_progress
        .find(user_id)
        .select(ProgressRow::as_select())
        .for_update()
        .first::<ProgressRow>(conn)
}

fn unlocked_names(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<Vec<String>> {
    ua_dsl::user_achievements
        .filter(ua_dsl::user_id.eq(user_id))
        .order((ua_dsl::unlocked_at.asc(), ua_dsl::achievement_name.asc()))
        .select(ua_dsl::achievement_name)
        .load::<String>(conn)
}

/// The only write path for XP. Must run inside a transaction.
fn grant_xp_locked(conn: &mut PgConnection, activity: &NewXpActivity) -> QueryResult<ProgressRow> {
    ensure_progress(conn, activity.user_id)?;
    let mut progress = lock_progress(conn, activity.user_id)?;
    progress.gain_xp(activity.xp_earned, Utc::now());

    diesel::update(up_dsl::user_progress.find(activity.user_id))
        .set(&progress)
        .execute(conn)?;
    diesel::insert_into(xa_dsl::xp_activities)
        .values(activity)
        .execute(conn)?;

    Ok(progress)
}

fn count_activities(conn: &mut PgConnection, user_id: Uuid, kind: &str) -> QueryResult<i64> {
    xa_dsl::xp_activities
        .filter(xa_dsl::user_id.eq(user_id))
        .filter(xa_dsl::activity_type.eq(kind))
        .count()
        .get_result::<i64>(conn)
}

#[async_trait]
impl GamificationStore for PgStore {
    async fn load_progress(&self, user_id: Uuid) -> Result<Option<UserProgress>, AppError> {
        self.run(move |conn| {
            let Some(row) = up_dsl::user_progress
                .find(user_id)
                .select(ProgressRow::as_select())
                .first::<ProgressRow>(conn)
                .optional()?
            else {
                return Ok(None);
            };
            let names = unlocked_names(conn, user_id)?;
            Ok(Some(row.with_achievements(names)))
        })
        .await
    }

    async fn grant_xp(&self, activity: NewXpActivity) -> Result<ProgressRow, AppError> {
        self.run(move |conn| {
            conn.transaction::<_, DieselError, _>(|tx_conn| grant_xp_locked(tx_conn, &activity))
        })
        .await
    }

    async fn unlock_achievement(
        &self,
        user_id: Uuid,
        achievement: &Achievement,
    ) -> Result<bool, AppError> {
        let name = achievement.name.clone();
        let reward = i64::from(achievement.xp_reward);

        self.run(move |conn| {
            conn.transaction::<_, DieselError, _>(|tx_conn| {
                // the row lock comes before the insert: its foreign key check
                // takes a share lock that would deadlock with a later FOR UPDATE
                ensure_progress(tx_conn, user_id)?;
                lock_progress(tx_conn, user_id)?;
                let inserted = diesel::insert_into(ua_dsl::user_achievements)
                    .values(&NewUserAchievement {
                        user_id,
                        achievement_name: &name,
                    })
                    .on_conflict((ua_dsl::user_id, ua_dsl::achievement_name))
                    .do_nothing()
                    .execute(tx_conn)?;
                if inserted == 0 {
                    return Ok(false);
                }

                grant_xp_locked(tx_conn, &NewXpActivity::unlock(user_id, &name, reward))?;
                Ok(true)
            })
        })
        .await
    }

    async fn record_streak_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<UserProgress, AppError> {
        self.run(move |conn| {
            conn.transaction::<_, DieselError, _>(|tx_conn| {
                ensure_progress(tx_conn, user_id)?;
                let mut progress = lock_progress(tx_conn, user_id)?;
                if progress.register_streak_day(day) {
                    diesel::update(up_dsl::user_progress.find(user_id))
                        .set(&progress)
                        .execute(tx_conn)?;
                }
                let names = unlocked_names(tx_conn, user_id)?;
                Ok(progress.with_achievements(names))
            })
        })
        .await
    }

    async fn activity_stats(&self, user_id: Uuid) -> Result<ActivityStats, AppError> {
        self.run(move |conn| {
            conn.build_transaction()
                .read_only()
                .repeatable_read()
                .run::<_, DieselError, _>(|tx_conn| {
                    let courses_uploaded = courses_dsl::courses
                        .filter(courses_dsl::user_id.eq(user_id))
                        .count()
                        .get_result::<i64>(tx_conn)?;
                    let study_minutes = ss_dsl::study_sessions
                        .filter(ss_dsl::user_id.eq(user_id))
                        .select(sum(ss_dsl::duration_minutes))
                        .first::<Option<i64>>(tx_conn)?
                        .unwrap_or(0);
                    let completed_sessions = ss_dsl::study_sessions
                        .filter(ss_dsl::user_id.eq(user_id))
                        .filter(ss_dsl::ended_at.is_not_null())
                        .count()
                        .get_result::<i64>(tx_conn)?;
                    let assessment_attempts = aa_dsl::assessment_attempts
                        .filter(aa_dsl::user_id.eq(user_id))
                        .count()
                        .get_result::<i64>(tx_conn)?;
                    let groups_joined = gm_dsl::group_members
                        .filter(gm_dsl::user_id.eq(user_id))
                        .count()
                        .get_result::<i64>(tx_conn)?;

                    Ok(ActivityStats {
                        courses_uploaded,
                        study_minutes,
                        completed_sessions,
                        assessment_attempts,
                        files_viewed: count_activities(tx_conn, user_id, FILE_VIEW)?,
                        sessions_completed: count_activities(tx_conn, user_id, SESSION_COMPLETE)?,
                        groups_joined,
                    })
                })
        })
        .await
    }

    async fn load_catalog(&self) -> Result<Vec<Achievement>, AppError> {
        let rows = self
            .run(|conn| {
                ach_dsl::achievements
                    .order((ach_dsl::created_at.asc(), ach_dsl::name.asc()))
                    .select(AchievementRow::as_select())
                    .load::<AchievementRow>(conn)
            })
            .await?;

        let catalog = rows
            .into_iter()
            .filter_map(|row| match Achievement::try_from(row) {
                Ok(achievement) => Some(achievement),
                Err(err) => {
                    warn!("Skipping catalog entry: {:#}", err);
                    None
                }
            })
            .collect();
        Ok(catalog)
    }

    async fn save_achievement(&self, achievement: &Achievement) -> Result<(), AppError> {
        let row = AchievementRow::try_from(achievement).map_err(|err| {
            AppError::InternalServerError(
                anyhow!(err).context("Failed to encode achievement requirements"),
            )
        })?;

        self.run(move |conn| {
            diesel::insert_into(ach_dsl::achievements)
                .values(&row)
                .on_conflict(ach_dsl::name)
                .do_update()
                .set(&row)
                .execute(conn)
        })
        .await?;
        Ok(())
    }

    async fn list_activities(
        &self,
        user_id: Uuid,
        query: ActivityQuery,
    ) -> Result<Vec<XpActivity>, AppError> {
        self.run(move |conn| {
            let mut select = xa_dsl::xp_activities
                .select(XpActivity::as_select())
                .filter(xa_dsl::user_id.eq(user_id))
                .into_boxed();
            if let Some(since) = query.since {
                select = select.filter(xa_dsl::created_at.ge(since));
            }
            if let Some(until) = query.until {
                select = select.filter(xa_dsl::created_at.le(until));
            }
            select
                .order((xa_dsl::created_at.desc(), xa_dsl::id.desc()))
                .limit(query.limit)
                .load::<XpActivity>(conn)
        })
        .await
    }
}
