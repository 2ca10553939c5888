//! PostgreSQL Repository Implementation

use kernel::error::conversions::{is_foreign_key_violation, is_unique_violation};
use kernel::id::UserId;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::model::{
    ReactionCounts, ReactionState, Subject, SubjectKind, ToggleAction, Toggled,
};
use crate::domain::repository::ReactionRepository;
use crate::domain::services::{Write, transition};
use crate::error::{ReactionError, ReactionResult};

/// Statements for one reaction table
///
/// Table names are fixed per subject kind, never interpolated from input.
struct Statements {
    select: &'static str,
    lock: &'static str,
    insert: &'static str,
    update: &'static str,
    delete: &'static str,
    counts: &'static str,
}

const POST_STATEMENTS: Statements = Statements {
    select: "SELECT liked FROM post_reactions WHERE post_id = $1 AND user_id = $2",
    lock: "SELECT liked FROM post_reactions WHERE post_id = $1 AND user_id = $2 FOR UPDATE",
    insert: "INSERT INTO post_reactions (post_id, user_id, liked) VALUES ($1, $2, $3)",
    update: "UPDATE post_reactions SET liked = $3 WHERE post_id = $1 AND user_id = $2",
    delete: "DELETE FROM post_reactions WHERE post_id = $1 AND user_id = $2",
    counts: r#"
        SELECT
            COUNT(*) FILTER (WHERE liked) AS likes,
            COUNT(*) FILTER (WHERE NOT liked) AS dislikes
        FROM post_reactions
        WHERE post_id = $1
    "#,
};

const COMMENT_STATEMENTS: Statements = Statements {
    select: "SELECT liked FROM comment_reactions WHERE comment_id = $1 AND user_id = $2",
    lock: "SELECT liked FROM comment_reactions WHERE comment_id = $1 AND user_id = $2 FOR UPDATE",
    insert: "INSERT INTO comment_reactions (comment_id, user_id, liked) VALUES ($1, $2, $3)",
    update: "UPDATE comment_reactions SET liked = $3 WHERE comment_id = $1 AND user_id = $2",
    delete: "DELETE FROM comment_reactions WHERE comment_id = $1 AND user_id = $2",
    counts: r#"
        SELECT
            COUNT(*) FILTER (WHERE liked) AS likes,
            COUNT(*) FILTER (WHERE NOT liked) AS dislikes
        FROM comment_reactions
        WHERE comment_id = $1
    "#,
};

fn statements(kind: SubjectKind) -> &'static Statements {
    match kind {
        SubjectKind::Post => &POST_STATEMENTS,
        SubjectKind::Comment => &COMMENT_STATEMENTS,
    }
}

/// PostgreSQL-backed reaction repository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn toggle_in(
        tx: &mut Transaction<'static, Postgres>,
        sql: &'static Statements,
        subject: Subject,
        user_id: UserId,
        action: ToggleAction,
    ) -> ReactionResult<Toggled> {
        let liked = sqlx::query_scalar::<_, bool>(sql.lock)
            .bind(subject.id())
            .bind(user_id.get())
            .fetch_optional(&mut **tx)
            .await?;

        let step = transition(ReactionState::from_liked(liked), action);

        let query = match step.write {
            Write::Insert(stance) => keyed(sql.insert, subject, user_id).bind(stance.liked()),
            Write::Update(stance) => keyed(sql.update, subject, user_id).bind(stance.liked()),
            Write::Delete => keyed(sql.delete, subject, user_id),
        };

        query
            .execute(&mut **tx)
            .await
            .map_err(map_write_error)?;

        let counts = fetch_counts(&mut **tx, sql, subject).await?;

        Ok(Toggled {
            state: step.next,
            counts,
        })
    }
}

async fn fetch_counts<'e, E>(
    executor: E,
    sql: &'static Statements,
    subject: Subject,
) -> ReactionResult<ReactionCounts>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let (likes, dislikes) = sqlx::query_as::<_, (i64, i64)>(sql.counts)
        .bind(subject.id())
        .fetch_one(executor)
        .await?;

    Ok(ReactionCounts { likes, dislikes })
}

/// Bind `$1` (subject id) and `$2` (user id), shared by every statement
fn keyed(
    sql: &'static str,
    subject: Subject,
    user_id: UserId,
) -> Query<'static, Postgres, PgArguments> {
    sqlx::query(sql).bind(subject.id()).bind(user_id.get())
}

fn map_write_error(err: sqlx::Error) -> ReactionError {
    if is_unique_violation(&err) {
        ReactionError::Conflict
    } else if is_foreign_key_violation(&err) {
        ReactionError::SubjectNotFound
    } else {
        ReactionError::Storage(err)
    }
}

impl ReactionRepository for PgReactionRepository {
    async fn toggle(
        &self,
        subject: Subject,
        user_id: UserId,
        action: ToggleAction,
    ) -> ReactionResult<Toggled> {
        let sql = statements(subject.kind());
        let mut tx = self.pool.begin().await?;

        match Self::toggle_in(&mut tx, sql, subject, user_id, action).await {
            Ok(toggled) => {
                tx.commit().await?;
                Ok(toggled)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Reaction rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn counts(&self, subject: Subject) -> ReactionResult<ReactionCounts> {
        fetch_counts(&self.pool, statements(subject.kind()), subject).await
    }

    async fn state_of(&self, subject: Subject, user_id: UserId) -> ReactionResult<ReactionState> {
        let liked = sqlx::query_scalar::<_, bool>(statements(subject.kind()).select)
            .bind(subject.id())
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(ReactionState::from_liked(liked))
    }
}
