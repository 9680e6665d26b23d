use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Set-valued columns that only change through add-to-set / pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    /// `posts.likes`: users who liked the post
    PostLikes,
    /// `users.followers`: users following the owner
    UserFollowers,
    /// `users.following`: users the owner follows
    UserFollowing,
}

impl SetField {
    fn table(&self) -> &'static str {
        match self {
            SetField::PostLikes => "posts",
            SetField::UserFollowers | SetField::UserFollowing => "users",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SetField::PostLikes => "likes",
            SetField::UserFollowers => "followers",
            SetField::UserFollowing => "following",
        }
    }

    /// Human-readable name of the owning entity
    pub fn owner_kind(&self) -> &'static str {
        match self {
            SetField::PostLikes => "Post",
            SetField::UserFollowers | SetField::UserFollowing => "User",
        }
    }
}

/// Atomic membership operations on set-valued fields.
///
/// Every method returns `Ok(None)` when the owning row does not exist and
/// otherwise the authoritative set as it is after the statement ran.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Current members of `field` on `owner`
    async fn members(&self, field: SetField, owner: Uuid) -> Result<Option<Vec<Uuid>>>;

    /// Insert `member` unless already present
    async fn add_to_set(
        &self,
        field: SetField,
        owner: Uuid,
        member: Uuid,
    ) -> Result<Option<Vec<Uuid>>>;

    /// Remove every occurrence of `member`
    async fn pull(&self, field: SetField, owner: Uuid, member: Uuid) -> Result<Option<Vec<Uuid>>>;
}

/// PostgreSQL `UUID[]` implementation
#[derive(Clone)]
pub struct PgSetRepository {
    pool: PgPool,
}

impl PgSetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for PgSetRepository {
    async fn members(&self, field: SetField, owner: Uuid) -> Result<Option<Vec<Uuid>>> {
        let query = format!(
            "SELECT {col} FROM {table} WHERE id = $1",
            col = field.column(),
            table = field.table()
        );

        let members: Option<Vec<Uuid>> = sqlx::query_scalar(&query)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(members)
    }

    async fn add_to_set(
        &self,
        field: SetField,
        owner: Uuid,
        member: Uuid,
    ) -> Result<Option<Vec<Uuid>>> {
        // Single statement: the row lock taken by UPDATE makes the membership
        // test and the append one atomic step.
        let query = format!(
            r#"
            UPDATE {table}
            SET {col} = CASE
                WHEN $2 = ANY({col}) THEN {col}
                ELSE array_append({col}, $2)
            END
            WHERE id = $1
            RETURNING {col}
            "#,
            col = field.column(),
            table = field.table()
        );

        let members: Option<Vec<Uuid>> = sqlx::query_scalar(&query)
            .bind(owner)
            .bind(member)
            .fetch_optional(&self.pool)
            .await?;

        Ok(members)
    }

    async fn pull(&self, field: SetField, owner: Uuid, member: Uuid) -> Result<Option<Vec<Uuid>>> {
        let query = format!(
            r#"
            UPDATE {table}
            SET {col} = array_remove({col}, $2)
            WHERE id = $1
            RETURNING {col}
            "#,
            col = field.column(),
            table = field.table()
        );

        let members: Option<Vec<Uuid>> = sqlx::query_scalar(&query)
            .bind(owner)
            .bind(member)
            .fetch_optional(&self.pool)
            .await?;

        Ok(members)
    }
}
