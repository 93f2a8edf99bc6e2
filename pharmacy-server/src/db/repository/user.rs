//! User Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::Role;
use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{PatientSummary, User, UserCreate};

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = parse_id(USER_TABLE, id)?;
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user (signup)
    ///
    /// 角色在此一次性写入，之后没有任何修改角色的操作。
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email (unique index is the backstop)
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User with email '{}' already exists",
                data.email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

        let user = User {
            id: None,
            name: data.name,
            email: data.email,
            hash_pass,
            role: data.role,
            created_at: now_millis(),
        };

        // hash_pass is skip_serializing on the model, so insert via explicit SET
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    role = $role,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("name", user.name.clone()))
            .bind(("email", user.email.clone()))
            .bind(("hash_pass", user.hash_pass.clone()))
            .bind(("role", user.role))
            .bind(("created_at", user.created_at))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// All customers (id, name, email), used by doctors to pick a patient
    pub async fn find_customers(&self) -> RepoResult<Vec<PatientSummary>> {
        let mut result = self
            .base
            .db()
            .query("SELECT id, name, email FROM user WHERE role = $role ORDER BY name")
            .bind(("role", Role::Customer))
            .await?;
        let customers: Vec<PatientSummary> = result.take(0)?;
        Ok(customers)
    }

    /// Total user count (reporting)
    pub async fn count(&self) -> RepoResult<i64> {
        self.base.count_table(USER_TABLE).await
    }
}
