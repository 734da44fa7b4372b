use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

const SELECT_USER: &str = "SELECT id, uuid, google_id, email, username, password_hash, \
     firstname, lastname, picture, role, first_login, created_at FROM users";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, condition: &str, value: &str) -> Result<Option<User>, UserError> {
        let query = format!("{SELECT_USER} WHERE {condition} = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, uuid, google_id, email, username, password_hash,
                 firstname, lastname, picture, role, first_login, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(user.uuid)
        .bind(user.google_id.as_deref())
        .bind(user.email.as_ref().map(EmailAddress::as_str))
        .bind(user.username.as_str())
        .bind(user.password_hash.as_deref())
        .bind(user.firstname.as_deref())
        .bind(user.lastname.as_deref())
        .bind(user.picture.as_deref())
        .bind(&user.role)
        .bind(user.first_login)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, &user))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.find_one("username", username.as_str()).await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError> {
        self.find_one("google_id", google_id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.find_one("email", email).await
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                google_id = $2, email = $3, username = $4, password_hash = $5,
                firstname = $6, lastname = $7, picture = $8, role = $9,
                first_login = $10
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.google_id.as_deref())
        .bind(user.email.as_ref().map(EmailAddress::as_str))
        .bind(user.username.as_str())
        .bind(user.password_hash.as_deref())
        .bind(user.firstname.as_deref())
        .bind(user.lastname.as_deref())
        .bind(user.picture.as_deref())
        .bind(&user.role)
        .bind(user.first_login)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }
}

fn map_constraint_error(e: sqlx::Error, user: &User) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_username_key") => {
                    return UserError::UsernameAlreadyExists(user.username.to_string());
                }
                Some("users_email_key") => {
                    return UserError::EmailAlreadyExists(
                        user.email
                            .as_ref()
                            .map(EmailAddress::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    );
                }
                Some("users_google_id_key") => {
                    return UserError::GoogleIdAlreadyExists(
                        user.google_id.clone().unwrap_or_default(),
                    );
                }
                _ => {}
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    uuid: Uuid,
    google_id: Option<String>,
    email: Option<String>,
    username: String,
    password_hash: Option<String>,
    firstname: Option<String>,
    lastname: Option<String>,
    picture: Option<String>,
    role: String,
    first_login: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, UserError> {
        Ok(User {
            id: UserId(self.id),
            uuid: self.uuid,
            google_id: self.google_id,
            email: self.email.map(EmailAddress::new).transpose()?,
            username: Username::new(self.username)?,
            password_hash: self.password_hash,
            firstname: self.firstname,
            lastname: self.lastname,
            picture: self.picture,
            role: self.role,
            first_login: self.first_login,
            created_at: self.created_at,
        })
    }
}
