use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, UserRole, users,
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a user profile, rejecting a `line_id` that is already taken.
    pub async fn create_user(
        &self,
        username: &str,
        picture_url: Option<&str>,
        role: UserRole,
        line_id: &str,
    ) -> ResultEngine<User> {
        let username = normalize_required_text(username, "username")?;
        let line_id = normalize_required_text(line_id, "line_id")?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::LineId.eq(line_id.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(line_id));
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                username,
                picture_url: picture_url.map(ToString::to_string),
                role,
                line_id,
                created_at: now,
                updated_at: now,
            };
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            Ok(user)
        })
    }

    /// Lists every user profile, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Fetches a user profile by its messaging identity.
    pub async fn user_by_line_id(&self, line_id: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::LineId.eq(line_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    /// Reconciles a profile against upstream data: only fields that actually
    /// differ are written, and `updated_at` moves only when something changed.
    pub async fn sync_user(
        &self,
        line_id: &str,
        username: Option<&str>,
        picture_url: Option<&str>,
        role: Option<UserRole>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, line_id).await?;

            let mut active: users::ActiveModel = model.clone().into();
            let mut changed = false;

            if let Some(username) = username
                && username != model.username
            {
                active.username = ActiveValue::Set(username.to_string());
                changed = true;
            }
            if let Some(picture_url) = picture_url
                && Some(picture_url) != model.picture_url.as_deref()
            {
                active.picture_url = ActiveValue::Set(Some(picture_url.to_string()));
                changed = true;
            }
            if let Some(role) = role
                && role.as_str() != model.role
            {
                active.role = ActiveValue::Set(role.as_str().to_string());
                changed = true;
            }

            let model = if changed {
                active.updated_at = ActiveValue::Set(Utc::now());
                active.update(&db_tx).await?
            } else {
                model
            };
            User::try_from(model)
        })
    }

    /// Partially updates a profile; provided fields are written as-is.
    pub async fn update_user(
        &self,
        line_id: &str,
        username: Option<&str>,
        picture_url: Option<&str>,
        role: Option<UserRole>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, line_id).await?;

            let mut active: users::ActiveModel = model.into();
            if let Some(username) = username {
                active.username = ActiveValue::Set(normalize_required_text(username, "username")?);
            }
            if let Some(picture_url) = picture_url {
                active.picture_url = ActiveValue::Set(Some(picture_url.to_string()));
            }
            if let Some(role) = role {
                active.role = ActiveValue::Set(role.as_str().to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// Deletes a user profile by its messaging identity.
    pub async fn delete_user(&self, line_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, line_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}

/// Looks up the owning user row, failing with `KeyNotFound` when missing.
pub(super) async fn require_user<C: ConnectionTrait>(
    conn: &C,
    line_id: &str,
) -> ResultEngine<users::Model> {
    users::Entity::find()
        .filter(users::Column::LineId.eq(line_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
}
