use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ResultEngine, Tag, tags, transaction_tags,
    util::{make_slug, normalize_tag_name},
};

use super::{Engine, users::require_user, with_tx};

const SEARCH_LIMIT: u64 = 30;

impl Engine {
    /// Searches a user's tags by optional substring, ordered by name.
    ///
    /// Matching is case-insensitive: the query runs against the slug, which
    /// is the lowercased display name.
    pub async fn search_tags(&self, line_id: &str, query: Option<&str>) -> ResultEngine<Vec<Tag>> {
        let mut find = tags::Entity::find().filter(tags::Column::LineId.eq(line_id));
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            find = find.filter(tags::Column::Slug.contains(q.to_lowercase()));
        }
        let models = find
            .order_by_asc(tags::Column::Name)
            .limit(SEARCH_LIMIT)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Tag::from).collect())
    }

    /// Creates a tag, returning the existing one when the normalized slug is
    /// already taken for this user.
    pub async fn create_tag(&self, line_id: &str, name: &str) -> ResultEngine<Tag> {
        with_tx!(self, |db_tx| {
            require_user(&db_tx, line_id).await?;
            get_or_create_tag(&db_tx, line_id, name).await
        })
    }
}

/// Resolves a raw tag name to its row, inserting it on first use.
pub(super) async fn get_or_create_tag<C: ConnectionTrait>(
    conn: &C,
    line_id: &str,
    name: &str,
) -> ResultEngine<Tag> {
    let display = normalize_tag_name(name)?;
    let slug = make_slug(&display);

    if let Some(model) = tags::Entity::find()
        .filter(tags::Column::LineId.eq(line_id))
        .filter(tags::Column::Slug.eq(slug.as_str()))
        .one(conn)
        .await?
    {
        return Ok(Tag::from(model));
    }

    let active = tags::ActiveModel {
        id: ActiveValue::NotSet,
        line_id: ActiveValue::Set(line_id.to_string()),
        name: ActiveValue::Set(display),
        slug: ActiveValue::Set(slug),
        created_at: ActiveValue::Set(Utc::now()),
    };
    let model = active.insert(conn).await?;
    Ok(Tag::from(model))
}

/// Attaches `names` to a transaction, creating tags as needed. Duplicate
/// slugs within the list collapse to a single link.
pub(super) async fn attach_tags<C: ConnectionTrait>(
    conn: &C,
    line_id: &str,
    transaction_id: Uuid,
    names: &[String],
) -> ResultEngine<Vec<Tag>> {
    let mut attached: Vec<Tag> = Vec::with_capacity(names.len());

    for name in names {
        let tag = get_or_create_tag(conn, line_id, name).await?;
        if attached.iter().any(|t| t.id == tag.id) {
            continue;
        }

        let link = transaction_tags::ActiveModel {
            transaction_id: ActiveValue::Set(transaction_id),
            tag_id: ActiveValue::Set(tag.id),
            created_at: ActiveValue::Set(Utc::now()),
        };
        link.insert(conn).await?;
        attached.push(tag);
    }

    Ok(attached)
}

/// Removes every tag link of a transaction.
pub(super) async fn detach_all_tags<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> ResultEngine<()> {
    transaction_tags::Entity::delete_many()
        .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
        .exec(conn)
        .await?;
    Ok(())
}
