//! Types and functions for storing and loading items from the database.
//!
//! Each function runs exactly one statement on the connection it is given.

use crate::infra::{
    database::DbConnection,
    error::{ApiResult, InternalError},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{
    mysql::{MySql, MySqlArguments},
    query::Query,
};
use tracing::{instrument, Instrument};
use utoipa::ToSchema;

/// The writable fields of an item.
///
/// Values are taken as the client sent them and bound by their JSON kind.
/// Missing fields are written as `NULL`, and it is up to the database to
/// coerce or reject whatever it receives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemFields {
    /// The item's name.
    #[schema(value_type = Option<String>, example = "Widget")]
    pub name: Option<Value>,
    /// How many of the item there are.
    #[schema(value_type = Option<i32>, example = 5)]
    pub quantity: Option<Value>,
    /// The item's description.
    #[schema(value_type = Option<String>, example = "A very interesting item")]
    pub description: Option<Value>,
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id.
    pub id: i32,
    /// The item's name.
    #[schema(example = "Widget")]
    pub name: String,
    /// How many of the item there are.
    #[schema(example = 5)]
    pub quantity: i32,
    /// The item's description.
    #[schema(example = "A very interesting item")]
    pub description: Option<String>,
}

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Binds `name`, `quantity` and `description`, in that order.
fn bind_fields<'q>(query: MySqlQuery<'q>, fields: &'q ItemFields) -> MySqlQuery<'q> {
    let query = bind_value(query, fields.name.as_ref());
    let query = bind_value(query, fields.quantity.as_ref());
    bind_value(query, fields.description.as_ref())
}

/// Binds a JSON value as the closest MySQL parameter type.
///
/// Arrays and objects are sent as their JSON text.
fn bind_value<'q>(query: MySqlQuery<'q>, value: Option<&'q Value>) -> MySqlQuery<'q> {
    match value {
        None | Some(Value::Null) => query.bind(None::<&str>),
        Some(Value::Bool(b)) => query.bind(*b),
        Some(Value::String(s)) => query.bind(s.as_str()),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => query.bind(i),
            (None, Some(u)) => query.bind(u),
            (None, None) => query.bind(n.as_f64()),
        },
        Some(other) => query.bind(other.to_string()),
    }
}

/// Inserts an item, returning its generated id.
#[instrument(skip(conn))]
pub async fn create_item(conn: &mut DbConnection, fields: &ItemFields) -> ApiResult<i32> {
    tracing::info!("Creating item");
    let query = sqlx::query(
        r#"
        INSERT INTO items (name, quantity, description)
        VALUES (?, ?, ?)
        "#,
    );
    let result = bind_fields(query, fields).execute(&mut *conn).await?;
    let id = i32::try_from(result.last_insert_id())
        .map_err(|e| InternalError::Other(format!("generated id out of range: {e}")))?;
    tracing::info!("Created item {}", id);
    Ok(id)
}

/// Read an item.
#[instrument(skip(conn))]
pub async fn fetch_item(conn: &mut DbConnection, id: i64) -> ApiResult<Option<Item>> {
    tracing::info!("Reading item");
    let item = sqlx::query_as::<_, Item>(
        r#"
        SELECT id, name, quantity, description FROM items
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .instrument(tracing::info_span!("fetch_optional"))
    .await?;
    tracing::info!("Found item: {:?}", item);
    Ok(item)
}

/// Lists all items, in whatever order the database returns them.
#[instrument(skip(conn))]
pub async fn list_items(conn: &mut DbConnection) -> ApiResult<Vec<Item>> {
    tracing::info!("Listing items");
    let items = sqlx::query_as::<_, Item>(
        r#"
        SELECT id, name, quantity, description FROM items
        "#,
    )
    .fetch_all(&mut *conn)
    .instrument(tracing::info_span!("fetch_all"))
    .await?;
    tracing::info!("Listed {} items", items.len());
    Ok(items)
}

/// Overwrites every writable field of an item, returning the number of rows matched.
#[instrument(skip(conn))]
pub async fn update_item(conn: &mut DbConnection, id: i64, fields: &ItemFields) -> ApiResult<u64> {
    tracing::info!("Updating item");
    let query = sqlx::query(
        r#"
        UPDATE items
        SET name = ?, quantity = ?, description = ?
        WHERE id = ?
        "#,
    );
    let result = bind_fields(query, fields)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    tracing::info!("Updated {} item(s)", result.rows_affected());
    Ok(result.rows_affected())
}

/// Deletes an item, returning the number of rows removed.
#[instrument(skip(conn))]
pub async fn delete_item(conn: &mut DbConnection, id: i64) -> ApiResult<u64> {
    tracing::info!("Deleting item");
    let result = sqlx::query(
        r#"
        DELETE FROM items
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    tracing::info!("Deleted {} item(s)", result.rows_affected());
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::Database;
    use serde_json::json;
    use sqlx::MySqlPool;

    async fn connect(pool: &MySqlPool) -> DbConnection {
        let db = Database::from_pool(pool).await.unwrap();
        db.bootstrap().await.unwrap();
        db.connect().await.unwrap()
    }

    fn widget() -> ItemFields {
        ItemFields {
            name: Some(json!("Widget")),
            quantity: Some(json!(5)),
            description: Some(json!("x")),
        }
    }

    #[sqlx::test]
    async fn create_then_fetch_returns_item(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let id = create_item(&mut conn, &widget()).await.unwrap();

        let item = fetch_item(&mut conn, id.into()).await.unwrap();
        assert_eq!(
            Some(Item {
                id,
                name: "Widget".to_string(),
                quantity: 5,
                description: Some("x".to_string()),
            }),
            item,
        );
    }

    #[sqlx::test]
    async fn fetching_a_missing_item_returns_none(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        assert_eq!(None, fetch_item(&mut conn, 42).await.unwrap());
    }

    #[sqlx::test]
    async fn create_then_list_returns_all_items(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let first = create_item(&mut conn, &widget()).await.unwrap();
        let second = create_item(&mut conn, &widget()).await.unwrap();
        assert_ne!(first, second);

        let mut ids: Vec<i32> = list_items(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(vec![first.min(second), first.max(second)], ids);
    }

    #[sqlx::test]
    async fn create_without_name_is_rejected_by_the_database(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let fields = ItemFields {
            name: None,
            ..widget()
        };
        assert!(create_item(&mut conn, &fields).await.is_err());
        assert!(list_items(&mut conn).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn update_counts_matched_rows(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let id = create_item(&mut conn, &widget()).await.unwrap();

        let id = i64::from(id);
        assert_eq!(1, update_item(&mut conn, id, &widget()).await.unwrap());
        assert_eq!(0, update_item(&mut conn, id + 1, &widget()).await.unwrap());
    }

    #[sqlx::test]
    async fn delete_counts_removed_rows(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let id = create_item(&mut conn, &widget()).await.unwrap();

        assert_eq!(1, delete_item(&mut conn, id.into()).await.unwrap());
        assert_eq!(0, delete_item(&mut conn, id.into()).await.unwrap());
    }

    #[sqlx::test]
    async fn ids_beyond_the_column_range_match_nothing(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        create_item(&mut conn, &widget()).await.unwrap();

        let id = i64::from(i32::MAX) + 1;
        assert_eq!(None, fetch_item(&mut conn, id).await.unwrap());
        assert_eq!(0, update_item(&mut conn, id, &widget()).await.unwrap());
        assert_eq!(0, delete_item(&mut conn, id).await.unwrap());
    }

    #[sqlx::test]
    async fn the_database_coerces_mistyped_values(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let fields = ItemFields {
            name: Some(json!(123)),
            quantity: Some(json!("5")),
            description: Some(json!(true)),
        };
        let id = create_item(&mut conn, &fields).await.unwrap();

        let item = fetch_item(&mut conn, id.into()).await.unwrap().unwrap();
        assert_eq!("123", item.name);
        assert_eq!(5, item.quantity);
        assert_eq!(Some("1".to_string()), item.description);
    }

    #[sqlx::test]
    async fn fractional_quantities_are_rounded_by_the_database(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let fields = ItemFields {
            quantity: Some(json!(5.0)),
            ..widget()
        };
        let id = create_item(&mut conn, &fields).await.unwrap();

        let item = fetch_item(&mut conn, id.into()).await.unwrap().unwrap();
        assert_eq!(5, item.quantity);
    }

    #[sqlx::test]
    async fn structured_values_are_stored_as_json_text(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let fields = ItemFields {
            description: Some(json!({"colour": "red"})),
            ..widget()
        };
        let id = create_item(&mut conn, &fields).await.unwrap();

        let item = fetch_item(&mut conn, id.into()).await.unwrap().unwrap();
        assert_eq!(Some(r#"{"colour":"red"}"#.to_string()), item.description);
    }

    #[sqlx::test]
    async fn non_numeric_quantities_are_rejected_by_the_database(pool: MySqlPool) {
        let mut conn = connect(&pool).await;
        let fields = ItemFields {
            quantity: Some(json!("lots")),
            ..widget()
        };
        assert!(create_item(&mut conn, &fields).await.is_err());
        assert!(list_items(&mut conn).await.unwrap().is_empty());
    }
}
