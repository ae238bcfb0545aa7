//! A service for interacting with items.
//!
//! Turns what the repository reports into either a value or [`ClientError::NotFound`].

use super::item_repository::{self, Item, ItemFields};
use crate::infra::{
    database::DbConnection,
    error::{ApiResult, ClientError},
};
use tracing::instrument;

/// The entity name used in not-found messages.
const ITEM: &str = "Item";

/// Creates a new item, returning its id.
#[instrument(skip(conn))]
pub async fn create_item(conn: &mut DbConnection, fields: ItemFields) -> ApiResult<i32> {
    item_repository::create_item(conn, &fields).await
}

/// Read an item.
#[instrument(skip(conn))]
pub async fn read_item(conn: &mut DbConnection, id: i64) -> ApiResult<Item> {
    item_repository::fetch_item(conn, id)
        .await?
        .ok_or(ClientError::NotFound(ITEM).into())
}

/// Lists all items.
#[instrument(skip(conn))]
pub async fn list_items(conn: &mut DbConnection) -> ApiResult<Vec<Item>> {
    item_repository::list_items(conn).await
}

/// Overwrites an item.
#[instrument(skip(conn))]
pub async fn update_item(conn: &mut DbConnection, id: i64, fields: ItemFields) -> ApiResult<()> {
    let rows = item_repository::update_item(conn, id, &fields).await?;
    require_affected(rows)
}

/// Delete an item.
#[instrument(skip(conn))]
pub async fn delete_item(conn: &mut DbConnection, id: i64) -> ApiResult<()> {
    let rows = item_repository::delete_item(conn, id).await?;
    require_affected(rows)
}

/// A mutation that touched no rows targeted an item that does not exist.
fn require_affected(rows: u64) -> ApiResult<()> {
    if rows == 0 {
        tracing::warn!("Item not found");
        return Err(ClientError::NotFound(ITEM).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::error::ApiError;

    #[test]
    fn no_affected_rows_is_not_found() {
        assert!(matches!(
            require_affected(0),
            Err(ApiError::ClientError(ClientError::NotFound("Item")))
        ));
    }

    #[test]
    fn affected_rows_is_success() {
        assert!(require_affected(1).is_ok());
    }
}
