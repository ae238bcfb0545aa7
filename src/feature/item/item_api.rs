//! The item API implementation.
//!
//! Every route is a `POST`, including the ones that only read.

use super::{
    item_repository::{Item, ItemFields},
    item_service,
};
use crate::infra::{
    database::Database,
    error::{ApiResult, ClientError, MessageBody},
    extract::Json,
    state::AppState,
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

/// The item API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_post(create_item)
        .typed_post(list_items)
        .typed_post(read_item)
        .typed_post(update_item)
        .typed_post(delete_item)
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/api/create")]
struct CreatePath;

#[derive(Deserialize, TypedPath)]
#[typed_path("/api/read")]
struct ReadAllPath;

#[derive(Deserialize, TypedPath)]
#[typed_path("/api/read/:id", rejection(ClientError))]
struct ReadPath {
    id: i64,
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/api/update/:id", rejection(ClientError))]
struct UpdatePath {
    id: i64,
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/api/delete/:id", rejection(ClientError))]
struct DeletePath {
    id: i64,
}

/// The response to a successful create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Created {
    /// A confirmation.
    #[schema(example = "Item created")]
    pub message: String,
    /// The id of the new item.
    #[schema(example = 1)]
    pub id: i32,
}

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/api/create",
    request_body = ItemFields,
    responses(
        (status = 201, description = "Created", body = Created),
        (status = 500, description = "Internal Server Error", body = crate::infra::error::ErrorBody),
    )
)]
#[instrument(skip(db))]
async fn create_item(
    _: CreatePath,
    State(db): State<Database>,
    Json(fields): Json<ItemFields>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let id = db
        .with_connection(|conn| Box::pin(item_service::create_item(conn, fields)))
        .await?;
    let created = Created {
        message: "Item created".to_string(),
        id,
    };
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists all items.
#[utoipa::path(
    post,
    path = "/api/read",
    responses(
        (status = 200, description = "Ok", body = [Item]),
        (status = 500, description = "Internal Server Error", body = crate::infra::error::ErrorBody),
    )
)]
#[instrument(skip_all)]
async fn list_items(_: ReadAllPath, State(db): State<Database>) -> ApiResult<Json<Vec<Item>>> {
    let items = db
        .with_connection(|conn| Box::pin(item_service::list_items(conn)))
        .await?;
    Ok(Json(items))
}

/// Gets an item.
#[utoipa::path(
    post,
    path = "/api/read/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = MessageBody),
        (status = 500, description = "Internal Server Error", body = crate::infra::error::ErrorBody),
    )
)]
#[instrument(skip(db))]
async fn read_item(
    ReadPath { id }: ReadPath,
    State(db): State<Database>,
) -> ApiResult<Json<Item>> {
    let item = db
        .with_connection(|conn| Box::pin(item_service::read_item(conn, id)))
        .await?;
    Ok(Json(item))
}

/// Overwrites an item's name, quantity and description.
#[utoipa::path(
    post,
    path = "/api/update/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    request_body = ItemFields,
    responses(
        (status = 200, description = "Ok", body = MessageBody),
        (status = 404, description = "Not Found", body = MessageBody),
        (status = 500, description = "Internal Server Error", body = crate::infra::error::ErrorBody),
    )
)]
#[instrument(skip(db))]
async fn update_item(
    UpdatePath { id }: UpdatePath,
    State(db): State<Database>,
    Json(fields): Json<ItemFields>,
) -> ApiResult<Json<MessageBody>> {
    db.with_connection(|conn| Box::pin(item_service::update_item(conn, id, fields)))
        .await?;
    Ok(Json(MessageBody::new("Item updated")))
}

/// Deletes an item.
#[utoipa::path(
    post,
    path = "/api/delete/{id}",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 200, description = "Ok", body = MessageBody),
        (status = 404, description = "Not Found", body = MessageBody),
        (status = 500, description = "Internal Server Error", body = crate::infra::error::ErrorBody),
    )
)]
#[instrument(skip(db))]
async fn delete_item(
    DeletePath { id }: DeletePath,
    State(db): State<Database>,
) -> ApiResult<Json<MessageBody>> {
    db.with_connection(|conn| Box::pin(item_service::delete_item(conn, id)))
        .await?;
    Ok(Json(MessageBody::new("Item deleted")))
}
