//! OpenAPI configuration.

use crate::feature::item::{item_api, item_repository};
use crate::infra::error::{ErrorBody, MessageBody};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    paths(
        item_api::create_item,
        item_api::list_items,
        item_api::read_item,
        item_api::update_item,
        item_api::delete_item,
    ),
    components(
        schemas(
            item_repository::ItemFields,
            item_repository::Item,
            item_api::Created,
            MessageBody,
            ErrorBody,
        )
    ),
    tags((name = "items", description = "Create, read, update and delete items"))
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_item_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/create",
            "/api/read",
            "/api/read/{id}",
            "/api/update/{id}",
            "/api/delete/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} is missing");
        }
    }
}
