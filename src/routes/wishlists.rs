use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::models::{AddWishlistItemRequest, SetPurchasedRequest};
use crate::routes::{authenticate, exchange_error, validation_error, AppState};

/// Configure wishlist routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/groups/{group_id}/wishlists/{user_id}", web::get().to(get_wishlist))
        .route("/groups/{group_id}/wishlist/items", web::post().to(add_item))
        .route("/groups/{group_id}/wishlist/items/{item_id}", web::delete().to(delete_item))
        .route("/groups/{group_id}/wishlist/items/{item_id}/purchased", web::put().to(set_purchased));
}

/// A member's wishlist in a group
///
/// GET /api/v1/groups/{group_id}/wishlists/{user_id}
async fn get_wishlist(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (group_id, owner_id) = path.into_inner();
    match state.exchange.wishlist(&user, &group_id, &owner_id).await {
        Ok(wishlist) => HttpResponse::Ok().json(wishlist),
        Err(e) => exchange_error(e),
    }
}

/// Add an item to the caller's wishlist
///
/// POST /api/v1/groups/{group_id}/wishlist/items
///
/// Request body:
/// ```json
/// {
///   "title": "string",
///   "description": "string",
///   "price": 19.99,
///   "link": "https://...",
///   "size": "M",
///   "priority": "high|medium|low"
/// }
/// ```
async fn add_item(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddWishlistItemRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.exchange.add_wishlist_item(&user, &path, &req).await {
        Ok(item) => HttpResponse::Created().json(item),
        Err(e) => exchange_error(e),
    }
}

async fn delete_item(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (group_id, item_id) = path.into_inner();
    match state.exchange.delete_wishlist_item(&user, &group_id, &item_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => exchange_error(e),
    }
}

/// Mark an item as purchased or not
///
/// PUT /api/v1/groups/{group_id}/wishlist/items/{item_id}/purchased
///
/// Request body:
/// ```json
/// { "purchased": true }
/// ```
async fn set_purchased(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    req: web::Json<SetPurchasedRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let (group_id, item_id) = path.into_inner();
    match state
        .exchange
        .set_purchased(&user, &group_id, &item_id, req.purchased)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => exchange_error(e),
    }
}
