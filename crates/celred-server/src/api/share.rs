//! Admin share-link generation.
//!
//! Builds the visitor-facing URL (catalog root or a product detail page)
//! carrying the `wa`/`adv`/`sp` parameters, plus a recipient-less WhatsApp
//! forward link the advisor can open to pick a chat.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use celred_core::{product_share_message, whatsapp_share_url, ShareLink};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ShareLinkQuery {
    /// Target product; absent means the catalog root.
    pub product_id: Option<i64>,
    /// Advisor contact number to bake into the link.
    pub wa: Option<String>,
    /// Advisor display name.
    pub adv: Option<String>,
    /// `"1"` makes the link reveal the price.
    pub sp: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ShareLinkData {
    /// The shareable page URL.
    pub url: String,
    /// WhatsApp forward link with the message pre-filled, only for product
    /// links where there is a message to forward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_share_url: Option<String>,
}

/// GET /api/v1/admin/share-link.
pub(super) async fn build_share_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ShareLinkQuery>,
) -> Result<Json<ApiResponse<ShareLinkData>>, ApiError> {
    let rid = &req_id.0;

    let show_price = celred_core::show_price_param(query.sp.as_deref());
    let link = ShareLink::for_advisor(query.wa.as_deref(), query.adv.as_deref(), show_price);

    if query.wa.is_some() && link.advisor_number.is_none() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "'wa' must contain at least one digit",
        ));
    }

    let data = match query.product_id {
        Some(product_id) => {
            let row = celred_db::get_product(&state.pool, product_id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
                .ok_or_else(|| {
                    ApiError::new(rid, "not_found", format!("product {product_id} not found"))
                })?;

            let url = link.product_url(&state.public_base_url, product_id);
            let message = product_share_message(&row.name, &url);
            ShareLinkData {
                whatsapp_share_url: Some(whatsapp_share_url(&message)),
                url,
            }
        }
        None => ShareLinkData {
            url: link.catalog_url(&state.public_base_url),
            whatsapp_share_url: None,
        },
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
