//! Advisor assignment resolution endpoint.
//!
//! The device's sticky slot is a long-lived cookie named after
//! [`celred_core::STICKY_STORE_KEY`]; the `wa` query parameter is the
//! explicit override channel carried by shared links. The handler wires the
//! cookie store, the Postgres-backed directory, and the production random
//! picker into [`celred_core::resolve_assignment`].

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use celred_core::{
    contact_message, resolve_assignment, whatsapp_contact_url, AdvisorRecord, AssignmentSource,
    AssignmentStore, DirectoryProvider, UniformPicker, STICKY_STORE_KEY,
};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AssignmentQuery {
    /// Explicit advisor override from a shared link.
    wa: Option<String>,
    /// Advisor display name from a shared link, echoed into the message.
    adv: Option<String>,
    /// Product the visitor is looking at, for the pre-filled message.
    product_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct AssignmentData {
    pub number: Option<String>,
    pub source: AssignmentSource,
    pub advisor_name: Option<String>,
    /// WhatsApp deep link, present only when a number was resolved. Clients
    /// must disable the contact action when this is absent.
    pub contact_url: Option<String>,
}

/// Sticky assignment slot backed by the request/response cookie pair.
///
/// Reads come from the request's `Cookie` header; a write marks the slot
/// dirty so the handler emits one `Set-Cookie` on the way out. Last-write-wins
/// across tabs is acceptable, each device only resolves its own assignment.
struct CookieStore {
    value: Option<String>,
    wrote: bool,
}

impl CookieStore {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            value: sticky_cookie_value(headers),
            wrote: false,
        }
    }

    /// `Set-Cookie` header value for the write, if one happened.
    ///
    /// The assignment itself has no TTL; the year-long `Max-Age` is refreshed
    /// on every write.
    fn set_cookie_header(&self) -> Option<String> {
        if !self.wrote {
            return None;
        }
        let number = self.value.as_deref().unwrap_or_default();
        Some(format!(
            "{STICKY_STORE_KEY}={number}; Path=/; Max-Age=31536000; SameSite=Lax"
        ))
    }
}

impl AssignmentStore for CookieStore {
    fn get(&self) -> Option<String> {
        self.value.clone()
    }

    fn set(&mut self, number: &str) {
        self.value = Some(number.to_owned());
        self.wrote = true;
    }
}

/// Extracts the sticky cookie from the request headers.
fn sticky_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == STICKY_STORE_KEY && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// Advisor directory read through the `advisors` table.
struct PgDirectory<'a> {
    pool: &'a PgPool,
}

impl DirectoryProvider for PgDirectory<'_> {
    type Error = celred_db::DbError;

    async fn fetch(&self) -> Result<Vec<AdvisorRecord>, Self::Error> {
        let rows = celred_db::list_advisors(self.pool).await?;
        Ok(rows.into_iter().map(celred_db::AdvisorRow::into_core).collect())
    }
}

/// GET /api/v1/assignment — resolve the advisor for this visitor.
pub(super) async fn resolve(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AssignmentQuery>,
    headers: HeaderMap,
) -> Response {
    let mut store = CookieStore::from_headers(&headers);
    let directory = PgDirectory { pool: &state.pool };
    let mut picker = UniformPicker;

    let assignment =
        resolve_assignment(query.wa.as_deref(), &mut store, &directory, &mut picker).await;

    // Product context only shapes the pre-filled message; an unknown id is
    // not an error for assignment resolution.
    let product_name = match query.product_id {
        Some(id) => match celred_db::get_product(&state.pool, id).await {
            Ok(row) => row.map(|r| r.name),
            Err(e) => {
                tracing::warn!(error = %e, product_id = id, "product lookup failed during assignment");
                None
            }
        },
        None => None,
    };

    let advisor_name = query
        .adv
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);

    let contact_url = assignment.number.as_deref().map(|number| {
        let message = contact_message(product_name.as_deref(), advisor_name.as_deref());
        whatsapp_contact_url(number, &message)
    });

    let data = AssignmentData {
        number: assignment.number,
        source: assignment.source,
        advisor_name,
        contact_url,
    };

    let mut response = Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response();

    if let Some(cookie) = store.set_cookie_header() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
