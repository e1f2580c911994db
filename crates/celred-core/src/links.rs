//! Shareable catalog/product links and outbound WhatsApp deep links.
//!
//! Share links carry three query parameters: `wa` (advisor contact number
//! override), `adv` (advisor display name), and `sp` (`"1"` reveals the
//! price; absent or any other value hides it behind a "financing available"
//! message). The page receiving the link feeds `wa` into
//! [`crate::resolve_assignment`] as the explicit override.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Query parameter carrying the explicit advisor override.
pub const PARAM_ADVISOR_NUMBER: &str = "wa";
/// Query parameter carrying the advisor display name.
pub const PARAM_ADVISOR_NAME: &str = "adv";
/// Query parameter controlling price visibility (`"1"` = show).
pub const PARAM_SHOW_PRICE: &str = "sp";

/// Parameters embedded in a shareable link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLink {
    pub advisor_number: Option<String>,
    pub advisor_name: Option<String>,
    pub show_price: bool,
}

impl ShareLink {
    /// Builds a link from admin input, normalizing the contact number.
    ///
    /// A number that loses all its characters to normalization is treated as
    /// absent rather than producing a `wa=` parameter with an empty value.
    #[must_use]
    pub fn for_advisor(
        raw_number: Option<&str>,
        advisor_name: Option<&str>,
        show_price: bool,
    ) -> Self {
        let advisor_number = raw_number
            .map(crate::advisors::normalize_number)
            .filter(|n| !n.is_empty());
        let advisor_name = advisor_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned);
        Self {
            advisor_number,
            advisor_name,
            show_price,
        }
    }

    /// Reads share parameters back out of decoded query pairs.
    ///
    /// Unknown parameters are ignored; `sp` is `true` only for the exact
    /// value `"1"`.
    #[must_use]
    pub fn from_query_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut link = Self::default();
        for (key, value) in pairs {
            match key {
                PARAM_ADVISOR_NUMBER if !value.is_empty() => {
                    link.advisor_number = Some(value.to_owned());
                }
                PARAM_ADVISOR_NAME if !value.is_empty() => {
                    link.advisor_name = Some(value.to_owned());
                }
                PARAM_SHOW_PRICE => link.show_price = show_price_param(Some(value)),
                _ => {}
            }
        }
        link
    }

    /// Renders the query string (without leading `?`), empty when no
    /// parameter is set.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if let Some(ref number) = self.advisor_number {
            parts.push(format!("{PARAM_ADVISOR_NUMBER}={}", encode(number)));
        }
        if let Some(ref name) = self.advisor_name {
            parts.push(format!("{PARAM_ADVISOR_NAME}={}", encode(name)));
        }
        if self.show_price {
            parts.push(format!("{PARAM_SHOW_PRICE}=1"));
        }
        parts.join("&")
    }

    /// Shareable URL for the catalog root, e.g. `https://shop.example/?wa=573001111111`.
    #[must_use]
    pub fn catalog_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let query = self.query_string();
        if query.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/?{query}")
        }
    }

    /// Shareable URL for a specific product detail page.
    #[must_use]
    pub fn product_url(&self, base_url: &str, product_id: i64) -> String {
        let base = base_url.trim_end_matches('/');
        let query = self.query_string();
        if query.is_empty() {
            format!("{base}/product/{product_id}")
        } else {
            format!("{base}/product/{product_id}?{query}")
        }
    }
}

/// `true` only for the exact query value `"1"` — the single spelling the
/// share tooling emits. Anything else keeps the price hidden.
#[must_use]
pub fn show_price_param(value: Option<&str>) -> bool {
    value == Some("1")
}

/// Pre-filled message for the outbound contact action.
///
/// Mentions the product when the visitor is looking at one, and greets the
/// advisor by name when a shared link carried one.
#[must_use]
pub fn contact_message(product_name: Option<&str>, advisor_name: Option<&str>) -> String {
    let greeting = match advisor_name {
        Some(name) => format!("Hola {name}"),
        None => "Hola".to_owned(),
    };
    match product_name {
        Some(product) => {
            format!("{greeting}, vi este celular en el catálogo y me interesa: {product}.")
        }
        None => format!("{greeting}, estoy viendo el catálogo y quiero más información."),
    }
}

/// WhatsApp deep link with the message pre-filled.
///
/// Callers must only invoke this with a resolved assignment; an unresolved
/// visitor gets a disabled contact action, never a placeholder number.
#[must_use]
pub fn whatsapp_contact_url(number: &str, message: &str) -> String {
    format!("https://wa.me/{number}?text={}", encode(message))
}

/// Message an advisor forwards to a client alongside a share link.
#[must_use]
pub fn product_share_message(product_name: &str, link: &str) -> String {
    format!(
        "Hola, te comparto la información de este celular: {product_name}\n\nPuedes verlo aquí: {link}"
    )
}

/// WhatsApp forward link without a recipient: opens the app with the message
/// pre-filled so the advisor picks the chat.
#[must_use]
pub fn whatsapp_share_url(message: &str) -> String {
    format!("https://wa.me/?text={}", encode(message))
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_advisor_normalizes_the_number() {
        let link = ShareLink::for_advisor(Some("(300) 111-2222"), Some(" Laura "), true);
        assert_eq!(link.advisor_number.as_deref(), Some("3001112222"));
        assert_eq!(link.advisor_name.as_deref(), Some("Laura"));
        assert!(link.show_price);
    }

    #[test]
    fn for_advisor_drops_digitless_numbers_and_blank_names() {
        let link = ShareLink::for_advisor(Some("---"), Some("  "), false);
        assert_eq!(link, ShareLink::default());
    }

    #[test]
    fn query_string_includes_only_set_parameters() {
        let link = ShareLink {
            advisor_number: Some("573001111111".to_owned()),
            advisor_name: None,
            show_price: false,
        };
        assert_eq!(link.query_string(), "wa=573001111111");

        let link = ShareLink {
            advisor_number: Some("573001111111".to_owned()),
            advisor_name: Some("Laura".to_owned()),
            show_price: true,
        };
        assert_eq!(link.query_string(), "wa=573001111111&adv=Laura&sp=1");
    }

    #[test]
    fn query_string_percent_encodes_names() {
        let link = ShareLink {
            advisor_number: None,
            advisor_name: Some("María J".to_owned()),
            show_price: false,
        };
        assert_eq!(link.query_string(), "adv=Mar%C3%ADa%20J");
    }

    #[test]
    fn catalog_url_with_and_without_parameters() {
        let link = ShareLink::for_advisor(Some("573001111111"), None, false);
        assert_eq!(
            link.catalog_url("https://shop.example/"),
            "https://shop.example/?wa=573001111111"
        );
        assert_eq!(ShareLink::default().catalog_url("https://shop.example"), "https://shop.example/");
    }

    #[test]
    fn product_url_embeds_id_and_parameters() {
        let link = ShareLink::for_advisor(Some("573001111111"), Some("Laura"), true);
        assert_eq!(
            link.product_url("https://shop.example", 42),
            "https://shop.example/product/42?wa=573001111111&adv=Laura&sp=1"
        );
        assert_eq!(
            ShareLink::default().product_url("https://shop.example", 42),
            "https://shop.example/product/42"
        );
    }

    #[test]
    fn from_query_pairs_round_trips() {
        let link = ShareLink::from_query_pairs([
            ("wa", "573001111111"),
            ("adv", "Laura"),
            ("sp", "1"),
            ("utm_source", "ignored"),
        ]);
        assert_eq!(link.advisor_number.as_deref(), Some("573001111111"));
        assert_eq!(link.advisor_name.as_deref(), Some("Laura"));
        assert!(link.show_price);
    }

    #[test]
    fn show_price_requires_the_exact_value_one() {
        assert!(!ShareLink::from_query_pairs([("sp", "true")]).show_price);
        assert!(!ShareLink::from_query_pairs([("sp", "0")]).show_price);
        assert!(!ShareLink::from_query_pairs([("sp", "")]).show_price);
        assert!(ShareLink::from_query_pairs([("sp", "1")]).show_price);

        assert!(show_price_param(Some("1")));
        assert!(!show_price_param(Some("true")));
        assert!(!show_price_param(None));
    }

    #[test]
    fn forward_share_url_has_no_recipient() {
        let message = product_share_message("Galaxy A55", "https://shop.example/product/42?wa=1");
        let url = whatsapp_share_url(&message);
        assert!(url.starts_with("https://wa.me/?text="));
        assert!(url.contains("Galaxy%20A55"));
        assert!(!url.contains('\n'));
    }

    #[test]
    fn contact_message_variants() {
        assert_eq!(
            contact_message(Some("Galaxy A55"), Some("Laura")),
            "Hola Laura, vi este celular en el catálogo y me interesa: Galaxy A55."
        );
        assert_eq!(
            contact_message(Some("Galaxy A55"), None),
            "Hola, vi este celular en el catálogo y me interesa: Galaxy A55."
        );
        assert_eq!(
            contact_message(None, None),
            "Hola, estoy viendo el catálogo y quiero más información."
        );
    }

    #[test]
    fn whatsapp_url_encodes_the_message() {
        let url = whatsapp_contact_url("573001111111", "Hola, me interesa: Galaxy A55.");
        assert!(url.starts_with("https://wa.me/573001111111?text="));
        assert!(url.contains("Hola%2C%20me%20interesa"));
        assert!(!url.contains(' '));
    }
}
