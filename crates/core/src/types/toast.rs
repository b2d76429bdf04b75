//! Toast notifications shown after an action.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A short notification.
///
/// Serialized into session flash storage and into the `HX-Trigger`
/// `showToast` event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    #[serde(default)]
    pub variant: ToastVariant,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Toast {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Default,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }

    /// The toast shown when an access rule rejects an action.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::error("Permission Denied")
            .with_description("You do not have permission to perform this action.")
    }

    /// `HX-Trigger` header value: `{"showToast": {...}}`.
    ///
    /// Non-ASCII characters are `\u` escaped; header values must be ASCII.
    #[must_use]
    pub fn hx_trigger(&self) -> String {
        self.hx_trigger_with(&[])
    }

    /// Like [`Toast::hx_trigger`], also firing each of `events` with a
    /// `true` payload.
    #[must_use]
    pub fn hx_trigger_with(&self, events: &[&str]) -> String {
        let mut payload = serde_json::Map::new();
        payload.insert("showToast".to_owned(), serde_json::json!(self));
        for event in events {
            payload.insert((*event).to_owned(), serde_json::Value::Bool(true));
        }
        ascii_json(&serde_json::Value::Object(payload).to_string())
    }
}

fn ascii_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hx_trigger_payload() {
        let toast = Toast::success("Order Placed!").with_description("We will call you shortly.");
        let value: serde_json::Value = serde_json::from_str(&toast.hx_trigger()).unwrap();
        assert_eq!(value["showToast"]["title"], "Order Placed!");
        assert_eq!(value["showToast"]["variant"], "default");
        assert_eq!(value["showToast"]["description"], "We will call you shortly.");
    }

    #[test]
    fn test_hx_trigger_is_ascii() {
        let toast = Toast::success("Order Placed!").with_description("Total ৳900.00");
        let header = toast.hx_trigger();
        assert!(header.is_ascii());
        let value: serde_json::Value = serde_json::from_str(&header).unwrap();
        assert_eq!(value["showToast"]["description"], "Total ৳900.00");
    }

    #[test]
    fn test_hx_trigger_with_extra_events() {
        let header = Toast::success("Added to cart!").hx_trigger_with(&["cartUpdated"]);
        let value: serde_json::Value = serde_json::from_str(&header).unwrap();
        assert_eq!(value["cartUpdated"], true);
        assert_eq!(value["showToast"]["title"], "Added to cart!");
    }

    #[test]
    fn test_permission_denied_is_destructive() {
        let toast = Toast::permission_denied();
        assert_eq!(toast.variant, ToastVariant::Destructive);
        assert_eq!(toast.title, "Permission Denied");
    }

    #[test]
    fn test_description_omitted_when_absent() {
        let json = serde_json::to_string(&Toast::error("Oops")).unwrap();
        assert!(!json.contains("description"));
    }
}
