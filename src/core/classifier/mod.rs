//! # Classifier Module
//!
//! Assigns a semantic [`ValueType`] to decoded barcode text.
//!
//! ## Precedence (first match wins)
//! 1. No text - `Unknown`
//! 2. `http://` / `https://` - `Url`
//! 3. `mailto:` - `Email`
//! 4. `tel:` - `Phone`
//! 5. `sms:` / `smsto:` - `Sms`
//! 6. `wifi:` - `Wifi`
//! 7. `geo:` - `Geo` (falls through on bad coordinates)
//! 8. Bare email address - `Email`
//! 9. Anything else - `Text`
//!
//! Prefixes are matched case-insensitively. Classification is a pure
//! function of the text.

mod types;

pub use types::{EmailData, GeoPoint, PhoneData, SmsData, UrlData, ValueType, WifiData};

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}")
        .expect("email pattern is a valid regex")
});

/// Classify decoded payload text
pub fn classify(text: Option<&str>) -> ValueType {
    let Some(value) = text else {
        return ValueType::Unknown;
    };

    if has_prefix(value, "http://") || has_prefix(value, "https://") {
        return ValueType::Url(UrlData {
            url: value.to_string(),
        });
    }

    if let Some(address) = strip_prefix_ci(value, "mailto:") {
        return ValueType::Email(EmailData {
            address: address.to_string(),
            subject: None,
            body: None,
        });
    }

    if let Some(number) = strip_prefix_ci(value, "tel:") {
        return ValueType::Phone(PhoneData {
            number: number.to_string(),
        });
    }

    if let Some(number) =
        strip_prefix_ci(value, "sms:").or_else(|| strip_prefix_ci(value, "smsto:"))
    {
        return ValueType::Sms(SmsData {
            phone_number: number.to_string(),
            message: None,
        });
    }

    if let Some(fields) = strip_prefix_ci(value, "wifi:") {
        return ValueType::Wifi(parse_wifi(fields));
    }

    if let Some(coordinates) = strip_prefix_ci(value, "geo:") {
        if let Some(point) = parse_geo(coordinates) {
            return ValueType::Geo(point);
        }
    }

    if value.contains('@') && value.contains('.') && EMAIL_PATTERN.is_match(value) {
        return ValueType::Email(EmailData {
            address: value.to_string(),
            subject: None,
            body: None,
        });
    }

    ValueType::Text
}

fn has_prefix(value: &str, prefix: &str) -> bool {
    strip_prefix_ci(value, prefix).is_some()
}

/// ASCII case-insensitive prefix strip
fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// Parse the body of a `WIFI:` payload (`T:WPA;S:ssid;P:secret;;`).
///
/// Field tags are case-sensitive. Unknown fields are ignored and
/// backslash escapes (`\;`, `\:`, `\\`, `\,`) are honored.
fn parse_wifi(fields: &str) -> WifiData {
    let mut wifi = WifiData::default();

    for field in split_unescaped(fields, ';') {
        if let Some(ssid) = field.strip_prefix("S:") {
            wifi.ssid = Some(ssid.to_string());
        } else if let Some(password) = field.strip_prefix("P:") {
            wifi.password = Some(password.to_string());
        } else if let Some(encryption) = field.strip_prefix("T:") {
            wifi.encryption_type = Some(encryption.to_string());
        }
    }

    wifi
}

fn split_unescaped(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            }
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
}

/// Parse `lat,lng[,alt][;params][?query]`. Returns None on any parse failure.
fn parse_geo(coordinates: &str) -> Option<GeoPoint> {
    let coordinates = coordinates
        .split(['?', ';'])
        .next()
        .unwrap_or(coordinates);

    let mut parts = coordinates.split(',');
    let latitude = parse_coordinate(parts.next()?)?;
    let longitude = parse_coordinate(parts.next()?)?;

    Some(GeoPoint {
        latitude,
        longitude,
    })
}

fn parse_coordinate(component: &str) -> Option<f64> {
    component
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_json(text: &str) -> serde_json::Value {
        serde_json::to_value(classify(Some(text))).unwrap()
    }

    #[test]
    fn absent_text_is_unknown() {
        assert_eq!(classify(None), ValueType::Unknown);
        assert_eq!(
            serde_json::to_value(classify(None)).unwrap(),
            json!({"type": 0, "data": null})
        );
    }

    #[test]
    fn https_url() {
        assert_eq!(
            classify_json("https://example.com"),
            json!({"type": 8, "data": {"url": "https://example.com"}})
        );
    }

    #[test]
    fn url_prefix_is_case_insensitive_and_keeps_original_text() {
        assert_eq!(
            classify(Some("HTTP://Example.com/Path")),
            ValueType::Url(UrlData {
                url: "HTTP://Example.com/Path".to_string()
            })
        );
    }

    #[test]
    fn mailto_strips_prefix() {
        assert_eq!(
            classify_json("mailto:a@b.com"),
            json!({"type": 2, "data": {"address": "a@b.com"}})
        );
    }

    #[test]
    fn tel_strips_prefix() {
        assert_eq!(
            classify_json("tel:+15551234"),
            json!({"type": 4, "data": {"number": "+15551234"}})
        );
    }

    #[test]
    fn sms_and_smsto_prefixes() {
        assert_eq!(
            classify_json("sms:5551234"),
            json!({"type": 6, "data": {"phoneNumber": "5551234"}})
        );
        assert_eq!(
            classify_json("SMSTO:5551234"),
            json!({"type": 6, "data": {"phoneNumber": "5551234"}})
        );
    }

    #[test]
    fn wifi_fields() {
        assert_eq!(
            classify_json("WIFI:T:WPA;S:home;P:secret;;"),
            json!({"type": 9, "data": {
                "ssid": "home",
                "password": "secret",
                "encryptionType": "WPA"
            }})
        );
    }

    #[test]
    fn wifi_with_missing_fields() {
        assert_eq!(
            classify(Some("wifi:S:cafe;;")),
            ValueType::Wifi(WifiData {
                ssid: Some("cafe".to_string()),
                password: None,
                encryption_type: None,
            })
        );
    }

    #[test]
    fn wifi_honors_escaped_separators() {
        match classify(Some(r"WIFI:S:my\;net;P:pa\\ss;H:true;;")) {
            ValueType::Wifi(wifi) => {
                assert_eq!(wifi.ssid.as_deref(), Some("my;net"));
                assert_eq!(wifi.password.as_deref(), Some(r"pa\ss"));
                assert_eq!(wifi.encryption_type, None);
            }
            other => panic!("expected wifi, got {other:?}"),
        }
    }

    #[test]
    fn geo_coordinates() {
        assert_eq!(
            classify_json("geo:37.7,-122.4"),
            json!({"type": 10, "data": {"latitude": 37.7, "longitude": -122.4}})
        );
    }

    #[test]
    fn geo_ignores_altitude_and_query() {
        assert_eq!(
            classify(Some("geo:37.7,-122.4,12?q=pier")),
            ValueType::Geo(GeoPoint {
                latitude: 37.7,
                longitude: -122.4
            })
        );
    }

    #[test]
    fn bad_geo_falls_through_to_text() {
        assert_eq!(
            classify_json("geo:notanumber"),
            json!({"type": 7, "data": null})
        );
        assert_eq!(classify(Some("geo:1.0,abc")), ValueType::Text);
        assert_eq!(classify(Some("geo:NaN,1.0")), ValueType::Text);
    }

    #[test]
    fn bare_email_address() {
        assert_eq!(
            classify(Some("support@example.org")),
            ValueType::Email(EmailData {
                address: "support@example.org".to_string(),
                subject: None,
                body: None,
            })
        );
    }

    #[test]
    fn at_sign_without_valid_domain_is_text() {
        assert_eq!(classify(Some("meet @ 5.30")), ValueType::Text);
        assert_eq!(classify(Some("user@localhost")), ValueType::Text);
    }

    #[test]
    fn plain_text() {
        assert_eq!(
            classify_json("hello world"),
            json!({"type": 7, "data": null})
        );
    }

    #[test]
    fn empty_text_is_text_not_unknown() {
        assert_eq!(classify(Some("")), ValueType::Text);
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        assert_eq!(classify(Some("héllo")), ValueType::Text);
        assert_eq!(classify(Some("ü")), ValueType::Text);
    }

    #[test]
    fn classification_is_deterministic() {
        let inputs = ["WIFI:S:x;;", "geo:1,2", "tel:1", "plain", "a@b.co"];
        for input in inputs {
            assert_eq!(classify(Some(input)), classify(Some(input)));
        }
    }
}
