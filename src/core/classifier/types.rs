//! Value type definitions for classified payloads.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// URL payload data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlData {
    pub url: String,
}

/// Email payload data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailData {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Phone payload data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneData {
    pub number: String,
}

/// SMS payload data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsData {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wi-Fi credential payload data. Any field may be absent; absent fields
/// serialize as `null` so every key is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiData {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub encryption_type: Option<String>,
}

/// Geographic coordinate payload data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Semantic type of a decoded payload.
///
/// Serializes as `{ "type": <code>, "data": <fields or null> }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValueType {
    /// No payload text was available
    Unknown,
    Url(UrlData),
    Email(EmailData),
    Phone(PhoneData),
    Sms(SmsData),
    Wifi(WifiData),
    Geo(GeoPoint),
    /// Plain text with no recognized structure
    #[default]
    Text,
}

impl ValueType {
    /// Numeric wire tag shared with host platforms
    pub fn code(&self) -> u8 {
        match self {
            ValueType::Unknown => 0,
            ValueType::Email(_) => 2,
            ValueType::Phone(_) => 4,
            ValueType::Sms(_) => 6,
            ValueType::Text => 7,
            ValueType::Url(_) => 8,
            ValueType::Wifi(_) => 9,
            ValueType::Geo(_) => 10,
        }
    }

    /// Short lowercase label, used by the CLI
    pub fn label(&self) -> &'static str {
        match self {
            ValueType::Unknown => "unknown",
            ValueType::Url(_) => "url",
            ValueType::Email(_) => "email",
            ValueType::Phone(_) => "phone",
            ValueType::Sms(_) => "sms",
            ValueType::Wifi(_) => "wifi",
            ValueType::Geo(_) => "geo",
            ValueType::Text => "text",
        }
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValueType", 2)?;
        state.serialize_field("type", &self.code())?;
        match self {
            ValueType::Url(data) => state.serialize_field("data", data)?,
            ValueType::Email(data) => state.serialize_field("data", data)?,
            ValueType::Phone(data) => state.serialize_field("data", data)?,
            ValueType::Sms(data) => state.serialize_field("data", data)?,
            ValueType::Wifi(data) => state.serialize_field("data", data)?,
            ValueType::Geo(data) => state.serialize_field("data", data)?,
            ValueType::Unknown | ValueType::Text => {
                state.serialize_field("data", &Option::<()>::None)?
            }
        }
        state.end()
    }
}
