//! Geolocation record as returned by ipdata.co.

use serde::{Deserialize, Deserializer, Serialize};

/// Treats a JSON `null` the same as a missing key.
///
/// ipdata.co sends `null` for fields it has no data for; every field of a
/// [`Record`] is presence-tested by emptiness, so `null` collapses to the
/// type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Autonomous system the address belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Asn {
  /// AS number, e.g. `AS15169`.
  #[serde(rename = "asn", deserialize_with = "null_as_default")]
  pub number: String,
  #[serde(deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(deserialize_with = "null_as_default")]
  pub domain: String,
  #[serde(deserialize_with = "null_as_default")]
  pub route: String,
  /// Network type (`isp`, `hosting`, `business`, ...).
  #[serde(rename = "type", deserialize_with = "null_as_default")]
  pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Currency {
  #[serde(deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(deserialize_with = "null_as_default")]
  pub code: String,
  #[serde(deserialize_with = "null_as_default")]
  pub symbol: String,
  #[serde(rename = "native", deserialize_with = "null_as_default")]
  pub native_symbol: String,
  #[serde(rename = "plural", deserialize_with = "null_as_default")]
  pub plural_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TimeZone {
  /// IANA name, e.g. `Europe/Rome`.
  #[serde(deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(rename = "abbr", deserialize_with = "null_as_default")]
  pub abbreviation: String,
  /// Offset from UTC as sent by the service, e.g. `+0100`.
  #[serde(rename = "offset", deserialize_with = "null_as_default")]
  pub utc_offset: String,
  #[serde(rename = "is_dst", deserialize_with = "null_as_default")]
  pub is_daylight_saving: bool,
  #[serde(rename = "current_time", deserialize_with = "null_as_default")]
  pub current_time_text: String,
}

/// Threat intelligence flags.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Threat {
  #[serde(deserialize_with = "null_as_default")]
  pub is_tor: bool,
  #[serde(deserialize_with = "null_as_default")]
  pub is_proxy: bool,
  #[serde(deserialize_with = "null_as_default")]
  pub is_anonymous: bool,
  #[serde(deserialize_with = "null_as_default")]
  pub is_known_attacker: bool,
  #[serde(deserialize_with = "null_as_default")]
  pub is_known_abuser: bool,
  #[serde(rename = "is_threat", deserialize_with = "null_as_default")]
  pub is_generic_threat: bool,
  #[serde(deserialize_with = "null_as_default")]
  pub is_bogon: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Language {
  #[serde(deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(rename = "native", deserialize_with = "null_as_default")]
  pub native_name: String,
}

/// One decoded ipdata.co answer.
///
/// Optional values are empty strings (or `false`/`0`) when the service had
/// nothing to say, never `None`. The body the record was decoded from is kept
/// verbatim so `--json` can print exactly what the service sent.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Record {
  pub ip: String,

  #[serde(deserialize_with = "null_as_default")]
  pub city: String,
  #[serde(deserialize_with = "null_as_default")]
  pub region: String,
  #[serde(deserialize_with = "null_as_default")]
  pub region_code: String,
  #[serde(deserialize_with = "null_as_default")]
  pub postal: String,
  #[serde(deserialize_with = "null_as_default")]
  pub country_name: String,
  #[serde(deserialize_with = "null_as_default")]
  pub country_code: String,
  #[serde(deserialize_with = "null_as_default")]
  pub continent_name: String,
  #[serde(deserialize_with = "null_as_default")]
  pub continent_code: String,

  #[serde(deserialize_with = "null_as_default")]
  pub latitude: f64,
  #[serde(deserialize_with = "null_as_default")]
  pub longitude: f64,

  #[serde(deserialize_with = "null_as_default")]
  pub calling_code: String,
  #[serde(deserialize_with = "null_as_default")]
  pub is_eu: bool,

  /// Plain flag text (an image URL on ipdata.co).
  #[serde(deserialize_with = "null_as_default")]
  pub flag: String,
  #[serde(deserialize_with = "null_as_default")]
  pub emoji_flag: String,
  #[serde(deserialize_with = "null_as_default")]
  pub emoji_unicode: String,

  #[serde(deserialize_with = "null_as_default")]
  pub asn: Asn,
  #[serde(deserialize_with = "null_as_default")]
  pub currency: Currency,
  #[serde(deserialize_with = "null_as_default")]
  pub time_zone: TimeZone,
  #[serde(deserialize_with = "null_as_default")]
  pub threat: Threat,
  #[serde(deserialize_with = "null_as_default")]
  pub languages: Vec<Language>,

  /// Body the record was decoded from, set by [`Record::from_payload`].
  #[serde(skip)]
  pub raw_payload: Option<String>,
}

impl Record {
  /// Decodes a success body and keeps the body itself as the raw payload.
  ///
  /// # Errors
  ///
  /// Returns the `serde_json` error if `body` is not a JSON object matching
  /// the record schema.
  pub fn from_payload(body: String) -> serde_json::Result<Self> {
    let mut record: Self = serde_json::from_str(&body)?;
    record.raw_payload = Some(body);
    Ok(record)
  }

  /// Same as [`Record::from_payload`] for a body straight off the wire.
  ///
  /// Bytes that are not valid UTF-8 are a decode error, never replaced, so
  /// the raw payload always matches what was received.
  ///
  /// # Errors
  ///
  /// Returns the `serde_json` error if `body` is not valid UTF-8 or not a
  /// JSON object matching the record schema.
  pub fn from_bytes(body: &[u8]) -> serde_json::Result<Self> {
    let mut record: Self = serde_json::from_slice(body)?;
    let text = std::str::from_utf8(body)
      .map_err(<serde_json::Error as serde::de::Error>::custom)?;
    record.raw_payload = Some(text.to_string());
    Ok(record)
  }
}
