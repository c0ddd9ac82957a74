//! Text report for a single [`Record`].

use crate::record::{Currency, Language, Record, Threat, TimeZone};
use std::fmt::{Display, Write};

const INDENT: &str = "   ";

/// How a record gets rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
  /// Print the payload exactly as the service sent it.
  pub raw_json: bool,
  /// Use the plain flag text instead of the emoji flag.
  pub plain_glyphs: bool,
}

/// Helper: one indented `Label:  value` line with the values aligned.
fn field(out: &mut String, label: &str, value: impl Display) {
  let _ = writeln!(out, "{INDENT}{label:<17}{value}");
}

/// Helper: one indented line without a label.
fn plain(out: &mut String, value: impl Display) {
  let _ = writeln!(out, "{INDENT}{value}");
}

/// Helper: `name (code)`, or just `name` when there is no code.
fn name_with_code(name: &str, code: &str) -> String {
  if code.is_empty() {
    name.to_string()
  } else {
    format!("{name} ({code})")
  }
}

fn flag_repr(record: &Record, options: Options) -> &str {
  if options.plain_glyphs || record.emoji_flag.is_empty() {
    &record.flag
  } else {
    &record.emoji_flag
  }
}

fn time_zone_summary(tz: &TimeZone) -> String {
  let has_name = !tz.name.is_empty();
  let has_offset = !tz.utc_offset.is_empty();
  let mut out = String::new();

  if has_name {
    out.push_str(&tz.name);
    if tz.is_daylight_saving {
      out.push_str(" DST");
    }
    if has_offset {
      out.push(',');
    }
    out.push(' ');
  }
  if has_offset {
    out.push_str("GMT");
    out.push_str(&tz.utc_offset);
    if !has_name && tz.is_daylight_saving {
      out.push_str(" DST");
    }
  }
  if !tz.abbreviation.is_empty() {
    if out.is_empty() {
      out.push_str(&tz.abbreviation);
    } else {
      let _ = write!(out, " ({})", tz.abbreviation);
    }
  }
  out
}

fn currency_summary(currency: &Currency) -> String {
  let Currency {
    name, code, symbol, ..
  } = currency;

  let qualifier = match (code.is_empty(), symbol.is_empty()) {
    (false, false) => Some(format!("{code}, {symbol}")),
    (false, true) => Some(code.clone()),
    (true, false) => Some(symbol.clone()),
    (true, true) => None,
  };

  if !name.is_empty() {
    return qualifier.map_or_else(|| name.clone(), |q| format!("{name} ({q})"));
  }

  if code.is_empty() || symbol.is_empty() {
    qualifier.unwrap_or_default()
  } else {
    format!("{code} ({symbol})")
  }
}

fn languages_summary(languages: &[Language]) -> String {
  languages
    .iter()
    .map(|l| l.name.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

fn threat_summary(threat: &Threat) -> String {
  let labels: Vec<&str> = [
    (threat.is_tor, "Tor"),
    (threat.is_proxy, "Proxy"),
    (threat.is_anonymous, "Anonymous"),
    (threat.is_known_attacker, "Known attacker"),
    (threat.is_known_abuser, "Known abuser"),
    (threat.is_generic_threat, "Threat"),
    (threat.is_bogon, "Bogon"),
  ]
  .into_iter()
  .filter_map(|(set, label)| set.then_some(label))
  .collect();

  if labels.is_empty() {
    "None".to_string()
  } else {
    labels.join(", ")
  }
}

/// Renders `record` for the terminal.
///
/// With `raw_json` the result is the raw payload, byte for byte. Otherwise
/// a report that always ends with exactly one blank line.
pub fn render(record: &Record, options: Options) -> String {
  if options.raw_json {
    return record.raw_payload.as_deref().unwrap_or_default().to_string();
  }

  let mut out = String::new();
  let _ = writeln!(out, "IP: {}", record.ip);

  let has_region = !record.region.is_empty();
  // A city is only shown next to a region; postal alone drops it.
  if !record.postal.is_empty() {
    if has_region {
      plain(&mut out, format_args!("{} {}", record.postal, record.city));
    } else {
      plain(&mut out, &record.postal);
    }
  } else if has_region {
    plain(&mut out, &record.city);
  }
  if has_region {
    plain(&mut out, &record.region);
  }

  if !record.country_name.is_empty() {
    plain(
      &mut out,
      name_with_code(&record.country_name, &record.country_code),
    );
  }
  if !record.continent_name.is_empty() {
    plain(
      &mut out,
      name_with_code(&record.continent_name, &record.continent_code),
    );
  }

  field(
    &mut out,
    "Coordinates:",
    format_args!("{}, {}", record.latitude, record.longitude),
  );
  out.push('\n');

  if !record.flag.is_empty() {
    field(&mut out, "Flag:", flag_repr(record, options));
  }

  let time_zone = time_zone_summary(&record.time_zone);
  if !time_zone.is_empty() {
    field(&mut out, "Time zone:", time_zone);
  }

  let currency = currency_summary(&record.currency);
  if !currency.is_empty() {
    field(&mut out, "Currency:", currency);
  }

  let languages = languages_summary(&record.languages);
  if !languages.is_empty() {
    field(&mut out, "Languages:", languages);
  }

  if !record.calling_code.is_empty() {
    field(
      &mut out,
      "Calling code:",
      format_args!("+{}", record.calling_code),
    );
  }
  out.push('\n');

  if !record.asn.name.is_empty() {
    field(
      &mut out,
      "Organization:",
      name_with_code(&record.asn.name, &record.asn.domain),
    );
  }
  if !record.asn.number.is_empty() {
    field(&mut out, "AS number:", &record.asn.number);
  }

  field(&mut out, "Threat:", threat_summary(&record.threat));

  if !out.ends_with("\n\n") {
    out.push('\n');
  }
  out
}
