use once_cell::sync::Lazy;
use std::collections::HashMap;

static STREET_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ave", "Avenue"),
        ("blvd", "Boulevard"),
        ("cir", "Circle"),
        ("ct", "Court"),
        ("dr", "Drive"),
        ("expy", "Expressway"),
        ("hwy", "Highway"),
        ("ln", "Lane"),
        ("pl", "Place"),
        ("pkwy", "Parkway"),
        ("rd", "Road"),
        ("st", "Street"),
        ("sq", "Square"),
        ("tpke", "Turnpike"),
    ])
});

static WRITTEN_NUMBERS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("One", "1")]));

static DIRECTIONALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([("N", "North"), ("E", "East"), ("S", "South"), ("W", "West")])
});

fn strip_trailing_punctuation(value: &str) -> &str {
    value
        .strip_suffix('.')
        .or_else(|| value.strip_suffix(','))
        .unwrap_or(value)
}

/// Canonicalize a free-text street address so independently formatted
/// sources compare equal.
///
/// - a trailing street-type abbreviation is expanded (`St.` -> `Street`)
/// - a trailing `Ext`/`Extension` token is moved after the expansion as `Extension`
/// - a written-out leading number is replaced (`One` -> `1`)
/// - a directional in second position is expanded only when the address has
///   more than three tokens (`100 N Main St` -> `100 North Main Street`)
///
/// Unrecognised tokens pass through unchanged.
pub fn normalize_street_address(street_address: &str) -> String {
    let mut normalized = street_address.to_string();

    if street_address.contains(' ') {
        let mut parts: Vec<String> = street_address.split_whitespace().map(str::to_string).collect();

        if let Some(last) = parts.last().cloned() {
            let mut street_type = last;
            let mut is_extension = false;

            if street_type.to_lowercase().starts_with("ext") && parts.len() > 1 {
                parts.pop();
                street_type = parts[parts.len() - 1].clone();
                is_extension = true;
            }

            let street_type = strip_trailing_punctuation(&street_type).to_lowercase();
            if let Some(expansion) = STREET_TYPES.get(street_type.as_str()) {
                if let Some(slot) = parts.last_mut() {
                    *slot = expansion.to_string();
                }
            }

            if let Some(number) = WRITTEN_NUMBERS.get(parts[0].as_str()) {
                parts[0] = number.to_string();
            }

            if parts.len() > 3 {
                if let Some(direction) = DIRECTIONALS.get(parts[1].as_str()) {
                    parts[1] = direction.to_string();
                }
            }

            if is_extension {
                parts.push("Extension".to_string());
            }

            normalized = parts.join(" ");
        } else {
            normalized = String::new();
        }
    }

    strip_trailing_punctuation(&normalized).to_string()
}
