// ── Icon table ──
//
// Material Design icon per field, with optional per-state variants
// (`on` / `off`, `fault` / `normal`) and per-value variants (`Manual On`,
// `A`, ...). Read-only; looked up by field key.

/// Icon used when nothing more specific is known.
pub const FALLBACK_ICON: &str = "mdi:help-circle";

type Variants = &'static [(&'static str, &'static str)];

static ICONS: &[(&str, Variants)] = &[
    ("pump", &[("on", "mdi:pump"), ("off", "mdi:pump-off")]),
    ("phPump", &[("on", "mdi:heat-pump"), ("off", "mdi:heat-pump-outline")]),
    ("light", &[("on", "mdi:lightbulb-on"), ("off", "mdi:lightbulb-off")]),
    ("valve", &[("on", "mdi:valve-open"), ("off", "mdi:valve-closed")]),
    ("aux2", &[("on", "mdi:power-plug"), ("off", "mdi:power-plug-off")]),
    (
        "cellDirectionA",
        &[
            ("on", "mdi:arrow-left-bold-circle"),
            ("off", "mdi:arrow-left-circle-outline"),
        ],
    ),
    (
        "cellDirectionB",
        &[
            ("on", "mdi:arrow-right-bold-circle"),
            ("off", "mdi:arrow-right-circle-outline"),
        ],
    ),
    (
        "error",
        &[
            ("on", "mdi:alert-circle"),
            ("off", "mdi:check-circle"),
            ("Error", "mdi:alert-circle"),
            ("OK", "mdi:check-circle"),
        ],
    ),
    (
        "saltStatus",
        &[("fault", "mdi:alert-circle"), ("normal", "mdi:check-circle")],
    ),
    ("temp", &[("default", "mdi:thermometer")]),
    ("ph", &[("default", "mdi:ph")]),
    ("chlorineProduction", &[("default", "mdi:chemical-weapon")]),
    (
        "operation",
        &[
            ("Manual Standby", "mdi:pause-circle-outline"),
            ("Manual On", "mdi:play-circle-outline"),
            ("default", "mdi:help-circle-outline"),
        ],
    ),
    (
        "operationType",
        &[
            ("Manual", "mdi:hand-back-left"),
            ("Automatic", "mdi:robot"),
            ("default", "mdi:help-circle-outline"),
        ],
    ),
    ("pumpSpeed", &[("default", "mdi:speedometer")]),
    ("lightColor", &[("default", "mdi:palette")]),
    (
        "status",
        &[
            ("A", "mdi:arrow-left-bold-circle"),
            ("B", "mdi:arrow-right-bold-circle"),
            ("Off", "mdi:power-off"),
            ("default", "mdi:help-circle-outline"),
        ],
    ),
];

fn variants(key: &str) -> Variants {
    ICONS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(&[], |(_, v)| *v)
}

fn variant(key: &str, name: &str) -> Option<&'static str> {
    variants(key)
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, icon)| *icon)
}

fn default_icon(key: &str) -> &'static str {
    variant(key, "default").unwrap_or(FALLBACK_ICON)
}

/// Icon for an on/off entity (binary sensor flag or switch).
pub fn state_icon(key: &str, on: Option<bool>) -> &'static str {
    on.and_then(|on| variant(key, if on { "on" } else { "off" }))
        .unwrap_or_else(|| default_icon(key))
}

/// Icon for the salt fault sensor.
pub fn fault_icon(key: &str, fault: Option<bool>) -> &'static str {
    match fault {
        Some(true) => variant(key, "fault").unwrap_or(FALLBACK_ICON),
        _ => variant(key, "normal").unwrap_or_else(|| default_icon(key)),
    }
}

/// Icon for a value sensor, given its rendered value.
///
/// Boolean-looking values pick the `on` / `off` variant; other values pick
/// a variant named after the value itself.
pub fn value_icon(key: &str, value: Option<&str>) -> &'static str {
    let Some(value) = value else {
        return default_icon(key);
    };
    let lowered = value.to_ascii_lowercase();
    let by_state = match lowered.as_str() {
        "true" | "on" => variant(key, "on"),
        "false" | "off" => variant(key, "off"),
        _ => None,
    };
    by_state
        .or_else(|| variant(key, value))
        .unwrap_or_else(|| default_icon(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_icons_follow_state() {
        assert_eq!(state_icon("pump", Some(true)), "mdi:pump");
        assert_eq!(state_icon("pump", Some(false)), "mdi:pump-off");
        assert_eq!(state_icon("pump", None), FALLBACK_ICON);
        assert_eq!(state_icon("unknown", Some(true)), FALLBACK_ICON);
    }

    #[test]
    fn value_icons_match_values_then_default() {
        assert_eq!(value_icon("operation", Some("Manual On")), "mdi:play-circle-outline");
        assert_eq!(value_icon("operation", Some("Timer")), "mdi:help-circle-outline");
        assert_eq!(value_icon("status", Some("Off")), "mdi:power-off");
        assert_eq!(value_icon("error", Some("Error")), "mdi:alert-circle");
        assert_eq!(value_icon("temp", Some("27.5")), "mdi:thermometer");
        assert_eq!(value_icon("temp", None), "mdi:thermometer");
    }

    #[test]
    fn fault_icons() {
        assert_eq!(fault_icon("saltStatus", Some(true)), "mdi:alert-circle");
        assert_eq!(fault_icon("saltStatus", Some(false)), "mdi:check-circle");
        assert_eq!(fault_icon("saltStatus", None), "mdi:check-circle");
    }
}
