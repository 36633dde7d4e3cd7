use super::*;

// -----------------------------------------------------------------------
// is_yes
// -----------------------------------------------------------------------

#[test]
fn is_yes_accepts_locale_affirmatives() {
    for v in ["Sim", "sim", " YES ", "s", "Y", "1", "true", "TRUE"] {
        assert!(is_yes(v), "expected {v:?} to be yes");
    }
}

#[test]
fn is_yes_rejects_everything_else() {
    for v in ["", "  ", "não", "nao", "no", "0", "false", "si", "yep", "2"] {
        assert!(!is_yes(v), "expected {v:?} to be no");
    }
}

// -----------------------------------------------------------------------
// parse_date / normalize_date
// -----------------------------------------------------------------------

#[test]
fn normalize_date_day_first() {
    assert_eq!(normalize_date("05/01/2025").as_deref(), Some("2025-01-05"));
}

#[test]
fn normalize_date_iso_passthrough() {
    assert_eq!(normalize_date("2025-01-05").as_deref(), Some("2025-01-05"));
}

#[test]
fn normalize_date_placeholders_are_none() {
    assert_eq!(normalize_date("-"), None);
    assert_eq!(normalize_date("N/A"), None);
    assert_eq!(normalize_date(""), None);
    assert_eq!(normalize_date("   "), None);
}

#[test]
fn normalize_date_garbage_is_none() {
    assert_eq!(normalize_date("amanhã"), None);
    assert_eq!(normalize_date("31/02/2025"), None);
    assert_eq!(normalize_date("13/13/2025"), None);
}

#[test]
fn normalize_date_single_digit_day_and_month() {
    assert_eq!(normalize_date("5/1/2025").as_deref(), Some("2025-01-05"));
}

#[test]
fn normalize_date_two_digit_year() {
    assert_eq!(normalize_date("05/01/25").as_deref(), Some("2025-01-05"));
}

#[test]
fn normalize_date_with_time_component() {
    assert_eq!(
        normalize_date("2025-01-05 14:30:00").as_deref(),
        Some("2025-01-05")
    );
    assert_eq!(normalize_date("05/01/2025 09:15").as_deref(), Some("2025-01-05"));
    assert_eq!(
        normalize_date("2025-01-05T14:30:00Z").as_deref(),
        Some("2025-01-05")
    );
}

#[test]
fn normalize_date_english_month_names() {
    assert_eq!(normalize_date("Jan 5, 2025").as_deref(), Some("2025-01-05"));
    assert_eq!(
        normalize_date("5 January 2025").as_deref(),
        Some("2025-01-05")
    );
}

// -----------------------------------------------------------------------
// parse_count
// -----------------------------------------------------------------------

#[test]
fn parse_count_whole_numbers() {
    assert_eq!(parse_count("10"), Some(10));
    assert_eq!(parse_count(" 0 "), Some(0));
    assert_eq!(parse_count("4.0"), Some(4));
}

#[test]
fn parse_count_absent_on_failure() {
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("-"), None);
    assert_eq!(parse_count("abc"), None);
    assert_eq!(parse_count("4.5"), None);
}

// -----------------------------------------------------------------------
// parse_amount
// -----------------------------------------------------------------------

#[test]
fn parse_amount_brazilian_format() {
    assert_eq!(parse_amount("R$ 1.500,00"), Some(Decimal::new(150_000, 2)));
    assert_eq!(parse_amount("2500,5"), Some(Decimal::new(25_005, 1)));
}

#[test]
fn parse_amount_us_format() {
    assert_eq!(parse_amount("1,500.50"), Some(Decimal::new(150_050, 2)));
    assert_eq!(parse_amount("1500.00"), Some(Decimal::new(150_000, 2)));
    assert_eq!(parse_amount("$1,500"), Some(Decimal::new(1500, 0)));
}

#[test]
fn parse_amount_thousands_dot() {
    assert_eq!(parse_amount("1.500"), Some(Decimal::new(1500, 0)));
    assert_eq!(parse_amount("1.250.000"), Some(Decimal::new(1_250_000, 0)));
}

#[test]
fn parse_amount_absent_on_failure() {
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("a combinar"), None);
    assert_eq!(parse_amount("N/A"), None);
}

#[test]
fn non_empty_filters_placeholders() {
    assert_eq!(non_empty("  Acme "), Some("Acme".to_string()));
    assert_eq!(non_empty("-"), None);
    assert_eq!(non_empty(""), None);
}
