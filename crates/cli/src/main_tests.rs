use super::*;

#[test]
fn accepts_a_well_formed_downloader_nickname() {
    assert!(validate_downloader("nick-name_42").is_ok());
}

#[test]
fn rejects_a_downloader_nickname_that_is_too_short() {
    assert!(validate_downloader("ab").is_err());
}

#[test]
fn rejects_a_downloader_nickname_with_illegal_characters() {
    assert!(validate_downloader("nick name!").is_err());
}

#[test]
fn defaults_concurrency_to_one() {
    assert_eq!(validate_concurrency(None).unwrap(), 1);
}

#[test]
fn rejects_concurrency_above_the_hard_limit() {
    assert!(validate_concurrency(Some(21)).is_err());
}

#[test]
fn accepts_but_would_warn_above_six_concurrent_items() {
    assert_eq!(validate_concurrency(Some(10)).unwrap(), 10);
}

#[test]
fn parses_multiple_context_value_pairs() {
    let context = parse_context_values(&["a=1".to_string(), "b=two".to_string()]).unwrap();
    assert_eq!(context.get("a").map(String::as_str), Some("1"));
    assert_eq!(context.get("b").map(String::as_str), Some("two"));
}

#[test]
fn rejects_a_context_value_without_an_equals_sign() {
    assert!(parse_context_values(&["not-a-pair".to_string()]).is_err());
}
