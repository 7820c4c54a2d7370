use crate::domain::scoring::{is_correct, winner};
use crate::domain::test_session_helpers::content;
use crate::domain::{Answer, Winner};

#[test]
fn winner_by_score() {
    assert_eq!(winner(3, 2), Winner::Host);
    assert_eq!(winner(1, 4), Winner::Guest);
    assert_eq!(winner(2, 2), Winner::Tie);
    assert_eq!(winner(0, 0), Winner::Tie);
}

#[test]
fn code_match_is_case_insensitive() {
    let france = content("FR", "France", 0.0, 0.0);
    assert!(is_correct(&Answer::new("fr", ""), &france));
    assert!(is_correct(&Answer::new(" FR ", "Wrong"), &france));
}

#[test]
fn name_match_counts_without_code() {
    let france = content("FR", "France", 0.0, 0.0);
    assert!(is_correct(&Answer::new("", "france"), &france));
    assert!(is_correct(&Answer::new("XX", "FRANCE"), &france));
}

#[test]
fn empty_or_wrong_answer_never_matches() {
    let france = content("FR", "France", 0.0, 0.0);
    assert!(!is_correct(&Answer::new("", ""), &france));
    assert!(!is_correct(&Answer::new("  ", "  "), &france));
    assert!(!is_correct(&Answer::new("DE", "Germany"), &france));
}

#[test]
fn answer_label_formats_name_and_code() {
    assert_eq!(Answer::new("FR", "France").label(), "France (FR)");
}

#[test]
fn winner_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Winner::Tie).unwrap(), "\"tie\"");
    assert_eq!(Winner::Guest.as_str(), "guest");
}
