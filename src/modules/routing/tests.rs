use crate::modules::routing::{
    classify, parse_keywords, CategoryRule, ClassificationResult, EmailCategory, RoutingConfig,
};
use crate::modules::settings::cli::Settings;

fn config() -> RoutingConfig {
    RoutingConfig::new(
        "default@example.com",
        vec![
            CategoryRule::new(
                EmailCategory::TypeA,
                Some("invoice, Payment"),
                Some("a@example.com"),
            ),
            CategoryRule::new(EmailCategory::TypeB, Some("support"), Some("b@example.com")),
            CategoryRule::new(
                EmailCategory::TypeC,
                Some("delivery failure,bounce"),
                Some("c@example.com"),
            ),
        ],
    )
}

#[test]
fn keyword_lists_are_trimmed_and_lowercased() {
    assert_eq!(
        parse_keywords(" Invoice ,PAYMENT,, "),
        vec!["invoice".to_string(), "payment".to_string()]
    );
}

#[test]
fn matching_is_case_insensitive_substring() {
    let result = classify("Your PAYMENT receipt", &config());
    assert_eq!(
        result,
        ClassificationResult {
            category: EmailCategory::TypeA,
            destination: "a@example.com".into()
        }
    );
}

#[test]
fn last_matching_category_wins() {
    let result = classify("Invoice — delivery failure", &config());
    assert_eq!(result.category, EmailCategory::TypeC);
    assert_eq!(result.destination, "c@example.com");
}

#[test]
fn a_and_b_match_resolves_to_b() {
    let result = classify("invoice support request", &config());
    assert_eq!(result.category, EmailCategory::TypeB);
}

#[test]
fn no_match_uses_default() {
    let result = classify("Lunch on Friday?", &config());
    assert_eq!(
        result,
        ClassificationResult {
            category: EmailCategory::Default,
            destination: "default@example.com".into()
        }
    );
}

#[test]
fn empty_subject_is_default() {
    assert_eq!(classify("", &config()).category, EmailCategory::Default);
}

#[test]
fn category_without_keywords_is_never_selected() {
    let config = RoutingConfig::new(
        "default@example.com",
        vec![
            CategoryRule::new(EmailCategory::TypeA, None, Some("a@example.com")),
            CategoryRule::new(EmailCategory::TypeB, Some(""), Some("b@example.com")),
            CategoryRule::new(EmailCategory::TypeC, Some(" , "), Some("c@example.com")),
        ],
    );
    assert_eq!(classify("anything", &config).category, EmailCategory::Default);
}

#[test]
fn missing_override_keeps_destination_selected_so_far() {
    let config = RoutingConfig::new(
        "default@example.com",
        vec![
            CategoryRule::new(EmailCategory::TypeA, Some("invoice"), Some("a@example.com")),
            CategoryRule::new(EmailCategory::TypeC, Some("failure"), None),
        ],
    );
    let both = classify("invoice failure", &config);
    assert_eq!(both.category, EmailCategory::TypeC);
    assert_eq!(both.destination, "a@example.com");

    let only_c = classify("failure", &config);
    assert_eq!(only_c.category, EmailCategory::TypeC);
    assert_eq!(only_c.destination, "default@example.com");
}

#[test]
fn rules_are_evaluated_in_category_order() {
    let config = RoutingConfig::new(
        "default@example.com",
        vec![
            CategoryRule::new(EmailCategory::TypeC, Some("x"), Some("c@example.com")),
            CategoryRule::new(EmailCategory::TypeA, Some("x"), Some("a@example.com")),
        ],
    );
    let categories: Vec<_> = config.rules().iter().map(|r| r.category).collect();
    assert_eq!(categories, vec![EmailCategory::TypeA, EmailCategory::TypeC]);
    assert_eq!(classify("x", &config).category, EmailCategory::TypeC);
}

#[test]
fn default_category_rules_are_dropped() {
    let config = RoutingConfig::new(
        "default@example.com",
        vec![CategoryRule::new(EmailCategory::Default, Some("x"), Some("z@example.com"))],
    );
    assert!(config.rules().is_empty());
}

#[test]
fn blank_destination_override_is_absent() {
    let rule = CategoryRule::new(EmailCategory::TypeA, Some("x"), Some("  "));
    assert!(rule.destination.is_none());
}

#[test]
fn config_is_built_from_settings() {
    let config = RoutingConfig::from_settings(&Settings::new_for_test());
    assert_eq!(config.default_destination(), "default@example.com");
    assert_eq!(config.rules().len(), 3);
    assert_eq!(config.rules()[0].keywords, vec!["invoice", "payment"]);
    let result = classify("Re: Support inquiry", &config);
    assert_eq!(result.category, EmailCategory::TypeB);
    assert_eq!(result.destination, "support@example.com");
}

#[test]
fn category_labels() {
    assert_eq!(EmailCategory::TypeA.to_string(), "TYPE_A");
    assert_eq!(EmailCategory::Default.to_string(), "DEFAULT");
}
