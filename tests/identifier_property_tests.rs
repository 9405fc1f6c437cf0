// Property-based tests for identifier extraction and linkification
// Checks the extraction rules and link idempotence over generated branch names and bodies

use odoo_pr_linker::augment::{IdKind, ResolvedIds, TICKET_PREFIXES};
use odoo_pr_linker::{extract_id, find_id, linkify, parse_html};
use proptest::prelude::*;

// Ticket prefixes in any letter case
fn ticket_prefix_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[oO][pP][wW]", "[tT][aA][sS][kK]"]
}

// Filler that can never form an identifier on its own
fn filler_strategy() -> impl Strategy<Value = String> {
    "[a-z ]{0,12}"
}

fn mention_strategy() -> impl Strategy<Value = (String, String)> {
    (ticket_prefix_strategy(), "[0-9]{1,9}")
}

proptest! {
    #[test]
    fn extract_id_returns_the_digits_verbatim(
        prefix in ticket_prefix_strategy(),
        digits in "[0-9]{1,9}",
        head in "[0-9.]{1,5}-[a-z]{0,8}-?",
        tail in "(-[a-z]{1,8})?",
    ) {
        let branch = format!("{head}{prefix}-{digits}{tail}");
        let lowered = prefix.to_lowercase();
        prop_assert_eq!(extract_id(Some(&branch), &lowered), Some(digits.clone()));
        prop_assert_eq!(find_id(Some(&branch), &TICKET_PREFIXES), Some(digits));
    }

    #[test]
    fn text_without_dashes_has_no_id(text in "[a-zA-Z0-9 ]{0,40}") {
        prop_assert_eq!(find_id(Some(&text), &TICKET_PREFIXES), None);
        prop_assert_eq!(extract_id(Some(&text), IdKind::Runbot.prefix()), None);
    }

    #[test]
    fn branch_id_always_beats_body_id(
        branch_digits in "[0-9]{1,6}",
        body_digits in "[0-9]{1,6}",
    ) {
        let branch = format!("17.0-opw-{branch_digits}-fix");
        let body = format!("see task-{body_digits}");
        let ids = ResolvedIds::resolve(Some(&branch), Some(&body));
        prop_assert_eq!(ids.ticket_id, Some(branch_digits));
    }

    #[test]
    fn linkify_creates_one_link_per_mention_once(
        mentions in prop::collection::vec((filler_strategy(), mention_strategy()), 0..6),
        tail in filler_strategy(),
    ) {
        let mut text = String::new();
        for (filler, (prefix, digits)) in &mentions {
            text.push_str(filler);
            text.push_str(&format!("{prefix}-{digits}"));
        }
        text.push_str(&tail);

        let mut doc = parse_html(&format!(r#"<div id="body"><p>{text}</p></div>"#));
        let body = doc.query_selector("#body").unwrap();

        let created = linkify(&mut doc, body, &TICKET_PREFIXES).unwrap();
        prop_assert_eq!(created, mentions.len());
        prop_assert_eq!(linkify(&mut doc, body, &TICKET_PREFIXES).unwrap(), 0);

        let body = body.unwrap();
        prop_assert_eq!(doc.text_content(body), text);
    }
}
