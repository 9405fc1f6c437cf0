//! Page augmentation: identifier links in the pull request body and action
//! buttons next to every branch link.
//!
//! A pass is safe to repeat on the same page. Generated elements carry marker
//! classes and their presence is the only thing that stops a second insertion.

pub mod buttons;
pub mod ids;
pub mod linkify;
pub mod styles;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::Configuration;
use crate::dom::{Document, DomError, NodeId, SelectorList};
use crate::telemetry::{create_augmentation_span, generate_correlation_id, DIAGNOSTIC_PREFIX};

pub use buttons::{create_buttons, ButtonKind, ClickAction};
pub use ids::{extract_id, find_id, IdKind, ResolvedIds, RUNBOT_PREFIXES, TICKET_PREFIXES};
pub use linkify::{linkify, Linkifier};
pub use styles::{BRANCH_BUTTON_CLASS, LINKIFIED_CLASS, TASK_BUTTON_CLASS};

/// Outcome for one element matched by the branch selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderOutcome {
    Inserted { buttons: usize },
    AlreadyAugmented,
    NoContainer,
}

/// What one pass found and changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AugmentReport {
    pub branch_title: Option<String>,
    #[serde(flatten)]
    pub ids: ResolvedIds,
    pub body_found: bool,
    pub links_created: usize,
    pub headers: Vec<HeaderOutcome>,
}

impl AugmentReport {
    pub fn buttons_inserted(&self) -> usize {
        self.headers
            .iter()
            .map(|outcome| match outcome {
                HeaderOutcome::Inserted { buttons } => *buttons,
                _ => 0,
            })
            .sum()
    }
}

/// Runs one augmentation pass. Never fails: any error is logged with
/// [`DIAGNOSTIC_PREFIX`] and an empty report is returned.
pub fn run(doc: &mut Document, config: Option<&Configuration>) -> AugmentReport {
    let default_config;
    let config = match config {
        Some(config) => config,
        None => {
            default_config = Configuration::default();
            &default_config
        }
    };

    let pass_id = generate_correlation_id();
    let span = create_augmentation_span(
        &pass_id,
        &config.branch_selector,
        &config.pull_request_body_selector,
    );
    let _guard = span.enter();

    match augment(doc, config) {
        Ok(report) => {
            info!(
                ticket_id = report.ids.ticket_id.as_deref(),
                runbot_ticket_id = report.ids.runbot_ticket_id.as_deref(),
                links = report.links_created,
                buttons = report.buttons_inserted(),
                "Augmentation pass complete"
            );
            report
        }
        Err(err) => {
            error!("{DIAGNOSTIC_PREFIX}: {err}");
            AugmentReport::default()
        }
    }
}

fn augment(doc: &mut Document, config: &Configuration) -> Result<AugmentReport, DomError> {
    let branch_selector = SelectorList::parse(&config.branch_selector)?;
    let body_selector = SelectorList::parse(&config.pull_request_body_selector)?;

    let branch_elements = doc.select_within(doc.root(), &branch_selector);
    let body = doc.select_within(doc.root(), &body_selector).into_iter().next();
    debug!(
        branch_elements = branch_elements.len(),
        body_found = body.is_some(),
        "Located page elements"
    );

    let branch_title = branch_elements
        .iter()
        .filter_map(|&element| doc.attribute(element, "href"))
        .find(|href| !href.is_empty())
        .map(last_path_segment);
    let body_text = body.map(|body| doc.text_content(body));
    let ids = ResolvedIds::resolve(branch_title.as_deref(), body_text.as_deref());

    let links_created = match body {
        Some(body) => linkify(doc, Some(body), &TICKET_PREFIXES)?,
        None => 0,
    };

    let branch_name = branch_title.clone().unwrap_or_default();
    let mut headers = Vec::with_capacity(branch_elements.len());
    for element in branch_elements {
        headers.push(augment_header(doc, element, &ids, &branch_name)?);
    }

    Ok(AugmentReport {
        branch_title,
        ids,
        body_found: body.is_some(),
        links_created,
        headers,
    })
}

/// Adds a fresh button set after the last child of the branch element's
/// container, unless that container already holds one.
fn augment_header(
    doc: &mut Document,
    branch_element: NodeId,
    ids: &ResolvedIds,
    branch_name: &str,
) -> Result<HeaderOutcome, DomError> {
    let Some(container) = doc
        .closest_tag(branch_element, "div")
        .or_else(|| doc.parent_element(branch_element))
    else {
        debug!(?branch_element, "Branch element has no container");
        return Ok(HeaderOutcome::NoContainer);
    };

    let already_augmented = doc
        .descendants(container)
        .into_iter()
        .any(|node| ButtonKind::of(doc, node).is_some());
    if already_augmented {
        debug!(?container, "Buttons already present");
        return Ok(HeaderOutcome::AlreadyAugmented);
    }

    let buttons = create_buttons(
        doc,
        ids.ticket_id.as_deref(),
        ids.runbot_ticket_id.as_deref(),
        branch_name,
    )?;
    for &button in &buttons {
        match doc.last_element_child(container) {
            Some(last) => doc.insert_after(last, button)?,
            None => doc.append_child(container, button)?,
        }
    }
    Ok(HeaderOutcome::Inserted {
        buttons: buttons.len(),
    })
}

fn last_path_segment(href: &str) -> String {
    href.rsplit('/').next().unwrap_or(href).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{outer_html, parse_html};

    const PAGE: &str = r#"
        <div class="gh-header">
          <span>wants to merge into</span>
          <span class="head-ref"><a href="/odoo-dev/odoo/tree/17.0-fix-opw-4242-abc" title="odoo-dev/odoo:17.0-fix-opw-4242-abc">odoo-dev:17.0-fix-opw-4242-abc</a></span>
        </div>
        <div class="sticky"><a href="/odoo-dev/odoo/tree/17.0-fix-opw-4242-abc">sticky</a></div>
        <div class="js-command-palette-pull-body"><p>Also see task-7 and <code>opw-8</code></p></div>
    "#;

    fn classes_in(doc: &Document, selector: &str) -> usize {
        doc.query_selector_all(selector).unwrap().len()
    }

    #[test]
    fn test_full_pass() {
        let mut doc = parse_html(PAGE);
        let report = run(&mut doc, None);

        assert_eq!(report.branch_title.as_deref(), Some("17.0-fix-opw-4242-abc"));
        assert_eq!(report.ids.ticket_id.as_deref(), Some("4242"));
        assert_eq!(report.ids.runbot_ticket_id, None);
        assert_eq!(report.links_created, 1);
        assert_eq!(
            report.headers,
            vec![
                HeaderOutcome::Inserted { buttons: 2 },
                HeaderOutcome::Inserted { buttons: 2 },
            ]
        );
        assert_eq!(classes_in(&doc, ".odoo-task-button"), 2);
        assert_eq!(classes_in(&doc, ".odoo-branch-button"), 2);

        let header = doc.query_selector(".gh-header").unwrap().unwrap();
        let children: Vec<_> = doc.element_children(header).collect();
        assert_eq!(ButtonKind::of(&doc, children[2]), Some(ButtonKind::Task));
        assert_eq!(ButtonKind::of(&doc, children[3]), Some(ButtonKind::Branch));
        assert_eq!(
            doc.attribute(children[3], buttons::COPY_TEXT_ATTRIBUTE),
            Some("17.0-fix-opw-4242-abc")
        );
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut doc = parse_html(PAGE);
        run(&mut doc, None);
        let once = outer_html(&doc, doc.root());
        let report = run(&mut doc, None);
        assert_eq!(outer_html(&doc, doc.root()), once);
        assert_eq!(report.links_created, 0);
        assert_eq!(report.buttons_inserted(), 0);
        assert_eq!(
            report.headers,
            vec![HeaderOutcome::AlreadyAugmented, HeaderOutcome::AlreadyAugmented]
        );
    }

    #[test]
    fn test_unmatched_selectors_leave_page_untouched() {
        let mut doc = parse_html(PAGE);
        let before = outer_html(&doc, doc.root());
        let config = Configuration {
            branch_selector: "a.nope".to_string(),
            pull_request_body_selector: "#nope".to_string(),
        };
        let report = run(&mut doc, Some(&config));
        assert_eq!(outer_html(&doc, doc.root()), before);
        assert_eq!(report, AugmentReport::default());
    }

    #[test]
    fn test_invalid_selector_is_suppressed() {
        let mut doc = parse_html(PAGE);
        let before = outer_html(&doc, doc.root());
        let config = Configuration {
            branch_selector: "a[href".to_string(),
            pull_request_body_selector: ".js-command-palette-pull-body".to_string(),
        };
        let report = run(&mut doc, Some(&config));
        assert_eq!(report, AugmentReport::default());
        assert_eq!(outer_html(&doc, doc.root()), before);
    }

    #[test]
    fn test_body_ids_used_when_branch_has_none() {
        let mut doc = parse_html(
            r#"<div><a href="/odoo-dev/odoo/tree/master-cleanup">b</a></div>
               <div class="js-command-palette-pull-body">runbot-31 opw-9</div>"#,
        );
        let report = run(&mut doc, None);
        assert_eq!(report.ids.ticket_id.as_deref(), Some("9"));
        assert_eq!(report.ids.runbot_ticket_id.as_deref(), Some("31"));
    }

    #[test]
    fn test_runbot_only_gets_runbot_task_button() {
        let mut doc = parse_html(r#"<div><a href="/odoo-dev/odoo/tree/master-fix-runbot-77">b</a></div>"#);
        run(&mut doc, None);
        let task = doc.query_selector(".odoo-task-button").unwrap().unwrap();
        assert_eq!(
            doc.attribute(task, "href"),
            Some("https://runbot.odoo.com/odoo/runbot.build.error/77")
        );
    }

    #[test]
    fn test_no_ids_gives_branch_button_only() {
        let mut doc = parse_html(r#"<div><a href="/odoo-dev/odoo/tree/master-cleanup">b</a></div>"#);
        let report = run(&mut doc, None);
        assert_eq!(report.headers, vec![HeaderOutcome::Inserted { buttons: 1 }]);
        assert_eq!(classes_in(&doc, ".odoo-task-button"), 0);
    }

    #[test]
    fn test_every_match_is_handled_independently() {
        let mut doc = parse_html(
            r#"<div id="one"><a href="/odoo-dev/x/tree/task-1">1</a></div>
               <div id="two"><a href="/odoo-dev/x/tree/task-1">2</a></div>
               <div id="three"><a href="/odoo-dev/x/tree/task-1">3</a></div>"#,
        );
        let report = run(&mut doc, None);
        assert_eq!(report.headers.len(), 3);
        assert_eq!(report.buttons_inserted(), 6);
    }

    #[test]
    fn test_shared_container_gets_one_set() {
        let mut doc = parse_html(
            r#"<div><a href="/odoo-dev/x/tree/task-1">1</a><a href="/odoo-dev/x/tree/task-1">2</a></div>"#,
        );
        let report = run(&mut doc, None);
        assert_eq!(
            report.headers,
            vec![HeaderOutcome::Inserted { buttons: 2 }, HeaderOutcome::AlreadyAugmented]
        );
    }

    #[test]
    fn test_container_falls_back_to_parent_element() {
        let mut doc = parse_html(r#"<span><a href="/odoo-dev/x/tree/opw-3">b</a></span>"#);
        let report = run(&mut doc, None);
        assert_eq!(report.headers, vec![HeaderOutcome::Inserted { buttons: 2 }]);
        let span = doc.query_selector("span").unwrap().unwrap();
        assert_eq!(doc.element_children(span).count(), 3);
    }

    #[test]
    fn test_top_level_link_has_no_container() {
        let mut doc = parse_html(r#"<a href="/odoo-dev/x/tree/opw-3">b</a>"#);
        let report = run(&mut doc, None);
        assert_eq!(report.headers, vec![HeaderOutcome::NoContainer]);
    }

    #[test]
    fn test_branch_title_falls_back_to_later_match() {
        let mut doc = parse_html(
            r#"<div><a href="" class="odoo-dev">x</a></div><div><a href="/odoo-dev/o/tree/task-5">y</a></div>"#,
        );
        let config = Configuration {
            branch_selector: "a".to_string(),
            ..Configuration::default()
        };
        let report = run(&mut doc, Some(&config));
        assert_eq!(report.branch_title.as_deref(), Some("task-5"));
    }

    #[test]
    fn test_lookalike_branch_prefix_gives_no_task_button() {
        let mut doc = parse_html("<div><a href=\"/odoo-dev/o/tree/ta\u{17f}k-5\">b</a></div>");
        let report = run(&mut doc, None);
        assert_eq!(report.ids.ticket_id, None);
        assert_eq!(report.headers, vec![HeaderOutcome::Inserted { buttons: 1 }]);
        assert_eq!(classes_in(&doc, ".odoo-task-button"), 0);
    }
}
