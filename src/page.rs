//! Lifecycle glue: one page, its host services, configuration resolved once
//! per load, and click handling for the generated buttons.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::augment::buttons::{BRANCH_LABEL, COPIED_LABEL, LABEL_REVERT_DELAY};
use crate::augment::{self, AugmentReport, ButtonKind, ClickAction};
use crate::config::Configuration;
use crate::dom::{Document, NodeId};
use crate::host::{BrowserHost, HostError};
use crate::settings::{load_config, SettingsStore};

pub type SharedDocument = Arc<Mutex<Document>>;

/// Result of dispatching a click on a generated button
#[derive(Debug)]
pub enum ClickOutcome {
    Opened(String),
    OpenFailed(HostError),
    /// Label switched to the confirmation; the handle resolves once it is back
    Copied { revert: JoinHandle<()> },
    CopyFailed(HostError),
    NotAButton,
}

pub struct Page {
    document: SharedDocument,
    host: Arc<dyn BrowserHost>,
}

impl Page {
    pub fn new(document: Document, host: Arc<dyn BrowserHost>) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
            host,
        }
    }

    pub fn document(&self) -> SharedDocument {
        Arc::clone(&self.document)
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        lock_document(&self.document)
    }

    /// Runs `f` with read access to the page.
    pub fn with_document<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.lock())
    }

    /// One augmentation pass with an already resolved configuration.
    pub fn run(&self, config: Option<&Configuration>) -> AugmentReport {
        augment::run(&mut self.lock(), config)
    }

    /// Page finished loading: resolve the configuration once, then augment.
    pub async fn on_content_ready(&self, store: &dyn SettingsStore) -> AugmentReport {
        let config = load_config(store).await;
        self.run(Some(&config))
    }

    /// First generated button of `kind` in document order.
    pub fn find_button(&self, kind: ButtonKind) -> Option<NodeId> {
        let doc = self.lock();
        doc.descendants(doc.root())
            .into_iter()
            .find(|&node| ButtonKind::of(&doc, node) == Some(kind))
    }

    /// Dispatches a click on `node`.
    pub async fn click(&self, node: NodeId) -> ClickOutcome {
        let action = ClickAction::of(&self.lock(), node);
        match action {
            None => ClickOutcome::NotAButton,
            Some(ClickAction::OpenInNewContext(url)) => {
                match self.host.open_in_new_context(&url).await {
                    Ok(()) => {
                        info!(url, "Opened task");
                        ClickOutcome::Opened(url)
                    }
                    Err(err) => {
                        error!(url, "{err}");
                        ClickOutcome::OpenFailed(err)
                    }
                }
            }
            Some(ClickAction::CopyToClipboard(text)) => {
                match self.host.write_clipboard(&text).await {
                    Ok(()) => {
                        info!(branch = text, "Copied branch name");
                        self.set_label(node, COPIED_LABEL);
                        let document = self.document();
                        let revert = tokio::spawn(async move {
                            tokio::time::sleep(LABEL_REVERT_DELAY).await;
                            if let Err(err) = lock_document(&document).set_text_content(node, BRANCH_LABEL) {
                                warn!("Could not restore branch button label: {err}");
                            }
                        });
                        ClickOutcome::Copied { revert }
                    }
                    Err(err) => {
                        error!(branch = text, "{err}");
                        ClickOutcome::CopyFailed(err)
                    }
                }
            }
        }
    }

    fn set_label(&self, node: NodeId, label: &str) {
        if let Err(err) = self.lock().set_text_content(node, label) {
            warn!("Could not update button label: {err}");
        }
    }
}

fn lock_document(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::host::MockBrowserHost;
    use crate::settings::MockSettingsStore;
    use crate::settings::SettingsError;
    use mockall::predicate::eq;
    use std::time::Duration;

    const PAGE: &str = r#"<div><a href="/odoo-dev/odoo/tree/17.0-opw-12-fix">b</a></div>"#;

    fn label(page: &Page, node: NodeId) -> String {
        page.with_document(|doc| doc.text_content(node))
    }

    #[tokio::test]
    async fn test_content_ready_falls_back_to_defaults() {
        let mut store = MockSettingsStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Err(SettingsError::Read("storage unavailable".to_string())));
        let page = Page::new(parse_html(PAGE), Arc::new(MockBrowserHost::new()));

        let report = page.on_content_ready(&store).await;
        assert_eq!(report.ids.ticket_id.as_deref(), Some("12"));
        assert_eq!(report.buttons_inserted(), 2);
    }

    #[tokio::test]
    async fn test_task_click_opens_ticket() {
        let mut host = MockBrowserHost::new();
        host.expect_open_in_new_context()
            .with(eq("https://www.odoo.com/odoo/all-tasks/12"))
            .times(1)
            .returning(|_| Ok(()));
        let page = Page::new(parse_html(PAGE), Arc::new(host));
        page.run(None);

        let task = page.find_button(ButtonKind::Task).unwrap();
        assert!(matches!(
            page.click(task).await,
            ClickOutcome::Opened(url) if url == "https://www.odoo.com/odoo/all-tasks/12"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_branch_click_shows_and_reverts_confirmation() {
        let mut host = MockBrowserHost::new();
        host.expect_write_clipboard()
            .with(eq("17.0-opw-12-fix"))
            .times(1)
            .returning(|_| Ok(()));
        let page = Page::new(parse_html(PAGE), Arc::new(host));
        page.run(None);
        let branch = page.find_button(ButtonKind::Branch).unwrap();

        let ClickOutcome::Copied { revert } = page.click(branch).await else {
            panic!("expected a successful copy");
        };
        assert_eq!(label(&page, branch), COPIED_LABEL);

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(label(&page, branch), COPIED_LABEL);

        revert.await.unwrap();
        assert_eq!(label(&page, branch), BRANCH_LABEL);
    }

    #[tokio::test]
    async fn test_branch_click_failure_keeps_label() {
        let mut host = MockBrowserHost::new();
        host.expect_write_clipboard()
            .times(1)
            .returning(|_| Err(HostError::Clipboard("denied".to_string())));
        let page = Page::new(parse_html(PAGE), Arc::new(host));
        page.run(None);
        let branch = page.find_button(ButtonKind::Branch).unwrap();

        assert!(matches!(page.click(branch).await, ClickOutcome::CopyFailed(_)));
        assert_eq!(label(&page, branch), BRANCH_LABEL);
    }

    #[tokio::test]
    async fn test_click_on_plain_element() {
        let page = Page::new(parse_html(PAGE), Arc::new(MockBrowserHost::new()));
        let link = page.with_document(|doc| doc.query_selector("a").unwrap().unwrap());
        assert!(matches!(page.click(link).await, ClickOutcome::NotAButton));
    }
}
