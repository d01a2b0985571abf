//! One pass over the afisha: fetch, parse, diff, notify, persist.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::assemble::AssemblyContext;
use crate::config::AppConfig;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::novelty;
use crate::scraping;
use crate::seen::{GitCommitStore, JsonSeenStore, SeenStore};
use crate::telegram::{self, Notifier, TelegramNotifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The page could not be fetched; nothing was touched.
    FetchFailed,
    /// The page parsed to zero events; nothing was touched.
    NoEvents,
    Checked {
        found: usize,
        new: usize,
        failed_sends: usize,
    },
}

pub struct Watcher {
    afisha_url: String,
    fetcher: Box<dyn PageFetcher>,
    notifier: Box<dyn Notifier>,
    store: Box<dyn SeenStore>,
}

impl Watcher {
    pub fn new(
        afisha_url: &str,
        fetcher: Box<dyn PageFetcher>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SeenStore>,
    ) -> Self {
        Self {
            afisha_url: afisha_url.to_string(),
            fetcher,
            notifier,
            store,
        }
    }

    /// Watcher wired to the real page, Telegram and the seen file.
    pub fn from_config(config: &AppConfig) -> Self {
        let json_store = JsonSeenStore::new(&config.seen_file);
        let store: Box<dyn SeenStore> = match &config.git {
            Some(git) => Box::new(GitCommitStore::new(json_store, git.clone())),
            None => Box::new(json_store),
        };
        Self::new(
            &config.afisha_url,
            Box::new(HttpFetcher),
            Box::new(TelegramNotifier::from_config(config)),
            store,
        )
    }

    pub fn run_once(&self) -> Result<RunOutcome> {
        let context = AssemblyContext::current(&self.afisha_url)?;
        self.run_with(&context)
    }

    pub fn run_with(&self, context: &AssemblyContext) -> Result<RunOutcome> {
        info!("checking afisha {}", self.afisha_url);
        let html = match self.fetcher.fetch(&self.afisha_url) {
            Ok(html) => html,
            Err(err) => {
                warn!("failed to fetch afisha: {err:#}");
                return Ok(RunOutcome::FetchFailed);
            }
        };

        let events = scraping::parse_page(&html, context);
        if events.is_empty() {
            warn!("no events found on the afisha; the page layout may have changed");
            return Ok(RunOutcome::NoEvents);
        }
        info!("found {} events", events.len());

        let mut seen = self.store.load();
        let fresh = novelty::diff(&events, &seen);
        if fresh.is_empty() {
            info!("no new events");
        }

        let mut failed_sends = 0;
        for event in &fresh {
            match self.notifier.send(&telegram::render_message(event)) {
                Ok(()) => info!("announced {} ({})", event.title, event.starts_at()),
                Err(err) => {
                    failed_sends += 1;
                    warn!("failed to announce {} ({}): {err}", event.title, event.starts_at());
                }
            }
            // marked even when the send failed: a dropped message beats a repeated one
            seen.insert(event.identity_key.clone());
        }

        self.store
            .save(&seen)
            .context("failed to persist seen store")?;

        Ok(RunOutcome::Checked {
            found: events.len(),
            new: fresh.len(),
            failed_sends,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::seen::StoreError;
    use crate::telegram::TelegramError;

    pub(crate) const PAGE: &str = r#"
    <table>
        <tr><td>11.11.2025  19:00</td><td><a href="https://tce.by/show/123">Записки юного врача</a></td></tr>
        <tr><td>12.11.2025 11:00</td><td><a href="https://tce.by/show/124">Буратино</a></td></tr>
    </table>
    "#;

    pub(crate) struct FakeFetcher(pub Option<String>);

    impl PageFetcher for FakeFetcher {
        fn fetch(&self, _url: &str) -> Result<String> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("timed out"))
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeNotifier {
        pub sent: Rc<RefCell<Vec<String>>>,
        pub fail: bool,
    }

    impl Notifier for FakeNotifier {
        fn send(&self, text: &str) -> Result<(), TelegramError> {
            self.sent.borrow_mut().push(text.to_string());
            if self.fail {
                Err(TelegramError::Api("400: chat not found".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        pub keys: Rc<RefCell<Option<HashSet<String>>>>,
        pub saves: Rc<RefCell<usize>>,
    }

    impl SeenStore for MemoryStore {
        fn load(&self) -> HashSet<String> {
            self.keys.borrow().clone().unwrap_or_default()
        }

        fn save(&self, seen: &HashSet<String>) -> Result<(), StoreError> {
            *self.keys.borrow_mut() = Some(seen.clone());
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn context() -> AssemblyContext {
        AssemblyContext::new("https://puppet-minsk.by/afisha", 2025).expect("context")
    }

    fn watcher(page: Option<&str>, notifier: &FakeNotifier, store: &MemoryStore) -> Watcher {
        Watcher::new(
            "https://puppet-minsk.by/afisha",
            Box::new(FakeFetcher(page.map(str::to_string))),
            Box::new(notifier.clone()),
            Box::new(store.clone()),
        )
    }

    #[test]
    fn first_run_announces_and_second_run_is_quiet() {
        let notifier = FakeNotifier::default();
        let store = MemoryStore::default();
        let watcher = watcher(Some(PAGE), &notifier, &store);

        let first = watcher.run_with(&context()).expect("first run");
        assert_eq!(
            first,
            RunOutcome::Checked {
                found: 2,
                new: 2,
                failed_sends: 0
            }
        );
        assert_eq!(notifier.sent.borrow().len(), 2);
        assert!(notifier.sent.borrow()[0].contains("11.11.2025 19:00\nЗаписки юного врача"));
        let after_first = store.load();
        assert_eq!(after_first.len(), 2);
        assert!(after_first
            .contains("11.11.2025 19:00 | Записки юного врача | https://tce.by/show/123"));

        let second = watcher.run_with(&context()).expect("second run");
        assert_eq!(
            second,
            RunOutcome::Checked {
                found: 2,
                new: 0,
                failed_sends: 0
            }
        );
        assert_eq!(notifier.sent.borrow().len(), 2);
        assert_eq!(store.load(), after_first);
    }

    #[test]
    fn fetch_failure_leaves_store_untouched() {
        let notifier = FakeNotifier::default();
        let store = MemoryStore::default();
        let outcome = watcher(None, &notifier, &store)
            .run_with(&context())
            .expect("run");
        assert_eq!(outcome, RunOutcome::FetchFailed);
        assert_eq!(*store.saves.borrow(), 0);
        assert!(store.keys.borrow().is_none());
    }

    #[test]
    fn empty_page_leaves_store_untouched() {
        let notifier = FakeNotifier::default();
        let store = MemoryStore::default();
        let outcome = watcher(Some("<html><body>ремонт</body></html>"), &notifier, &store)
            .run_with(&context())
            .expect("run");
        assert_eq!(outcome, RunOutcome::NoEvents);
        assert_eq!(*store.saves.borrow(), 0);
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn failed_sends_still_mark_events_seen() {
        let notifier = FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        };
        let store = MemoryStore::default();
        let watcher = watcher(Some(PAGE), &notifier, &store);

        let outcome = watcher.run_with(&context()).expect("run");
        assert_eq!(
            outcome,
            RunOutcome::Checked {
                found: 2,
                new: 2,
                failed_sends: 2
            }
        );
        assert_eq!(notifier.sent.borrow().len(), 2, "later sends are not blocked");
        assert_eq!(store.load().len(), 2);

        watcher.run_with(&context()).expect("rerun");
        assert_eq!(notifier.sent.borrow().len(), 2, "no retry of dropped messages");
    }

    #[test]
    fn runs_without_news_still_persist() {
        let notifier = FakeNotifier::default();
        let store = MemoryStore::default();
        let watcher = watcher(Some(PAGE), &notifier, &store);
        watcher.run_with(&context()).expect("first");
        watcher.run_with(&context()).expect("second");
        assert_eq!(*store.saves.borrow(), 2);
    }

    #[test]
    fn old_keys_are_never_dropped() {
        let notifier = FakeNotifier::default();
        let store = MemoryStore::default();
        let old: HashSet<String> = ["01.01.2024 10:00 | Старое | https://tce.by/show/1".to_string()]
            .into_iter()
            .collect();
        *store.keys.borrow_mut() = Some(old.clone());

        watcher(Some(PAGE), &notifier, &store)
            .run_with(&context())
            .expect("run");
        let keys = store.load();
        assert!(keys.is_superset(&old));
        assert_eq!(keys.len(), 3);
    }
}
