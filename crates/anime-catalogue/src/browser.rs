//! Interactive catalogue browser.
//!
//! Reads commands line by line while fetches run on spawned tasks. Every
//! response comes back over a channel and goes through the catalogue's
//! generation checks, so a slow response can never overwrite a newer one.

use crate::catalogue::Catalogue;
use crate::command::{self, Command, HELP};
use crate::detail::{DetailOutcome, DetailRequest};
use crate::draft::FilterDraft;
use crate::list::{ListRequest, ListRequestKind, LoadOutcome};
use crate::render::{render_detail, render_filters, render_genres, render_list};
use crate::scroll::{ScrollTrigger, Viewport};
use crate::search::SearchBox;
use anyhow::{Context, Result};
use jikan_api::{Anime, AnimePage, AnimeSource, ApiError, FilterPatch, Genre};
use shared::config::CatalogueConfig;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A finished fetch, delivered back to the browser loop
#[derive(Debug)]
pub enum Message {
    Listed(ListRequest, Result<AnimePage, ApiError>),
    Detail(DetailRequest, Result<Anime, ApiError>),
    Genres(Result<Vec<Genre>, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    List,
    Detail,
}

/// Whether the loop should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Browser<S, W> {
    catalogue: Catalogue<S>,
    search: SearchBox,
    draft: Option<FilterDraft>,
    trigger: ScrollTrigger,
    viewport: Viewport,
    view: View,
    out: W,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl<S, W> Browser<S, W>
where
    S: AnimeSource + Clone + 'static,
    W: Write,
{
    pub fn new(catalogue: Catalogue<S>, config: &CatalogueConfig, out: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            catalogue,
            search: SearchBox::new(config.debounce()),
            draft: None,
            trigger: ScrollTrigger::new(config.scroll_offset_rows),
            viewport: Viewport::new(config.viewport_rows),
            view: View::List,
            out,
            tx,
            rx,
        }
    }

    pub fn catalogue(&self) -> &Catalogue<S> {
        &self.catalogue
    }

    /// Run until `quit` or end of input
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.start()?;
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        debug!("End of input");
                        break;
                    };
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                patch = self.search.next_commit() => self.commit_search(patch)?,
                Some(message) = self.rx.recv() => self.handle_message(message)?,
            }
        }

        // a search still waiting on its quiet period must not fire later
        self.search.cancel();
        info!("Browser closed");
        Ok(())
    }

    /// Mount the listing: fetch genres and the first page
    pub fn start(&mut self) -> Result<()> {
        writeln!(self.out, "Type 'help' for commands.")?;
        self.spawn_genres();
        self.spawn_initial_load();
        writeln!(self.out, "Loading...")?;
        Ok(())
    }

    fn spawn_genres(&self) {
        let source = self.catalogue.source().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.genres().await;
            let _ = tx.send(Message::Genres(result));
        });
    }

    fn spawn_list(&self, request: ListRequest) {
        let source = self.catalogue.source().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.search_anime(&request.filter).await;
            let _ = tx.send(Message::Listed(request, result));
        });
    }

    /// Reload page 1 under the current filters
    fn spawn_initial_load(&mut self) {
        let request = self.catalogue.state_mut().begin_initial_load();
        self.spawn_reload(request);
    }

    /// Send a page 1 request; the list is replaced, so scrolling starts over
    fn spawn_reload(&mut self, request: ListRequest) {
        self.trigger.reset();
        self.viewport.reset();
        self.spawn_list(request);
    }

    /// Dispatch load more; returns false when there was nothing to load
    fn spawn_load_more(&mut self) -> bool {
        match self.catalogue.state_mut().begin_load_more() {
            Some(request) => {
                self.trigger.dispatched();
                self.spawn_list(request);
                true
            }
            None => {
                self.trigger.completed();
                false
            }
        }
    }

    fn spawn_detail(&mut self, id: &str) {
        let request = self.catalogue.state_mut().begin_detail(id);
        let source = self.catalogue.source().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.anime(&request.id).await;
            let _ = tx.send(Message::Detail(request, result));
        });
    }

    /// Feed the sentinel's visibility to the trigger; returns true if a
    /// load more was dispatched
    fn check_sentinel(&mut self) -> bool {
        if self.view != View::List {
            return false;
        }
        let list = &self.catalogue.state().list;
        let len = list.data.len();
        let visible = self.trigger.sentinel_visible(self.viewport.end(len), len);
        let can_load = list.can_load_more();
        if self.trigger.observe(visible, can_load) {
            return self.spawn_load_more();
        }
        false
    }

    /// Switch to the listing, tearing down the detail view if it was open
    fn leave_detail(&mut self) {
        if self.view == View::Detail {
            self.catalogue.clear_detail();
            self.view = View::List;
        }
    }

    fn commit_search(&mut self, patch: FilterPatch) -> Result<()> {
        info!(query = ?patch.query, "Search committed");
        let request = self.catalogue.begin_search(patch);
        self.spawn_reload(request);
        if self.view == View::List {
            writeln!(self.out, "Loading...")?;
        }
        Ok(())
    }

    fn print_list(&mut self) -> Result<()> {
        let text = render_list(&self.catalogue.state().list, Some(&self.viewport));
        write!(self.out, "{}", text)?;
        Ok(())
    }

    /// Apply a finished fetch
    pub fn handle_message(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Listed(request, result) => {
                let kind = request.kind;
                let outcome = self
                    .catalogue
                    .state_mut()
                    .finish_list_request(request, result);
                if outcome == LoadOutcome::Stale {
                    return Ok(());
                }
                if kind == ListRequestKind::More {
                    self.trigger.completed();
                }
                if self.view == View::List {
                    self.print_list()?;
                }
                if matches!(outcome, LoadOutcome::Loaded { .. }) {
                    self.check_sentinel();
                }
            }
            Message::Detail(request, result) => {
                let outcome = self.catalogue.state_mut().finish_detail(request, result);
                if outcome != DetailOutcome::Stale && self.view == View::Detail {
                    let text = render_detail(&self.catalogue.state().detail);
                    write!(self.out, "{}", text)?;
                }
            }
            Message::Genres(result) => match result {
                Ok(genres) => {
                    info!(count = genres.len(), "Genres loaded");
                    self.catalogue.set_genres(genres);
                }
                Err(e) => warn!(error = %e, "Failed to load genres"),
            },
        }
        Ok(())
    }

    /// Parse and run one input line
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match command::parse(line) {
            Ok(command) => self.handle_command(command),
            Err(message) => {
                writeln!(self.out, "{}", message)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Result<Flow> {
        debug!(command = ?command, "Handling command");

        match command {
            Command::Empty => {}
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Search(text) => self.search.input(&text),
            Command::Clear => {
                let patch = self.search.clear();
                self.commit_search(patch)?;
            }
            Command::Filter(field, value) => {
                let draft = self
                    .draft
                    .get_or_insert_with(|| self.catalogue.open_draft());
                match draft.set(field, &value, self.catalogue.genres()) {
                    Ok(()) => writeln!(self.out, "Draft: {}", render_filters(&draft.preview()))?,
                    Err(e) => writeln!(self.out, "{}", e)?,
                }
            }
            Command::Unset(field) => {
                let draft = self
                    .draft
                    .get_or_insert_with(|| self.catalogue.open_draft());
                draft.unset(field);
                writeln!(self.out, "Draft: {}", render_filters(&draft.preview()))?;
            }
            Command::Filters => {
                writeln!(
                    self.out,
                    "Applied: {}",
                    render_filters(&self.catalogue.state().list.filters)
                )?;
                if let Some(draft) = &self.draft {
                    writeln!(self.out, "Draft: {}", render_filters(&draft.preview()))?;
                }
            }
            Command::Apply => match self.draft.take() {
                Some(draft) if !draft.is_empty() => {
                    self.leave_detail();
                    let request = self.catalogue.begin_apply_draft(draft);
                    self.spawn_reload(request);
                    writeln!(self.out, "Loading...")?;
                }
                _ => writeln!(self.out, "No pending filter changes")?,
            },
            Command::Cancel => {
                if self.draft.take().is_some() {
                    writeln!(self.out, "Draft discarded")?;
                }
            }
            Command::Reset => {
                self.draft = None;
                self.leave_detail();
                let request = self.catalogue.begin_reset_filters();
                self.spawn_reload(request);
                writeln!(self.out, "Loading...")?;
            }
            Command::Scroll(rows) => {
                self.leave_detail();
                let len = self.catalogue.state().list.data.len();
                let rows = rows.unwrap_or(self.viewport.rows);
                self.viewport.scroll_by(rows, len);
                self.print_list()?;
                self.check_sentinel();
            }
            Command::More => {
                self.leave_detail();
                if self.catalogue.state().list.loading {
                    writeln!(self.out, "Loading...")?;
                    return Ok(Flow::Continue);
                }
                let len = self.catalogue.state().list.data.len();
                self.viewport.scroll_to_end(len);
                self.print_list()?;
                if !self.check_sentinel() && !self.catalogue.state().list.is_loading_more {
                    // sentinel already in view: load explicitly
                    if !self.spawn_load_more() {
                        writeln!(self.out, "No more pages")?;
                    }
                }
            }
            Command::List => {
                self.leave_detail();
                self.print_list()?;
            }
            Command::Show(id) => {
                self.view = View::Detail;
                self.spawn_detail(&id);
                writeln!(self.out, "Loading...")?;
            }
            Command::Back => {
                self.leave_detail();
                self.print_list()?;
            }
            Command::Genres => {
                let text = render_genres(self.catalogue.genres());
                write!(self.out, "{}", text)?;
            }
        }

        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{anime, page, FakeSource};
    use jikan_api::AnimeType;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, BufReader};

    fn config() -> CatalogueConfig {
        CatalogueConfig {
            page_limit: 16,
            debounce_ms: 250,
            scroll_offset_rows: 4,
            viewport_rows: 8,
        }
    }

    fn browser(source: &FakeSource) -> Browser<FakeSource, Vec<u8>> {
        Browser::new(Catalogue::new(source.clone(), 16), &config(), Vec::new())
    }

    async fn deliver(browser: &mut Browser<FakeSource, Vec<u8>>, count: usize) {
        for _ in 0..count {
            let message = browser.rx.recv().await.unwrap();
            browser.handle_message(message).unwrap();
        }
    }

    fn output(browser: &Browser<FakeSource, Vec<u8>>) -> String {
        String::from_utf8_lossy(&browser.out).to_string()
    }

    #[tokio::test]
    async fn test_short_list_loads_more_once() {
        let source = FakeSource::new();
        source.push_page(Ok(page((1..=3).map(|i| anime(i, "a")).collect(), 1, true)));
        source.push_page(Ok(page((4..=5).map(|i| anime(i, "b")).collect(), 2, false)));
        let mut browser = browser(&source);

        browser.start().unwrap();
        // genres, first page, automatic second page
        deliver(&mut browser, 3).await;

        let pages: Vec<u32> = source.requests().iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![1, 2]);
        assert_eq!(browser.catalogue().state().list.data.len(), 5);
        assert!(browser.rx.try_recv().is_err());
        assert!(output(&browser).contains("end of list"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_first_load_loses_to_search() {
        let source = FakeSource::new();
        source.push_page_after(
            Duration::from_millis(500),
            Ok(page(vec![anime(1, "Old")], 1, false)),
        );
        let mut browser = browser(&source);
        browser.start().unwrap();
        while source.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        source.push_page(Ok(page(vec![anime(20, "Naruto")], 1, false)));
        browser.handle_line("search naruto").unwrap();
        let patch = browser.search.next_commit().await;
        browser.commit_search(patch).unwrap();

        deliver(&mut browser, 3).await;

        let list = &browser.catalogue().state().list;
        assert_eq!(list.filters.query, "naruto");
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].title, "Naruto");
        assert!(!list.loading);
        assert_eq!(source.requests()[1].query, "naruto");
        assert!(!output(&browser).contains("Old"));
    }

    #[tokio::test]
    async fn test_show_missing_title() {
        let source = FakeSource::new();
        let mut browser = browser(&source);

        browser.handle_line("show 999999").unwrap();
        deliver(&mut browser, 1).await;

        let detail = &browser.catalogue().state().detail;
        assert!(detail.not_found);
        assert_eq!(detail.anime, None);
        assert!(output(&browser).contains("Not found: 404 Not Found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_discards_pending_detail() {
        let source = FakeSource::new();
        source.set_detail_after("1", Duration::from_millis(100), Ok(anime(1, "Naruto")));
        let mut browser = browser(&source);

        browser.handle_line("show 1").unwrap();
        browser.handle_line("back").unwrap();
        deliver(&mut browser, 1).await;

        assert_eq!(browser.catalogue().state().detail.anime, None);
        assert!(!output(&browser).contains("Naruto"));
    }

    #[tokio::test]
    async fn test_draft_applies_on_confirm_only() {
        let source = FakeSource::new();
        source.push_page(Ok(page(vec![anime(1, "Naruto")], 1, false)));
        source.push_page(Ok(page(vec![anime(5, "Akira")], 1, false)));
        let mut browser = browser(&source);
        browser.start().unwrap();
        deliver(&mut browser, 2).await;

        browser.handle_line("filter type movie").unwrap();
        browser.handle_line("filter colour red").unwrap();
        assert_eq!(browser.catalogue().state().list.filters.anime_type, None);

        browser.handle_line("apply").unwrap();
        deliver(&mut browser, 1).await;

        let list = &browser.catalogue().state().list;
        assert_eq!(list.filters.anime_type, Some(AnimeType::Movie));
        assert_eq!(list.data[0].title, "Akira");
        assert_eq!(source.requests()[1].anime_type, Some(AnimeType::Movie));
        assert!(output(&browser).contains("unknown filter field 'colour'"));
    }

    #[tokio::test]
    async fn test_cancel_keeps_applied_filters() {
        let source = FakeSource::new();
        let mut browser = browser(&source);

        browser.handle_line("filter rating pg13").unwrap();
        browser.handle_line("cancel").unwrap();
        browser.handle_line("apply").unwrap();

        assert!(source.requests().is_empty());
        assert!(output(&browser).contains("No pending filter changes"));
        assert_eq!(
            browser.handle_line("quit").unwrap(),
            Flow::Quit
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_detail_discards_pending_fetch() {
        let source = FakeSource::new();
        source.set_detail_after("1", Duration::from_millis(100), Ok(anime(1, "Naruto")));
        let mut browser = browser(&source);

        browser.handle_line("show 1").unwrap();
        browser.handle_line("list").unwrap();
        deliver(&mut browser, 1).await;

        let detail = &browser.catalogue().state().detail;
        assert_eq!(detail.anime, None);
        assert!(!detail.loading);
        assert_eq!(detail.request, 2);
    }

    #[tokio::test]
    async fn test_scroll_during_first_load_still_loads_more() {
        let source = FakeSource::new();
        source.push_page(Ok(page((1..=3).map(|i| anime(i, "a")).collect(), 1, true)));
        source.push_page(Ok(page((4..=5).map(|i| anime(i, "b")).collect(), 2, false)));
        let mut browser = browser(&source);

        browser.start().unwrap();
        browser.handle_line("scroll").unwrap();
        deliver(&mut browser, 3).await;

        let pages: Vec<u32> = source.requests().iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![1, 2]);
        assert_eq!(browser.catalogue().state().list.data.len(), 5);
    }

    #[tokio::test]
    async fn test_more_while_first_page_loads() {
        let source = FakeSource::new();
        source.push_page(Ok(page(vec![anime(1, "Naruto")], 1, true)));
        let mut browser = browser(&source);

        browser.start().unwrap();
        browser.handle_line("more").unwrap();

        let out = output(&browser);
        assert!(!out.contains("No more pages"));
        assert!(out.ends_with("Loading...\n"));
        assert!(!browser.catalogue().state().list.is_loading_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_debounces_search_and_clears_immediately() {
        let source = FakeSource::new();
        for title in ["Naruto", "Naruto Shippuden", "Naruto"] {
            source.push_page(Ok(page(vec![anime(1, title)], 1, false)));
        }
        let mut browser = browser(&source);

        let (reader, mut writer) = tokio::io::duplex(256);
        let typist = tokio::spawn(async move {
            writer.write_all(b"search n\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            writer.write_all(b"search na\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
            writer.write_all(b"clear\n").await.unwrap();
            // shorter than the quiet period
            tokio::time::sleep(Duration::from_millis(50)).await;
            writer.write_all(b"quit\n").await.unwrap();
        });

        browser.run(BufReader::new(reader)).await.unwrap();
        typist.await.unwrap();

        let sent = source.requests();
        let queries: Vec<&str> = sent.iter().map(|f| f.query.as_str()).collect();
        assert_eq!(queries, vec!["", "na", ""]);
        assert!(sent.iter().all(|f| f.page == 1));
        assert!(!sent[2].to_query().iter().any(|(key, _)| *key == "q"));
        assert_eq!(browser.catalogue().state().list.filters.query, "");
    }
}
