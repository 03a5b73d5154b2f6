//! An editing session: edits are debounced, then committed to the store and laid out again.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::document::store::{Store, SOURCE_SLOT};
use crate::document::DEFAULT_DOCUMENT;
use crate::drawing::{Color, INK};
use crate::fonts::FontRepository;
use crate::layout::{typeset, Grid, Layout};
use crate::math::MathResolver;
use crate::parser::parse_document;
use crate::parser::warning::Warnings;

/// Waits for edits to settle.
///
/// Every edit restarts the quiescence window; only the latest text of a burst of edits comes out.
pub struct Debouncer {
    edits: mpsc::Receiver<String>,
    window: Duration,
    closed: bool,
}

impl Debouncer {
    /// Creates a debouncer over a channel of edits.
    pub fn new(edits: mpsc::Receiver<String>, window: Duration) -> Debouncer {
        Debouncer {
            edits,
            window,
            closed: false,
        }
    }

    /// Waits for the next text to commit.
    ///
    /// When the channel closes while an edit is pending, that edit is returned right away. Returns
    /// `None` once the channel is closed and nothing is pending.
    pub async fn next(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }

        let mut pending = match self.edits.recv().await {
            Some(text) => text,
            None => {
                self.closed = true;
                return None;
            }
        };

        loop {
            tokio::select! {
                edit = self.edits.recv() => match edit {
                    Some(text) => pending = text,
                    None => {
                        self.closed = true;
                        return Some(pending);
                    }
                },
                _ = tokio::time::sleep(self.window) => return Some(pending),
            }
        }
    }
}

/// Commits the latest text of each burst of edits, one commit at a time.
pub async fn debounce<F, Fut>(edits: mpsc::Receiver<String>, window: Duration, mut commit: F)
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut debouncer = Debouncer::new(edits, window);
    while let Some(text) = debouncer.next().await {
        commit(text).await;
    }
}

/// What a commit produced.
#[derive(Debug)]
pub struct Commit {
    /// The new layout of the document.
    pub layout: Arc<Layout>,

    /// The warnings found while parsing the text.
    pub warnings: Warnings,
}

/// Holds everything needed to lay the document out again after an edit.
pub struct Session<R> {
    store: Store,
    resolver: R,
    font: Option<Arc<FontRepository>>,
    grid: Grid,
    color: Color,
    path: PathBuf,
    layouts: watch::Sender<Option<Arc<Layout>>>,
}

impl<R: MathResolver> Session<R> {
    /// Creates a session that persists its text in a store.
    pub fn new(store: Store, resolver: R, grid: Grid) -> Session<R> {
        let (layouts, _) = watch::channel(None);
        Session {
            store,
            resolver,
            font: None,
            grid,
            color: INK,
            path: PathBuf::new(),
            layouts,
        }
    }

    /// Sets the font the text is drawn with.
    pub fn with_font(self, font: Option<Arc<FontRepository>>) -> Session<R> {
        Session { font, ..self }
    }

    /// Sets the colour of the ink.
    pub fn with_color(self, color: Color) -> Session<R> {
        Session { color, ..self }
    }

    /// Sets the path reported in warnings.
    pub fn with_path<P: AsRef<Path>>(self, path: P) -> Session<R> {
        Session {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Returns a receiver that sees every new layout.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Layout>>> {
        self.layouts.subscribe()
    }

    /// Returns the text to start from: the input file if it exists, the stored text otherwise,
    /// and the default document if nothing was ever stored.
    pub fn initial_text<P: AsRef<Path>>(&self, input: P) -> String {
        let input = input.as_ref();
        match std::fs::read_to_string(input) {
            Ok(text) => text,
            Err(e) => {
                debug!("cannot read {}: {}", input.display(), e);
                match self.store.get(SOURCE_SLOT) {
                    Some(text) => text.to_owned(),
                    None => DEFAULT_DOCUMENT.to_owned(),
                }
            }
        }
    }

    /// Stores the text, lays it out and publishes the new layout.
    ///
    /// A text that cannot be stored is laid out anyway.
    pub async fn commit(&mut self, text: String) -> Commit {
        if let Err(e) = self.store.set(SOURCE_SLOT, &text) {
            warn!("cannot save the document: {}", e);
        }

        let parsed = parse_document(&text, &self.path);
        let layout = typeset(
            &parsed.blocks,
            self.font.as_deref(),
            &self.resolver,
            self.grid,
            self.color,
        )
        .await;

        let layout = Arc::new(layout);
        self.layouts.send_replace(Some(layout.clone()));

        Commit {
            layout,
            warnings: parsed.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio::time::{sleep, Instant};

    use super::{debounce, Debouncer, Session};
    use crate::document::store::{Store, SOURCE_SLOT};
    use crate::document::DEFAULT_DOCUMENT;
    use crate::layout::Grid;
    use crate::testing::{sample_font, Boxes};

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn bursts_are_coalesced() {
        let (tx, rx) = mpsc::channel(16);
        let mut debouncer = Debouncer::new(rx, WINDOW);

        tokio::spawn(async move {
            tx.send(String::from("a")).await.unwrap();
            sleep(Duration::from_millis(100)).await;
            tx.send(String::from("ab")).await.unwrap();
            sleep(Duration::from_millis(400)).await;
            tx.send(String::from("abc")).await.unwrap();
            sleep(Duration::from_millis(2000)).await;
            tx.send(String::from("abcd")).await.unwrap();
            sleep(Duration::from_millis(2000)).await;
        });

        let start = Instant::now();
        assert_eq!(debouncer.next().await.as_deref(), Some("abc"));
        // The window restarted with the last edit of the burst.
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert!(start.elapsed() < Duration::from_millis(1100));

        assert_eq!(debouncer.next().await.as_deref(), Some("abcd"));
        assert_eq!(debouncer.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_commits_pending_edit() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(String::from("first")).await.unwrap();
        tx.send(String::from("second")).await.unwrap();
        drop(tx);

        let mut committed = vec![];
        debounce(rx, WINDOW, |text| {
            committed.push(text);
            async {}
        })
        .await;

        assert_eq!(committed, vec![String::from("second")]);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_to_commit() {
        let (tx, rx) = mpsc::channel::<String>(1);
        drop(tx);
        let mut debouncer = Debouncer::new(rx, WINDOW);
        assert_eq!(debouncer.next().await, None);
        assert_eq!(debouncer.next().await, None);
    }

    #[tokio::test]
    async fn commit_stores_and_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let mut session = Session::new(store, Boxes, Grid::a4())
            .with_font(Some(std::sync::Arc::new(sample_font())))
            .with_path("notes.txt");

        let mut layouts = session.subscribe();
        assert!(layouts.borrow().is_none());

        let commit = session.commit(String::from("# Title\n\ncosts 5$")).await;
        assert_eq!(commit.warnings.warnings.len(), 1);
        assert_eq!(commit.layout.pages.len(), 1);

        assert!(layouts.has_changed().unwrap());
        let published = layouts.borrow_and_update().clone().unwrap();
        assert_eq!(published.blocks.len(), 3);

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.get(SOURCE_SLOT), Some("# Title\n\ncosts 5$"));
    }

    #[test]
    fn initial_text_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("main.txt");

        let mut store = Store::open(dir.path()).unwrap();
        let session = Session::new(store.clone(), Boxes, Grid::a4());
        assert_eq!(session.initial_text(&input), DEFAULT_DOCUMENT);

        store.set(SOURCE_SLOT, "stored").unwrap();
        let session = Session::new(store, Boxes, Grid::a4());
        assert_eq!(session.initial_text(&input), "stored");

        std::fs::write(&input, "from file").unwrap();
        assert_eq!(session.initial_text(&input), "from file");
    }
}
