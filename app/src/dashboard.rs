// In app/src/dashboard.rs

use crate::live::{self, LinkStatus, LiveEvent};
use crate::tracing_layer::LogBuffer;
use crate::ui;
use api_client::PortfolioApi;
use app_config::Settings;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use events::StateUpdate;
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use store::{FetchOutcome, Store};
use tokio::sync::mpsc;
use treemap::{Drill, Navigator, Tile, shares, tile_at};

const TICK: Duration = Duration::from_millis(250);

/// A clickable breadcrumb segment on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrumbHit {
    pub row: u16,
    pub start: u16,
    pub end: u16,
    pub depth: usize,
}

/// Where things were drawn last frame, for mouse hit-testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitMap {
    pub tiles: Vec<Tile>,
    pub crumbs: Vec<CrumbHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Refetch,
    Quit,
}

pub struct App {
    pub store: Store,
    pub nav: Navigator,
    /// Child index of the current node that has the selection.
    pub selected: usize,
    pub link: LinkStatus,
    pub logs: LogBuffer,
    pub hits: HitMap,
}

impl App {
    pub fn new(logs: LogBuffer) -> Self {
        Self {
            store: Store::new(),
            nav: Navigator::new(),
            selected: 0,
            link: LinkStatus::Offline,
            logs,
            hits: HitMap::default(),
        }
    }

    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        let hierarchy = matches!(outcome, FetchOutcome::Hierarchy(Ok(_)));
        self.store.apply_fetch(outcome);
        if hierarchy {
            self.hierarchy_replaced();
        }
    }

    pub fn apply_live(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Update(update) => {
                let hierarchy = matches!(update, StateUpdate::Hierarchy(_));
                self.store.apply(update);
                if hierarchy {
                    self.hierarchy_replaced();
                }
            }
            LiveEvent::Link(status) => self.link = status,
        }
    }

    fn hierarchy_replaced(&mut self) {
        let Some(root) = self.store.hierarchy().data() else {
            return;
        };
        if self.nav.reconcile(root) {
            tracing::info!(depth = self.nav.depth(), "Navigation path no longer exists; moved up.");
        }
        if self.selected >= self.nav.current(root).children.len() {
            self.reset_selection();
        }
    }

    /// Selects the largest child of the current node.
    fn reset_selection(&mut self) {
        self.selected = self
            .store
            .hierarchy()
            .data()
            .map(|root| shares(&self.nav.current(root).children))
            .and_then(|s| s.into_iter().max_by(|a, b| a.percent.total_cmp(&b.percent)))
            .map(|s| s.index)
            .unwrap_or(0);
    }

    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('r') => return Action::Refetch,
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => self.drill(self.selected),
            KeyCode::Backspace | KeyCode::Esc => {
                if self.nav.up() {
                    self.reset_selection();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let depth = c.to_digit(10).unwrap_or(0) as usize;
                self.jump(depth);
            }
            _ => {}
        }
        Action::None
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);

        let crumb = self
            .hits
            .crumbs
            .iter()
            .find(|c| c.row == row && column >= c.start && column < c.end)
            .map(|c| c.depth);
        if let Some(depth) = crumb {
            self.jump(depth);
            return;
        }

        if let Some(index) = tile_at(&self.hits.tiles, column, row).map(|t| t.index) {
            self.selected = index;
            self.drill(index);
        }
    }

    /// Moves through tiles in drawing order, largest first.
    fn move_selection(&mut self, step: isize) {
        let order: Vec<usize> = self.hits.tiles.iter().map(|t| t.index).collect();
        if order.is_empty() {
            return;
        }
        let position = order.iter().position(|&i| i == self.selected).unwrap_or(0) as isize;
        let next = (position + step).rem_euclid(order.len() as isize) as usize;
        self.selected = order[next];
    }

    fn drill(&mut self, index: usize) {
        let Some(root) = self.store.hierarchy().data() else {
            return;
        };
        match self.nav.drill(root, index) {
            Drill::Descended => {
                tracing::debug!(path = ?self.nav.breadcrumb(root), "Drilled down.");
                self.reset_selection();
            }
            Drill::Leaf => {
                let node = &self.nav.current(root).children[index];
                tracing::info!(name = %node.name, symbol = ?node.symbol, value = node.value, "Reached symbol level.");
            }
            Drill::OutOfRange => {}
        }
    }

    fn jump(&mut self, depth: usize) {
        if self.nav.jump(depth) {
            self.reset_selection();
        }
    }

    /// Marks both slices loading and fetches them on their own tasks.
    pub fn refetch(&mut self, api: &Arc<PortfolioApi>, tx: &mpsc::UnboundedSender<FetchOutcome>) {
        self.store.begin_hierarchy_fetch();
        self.store.begin_twr_fetch();

        let (hierarchy_api, hierarchy_tx) = (Arc::clone(api), tx.clone());
        tokio::spawn(async move {
            let _ = hierarchy_tx.send(store::fetch_hierarchy(hierarchy_api.as_ref()).await);
        });
        let (twr_api, twr_tx) = (Arc::clone(api), tx.clone());
        tokio::spawn(async move {
            let _ = twr_tx.send(store::fetch_twr(twr_api.as_ref()).await);
        });
    }
}

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs the interactive dashboard until the user quits.
pub async fn run(settings: Settings, logs: LogBuffer) -> anyhow::Result<()> {
    let api = Arc::new(PortfolioApi::new(&settings));
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
    let (live_tx, mut live_rx) = mpsc::unbounded_channel();

    let mut app = App::new(logs);
    app.refetch(&api, &fetch_tx);

    let push_task = match settings.push.token.clone() {
        Some(token) => {
            let client = live::build_client(&settings, live_tx.clone())?;
            Some(tokio::spawn(live::run_client(client, token, live_tx.clone())))
        }
        None => {
            tracing::warn!("No push token configured; live updates are disabled.");
            None
        }
    };

    enable_raw_mode()?;
    let mut terminal = undo_on_error(enter_screen(), || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = disable_raw_mode();
    })?;

    let result = event_loop(&mut terminal, &mut app, &api, &fetch_tx, &mut fetch_rx, &mut live_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Some(task) = push_task {
        task.abort();
    }
    result
}

fn enter_screen() -> io::Result<Term> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Runs `undo` when `result` is an error, so a half-finished terminal setup
/// does not leave the shell in raw mode.
fn undo_on_error<T, E>(result: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        undo();
    }
    result
}

async fn event_loop(
    terminal: &mut Term,
    app: &mut App,
    api: &Arc<PortfolioApi>,
    fetch_tx: &mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: &mut mpsc::UnboundedReceiver<FetchOutcome>,
    live_rx: &mut mpsc::UnboundedReceiver<LiveEvent>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        let mut hits = HitMap::default();
        terminal.draw(|frame| hits = ui::render(frame, app))?;
        app.hits = hits;

        tokio::select! {
            _ = ticker.tick() => {}
            Some(outcome) = fetch_rx.recv() => app.apply_fetch(outcome),
            Some(event) = live_rx.recv() => app.apply_live(event),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => match app.handle_event(event) {
                    Action::Quit => return Ok(()),
                    Action::Refetch => app.refetch(api, fetch_tx),
                    Action::None => {}
                },
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}
