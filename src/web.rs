//! Browser bindings: map drawing into a container, auto-resize, and the word
//! puzzle wired to DOM elements, `setInterval`/`setTimeout` and `mousemove`.
//!
//! Expected page structure for the puzzle:
//! - `#placeholders`: emptied and filled with `div.placeholder > div.letter`
//! - `#definition`, `#context`: optional text elements
//! - a backdrop container id (optional) redrawn with a fresh map on every word change

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, MouseEvent, ResizeObserver, window};

use crate::puzzle::{
    Dictionary, PuzzleConfig, PuzzleEngine, PuzzleSurface, Scheduler, SlotView, TextTarget, TimerKind,
};
use crate::terrain::{self, GridMetrics, MapOptions, ObserverRegistry};

const MAP_CLASS: &str = "ascii-map";
const DEFAULT_DICTIONARY_PATH: &str = "./dictionary.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("window not available")]
    NoWindow,
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },
    #[error("response body was not text")]
    Body,
}

// --- Terrain -----------------------------------------------------------------

fn draw_into(container: &HtmlElement, options: &MapOptions) -> Result<(), JsValue> {
    let rect = container.get_bounding_client_rect();
    let width = if rect.width() > 0.0 { rect.width() } else { container.client_width() as f64 };
    let height = if rect.height() > 0.0 { rect.height() } else { container.client_height() as f64 };
    let Some((cols, rows)) = GridMetrics::default().grid_size(width, height) else {
        return Ok(());
    };

    let mut rng = StdRng::from_entropy();
    let seed = rng.gen_range(0.0..1000.0);
    let grid = terrain::generate(cols, rows, seed, &mut rng);

    let pre: HtmlElement = match container.query_selector(&format!("pre.{MAP_CLASS}"))? {
        Some(el) => el.dyn_into()?,
        None => {
            let doc = window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let el = doc.create_element("pre")?;
            el.set_class_name(MAP_CLASS);
            container.append_child(&el)?;
            el.dyn_into()?
        }
    };
    pre.set_text_content(Some(&grid.to_text()));
    pre.style().set_property("color", &options.color)?;
    Ok(())
}

/// Fill `container` with a freshly generated map sized to its current box.
/// A missing container or an empty box draws nothing.
#[wasm_bindgen(js_name = drawMap)]
pub fn draw_map(container: Option<HtmlElement>, options_json: Option<String>) -> Result<(), JsValue> {
    let Some(container) = container else { return Ok(()) };
    draw_into(&container, &MapOptions::from_json_or_default(options_json.as_deref()))
}

/// Map text for a given size; empty for non-positive sizes.
#[wasm_bindgen(js_name = generateTerrain)]
pub fn generate_terrain(cols: i32, rows: i32, seed: f64) -> String {
    if cols <= 0 || rows <= 0 {
        return String::new();
    }
    let mut rng = StdRng::from_entropy();
    terrain::generate(cols as usize, rows as usize, seed, &mut rng).to_text()
}

struct ResizeHook {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl Drop for ResizeHook {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

thread_local! {
    static RESIZE_HOOKS: RefCell<ObserverRegistry<HtmlElement, ResizeHook>> = RefCell::new(ObserverRegistry::new());
}

fn resize_observer_supported() -> bool {
    window()
        .map(|w| js_sys::Reflect::has(&w, &JsValue::from_str("ResizeObserver")).unwrap_or(false))
        .unwrap_or(false)
}

/// Redraw `container` whenever it changes size, replacing any observer
/// previously registered for it. Draws once immediately.
#[wasm_bindgen(js_name = enableAutoResize)]
pub fn enable_auto_resize(container: Option<HtmlElement>, options_json: Option<String>) -> Result<(), JsValue> {
    let Some(container) = container else { return Ok(()) };
    if !resize_observer_supported() {
        log::info!("ResizeObserver unavailable; auto-resize disabled");
        return Ok(());
    }
    let options = MapOptions::from_json_or_default(options_json.as_deref());

    let target = container.clone();
    let redraw_options = options.clone();
    let callback = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
        if let Err(e) = draw_into(&target, &redraw_options) {
            log::warn!("map redraw on resize failed: {e:?}");
        }
    }) as Box<dyn FnMut(js_sys::Array)>);
    let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
    observer.observe(&container);

    let previous = RESIZE_HOOKS.with(|hooks| {
        hooks.borrow_mut().replace(
            container.clone(),
            ResizeHook {
                observer,
                _callback: callback,
            },
        )
    });
    drop(previous);

    draw_into(&container, &options)
}

#[wasm_bindgen(js_name = disableAutoResize)]
pub fn disable_auto_resize(container: Option<HtmlElement>) {
    let Some(container) = container else { return };
    let hook = RESIZE_HOOKS.with(|hooks| hooks.borrow_mut().remove(&container));
    drop(hook);
}

// --- Puzzle surface ----------------------------------------------------------

struct DomSurface {
    letters: Vec<HtmlElement>,
    definition: Option<HtmlElement>,
    context: Option<HtmlElement>,
    backdrop: Option<HtmlElement>,
    map_options: MapOptions,
}

fn element_by_id(doc: &Document, id: &str) -> Option<HtmlElement> {
    doc.get_element_by_id(id).and_then(|el| el.dyn_into().ok())
}

impl DomSurface {
    /// `None` when the page has no `#placeholders` container.
    fn mount(doc: &Document, letter_count: usize, backdrop_id: Option<&str>) -> Result<Option<Self>, JsValue> {
        let Some(placeholders) = doc.get_element_by_id("placeholders") else {
            return Ok(None);
        };
        placeholders.set_inner_html("");
        let mut letters = Vec::with_capacity(letter_count);
        for _ in 0..letter_count {
            let slot = doc.create_element("div")?;
            slot.set_class_name("placeholder");
            let letter: HtmlElement = doc.create_element("div")?.dyn_into()?;
            letter.set_class_name("letter");
            slot.append_child(&letter)?;
            placeholders.append_child(&slot)?;
            letters.push(letter);
        }
        Ok(Some(Self {
            letters,
            definition: element_by_id(doc, "definition"),
            context: element_by_id(doc, "context"),
            backdrop: backdrop_id.and_then(|id| element_by_id(doc, id)),
            map_options: MapOptions::default(),
        }))
    }
}

impl PuzzleSurface for DomSurface {
    fn render_slots(&mut self, slots: &[SlotView]) {
        for (el, slot) in self.letters.iter().zip(slots) {
            let classes = el.class_list();
            for (class, on) in [
                ("fixed-letter", slot.style.fixed),
                ("placeholder-underscore", slot.style.empty),
                ("chaos", slot.style.chaos),
            ] {
                if let Err(e) = classes.toggle_with_force(class, on) {
                    log::warn!("failed to toggle .{class}: {e:?}");
                }
            }
            let text = slot.letter.map(String::from).unwrap_or_default();
            el.set_text_content(Some(&text));
        }
    }

    fn set_text(&mut self, target: TextTarget, text: &str) {
        let el = match target {
            TextTarget::Definition => &self.definition,
            TextTarget::Context => &self.context,
        };
        if let Some(el) = el {
            el.set_text_content(Some(text));
        }
    }

    fn refresh_background(&mut self) {
        if let Some(backdrop) = &self.backdrop {
            if let Err(e) = draw_into(backdrop, &self.map_options) {
                log::warn!("background refresh failed: {e:?}");
            }
        }
    }
}

// --- Browser timers ----------------------------------------------------------

/// A live `setInterval`/`setTimeout`. Dropping it clears the JS timer.
struct ScheduledTask {
    id: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

impl ScheduledTask {
    fn clear(&self) {
        if let Some(w) = window() {
            if self.repeating {
                w.clear_interval_with_handle(self.id);
            } else {
                w.clear_timeout_with_handle(self.id);
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Cancelled tasks are cleared at once but their closures are kept in
/// `retired` until the next pointer event, since a task may be cancelled from
/// inside its own callback.
#[derive(Default)]
struct WebScheduler {
    live: HashMap<TimerKind, ScheduledTask>,
    retired: Vec<ScheduledTask>,
}

impl WebScheduler {
    fn collect_retired(&mut self) {
        self.retired.clear();
    }

    fn retire(&mut self, task: ScheduledTask) {
        task.clear();
        self.retired.push(task);
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&mut self, kind: TimerKind, period_ms: u32) {
        let Some(win) = window() else {
            log::warn!("no window; {kind:?} timer not armed");
            return;
        };
        let callback = Closure::wrap(Box::new(move || dispatch_timer(kind)) as Box<dyn FnMut()>);
        let func: &js_sys::Function = callback.as_ref().unchecked_ref();
        let armed = if kind.repeats() {
            win.set_interval_with_callback_and_timeout_and_arguments_0(func, period_ms as i32)
        } else {
            win.set_timeout_with_callback_and_timeout_and_arguments_0(func, period_ms as i32)
        };
        match armed {
            Ok(id) => {
                let task = ScheduledTask {
                    id,
                    repeating: kind.repeats(),
                    _callback: callback,
                };
                if let Some(old) = self.live.insert(kind, task) {
                    self.retire(old);
                }
            }
            Err(e) => log::error!("failed to arm {kind:?} timer: {e:?}"),
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(task) = self.live.remove(&kind) {
            self.retire(task);
        }
    }
}

// --- Puzzle session ----------------------------------------------------------

type WebEngine = PuzzleEngine<DomSurface, WebScheduler>;

thread_local! {
    static ENGINE: RefCell<Option<WebEngine>> = const { RefCell::new(None) };
    static POINTER_LISTENER: RefCell<Option<Closure<dyn FnMut(MouseEvent)>>> = const { RefCell::new(None) };
    // Bumped by every start and stop; a pending dictionary load only installs
    // its engine if no newer session began while it was in flight.
    static SESSION: Cell<u64> = const { Cell::new(0) };
}

fn next_session() -> u64 {
    SESSION.with(|s| {
        let id = s.get().wrapping_add(1);
        s.set(id);
        id
    })
}

fn is_current_session(id: u64) -> bool {
    SESSION.with(|s| s.get() == id)
}

fn with_engine(f: impl FnOnce(&mut WebEngine)) {
    ENGINE.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => {
            if let Some(engine) = guard.as_mut() {
                f(engine);
            }
        }
        Err(_) => log::warn!("puzzle engine busy; event dropped"),
    });
}

fn dispatch_timer(kind: TimerKind) {
    with_engine(|engine| engine.on_timer(kind));
}

fn install_pointer_listener() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    remove_pointer_listener();
    let listener = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        with_engine(|engine| {
            engine.scheduler_mut().collect_retired();
            engine.on_pointer_move();
        });
    }) as Box<dyn FnMut(MouseEvent)>);
    win.add_event_listener_with_callback("mousemove", listener.as_ref().unchecked_ref())?;
    POINTER_LISTENER.with(|slot| slot.replace(Some(listener)));
    Ok(())
}

fn remove_pointer_listener() {
    let Some(listener) = POINTER_LISTENER.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    if let Some(win) = window() {
        let _ = win.remove_event_listener_with_callback("mousemove", listener.as_ref().unchecked_ref());
    }
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let window = window().ok_or(LoadError::NoWindow)?;
    let response_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| LoadError::Fetch(format!("{e:?}")))?;
    let response: web_sys::Response = response_value
        .dyn_into()
        .map_err(|_| LoadError::Fetch("not a Response".to_string()))?;
    if !response.ok() {
        return Err(LoadError::Status {
            status: response.status(),
            url: url.to_string(),
        });
    }
    let text_promise = response.text().map_err(|_| LoadError::Body)?;
    let text_value = JsFuture::from(text_promise).await.map_err(|_| LoadError::Body)?;
    text_value.as_string().ok_or(LoadError::Body)
}

/// Mount the puzzle, load the dictionary and start listening for pointer
/// moves. A page without `#placeholders` is left alone. A failed dictionary
/// load falls back to an empty dictionary.
#[wasm_bindgen(js_name = startPuzzle)]
pub fn start_puzzle(
    dictionary_url: Option<String>,
    backdrop_id: Option<String>,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let config = PuzzleConfig::from_json_or_default(config_json.as_deref());
    let Some(surface) = DomSurface::mount(&doc, config.letter_count, backdrop_id.as_deref())? else {
        log::warn!("no #placeholders element; puzzle not started");
        return Ok(());
    };
    stop_puzzle();
    let session = next_session();

    let url = dictionary_url.unwrap_or_else(|| DEFAULT_DICTIONARY_PATH.to_string());
    wasm_bindgen_futures::spawn_local(async move {
        let dictionary = match fetch_text(&url).await {
            Ok(text) => Dictionary::from_json_or_empty(&text),
            Err(e) => {
                log::error!("failed to load dictionary from {url}: {e}");
                Dictionary::default()
            }
        };
        log::info!("dictionary loaded: {} entries", dictionary.len());
        if !is_current_session(session) {
            log::info!("puzzle stopped or restarted during dictionary load; not starting");
            return;
        }

        let mut engine = PuzzleEngine::new(
            config,
            dictionary,
            surface,
            WebScheduler::default(),
            StdRng::from_entropy(),
        );
        engine.start();
        let previous = ENGINE.with(|cell| cell.replace(Some(engine)));
        drop(previous);
        if let Err(e) = install_pointer_listener() {
            log::error!("failed to listen for pointer moves: {e:?}");
        }
    });
    Ok(())
}

/// Detach the pointer listener and tear the engine down, cancelling its timers.
/// A dictionary load still in flight is abandoned.
#[wasm_bindgen(js_name = stopPuzzle)]
pub fn stop_puzzle() {
    next_session();
    remove_pointer_listener();
    let engine = ENGINE.with(|cell| cell.borrow_mut().take());
    if let Some(mut engine) = engine {
        engine.shutdown();
    }
}
