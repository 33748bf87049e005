//! The editing session.
//!
//! An [`Editor`] owns everything for one open document: the ink controller,
//! stroke store, text-box overlay, swipe navigation, the ink surface and the
//! outbox of host events. Handlers run to completion; a page switch writes
//! the outgoing page before the incoming one is read.

use crate::error::EditorError;
use crate::shortcuts::{KeyAction, ShortcutRegistry};
use crate::source::PageSource;
use kurbo::{Point, Rect};
use pageink_core::codec::{
    SurfaceSizes, decode_strokes, decode_text_boxes, encode_strokes, encode_text_boxes, load_page,
    StrokeRecord,
};
use pageink_core::config::EditorConfig;
use pageink_core::eraser::erase;
use pageink_core::geometry::PageLayout;
use pageink_core::input::{GestureOutcome, InkController, PointerKind};
use pageink_core::protocol::{HostCommand, HostEvent};
use pageink_core::storage::{PageKey, PageStore, StorageResult};
use pageink_core::store::StrokeStore;
use pageink_core::stroke::Stroke;
use pageink_core::swipe::{PageNavigator, SwipeDetector, SwipeDirection};
use pageink_core::textbox::{TextBox, TextBoxId, TextBoxManager, TextBoxOutcome};
use pageink_core::tools::{ToolMode, ToolSettings};
use pageink_render::{InkRenderer, PageBitmap, PixmapSurface};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Encoded records of a page waiting to be written.
#[derive(Debug, Clone)]
struct PendingWrite {
    ink: String,
    text: String,
}

/// One open document.
pub struct Editor {
    config: EditorConfig,
    document: String,
    storage: Arc<dyn PageStore>,
    source: Box<dyn PageSource>,

    ink: InkController,
    store: StrokeStore,
    text: TextBoxManager,
    swipe: SwipeDetector,
    nav: PageNavigator,

    renderer: InkRenderer,
    surface: PixmapSurface,
    page_image: PageBitmap,
    layout: PageLayout,
    viewport_width: f64,
    device_pixel_ratio: f64,
    /// Client position of the page wrapper's top-left corner.
    origin: Point,

    /// Pages whose last write failed, keyed by page number.
    pending: BTreeMap<u32, PendingWrite>,
    events: Vec<HostEvent>,
}

impl Editor {
    /// Open `document` at `page` and emit `READY`.
    pub fn open(
        config: EditorConfig,
        document: impl Into<String>,
        storage: Arc<dyn PageStore>,
        source: Box<dyn PageSource>,
        page: u32,
        viewport_width: f64,
        device_pixel_ratio: f64,
    ) -> Result<Self, EditorError> {
        let count = source.page_count();
        if count == 0 {
            return Err(EditorError::PageUnavailable(page));
        }
        let nav = PageNavigator::new(page, count, config.swipe.cooldown());
        let page_image = source.render_page(nav.current())?;
        let layout = PageLayout::fit_to_width(
            page_image.size(),
            viewport_width,
            device_pixel_ratio,
            config.max_pixel_ratio,
        );
        let surface = PixmapSurface::new(layout.backing_width, layout.backing_height)?;

        let mut editor = Self {
            config,
            document: document.into(),
            storage,
            source,
            ink: InkController::new(config.tools, config.input),
            store: StrokeStore::with_undo_limit(config.undo_limit),
            text: TextBoxManager::new(config.text),
            swipe: SwipeDetector::new(config.swipe),
            nav,
            renderer: InkRenderer::new(config),
            surface,
            page_image,
            layout,
            viewport_width,
            device_pixel_ratio,
            origin: Point::ZERO,
            pending: BTreeMap::new(),
            events: Vec::new(),
        };
        editor.load_current();
        log::info!("opened {} at page {}/{}", editor.document, editor.current_page(), count);
        editor.emit(HostEvent::Ready {
            page: editor.current_page(),
            page_count: count,
        });
        Ok(editor)
    }

    pub fn current_page(&self) -> u32 {
        self.nav.current()
    }

    pub fn page_count(&self) -> u32 {
        self.nav.count()
    }

    pub fn settings(&self) -> &ToolSettings {
        self.ink.settings()
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Committed strokes of the current page.
    pub fn strokes(&self) -> &[Stroke] {
        self.store.strokes(self.current_page())
    }

    pub fn text_boxes(&self) -> &TextBoxManager {
        &self.text
    }

    /// The ink layer, sized to the page backing buffer.
    pub fn surface(&self) -> &PixmapSurface {
        &self.surface
    }

    /// Container scrolling must be suppressed while this is true.
    pub fn scroll_locked(&self) -> bool {
        self.ink.scroll_locked()
    }

    /// Whether a render frame has been requested since the last
    /// [`animation_frame`](Self::animation_frame).
    pub fn frame_pending(&self) -> bool {
        self.ink.frame_pending()
    }

    /// Pages with writes still outstanding.
    pub fn unsaved_pages(&self) -> Vec<u32> {
        self.pending.keys().copied().collect()
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Update where the page wrapper sits on screen (after scrolling).
    pub fn set_page_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    fn emit(&mut self, event: HostEvent) {
        log::trace!("event {:?}", event);
        self.events.push(event);
    }

    fn on_screen(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.layout.logical)
    }

    fn sizes(&self) -> SurfaceSizes {
        SurfaceSizes {
            canvas: self.layout.backing(),
            wrapper: self.layout.logical,
        }
    }

    fn key(&self, page: u32) -> PageKey {
        PageKey::new(self.document.as_str(), page)
    }

    // --- Host messages ---

    /// Apply one raw host message. Malformed messages are ignored.
    pub fn handle_message(&mut self, message: &str, now: Duration) {
        match HostCommand::parse(message) {
            Some(command) => self.apply_command(command, now),
            None => log::debug!("ignoring host message {:?}", message),
        }
    }

    pub fn apply_command(&mut self, command: HostCommand, now: Duration) {
        let page = self.current_page();
        match command {
            HostCommand::SetMode(mode) => {
                self.ink.settings_mut().set_mode(mode);
                if mode != ToolMode::Text {
                    let outcome = self.text.blur().max(self.text.deselect());
                    self.apply_text(outcome);
                }
            }
            HostCommand::SetColor(color) => self.ink.settings_mut().set_color(color),
            HostCommand::SetWidth(width) => {
                if !self.ink.settings_mut().set_width(width) {
                    log::debug!("rejected stroke width {}", width);
                }
            }
            HostCommand::SetEraserRadius(radius) => {
                if !self.ink.settings_mut().set_eraser_radius(radius) {
                    log::debug!("rejected eraser radius {}", radius);
                }
            }
            HostCommand::Undo => {
                if self.store.undo(page) {
                    self.strokes_changed();
                }
            }
            HostCommand::Redo => {
                if self.store.redo(page) {
                    self.strokes_changed();
                }
            }
            HostCommand::Clear => {
                if self.store.clear_page(page) {
                    self.strokes_changed();
                }
            }
            HostCommand::PrevPage => {
                self.step_page(SwipeDirection::Previous, now);
            }
            HostCommand::NextPage => {
                self.step_page(SwipeDirection::Next, now);
            }
            HostCommand::Save => {
                self.flush();
            }
            HostCommand::SetTextStyle { color, font_size } => {
                let outcome = self.text.set_style(color, font_size);
                self.apply_text(outcome);
            }
            HostCommand::ImportTextBoxes(record) => {
                let outcome = self.text.import(record, self.layout.logical);
                self.apply_text(outcome);
            }
            HostCommand::ExportTextBoxes => {
                let record = self.text.export(self.layout.logical);
                self.emit(HostEvent::TextBoxes { page, record });
            }
        }
    }

    // --- Ink input ---

    /// Pointer pressed at a client position.
    ///
    /// In text mode the press goes to the text-box overlay; otherwise it may
    /// start an ink or eraser gesture. Returns true when the event was used.
    pub fn pointer_down(&mut self, pointer_id: u64, kind: PointerKind, client: Point, now: Duration) -> bool {
        if self.settings().mode == ToolMode::Text {
            let point = self.layout.to_wrapper(client, self.on_screen());
            let outcome = self.text.press(point, now);
            self.apply_text(outcome);
            return true;
        }
        let point = self.layout.to_canvas(client, self.on_screen());
        self.ink.pointer_down(pointer_id, kind, point, self.current_page())
    }

    /// Coalesced move samples. Returns true when a frame should be scheduled.
    pub fn pointer_move(&mut self, pointer_id: u64, clients: &[Point]) -> bool {
        if self.text.is_interacting() {
            if let Some(last) = clients.last() {
                let point = self.layout.to_wrapper(*last, self.on_screen());
                self.text.pointer_move(point);
            }
            return false;
        }
        let rect = self.on_screen();
        let samples: Vec<Point> = clients.iter().map(|c| self.layout.to_canvas(*c, rect)).collect();
        self.ink.pointer_move(pointer_id, &samples)
    }

    /// Draw the ink added since the previous frame.
    pub fn animation_frame(&mut self) {
        if let Some(segment) = self.ink.take_frame() {
            self.renderer.draw_segment(&mut self.surface, &segment);
        }
    }

    pub fn pointer_up(&mut self, pointer_id: u64) {
        if self.text.is_interacting() {
            let outcome = self.text.pointer_up();
            self.apply_text(outcome);
            return;
        }
        let outcome = self.ink.pointer_up(pointer_id);
        self.apply_gesture(outcome);
    }

    pub fn pointer_cancel(&mut self, pointer_id: u64) {
        if self.text.is_interacting() {
            let outcome = self.text.pointer_up();
            self.apply_text(outcome);
            return;
        }
        let outcome = self.ink.pointer_cancel(pointer_id);
        self.apply_gesture(outcome);
    }

    fn apply_gesture(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Commit(stroke) => {
                let page = stroke.page;
                if self.store.commit(page, stroke) {
                    self.strokes_changed();
                }
            }
            GestureOutcome::Erase { page, path, radius } => {
                if erase(&mut self.store, page, &path, radius).changed() {
                    self.strokes_changed();
                }
            }
            GestureOutcome::Discarded => self.redraw(),
            GestureOutcome::Ignored => {}
        }
    }

    // --- Touch navigation ---

    pub fn touch_start(&mut self, client: Point, touches: usize, now: Duration) {
        self.swipe.touch_start(client, now, touches);
    }

    pub fn touch_move(&mut self, touches: usize) {
        self.swipe.touch_move(touches);
    }

    /// End a touch gesture. Returns the new page when it was a swipe.
    pub fn touch_end(&mut self, client: Point, now: Duration) -> Option<u32> {
        let direction = self.swipe.touch_end(client, now)?;
        if self.ink.is_drawing() {
            return None;
        }
        self.step_page(direction, now)
    }

    pub fn touch_cancel(&mut self) {
        self.swipe.touch_cancel();
    }

    // --- Text-boxes ---

    /// Content typed into a box while editing. Persisted when editing ends.
    pub fn set_text_content(&mut self, id: TextBoxId, html: impl Into<String>) {
        let outcome = self.text.set_content(id, html);
        self.apply_text(outcome);
    }

    /// The editable box lost focus.
    pub fn blur_text(&mut self) {
        let outcome = self.text.blur();
        self.apply_text(outcome);
    }

    /// Handle a key by its DOM name. Returns true when a binding applied.
    pub fn key_press(&mut self, key: &str) -> bool {
        let outcome = match ShortcutRegistry::action(key) {
            Some(KeyAction::DeleteTextBox) => self.text.delete_selected(),
            Some(KeyAction::ExitEditing) => self.text.escape(),
            None => return false,
        };
        let applied = outcome != TextBoxOutcome::Unchanged;
        self.apply_text(outcome);
        applied
    }

    fn apply_text(&mut self, outcome: TextBoxOutcome) {
        if outcome.needs_persist() {
            self.flush();
        }
    }

    // --- Pages ---

    fn step_page(&mut self, direction: SwipeDirection, now: Duration) -> Option<u32> {
        let target = self.nav.target(direction, now)?;
        self.change_page(target, now).then_some(target)
    }

    /// Switch to `page`, writing the outgoing page before reading the new one.
    ///
    /// Rejected when out of range, already current, or inside the cooldown.
    pub fn change_page(&mut self, page: u32, now: Duration) -> bool {
        if page == self.current_page() || page < 1 || page > self.page_count() || self.nav.is_locked(now) {
            return false;
        }
        let image = match self.source.render_page(page) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("page {} unavailable: {}", page, e);
                return false;
            }
        };

        let outcome = self.ink.finish();
        self.apply_gesture(outcome);
        self.text.blur();
        self.flush();

        let Some(page) = self.nav.go_to(page, now) else {
            return false;
        };
        self.page_image = image;
        self.relayout();
        self.load_current();
        let page_count = self.page_count();
        self.emit(HostEvent::PageChanged { page, page_count });
        self.emit(HostEvent::Ready { page, page_count });
        true
    }

    /// The viewport width or device-pixel ratio changed.
    ///
    /// The page is written at its old size and read back, so content is
    /// rescaled onto the new surface.
    pub fn resize(&mut self, viewport_width: f64, device_pixel_ratio: f64) {
        self.viewport_width = viewport_width;
        self.device_pixel_ratio = device_pixel_ratio;
        let layout = self.fit_layout();
        if layout == self.layout {
            return;
        }

        let outcome = self.ink.finish();
        self.apply_gesture(outcome);
        self.flush();
        self.relayout();
        self.load_current();
    }

    fn fit_layout(&self) -> PageLayout {
        PageLayout::fit_to_width(
            self.page_image.size(),
            self.viewport_width,
            self.device_pixel_ratio,
            self.config.max_pixel_ratio,
        )
    }

    fn relayout(&mut self) {
        let layout = self.fit_layout();
        match self.surface.resize(layout.backing_width, layout.backing_height) {
            Ok(()) => self.layout = layout,
            Err(e) => log::warn!("keeping previous surface: {}", e),
        }
    }

    fn load_current(&mut self) {
        let page = self.current_page();
        let sizes = self.sizes();
        let (strokes, boxes) = match self.pending.get(&page) {
            Some(write) => (
                decode_strokes(&write.ink, page, sizes.canvas),
                decode_text_boxes(&write.text, sizes.wrapper),
            ),
            None => {
                let state = load_page(self.storage.as_ref(), &self.key(page), sizes);
                (state.strokes, state.text_boxes)
            }
        };
        log::debug!("loaded page {}: {} strokes, {} text-boxes", page, strokes.len(), boxes.len());
        self.store.load_page(page, strokes, sizes.canvas);
        self.text.load(boxes);
        self.redraw();
    }

    // --- Persistence ---

    /// Repaint committed strokes, then the gesture in progress on top.
    fn redraw(&mut self) {
        let page = self.nav.current();
        self.renderer.redraw_page(&mut self.surface, self.store.strokes(page));
        if let Some(live) = self.ink.live_stroke().filter(|s| s.page == page) {
            self.renderer.draw_stroke(&mut self.surface, &live);
        }
        self.ink.mark_rendered();
    }

    fn strokes_changed(&mut self) {
        self.redraw();
        self.flush();
        let page = self.current_page();
        let canvas = self.layout.backing();
        let strokes = self
            .store
            .strokes(page)
            .iter()
            .map(|s| StrokeRecord::from_stroke(s, canvas))
            .collect();
        self.emit(HostEvent::Strokes { page, strokes });
    }

    fn encode_current(&self) -> StorageResult<PendingWrite> {
        let sizes = self.sizes();
        Ok(PendingWrite {
            ink: encode_strokes(self.strokes(), sizes.canvas)?,
            text: encode_text_boxes(self.text.boxes(), sizes.wrapper)?,
        })
    }

    /// Write the current page and retry earlier failed writes.
    ///
    /// Returns true when nothing is left unsaved. Failures are logged, the
    /// page stays pending and `UNSAVED` is emitted.
    pub fn flush(&mut self) -> bool {
        match self.encode_current() {
            Ok(write) => {
                self.pending.insert(self.current_page(), write);
            }
            Err(e) => log::warn!("cannot encode page {}: {}", self.current_page(), e),
        }

        let mut failed = Vec::new();
        for (&page, write) in &self.pending {
            let key = self.key(page);
            let result = self
                .storage
                .put(&key.ink_key(), &write.ink)
                .and_then(|()| self.storage.put(&key.text_key(), &write.text));
            if let Err(e) = result {
                log::warn!("failed to save {}: {}", key, e);
                failed.push(page);
            }
        }
        self.pending.retain(|page, _| failed.contains(page));
        for page in failed {
            self.emit(HostEvent::Unsaved { page });
        }
        self.pending.is_empty()
    }

    /// The user asked to leave: write everything, then emit `BACK`.
    pub fn request_back(&mut self) {
        let outcome = self.ink.finish();
        self.apply_gesture(outcome);
        self.text.blur();
        self.flush();
        self.emit(HostEvent::Back);
    }

    /// The current page flattened with its ink, as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, EditorError> {
        Ok(self.surface.composite_over(&self.page_image)?.encode_png()?)
    }

    /// Text-boxes of the current page, for hosts that render the overlay.
    pub fn boxes(&self) -> &[TextBox] {
        self.text.boxes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BlankPages;
    use kurbo::Size;
    use pageink_core::storage::{MemoryStorage, StorageError};
    use pageink_core::stroke::InkTool;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory storage whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail: AtomicBool,
    }

    impl PageStore for FlakyStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Io("disk full".to_string()));
            }
            self.inner.put(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            self.inner.keys()
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn open_with(storage: Arc<dyn PageStore>) -> Editor {
        // 200 px wide pages in a 200 px viewport at ratio 1: client == canvas.
        Editor::open(
            EditorConfig::default(),
            "doc",
            storage,
            Box::new(BlankPages::new(3, 200, 300)),
            1,
            200.0,
            1.0,
        )
        .unwrap()
    }

    fn open() -> (Editor, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut editor = open_with(storage.clone());
        editor.drain_events();
        (editor, storage)
    }

    fn draw(editor: &mut Editor, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        assert!(editor.pointer_down(1, PointerKind::Pen, Point::new(first.0, first.1), ms(0)));
        let samples: Vec<Point> = rest.iter().map(|(x, y)| Point::new(*x, *y)).collect();
        editor.pointer_move(1, &samples);
        editor.animation_frame();
        editor.pointer_up(1);
    }

    fn message(editor: &mut Editor, json: &str, now: u64) {
        editor.handle_message(json, ms(now));
    }

    #[test]
    fn test_open_emits_ready() {
        let storage = Arc::new(MemoryStorage::new());
        let mut editor = open_with(storage);
        assert_eq!(editor.drain_events(), vec![HostEvent::Ready { page: 1, page_count: 3 }]);
        assert_eq!(editor.layout().backing(), Size::new(200.0, 300.0));
    }

    #[test]
    fn test_open_without_pages_fails() {
        let result = Editor::open(
            EditorConfig::default(),
            "doc",
            Arc::new(MemoryStorage::new()),
            Box::new(BlankPages::new(0, 10, 10)),
            1,
            100.0,
            1.0,
        );
        assert!(matches!(result, Err(EditorError::PageUnavailable(1))));
    }

    #[test]
    fn test_stroke_lifecycle() {
        let (mut editor, storage) = open();
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);

        let strokes = editor.strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].tool, InkTool::Pen);
        assert!((strokes[0].width - 4.0).abs() < f64::EPSILON);
        assert_eq!(strokes[0].points, vec![Point::new(10.0, 10.0), Point::new(10.0, 40.0)]);

        let events = editor.drain_events();
        assert!(matches!(&events[..], [HostEvent::Strokes { page: 1, strokes }] if strokes.len() == 1));
        assert!(storage.contains("doc/1/ink").unwrap());
        assert_eq!(editor.surface().to_bitmap().pixel(10, 25).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_single_point_is_discarded() {
        let (mut editor, storage) = open();
        draw(&mut editor, &[(10.0, 10.0)]);
        assert!(editor.strokes().is_empty());
        assert!(editor.drain_events().is_empty());
        assert!(!storage.contains("doc/1/ink").unwrap());
    }

    #[test]
    fn test_touch_does_not_draw() {
        let (mut editor, _) = open();
        assert!(!editor.pointer_down(1, PointerKind::Touch, Point::new(5.0, 5.0), ms(0)));
        assert!(!editor.scroll_locked());
    }

    #[test]
    fn test_eraser_removes_intersecting_stroke() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(5.0, 45.0), (5.0, 55.0)]);
        draw(&mut editor, &[(100.0, 100.0), (150.0, 150.0)]);
        message(&mut editor, r#"{"type":"SET_MODE","mode":"eraser"}"#, 0);
        editor.drain_events();

        draw(&mut editor, &[(0.0, 50.0)]);
        assert_eq!(editor.strokes().len(), 1);
        assert!((editor.strokes()[0].points[0].x - 100.0).abs() < f64::EPSILON);

        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        assert_eq!(editor.strokes().len(), 2);
    }

    #[test]
    fn test_undo_redo_clear() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(10.0, 10.0), (20.0, 20.0)]);
        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        assert!(editor.strokes().is_empty());
        message(&mut editor, r#"{"type":"REDO"}"#, 0);
        assert_eq!(editor.strokes().len(), 1);
        message(&mut editor, r#"{"type":"CLEAR"}"#, 0);
        assert!(editor.strokes().is_empty());
        assert!(editor.surface().data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_malformed_messages_ignored() {
        let (mut editor, _) = open();
        let before = *editor.settings();
        message(&mut editor, "{not json", 0);
        message(&mut editor, r#"{"type":"SET_WIDTH","width":"huge"}"#, 0);
        message(&mut editor, r#"{"type":"SET_COLOR","color":12}"#, 0);
        assert_eq!(*editor.settings(), before);
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_settings_apply_to_next_stroke() {
        let (mut editor, _) = open();
        message(&mut editor, r##"{"type":"SET_COLOR","color":"#ff0000"}"##, 0);
        message(&mut editor, r#"{"type":"SET_MODE","mode":"highlighter"}"#, 0);
        message(&mut editor, r#"{"type":"SET_WIDTH","width":10}"#, 0);
        draw(&mut editor, &[(10.0, 10.0), (50.0, 10.0)]);

        let stroke = &editor.strokes()[0];
        assert_eq!(stroke.tool, InkTool::Highlighter);
        assert_eq!(stroke.color.to_string(), "#ff0000");
        assert!((stroke.width - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_page_change_flushes_outgoing_page() {
        let (mut editor, storage) = open();
        editor.pointer_down(1, PointerKind::Pen, Point::new(10.0, 10.0), ms(0));
        editor.pointer_move(1, &[Point::new(10.0, 60.0)]);

        message(&mut editor, r#"{"type":"NEXT"}"#, 1000);
        assert_eq!(editor.current_page(), 2);
        assert!(editor.strokes().is_empty());
        assert!(!editor.scroll_locked());

        let saved = storage.get("doc/1/ink").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));

        let events = editor.drain_events();
        assert!(events.contains(&HostEvent::PageChanged { page: 2, page_count: 3 }));

        message(&mut editor, r#"{"type":"PREV"}"#, 1100);
        assert_eq!(editor.current_page(), 2, "inside cooldown");
        message(&mut editor, r#"{"type":"PREV"}"#, 2000);
        assert_eq!(editor.current_page(), 1);
        assert_eq!(editor.strokes().len(), 1);
    }

    #[test]
    fn test_swipe_changes_page() {
        let (mut editor, _) = open();
        editor.touch_start(Point::new(150.0, 100.0), 1, ms(0));
        editor.touch_move(1);
        assert_eq!(editor.touch_end(Point::new(50.0, 105.0), ms(200)), Some(2));

        editor.touch_start(Point::new(150.0, 100.0), 1, ms(300));
        assert_eq!(editor.touch_end(Point::new(50.0, 100.0), ms(400)), None);

        editor.touch_start(Point::new(50.0, 100.0), 2, ms(1000));
        assert_eq!(editor.touch_end(Point::new(150.0, 100.0), ms(1100)), None);
        assert_eq!(editor.current_page(), 2);
    }

    #[test]
    fn test_failed_write_retried() {
        let storage = Arc::new(FlakyStorage::default());
        let mut editor = open_with(storage.clone());
        editor.drain_events();

        storage.fail.store(true, Ordering::SeqCst);
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);
        assert!(editor.drain_events().contains(&HostEvent::Unsaved { page: 1 }));
        assert_eq!(editor.unsaved_pages(), vec![1]);

        // The unsaved page survives a round trip through another page.
        message(&mut editor, r#"{"type":"NEXT"}"#, 1000);
        message(&mut editor, r#"{"type":"PREV"}"#, 2000);
        assert_eq!(editor.strokes().len(), 1);

        storage.fail.store(false, Ordering::SeqCst);
        assert!(editor.flush());
        assert!(editor.unsaved_pages().is_empty());
        assert!(storage.contains("doc/1/ink").unwrap());
    }

    #[test]
    fn test_resize_rescales_strokes() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);
        editor.resize(400.0, 1.0);
        assert_eq!(editor.layout().backing(), Size::new(400.0, 600.0));
        assert_eq!(editor.strokes()[0].points, vec![Point::new(20.0, 20.0), Point::new(20.0, 80.0)]);
    }

    #[test]
    fn test_undo_survives_resize() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);
        draw(&mut editor, &[(30.0, 10.0), (30.0, 40.0)]);
        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        editor.resize(400.0, 1.0);
        assert_eq!(editor.strokes()[0].points, vec![Point::new(20.0, 20.0), Point::new(20.0, 80.0)]);

        message(&mut editor, r#"{"type":"REDO"}"#, 0);
        assert_eq!(editor.strokes().len(), 2);
        assert_eq!(editor.strokes()[1].points, vec![Point::new(60.0, 20.0), Point::new(60.0, 80.0)]);

        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        assert!(editor.strokes().is_empty());
    }

    #[test]
    fn test_undo_survives_page_round_trip() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);
        message(&mut editor, r#"{"type":"NEXT"}"#, 1000);
        message(&mut editor, r#"{"type":"PREV"}"#, 2000);
        assert_eq!(editor.current_page(), 1);
        assert_eq!(editor.strokes().len(), 1);

        message(&mut editor, r#"{"type":"UNDO"}"#, 3000);
        assert!(editor.strokes().is_empty());
    }

    #[test]
    fn test_live_ink_kept_across_undo() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(100.0, 100.0), (150.0, 150.0)]);
        editor.pointer_down(1, PointerKind::Pen, Point::new(10.0, 10.0), ms(0));
        editor.pointer_move(1, &[Point::new(10.0, 60.0)]);
        editor.animation_frame();
        let alpha = |editor: &Editor| editor.surface().to_bitmap().pixel(10, 35).map(|p| p[3]);
        assert_eq!(alpha(&editor), Some(255));

        message(&mut editor, r#"{"type":"UNDO"}"#, 0);
        assert!(editor.strokes().is_empty());
        assert_eq!(alpha(&editor), Some(255));

        // Points arriving after the redraw are still painted live.
        editor.pointer_move(1, &[Point::new(60.0, 60.0)]);
        editor.animation_frame();
        assert_eq!(editor.surface().to_bitmap().pixel(35, 60).map(|p| p[3]), Some(255));

        editor.pointer_up(1);
        assert_eq!(editor.strokes().len(), 1);
        assert_eq!(editor.strokes()[0].points.len(), 3);
    }

    #[test]
    fn test_pointer_mapping_uses_origin_and_ratio() {
        let (mut editor, _) = open();
        editor.resize(200.0, 2.0);
        editor.set_page_origin(Point::new(0.0, -100.0));
        draw(&mut editor, &[(10.0, 0.0), (10.0, 20.0)]);
        assert_eq!(editor.strokes()[0].points, vec![Point::new(20.0, 200.0), Point::new(20.0, 240.0)]);
    }

    #[test]
    fn test_text_box_flow() {
        let (mut editor, storage) = open();
        message(&mut editor, r#"{"type":"SET_MODE","mode":"text"}"#, 0);
        assert!(editor.pointer_down(1, PointerKind::Touch, Point::new(20.0, 30.0), ms(0)));
        assert_eq!(editor.boxes().len(), 1);
        let id = editor.boxes()[0].id;
        assert!(storage.get("doc/1/text").unwrap().unwrap().contains(&id.to_string()));

        // Drag the body; persisted on release only.
        editor.pointer_down(1, PointerKind::Touch, Point::new(30.0, 40.0), ms(1000));
        editor.pointer_move(1, &[Point::new(60.0, 40.0)]);
        editor.pointer_up(1);
        assert!((editor.boxes()[0].left - 50.0).abs() < f64::EPSILON);

        assert!(editor.key_press("Delete"));
        assert!(editor.boxes().is_empty());
        assert!(!editor.key_press("Delete"));
    }

    #[test]
    fn test_text_editing_persists_on_exit() {
        let (mut editor, storage) = open();
        message(&mut editor, r#"{"type":"SET_MODE","mode":"text"}"#, 0);
        editor.pointer_down(1, PointerKind::Pen, Point::new(20.0, 30.0), ms(0));
        let id = editor.boxes()[0].id;

        editor.pointer_down(1, PointerKind::Pen, Point::new(25.0, 35.0), ms(1000));
        editor.pointer_up(1);
        editor.pointer_down(1, PointerKind::Pen, Point::new(25.0, 35.0), ms(1100));
        assert_eq!(editor.text_boxes().editing(), Some(id));

        editor.set_text_content(id, "hello");
        assert!(!storage.get("doc/1/text").unwrap().unwrap().contains("hello"));
        assert!(editor.key_press("Escape"));
        assert!(storage.get("doc/1/text").unwrap().unwrap().contains("hello"));
    }

    #[test]
    fn test_export_text_boxes_event() {
        let (mut editor, _) = open();
        message(
            &mut editor,
            r#"{"type":"IMPORT_TEXTBOXES","payload":{"width":100,"height":150,"boxes":[{"left":10,"top":10,"width":50,"height":20}]}}"#,
            0,
        );
        message(&mut editor, r#"{"type":"EXPORT_TEXTBOXES"}"#, 0);
        let events = editor.drain_events();
        let Some(HostEvent::TextBoxes { page: 1, record }) = events.last() else {
            panic!("expected export, got {events:?}");
        };
        assert!((record.width - 200.0).abs() < f64::EPSILON);
        assert!((record.boxes[0].left - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_request_back() {
        let (mut editor, storage) = open();
        editor.pointer_down(1, PointerKind::Pen, Point::new(10.0, 10.0), ms(0));
        editor.pointer_move(1, &[Point::new(30.0, 10.0)]);
        editor.request_back();
        assert_eq!(editor.drain_events().last(), Some(&HostEvent::Back));
        assert!(storage.contains("doc/1/ink").unwrap());
    }

    #[test]
    fn test_export_png() {
        let (mut editor, _) = open();
        draw(&mut editor, &[(10.0, 10.0), (10.0, 40.0)]);
        let png = editor.export_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
