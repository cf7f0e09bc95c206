pub mod host;
pub mod listeners;
pub mod runner;

pub use runner::PageRunner;

/// Generate all `#[wasm_bindgen]` exports for a page.
///
/// Generates:
/// - `thread_local!` storage for the PageRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (page lifecycle, tour navigation, data accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod page;
/// use page::MyPage;
///
/// folio_web::export_page!(MyPage, "my-page");
/// ```
///
/// # Arguments
///
/// - `$page_type`: The page struct type; implements `folio_engine::Page` and `Default`
/// - `$page_name`: A string literal used in the initialization log message
///
/// Calls made before `page_init()` or after `page_teardown()` are logged
/// no-ops returning empty values.
#[macro_export]
macro_rules! export_page {
    ($page_type:ty, $page_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::PageRunner<$page_type>>> = RefCell::new(None);
        }

        fn with_runner<R: Default>(f: impl FnOnce(&mut $crate::PageRunner<$page_type>) -> R) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => {
                    log::warn!("{}: not initialized, call page_init() first", $page_name);
                    R::default()
                }
            })
        }

        #[wasm_bindgen]
        pub fn page_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            // A second init replaces the live page; release it first.
            if let Some(mut previous) = RUNNER.with(|cell| cell.borrow_mut().take()) {
                log::info!("{}: re-initializing, tearing down previous page", $page_name);
                previous.teardown();
            }

            let page = <$page_type as Default>::default();
            let runner = $crate::PageRunner::new(page);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $page_name);
        }

        #[wasm_bindgen]
        pub fn page_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn page_teardown() {
            with_runner(|r| r.teardown());
            RUNNER.with(|cell| cell.borrow_mut().take());
        }

        // ---- Tour ----

        #[wasm_bindgen]
        pub fn tour_start() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.start()))
        }

        #[wasm_bindgen]
        pub fn tour_next() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.next()))
        }

        #[wasm_bindgen]
        pub fn tour_prev() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.prev()))
        }

        #[wasm_bindgen]
        pub fn tour_end() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.end()))
        }

        #[wasm_bindgen]
        pub fn tour_toggle_minimize() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.toggle_minimize()))
        }

        #[wasm_bindgen]
        pub fn tour_accept_prompt() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.accept_prompt()))
        }

        #[wasm_bindgen]
        pub fn tour_dismiss_prompt() -> bool {
            with_runner(|r| r.tour().is_some_and(|t| t.dismiss_prompt()))
        }

        #[wasm_bindgen]
        pub fn tour_view_json() -> String {
            with_runner(|r| r.tour_view_json())
        }

        #[wasm_bindgen]
        pub fn tour_prompt_text() -> Option<String> {
            with_runner(|r| r.tour_prompt_text())
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn avatar_pose_ptr() -> *const f32 {
            with_runner(|r| Some(r.avatar_pose_ptr())).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn avatar_pose_floats() -> u32 {
            with_runner(|r| r.avatar_pose_floats())
        }

        #[wasm_bindgen]
        pub fn avatar_speech_text() -> String {
            with_runner(|r| r.avatar_speech_text())
        }

        #[wasm_bindgen]
        pub fn cursor_state_json() -> String {
            with_runner(|r| r.cursor_state_json())
        }

        #[wasm_bindgen]
        pub fn revealed_section_count() -> u32 {
            with_runner(|r| r.revealed_section_count())
        }
    };
}
