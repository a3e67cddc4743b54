// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for saucer-host-sdk.
//!
//! These run the full proxy stack (thunks, subscription registries, handles)
//! against `saucer-mock-native`, which implements the native function table
//! in-process and lets the tests fire native events.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use saucer_host_sdk::*;
use saucer_mock_native as mock;

fn library() -> Arc<NativeLibrary> {
    let _ = env_logger::builder().is_test(true).try_init();
    NativeLibrary::from_vtable(mock::vtable())
}

fn application(library: &Arc<NativeLibrary>) -> Application {
    Application::new(library, &ApplicationOptions::new("dev.saucer.tests")).unwrap()
}

/// Run `f`, which must panic, and return the panic message.
fn panic_text<R>(f: impl FnOnce() -> R) -> String {
    let payload = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("expected a panic"),
        Err(payload) => payload,
    };
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    payload.downcast_ref::<&str>().map(|m| m.to_string()).unwrap_or_default()
}

type ResizeHandler = Arc<dyn Fn(i32, i32) + Send + Sync>;

fn recording_resize(name: &'static str, log: &Arc<Mutex<Vec<(&'static str, i32, i32)>>>) -> ResizeHandler {
    let log = log.clone();
    Arc::new(move |width, height| log.lock().unwrap().push((name, width, height)))
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn test_handlers_fire_in_order_until_removed_or_disposed() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let a = recording_resize("a", &log);
    let b = recording_resize("b", &log);
    window.on(WindowEvent::Resize(a.clone()));
    window.on(WindowEvent::Resize(b.clone()));

    native.emit_resize(10, 20);
    native.emit_resize(30, 40);
    assert_eq!(
        *log.lock().unwrap(),
        vec![("a", 10, 20), ("b", 10, 20), ("a", 30, 40), ("b", 30, 40)]
    );

    assert!(window.off(&WindowEvent::Resize(a.clone())));
    assert!(!window.off(&WindowEvent::Resize(a.clone())));
    assert_eq!(Arc::strong_count(&a), 1);

    log.lock().unwrap().clear();
    native.emit_resize(1, 2);
    assert_eq!(*log.lock().unwrap(), vec![("b", 1, 2)]);

    window.dispose();
    assert!(window.is_disposed());
    assert!(native.is_freed());
    assert_eq!(Arc::strong_count(&b), 1);

    let expected = "Window used after dispose";
    assert_eq!(panic_text(|| window.on(WindowEvent::Resize(b.clone()))), expected);
    assert_eq!(panic_text(|| window.once(WindowEvent::Resize(b.clone()))), expected);
    assert_eq!(panic_text(|| window.off(&WindowEvent::Resize(b.clone()))), expected);
    assert_eq!(panic_text(|| window.off_all(WindowEventKind::Resize)), expected);
    assert_eq!(panic_text(|| window.listener_count(WindowEventKind::Resize)), expected);
    assert_eq!(panic_text(|| window.pending_once(WindowEventKind::Resize)), expected);
    assert_eq!(Arc::strong_count(&b), 1);
}

#[test]
fn test_application_bookkeeping_fails_fast_after_dispose() {
    let library = library();
    let app = application(&library);
    app.post(|| {});
    app.dispose();

    let expected = "Application used after dispose";
    assert_eq!(panic_text(|| app.pending_posts()), expected);
    assert_eq!(panic_text(|| app.listener_count(ApplicationEventKind::Quit)), expected);
    assert_eq!(panic_text(|| app.pending_once(ApplicationEventKind::Quit)), expected);
    assert_eq!(panic_text(|| app.post(|| {})), expected);
}

#[test]
fn test_registering_same_handler_twice_replaces_it() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let handler = recording_resize("only", &log);
    window.on(WindowEvent::Resize(handler.clone()));
    window.on(WindowEvent::Resize(handler.clone()));

    assert_eq!(window.listener_count(WindowEventKind::Resize), 1);
    assert_eq!(native.listener_count(WindowEventKind::Resize), 1);
    assert_eq!(native.stats().on, 2);
    assert_eq!(native.stats().off, 1);

    window.set_size(640, 480);
    assert_eq!(*log.lock().unwrap(), vec![("only", 640, 480)]);
    assert_eq!(window.size(), (640, 480));
}

#[test]
fn test_once_handler_fires_once_and_is_released() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let handler: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    window.once(WindowEvent::Closed(handler.clone()));
    assert_eq!(window.pending_once(WindowEventKind::Closed), 1);

    native.emit_closed();
    native.emit_closed();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(window.pending_once(WindowEventKind::Closed), 0);
    assert_eq!(Arc::strong_count(&handler), 1);
}

#[test]
fn test_off_all_keeps_one_shots_pinned() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let persistent_log = seen.clone();
    let persistent: Arc<dyn Fn(bool) + Send + Sync> =
        Arc::new(move |focused| persistent_log.lock().unwrap().push(("persistent", focused)));
    let once_log = seen.clone();
    let once: Arc<dyn Fn(bool) + Send + Sync> =
        Arc::new(move |focused| once_log.lock().unwrap().push(("once", focused)));

    window.on(WindowEvent::Focus(persistent));
    window.once(WindowEvent::Focus(once));
    window.off_all(WindowEventKind::Focus);

    assert_eq!(window.listener_count(WindowEventKind::Focus), 0);
    assert_eq!(window.pending_once(WindowEventKind::Focus), 1);
    assert_eq!(native.stats().off_all, 1);

    window.focus();
    assert_eq!(*seen.lock().unwrap(), vec![("once", true)]);
    assert_eq!(window.pending_once(WindowEventKind::Focus), 0);
}

#[test]
fn test_dispose_from_inside_own_callback() {
    let library = library();
    let app = application(&library);
    let window = Arc::new(Window::new(&app).unwrap());
    let native = mock::latest_window().unwrap();

    let weak = Arc::downgrade(&window);
    let disposer: Arc<dyn Fn() -> Policy + Send + Sync> = Arc::new(move || {
        if let Some(window) = weak.upgrade() {
            window.dispose();
        }
        Policy::Allow
    });
    let later_calls = Arc::new(AtomicUsize::new(0));
    let counter = later_calls.clone();
    let later: Arc<dyn Fn() -> Policy + Send + Sync> = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Policy::Allow
    });

    window.on(WindowEvent::Close(disposer.clone()));
    window.on(WindowEvent::Close(later.clone()));

    assert_eq!(native.emit_close(), vec![Policy::Allow]);
    assert!(window.is_disposed());
    assert!(native.is_freed());
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&disposer), 1);
    assert_eq!(Arc::strong_count(&later), 1);
}

#[test]
fn test_panicking_handler_yields_fallback() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let blocker: Arc<dyn Fn() -> Policy + Send + Sync> = Arc::new(|| Policy::Block);
    let exploding: Arc<dyn Fn() -> Policy + Send + Sync> = Arc::new(|| -> Policy { panic!("handler exploded") });
    window.on(WindowEvent::Close(exploding));
    window.on(WindowEvent::Close(blocker));

    window.show();
    window.close();
    assert_eq!(native.emit_close(), vec![Policy::Allow, Policy::Block]);
    assert!(window.visible());
}

#[test]
fn test_unknown_decoration_is_skipped() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let handler: Arc<dyn Fn(WindowDecoration) + Send + Sync> =
        Arc::new(move |decoration| log.lock().unwrap().push(decoration));
    window.on(WindowEvent::Decorated(handler));

    native.emit_decorated(42);
    window.set_decorations(WindowDecoration::Partial);

    assert_eq!(*seen.lock().unwrap(), vec![WindowDecoration::Partial]);
    assert_eq!(window.decorations(), Some(WindowDecoration::Partial));
}

// ============================================================================
// Construction and handles
// ============================================================================

#[test]
fn test_construction_error_codes() {
    let library = library();

    mock::fail_next_construction(3, false);
    let err = Application::new(&library, &ApplicationOptions::new("dev.saucer.fail")).unwrap_err();
    assert!(matches!(
        err,
        SaucerError::Handle(HandleError::Construction {
            entity: "Application",
            code: 3
        })
    ));

    let app = application(&library);
    mock::fail_next_construction(5, true);
    let err = Window::new(&app).unwrap_err();
    assert!(matches!(
        err,
        SaucerError::Handle(HandleError::Construction { entity: "Window", code: 5 })
    ));
    // The object returned alongside the error was freed.
    assert!(mock::latest_window().unwrap().is_freed());
}

#[test]
fn test_url_parse_failure_and_components() {
    let library = library();

    let err = Url::parse(&library, "definitely not a url").unwrap_err();
    assert!(matches!(
        err,
        SaucerError::Handle(HandleError::Construction {
            entity: "Url",
            code: mock::INVALID_ARGUMENT
        })
    ));

    let url = Url::from_components(&library, "https", Some("example.com"), Some(8080), "/docs").unwrap();
    assert_eq!(url.string().unwrap(), "https://example.com:8080/docs");
    assert_eq!(url.port(), Some(8080));
    assert_eq!(url.user().unwrap(), "");

    let file = Url::from_input(&library, "/srv/index.html").unwrap();
    assert_eq!(file.scheme().unwrap(), "file");
    assert_eq!(file.path().unwrap(), "/srv/index.html");
    assert_eq!(file.port(), None);

    let copy = url.copy().unwrap();
    url.dispose();
    assert_eq!(copy.host().unwrap(), "example.com");
}

#[test]
fn test_window_title_round_trip() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();

    window.set_title("hello").unwrap();
    assert_eq!(window.title().unwrap(), "hello");

    window.set_title("").unwrap();
    assert_eq!(window.title().unwrap(), "");

    let err = window.set_title("a\0b").unwrap_err();
    assert!(matches!(err, SaucerError::Codec(CodecError::InteriorNul { position: 1 })));
}

#[test]
fn test_window_properties() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    window.set_background([1, 2, 3, 4]);
    window.set_min_size(200, 100);
    window.set_max_size(1600, 1200);
    window.set_position(15, 25);
    window.set_always_on_top(true);
    window.start_resize(WindowEdge::BOTTOM_RIGHT);
    window.start_drag();

    assert_eq!(window.background(), [1, 2, 3, 4]);
    assert_eq!(window.min_size(), (200, 100));
    assert_eq!(window.max_size(), (1600, 1200));
    assert_eq!(window.position(), (15, 25));
    assert!(window.always_on_top());

    let state = native.state();
    assert_eq!(state.resize_edge, Some(WindowEdge::BOTTOM_RIGHT));
    assert_eq!(state.drags, 1);

    let screen = window.screen().unwrap();
    assert_eq!(screen.name(), "Mock Display");
    assert_eq!(screen.size(), (1920, 1080));
}

#[test]
fn test_window_icon_from_stash() {
    let library = library();
    let app = application(&library);
    let window = Window::new(&app).unwrap();
    let native = mock::latest_window().unwrap();

    let empty = Stash::empty(&library).unwrap();
    assert!(Icon::from_stash(&library, &empty).is_err());

    let pixels = Stash::from_bytes(&library, &[0x89, b'P', b'N', b'G']).unwrap();
    let icon = Icon::from_stash(&library, &pixels).unwrap();
    assert!(!icon.is_empty());
    window.set_icon(&icon);

    assert_eq!(native.state().icon, Some(vec![0x89, b'P', b'N', b'G']));
    assert_eq!(icon.data().unwrap().to_vec(), vec![0x89, b'P', b'N', b'G']);
}

#[test]
fn test_stash_contents() {
    let library = library();

    let stash = Stash::from_bytes(&library, &[1, 2, 3]).unwrap();
    assert_eq!(stash.size(), 3);
    assert_eq!(stash.to_vec(), vec![1, 2, 3]);

    let copy = stash.copy().unwrap();
    stash.dispose();
    assert!(stash.is_disposed());
    assert_eq!(copy.to_vec(), vec![1, 2, 3]);

    let text = Stash::from_str(&library, "hi").unwrap();
    assert_eq!(text.to_vec(), b"hi".to_vec());

    let empty = Stash::empty(&library).unwrap();
    assert!(empty.is_empty());
    assert!(empty.to_vec().is_empty());
}

// ============================================================================
// Application
// ============================================================================

#[test]
fn test_run_drains_posted_tasks() {
    let library = library();
    let app = application(&library);

    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();
    app.post(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(app.pending_posts(), 1);

    let mut finished = false;
    let counter = ran.clone();
    let code = app.run(
        move |app| {
            let counter = counter.clone();
            app.post(move || {
                counter.fetch_add(10, Ordering::SeqCst);
            });
        },
        |_| finished = true,
    );

    assert_eq!(code, 0);
    assert!(finished);
    assert_eq!(ran.load(Ordering::SeqCst), 11);
    assert_eq!(app.pending_posts(), 0);
}

#[test]
fn test_dispose_releases_unrun_posts() {
    let library = library();
    let app = application(&library);

    let captured = Arc::new(());
    let held = captured.clone();
    app.post(move || drop(held));
    assert_eq!(Arc::strong_count(&captured), 2);

    app.dispose();
    assert_eq!(Arc::strong_count(&captured), 1);
    assert_eq!(mock::latest_application().unwrap().drain_posts(), 0);
}

#[test]
fn test_quit_handler_can_block() {
    let library = library();
    let app = application(&library);
    let native = mock::latest_application().unwrap();

    let block: Arc<dyn Fn() -> Policy + Send + Sync> = Arc::new(|| Policy::Block);
    app.on(ApplicationEvent::Quit(block.clone()));
    app.quit();
    assert!(!native.quit_requested());

    assert!(app.off(&ApplicationEvent::Quit(block)));
    app.quit();
    assert!(native.quit_requested());
}

#[test]
fn test_screens_are_owned() {
    let library = library();
    let app = application(&library);
    let native = mock::latest_application().unwrap();

    native.set_screens(vec![
        mock::ScreenSpec {
            name: "Left".to_string(),
            size: (1280, 720),
            position: (-1280, 0),
        },
        mock::ScreenSpec {
            name: "Right".to_string(),
            size: (2560, 1440),
            position: (0, 0),
        },
    ]);

    let before = mock::live_objects();
    let screens = app.screens().unwrap();
    assert_eq!(screens.len(), 2);
    assert_eq!(screens[0].name(), "Left");
    assert_eq!(screens[0].position(), (-1280, 0));
    assert_eq!(screens[1].size(), (2560, 1440));
    assert_eq!(mock::live_objects(), before + 2);

    drop(screens);
    assert_eq!(mock::live_objects(), before);
}

#[test]
fn test_application_options_reach_native_side() {
    let library = library();
    let options = ApplicationOptions {
        quit_on_last_window_closed: false,
        ..ApplicationOptions::new("dev.saucer.options")
    };
    let _app = Application::new(&library, &options).unwrap();

    let native = mock::latest_application().unwrap();
    assert_eq!(native.id(), "dev.saucer.options");
    assert!(!native.quit_on_last_window_closed());
}

// ============================================================================
// Schemes and library
// ============================================================================

#[test]
fn test_scheme_registration_closes_with_first_window() {
    let library = library();
    library.register_scheme("sealing-test").unwrap();
    assert!(library.schemes().contains("sealing-test"));

    let app = application(&library);
    let _window = Window::new(&app).unwrap();
    assert!(library.schemes().is_sealed());

    let err = library.register_scheme("sealing-late").unwrap_err();
    assert!(matches!(err, SaucerError::SchemeRegistrationClosed { ref scheme } if scheme == "sealing-late"));

    let native = mock::registered_schemes();
    assert!(native.contains(&"sealing-test".to_string()));
    assert!(!native.contains(&"sealing-late".to_string()));
}

#[test]
fn test_library_reports_version() {
    let library = library();
    assert_eq!(library.version(), mock::VERSION);
    assert!(library.path().is_none());
}

#[test]
fn test_dropping_everything_frees_every_object() {
    let library = library();
    let before = mock::live_objects();
    {
        let app = application(&library);
        let window = Window::new(&app).unwrap();
        let _webview = Webview::new(&window, &WebviewOptions::default()).unwrap();
        let _url = Url::parse(&library, "https://example.com").unwrap();
        let _stash = Stash::from_str(&library, "payload").unwrap();
    }
    assert_eq!(mock::live_objects(), before);
}
