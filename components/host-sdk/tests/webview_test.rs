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

//! Webview integration tests against `saucer-mock-native`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use saucer_host_sdk::*;
use saucer_mock_native as mock;

struct Fixture {
    library: Arc<NativeLibrary>,
    webview: Webview,
    native: Arc<mock::MockWebview>,
    _window: Window,
    _app: Application,
}

// Fields drop in declaration order: webview, window, application.
fn fixture(options: &WebviewOptions) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let library = NativeLibrary::from_vtable(mock::vtable());
    let app = Application::new(&library, &ApplicationOptions::new("dev.saucer.webview-tests")).unwrap();
    let window = Window::new(&app).unwrap();
    let webview = Webview::new(&window, options).unwrap();
    let native = mock::latest_webview().unwrap();
    Fixture {
        library,
        webview,
        native,
        _window: window,
        _app: app,
    }
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_message_handler_reports_status() {
    let fx = fixture(&WebviewOptions::default());

    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    fx.webview.on(WebviewEvent::Message(Arc::new(move |message: &str| {
        log.lock().unwrap().push(message.to_string());
        Status::Handled
    })));

    assert_eq!(fx.native.emit_message("ping"), vec![Status::Handled]);
    assert_eq!(fx.native.emit_message(""), vec![Status::Handled]);
    assert_eq!(*received.lock().unwrap(), vec!["ping".to_string(), String::new()]);
}

#[test]
fn test_navigation_can_be_blocked() {
    let fx = fixture(&WebviewOptions::default());

    let asked = Arc::new(Mutex::new(Vec::new()));
    let log = asked.clone();
    fx.webview.on(WebviewEvent::Navigate(Arc::new(move |navigation: &Navigation| {
        let target = navigation.url().unwrap().string().unwrap();
        log.lock().unwrap().push(target.clone());
        if target.contains("blocked.example") {
            Policy::Block
        } else {
            Policy::Allow
        }
    })));

    fx.webview.set_url_str("https://blocked.example/").unwrap();
    assert_eq!(fx.native.state().url, "");

    fx.webview.set_url_str("https://allowed.example/").unwrap();
    assert_eq!(fx.native.state().url, "https://allowed.example/");
    assert_eq!(fx.webview.url().unwrap().host().unwrap(), "allowed.example");
    assert_eq!(asked.lock().unwrap().len(), 2);
}

#[test]
fn test_load_and_dom_ready_sequence() {
    let fx = fixture(&WebviewOptions::default());

    let events = Arc::new(Mutex::new(Vec::new()));
    let load_log = events.clone();
    fx.webview.on(WebviewEvent::Load(Arc::new(move |state| {
        load_log.lock().unwrap().push(format!("{state:?}"));
    })));
    let ready_log = events.clone();
    fx.webview.once(WebviewEvent::DomReady(Arc::new(move || {
        ready_log.lock().unwrap().push("ready".to_string());
    })));

    fx.webview.set_html("<p>hi</p>").unwrap();
    fx.native.emit_load(7);
    fx.webview.reload();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["Started", "ready", "Finished", "Started", "Finished"]
    );
    assert_eq!(fx.native.state().html.as_deref(), Some("<p>hi</p>"));
    assert_eq!(fx.native.state().reloads, 1);
}

#[test]
fn test_permission_request_is_answered() {
    let fx = fixture(&WebviewOptions::default());

    fx.webview.on(WebviewEvent::Permission(Arc::new(|request: &PermissionRequest| {
        if request.kind().contains(PermissionType::CLIPBOARD) {
            request.accept();
        } else {
            request.deny();
        }
        Status::Handled
    })));

    assert_eq!(
        fx.native.emit_permission("https://example.com", PermissionType::CLIPBOARD),
        (vec![Status::Handled], Some(true))
    );
    assert_eq!(
        fx.native.emit_permission("https://example.com", PermissionType::LOCATION),
        (vec![Status::Handled], Some(false))
    );
}

#[test]
fn test_retained_permission_request_outlives_callback() {
    let fx = fixture(&WebviewOptions::default());

    let kept = Arc::new(Mutex::new(None));
    let slot = kept.clone();
    fx.webview.once(WebviewEvent::Permission(Arc::new(move |request: &PermissionRequest| {
        *slot.lock().unwrap() = Some(request.copy().unwrap());
        Status::Handled
    })));

    let (statuses, answer) = fx.native.emit_permission("https://later.example", PermissionType::NOTIFICATION);
    assert_eq!(statuses, vec![Status::Handled]);
    assert_eq!(answer, None);

    let request = kept.lock().unwrap().take().unwrap();
    assert!(request.is_owned());
    assert_eq!(request.url().unwrap().host().unwrap(), "later.example");
    assert_eq!(request.kind(), PermissionType::NOTIFICATION);
}

#[test]
fn test_panicking_fullscreen_handler_allows() {
    let fx = fixture(&WebviewOptions::default());

    fx.webview.on(WebviewEvent::Fullscreen(Arc::new(|_| -> Policy {
        panic!("fullscreen handler exploded")
    })));

    assert_eq!(fx.native.emit_fullscreen(true), vec![Policy::Allow]);
}

#[test]
fn test_favicon_and_title_events() {
    let fx = fixture(&WebviewOptions::default());

    let sizes = Arc::new(Mutex::new(Vec::new()));
    let size_log = sizes.clone();
    fx.webview.on(WebviewEvent::Favicon(Arc::new(move |icon: &Icon| {
        size_log.lock().unwrap().push(icon.data().unwrap().size());
    })));
    let titles = Arc::new(Mutex::new(Vec::new()));
    let title_log = titles.clone();
    fx.webview.on(WebviewEvent::Title(Arc::new(move |title: &str| {
        title_log.lock().unwrap().push(title.to_string());
    })));

    fx.native.emit_favicon(&[1, 2, 3]);
    fx.native.emit_title("Home");

    assert_eq!(*sizes.lock().unwrap(), vec![3]);
    assert_eq!(*titles.lock().unwrap(), vec!["Home".to_string()]);
    assert_eq!(fx.webview.page_title().unwrap(), "Home");
    assert_eq!(fx.webview.favicon().unwrap().data().unwrap().to_vec(), vec![1, 2, 3]);
}

#[test]
fn test_once_navigated_handler_is_released_after_firing() {
    let fx = fixture(&WebviewOptions::default());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let handler: Arc<dyn Fn(&Url) + Send + Sync> = Arc::new(move |_url: &Url| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    fx.webview.once(WebviewEvent::Navigated(handler.clone()));
    assert_eq!(Arc::strong_count(&handler), 2);

    let url = Url::parse(&fx.library, "https://first.example/").unwrap();
    fx.webview.set_url(&url);
    fx.webview.set_url(&url);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Arc::strong_count(&handler), 1);
    assert_eq!(fx.native.listener_count(WebviewEventKind::Navigated), 0);
}

#[test]
fn test_dispose_unregisters_everything() {
    let fx = fixture(&WebviewOptions::default());

    let handler: Arc<dyn Fn(&str) -> Status + Send + Sync> = Arc::new(|_message: &str| Status::Handled);
    fx.webview.on(WebviewEvent::Message(handler.clone()));
    fx.webview.handle_scheme("wv-dispose", |_request, _executor| {}).unwrap();

    fx.webview.dispose();

    assert!(fx.native.is_freed());
    assert!(fx.native.handled_schemes().is_empty());
    assert_eq!(Arc::strong_count(&handler), 1);
    assert!(fx.native.emit_message("after").is_empty());

    let disposed = &fx.webview;
    for result in [
        catch_unwind(AssertUnwindSafe(|| disposed.handled_schemes().len())),
        catch_unwind(AssertUnwindSafe(|| disposed.listener_count(WebviewEventKind::Message))),
        catch_unwind(AssertUnwindSafe(|| disposed.pending_once(WebviewEventKind::Message))),
    ] {
        assert!(result.is_err());
    }
    assert!(format!("{disposed:?}").contains("Webview"));
}

// ============================================================================
// Content and properties
// ============================================================================

#[test]
fn test_options_reach_native_side() {
    let options = WebviewOptions {
        persistent_cookies: true,
        hardware_acceleration: false,
        storage_path: Some("/tmp/saucer-profile".into()),
        user_agent: Some("saucer-test".to_string()),
        browser_flags: vec!["--disable-gpu".to_string()],
        ..WebviewOptions::default()
    };
    let fx = fixture(&options);

    let config = fx.native.config();
    assert!(config.attributes);
    assert!(config.persistent_cookies);
    assert!(!config.hardware_acceleration);
    assert_eq!(config.storage_path.as_deref(), Some("/tmp/saucer-profile"));
    assert_eq!(config.user_agent.as_deref(), Some("saucer-test"));
    assert_eq!(config.browser_flags, vec!["--disable-gpu".to_string()]);
}

#[test]
fn test_webview_on_disposed_window_panics() {
    let library = NativeLibrary::from_vtable(mock::vtable());
    let app = Application::new(&library, &ApplicationOptions::new("dev.saucer.orphan")).unwrap();
    let window = Window::new(&app).unwrap();
    window.dispose();

    let result = catch_unwind(AssertUnwindSafe(|| {
        Webview::new(&window, &WebviewOptions::default())
    }));
    assert!(result.is_err());
}

#[test]
fn test_flags_and_bounds() {
    let fx = fixture(&WebviewOptions::default());

    assert!(fx.webview.context_menu());
    fx.webview.set_context_menu(false);
    fx.webview.set_dev_tools(true);
    fx.webview.set_force_dark(true);
    fx.webview.set_background([0, 0, 0, 0]);
    assert!(!fx.webview.context_menu());
    assert!(fx.webview.dev_tools());
    assert!(fx.webview.force_dark());
    assert_eq!(fx.webview.background(), [0, 0, 0, 0]);

    fx.webview.set_bounds([10, 20, 300, 200]);
    assert_eq!(fx.webview.bounds(), [10, 20, 300, 200]);
    fx.webview.reset_bounds();
    assert_eq!(fx.native.state().bounds, None);

    fx.webview.back();
    fx.webview.forward();
    fx.webview.forward();
    assert_eq!(fx.native.state().back, 1);
    assert_eq!(fx.native.state().forward, 2);
}

#[test]
fn test_embed_serve_and_scripts() {
    let fx = fixture(&WebviewOptions::default());

    let page = Stash::from_str(&fx.library, "<h1>embedded</h1>").unwrap();
    fx.webview.embed("index.html", &page, "text/html").unwrap();
    fx.webview.embed("app.js", &page, "text/javascript").unwrap();
    fx.webview.unembed("app.js").unwrap();

    let embedded = fx.native.state().embedded;
    assert_eq!(embedded.len(), 1);
    assert_eq!(
        embedded.get("index.html"),
        Some(&(b"<h1>embedded</h1>".to_vec(), "text/html".to_string()))
    );

    fx.webview.serve("index.html").unwrap();
    assert_eq!(fx.native.state().url, "saucer://embedded/index.html");

    let first = fx.webview.inject("console.log(1)", ScriptTime::Creation, false).unwrap();
    let second = fx.webview.inject("console.log(2)", ScriptTime::Ready, true).unwrap();
    assert_ne!(first, second);
    fx.webview.uninject(first);
    assert_eq!(fx.native.state().scripts.into_values().collect::<Vec<_>>(), vec!["console.log(2)".to_string()]);
    fx.webview.uninject_all();
    assert!(fx.native.state().scripts.is_empty());

    fx.webview.execute("document.title = 'x'").unwrap();
    assert_eq!(fx.native.state().executed, vec!["document.title = 'x'".to_string()]);

    fx.webview.unembed_all();
    assert!(fx.native.state().embedded.is_empty());
}

#[test]
fn test_unclearable_script_survives_uninject_all() {
    let fx = fixture(&WebviewOptions::default());

    let pinned = fx.webview.inject_with("window.pinned = 1", ScriptTime::Creation, false, false).unwrap();
    let clearable = fx.webview.inject("window.loose = 1", ScriptTime::Ready, false).unwrap();

    fx.webview.uninject_all();
    let scripts = fx.native.state().scripts;
    assert!(scripts.contains_key(&pinned));
    assert!(!scripts.contains_key(&clearable));

    fx.webview.uninject(pinned);
    assert!(fx.native.state().scripts.is_empty());
    assert!(fx.native.state().pinned_scripts.is_empty());
}

// ============================================================================
// Custom schemes
// ============================================================================

#[test]
fn test_scheme_handler_accepts_and_is_removable() {
    let fx = fixture(&WebviewOptions::default());

    let library = fx.library.clone();
    fx.webview
        .handle_scheme("wv-accept", move |request, executor| {
            let path = request.url().unwrap().path().unwrap();
            let body = Stash::from_str(&library, &format!("served {path}")).unwrap();
            let response = SchemeResponse::new(&library, &body, "text/plain").unwrap();
            response.append_header("X-Test", "yes").unwrap();
            response.set_status(201);
            executor.accept(&response);
        })
        .unwrap();
    assert_eq!(fx.webview.handled_schemes(), vec!["wv-accept".to_string()]);

    let reply = fx.native.request_scheme("wv-accept://host/page", "GET", &[]).unwrap();
    assert_eq!(
        reply.outcome(),
        Some(mock::SchemeOutcome::Accepted {
            status: 201,
            mime: "text/plain".to_string(),
            headers: vec![("X-Test".to_string(), "yes".to_string())],
            body: b"served /page".to_vec(),
        })
    );

    assert!(fx.webview.remove_scheme("wv-accept").unwrap());
    assert!(!fx.webview.remove_scheme("wv-accept").unwrap());
    assert!(fx.native.request_scheme("wv-accept://host/page", "GET", &[]).is_none());
}

#[test]
fn test_scheme_handler_replacement_and_rejection() {
    let fx = fixture(&WebviewOptions::default());

    fx.webview
        .handle_scheme("wv-replace", |_request, executor| executor.reject(SchemeError::Denied))
        .unwrap();
    fx.webview
        .handle_scheme("wv-replace", |request, executor| {
            if request.method().unwrap() == "POST" && request.content().unwrap().is_empty() {
                executor.reject(SchemeError::Invalid);
            } else {
                executor.reject(SchemeError::NotFound);
            }
        })
        .unwrap();
    assert_eq!(fx.webview.handled_schemes().len(), 1);

    let rejected = fx.native.request_scheme("wv-replace://host/", "POST", &[]).unwrap();
    assert_eq!(rejected.outcome(), Some(mock::SchemeOutcome::Rejected(SchemeError::Invalid)));

    let missing = fx.native.request_scheme("wv-replace://host/", "GET", b"body").unwrap();
    assert_eq!(missing.outcome(), Some(mock::SchemeOutcome::Rejected(SchemeError::NotFound)));
}

#[test]
fn test_copied_executor_answers_later() {
    let fx = fixture(&WebviewOptions::default());

    let parked = Arc::new(Mutex::new(Vec::new()));
    let slot = parked.clone();
    fx.webview
        .handle_scheme("wv-deferred", move |_request, executor| {
            slot.lock().unwrap().push(executor.copy().unwrap());
        })
        .unwrap();

    let reply = fx.native.request_scheme("wv-deferred://host/", "GET", &[]).unwrap();
    assert_eq!(reply.outcome(), None);

    let executor = parked.lock().unwrap().pop().unwrap();
    executor.reject(SchemeError::Failed);
    assert_eq!(reply.outcome(), Some(mock::SchemeOutcome::Rejected(SchemeError::Failed)));
}
