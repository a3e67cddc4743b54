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

//! Safe Rust bindings over the saucer webview C ABI.
//!
//! This crate provides:
//! - [`LibraryLoader`]: locate and load the native saucer library into a
//!   shared [`NativeLibrary`]
//! - Managed proxies for every native object ([`Application`], [`Window`],
//!   [`Webview`], [`Url`], [`Icon`], [`Stash`] and the callback-scoped
//!   request types), all following the [`ManagedEntity`] lifecycle
//! - Typed event subscriptions backed by pinned thunks, so Rust closures can
//!   be handed to native code without ever being called after release
//! - The custom scheme registry, which closes once the first window exists
//!
//! ```no_run
//! use std::sync::Arc;
//! use saucer_host_sdk::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let library = LibraryLoader::new(LibraryLoaderConfig::default()).load()?;
//! library.register_scheme("app")?;
//!
//! let app = Application::new(&library, &ApplicationOptions::new("com.example.demo"))?;
//! let window = Window::new(&app)?;
//! let webview = Webview::new(&window, &WebviewOptions::default())?;
//!
//! webview.on(WebviewEvent::Message(Arc::new(|message: &str| {
//!     log::info!("page says {message}");
//!     Status::Handled
//! })));
//! webview.set_url_str("app://index.html")?;
//! window.show();
//! app.run(|_| {}, |_| {});
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod loader;
pub mod proxies;
pub mod schemes;
pub mod subscriptions;
pub mod thunks;

pub use config::{ApplicationOptions, LibraryLoaderConfig, WebviewOptions};
pub use error::{Result, SaucerError};
pub use library::NativeLibrary;
pub use loader::{load_library_from_path, LibraryLoader};
pub use proxies::application::{Application, ApplicationEvent};
pub use proxies::icon::Icon;
pub use proxies::navigation::Navigation;
pub use proxies::permission::PermissionRequest;
pub use proxies::scheme::{SchemeExecutor, SchemeRequest, SchemeResponse};
pub use proxies::screen::Screen;
pub use proxies::stash::Stash;
pub use proxies::url::Url;
pub use proxies::webview::{Webview, WebviewEvent};
pub use proxies::window::{Window, WindowEvent};
pub use proxies::ManagedEntity;
pub use schemes::SchemeRegistry;

pub use saucer_abi::{
    SaucerApplicationEvent as ApplicationEventKind, SaucerPermissionType as PermissionType,
    SaucerPolicy as Policy, SaucerSchemeError as SchemeError, SaucerScriptTime as ScriptTime,
    SaucerState as LoadState, SaucerStatus as Status, SaucerWebviewEvent as WebviewEventKind,
    SaucerWindowDecoration as WindowDecoration, SaucerWindowEdge as WindowEdge,
    SaucerWindowEvent as WindowEventKind,
};
pub use saucer_ffi_primitives::{CodecError, HandleError};
