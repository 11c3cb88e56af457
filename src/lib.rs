//! Interactive layer of the Client-First Digital site.
//!
//! A headless [`Document`] stands in for the browser page. [`Site`] owns
//! it together with the saved preferences, the registered listeners and a
//! virtual-clock timer queue, and drives the site's features over it:
//! EN/PT-PT localization, the light/dark theme, the hero carousel, the
//! portfolio filter, scroll reveal, navigation and the contact form.
//!
//! ```
//! use clientfirst_site::{Dictionary, Document, Locale, Preferences, Site, SiteConfig};
//!
//! let json = r#"{ "path": "/index.html", "body": [
//!     { "tag": "h1", "attrs": { "data-translate": "nav.home" }, "text": "Home" }
//! ] }"#;
//! let page = Document::from_json(json).unwrap();
//! let config = SiteConfig { preferences_path: None, ..SiteConfig::default() };
//! let mut site = Site::load(page, Dictionary::builtin(), Preferences::in_memory(), config);
//! site.set_locale(Locale::PtPt);
//! assert!(site.document().to_html().contains("Início"));
//! ```
pub mod bindings;
pub mod carousel;
pub mod config;
pub mod contact;
pub mod dictionary;
pub mod dom;
pub mod effects;
pub mod error;
pub mod events;
pub mod loader;
pub mod locale;
pub mod localization;
pub mod navigation;
pub mod reveal;
pub mod scheduler;
pub mod site;
pub mod storage;
pub mod tabs;
pub mod theme;


pub use config::SiteConfig;
pub use dictionary::{Dictionary, LocalizedMessages, SymmetryReport};
pub use dom::{Document, ElementSpec, NodeId, PageSnapshot};
pub use error::{ConfigError, LoadError, PageError, StorageError};
pub use events::Event;
pub use locale::Locale;
pub use localization::Localizer;
pub use site::Site;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Preferences, UnavailableStore};
pub use theme::Theme;
