//! Navigation-based redirection contract
//!
//! The application inspects the current path on load: anything that is not a
//! known page or a static asset is treated as a shortcode candidate and run
//! through the lookup -> expiry check -> track -> redirect sequence.

use tracing::{debug, warn};

use crate::model::{ClickMetadata, Lookup};
use crate::store::UrlStore;
use crate::validate::{CODE_MAX_LEN, CODE_MIN_LEN};

/// Route names that must never be interpreted as shortcodes
pub const RESERVED_ROUTES: &[&str] = &["statistics"];

/// Classification of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// The root path ("/")
    Dashboard,
    /// A reserved application page ("/statistics")
    Page(String),
    /// A static asset path (contains a dot, e.g. "/favicon.ico")
    Asset(String),
    /// A plausible shortcode worth looking up
    Candidate(String),
    /// Anything else (wrong length, non-alphanumeric, nested path)
    Unroutable(String),
}

/// Outcome of resolving a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Redirect the client to the mapped destination; the click was tracked
    Redirect { destination: String },
    /// The shortcode exists but has expired
    Expired,
    /// No mapping under this shortcode
    NotFound,
    /// The path belongs to the application itself, not a shortcode
    Page,
}

/// Classifies a raw request path.
///
/// Reserved route names and asset paths are excluded before any store
/// lookup happens, so application pages can never shadow (or be shadowed
/// by) a mapping.
pub fn classify_path(path: &str) -> RouteAction {
    let segment = path.trim_start_matches('/');

    if segment.is_empty() {
        return RouteAction::Dashboard;
    }
    if RESERVED_ROUTES.contains(&segment) {
        return RouteAction::Page(segment.to_string());
    }
    if segment.contains('.') {
        return RouteAction::Asset(segment.to_string());
    }

    let plausible = segment.len() >= CODE_MIN_LEN
        && segment.len() <= CODE_MAX_LEN
        && segment.chars().all(|c| c.is_ascii_alphanumeric());

    if plausible {
        RouteAction::Candidate(segment.to_string())
    } else {
        RouteAction::Unroutable(segment.to_string())
    }
}

/// Resolves one navigation against the store.
///
/// For shortcode candidates this performs the full redirect sequence: the
/// click is tracked (with the supplied metadata) before the destination is
/// handed back, exactly once per successful resolution. Expired and unknown
/// codes drive their own presentation states and never track.
pub fn navigate(store: &mut UrlStore, path: &str, metadata: ClickMetadata) -> Navigation {
    let shortcode = match classify_path(path) {
        RouteAction::Candidate(code) => code,
        RouteAction::Dashboard | RouteAction::Page(_) | RouteAction::Asset(_) => {
            return Navigation::Page;
        }
        RouteAction::Unroutable(segment) => {
            debug!(%segment, "path is not a shortcode");
            return Navigation::NotFound;
        }
    };

    match store.get(&shortcode) {
        Lookup::Active(record) => {
            store.track_click(&shortcode, metadata);
            Navigation::Redirect {
                destination: record.original_url,
            }
        }
        Lookup::Expired(_) => Navigation::Expired,
        Lookup::NotFound => {
            warn!(%shortcode, "URL not found");
            Navigation::NotFound
        }
    }
}
