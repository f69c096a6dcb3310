//! Network safety checks run before any page is fetched
//!
//! - `SsrfGuard`: refuses URLs that point at non-public infrastructure
//! - `ConnectivityProber`: classifies why a URL is unreachable

mod connectivity;
mod ssrf;

pub use connectivity::{status_label, ConnectivityError, ConnectivityProber};
pub use ssrf::{is_globally_routable, GuardError, SsrfGuard};
