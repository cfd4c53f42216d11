//! HTTP clients for the proxy server: remote store and chat provider.

pub mod provider;
pub mod remote;

pub use provider::ProxyChatProvider;
pub use remote::HttpRemoteStore;

/// Join a base URL and an absolute path without doubling the slash.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
