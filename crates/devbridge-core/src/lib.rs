#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! Dev-server asset resolution for host applications.
//!
//! A host application addresses its assets by production build output:
//! hashed file names under a build directory, mounted below a base path.
//! While a bundler dev server is running, those same assets should be
//! served unbundled, straight from their sources. This crate decides which
//! of the two worlds applies and translates between them:
//!
//! - [`DevServerClient`] probes the dev server once at setup time: a config
//!   probe that fetches the [`ResolverConfig`], then a client probe that
//!   confirms the bundler is actually serving. Dev mode is active only when
//!   both succeed; an offline server is the normal production state, never
//!   an error.
//! - [`AssetResolver`] rewrites build-output URLs to their dev-server
//!   source URLs, consulting the build manifest when one is attached and
//!   falling back to filesystem probing otherwise. Each asset id resolves
//!   at most once per process; the first result is cached for the life of
//!   the resolver.
//!
//! The host wires the rewrite functions into its own dispatch mechanism
//! after [`DevServerClient::activate`] reports dev mode; that adapter layer
//! is out of scope here.
//!
//! ```no_run
//! # fn main() -> Result<(), devbridge_core::Error> {
//! use devbridge_core::{AssetResolver, DevServerClient};
//!
//! let mut client = DevServerClient::new("http://localhost")?;
//! if client.activate() {
//!     if let Some(mut resolver) = AssetResolver::from_server(&client, "/var/www")? {
//!         let _url = resolver.rewrite_asset_url("/app/dist/js/main.abc123.js", "app-main");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod resolve;
pub mod server;

pub use config::ResolverConfig;
pub use error::Error;
pub use paths::relative_local_path;
pub use resolve::{append_dev_marker, AssetResolver, DEV_MODE_MARKER};
pub use server::{
    DevServerClient, ProbeResponse, CLIENT_ENTRY_PATH, CONFIG_ENDPOINT, DEFAULT_PORT,
};

pub use devbridge_manifest::{ManifestEntry, ManifestError, ManifestIndex};
