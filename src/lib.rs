//! Async client SDK for the Poster social platform API.
//!
//! Provides typed access to the Poster REST endpoints, bearer-token
//! authentication, an in-memory TTL cache for read-mostly lookups, and a
//! realtime event channel for chat and notification events.
//!
//! # Example
//!
//! ```no_run
//! use poster_client::{PosterClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = PosterClient::builder()
//!     .base_url("https://api.poster-social.com")
//!     .build()?;
//!
//! // Log in and attach the session token to subsequent requests
//! let login = client
//!     .users()
//!     .login(&poster_client::LoginRequest {
//!         username_or_email: "alice".into(),
//!         password: "secret".into(),
//!     })
//!     .await?;
//! client.set_auth_token(login.token);
//!
//! // Profile lookups are served from the cache while their TTL is live
//! let profile = client.users().profile("bob").await?;
//! println!("{}", profile.user.username);
//!
//! // Subscribe to incoming chat messages
//! use poster_client::realtime::EventKind;
//! let channel = client.realtime().await?;
//! let mut messages = channel.subscribe(EventKind::NewMessage);
//! while let Some(payload) = messages.recv().await {
//!     println!("new message: {payload}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod realtime;
pub mod types;

pub use client::{ClientBuilder, PosterClient};
pub use error::{Error, Result};
pub use types::*;
