//! Verificar: Rust-native browser and API test automation.
//!
//! Verificar (Spanish: "to verify") drives browser end-to-end journeys
//! through page objects and a tiered explicit-wait discipline, plus a
//! traced HTTP client for the API side of the same suites.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   VERIFICAR Architecture                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌────────┐  │
//! │  │ Suite    │   │ Page      │   │ DomBackend │   │ Chrome │  │
//! │  │ Harness  │──►│ Objects   │──►│ (trait)    │──►│ (CDP)  │  │
//! │  │          │   │ + Waits   │   │            │   │        │  │
//! │  └──────────┘   └───────────┘   └────────────┘   └────────┘  │
//! │       │                               │                      │
//! │       ▼                               ▼                      │
//! │  ┌──────────┐                   ┌────────────┐               │
//! │  │ Token    │                   │ FakeDom    │               │
//! │  │ Broker   │                   │ (in-mem)   │               │
//! │  └──────────┘                   └────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Without the `browser` feature every session runs over the in-memory
//! [`FakeDom`], so suites and their unit tests need no chromium install.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod auth;
pub mod backend;
pub mod capabilities;
pub mod config;
pub mod harness;
pub mod http;
pub mod locator;
pub mod logging;
pub mod page;
pub mod page_object;
pub mod pages;
pub mod result;
pub mod session;
pub mod wait;

pub use auth::{ClientCredentials, TokenBroker, TOKEN_ENDPOINT};
pub use backend::{
    DomBackend, ElementHandle, ElementId, ElementSnapshot, FakeAction, FakeDom, FakeElement,
};
pub use capabilities::{BrowserFamily, CapabilityDescriptor};
pub use config::{ConfigResolver, DEFAULT_ENVIRONMENT, ENV_SELECTOR};
pub use harness::{Harness, SuiteParams, SuiteResults, TestResult};
pub use http::{TracedClient, TracedResponse};
pub use locator::{DomQuery, Locator, LocatorKind, LocatorTemplate};
pub use page::Page;
pub use page_object::{PageObject, UrlMatcher};
pub use pages::{extract_auth_code, HomePage, LoginPage};
pub use result::{VerificarError, VerificarResult};
pub use session::{DriverRegistry, SessionHandle};
pub use wait::{pause, wait_until, WaitPolicy};
