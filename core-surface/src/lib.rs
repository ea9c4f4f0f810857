//! # Content Surface Manager
//!
//! Owns the embedded renderer that displays the remote game:
//!
//! - [`RendererHandle`]: exclusive ownership of one renderer instance with a
//!   single, ordered release sequence
//! - [`NavigationPolicy`]: the allowlist deciding where navigations may go
//! - [`ContentSurface`]: configuration, page lifecycle hooks, the injected
//!   page script and the local fallback page

pub mod error;
pub mod handle;
pub mod page;
pub mod policy;
pub mod settings;
pub mod surface;

pub use error::{Result, SurfaceError};
pub use handle::RendererHandle;
pub use policy::{NavigationDecision, NavigationPolicy};
pub use surface::{ContentSurface, SurfaceContext, SurfaceState};
