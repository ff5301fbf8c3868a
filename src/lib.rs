//! # Starscape
//!
//! The animated front of a small IT-services landing page, as a native app:
//! a starfield that drifts toward the pointer and parallaxes with scroll, a
//! comet now and then, and an endless carousel of services.
//!
//! ## Quick Start
//!
//! ```ignore
//! use starscape::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     Scene::new()
//!         .with_config(SceneConfig::load("starscape.json")?)
//!         .with_items(["Managed Networks", "Cloud Migration", "Help Desk"])
//!         .run()
//! }
//! ```
//!
//! ## Components
//!
//! ### Starfield
//!
//! [`Starfield`] keeps four populations (fixed, scroll, drift stars and
//! comets) sized to the surface area and steps them once per frame. It
//! draws through the [`DrawingSurface`] trait, so it runs the same against
//! the GPU renderer and against a [`RecordingSurface`] in tests.
//! [`StarfieldAnimator`] ties a field to a surface and a [`FrameClock`].
//!
//! ### Carousel
//!
//! [`Carousel`] is an infinite strip built from three copies of the item
//! list. Navigation is locked while a transition runs, and the index snaps
//! back into the middle copy once it settles. [`CardLayout`] turns the index
//! into pixel offsets for the current breakpoint.
//!
//! ### Locale and music
//!
//! [`LocaleStore`] flips between English and Thai when the secret word is
//! typed, and the Thai persona unlocks the [`Deck`].
//!
//! ### Contact
//!
//! [`contact::submit`] sends a [`ContactSubmission`] through any
//! [`Notifier`] once and reports one of two outcomes.
//!
//! ## Configuration
//!
//! Every constant lives in [`SceneConfig`], which deserialises from JSON
//! with all fields optional.
//!
//! ## Logging
//!
//! The crate logs through `tracing`. The `starscape` binary installs a
//! subscriber filtered by `RUST_LOG` (default `info`).

pub mod carousel;
pub mod config;
pub mod contact;
pub mod deck;
pub mod error;
pub mod gpu;
pub mod input;
pub mod locale;
pub mod random;
pub mod scene;
pub mod starfield;
pub mod surface;
pub mod time;

pub use bytemuck;
pub use glam::{Vec2, Vec3};

pub use carousel::{snap_index, CardLayout, Carousel, Navigation, TransitionState};
pub use config::{CarouselConfig, LocaleConfig, SceneConfig, Span, StarfieldConfig, WindowConfig};
pub use contact::{ContactSubmission, LogNotifier, Notifier, SubmissionOutcome};
pub use deck::{Deck, Playback, Track};
pub use error::{
    CarouselError, ConfigError, DeckError, GpuError, NotifyError, SceneError, StarfieldError,
};
pub use locale::{Locale, LocaleState, LocaleStore};
pub use random::{EntropyRandom, RandomSource, ScriptedRandom, SeededRandom};
pub use scene::Scene;
pub use starfield::{
    population_counts, Comet, FrameInput, PopulationCounts, Star, Starfield, StarfieldAnimator,
};
pub use surface::{ColorStop, DrawCommand, DrawingSurface, RecordingSurface};
pub use time::{FrameClock, ManualClock, Time};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use starscape::prelude::*;
/// ```
pub mod prelude {
    pub use crate::carousel::{CardLayout, Carousel, Navigation};
    pub use crate::config::{SceneConfig, StarfieldConfig};
    pub use crate::deck::{Deck, Track};
    pub use crate::error::SceneError;
    pub use crate::input::{Input, KeyCode};
    pub use crate::locale::{Locale, LocaleStore};
    pub use crate::random::{EntropyRandom, RandomSource, SeededRandom};
    pub use crate::scene::Scene;
    pub use crate::starfield::{FrameInput, Starfield, StarfieldAnimator};
    pub use crate::surface::{DrawingSurface, RecordingSurface};
    pub use crate::time::{FrameClock, ManualClock, Time};
    pub use crate::{Vec2, Vec3};
}
