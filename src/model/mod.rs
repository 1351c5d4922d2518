//! Core data model for flashcard decks.
//!
//! This module contains:
//! - Cards with rich front/back fragments and tags
//! - Subdecks and the single top-level deck they belong to
//! - Media references embedded by cards

mod card;
mod deck;
mod media;

pub use card::Card;
pub use deck::{Deck, Subdeck};
pub use media::{BundledMedia, MediaReference, MediaStatus};
