//! Card renderer and the per-card state arena.
//!
//! Every render pass resolves a [`DisplaySet`] for each matching entry and
//! builds a fresh set of cards. Carousel state lives in the card, addressed by
//! a [`CardId`] that is only valid for the pass that produced it.

use serde::Serialize;
use thiserror::Error;

use crate::carousel::{Carousel, CarouselInput, InputEffect, NavKey, DEFAULT_SWIPE_THRESHOLD};
use crate::catalog::HairstyleEntry;
use crate::filter::{Facet, FacetFilter};
use crate::probe::{DisplaySet, ImageResolver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CardId {
    pub generation: u64,
    pub slot: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("card {slot} belongs to render pass {generation}, current pass is {current}")]
    StaleCard {
        slot: usize,
        generation: u64,
        current: u64,
    },

    #[error("no card at position {slot}")]
    UnknownCard { slot: usize },
}

#[derive(Clone, Debug)]
pub struct Card {
    pub id: CardId,
    pub entry: HairstyleEntry,
    pub display: DisplaySet,
    pub carousel: Option<Carousel>,
}

impl Card {
    pub fn current_index(&self) -> usize {
        self.carousel.as_ref().map_or(0, |c| c.index())
    }

    pub fn is_navigable(&self) -> bool {
        self.carousel.is_some()
    }

    pub fn view(&self) -> CardView {
        let markers = match &self.carousel {
            Some(c) => c.markers(),
            None => (0..self.display.len()).map(|i| i == 0).collect(),
        };
        let images = self
            .display
            .images()
            .iter()
            .zip(markers.iter())
            .map(|(src, active)| ImageView {
                src: src.clone(),
                active: *active,
            })
            .collect();
        let dots = if self.is_navigable() {
            markers.clone()
        } else {
            Vec::new()
        };
        CardView {
            slot: self.id.slot,
            name: self.entry.name.clone(),
            length: self.entry.length.clone(),
            style: self.entry.style.clone(),
            description: self.entry.description.clone(),
            images,
            dots,
            has_nav: self.is_navigable(),
            fallback: self.display.is_fallback(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub src: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub slot: usize,
    pub name: String,
    pub length: String,
    pub style: String,
    pub description: String,
    pub images: Vec<ImageView>,
    pub dots: Vec<bool>,
    pub has_nav: bool,
    pub fallback: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "cards", rename_all = "snake_case")]
pub enum GalleryView {
    NoResults,
    Cards(Vec<CardView>),
}

#[derive(Debug)]
pub struct Gallery {
    entries: Vec<HairstyleEntry>,
    resolver: ImageResolver,
    filter: FacetFilter,
    swipe_threshold: f32,
    generation: u64,
    cards: Vec<Card>,
    focused: Option<CardId>,
}

impl Gallery {
    pub fn new(entries: Vec<HairstyleEntry>, resolver: ImageResolver) -> Self {
        Self {
            entries,
            resolver,
            filter: FacetFilter::default(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            generation: 0,
            cards: Vec::new(),
            focused: None,
        }
    }

    pub fn swipe_threshold(mut self, threshold: f32) -> Self {
        self.swipe_threshold = threshold;
        self
    }

    pub fn entries(&self) -> &[HairstyleEntry] {
        &self.entries
    }

    pub fn filter(&self) -> &FacetFilter {
        &self.filter
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn resolver_mut(&mut self) -> &mut ImageResolver {
        &mut self.resolver
    }

    /// Number of image candidates a render with `filter` would probe.
    pub fn candidate_count(&self, filter: &FacetFilter) -> usize {
        filter
            .apply(&self.entries)
            .iter()
            .map(|e| crate::probe::candidates(&e.images).len())
            .sum()
    }

    /// Replaces every card. State from the previous pass is dropped wholesale.
    pub async fn render(&mut self, filter: FacetFilter) -> &[Card] {
        self.filter = filter;
        self.generation += 1;
        self.focused = None;

        let matching: Vec<HairstyleEntry> =
            self.filter.apply(&self.entries).into_iter().cloned().collect();
        let mut cards = Vec::with_capacity(matching.len());
        for (slot, entry) in matching.into_iter().enumerate() {
            let display = self.resolver.resolve(&entry.images).await;
            let carousel = Carousel::with_threshold(display.len(), self.swipe_threshold);
            cards.push(Card {
                id: CardId {
                    generation: self.generation,
                    slot,
                },
                entry,
                display,
                carousel,
            });
        }
        self.cards = cards;
        &self.cards
    }

    /// A change event from one facet control: update and re-render.
    pub async fn set_facet(&mut self, facet: Facet, value: Option<&str>) -> &[Card] {
        let mut filter = self.filter.clone();
        filter.set(facet, value);
        self.render(filter).await
    }

    /// Handle for the card at `slot` in the current pass.
    pub fn card_id(&self, slot: usize) -> Result<CardId, GalleryError> {
        self.cards
            .get(slot)
            .map(|c| c.id)
            .ok_or(GalleryError::UnknownCard { slot })
    }

    fn card_mut(&mut self, id: CardId) -> Result<&mut Card, GalleryError> {
        if id.generation != self.generation {
            return Err(GalleryError::StaleCard {
                slot: id.slot,
                generation: id.generation,
                current: self.generation,
            });
        }
        self.cards
            .get_mut(id.slot)
            .ok_or(GalleryError::UnknownCard { slot: id.slot })
    }

    pub fn card(&self, id: CardId) -> Result<&Card, GalleryError> {
        if id.generation != self.generation {
            return Err(GalleryError::StaleCard {
                slot: id.slot,
                generation: id.generation,
                current: self.generation,
            });
        }
        self.cards
            .get(id.slot)
            .ok_or(GalleryError::UnknownCard { slot: id.slot })
    }

    /// Routes one input to one card. Static cards ignore everything.
    pub fn dispatch(&mut self, id: CardId, input: CarouselInput) -> Result<InputEffect, GalleryError> {
        let card = self.card_mut(id)?;
        Ok(match card.carousel.as_mut() {
            Some(c) => c.handle(input),
            None => InputEffect::Ignored,
        })
    }

    pub fn focus(&mut self, id: CardId) -> Result<(), GalleryError> {
        self.card(id)?;
        self.focused = Some(id);
        Ok(())
    }

    pub fn focused(&self) -> Option<CardId> {
        self.focused
    }

    /// Key presses only reach the focused card.
    pub fn key(&mut self, key: NavKey) -> InputEffect {
        let Some(id) = self.focused else {
            return InputEffect::Ignored;
        };
        self.dispatch(id, CarouselInput::Key(key))
            .unwrap_or(InputEffect::Ignored)
    }

    pub fn view(&self) -> GalleryView {
        if self.cards.is_empty() {
            return GalleryView::NoResults;
        }
        GalleryView::Cards(self.cards.iter().map(|c| c.view()).collect())
    }
}
