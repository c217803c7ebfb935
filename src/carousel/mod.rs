//! Per-card image carousel.
//!
//! A carousel is a ring of `len` positions with one current index. Raw UI
//! inputs (clicks, touch, keys) are fed through [`Carousel::handle`], which
//! turns them into at most one transition and reports what happened.

use serde::Serialize;

/// Minimum horizontal drag, in pixels, that a swipe has to exceed.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Image,
    NextControl,
    PrevControl,
    Dot(usize),
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl NavKey {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "left" | "arrowleft" => Self::ArrowLeft,
            "right" | "arrowright" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CarouselInput {
    Click(ClickTarget),
    TouchStart { x: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd { x: f32 },
    TouchCancel,
    Key(NavKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InputEffect {
    Moved { from: usize, to: usize },
    /// A swipe is in progress; the host should suppress scrolling.
    GestureClaimed,
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Swipe {
    start_x: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Carousel {
    len: usize,
    index: usize,
    threshold: f32,
    swipe: Option<Swipe>,
}

impl Carousel {
    /// Returns `None` for fewer than two images; those cards stay static.
    pub fn new(len: usize) -> Option<Self> {
        Self::with_threshold(len, DEFAULT_SWIPE_THRESHOLD)
    }

    pub fn with_threshold(len: usize, threshold: f32) -> Option<Self> {
        if len < 2 {
            return None;
        }
        Some(Self {
            len,
            index: 0,
            threshold,
            swipe: None,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_swiping(&self) -> bool {
        self.swipe.is_some()
    }

    pub fn next(&mut self) -> InputEffect {
        self.show((self.index + 1) % self.len)
    }

    pub fn prev(&mut self) -> InputEffect {
        self.show((self.index + self.len - 1) % self.len)
    }

    /// Jumps straight to `index`; out of range positions are ignored.
    pub fn jump(&mut self, index: usize) -> InputEffect {
        if index >= self.len {
            return InputEffect::Ignored;
        }
        self.show(index)
    }

    fn show(&mut self, to: usize) -> InputEffect {
        let from = self.index;
        self.index = to;
        InputEffect::Moved { from, to }
    }

    pub fn handle(&mut self, input: CarouselInput) -> InputEffect {
        match input {
            // Nav controls consume their click, so it never reaches the image.
            CarouselInput::Click(ClickTarget::NextControl) => self.next(),
            CarouselInput::Click(ClickTarget::PrevControl) => self.prev(),
            CarouselInput::Click(ClickTarget::Image) => self.next(),
            CarouselInput::Click(ClickTarget::Dot(i)) => self.jump(i),
            CarouselInput::Click(ClickTarget::Other) => InputEffect::Ignored,
            CarouselInput::TouchStart { x } => {
                self.swipe = Some(Swipe { start_x: x });
                InputEffect::GestureClaimed
            }
            CarouselInput::TouchMove { .. } => {
                if self.swipe.is_some() {
                    InputEffect::GestureClaimed
                } else {
                    InputEffect::Ignored
                }
            }
            CarouselInput::TouchEnd { x } => {
                let Some(swipe) = self.swipe.take() else {
                    return InputEffect::Ignored;
                };
                let diff = swipe.start_x - x;
                if diff.abs() <= self.threshold {
                    return InputEffect::Ignored;
                }
                if diff > 0.0 {
                    self.next()
                } else {
                    self.prev()
                }
            }
            CarouselInput::TouchCancel => {
                self.swipe = None;
                InputEffect::Ignored
            }
            CarouselInput::Key(NavKey::ArrowRight) => self.next(),
            CarouselInput::Key(NavKey::ArrowLeft) => self.prev(),
            CarouselInput::Key(NavKey::Other) => InputEffect::Ignored,
        }
    }

    /// One flag per position, `true` only at the current index.
    pub fn markers(&self) -> Vec<bool> {
        (0..self.len).map(|i| i == self.index).collect()
    }
}
