//! Horizontal placement of carousel cards.

use super::Carousel;

/// Card geometry for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub card_width: f32,
    pub card_gap: f32,
    pub viewport_width: f32,
}

impl CardLayout {
    pub fn new(card_width: f32, card_gap: f32, viewport_width: f32) -> Self {
        Self {
            card_width,
            card_gap,
            viewport_width,
        }
    }

    /// Breakpoint presets: phones, tablets, desktops.
    pub fn for_viewport(viewport_width: f32) -> Self {
        let (card_width, card_gap) = if viewport_width < 640.0 {
            (280.0, 16.0)
        } else if viewport_width < 1024.0 {
            (320.0, 24.0)
        } else {
            (380.0, 32.0)
        };
        Self::new(card_width, card_gap, viewport_width)
    }

    /// Preset for a window `physical_width` pixels wide at `scale_factor`.
    ///
    /// Breakpoints apply to the logical width; the returned geometry is in
    /// physical pixels.
    pub fn for_display(physical_width: f32, scale_factor: f32) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let preset = Self::for_viewport(physical_width / scale);
        Self::new(preset.card_width * scale, preset.card_gap * scale, physical_width)
    }

    /// Distance between the left edges of neighbouring cards.
    #[inline]
    pub fn stride(&self) -> f32 {
        self.card_width + self.card_gap
    }

    /// Strip translation that centres card `current_index` in the viewport.
    pub fn offset(&self, current_index: usize) -> f32 {
        self.viewport_width / 2.0 - self.card_width / 2.0 - current_index as f32 * self.stride()
    }

    /// Left edge of card `index` in viewport coordinates.
    pub fn card_x(&self, index: usize, current_index: usize) -> f32 {
        self.offset(current_index) + index as f32 * self.stride()
    }

    /// Extended-list index of the card under viewport coordinate `x`, if any.
    pub fn hit_test<T>(&self, carousel: &Carousel<T>, x: f32) -> Option<usize> {
        let local = x - self.offset(carousel.current_index());
        if local < 0.0 {
            return None;
        }
        let index = (local / self.stride()).floor() as usize;
        let within = local - index as f32 * self.stride();
        (index < carousel.extended_len() && within <= self.card_width).then_some(index)
    }

    /// Every card of the extended list, in order.
    pub fn cards<'a, T>(&self, carousel: &'a Carousel<T>) -> impl Iterator<Item = CardView<'a, T>> + 'a {
        let layout = *self;
        let current = carousel.current_index();
        carousel
            .extended_items()
            .enumerate()
            .map(move |(index, item)| CardView {
                index,
                item,
                active: index == current,
                x: layout.card_x(index, current),
            })
    }
}

/// One card as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardView<'a, T> {
    /// Position in the extended (tripled) list.
    pub index: usize,
    pub item: &'a T,
    /// The centred card: full opacity and scale.
    pub active: bool,
    /// Left edge in viewport coordinates.
    pub x: f32,
}
