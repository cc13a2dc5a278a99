//! Attract-mode overlay shown after the welcome screen has been idle.

use serde::Serialize;

/// One celebrity moodboard slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moodboard {
    pub celebrity: &'static str,
    pub style: &'static str,
    pub description: &'static str,
    pub quote: &'static str,
    pub products: [&'static str; 2],
    pub vibe: &'static str,
}

pub const MOODBOARDS: [Moodboard; 5] = [
    Moodboard {
        celebrity: "Emma Stone",
        style: "Editorial Chic",
        description: "Emma's minimalist diamond elegance at premieres",
        quote: "Jewelry that feels effortless but makes a statement",
        products: ["Diamond Studs", "Delicate Necklaces"],
        vibe: "Sophisticated simplicity meets red carpet glamour",
    },
    Moodboard {
        celebrity: "Blake Lively",
        style: "Hollywood Glam",
        description: "Blake's vintage-inspired luxury at fashion events",
        quote: "The right jewelry transforms any outfit into magic",
        products: ["Statement Necklaces", "Vintage Rings"],
        vibe: "Old Hollywood glamour with modern sophistication",
    },
    Moodboard {
        celebrity: "Margot Robbie",
        style: "Hollywood Glam",
        description: "Margot's Chanel diamonds and luxury classics",
        quote: "Invest in jewelry pieces that will be treasured forever",
        products: ["Tennis Bracelets", "Classic Rings"],
        vibe: "Timeless luxury with contemporary confidence",
    },
    Moodboard {
        celebrity: "Zendaya",
        style: "Editorial Chic",
        description: "Zendaya's bold contemporary jewelry at galas",
        quote: "Fashion and jewelry should express who you are",
        products: ["Modern Chains", "Statement Rings"],
        vibe: "Contemporary edge meets fearless self-expression",
    },
    Moodboard {
        celebrity: "Cate Blanchett",
        style: "Editorial Chic",
        description: "Cate's architectural jewelry at film festivals",
        quote: "I gravitate toward jewelry that feels like wearable art",
        products: ["Architectural Pieces", "Avant-garde Designs"],
        vibe: "Artistic sophistication meets fearless creativity",
    },
];

/// Slide position of a raised overlay. The slideshow timer lives with the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttractOverlay {
    slide: usize,
}

impl AttractOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn current(&self) -> &'static Moodboard {
        &MOODBOARDS[self.slide % MOODBOARDS.len()]
    }

    /// Move to the next slide, wrapping after the last.
    pub fn advance(&mut self) -> &'static Moodboard {
        self.slide = (self.slide + 1) % MOODBOARDS.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_starts_on_first_slide() {
        let overlay = AttractOverlay::new();
        assert_eq!(overlay.slide(), 0);
        assert_eq!(overlay.current().celebrity, "Emma Stone");
    }

    #[test]
    fn test_advance_wraps_around() {
        let mut overlay = AttractOverlay::new();
        let seen: Vec<&str> = (0..6).map(|_| overlay.advance().celebrity).collect();
        assert_eq!(
            seen,
            vec![
                "Blake Lively",
                "Margot Robbie",
                "Zendaya",
                "Cate Blanchett",
                "Emma Stone",
                "Blake Lively"
            ]
        );
    }
}
