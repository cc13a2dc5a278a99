//! Canned stylist replies. A deterministic lookup table, not a language model.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::api_types::Product;

/// Quick questions offered when no product is in context.
pub const QUICK_QUESTIONS: [&str; 6] = [
    "Tell me more about the diamond ring",
    "What's trending this season?",
    "Help me choose between pieces",
    "Care instructions for jewelry",
    "Sizing guide for rings",
    "Custom design options",
];

pub const GREETING: &str = "Hello! I'm your personal jewelry stylist. I'd love to help you find the perfect piece. What questions do you have about the recommendations?";

/// Reply used when the backend cannot answer a free-text question.
pub const FALLBACK_REPLY: &str = "Thank you for your question! Based on your preferences, I'd recommend exploring our curated collection that matches your style and budget. Each piece is selected to complement your sophisticated taste.";

const DIAMOND_RING_REPLY: &str = "The Classic Diamond Solitaire Ring features a brilliant cut diamond that maximizes sparkle and light reflection. Given your preference for classic style, this timeless piece would complement any outfit and can transition beautifully from day to evening wear.";
const TRENDING_REPLY: &str = "This season, we're seeing a rise in minimalist designs, stackable rings, and vintage-inspired pieces. Layered necklaces and mixed metal combinations are also very popular right now.";
const CHOOSE_REPLY: &str = "I'd be happy to help you compare pieces! Could you tell me more about the specific items you're considering and what occasions you'll be wearing them for?";
const CARE_REPLY: &str = "For most fine jewelry: Clean with mild soap and warm water, store separately to avoid scratches, and have pieces professionally cleaned every 6 months. Avoid exposure to chemicals and remove before swimming or exercising.";
const SIZING_REPLY: &str = "For rings, measure your finger at the end of the day when it's slightly swollen. The ring should slide on easily but require slight pressure to remove. I can help you with a detailed sizing guide!";
const CUSTOM_REPLY: &str = "That's a great question! I'd love to help you explore custom design options. We can create unique pieces tailored to your style preferences and budget.";

/// Equivalent greetings when a product is in context; `{name}` and `{price}` are filled in.
const PRODUCT_GREETINGS: [&str; 3] = [
    "Great choice! The {name} ({price}) is one of our most loved pieces. What would you like to know about it?",
    "I see you're drawn to the {name}, priced at {price}. Ask me anything about styling, care, or sizing.",
    "The {name} is a stunning pick at {price}. How can I help you decide?",
];

fn fill(template: &str, product: &Product) -> String {
    template
        .replace("{name}", &product.name)
        .replace("{price}", &product.price_inr())
}

/// Opening assistant message for a chat session.
pub fn greeting<R: Rng + ?Sized>(product: Option<&Product>, rng: &mut R) -> String {
    match product {
        Some(product) => {
            let template = PRODUCT_GREETINGS
                .choose(rng)
                .copied()
                .unwrap_or(PRODUCT_GREETINGS[0]);
            fill(template, product)
        }
        None => GREETING.to_string(),
    }
}

/// Quick questions shown for the current context.
pub fn quick_questions(product: Option<&Product>) -> Vec<String> {
    let mut questions: Vec<String> = QUICK_QUESTIONS.iter().map(|q| q.to_string()).collect();
    if let Some(product) = product {
        questions[0] = format!("Tell me more about the {}", product.name);
    }
    questions
}

/// Scripted answer for `question`, matched by substring.
pub fn scripted_reply(question: &str, product: Option<&Product>) -> String {
    let question = question.to_lowercase();

    if let Some(product) = product {
        let about_product = question.contains(&product.name.to_lowercase())
            || question.contains("this piece")
            || question.contains("tell me more");
        if about_product && !question.contains("diamond ring") {
            return format!(
                "The {} is {} At {}, {} Would you like styling tips or care advice for it?",
                product.name,
                sentence(product.description_or_default()),
                product.price_inr(),
                "it's a piece you'll reach for again and again."
            );
        }
        if question.contains("price") || question.contains("cost") {
            return format!(
                "The {} is priced at {} ({}).",
                product.name,
                product.price_inr(),
                product.price_usd()
            );
        }
    }

    let reply = if question.contains("diamond ring") {
        DIAMOND_RING_REPLY
    } else if question.contains("trending") {
        TRENDING_REPLY
    } else if question.contains("choose between") {
        CHOOSE_REPLY
    } else if question.contains("care instructions") {
        CARE_REPLY
    } else if question.contains("sizing") {
        SIZING_REPLY
    } else {
        CUSTOM_REPLY
    };
    reply.to_string()
}

/// Lower-case the first letter and make sure the text ends with a full stop.
fn sentence(text: &str) -> String {
    let text = text.trim();
    let mut chars = text.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn locket() -> Product {
        Product {
            id: "p5".to_string(),
            name: "Vintage Heart Locket".to_string(),
            price: 260.0,
            image_url: "http://img/locket".to_string(),
            description: Some("Engraved locket with nostalgic charm.".to_string()),
            style_tags: vec!["vintage".to_string()],
            occasion_tags: vec!["date night".to_string()],
        }
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(scripted_reply(QUICK_QUESTIONS[0], None), DIAMOND_RING_REPLY);
        assert_eq!(scripted_reply(QUICK_QUESTIONS[1], None), TRENDING_REPLY);
        assert_eq!(scripted_reply(QUICK_QUESTIONS[2], None), CHOOSE_REPLY);
        assert_eq!(scripted_reply(QUICK_QUESTIONS[3], None), CARE_REPLY);
        assert_eq!(scripted_reply(QUICK_QUESTIONS[4], None), SIZING_REPLY);
        assert_eq!(scripted_reply(QUICK_QUESTIONS[5], None), CUSTOM_REPLY);
    }

    #[test]
    fn test_unmatched_question_falls_back_to_custom_reply() {
        assert_eq!(scripted_reply("do you ship to Pune?", None), CUSTOM_REPLY);
    }

    #[test]
    fn test_product_reply_interpolates_name_and_inr_price() {
        let product = locket();
        let questions = quick_questions(Some(&product));
        assert_eq!(questions[0], "Tell me more about the Vintage Heart Locket");

        let reply = scripted_reply(&questions[0], Some(&product));
        assert!(reply.contains("Vintage Heart Locket"));
        assert!(reply.contains("₹21,580"));
        assert!(reply.contains("engraved locket with nostalgic charm."));
    }

    #[test]
    fn test_price_question_with_product() {
        let product = locket();
        let reply = scripted_reply("How much does it cost?", Some(&product));
        assert_eq!(reply, "The Vintage Heart Locket is priced at ₹21,580 ($260.00).");
    }

    #[test]
    fn test_scripted_reply_is_deterministic() {
        let product = locket();
        let a = scripted_reply("Care instructions for jewelry", Some(&product));
        let b = scripted_reply("Care instructions for jewelry", Some(&product));
        assert_eq!(a, b);
        assert_eq!(a, CARE_REPLY);
    }

    #[test]
    fn test_greeting_picks_from_fixed_phrasings() {
        let product = locket();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let text = greeting(Some(&product), &mut rng);
            assert!(PRODUCT_GREETINGS.iter().any(|t| fill(t, &product) == text));
        }
        assert_eq!(greeting(None, &mut rng), GREETING);
    }

    #[test]
    fn test_sentence_normalizes_case_and_punctuation() {
        assert_eq!(sentence("Sleek gold bar"), "sleek gold bar.");
        assert_eq!(sentence("Turns heads!"), "turns heads!");
    }
}
