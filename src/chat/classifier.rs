//! Ordered keyword classifier for free-text chat input.
//!
//! Groups are checked in order against the lower-cased input; the first
//! group with any matching keyword wins. No match yields the generic prompt.

use super::responses::Reply;

/// What the visitor is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Selling,
    Valuation,
    Scheduling,
    Resources,
}

struct KeywordGroup {
    intent: Intent,
    keywords: &'static [&'static str],
    reply: Reply,
}

const GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        intent: Intent::Selling,
        keywords: &["exit", "sell", "selling"],
        reply: Reply {
            text: "Selling your business is a significant decision. Our approach focuses on maximizing value through competitive tension and finding the right strategic fit. Would you like to learn more about our exit process?",
            options: &[
                ("Exit process", "exit-strategies"),
                ("Schedule a call", "schedule"),
            ],
            effect: None,
        },
    },
    KeywordGroup {
        intent: Intent::Valuation,
        keywords: &["value", "worth", "price"],
        reply: Reply {
            text: "Valuation in the building products industry depends on multiple factors including growth rate, profitability, customer concentration, and market position. Would you like to discuss your specific situation?",
            options: &[
                ("Schedule valuation call", "schedule"),
                ("Learn about value drivers", "value-drivers"),
            ],
            effect: None,
        },
    },
    KeywordGroup {
        intent: Intent::Scheduling,
        keywords: &["schedule", "call", "talk"],
        reply: Reply {
            text: "I'd be happy to help you schedule a call with one of our M&A advisors. Our calls are confidential and focused on understanding your specific situation.",
            options: &[("Schedule now", "calendar-link")],
            effect: None,
        },
    },
    KeywordGroup {
        intent: Intent::Resources,
        keywords: &["download", "guide", "resource"],
        reply: Reply {
            text: "We have several resources available for founders considering an exit. Our most popular is the Founder's Exit Playbook, a comprehensive guide to the M&A process.",
            options: &[("Download Playbook", "download-guide")],
            effect: None,
        },
    },
];

/// Reply when no keyword group matches.
pub static GENERIC_PROMPT: Reply = Reply {
    text: "Thanks for your message. To better assist you, could you let me know what specific aspect of M&A or exit planning you're interested in?",
    options: &[
        ("Exit strategies", "exit-strategies"),
        ("Valuation", "valuation"),
        ("Talk to an advisor", "schedule"),
    ],
    effect: None,
};

fn matching_group(text: &str) -> Option<&'static KeywordGroup> {
    let lower = text.to_lowercase();
    GROUPS
        .iter()
        .find(|group| group.keywords.iter().any(|kw| lower.contains(*kw)))
}

/// Classify free text. `None` means no keyword group matched.
pub fn classify(text: &str) -> Option<Intent> {
    matching_group(text).map(|group| group.intent)
}

/// The canned reply for free text, falling back to the generic prompt.
pub fn reply_for(text: &str) -> &'static Reply {
    matching_group(text)
        .map(|group| &group.reply)
        .unwrap_or(&GENERIC_PROMPT)
}
