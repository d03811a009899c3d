//! Scripted response table for the advisory chat assistant.

use super::model::{ChatOption, Message};

/// Side effect a branch performs beyond appending its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Open the scheduling page in a new tab.
    OpenScheduler,
}

/// A canned assistant reply.
#[derive(Debug)]
pub struct Reply {
    pub text: &'static str,
    /// `(label, action)` pairs offered under the reply.
    pub options: &'static [(&'static str, &'static str)],
    pub effect: Option<SideEffect>,
}

impl Reply {
    const fn new(text: &'static str, options: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            text,
            options,
            effect: None,
        }
    }

    pub fn to_message(&self) -> Message {
        Message::assistant(
            self.text,
            self.options
                .iter()
                .map(|(label, action)| ChatOption::new(label, action))
                .collect(),
        )
    }
}

/// First message of every conversation.
pub const GREETING: Reply = Reply::new(
    "👋 Hi there! I'm your M&A advisor assistant. How can I help you today?",
    &[
        ("Learn about exit strategies", "exit-strategies"),
        ("Valuation questions", "valuation"),
        ("Schedule a call", "schedule"),
        ("Download resources", "resources"),
    ],
);

/// Reply for an action key with no table entry.
pub const UNRECOGNIZED: Reply = Reply::new(
    "I'm not sure I understand. Could you rephrase your question?",
    &[
        ("Exit strategies", "exit-strategies"),
        ("Valuation", "valuation"),
        ("Schedule a call", "schedule"),
    ],
);

/// Action key whose branch opens the scheduling page.
pub const OPEN_SCHEDULER_ACTION: &str = "open-calendly";

const RESPONSES: &[(&str, Reply)] = &[
    (
        "exit-strategies",
        Reply::new(
            "Exit strategies are plans for founders to transition out of their business. The main types include:\n\n\
             • Strategic sale to a competitor\n\
             • Private equity recapitalization\n\
             • Management buyout\n\
             • Family succession\n\n\
             Would you like to learn more about a specific strategy?",
            &[
                ("Strategic sale", "strategic-sale"),
                ("Private equity", "private-equity"),
                ("Download exit guide", "download-guide"),
            ],
        ),
    ),
    (
        "valuation",
        Reply::new(
            "Business valuation in the building products industry typically ranges from 4-8x EBITDA, depending on several factors:\n\n\
             • Growth rate and market position\n\
             • Customer concentration\n\
             • Recurring revenue streams\n\
             • Management depth\n\
             • Operational efficiency\n\n\
             Would you like to discuss your specific situation with an advisor?",
            &[
                ("Schedule a valuation call", "schedule"),
                ("Learn about value drivers", "value-drivers"),
            ],
        ),
    ),
    (
        "schedule",
        Reply::new(
            "Great! Our M&A advisors are available for confidential strategy calls to discuss your specific situation. You can schedule directly using our calendar.",
            &[
                ("Schedule now", "calendar-link"),
                ("Learn more first", "learn-more"),
            ],
        ),
    ),
    (
        "resources",
        Reply::new(
            "We have several resources available for founders considering an exit:\n\n\
             • The Founder's Exit Playbook (25-page guide)\n\
             • Value Driver Assessment Tool\n\
             • M&A Process Timeline\n\
             • Due Diligence Checklist\n\n\
             Which would you like to access?",
            &[
                ("Exit Playbook", "download-guide"),
                ("Due Diligence Checklist", "due-diligence"),
            ],
        ),
    ),
    (
        "download-guide",
        Reply::new(
            "You can download our comprehensive Founder's Exit Playbook by clicking the button below. It includes strategies for maximizing your valuation, timing your exit, and navigating the M&A process.",
            &[
                ("Download Playbook", "playbook-link"),
                ("Talk to an advisor", "schedule"),
            ],
        ),
    ),
    (
        "calendar-link",
        Reply::new(
            "You can schedule a call with one of our M&A advisors using the link below. The call is completely confidential and there's no obligation.",
            &[("Open Calendly", OPEN_SCHEDULER_ACTION)],
        ),
    ),
    (
        "playbook-link",
        Reply::new(
            "Great! You can download the Exit Playbook now. Would you like to discuss any specific aspects of your exit strategy with an advisor?",
            &[("Schedule a call", "schedule"), ("No thanks", "thanks")],
        ),
    ),
    (
        OPEN_SCHEDULER_ACTION,
        Reply {
            text: "I've opened our scheduling page in a new tab. If you have any questions before your call, feel free to ask!",
            options: &[],
            effect: Some(SideEffect::OpenScheduler),
        },
    ),
    (
        "thanks",
        Reply::new(
            "You're welcome! If you have any other questions in the future, I'm here to help. Good luck with your exit planning!",
            &[],
        ),
    ),
];

/// Look up the reply for an action key.
pub fn lookup(action: &str) -> Option<&'static Reply> {
    RESPONSES
        .iter()
        .find(|(key, _)| *key == action)
        .map(|(_, reply)| reply)
}

/// Every action key with a table entry.
pub fn known_actions() -> impl Iterator<Item = &'static str> {
    RESPONSES.iter().map(|(key, _)| *key)
}
