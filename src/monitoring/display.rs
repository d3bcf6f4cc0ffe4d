/*!
 * Display State
 * Memory cards and status pushed to a display surface every tick
 */

use crate::core::limits::{
    CARD_CRITICAL_FRACTION, CARD_WARNING_FRACTION, SYSTEM_CARD_RATIO,
    VIRTUAL_FALLBACK_MULTIPLIER, WORKING_SET_CARD_RATIO,
};
use crate::core::types::to_gb;
use crate::memory::MemorySnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// The four card categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Physical,
    Virtual,
    System,
    WorkingSet,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [
        CardKind::Physical,
        CardKind::Virtual,
        CardKind::System,
        CardKind::WorkingSet,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            CardKind::Physical => "Physical",
            CardKind::Virtual => "Virtual",
            CardKind::System => "System WS",
            CardKind::WorkingSet => "Process WS",
        }
    }
}

/// Colour band of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardLevel {
    Normal,
    Warning,
    Critical,
}

impl CardLevel {
    /// Level for a usage fraction in 0.0..=1.0
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < CARD_WARNING_FRACTION {
            CardLevel::Normal
        } else if fraction < CARD_CRITICAL_FRACTION {
            CardLevel::Warning
        } else {
            CardLevel::Critical
        }
    }
}

/// One card: `(used_gb, total_gb, percent)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub kind: CardKind,
    pub used_gb: f64,
    pub total_gb: f64,
    pub percent: f64,
}

impl MemoryCard {
    fn new(kind: CardKind, used_bytes: f64, total_bytes: f64, percent: f64) -> Self {
        Self {
            kind,
            used_gb: to_gb(used_bytes),
            total_gb: to_gb(total_bytes),
            percent,
        }
    }

    pub fn level(&self) -> CardLevel {
        CardLevel::from_fraction(self.percent / 100.0)
    }
}

impl fmt::Display for MemoryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.1} GB / {:.1} GB ({:.1}%)",
            self.kind.title(),
            self.used_gb,
            self.total_gb,
            self.percent
        )
    }
}

/// Cards for a snapshot, in [`CardKind::ALL`] order
///
/// The system and working-set cards are fixed shares of physical usage; the
/// virtual card falls back to twice the physical total when no swap exists.
pub fn cards_from(snapshot: &MemorySnapshot) -> [MemoryCard; 4] {
    let physical = snapshot.physical;
    let swap = snapshot.swap;
    let swap_total = if swap.total > 0 {
        swap.total
    } else {
        physical.total.saturating_mul(VIRTUAL_FALLBACK_MULTIPLIER)
    };

    [
        MemoryCard::new(
            CardKind::Physical,
            physical.used as f64,
            physical.total as f64,
            physical.percent,
        ),
        MemoryCard::new(CardKind::Virtual, swap.used as f64, swap_total as f64, swap.percent),
        MemoryCard::new(
            CardKind::System,
            physical.used as f64 * SYSTEM_CARD_RATIO,
            physical.total as f64,
            physical.percent * SYSTEM_CARD_RATIO,
        ),
        MemoryCard::new(
            CardKind::WorkingSet,
            physical.used as f64 * WORKING_SET_CARD_RATIO,
            physical.total as f64,
            physical.percent * WORKING_SET_CARD_RATIO,
        ),
    ]
}

/// What the tool is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Monitoring,
    Cleaning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Monitoring => write!(f, "● Monitoring"),
            Status::Cleaning => write!(f, "● Cleaning..."),
            Status::Error => write!(f, "● Error"),
        }
    }
}

/// Everything a display surface renders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayState {
    pub cards: Option<[MemoryCard; 4]>,
    pub status: Status,
    pub elevated: bool,
}

impl DisplayState {
    pub fn new(elevated: bool) -> Self {
        Self {
            cards: None,
            status: Status::Monitoring,
            elevated,
        }
    }

    pub fn update_cards(&mut self, snapshot: &MemorySnapshot) {
        self.cards = Some(cards_from(snapshot));
    }

    pub fn card(&self, kind: CardKind) -> Option<&MemoryCard> {
        self.cards.as_ref()?.iter().find(|card| card.kind == kind)
    }
}

/// Rendering surface for [`DisplayState`]
pub trait DisplaySurface: Send {
    fn render(&mut self, state: &DisplayState);
}

/// One status line per render on stdout
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplaySurface for ConsoleDisplay {
    fn render(&mut self, state: &DisplayState) {
        let Some(cards) = state.cards.as_ref() else {
            return;
        };
        let line = cards
            .iter()
            .map(|card| card.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{} {}", state.status, line);
    }
}
