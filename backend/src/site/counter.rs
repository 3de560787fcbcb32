//! The "TOTAL COLLECTED" banner.
//!
//! Starts from a seed total and follows `total_collected` messages from
//! `/ws/all`. The shown amount never goes down.

use serde::Deserialize;
use tracing::debug;

use crate::utils::{format_usd, Money};
use crate::websocket::{TotalCollectedData, WsEventType};

/// Total shown before the first update arrives.
pub const DEFAULT_SEED_TOTAL: Money = Money::from_units(2_908_323_356);

#[derive(Deserialize)]
struct Envelope {
    event: WsEventType,
    data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveCounter {
    total: Money,
}

impl Default for LiveCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_TOTAL)
    }
}

impl LiveCounter {
    pub fn new(seed: Money) -> Self {
        Self { total: seed }
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Apply a new total. Returns whether the display changed.
    pub fn apply(&mut self, total: Money) -> bool {
        if total > self.total {
            self.total = total;
            true
        } else {
            false
        }
    }

    /// Apply a raw WebSocket message. Other events are ignored.
    pub fn apply_message(&mut self, text: &str) -> bool {
        let Ok(envelope) = serde_json::from_str::<Envelope>(text) else {
            debug!("Ignoring unreadable live message");
            return false;
        };
        if envelope.event != WsEventType::TotalCollected {
            return false;
        }
        match serde_json::from_value::<TotalCollectedData>(envelope.data) {
            Ok(data) => self.apply(data.total_collected),
            Err(e) => {
                debug!("Ignoring malformed total_collected: {}", e);
                false
            }
        }
    }

    /// e.g. "$2,908,323,356".
    pub fn display(&self) -> String {
        format_usd(self.total)
    }

    pub fn banner(&self) -> String {
        format!("TOTAL COLLECTED: {}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::WsMessage;

    #[test]
    fn test_default_banner() {
        let counter = LiveCounter::default();
        assert_eq!(counter.display(), "$2,908,323,356");
        assert_eq!(counter.banner(), "TOTAL COLLECTED: $2,908,323,356");
    }

    #[test]
    fn test_never_decreases() {
        let mut counter = LiveCounter::new(Money::from_units(1_000));
        assert!(!counter.apply(Money::from_units(900)));
        assert_eq!(counter.total(), Money::from_units(1_000));
        assert!(counter.apply(Money::from_units(1_050)));
        assert_eq!(counter.display(), "$1,050");
    }

    #[test]
    fn test_apply_message() {
        let mut counter = LiveCounter::new(Money::ZERO);
        let message = WsMessage::new(
            WsEventType::TotalCollected,
            TotalCollectedData {
                total_collected: Money::from_units(12_345),
                formatted_total: "$12,345".into(),
                donation_count: 3,
            },
        )
        .to_json()
        .unwrap();

        assert!(counter.apply_message(&message));
        assert_eq!(counter.display(), "$12,345");

        let ping = WsMessage::new(WsEventType::Ping, "hi").to_json().unwrap();
        assert!(!counter.apply_message(&ping));
        assert!(!counter.apply_message("not json"));
    }
}
