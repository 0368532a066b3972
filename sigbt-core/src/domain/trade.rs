//! Trade and TradeLog: completed round trips and the realized balance history.

use serde::{Deserialize, Serialize};

use super::position::Direction;

/// A closed round trip: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub direction: Direction,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_timestamp: String,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_timestamp: String,
    pub exit_price: f64,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    /// Commission frozen at entry.
    pub commission: f64,
    pub pnl: f64,
    /// Running balance immediately after this trade was realized.
    pub balance_after: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar.saturating_sub(self.entry_bar)
    }
}

/// Ordered record of realized balances: the seed balance followed by one
/// entry per closed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLog {
    seed: f64,
    trades: Vec<Trade>,
}

impl TradeLog {
    pub fn new(seed: f64) -> Self {
        Self {
            seed,
            trades: Vec::new(),
        }
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// Seed followed by the balance after each trade. Length is `trade_count() + 1`.
    pub fn balances(&self) -> Vec<f64> {
        std::iter::once(self.seed)
            .chain(self.trades.iter().map(|t| t.balance_after))
            .collect()
    }

    /// Realized PnL per trade, seed excluded.
    pub fn pnls(&self) -> Vec<f64> {
        self.trades.iter().map(|t| t.pnl).collect()
    }

    /// Balance after the last trade, or the seed if nothing closed.
    pub fn final_balance(&self) -> f64 {
        self.trades.last().map_or(self.seed, |t| t.balance_after)
    }

    /// Recompute the final balance by summing trade PnL onto the seed.
    pub fn replay_balance(&self) -> f64 {
        self.trades.iter().fold(self.seed, |acc, t| acc + t.pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(pnl: f64, balance_after: f64) -> Trade {
        Trade {
            direction: Direction::Long,
            entry_bar: 1,
            entry_timestamp: "t1".into(),
            entry_price: 100.0,
            exit_bar: 4,
            exit_timestamp: "t4".into(),
            exit_price: 100.0 + pnl / 10.0,
            quantity: 10.0,
            commission: 0.0,
            pnl,
            balance_after,
        }
    }

    #[test]
    fn winner_loser_classification() {
        assert!(sample_trade(5.0, 1005.0).is_winner());
        assert!(sample_trade(-5.0, 995.0).is_loser());
        let flat = sample_trade(0.0, 1000.0);
        assert!(!flat.is_winner() && !flat.is_loser());
    }

    #[test]
    fn bars_held() {
        assert_eq!(sample_trade(1.0, 1001.0).bars_held(), 3);
    }

    #[test]
    fn empty_log_has_seed_only() {
        let log = TradeLog::new(1000.0);
        assert_eq!(log.balances(), vec![1000.0]);
        assert!(log.pnls().is_empty());
        assert_eq!(log.final_balance(), 1000.0);
    }

    #[test]
    fn balances_follow_trades() {
        let mut log = TradeLog::new(1000.0);
        log.push(sample_trade(200.0, 1200.0));
        log.push(sample_trade(-100.0, 1100.0));
        assert_eq!(log.balances(), vec![1000.0, 1200.0, 1100.0]);
        assert_eq!(log.pnls(), vec![200.0, -100.0]);
        assert_eq!(log.final_balance(), 1100.0);
        assert_eq!(log.replay_balance(), 1100.0);
    }
}
