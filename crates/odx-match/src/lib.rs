//! Crossable-pair detection over an immutable order snapshot.
//!
//! Pure deterministic: no IO, no clock, no randomness. The caller supplies
//! the open-order snapshot taken once per run; the detector returns
//! candidate pairs in price-then-FIFO priority order.
//!
//! Within one pass the detector keeps a provisional remaining ledger: each
//! emitted pair decrements both orders' provisional remaining by the pair
//! amount, so a single pass never allocates more than an order's snapshot
//! remaining across pairs. The next synchronization cycle remains the
//! authority on real amounts.

use std::collections::BTreeMap;

use uuid::Uuid;

use odx_schemas::{Order, OrderStatus, Side};

/// A crossable (buy, sell) pair sized at detection time.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub buy: Order,
    pub sell: Order,
    /// Executed price under the maker rule: the resting sell's limit price.
    pub price: f64,
    /// `min` of both sides' provisional remaining at detection time.
    pub amount: f64,
}

/// Find every crossable (buy, sell) pair in the snapshot.
///
/// A pair is crossable iff `buy.price >= sell.price` and both sides still
/// have positive provisional remaining. Buy orders are walked in descending
/// price then ascending creation time; for each buy, sell orders in
/// ascending price then ascending creation time. Returning no pairs is a
/// normal outcome.
pub fn find_crossable_pairs(open_orders: &[Order]) -> Vec<MatchCandidate> {
    let mut buys: Vec<&Order> = open_orders
        .iter()
        .filter(|o| o.side == Side::Buy && is_matchable(o))
        .collect();
    let mut sells: Vec<&Order> = open_orders
        .iter()
        .filter(|o| o.side == Side::Sell && is_matchable(o))
        .collect();

    // Price-then-FIFO priority on both sides. Sorts are stable, so equal
    // (price, created_at) keys keep snapshot order.
    buys.sort_by(|a, b| {
        b.price
            .total_cmp(&a.price)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    sells.sort_by(|a, b| {
        a.price
            .total_cmp(&b.price)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let mut remaining: BTreeMap<Uuid, f64> = BTreeMap::new();
    for o in buys.iter().chain(sells.iter()) {
        remaining.insert(o.id, o.remaining_amount);
    }

    let mut pairs = Vec::new();

    for buy in &buys {
        for sell in &sells {
            if buy.price < sell.price {
                // Sells are price-ascending: nothing further crosses this buy.
                break;
            }

            let buy_left = remaining[&buy.id];
            if buy_left <= 0.0 {
                break;
            }
            let sell_left = remaining[&sell.id];
            if sell_left <= 0.0 {
                continue;
            }

            let amount = buy_left.min(sell_left);
            remaining.insert(buy.id, buy_left - amount);
            remaining.insert(sell.id, sell_left - amount);

            pairs.push(MatchCandidate {
                buy: (*buy).clone(),
                sell: (*sell).clone(),
                price: sell.price,
                amount,
            });
        }
    }

    pairs
}

fn is_matchable(o: &Order) -> bool {
    o.status == OrderStatus::Active && o.remaining_amount > 0.0
}
