//! Decoding of raw ledger records into desk units.

use std::sync::Arc;

use odx_schemas::Side;

use crate::{is_zero_address, LedgerError, OrderStorage, ZERO_ADDRESS};

/// Fixed-point scale used by the order-book contract unless configured
/// otherwise.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Convert raw fixed-point ledger units into ether-scale `f64`.
pub fn raw_to_ether(raw: u128, decimals: u32) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Convert ether-scale `f64` into raw fixed-point units.
///
/// Used by test doubles to seed ledger state; the production read path only
/// decodes.
pub fn ether_to_raw(value: f64, decimals: u32) -> u128 {
    (value * 10f64.powi(decimals as i32)).round() as u128
}

/// A ledger order decoded into desk units.
///
/// `exists == false` means the storage read returned the zero-address
/// sentinel: the order id was never created or the book no longer holds it.
/// All numeric fields are zero in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct OnChainOrder {
    pub exists: bool,
    pub owner: String,
    pub amount: f64,
    pub price: f64,
    pub remaining: f64,
    pub active: bool,
}

impl OnChainOrder {
    fn absent() -> Self {
        Self {
            exists: false,
            owner: ZERO_ADDRESS.to_string(),
            amount: 0.0,
            price: 0.0,
            remaining: 0.0,
            active: false,
        }
    }
}

/// Reads order ground truth from the ledger and decodes it into desk units.
///
/// Purely a read: no side effects, no retries, no caching. The zero-address
/// owner sentinel is mapped to `exists: false` here so callers never see it.
pub struct ChainStateReader {
    storage: Arc<dyn OrderStorage>,
    decimals: u32,
}

impl ChainStateReader {
    pub fn new(storage: Arc<dyn OrderStorage>) -> Self {
        Self::with_decimals(storage, DEFAULT_DECIMALS)
    }

    /// For ledgers that declare a non-standard fixed-point scale.
    pub fn with_decimals(storage: Arc<dyn OrderStorage>, decimals: u32) -> Self {
        Self { storage, decimals }
    }

    pub async fn read_order(
        &self,
        side: Side,
        chain_order_id: u64,
    ) -> Result<OnChainOrder, LedgerError> {
        let rec = self.storage.read_order(side, chain_order_id).await?;

        if is_zero_address(&rec.owner) {
            return Ok(OnChainOrder::absent());
        }

        Ok(OnChainOrder {
            exists: true,
            owner: rec.owner,
            amount: raw_to_ether(rec.amount, self.decimals),
            price: raw_to_ether(rec.price, self.decimals),
            remaining: raw_to_ether(rec.remaining, self.decimals),
            active: rec.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChainOrderRecord;
    use async_trait::async_trait;

    struct FixedStorage(ChainOrderRecord);

    #[async_trait]
    impl OrderStorage for FixedStorage {
        async fn read_order(
            &self,
            _side: Side,
            _chain_order_id: u64,
        ) -> Result<ChainOrderRecord, LedgerError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn raw_units_decode_at_eighteen_decimals() {
        assert_eq!(raw_to_ether(1_000_000_000_000_000_000, 18), 1.0);
        assert_eq!(raw_to_ether(500_000_000_000_000_000, 18), 0.5);
        assert_eq!(raw_to_ether(0, 18), 0.0);
    }

    #[test]
    fn ether_seeding_roundtrips_for_test_values() {
        for v in [0.0, 0.5, 9.0, 50.0, 100.0, 450.0] {
            assert_eq!(raw_to_ether(ether_to_raw(v, 18), 18), v);
        }
    }

    #[tokio::test]
    async fn zero_owner_reads_as_nonexistent() {
        let reader = ChainStateReader::new(Arc::new(FixedStorage(ChainOrderRecord {
            owner: ZERO_ADDRESS.to_string(),
            amount: ether_to_raw(100.0, 18),
            price: ether_to_raw(10.0, 18),
            remaining: ether_to_raw(100.0, 18),
            active: true,
        })));

        let decoded = reader
            .read_order(Side::Buy, 7)
            .await
            .expect("read must succeed");

        assert!(!decoded.exists);
        assert_eq!(decoded.remaining, 0.0);
        assert!(!decoded.active);
    }

    #[tokio::test]
    async fn live_record_decodes_to_ether_units() {
        let reader = ChainStateReader::new(Arc::new(FixedStorage(ChainOrderRecord {
            owner: "0x00000000000000000000000000000000000000a1".to_string(),
            amount: ether_to_raw(100.0, 18),
            price: ether_to_raw(10.0, 18),
            remaining: ether_to_raw(40.0, 18),
            active: true,
        })));

        let decoded = reader
            .read_order(Side::Sell, 3)
            .await
            .expect("read must succeed");

        assert!(decoded.exists);
        assert_eq!(decoded.amount, 100.0);
        assert_eq!(decoded.price, 10.0);
        assert_eq!(decoded.remaining, 40.0);
        assert!(decoded.active);
    }
}
