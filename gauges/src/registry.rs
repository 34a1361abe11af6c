//! The gauge registry — lifecycle state machine and lookup maps.

use crate::error::GaugeError;
use crate::gauge::{Gauge, GaugeKind, PoolVenue};
use crate::set::IndexedSet;
use ember_types::{Address, GaugeId, Period};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Registry of gauges, recognized pools, and whitelisted tokens.
///
/// Gauges are enumerable in creation order (for ranged batch settlement) and
/// grouped by token-pair identity (for emission redirection). The registry
/// owns only state and transitions; sweeping and settlement orchestration
/// live with the settlement engine.
#[derive(Serialize, Deserialize)]
pub struct GaugeRegistry {
    gauges: HashMap<GaugeId, Gauge>,
    /// Creation-ordered gauge ids for indexed batch iteration.
    order: IndexedSet<GaugeId>,
    pool_to_gauge: HashMap<Address, GaugeId>,
    /// Recognized venues, registered from the external pool factory.
    pools: HashMap<Address, PoolVenue>,
    /// Gauges grouped by order-independent token identity.
    pair_index: HashMap<(Address, Address), Vec<GaugeId>>,
    whitelist: IndexedSet<Address>,
    next_id: u64,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self {
            gauges: HashMap::new(),
            order: IndexedSet::new(),
            pool_to_gauge: HashMap::new(),
            pools: HashMap::new(),
            pair_index: HashMap::new(),
            whitelist: IndexedSet::new(),
            next_id: 0,
        }
    }

    // ── Whitelist ────────────────────────────────────────────────────────

    pub fn whitelist_token(&mut self, token: &Address) -> Result<(), GaugeError> {
        if !self.whitelist.insert(token.clone()) {
            return Err(GaugeError::AlreadyWhitelisted(token.clone()));
        }
        Ok(())
    }

    pub fn revoke_token(&mut self, token: &Address) -> Result<(), GaugeError> {
        if !self.whitelist.remove(token) {
            return Err(GaugeError::NotWhitelisted(token.clone()));
        }
        Ok(())
    }

    pub fn is_whitelisted(&self, token: &Address) -> bool {
        self.whitelist.contains(token)
    }

    // ── Pool directory ───────────────────────────────────────────────────

    /// Register a venue from the external pool factory.
    pub fn recognize_pool(
        &mut self,
        pool: Address,
        token0: Address,
        token1: Address,
    ) -> Result<(), GaugeError> {
        if self.pools.contains_key(&pool) {
            return Err(GaugeError::AlreadyRecognized(pool));
        }
        self.pools.insert(
            pool.clone(),
            PoolVenue {
                pool,
                token0,
                token1,
            },
        );
        Ok(())
    }

    pub fn venue(&self, pool: &Address) -> Option<&PoolVenue> {
        self.pools.get(pool)
    }

    // ── Gauge creation ───────────────────────────────────────────────────

    /// Create the gauge for a pool. At most one gauge exists per pool; both
    /// constituent tokens must be whitelisted and the pool recognized.
    pub fn create_gauge(
        &mut self,
        pool: &Address,
        kind: GaugeKind,
        current_period: Period,
    ) -> Result<GaugeId, GaugeError> {
        if self.pool_to_gauge.contains_key(pool) {
            return Err(GaugeError::GaugeExists(pool.clone()));
        }
        let venue = self
            .pools
            .get(pool)
            .ok_or_else(|| GaugeError::UnknownPool(pool.clone()))?;
        for token in [&venue.token0, &venue.token1] {
            if !self.whitelist.contains(token) {
                return Err(GaugeError::TokenNotWhitelisted(token.clone()));
            }
        }
        let pair = venue.pair_key();

        let id = GaugeId::new(self.next_id);
        self.next_id += 1;
        self.gauges
            .insert(id, Gauge::new(id, pool.clone(), kind, current_period));
        self.order.insert(id);
        self.pool_to_gauge.insert(pool.clone(), id);
        self.pair_index.entry(pair).or_default().push(id);
        Ok(id)
    }

    // ── Lifecycle transitions ────────────────────────────────────────────

    /// Mark a gauge dead. The caller runs the kill-time sweep.
    pub fn kill(&mut self, id: GaugeId) -> Result<(), GaugeError> {
        let gauge = self
            .gauges
            .get_mut(&id)
            .ok_or(GaugeError::UnknownGauge(id))?;
        if !gauge.alive {
            return Err(GaugeError::AlreadyDead(id));
        }
        gauge.alive = false;
        Ok(())
    }

    /// Mark a gauge alive again, clearing any redirect.
    pub fn revive(&mut self, id: GaugeId) -> Result<(), GaugeError> {
        let gauge = self
            .gauges
            .get_mut(&id)
            .ok_or(GaugeError::UnknownGauge(id))?;
        if gauge.alive {
            return Err(GaugeError::AlreadyAlive(id));
        }
        gauge.alive = true;
        gauge.redirect_to = None;
        Ok(())
    }

    /// Point a gauge's emissions at another gauge's sink.
    pub fn set_redirect(&mut self, id: GaugeId, dest: GaugeId) -> Result<(), GaugeError> {
        if !self.gauges.contains_key(&dest) {
            return Err(GaugeError::UnknownGauge(dest));
        }
        let gauge = self
            .gauges
            .get_mut(&id)
            .ok_or(GaugeError::UnknownGauge(id))?;
        gauge.redirect_to = Some(dest);
        Ok(())
    }

    /// All gauges sharing a pool's token identity, in creation order.
    pub fn pair_members(&self, pool: &Address) -> Result<Vec<GaugeId>, GaugeError> {
        let venue = self
            .pools
            .get(pool)
            .ok_or_else(|| GaugeError::UnknownPool(pool.clone()))?;
        Ok(self
            .pair_index
            .get(&venue.pair_key())
            .cloned()
            .unwrap_or_default())
    }

    /// Resolve the gauge whose sink actually receives emissions, following
    /// redirect pointers. A cycle stops at the last sound hop.
    pub fn resolve_sink(&self, id: GaugeId) -> GaugeId {
        let mut current = id;
        let mut visited = HashSet::new();
        while visited.insert(current) {
            match self.gauges.get(&current).and_then(|g| g.redirect_to) {
                Some(next) if !visited.contains(&next) => current = next,
                _ => break,
            }
        }
        current
    }

    // ── Settled markers ──────────────────────────────────────────────────

    /// Mark a (gauge, period) pair settled. Returns false when already set;
    /// markers are monotonic and never cleared.
    pub fn mark_settled(&mut self, id: GaugeId, period: Period) -> Result<bool, GaugeError> {
        let gauge = self
            .gauges
            .get_mut(&id)
            .ok_or(GaugeError::UnknownGauge(id))?;
        Ok(gauge.settled.insert(period))
    }

    pub fn is_settled(&self, id: GaugeId, period: Period) -> bool {
        self.gauges
            .get(&id)
            .map(|g| g.is_settled(period))
            .unwrap_or(false)
    }

    /// Advance a gauge's last-settled marker.
    pub fn advance_marker(&mut self, id: GaugeId, period: Period) -> Result<(), GaugeError> {
        let gauge = self
            .gauges
            .get_mut(&id)
            .ok_or(GaugeError::UnknownGauge(id))?;
        gauge.last_settled = period;
        Ok(())
    }

    // ── Lookups ──────────────────────────────────────────────────────────

    pub fn gauge(&self, id: GaugeId) -> Result<&Gauge, GaugeError> {
        self.gauges.get(&id).ok_or(GaugeError::UnknownGauge(id))
    }

    pub fn gauge_for_pool(&self, pool: &Address) -> Option<GaugeId> {
        self.pool_to_gauge.get(pool).copied()
    }

    /// Whether votes may currently be allocated to a pool.
    pub fn is_votable(&self, pool: &Address) -> bool {
        self.pool_to_gauge
            .get(pool)
            .and_then(|id| self.gauges.get(id))
            .map(|g| g.alive)
            .unwrap_or(false)
    }

    /// Creation-ordered gauge ids.
    pub fn ids(&self) -> &[GaugeId] {
        self.order.as_slice()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Serialize the registry for persistence.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Restore a registry from serialized bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        bincode::deserialize(data).ok()
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
