//! Staking/voting-power source.

use ember_types::Address;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// The staking vault that converts principal into voting power.
///
/// The engine only reads from it: current voting power, and whether one
/// account may act on another's behalf.
pub trait StakingSource {
    /// Current voting power of a user.
    fn voting_power_of(&self, user: &Address) -> u128;

    /// Whether `caller` is a registered voting delegate for `owner`.
    fn is_delegate_for(&self, caller: &Address, owner: &Address) -> bool;

    /// Whether `caller` administers `owner`'s position.
    fn is_admin_for(&self, caller: &Address, owner: &Address) -> bool;
}

/// Deterministic in-memory staking source for testing.
///
/// Powers and delegations are set programmatically; interior mutability keeps
/// the trait read-only for the engine while tests adjust state mid-scenario.
pub struct NullStaking {
    powers: Mutex<HashMap<Address, u128>>,
    delegates: Mutex<HashSet<(Address, Address)>>,
    admins: Mutex<HashSet<(Address, Address)>>,
}

impl NullStaking {
    pub fn new() -> Self {
        Self {
            powers: Mutex::new(HashMap::new()),
            delegates: Mutex::new(HashSet::new()),
            admins: Mutex::new(HashSet::new()),
        }
    }

    /// Set a user's voting power.
    pub fn set_power(&self, user: &Address, power: u128) {
        self.powers.lock().unwrap().insert(user.clone(), power);
    }

    /// Register `caller` as a delegate for `owner`.
    pub fn add_delegate(&self, caller: &Address, owner: &Address) {
        self.delegates
            .lock()
            .unwrap()
            .insert((caller.clone(), owner.clone()));
    }

    /// Register `caller` as an admin for `owner`.
    pub fn add_admin(&self, caller: &Address, owner: &Address) {
        self.admins
            .lock()
            .unwrap()
            .insert((caller.clone(), owner.clone()));
    }
}

impl Default for NullStaking {
    fn default() -> Self {
        Self::new()
    }
}

impl StakingSource for NullStaking {
    fn voting_power_of(&self, user: &Address) -> u128 {
        self.powers.lock().unwrap().get(user).copied().unwrap_or(0)
    }

    fn is_delegate_for(&self, caller: &Address, owner: &Address) -> bool {
        self.delegates
            .lock()
            .unwrap()
            .contains(&(caller.clone(), owner.clone()))
    }

    fn is_admin_for(&self, caller: &Address, owner: &Address) -> bool {
        self.admins
            .lock()
            .unwrap()
            .contains(&(caller.clone(), owner.clone()))
    }
}
