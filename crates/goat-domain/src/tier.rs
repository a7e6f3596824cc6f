//! Tier rows and the unranked pool.
//!
//! An item id is held by at most one tier or by the pool. Every mutating
//! method detaches the item from wherever it was before placing it, and
//! re-sequences `order_in_tier` so positions stay `0, 1, 2, ...`.

use crate::item::{ItemId, Transferable};
use goat_core::{GoatError, GoatResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TIERS: [&str; 6] = ["S", "A", "B", "C", "D", "F"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAssignment {
    pub item_id: ItemId,
    pub order_in_tier: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<TierAssignment>,
}

impl Tier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().map(|a| a.item_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|a| a.item_id == item_id)
    }

    fn resequence(&mut self) {
        for (index, assignment) in self.items.iter_mut().enumerate() {
            assignment.order_in_tier = index;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStore {
    tiers: Vec<Tier>,
    #[serde(default)]
    unranked: Vec<ItemId>,
    /// Payloads of items placed in tiers or the pool.
    #[serde(default)]
    catalog: BTreeMap<ItemId, Transferable>,
}

impl Default for TierStore {
    fn default() -> Self {
        Self::with_tiers(DEFAULT_TIERS.iter().map(|name| Tier::new(*name, *name)).collect())
    }
}

impl TierStore {
    pub fn with_tiers(tiers: Vec<Tier>) -> Self {
        Self {
            tiers,
            unranked: Vec::new(),
            catalog: BTreeMap::new(),
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn tier(&self, tier_id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == tier_id)
    }

    pub fn unranked(&self) -> &[ItemId] {
        &self.unranked
    }

    pub fn get_item(&self, item_id: &str) -> Option<&Transferable> {
        self.catalog.get(item_id)
    }

    /// Returns the tier holding `item_id` and its index within that tier.
    pub fn locate(&self, item_id: &str) -> Option<(&str, usize)> {
        self.tiers.iter().find_map(|tier| {
            tier.position_of(item_id)
                .map(|index| (tier.id.as_str(), index))
        })
    }

    pub fn tier_of(&self, item_id: &str) -> Option<&str> {
        self.locate(item_id).map(|(tier_id, _)| tier_id)
    }

    pub fn is_unranked(&self, item_id: &str) -> bool {
        self.unranked.iter().any(|id| id == item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.tier_of(item_id).is_some() || self.is_unranked(item_id)
    }

    fn tier_mut(&mut self, tier_id: &str) -> GoatResult<&mut Tier> {
        self.tiers
            .iter_mut()
            .find(|t| t.id == tier_id)
            .ok_or_else(|| GoatError::NotFound(format!("tier {}", tier_id)))
    }

    fn detach(&mut self, item_id: &str) {
        for tier in self.tiers.iter_mut() {
            if let Some(index) = tier.position_of(item_id) {
                tier.items.remove(index);
                tier.resequence();
            }
        }
        self.unranked.retain(|id| id != item_id);
    }

    /// Appends `item_id` to `tier_id`, taking it out of any other tier or
    /// the pool first.
    pub fn assign_to_tier(
        &mut self,
        item_id: &str,
        tier_id: &str,
        item: Option<Transferable>,
    ) -> GoatResult<()> {
        self.tier_mut(tier_id)?;
        self.detach(item_id);
        let tier = self.tier_mut(tier_id)?;
        tier.items.push(TierAssignment {
            item_id: item_id.to_string(),
            order_in_tier: tier.items.len(),
        });
        if let Some(item) = item {
            self.catalog.insert(item_id.to_string(), item);
        }
        Ok(())
    }

    pub fn move_within_tier(
        &mut self,
        tier_id: &str,
        from_index: usize,
        to_index: usize,
    ) -> GoatResult<()> {
        let tier = self.tier_mut(tier_id)?;
        let len = tier.items.len();
        if from_index >= len {
            return Err(GoatError::OutOfBounds {
                index: from_index,
                len,
            });
        }
        if to_index >= len {
            return Err(GoatError::OutOfBounds {
                index: to_index,
                len,
            });
        }
        let assignment = tier.items.remove(from_index);
        tier.items.insert(to_index, assignment);
        tier.resequence();
        Ok(())
    }

    /// Moves `item_id` from one tier to another. A `position` past the end
    /// of the target appends.
    pub fn move_between_tiers(
        &mut self,
        item_id: &str,
        from_tier_id: &str,
        to_tier_id: &str,
        position: Option<usize>,
    ) -> GoatResult<()> {
        self.tier_mut(to_tier_id)?;
        let from = self.tier_mut(from_tier_id)?;
        let index = from.position_of(item_id).ok_or_else(|| {
            GoatError::NotFound(format!("item {} in tier {}", item_id, from_tier_id))
        })?;
        let assignment = from.items.remove(index);
        from.resequence();

        let to = self.tier_mut(to_tier_id)?;
        let at = position.unwrap_or(to.items.len()).min(to.items.len());
        to.items.insert(at, assignment);
        to.resequence();
        Ok(())
    }

    pub fn add_to_unranked(&mut self, item_id: &str) {
        self.detach(item_id);
        self.unranked.push(item_id.to_string());
    }

    /// Takes the item out of the tier store entirely, returning its payload.
    pub fn remove_item(&mut self, item_id: &str) -> Option<Transferable> {
        self.detach(item_id);
        self.catalog.remove(item_id)
    }
}
