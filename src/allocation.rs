//! Weight allocation for splitting one parent batch into children.
//!
//! The allocator holds the transient list of proposed children while the
//! split form is open. It never lets the list become empty, refuses quick
//! splits that do not fit the parent, and validates the whole list before
//! anything is sent to the backend. Allocating less than the parent's weight
//! is fine: the remainder stays on the parent record.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{ApiClient, CreatedChild, RequestError, SplitPart};
use crate::models::{BatchDetail, Id};

/// Most bags a quick split may produce.
pub const MAX_BAGS: u32 = 50;

/// The parent batch as seen by the split form.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentAllocation {
    pub id: Id,
    pub batch_id: String,
    pub product: String,
    pub total_weight: Decimal,
    pub unit: String,
    pub origin: String,
}

impl From<&BatchDetail> for ParentAllocation {
    fn from(batch: &BatchDetail) -> Self {
        Self {
            id: batch.id.clone(),
            batch_id: batch.batch_id.clone(),
            product: batch.product.name.clone(),
            total_weight: batch.weight.max(Decimal::ZERO),
            unit: batch.unit().to_string(),
            origin: batch.origin_label().to_string(),
        }
    }
}

/// One proposed child batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub id: Uuid,
    pub weight: Decimal,
    pub destination: String,
    pub notes: String,
}

impl AllocationEntry {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            weight: Decimal::ZERO,
            destination: String::new(),
            notes: String::new(),
        }
    }
}

/// What a validation issue is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueTarget {
    Total,
    Weight(Uuid),
    Destination(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationIssue {
    pub target: IssueTarget,
    pub message: String,
}

impl AllocationIssue {
    /// Form key the issue is rendered next to: `total`, `<id>-weight` or
    /// `<id>-destination`.
    pub fn key(&self) -> String {
        match self.target {
            IssueTarget::Total => "total".to_string(),
            IssueTarget::Weight(id) => format!("{}-weight", id),
            IssueTarget::Destination(id) => format!("{}-destination", id),
        }
    }
}

/// Rejected edit of the allocation list. The list is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("At least one child batch is required")]
    LastEntry,

    #[error("No allocation with id {0}")]
    UnknownEntry(Uuid),

    #[error("Number of bags must be at least 1")]
    NoBags,

    #[error("Number of bags cannot exceed {max}")]
    TooManyBags { max: u32 },

    #[error("Weight per bag must be greater than 0")]
    NoBagWeight,

    #[error("Total ({total} {unit}) exceeds available weight ({available} {unit})")]
    ExceedsAvailable {
        total: Decimal,
        available: Decimal,
        unit: String,
    },
}

#[derive(Debug, Error)]
pub enum SplitError {
    /// Client-side validation failed; nothing was sent.
    #[error("Please fix the highlighted allocations")]
    Invalid(Vec<AllocationIssue>),

    /// The backend answered but did not create the children.
    #[error("Failed to split batch")]
    Rejected,

    #[error("Failed to split batch. Please try again.")]
    Request(#[source] RequestError),
}

impl From<RequestError> for SplitError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Unsuccessful(_) => SplitError::Rejected,
            other => SplitError::Request(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitAllocator {
    parent: ParentAllocation,
    entries: Vec<AllocationEntry>,
    common_location: String,
}

impl SplitAllocator {
    /// Fresh form: one empty entry.
    pub fn new(parent: ParentAllocation) -> Self {
        Self {
            parent,
            entries: vec![AllocationEntry::empty()],
            common_location: String::new(),
        }
    }

    /// Rebuild the allocator from a posted form. An empty entry list gets the
    /// usual single empty entry back.
    pub fn restore(
        parent: ParentAllocation,
        entries: Vec<AllocationEntry>,
        common_location: impl Into<String>,
    ) -> Self {
        let entries = if entries.is_empty() {
            vec![AllocationEntry::empty()]
        } else {
            entries
        };
        Self {
            parent,
            entries,
            common_location: common_location.into(),
        }
    }

    pub fn parent(&self) -> &ParentAllocation {
        &self.parent
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn common_location(&self) -> &str {
        &self.common_location
    }

    pub fn set_common_location(&mut self, location: impl Into<String>) {
        self.common_location = location.into();
    }

    pub fn add_allocation(&mut self) -> Uuid {
        let entry = AllocationEntry::empty();
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn remove_allocation(&mut self, id: Uuid) -> Result<(), AllocationError> {
        let index = self.position(id)?;
        if self.entries.len() == 1 {
            return Err(AllocationError::LastEntry);
        }
        self.entries.remove(index);
        Ok(())
    }

    pub fn set_weight(&mut self, id: Uuid, weight: Decimal) -> Result<(), AllocationError> {
        let index = self.position(id)?;
        self.entries[index].weight = weight;
        Ok(())
    }

    pub fn set_destination(
        &mut self,
        id: Uuid,
        destination: impl Into<String>,
    ) -> Result<(), AllocationError> {
        let index = self.position(id)?;
        self.entries[index].destination = destination.into();
        Ok(())
    }

    pub fn set_notes(&mut self, id: Uuid, notes: impl Into<String>) -> Result<(), AllocationError> {
        let index = self.position(id)?;
        self.entries[index].notes = notes.into();
        Ok(())
    }

    fn position(&self, id: Uuid) -> Result<usize, AllocationError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(AllocationError::UnknownEntry(id))
    }

    /// Spread the parent's whole weight over the current entries. Each gets
    /// the floor of the even share; the first also takes the remainder, so
    /// the weights add up to exactly the parent's weight.
    pub fn distribute_evenly(&mut self) {
        let total = self.parent.total_weight;
        let count = Decimal::from(self.entries.len());
        let share = (total / count).floor();
        let remainder = total - share * count;

        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.weight = if index == 0 { share + remainder } else { share };
        }
    }

    /// Replace every entry with `bags` entries of `weight_per_bag`.
    pub fn generate_quick_split(
        &mut self,
        bags: u32,
        weight_per_bag: Decimal,
    ) -> Result<(), AllocationError> {
        if bags == 0 {
            return Err(AllocationError::NoBags);
        }
        if bags > MAX_BAGS {
            return Err(AllocationError::TooManyBags { max: MAX_BAGS });
        }
        if weight_per_bag <= Decimal::ZERO {
            return Err(AllocationError::NoBagWeight);
        }

        let available = self.parent.total_weight;
        match Decimal::from(bags).checked_mul(weight_per_bag) {
            Some(total) if total <= available => {}
            total => {
                return Err(AllocationError::ExceedsAvailable {
                    total: total.unwrap_or(Decimal::MAX).normalize(),
                    available: available.normalize(),
                    unit: self.parent.unit.clone(),
                })
            }
        }

        self.entries = (1..=bags)
            .map(|i| AllocationEntry {
                weight: weight_per_bag,
                notes: format!("Bag {} of {}", i, bags),
                ..AllocationEntry::empty()
            })
            .collect();
        Ok(())
    }

    /// Sum of the entry weights, or `None` when it does not fit a `Decimal`.
    pub fn total_allocated(&self) -> Option<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |sum, e| sum.checked_add(e.weight))
    }

    /// Negative when over-allocated. `None` when the total overflowed.
    pub fn remaining(&self) -> Option<Decimal> {
        self.total_allocated()
            .and_then(|total| self.parent.total_weight.checked_sub(total))
    }

    pub fn is_over_allocated(&self) -> bool {
        self.remaining().map_or(true, |left| left < Decimal::ZERO)
    }

    pub fn validate(&self) -> Vec<AllocationIssue> {
        let mut issues = Vec::new();

        if self.is_over_allocated() {
            issues.push(AllocationIssue {
                target: IssueTarget::Total,
                message: format!(
                    "Total weight cannot exceed {} {}",
                    self.parent.total_weight.normalize(),
                    self.parent.unit
                ),
            });
        }

        let has_common = !self.common_location.trim().is_empty();
        for entry in &self.entries {
            if entry.weight <= Decimal::ZERO {
                issues.push(AllocationIssue {
                    target: IssueTarget::Weight(entry.id),
                    message: "Weight is required".to_string(),
                });
            }
            if entry.destination.trim().is_empty() && !has_common {
                issues.push(AllocationIssue {
                    target: IssueTarget::Destination(entry.id),
                    message: "Destination or Common Location is required".to_string(),
                });
            }
        }

        issues
    }

    /// Entries as sent to the backend, each destination falling back to the
    /// common location.
    pub fn resolved_splits(&self) -> Vec<SplitPart> {
        self.entries
            .iter()
            .map(|entry| {
                let own = entry.destination.trim();
                let destination = if own.is_empty() {
                    self.common_location.trim()
                } else {
                    own
                };
                SplitPart {
                    weight: entry.weight,
                    destination: destination.to_string(),
                }
            })
            .collect()
    }

    /// Validate, then ask the backend to create the children. Invalid lists
    /// never reach the network.
    pub async fn submit(&self, api: &ApiClient) -> Result<Vec<CreatedChild>, SplitError> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(SplitError::Invalid(issues));
        }

        let splits = self.resolved_splits();
        let children = api
            .split_batch(self.parent.id.as_str(), &splits)
            .await
            .map_err(|err| {
                log::warn!("split of batch {} failed: {}", self.parent.batch_id, err);
                SplitError::from(err)
            })?;

        log::info!(
            "split batch {} into {} children ({} {} allocated)",
            self.parent.batch_id,
            children.len(),
            self.total_allocated().unwrap_or_default().normalize(),
            self.parent.unit
        );
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn parent(weight: &str) -> ParentAllocation {
        ParentAllocation {
            id: Id::from(12),
            batch_id: "AGR-2024-012".into(),
            product: "Basmati Rice".into(),
            total_weight: d(weight),
            unit: "kg".into(),
            origin: "Karnal, Haryana".into(),
        }
    }

    #[test]
    fn quick_split_four_bags_of_twenty_from_hundred() {
        let mut alloc = SplitAllocator::new(parent("100"));
        alloc.generate_quick_split(4, d("20")).unwrap();

        assert_eq!(alloc.entries().len(), 4);
        assert!(alloc.entries().iter().all(|e| e.weight == d("20")));
        assert_eq!(alloc.entries()[2].notes, "Bag 3 of 4");
        assert_eq!(alloc.total_allocated(), Some(d("80")));
        assert_eq!(alloc.remaining(), Some(d("20")));

        alloc.set_common_location("Delhi Mandi");
        assert!(alloc.validate().is_empty());
    }

    #[test]
    fn quick_split_that_does_not_fit_leaves_entries_alone() {
        let mut alloc = SplitAllocator::new(parent("50"));
        let before = alloc.entries().to_vec();

        let err = alloc.generate_quick_split(3, d("20")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Total (60 kg) exceeds available weight (50 kg)"
        );
        assert_eq!(alloc.entries(), &before[..]);
    }

    #[test]
    fn quick_split_needs_at_least_one_bag() {
        let mut alloc = SplitAllocator::new(parent("50"));
        assert_eq!(
            alloc.generate_quick_split(0, d("5")),
            Err(AllocationError::NoBags)
        );
        assert_eq!(alloc.entries().len(), 1);
    }

    #[test]
    fn quick_split_caps_bags_and_needs_bag_weight() {
        let mut alloc = SplitAllocator::new(parent("1000"));
        let before = alloc.entries().to_vec();

        assert_eq!(
            alloc.generate_quick_split(MAX_BAGS + 1, d("1")),
            Err(AllocationError::TooManyBags { max: MAX_BAGS })
        );
        assert_eq!(
            alloc.generate_quick_split(u32::MAX, Decimal::ZERO),
            Err(AllocationError::TooManyBags { max: MAX_BAGS })
        );
        assert_eq!(
            alloc.generate_quick_split(4, Decimal::ZERO),
            Err(AllocationError::NoBagWeight)
        );
        assert_eq!(
            alloc.generate_quick_split(4, d("-5")),
            Err(AllocationError::NoBagWeight)
        );
        assert_eq!(alloc.entries(), &before[..]);

        alloc.generate_quick_split(MAX_BAGS, d("20")).unwrap();
        assert_eq!(alloc.entries().len(), MAX_BAGS as usize);
    }

    #[test]
    fn huge_weights_are_rejected_without_overflow() {
        let mut alloc = SplitAllocator::new(parent("100"));
        let before = alloc.entries().to_vec();
        let err = alloc.generate_quick_split(2, Decimal::MAX).unwrap_err();
        assert!(matches!(err, AllocationError::ExceedsAvailable { .. }));
        assert_eq!(alloc.entries(), &before[..]);

        let entries = (0..2)
            .map(|_| AllocationEntry {
                weight: Decimal::MAX,
                destination: "Depot".into(),
                ..AllocationEntry::empty()
            })
            .collect();
        let alloc = SplitAllocator::restore(parent("100"), entries, "");
        assert_eq!(alloc.total_allocated(), None);
        assert_eq!(alloc.remaining(), None);
        assert!(alloc.is_over_allocated());

        let issues = alloc.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target, IssueTarget::Total);
    }

    #[test]
    fn even_distribution_gives_remainder_to_first() {
        let mut alloc = SplitAllocator::new(parent("10"));
        alloc.add_allocation();
        alloc.add_allocation();
        alloc.distribute_evenly();

        let weights: Vec<Decimal> = alloc.entries().iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![d("4"), d("3"), d("3")]);
        assert_eq!(alloc.total_allocated(), Some(d("10")));
    }

    #[test]
    fn even_distribution_keeps_fractional_weight() {
        let mut alloc = SplitAllocator::new(parent("10.5"));
        alloc.add_allocation();
        alloc.distribute_evenly();

        assert_eq!(alloc.entries()[0].weight, d("5.5"));
        assert_eq!(alloc.entries()[1].weight, d("5"));
        assert_eq!(alloc.remaining(), Some(Decimal::ZERO));
    }

    #[test]
    fn last_entry_cannot_be_removed() {
        let mut alloc = SplitAllocator::new(parent("10"));
        let only = alloc.entries()[0].id;
        assert_eq!(alloc.remove_allocation(only), Err(AllocationError::LastEntry));

        let second = alloc.add_allocation();
        alloc.remove_allocation(only).unwrap();
        assert_eq!(alloc.entries().len(), 1);
        assert_eq!(alloc.entries()[0].id, second);
    }

    #[test]
    fn unknown_entry_is_reported() {
        let mut alloc = SplitAllocator::new(parent("10"));
        let stray = Uuid::new_v4();
        assert_eq!(
            alloc.set_weight(stray, d("1")),
            Err(AllocationError::UnknownEntry(stray))
        );
    }

    #[test]
    fn validation_flags_weight_destination_and_total() {
        let mut alloc = SplitAllocator::new(parent("30"));
        let first = alloc.entries()[0].id;
        let second = alloc.add_allocation();
        alloc.set_weight(first, d("40")).unwrap();
        alloc.set_destination(first, "Mumbai").unwrap();

        let keys: Vec<String> = alloc.validate().iter().map(|i| i.key()).collect();
        assert!(keys.contains(&"total".to_string()));
        assert!(keys.contains(&format!("{}-weight", second)));
        assert!(keys.contains(&format!("{}-destination", second)));
        assert!(!keys.contains(&format!("{}-destination", first)));

        let total = alloc
            .validate()
            .into_iter()
            .find(|i| i.target == IssueTarget::Total)
            .unwrap();
        assert_eq!(total.message, "Total weight cannot exceed 30 kg");
    }

    #[test]
    fn common_location_fills_missing_destinations() {
        let mut alloc = SplitAllocator::new(parent("30"));
        let first = alloc.entries()[0].id;
        let second = alloc.add_allocation();
        alloc.set_weight(first, d("10")).unwrap();
        alloc.set_weight(second, d("20")).unwrap();
        alloc.set_destination(second, "Pune").unwrap();
        alloc.set_common_location("Nagpur");

        assert!(alloc.validate().is_empty());
        let splits = alloc.resolved_splits();
        assert_eq!(splits[0].destination, "Nagpur");
        assert_eq!(splits[1].destination, "Pune");
    }

    #[test]
    fn full_allocation_is_valid() {
        let mut alloc = SplitAllocator::new(parent("25"));
        let only = alloc.entries()[0].id;
        alloc.set_weight(only, d("25")).unwrap();
        alloc.set_destination(only, "Chennai").unwrap();
        assert!(alloc.validate().is_empty());
        assert_eq!(alloc.remaining(), Some(Decimal::ZERO));
    }

    #[test]
    fn restore_never_yields_empty_list() {
        let alloc = SplitAllocator::restore(parent("5"), Vec::new(), "");
        assert_eq!(alloc.entries().len(), 1);
    }

    #[test]
    fn unsuccessful_reply_maps_to_generic_split_failure() {
        let err = SplitError::from(RequestError::Unsuccessful(None));
        assert_eq!(err.to_string(), "Failed to split batch");

        let err = SplitError::from(RequestError::Status {
            status: 500,
            detail: crate::api::ErrorDetail::Message("boom".into()),
        });
        assert_eq!(err.to_string(), "Failed to split batch. Please try again.");
    }

    fn cents() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        #[test]
        fn even_distribution_sums_to_parent(total in cents(), n in 1usize..40) {
            let mut alloc = SplitAllocator::new(parent("0"));
            alloc.parent.total_weight = total;
            for _ in 1..n {
                alloc.add_allocation();
            }
            alloc.distribute_evenly();
            prop_assert_eq!(alloc.entries().len(), n);
            prop_assert_eq!(alloc.total_allocated(), Some(total));
        }

        #[test]
        fn quick_split_respects_parent_weight(total in 0i64..1000, bags in 1u32..20, per_bag in 1i64..200) {
            let mut alloc = SplitAllocator::new(parent("0"));
            alloc.parent.total_weight = Decimal::from(total);
            let result = alloc.generate_quick_split(bags, Decimal::from(per_bag));

            if i64::from(bags) * per_bag > total {
                prop_assert!(result.is_err());
                prop_assert_eq!(alloc.entries().len(), 1);
            } else {
                prop_assert!(result.is_ok());
                prop_assert_eq!(alloc.entries().len(), bags as usize);
                prop_assert!(alloc.entries().iter().all(|e| e.weight == Decimal::from(per_bag)));
            }
        }

        #[test]
        fn over_allocation_is_always_flagged(weights in prop::collection::vec(1i64..500, 1..8), total in 1i64..2000) {
            let entries = weights
                .iter()
                .map(|w| AllocationEntry {
                    weight: Decimal::from(*w),
                    destination: "Depot".into(),
                    ..AllocationEntry::empty()
                })
                .collect();
            let mut p = parent("0");
            p.total_weight = Decimal::from(total);
            let alloc = SplitAllocator::restore(p, entries, "");

            let sum: i64 = weights.iter().sum();
            let flagged = alloc.validate().iter().any(|i| i.target == IssueTarget::Total);
            prop_assert_eq!(flagged, sum > total);
            prop_assert_eq!(alloc.validate().is_empty(), sum <= total);
        }
    }
}
