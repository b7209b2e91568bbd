//! Exact-key subsidy lookup

use super::error::{CalculationError, Missing};
use crate::catalog::{JoinType, SubsidyEntry, SubsidyTable};

/// Find the exposed subsidy entry for (device, plan, join type).
///
/// Only an exact match counts. There is no fallback to another join type or plan and
/// no zero-subsidy default; a miss is [`CalculationError::NotFound`].
pub fn resolve_subsidy<'a>(
    table: &'a SubsidyTable,
    device_id: &str,
    plan_id: &str,
    join_type: JoinType,
) -> Result<&'a SubsidyEntry, CalculationError> {
    table
        .entries(join_type)
        .iter()
        .find(|entry| entry.exposed && entry.matches(device_id, plan_id))
        .ok_or_else(|| {
            CalculationError::NotFound(Missing::Subsidy {
                device_id: device_id.to_string(),
                plan_id: plan_id.to_string(),
                join_type,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::subsidy;

    fn table() -> SubsidyTable {
        let mut table = SubsidyTable::default();
        table.push(JoinType::Change, subsidy("s24", "premium", 300_000, 100_000, 50_000));
        table.push(JoinType::Change, subsidy("s24", "premium-plus", 350_000, 100_000, 60_000));
        table.push(JoinType::New, subsidy("s24", "premium", 250_000, 0, 40_000));

        let mut hidden = subsidy("a15", "premium", 100_000, 0, 0);
        hidden.exposed = false;
        table.push(JoinType::Change, hidden);
        table
    }

    #[test]
    fn test_exact_match() {
        let table = table();
        let entry = resolve_subsidy(&table, "s24", "premium", JoinType::Change).unwrap();
        assert_eq!(entry.common_subsidy, 300_000);

        let entry = resolve_subsidy(&table, "s24", "premium", JoinType::New).unwrap();
        assert_eq!(entry.common_subsidy, 250_000);
    }

    #[test]
    fn test_no_fallback_across_join_types() {
        let table = table();
        let err = resolve_subsidy(&table, "s24", "premium", JoinType::Transfer).unwrap_err();
        assert_eq!(
            err,
            CalculationError::NotFound(Missing::Subsidy {
                device_id: "s24".into(),
                plan_id: "premium".into(),
                join_type: JoinType::Transfer,
            })
        );
    }

    #[test]
    fn test_no_partial_match() {
        let table = table();
        assert!(resolve_subsidy(&table, "s2", "premium", JoinType::Change).is_err());
        assert!(resolve_subsidy(&table, "s24", "premium-", JoinType::Change).is_err());
        assert!(resolve_subsidy(&table, "S24", "premium", JoinType::Change).is_err());
    }

    #[test]
    fn test_hidden_entry_is_not_found() {
        let table = table();
        assert!(matches!(
            resolve_subsidy(&table, "a15", "premium", JoinType::Change),
            Err(CalculationError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let table = table();
        let first = resolve_subsidy(&table, "s24", "premium-plus", JoinType::Change).unwrap();
        let second = resolve_subsidy(&table, "s24", "premium-plus", JoinType::Change).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
