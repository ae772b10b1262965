//! Carries a [`SelectionState`] from one model to the next by change identity.

use tracing::debug;

use crate::graph::DagModel;
use crate::model::ChangeId;
use crate::selection::SelectionState;

/// Maps `old` onto `new_model`.
///
/// `old_model` is the model `old` was built against, if any; it is only used
/// to find the ancestors of a cursor that disappeared and to tell whether the
/// working copy is new. The cursor is resolved in this order:
///
/// 1. a working copy that did not exist in `old_model`,
/// 2. the old cursor, if still present (rewritten or not),
/// 3. its nearest ancestor from `old_model` still present (fewest generations
///    away, first parent first on ties),
/// 4. the working copy,
/// 5. the first node in row order,
///
/// where every candidate must also pass the filter. If the filter hides every
/// node the cursor falls back to the first node regardless. Selected ids that
/// vanished or no longer pass the filter are dropped.
pub fn reconcile(
    old: &SelectionState,
    old_model: Option<&DagModel>,
    new_model: &DagModel,
) -> SelectionState {
    let filter = &old.filter;
    let visible = |id: &ChangeId| new_model.get(id).is_some_and(|n| filter.matches(n));

    let selected = old
        .selected
        .iter()
        .filter(|id| visible(*id))
        .cloned()
        .collect();

    let fresh_working_copy = new_model
        .working_copy()
        .filter(|wc| old_model.is_none_or(|m| !m.contains(*wc)))
        .filter(|wc| visible(*wc));

    let kept = old.cursor.as_ref().filter(|c| visible(*c));

    let ancestor = || {
        let (cur, m) = (old.cursor.as_ref()?, old_model?);
        m.nearest_ancestor(cur, |a| visible(a))
    };

    let cursor = fresh_working_copy
        .or(kept)
        .or_else(|| ancestor())
        .or_else(|| new_model.working_copy().filter(|wc| visible(*wc)))
        .or_else(|| first_in_row_order(new_model, &visible))
        .or_else(|| first_in_row_order(new_model, &|_: &ChangeId| true))
        .cloned();

    if cursor != old.cursor {
        debug!(
            from = ?old.cursor.as_ref().map(ChangeId::as_str),
            to = ?cursor.as_ref().map(ChangeId::as_str),
            seq = new_model.seq(),
            "cursor remapped"
        );
    }

    SelectionState {
        cursor,
        selected,
        filter: filter.clone(),
    }
}

fn first_in_row_order<'a>(
    model: &'a DagModel,
    pred: &dyn Fn(&ChangeId) -> bool,
) -> Option<&'a ChangeId> {
    crate::layout::row_order(model)
        .into_iter()
        .map(|n| &n.change_id)
        .find(|id| pred(*id))
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
