//! Deterministic ranking of accumulated quantities.

use std::collections::BTreeMap;

use salesdex_core::QuantitySum;

/// Sum quantities per key and order by total descending, then key ascending.
///
/// Totals are accumulated as [`QuantitySum`], so the result does not depend
/// on the order of `quantities` and equal totals always resolve to the
/// lowest identifier.
pub(crate) fn rank<K, Q>(quantities: impl IntoIterator<Item = (K, Q)>) -> Vec<(K, f64)>
where
    K: Ord + Copy,
    Q: Into<QuantitySum>,
{
    let mut totals: BTreeMap<K, QuantitySum> = BTreeMap::new();
    for (key, quantity) in quantities {
        *totals.entry(key).or_default() += quantity.into();
    }
    let mut ranked: Vec<(K, QuantitySum)> = totals.into_iter().collect();
    // Stable sort over ascending keys keeps ties in id order.
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
    ranked
        .into_iter()
        .map(|(key, total)| (key, total.to_f64()))
        .collect()
}
