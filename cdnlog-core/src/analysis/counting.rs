use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts, highest first; equal counts keep first-seen order.
pub fn count_by_first_seen<K, I>(items: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    sum_by_first_seen(items.into_iter().map(|k| (k, 1)))
}

/// Per-key sums, highest first; equal sums keep first-seen order.
pub fn sum_by_first_seen<K, I>(items: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut totals: Vec<(K, u64)> = Vec::new();

    for (key, n) in items {
        match index.get(&key) {
            Some(&i) => totals[i].1 += n,
            None => {
                index.insert(key.clone(), totals.len());
                totals.push((key, n));
            }
        }
    }

    // Stable: ties stay in encounter order.
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// `part / total` as a percentage rounded to 2 decimals; 0 when `total` is 0.
pub fn ratio_percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}
