//! Cache chain builder (C8): composes N providers and N-1 budgets into a
//! stack of [`LruCacheTier`]s, grounded on the original implementation's
//! `get_cache_chain`.

use crate::cache::tier::LruCacheTier;
use crate::provider::StorageProvider;

/// Fold `providers` (fastest first, authoritative last) and `budgets`
/// (one fewer than `providers`) into a single stacked provider: the deepest
/// pair becomes the innermost tier, and each shallower provider wraps the
/// tier built so far.
///
/// With one provider and no budgets, returns that provider unwrapped — a
/// degenerate chain with no caching.
///
/// # Panics
///
/// Panics if `providers.len() != budgets.len() + 1` or `providers` is empty.
pub fn build_cache_chain(
    mut providers: Vec<Box<dyn StorageProvider>>,
    budgets: &[u64],
) -> Box<dyn StorageProvider> {
    assert!(!providers.is_empty(), "cache chain needs at least one provider");
    assert_eq!(
        providers.len(),
        budgets.len() + 1,
        "cache chain needs exactly one more provider than budgets"
    );

    let mut acc = providers.pop().expect("checked non-empty above");
    for (provider, budget) in providers.into_iter().rev().zip(budgets.iter().rev()) {
        acc = Box::new(LruCacheTier::new(provider, acc, *budget));
    }
    acc
}
