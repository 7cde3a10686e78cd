// Weighted random provider selection

use crate::config::Provider;
use rand::Rng;

/// Pick one provider with probability proportional to its weight.
///
/// Draws `r` uniformly from `[0, total_weight)` and walks the list subtracting
/// weights until `r` goes negative. Falls back to the first provider if the
/// walk runs off the end or the weights do not sum to a positive total.
/// Returns `None` only for an empty list.
pub fn weighted_select<'a, R: Rng + ?Sized>(
    providers: &'a [Provider],
    rng: &mut R,
) -> Option<&'a Provider> {
    let first = providers.first()?;

    let total: i64 = providers.iter().map(|p| p.weight).sum();
    if total <= 0 {
        return Some(first);
    }

    let mut r = rng.gen_range(0..total);
    for provider in providers {
        r -= provider.weight;
        if r < 0 {
            return Some(provider);
        }
    }
    Some(first)
}
