//! Matches a free-text city name from a pincode lookup against the city catalog.

use fieldops_core::City;

/// Which comparison produced a [`CityMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    /// Catalog name is contained in the resolved name (`"Pune"` in `"Pune City"`).
    CatalogInResolved,
    /// Resolved name is contained in the catalog name (`"Navi"` in `"Navi Mumbai"`).
    ResolvedInCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityMatch<'a> {
    pub city: &'a City,
    pub tier: MatchTier,
}

/// Finds the catalog city for `city_name` within `state`.
///
/// Comparisons are case-insensitive and ignore surrounding whitespace. The
/// state must always match exactly; tiers are tried in order and the first
/// catalog entry matching the earliest tier wins.
#[must_use]
pub fn match_city<'a>(catalog: &'a [City], city_name: &str, state: &str) -> Option<CityMatch<'a>> {
    let name = normalise(city_name);
    let state = normalise(state);
    if name.is_empty() {
        return None;
    }

    let in_state: Vec<(&City, String)> = catalog
        .iter()
        .filter(|c| normalise(&c.state) == state)
        .map(|c| (c, normalise(&c.name)))
        .filter(|(_, n)| !n.is_empty())
        .collect();

    let tiers: [(MatchTier, fn(&str, &str) -> bool); 3] = [
        (MatchTier::Exact, |known, resolved| known == resolved),
        (MatchTier::CatalogInResolved, |known, resolved| {
            resolved.contains(known)
        }),
        (MatchTier::ResolvedInCatalog, |known, resolved| {
            known.contains(resolved)
        }),
    ];

    tiers.into_iter().find_map(|(tier, matches)| {
        in_state
            .iter()
            .find(|(_, catalog_name)| matches(catalog_name, &name))
            .map(|(city, _)| CityMatch { city: *city, tier })
    })
}

fn normalise(value: &str) -> String {
    value.trim().to_lowercase()
}
