use crate::core::ResolvedPlace;
use crate::domain::ports::PlacesLookup;
use crate::utils::error::Result;

/// Search strings for one business, most specific first, without duplicates.
pub fn query_variants(name: &str, address: &str) -> Vec<String> {
    let name = name.trim();
    let address = address.trim();
    let street = first_comma_segment(address);

    let candidates = [
        format!("{} {}", name, address),
        format!("{} {}", name, street),
        name.to_string(),
        format!("{} {}", first_two_words(name), street),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn first_comma_segment(address: &str) -> &str {
    address.split(',').next().unwrap_or_default().trim()
}

fn first_two_words(name: &str) -> String {
    name.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Maps a business identity to a place and its listing metadata.
pub struct Resolver<P: PlacesLookup> {
    places: P,
}

impl<P: PlacesLookup> Resolver<P> {
    pub fn new(places: P) -> Self {
        Self { places }
    }

    pub fn places(&self) -> &P {
        &self.places
    }

    /// Tries each query variant in turn and returns the first match.
    ///
    /// Lookup failures only disqualify the variant they happened in; when no
    /// variant matches the result is `None`, never an error.
    pub async fn resolve(&self, name: &str, address: &str, _phone: &str) -> Option<ResolvedPlace> {
        for query in query_variants(name, address) {
            match self.try_variant(&query).await {
                Ok(Some(place)) => {
                    tracing::info!("🗺️ Found result using query: {}", query);
                    tracing::debug!(
                        "Maps URL: {:?}, Review Score: {:?}",
                        place.maps_url,
                        place.review_score
                    );
                    return Some(place);
                }
                Ok(None) => tracing::debug!("No match for query: {}", query),
                Err(e) => tracing::warn!("Lookup failed for query '{}': {}", query, e),
            }
        }

        tracing::info!("🔍 No results found for {} at {}", name, address);
        None
    }

    async fn try_variant(&self, query: &str) -> Result<Option<ResolvedPlace>> {
        let found = self.places.find_place(query).await?;
        if !found.is_ok() {
            if found.status != "ZERO_RESULTS" {
                tracing::warn!(
                    "Places find returned {}: {}",
                    found.status,
                    found.error_message.as_deref().unwrap_or("no error message")
                );
            }
            return Ok(None);
        }

        let Some(candidate) = found.candidates.into_iter().next() else {
            return Ok(None);
        };
        let Some(place_id) = candidate.place_id.as_deref() else {
            tracing::warn!("Candidate for '{}' has no place_id", query);
            return Ok(None);
        };

        let details = self.places.place_details(place_id).await?;
        if !details.is_ok() {
            tracing::warn!(
                "Places details for {} returned {}: {}",
                place_id,
                details.status,
                details.error_message.as_deref().unwrap_or("no error message")
            );
            return Ok(None);
        }

        let result = details.result.unwrap_or_default();
        Ok(Some(ResolvedPlace {
            maps_url: result.url.filter(|url| !url.trim().is_empty()),
            review_score: result.rating.or(candidate.rating),
            query: query.to_string(),
        }))
    }
}
