//! Partitioning of normalized address segments into role-tagged fragments.
//!
//! Irish postal convention puts the resident first and the county last,
//! with road, local area, and townland in between, but none of the
//! fields is guaranteed to be present. Role assignment degrades
//! gracefully as segments go missing.

use crate::gazetteer::GazetteerIndex;
use crate::models::Tier;

/// Hypothesized role of one address fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentRole {
    /// Leading resident name; never geocoded.
    Resident,
    /// Road or local area; no gazetteer tier, produces no coordinate.
    RoadOrLocal,
    Townland,
    County,
    Unknown,
}

/// One segment of the parsed address, owned by a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressFragment {
    pub text: String,
    pub role: FragmentRole,
    /// Index in the original segment list; rightmost is coarsest.
    pub position: usize,
}

/// Assign roles to normalized segments, finest-first.
///
/// The last segment is County by convention, demoted to Unknown when it
/// has neither an exact nor a floor-clearing fuzzy county match. With
/// three or more segments the first is Resident and interiors are
/// Unknown; with two the first is resident-or-place and stays Unknown so
/// the matcher can try it as a place; a single segment is treated as
/// county only.
pub fn segment(segments: &[String], index: &GazetteerIndex, floor: f64) -> Vec<AddressFragment> {
    let count = segments.len();
    segments
        .iter()
        .enumerate()
        .map(|(position, text)| {
            let role = if position + 1 == count {
                if county_candidate(index, text, floor) {
                    FragmentRole::County
                } else {
                    FragmentRole::Unknown
                }
            } else if position == 0 && count >= 3 {
                FragmentRole::Resident
            } else {
                FragmentRole::Unknown
            };

            AddressFragment {
                text: text.clone(),
                role,
                position,
            }
        })
        .collect()
}

fn county_candidate(index: &GazetteerIndex, text: &str, floor: f64) -> bool {
    !index.lookup_exact(text, Tier::County).is_empty()
        || !index.lookup_fuzzy(text, Tier::County, 1, floor).is_empty()
}
