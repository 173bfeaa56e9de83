//! Filter state for the employee list.
//!
//! The state is driven only through [`reduce_filters`]. The `All` tag is never
//! set directly: it is derived from the search, expiring, and contract-kind
//! predicates after every event.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{ContractKind, EmployeeQuery};

/// Tag for a filter control that is currently engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterTag {
    All,
    Search,
    Expiring,
    FullTime,
    PartTime,
}

impl FilterTag {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterTag::All => "all",
            FilterTag::Search => "search",
            FilterTag::Expiring => "expiring",
            FilterTag::FullTime => "full-time",
            FilterTag::PartTime => "part-time",
        }
    }
}

impl fmt::Display for FilterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User action on the filter bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    /// Reset every filter.
    All,
    Expiring,
    FullTime,
    PartTime,
    /// Submit the search box; the text is trimmed before use.
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_query: String,
    pub is_expiring: bool,
    /// `Some(true)` full-time only, `Some(false)` part-time only.
    pub is_full_time: Option<bool>,
    /// Engaged controls in activation order. Never empty.
    pub active_filters: Vec<FilterTag>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            is_expiring: false,
            is_full_time: None,
            active_filters: vec![FilterTag::All],
        }
    }
}

impl FilterState {
    /// True when no predicate narrows the list.
    pub fn is_unfiltered(&self) -> bool {
        self.search_query.is_empty() && !self.is_expiring && self.is_full_time.is_none()
    }

    pub fn is_active(&self, tag: FilterTag) -> bool {
        self.active_filters.contains(&tag)
    }

    /// Request parameters for `page` under the current filters.
    pub fn query(&self, page: u32, size: u32) -> EmployeeQuery {
        EmployeeQuery {
            search_text: Some(self.search_query.clone()).filter(|text| !text.is_empty()),
            expiring_this_month: self.is_expiring,
            contract_type: self.contract_kind(),
            page,
            size,
        }
    }

    pub fn contract_kind(&self) -> Option<ContractKind> {
        self.is_full_time.map(|full_time| {
            if full_time {
                ContractKind::FullTime
            } else {
                ContractKind::PartTime
            }
        })
    }

    /// Labels for the active-filter indicator; empty while `All` is active.
    ///
    /// The search chip shows the quoted query, other chips their tag with the
    /// hyphen replaced by a space.
    pub fn chips(&self) -> Vec<String> {
        self.active_filters
            .iter()
            .filter(|tag| **tag != FilterTag::All)
            .map(|tag| match tag {
                FilterTag::Search if !self.search_query.is_empty() => {
                    format!("\"{}\"", self.search_query)
                }
                other => other.as_str().replace('-', " "),
            })
            .collect()
    }
}

/// Apply one filter event, returning the next state.
pub fn reduce_filters(state: &FilterState, event: &FilterEvent) -> FilterState {
    let mut next = state.clone();
    match event {
        FilterEvent::All => return FilterState::default(),
        FilterEvent::Expiring => {
            next.is_expiring = !next.is_expiring;
            if next.is_expiring {
                remove_tag(&mut next.active_filters, FilterTag::All);
                push_tag(&mut next.active_filters, FilterTag::Expiring);
            } else {
                remove_tag(&mut next.active_filters, FilterTag::Expiring);
            }
        }
        FilterEvent::FullTime => toggle_kind(&mut next, true),
        FilterEvent::PartTime => toggle_kind(&mut next, false),
        FilterEvent::Search(text) => {
            let trimmed = text.trim();
            next.search_query = trimmed.to_string();
            if trimmed.is_empty() {
                remove_tag(&mut next.active_filters, FilterTag::Search);
            } else {
                remove_tag(&mut next.active_filters, FilterTag::All);
                push_tag(&mut next.active_filters, FilterTag::Search);
            }
        }
    }
    normalize(&mut next);
    next
}

/// Engage `full_time` (true) or part-time (false); a second toggle clears it.
fn toggle_kind(state: &mut FilterState, full_time: bool) {
    let (own, other) = if full_time {
        (FilterTag::FullTime, FilterTag::PartTime)
    } else {
        (FilterTag::PartTime, FilterTag::FullTime)
    };
    if state.is_full_time == Some(full_time) {
        state.is_full_time = None;
        remove_tag(&mut state.active_filters, own);
    } else {
        state.is_full_time = Some(full_time);
        remove_tag(&mut state.active_filters, FilterTag::All);
        remove_tag(&mut state.active_filters, other);
        push_tag(&mut state.active_filters, own);
    }
}

/// `All` is present iff no predicate is engaged, and the tag list is never empty.
fn normalize(state: &mut FilterState) {
    if state.active_filters.is_empty() || state.is_unfiltered() {
        state.active_filters = vec![FilterTag::All];
    } else {
        remove_tag(&mut state.active_filters, FilterTag::All);
    }
}

fn push_tag(tags: &mut Vec<FilterTag>, tag: FilterTag) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn remove_tag(tags: &mut Vec<FilterTag>, tag: FilterTag) {
    tags.retain(|t| *t != tag);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(events: &[FilterEvent]) -> FilterState {
        events
            .iter()
            .fold(FilterState::default(), |state, event| reduce_filters(&state, event))
    }

    fn search(text: &str) -> FilterEvent {
        FilterEvent::Search(text.to_string())
    }

    #[test]
    fn default_state_is_all_only() {
        let state = FilterState::default();
        assert_eq!(state.active_filters, vec![FilterTag::All]);
        assert!(state.is_unfiltered());
        assert!(state.chips().is_empty());
    }

    #[test]
    fn expiring_toggle_replaces_all_and_back() {
        let on = apply_all(&[FilterEvent::Expiring]);
        assert!(on.is_expiring);
        assert_eq!(on.active_filters, vec![FilterTag::Expiring]);

        let off = reduce_filters(&on, &FilterEvent::Expiring);
        assert_eq!(off, FilterState::default());
    }

    /// Selecting full-time while part-time is active swaps in one transition.
    #[test]
    fn full_time_replaces_part_time() {
        let part = apply_all(&[FilterEvent::PartTime]);
        assert_eq!(part.is_full_time, Some(false));
        assert_eq!(part.active_filters, vec![FilterTag::PartTime]);

        let full = reduce_filters(&part, &FilterEvent::FullTime);
        assert_eq!(full.is_full_time, Some(true));
        assert_eq!(full.active_filters, vec![FilterTag::FullTime]);
    }

    #[test]
    fn second_full_time_click_clears_kind() {
        let state = apply_all(&[
            FilterEvent::Expiring,
            FilterEvent::FullTime,
            FilterEvent::FullTime,
        ]);
        assert_eq!(state.is_full_time, None);
        assert_eq!(state.active_filters, vec![FilterTag::Expiring]);
    }

    #[test]
    fn search_is_trimmed_and_tagged() {
        let state = apply_all(&[search("  Jordan  ")]);
        assert_eq!(state.search_query, "Jordan");
        assert_eq!(state.active_filters, vec![FilterTag::Search]);
        assert_eq!(state.chips(), vec!["\"Jordan\"".to_string()]);
    }

    #[test]
    fn blank_search_clears_query_and_restores_all() {
        let state = apply_all(&[search("Jordan"), search("   ")]);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn blank_search_keeps_other_filters() {
        let state = apply_all(&[search("Jordan"), FilterEvent::PartTime, search("")]);
        assert_eq!(state.search_query, "");
        assert_eq!(state.active_filters, vec![FilterTag::PartTime]);
    }

    #[test]
    fn all_resets_everything() {
        let state = apply_all(&[
            search("x"),
            FilterEvent::Expiring,
            FilterEvent::FullTime,
            FilterEvent::All,
        ]);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn chips_follow_activation_order() {
        let state = apply_all(&[FilterEvent::Expiring, FilterEvent::PartTime, search("Kim")]);
        assert_eq!(
            state.chips(),
            vec![
                "expiring".to_string(),
                "part time".to_string(),
                "\"Kim\"".to_string()
            ]
        );
    }

    #[test]
    fn contract_kind_maps_tri_state() {
        assert_eq!(FilterState::default().contract_kind(), None);
        let full = apply_all(&[FilterEvent::FullTime]);
        assert_eq!(full.contract_kind(), Some(ContractKind::FullTime));
        let part = apply_all(&[FilterEvent::PartTime]);
        assert_eq!(part.contract_kind(), Some(ContractKind::PartTime));
    }

    /// Exhaustive walk over every event sequence up to length 5: `All` tracks
    /// the predicates and full-time/part-time never coexist.
    #[test]
    fn tag_invariants_hold_for_all_short_sequences() {
        let events = [
            FilterEvent::All,
            FilterEvent::Expiring,
            FilterEvent::FullTime,
            FilterEvent::PartTime,
            search("Jordan"),
            search(" "),
        ];
        let mut frontier = vec![FilterState::default()];
        for _ in 0..5 {
            let mut next_frontier = Vec::new();
            for state in &frontier {
                for event in &events {
                    let next = reduce_filters(state, event);
                    assert!(!next.active_filters.is_empty());
                    assert_eq!(next.is_active(FilterTag::All), next.is_unfiltered());
                    assert!(
                        !(next.is_active(FilterTag::FullTime)
                            && next.is_active(FilterTag::PartTime))
                    );
                    assert_eq!(
                        next.is_active(FilterTag::FullTime),
                        next.is_full_time == Some(true)
                    );
                    assert_eq!(
                        next.is_active(FilterTag::PartTime),
                        next.is_full_time == Some(false)
                    );
                    next_frontier.push(next);
                }
            }
            next_frontier.dedup();
            frontier = next_frontier;
        }
    }
}
