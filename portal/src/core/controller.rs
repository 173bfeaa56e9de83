//! Employee list controller: filters + pagination + fetch lifecycle.
//!
//! All transitions go through [`reduce_list`] (or [`ListController::apply`],
//! its in-place form). The controller never performs I/O. It hands back a
//! [`FetchTicket`] describing the request to dispatch, and later accepts the
//! outcome tagged with that same ticket. Outcomes for any other ticket are
//! superseded and dropped without touching state.

use crate::core::filter::{FilterEvent, FilterState, reduce_filters};
use crate::core::pagination::{PaginationState, PaginationView, estimate_total_pages};
use crate::core::types::{Employee, EmployeeQuery, Notice};

/// Identifies one dispatched fetch: a sequence number plus the exact
/// filter/page combination it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: EmployeeQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    /// Not mounted yet; nothing requested.
    Idle,
    Loading,
    Error(String),
    /// First page came back with no rows.
    Empty,
    Populated(Vec<Employee>),
}

impl RenderState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RenderState::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    Mount,
    Filter(FilterEvent),
    GoToPage(u32),
    NextPage,
    PreviousPage,
    /// Re-fetch the current filter/page, e.g. after a create or delete.
    Refresh,
    FetchSucceeded {
        ticket: FetchTicket,
        items: Vec<Employee>,
    },
    FetchFailed {
        ticket: FetchTicket,
        message: String,
    },
}

/// Side effects requested by one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Request to dispatch; supersedes any fetch still in flight.
    pub fetch: Option<FetchTicket>,
    pub notice: Option<Notice>,
    /// The event was a fetch outcome for a superseded ticket.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListController {
    filters: FilterState,
    pagination: PaginationState,
    render: RenderState,
    in_flight: Option<FetchTicket>,
    next_seq: u64,
}

impl ListController {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: FilterState::default(),
            pagination: PaginationState::new(page_size),
            render: RenderState::Idle,
            in_flight: None,
            next_seq: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn render(&self) -> &RenderState {
        &self.render
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    pub fn pagination_view(&self) -> PaginationView {
        PaginationView::new(&self.pagination, self.render.is_loading())
    }

    /// Request parameters for the current filter/page combination.
    pub fn query(&self) -> EmployeeQuery {
        self.filters
            .query(self.pagination.current_page, self.pagination.page_size)
    }

    /// Apply one event in place.
    pub fn apply(&mut self, event: ListEvent) -> Step {
        match event {
            ListEvent::Mount | ListEvent::Refresh => self.issue_fetch(),
            ListEvent::Filter(filter_event) => {
                self.filters = reduce_filters(&self.filters, &filter_event);
                self.pagination.reset();
                self.issue_fetch()
            }
            ListEvent::GoToPage(page) => self.go_to_page(page),
            ListEvent::NextPage => self.go_to_page(self.pagination.current_page + 1),
            ListEvent::PreviousPage => {
                self.go_to_page(self.pagination.current_page.saturating_sub(1))
            }
            ListEvent::FetchSucceeded { ticket, items } => {
                if !self.accepts(&ticket) {
                    return Step::stale();
                }
                self.in_flight = None;
                let estimate = estimate_total_pages(
                    ticket.query.page,
                    self.pagination.page_size,
                    items.len(),
                );
                self.pagination.estimated_total_pages = estimate.estimated_total_pages;
                if let Some(page) = estimate.step_back_to {
                    self.pagination.current_page = page;
                    return self.issue_fetch();
                }
                self.render = if items.is_empty() {
                    RenderState::Empty
                } else {
                    RenderState::Populated(items)
                };
                Step::default()
            }
            ListEvent::FetchFailed { ticket, message } => {
                if !self.accepts(&ticket) {
                    return Step::stale();
                }
                self.in_flight = None;
                self.render = RenderState::Error(message.clone());
                Step {
                    notice: Some(Notice::error(message)),
                    ..Step::default()
                }
            }
        }
    }

    fn go_to_page(&mut self, page: u32) -> Step {
        let out_of_range = page == 0 || page > self.pagination.estimated_total_pages;
        if out_of_range || page == self.pagination.current_page {
            return Step::default();
        }
        self.pagination.current_page = page;
        self.issue_fetch()
    }

    fn issue_fetch(&mut self) -> Step {
        let ticket = FetchTicket {
            seq: self.next_seq,
            query: self.query(),
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket.clone());
        self.render = RenderState::Loading;
        Step {
            fetch: Some(ticket),
            ..Step::default()
        }
    }

    fn accepts(&self, ticket: &FetchTicket) -> bool {
        self.in_flight.as_ref() == Some(ticket)
    }
}

impl Step {
    fn stale() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }
}

/// Pure form of [`ListController::apply`]: `(state, event) -> (state, step)`.
pub fn reduce_list(state: &ListController, event: ListEvent) -> (ListController, Step) {
    let mut next = state.clone();
    let step = next.apply(event);
    (next, step)
}
