//! Root application state.
//!
//! `Dashboard` exclusively owns the registry, the shared selection, the list
//! filter, the map mode, the toast slot and the session. Views read through
//! the accessor methods and change state only through the entry points below
//! (or the equivalent [`Action`] passed to [`Dashboard::dispatch`]).

use crate::filter::{self, FilterChoice, FilterCriteria, StatusCounts};
use crate::geometry::Point;
use crate::notification::{Notification, NotificationQueue};
use crate::overlay::{DisplayMode, MapView};
use crate::registry::Registry;
use crate::selection::{Selection, SelectionSource};
use crate::session::{self, LoginError, LoginForm, LoginRequest, Role, Session, User};
use crate::workflow::{self, Transition};
use crate::{Issue, IssueStatus, IssueType, Zone};
use std::time::Instant;
use tracing::{debug, info};

/// Pin hit radius in map units.
pub const PIN_HIT_RADIUS: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select {
        id: String,
        source: SelectionSource,
    },
    Back,
    ClickZone(String),
    ClickMap(Point),
    SetStatus {
        id: String,
        status: IssueStatus,
    },
    SetStatusFilter(FilterChoice<IssueStatus>),
    SetTypeFilter(FilterChoice<IssueType>),
    SetSearch(String),
    SetMode(DisplayMode),
    ToggleMode,
    SubmitLogin(LoginForm),
    CompleteLogin(Role),
    Logout,
}

/// Work the front end has to carry out on the core's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Wait `request.delay`, then dispatch [`Action::CompleteLogin`].
    ScheduleLogin(LoginRequest),
    LoginRejected(LoginError),
}

/// What the right-hand panel shows.
#[derive(Debug)]
pub enum Panel<'a> {
    Detail(&'a Issue),
    List(Vec<&'a Issue>),
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    registry: Registry,
    selection: Selection,
    criteria: FilterCriteria,
    mode: DisplayMode,
    notifications: NotificationQueue,
    session: Session,
    revision: u64,
}

impl Dashboard {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            selection: Selection::default(),
            criteria: FilterCriteria::default(),
            mode: DisplayMode::default(),
            notifications: NotificationQueue::default(),
            session: Session::default(),
            revision: 0,
        }
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) -> Option<Effect> {
        match action {
            Action::Select { id, source } => {
                self.select_issue(&id, source);
            }
            Action::Back => {
                self.back();
            }
            Action::ClickZone(zone_id) => {
                self.click_zone(&zone_id, now);
            }
            Action::ClickMap(point) => {
                self.click_map(point, now);
            }
            Action::SetStatus { id, status } => {
                self.change_status(&id, status, now);
            }
            Action::SetStatusFilter(choice) => self.set_status_filter(choice),
            Action::SetTypeFilter(choice) => self.set_type_filter(choice),
            Action::SetSearch(term) => self.set_search(term),
            Action::SetMode(mode) => self.set_mode(mode),
            Action::ToggleMode => self.set_mode(self.mode.toggle()),
            Action::SubmitLogin(form) => {
                return Some(match self.submit_login(&form) {
                    Ok(request) => Effect::ScheduleLogin(request),
                    Err(err) => Effect::LoginRejected(err),
                });
            }
            Action::CompleteLogin(role) => {
                self.complete_login(role, now);
            }
            Action::Logout => {
                self.logout(now);
            }
        }
        None
    }

    /// Pin or row activation. Ids missing from the registry are ignored so
    /// the selection only ever names a live issue.
    pub fn select_issue(&mut self, id: &str, source: SelectionSource) -> bool {
        if !self.registry.contains_issue(id) {
            debug!(issue_id = id, %source, "selection of unknown issue ignored");
            return false;
        }
        let changed = self.selection.select(Some(id));
        if changed {
            debug!(issue_id = id, %source, "selection changed");
            self.bump();
        }
        changed
    }

    /// "Back to list": drops the selection.
    pub fn back(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            debug!(source = %SelectionSource::Back, "selection cleared");
            self.bump();
        }
        changed
    }

    /// Zone click: announces the zone, never touches selection or filters.
    pub fn click_zone(&mut self, zone_id: &str, now: Instant) -> Option<&Zone> {
        let index = self
            .registry
            .zones()
            .iter()
            .position(|zone| zone.id == zone_id)?;
        let message = format!("'{}' 구역이 선택되었습니다.", self.registry.zones()[index].name);
        self.notifications.push(message, now);
        self.bump();
        self.registry.zones().get(index)
    }

    /// Resolves a click at a map point: a pin (live mode only) wins over the
    /// zone underneath it.
    pub fn click_map(&mut self, point: Point, now: Instant) -> bool {
        if self.mode == DisplayMode::Live {
            let hit = self
                .registry
                .issue_near(point, PIN_HIT_RADIUS)
                .map(|issue| issue.id.clone());
            if let Some(id) = hit {
                self.select_issue(&id, SelectionSource::MapPin);
                return true;
            }
        }
        let zone_id = self.registry.zone_at(point).map(|zone| zone.id.clone());
        match zone_id {
            Some(zone_id) => self.click_zone(&zone_id, now).is_some(),
            None => false,
        }
    }

    /// Detail-panel status control. Every attempt on a known issue writes
    /// the registry and pushes exactly one notification, even when the
    /// status is unchanged.
    pub fn change_status(
        &mut self,
        id: &str,
        status: IssueStatus,
        now: Instant,
    ) -> Option<Transition> {
        let transition = workflow::transition(&mut self.registry, id, status)?;
        self.notifications.push(transition.notice(), now);
        self.bump();
        Some(transition)
    }

    pub fn set_status_filter(&mut self, choice: FilterChoice<IssueStatus>) {
        if self.criteria.status != choice {
            self.criteria.status = choice;
            self.bump();
        }
    }

    pub fn set_type_filter(&mut self, choice: FilterChoice<IssueType>) {
        if self.criteria.issue_type != choice {
            self.criteria.issue_type = choice;
            self.bump();
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.criteria.search != term {
            self.criteria.search = term;
            self.bump();
        }
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode != mode {
            debug!(mode = %mode, "map display mode changed");
            self.mode = mode;
            self.bump();
        }
    }

    pub fn submit_login(&self, form: &LoginForm) -> Result<LoginRequest, LoginError> {
        form.submit()
    }

    pub fn complete_login(&mut self, role: Role, now: Instant) -> &User {
        info!(role = %role, "login completed");
        self.notifications.push(session::login_notice(role), now);
        self.bump();
        self.session.login(role)
    }

    pub fn logout(&mut self, now: Instant) -> bool {
        let Some(user) = self.session.logout() else {
            return false;
        };
        info!(role = %user.role, "logged out");
        self.notifications.push(session::LOGOUT_NOTICE, now);
        self.bump();
        true
    }

    /// Advances timers; returns true when the visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let hidden = self.notifications.poll(now);
        if hidden {
            self.bump();
        }
        hidden
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.notifications.next_deadline()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.selection.resolve(&self.registry)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered_issues(&self) -> Vec<&Issue> {
        filter::apply(self.registry.issues(), &self.criteria)
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_issues(self.registry.issues())
    }

    pub fn panel(&self) -> Panel<'_> {
        match self.selected_issue() {
            Some(issue) => Panel::Detail(issue),
            None => Panel::List(self.filtered_issues()),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn map_view(&self) -> MapView<'_> {
        MapView::build(&self.registry, &self.selection, self.mode)
    }

    pub fn notification(&self) -> &Notification {
        self.notifications.current()
    }

    pub fn visible_notification(&self) -> Option<&str> {
        self.notifications.visible_message()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
