use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, widgets::TableState};
use std::time::Instant;
use tracing::debug;
use wasteops_core::dashboard::PIN_HIT_RADIUS;
use wasteops_core::geometry::{Point, MAP_EXTENT};
use wasteops_core::{
    Action, Dashboard, DisplayMode, Effect, IssueStatus, IssueType, LoginForm, Panel, Role,
    SelectionSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusMode {
    #[default]
    Map,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Account,
    Password,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::Account => LoginField::Password,
            LoginField::Password => LoginField::Account,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginModal {
    pub form: LoginForm,
    pub field: LoginField,
    pub error: Option<String>,
    /// Accepted and waiting for the simulated delay to elapse.
    pub pending: bool,
}

pub struct App {
    pub dashboard: Dashboard,
    pub focus: FocusMode,
    pub searching: bool,
    pub login: Option<LoginModal>,
    pub show_help: bool,
    pub table_state: TableState,
    pub zone_cursor: usize,
    pub hovered_pin: Option<String>,
    pub status_note: Option<String>,
    pub map_area: Option<Rect>,
    pub panel_area: Option<Rect>,
    pub list_area: Option<Rect>,
    pub status_option_areas: Vec<(IssueStatus, Rect)>,
    pub back_area: Option<Rect>,
    pub should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let mut table_state = TableState::default();
        if !dashboard.filtered_issues().is_empty() {
            table_state.select(Some(0));
        }
        Self {
            dashboard,
            focus: FocusMode::default(),
            searching: false,
            login: None,
            show_help: false,
            table_state,
            zone_cursor: 0,
            hovered_pin: None,
            status_note: None,
            map_area: None,
            panel_area: None,
            list_area: None,
            status_option_areas: Vec::new(),
            back_area: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.dashboard.tick(now)
    }

    /// Called once per frame before the panels record their hit areas.
    pub fn update_layout(&mut self, map_area: Rect, panel_area: Rect) {
        self.map_area = Some(map_area);
        self.panel_area = Some(panel_area);
        self.list_area = None;
        self.status_option_areas.clear();
        self.back_area = None;
    }

    pub fn complete_login(&mut self, role: Role, now: Instant) {
        self.dashboard.dispatch(Action::CompleteLogin(role), now);
        self.login = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Effect> {
        if self.login.is_some() {
            return self.handle_login_key(key, now);
        }
        if self.searching {
            self.handle_search_key(key, now);
            return None;
        }
        if self.show_help && matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.show_help = false;
            return None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    FocusMode::Map => FocusMode::Panel,
                    FocusMode::Panel => FocusMode::Map,
                };
            }
            KeyCode::Char('v') => {
                self.hovered_pin = None;
                self.dispatch(Action::ToggleMode, now);
                self.status_note = Some(format!("지도 모드: {}", self.dashboard.mode().label()));
            }
            KeyCode::Char('f') => {
                let next = self.dashboard.criteria().status.cycle(&IssueStatus::ALL);
                self.dispatch(Action::SetStatusFilter(next), now);
            }
            KeyCode::Char('t') => {
                let next = self.dashboard.criteria().issue_type.cycle(&IssueType::ALL);
                self.dispatch(Action::SetTypeFilter(next), now);
            }
            KeyCode::Char('/') => {
                self.dispatch(Action::Back, now);
                self.focus = FocusMode::Panel;
                self.searching = true;
            }
            KeyCode::Char('L') => self.open_login(),
            KeyCode::Char('O') => {
                if !self.dashboard.session().is_logged_in() {
                    self.status_note = Some("로그인 상태가 아닙니다.".to_string());
                }
                self.dispatch(Action::Logout, now);
            }
            KeyCode::Char(digit @ '1'..='3') => {
                let status = match digit {
                    '1' => IssueStatus::Received,
                    '2' => IssueStatus::InProgress,
                    _ => IssueStatus::Completed,
                };
                self.set_selected_status(status, now);
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.dispatch(Action::Back, now);
            }
            KeyCode::Up | KeyCode::Char('k') => match self.focus {
                FocusMode::Map => self.move_zone_cursor(-1),
                FocusMode::Panel => self.move_selection(-1),
            },
            KeyCode::Down | KeyCode::Char('j') => match self.focus {
                FocusMode::Map => self.move_zone_cursor(1),
                FocusMode::Panel => self.move_selection(1),
            },
            KeyCode::Left | KeyCode::Char('h') if self.focus == FocusMode::Map => {
                self.cycle_pin(-1, now);
            }
            KeyCode::Right | KeyCode::Char('l') if self.focus == FocusMode::Map => {
                self.cycle_pin(1, now);
            }
            KeyCode::Enter => match self.focus {
                FocusMode::Map => self.click_zone_at_cursor(now),
                FocusMode::Panel => self.activate_row(now),
            },
            _ => {}
        }
        None
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        if self.login.is_some() {
            return;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_left_click(event.column, event.row, now);
            }
            MouseEventKind::Moved => {
                self.update_hover(event.column, event.row);
            }
            MouseEventKind::ScrollUp => {
                self.move_selection(-1);
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(1);
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, action: Action, now: Instant) -> Option<Effect> {
        let effect = self.dashboard.dispatch(action, now);
        self.clamp_cursor();
        effect
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        let mut term = self.dashboard.criteria().search.clone();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.searching = false;
                return;
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                term.clear();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                term.push(c);
            }
            _ => return,
        }
        self.dispatch(Action::SetSearch(term), now);
        if self.table_state.selected().is_some() {
            self.table_state.select(Some(0));
        }
    }

    fn open_login(&mut self) {
        if let Some(user) = self.dashboard.session().user() {
            self.status_note = Some(format!("이미 {}(으)로 로그인되어 있습니다.", user.name));
            return;
        }
        self.login = Some(LoginModal::default());
    }

    fn handle_login_key(&mut self, key: KeyEvent, now: Instant) -> Option<Effect> {
        let modal = self.login.as_mut()?;
        if modal.pending {
            return None;
        }
        match key.code {
            KeyCode::Esc => {
                self.login = None;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                modal.field = modal.field.next();
            }
            KeyCode::Left | KeyCode::Right => {
                modal.form.role = modal.form.role.toggle();
                modal.error = None;
            }
            KeyCode::Backspace => {
                login_field_mut(modal).pop();
            }
            KeyCode::Enter => {
                let form = modal.form.clone();
                match self.dashboard.dispatch(Action::SubmitLogin(form), now) {
                    Some(Effect::ScheduleLogin(request)) => {
                        modal.pending = true;
                        modal.error = None;
                        debug!(role = %request.role, "login accepted; waiting");
                        return Some(Effect::ScheduleLogin(request));
                    }
                    Some(Effect::LoginRejected(err)) => {
                        modal.error = Some(err.to_string());
                    }
                    None => {}
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                login_field_mut(modal).push(c);
            }
            _ => {}
        }
        None
    }

    fn set_selected_status(&mut self, status: IssueStatus, now: Instant) {
        let Some(id) = self.dashboard.selection().current().map(str::to_string) else {
            self.status_note = Some("상태를 바꿀 민원을 먼저 선택하세요.".to_string());
            return;
        };
        self.dispatch(Action::SetStatus { id, status }, now);
    }

    fn move_selection(&mut self, delta: isize) {
        if !matches!(self.dashboard.panel(), Panel::List(_)) {
            return;
        }
        let len = self.dashboard.filtered_issues().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    fn clamp_cursor(&mut self) {
        let len = self.dashboard.filtered_issues().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(idx) if idx >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn activate_row(&mut self, now: Instant) {
        if !matches!(self.dashboard.panel(), Panel::List(_)) {
            return;
        }
        let Some(idx) = self.table_state.selected() else {
            return;
        };
        let id = self
            .dashboard
            .filtered_issues()
            .get(idx)
            .map(|issue| issue.id.clone());
        if let Some(id) = id {
            self.dispatch(
                Action::Select {
                    id,
                    source: SelectionSource::ListRow,
                },
                now,
            );
        }
    }

    fn move_zone_cursor(&mut self, delta: isize) {
        let len = self.dashboard.registry().zones().len();
        if len == 0 {
            return;
        }
        self.zone_cursor = (self.zone_cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    pub fn cursor_zone_id(&self) -> Option<&str> {
        self.dashboard
            .registry()
            .zones()
            .get(self.zone_cursor)
            .map(|zone| zone.id.as_str())
    }

    fn click_zone_at_cursor(&mut self, now: Instant) {
        if let Some(zone_id) = self.cursor_zone_id().map(str::to_string) {
            self.dispatch(Action::ClickZone(zone_id), now);
        }
    }

    /// Steps the selection through the pins in registry order.
    fn cycle_pin(&mut self, delta: isize, now: Instant) {
        if self.dashboard.mode() != DisplayMode::Live {
            self.status_note = Some("분석 모드에서는 민원 핀이 표시되지 않습니다.".to_string());
            return;
        }
        let ids: Vec<String> = self
            .dashboard
            .registry()
            .issues()
            .iter()
            .map(|issue| issue.id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }
        let len = ids.len() as isize;
        let current = self
            .dashboard
            .selection()
            .current()
            .and_then(|id| ids.iter().position(|candidate| candidate == id));
        let next = match current {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None if delta >= 0 => 0,
            None => ids.len() - 1,
        };
        self.dispatch(
            Action::Select {
                id: ids[next].clone(),
                source: SelectionSource::MapPin,
            },
            now,
        );
    }

    fn handle_left_click(&mut self, column: u16, row: u16, now: Instant) {
        if let Some(area) = self.map_area {
            if contains(area, column, row) {
                self.focus = FocusMode::Map;
                if let Some(point) = map_point(area, column, row) {
                    self.dispatch(Action::ClickMap(point), now);
                }
                return;
            }
        }

        let option = self
            .status_option_areas
            .iter()
            .find(|(_, area)| contains(*area, column, row))
            .map(|(status, _)| *status);
        if let Some(status) = option {
            self.focus = FocusMode::Panel;
            self.set_selected_status(status, now);
            return;
        }

        if let Some(area) = self.back_area {
            if contains(area, column, row) {
                self.focus = FocusMode::Panel;
                self.dispatch(Action::Back, now);
                return;
            }
        }

        if let Some(area) = self.list_area {
            if contains(area, column, row) {
                self.focus = FocusMode::Panel;
                if let Some(idx) = self.row_from_coords(area, column, row) {
                    if idx < self.dashboard.filtered_issues().len() {
                        self.table_state.select(Some(idx));
                        self.activate_row(now);
                    }
                }
                return;
            }
        }

        if let Some(area) = self.panel_area {
            if contains(area, column, row) {
                self.focus = FocusMode::Panel;
            }
        }
    }

    fn update_hover(&mut self, column: u16, row: u16) {
        let point = self
            .map_area
            .filter(|_| self.dashboard.mode() == DisplayMode::Live)
            .and_then(|area| map_point(area, column, row));
        self.hovered_pin = point.and_then(|point| {
            self.dashboard
                .registry()
                .issue_near(point, PIN_HIT_RADIUS)
                .map(|issue| issue.id.clone())
        });
    }

    fn row_from_coords(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        if !contains(area, column, row) {
            return None;
        }

        let header_height = 2u16;
        if area.height <= header_height + 1 {
            return None;
        }

        let data_start = area.y.saturating_add(header_height);
        let data_end = area.y.saturating_add(area.height.saturating_sub(1));
        if row < data_start || row >= data_end {
            return None;
        }

        let row_index = (row - data_start) as usize;
        Some(self.table_state.offset() + row_index)
    }
}

fn login_field_mut(modal: &mut LoginModal) -> &mut String {
    match modal.field {
        LoginField::Account => &mut modal.form.account,
        LoginField::Password => &mut modal.form.password,
    }
}

/// Terminal cell to map coordinates. `area` is the bordered map block; the
/// canvas fills its inner area and samples the centre of each cell.
pub fn map_point(area: Rect, column: u16, row: u16) -> Option<Point> {
    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.width == 0 || inner.height == 0 || !contains(inner, column, row) {
        return None;
    }
    let x = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width) * MAP_EXTENT;
    let y = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height) * MAP_EXTENT;
    Some(Point::new(x, y))
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasteops_core::{seed, FilterChoice};

    // 100x50 inner canvas: one column per map unit, one row per two.
    const MAP: Rect = Rect {
        x: 0,
        y: 0,
        width: 102,
        height: 52,
    };

    fn app() -> App {
        let mut app = App::new(Dashboard::new(seed::builtin().expect("seed")));
        app.update_layout(
            MAP,
            Rect {
                x: 102,
                y: 0,
                width: 60,
                height: 52,
            },
        );
        app
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> Option<Effect> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn cell_for(point: Point) -> (u16, u16) {
        (1 + point.x as u16, 1 + (point.y / 2.0) as u16)
    }

    #[test]
    fn map_point_samples_cell_centres() {
        let point = map_point(MAP, 1, 1).expect("inside");
        assert!((point.x - 0.5).abs() < 1e-9);
        assert!((point.y - 1.0).abs() < 1e-9);
        assert!(map_point(MAP, 0, 10).is_none());
        assert!(map_point(MAP, 101, 10).is_none());
    }

    #[test]
    fn status_filter_key_cycles_and_clamps_cursor() {
        let now = Instant::now();
        let mut app = app();
        app.table_state.select(Some(12));

        press(&mut app, KeyCode::Char('f'), now);
        assert_eq!(
            app.dashboard.criteria().status,
            FilterChoice::Only(IssueStatus::Received)
        );
        press(&mut app, KeyCode::Char('f'), now);
        assert_eq!(app.dashboard.filtered_issues().len(), 3);
        assert_eq!(app.table_state.selected(), Some(2));

        for _ in 0..2 {
            press(&mut app, KeyCode::Char('f'), now);
        }
        assert_eq!(app.dashboard.criteria().status, FilterChoice::All);
    }

    #[test]
    fn enter_opens_detail_and_escape_returns() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Tab, now);
        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.dashboard.selection().current(), Some("ISS-2023-002"));

        press(&mut app, KeyCode::Char('3'), now);
        assert_eq!(
            app.dashboard
                .registry()
                .issue("ISS-2023-002")
                .map(|issue| issue.status),
            Some(IssueStatus::Completed)
        );
        assert!(app
            .dashboard
            .visible_notification()
            .is_some_and(|message| message.contains("ISS-2023-002")));

        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.dashboard.selection().current(), None);
    }

    #[test]
    fn search_mode_edits_the_term() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Char('/'), now);
        assert!(app.searching);
        type_text(&mut app, "효자", now);
        assert_eq!(app.dashboard.filtered_issues().len(), 2);
        // 'q' is text while searching.
        press(&mut app, KeyCode::Char('q'), now);
        assert!(!app.should_quit());
        assert!(app.dashboard.filtered_issues().is_empty());
        press(&mut app, KeyCode::Backspace, now);
        press(&mut app, KeyCode::Enter, now);
        assert!(!app.searching);
        assert_eq!(app.dashboard.criteria().search, "효자");
    }

    #[test]
    fn clicking_a_pin_selects_it() {
        let now = Instant::now();
        let mut app = app();
        let target = app
            .dashboard
            .registry()
            .issue("ISS-2023-011")
            .map(|issue| issue.position())
            .expect("seed issue");
        let (column, row) = cell_for(target);
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), column, row), now);
        assert_eq!(app.dashboard.selection().current(), Some("ISS-2023-011"));
        assert_eq!(app.focus, FocusMode::Map);
    }

    #[test]
    fn clicking_a_zone_in_prediction_mode_announces_it() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Char('v'), now);
        assert_eq!(app.dashboard.mode(), DisplayMode::Prediction);

        let pin = app
            .dashboard
            .registry()
            .issue("ISS-2023-011")
            .map(|issue| issue.position())
            .expect("seed issue");
        let (column, row) = cell_for(pin);
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), column, row), now);
        assert_eq!(app.dashboard.selection().current(), None);
        assert!(app
            .dashboard
            .visible_notification()
            .is_some_and(|message| message.contains("구역이 선택되었습니다")));
    }

    #[test]
    fn hover_tracks_pins_in_live_mode_only() {
        let now = Instant::now();
        let mut app = app();
        let pin = app
            .dashboard
            .registry()
            .issue("ISS-2023-007")
            .map(|issue| issue.position())
            .expect("seed issue");
        let (column, row) = cell_for(pin);
        app.handle_mouse(mouse(MouseEventKind::Moved, column, row), now);
        assert_eq!(app.hovered_pin.as_deref(), Some("ISS-2023-007"));

        press(&mut app, KeyCode::Char('v'), now);
        app.handle_mouse(mouse(MouseEventKind::Moved, column, row), now);
        assert_eq!(app.hovered_pin, None);
    }

    #[test]
    fn status_option_click_changes_status() {
        let now = Instant::now();
        let mut app = app();
        app.dashboard
            .select_issue("ISS-2023-005", SelectionSource::ListRow);
        let option = Rect {
            x: 104,
            y: 20,
            width: 20,
            height: 1,
        };
        app.status_option_areas.push((IssueStatus::InProgress, option));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 110, 20), now);
        assert_eq!(
            app.dashboard
                .registry()
                .issue("ISS-2023-005")
                .map(|issue| issue.status),
            Some(IssueStatus::InProgress)
        );
    }

    #[test]
    fn arrow_keys_cycle_pins_on_the_map() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Right, now);
        assert_eq!(app.dashboard.selection().current(), Some("ISS-2023-001"));
        press(&mut app, KeyCode::Left, now);
        assert_eq!(app.dashboard.selection().current(), Some("ISS-2023-013"));
    }

    #[test]
    fn enter_on_map_announces_cursor_zone() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::Enter, now);
        let zone = app.dashboard.registry().zones()[1].name.clone();
        assert_eq!(
            app.dashboard.visible_notification(),
            Some(format!("'{zone}' 구역이 선택되었습니다.").as_str())
        );
    }

    #[test]
    fn login_flow_requires_both_fields() {
        let now = Instant::now();
        let mut app = app();
        press(&mut app, KeyCode::Char('L'), now);
        assert!(app.login.is_some());

        assert_eq!(press(&mut app, KeyCode::Enter, now), None);
        assert!(app
            .login
            .as_ref()
            .and_then(|modal| modal.error.as_deref())
            .is_some());

        type_text(&mut app, "officer", now);
        press(&mut app, KeyCode::Tab, now);
        type_text(&mut app, "pw", now);
        let effect = press(&mut app, KeyCode::Enter, now);
        let Some(Effect::ScheduleLogin(request)) = effect else {
            panic!("expected scheduled login, got {effect:?}");
        };
        assert_eq!(request.role, Role::Manager);
        assert!(app.login.as_ref().is_some_and(|modal| modal.pending));

        app.complete_login(request.role, now);
        assert!(app.login.is_none());
        assert!(app.dashboard.session().is_logged_in());
        assert_eq!(
            app.dashboard.visible_notification(),
            Some("관리자 계정으로 로그인되었습니다.")
        );

        press(&mut app, KeyCode::Char('O'), now);
        assert!(!app.dashboard.session().is_logged_in());
        assert_eq!(app.dashboard.visible_notification(), Some("로그아웃 되었습니다."));
    }

    #[test]
    fn list_click_selects_row() {
        let now = Instant::now();
        let mut app = app();
        app.list_area = Some(Rect {
            x: 102,
            y: 10,
            width: 60,
            height: 20,
        });
        // Border and header occupy rows 10 and 11; the third data row is at 14.
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 120, 14), now);
        assert_eq!(app.dashboard.selection().current(), Some("ISS-2023-003"));
        assert_eq!(app.focus, FocusMode::Panel);
    }
}
