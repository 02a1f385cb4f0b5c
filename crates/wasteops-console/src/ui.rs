use crate::state::{App, FocusMode, LoginField};
use crate::theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap,
    },
    Frame,
};
use wasteops_core::dashboard::PIN_HIT_RADIUS;
use wasteops_core::geometry::{Polygon, MAP_EXTENT};
use wasteops_core::{
    DisplayMode, FilterChoice, Issue, IssueStatus, PinTone, PredictionLevel, Role,
};

const TITLE: &str = "춘천, 다시봄 · 생활폐기물 민원 관제";
const FILL_STEP_X: f64 = 0.5;
const FILL_STEP_Y: f64 = 1.0;

/// Fixed map landmarks: (label, x, y).
const LANDMARKS: [(&str, f64, f64); 2] = [("춘천시청", 45.0, 50.0), ("춘천역", 15.0, 50.0)];
/// Soyang bridge between the north bank and the city.
const BRIDGE: ((f64, f64), (f64, f64)) = ((60.0, 32.0), (60.0, 40.0));

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(outer[1]);

    app.update_layout(body[0], body[1]);
    render_header(f, app, outer[0]);
    render_map(f, app, body[0]);
    render_panel(f, app, body[1]);
    render_footer(f, app, outer[2]);

    if let Some(message) = app.dashboard.visible_notification() {
        render_toast(f, message, area);
    }
    if app.show_help {
        render_help(f, area);
    }
    if app.login.is_some() {
        render_login(f, app, area);
    }
}

fn focus_border(app: &App, focus: FocusMode) -> Style {
    if app.focus == focus {
        Style::default().fg(theme::FOCUS_BORDER)
    } else {
        Style::default()
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let user = match app.dashboard.session().user() {
        Some(user) => Span::styled(
            format!(
                "{} ({}) · {} 로그인",
                user.name,
                user.role.label(),
                user.logged_in_at.format("%H:%M")
            ),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("로그인 필요 (L)", Style::default().fg(theme::MUTED)),
    };
    let mode = app.dashboard.mode();
    let mut spans = vec![
        Span::styled("사용자: ", Style::default().fg(theme::MUTED)),
        user,
        Span::raw("  |  "),
        Span::styled("지도: ", Style::default().fg(theme::MUTED)),
        Span::styled(mode.label(), mode_style(mode)),
    ];
    if let Some(note) = app.status_note.as_deref() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("최근 작업: {note}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(TITLE, theme::HEADER_STYLE)),
    );
    f.render_widget(header, area);
}

fn mode_style(mode: DisplayMode) -> Style {
    let color = match mode {
        DisplayMode::Live => Color::Rgb(0, 159, 227),
        DisplayMode::Prediction => Color::Rgb(147, 51, 234),
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = if app.searching {
        "검색어 입력 중: Enter/Esc 완료  Ctrl+U 지우기"
    } else {
        "Tab 포커스  j/k 이동  Enter 선택  ←/→ 핀  Esc 목록  1/2/3 상태  f/t 필터  / 검색  v 모드  L/O 로그인  ? 도움말  q 종료"
    };
    let p = Paragraph::new(Span::styled(hints, Style::default().fg(theme::MUTED)));
    f.render_widget(p, area);
}

fn flip(y: f64) -> f64 {
    MAP_EXTENT - y
}

/// Sample points covering the polygon interior, in canvas coordinates.
fn fill_points(polygon: &Polygon) -> Vec<(f64, f64)> {
    let (min, max) = polygon.bounds();
    let mut coords = Vec::new();
    let mut y = min.y;
    while y <= max.y {
        let mut x = min.x;
        while x <= max.x {
            let point = wasteops_core::geometry::Point::new(x, y);
            if polygon.contains(point) {
                coords.push((x, flip(y)));
            }
            x += FILL_STEP_X;
        }
        y += FILL_STEP_Y;
    }
    coords
}

fn render_map(f: &mut Frame, app: &App, area: Rect) {
    let view = app.dashboard.map_view();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(vec![
            Span::raw("지도 "),
            Span::styled(format!("[{}]", view.mode.label()), mode_style(view.mode)),
        ]))
        .border_style(focus_border(app, FocusMode::Map));
    let inner = block.inner(area);
    // Map units covered by one terminal column; used to centre labels.
    let unit_per_col = MAP_EXTENT / f64::from(inner.width.max(1));

    let fills: Vec<(Color, Vec<(f64, f64)>)> = view
        .zones
        .iter()
        .filter_map(|zone_view| {
            theme::zone_fill_color(zone_view.fill)
                .map(|color| (color, fill_points(&zone_view.zone.boundary)))
        })
        .collect();
    let cursor_zone = (app.focus == FocusMode::Map)
        .then(|| app.cursor_zone_id())
        .flatten();
    let hovered = app
        .hovered_pin
        .as_deref()
        .and_then(|id| app.dashboard.registry().issue(id));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, MAP_EXTENT])
        .y_bounds([0.0, MAP_EXTENT])
        .paint(|ctx| {
            for (color, coords) in &fills {
                ctx.draw(&Points {
                    coords,
                    color: *color,
                });
            }
            ctx.layer();

            for zone_view in &view.zones {
                let color = if cursor_zone == Some(zone_view.zone.id.as_str()) {
                    theme::FOCUS_BORDER
                } else {
                    theme::ZONE_OUTLINE
                };
                for (from, to) in zone_view.zone.boundary.edges() {
                    ctx.draw(&CanvasLine {
                        x1: from.x,
                        y1: flip(from.y),
                        x2: to.x,
                        y2: flip(to.y),
                        color,
                    });
                }
            }
            let ((bx1, by1), (bx2, by2)) = BRIDGE;
            ctx.draw(&CanvasLine {
                x1: bx1,
                y1: flip(by1),
                x2: bx2,
                y2: flip(by2),
                color: theme::LANDMARK,
            });
            ctx.layer();

            for pin in &view.pins {
                let position = pin.issue.position();
                let color = if pin.selected {
                    theme::SELECTION_RING
                } else {
                    theme::pin_color(pin.tone)
                };
                ctx.draw(&Circle {
                    x: position.x,
                    y: flip(position.y),
                    radius: 1.0,
                    color,
                });
                if pin.selected {
                    ctx.draw(&Circle {
                        x: position.x,
                        y: flip(position.y),
                        radius: PIN_HIT_RADIUS,
                        color: theme::SELECTION_RING,
                    });
                }
            }

            for zone_view in &view.zones {
                let anchor = zone_view.zone.label_anchor();
                let label = Line::from(Span::styled(
                    zone_view.zone.name.clone(),
                    Style::default()
                        .fg(theme::ZONE_LABEL)
                        .add_modifier(Modifier::BOLD),
                ));
                let half = label.width() as f64 * unit_per_col / 2.0;
                ctx.print(anchor.x - half, flip(anchor.y), label);
            }
            for (name, x, y) in LANDMARKS {
                let half = Line::from(name).width() as f64 * unit_per_col / 2.0;
                ctx.print(
                    x - half,
                    flip(y),
                    Line::from(Span::styled(name, Style::default().fg(theme::LANDMARK))),
                );
            }

            if let Some(issue) = hovered {
                let position = issue.position();
                let tooltip = Line::from(Span::styled(
                    format!(" {} ", issue.issue_type),
                    Style::default().bg(Color::Rgb(15, 23, 42)).fg(Color::White),
                ));
                let half = tooltip.width() as f64 * unit_per_col / 2.0;
                ctx.print(position.x - half, flip(position.y) + 6.0, tooltip);
            }
        });
    f.render_widget(canvas, area);

    render_legend(f, view.mode, inner);
}

fn render_legend(f: &mut Frame, mode: DisplayMode, map_inner: Rect) {
    let lines: Vec<Line> = match mode {
        DisplayMode::Live => [PinTone::Received, PinTone::InProgress, PinTone::Completed]
            .into_iter()
            .map(|tone| {
                Line::from(vec![
                    Span::styled(theme::icons::PIN, theme::pin_color(tone)),
                    Span::raw(" "),
                    Span::raw(theme::pin_legend(tone)),
                ])
            })
            .collect(),
        DisplayMode::Prediction => PredictionLevel::ALL
            .iter()
            .rev()
            .map(|level| {
                Line::from(vec![
                    Span::styled("■", theme::prediction_color(*level)),
                    Span::raw(" "),
                    Span::raw(level.as_str()),
                ])
            })
            .collect(),
    };
    let height = lines.len() as u16 + 2;
    let width = 14u16;
    if map_inner.width < width || map_inner.height < height {
        return;
    }
    let legend_area = Rect::new(
        map_inner.x + map_inner.width - width,
        map_inner.y + map_inner.height - height,
        width,
        height,
    );
    f.render_widget(Clear, legend_area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("범례")),
        legend_area,
    );
}

fn render_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    render_kpis(f, app, chunks[0]);

    if app.dashboard.selected_issue().is_some() {
        render_detail(f, app, chunks[1]);
    } else {
        render_list(f, app, chunks[1]);
    }
}

fn render_kpis(f: &mut Frame, app: &App, area: Rect) {
    let counts = app.dashboard.status_counts();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    let tiles = [
        ("오늘 접수", counts.received, Color::White),
        (
            "처리중",
            counts.in_progress,
            theme::status_color(IssueStatus::InProgress),
        ),
        (
            "완료",
            counts.completed,
            theme::status_color(IssueStatus::Completed),
        ),
    ];
    for ((label, count, color), cell) in tiles.into_iter().zip(cells.iter()) {
        let tile = Paragraph::new(Line::from(vec![
            Span::styled(format!("{label} "), Style::default().fg(theme::MUTED)),
            Span::styled(
                count.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(tile, *cell);
    }
}

fn render_list(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let criteria = app.dashboard.criteria();
    let search_text = if criteria.search.is_empty() && !app.searching {
        Span::styled("주소, 내용, 번호 검색... (/)", Style::default().fg(theme::MUTED))
    } else if app.searching {
        Span::raw(format!("{}_", criteria.search))
    } else {
        Span::raw(criteria.search.clone())
    };
    let search_border = if app.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("검색")
                .border_style(search_border),
        ),
        chunks[0],
    );

    let mut chips = vec![Span::styled("상태 ", Style::default().fg(theme::MUTED))];
    let status_options = std::iter::once(FilterChoice::All)
        .chain(IssueStatus::ALL.iter().copied().map(FilterChoice::Only));
    for option in status_options {
        let style = if option == criteria.status {
            theme::SELECTED_STYLE
        } else {
            Style::default().fg(theme::MUTED)
        };
        chips.push(Span::styled(format!(" {option} "), style));
    }
    chips.push(Span::styled("  유형 ", Style::default().fg(theme::MUTED)));
    let type_style = if criteria.issue_type == FilterChoice::All {
        Style::default().fg(theme::MUTED)
    } else {
        theme::SELECTED_STYLE
    };
    chips.push(Span::styled(format!(" {} ", criteria.issue_type), type_style));
    f.render_widget(Paragraph::new(Line::from(chips)), chunks[1]);

    let table_area = chunks[2];
    app.list_area = Some(table_area);
    let issues = app.dashboard.filtered_issues();
    let title = format!("민원 목록 ({}건)", issues.len());
    let border_style = focus_border(app, FocusMode::Panel);

    if issues.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);
        let inner = block.inner(table_area);
        f.render_widget(block, table_area);
        f.render_widget(
            Paragraph::new(Span::styled(
                "조건에 맞는 민원이 없습니다.",
                Style::default().fg(Color::Yellow),
            )),
            inner,
        );
        return;
    }

    let rows: Vec<Row> = issues
        .iter()
        .enumerate()
        .map(|(idx, issue)| issue_row(issue).style(theme::zebra_row_style(idx)))
        .collect();
    let widths = [
        Constraint::Length(8),
        Constraint::Length(2),
        Constraint::Length(13),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["상태", "P", "번호", "내용/위치"]).style(theme::HEADER_STYLE))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .highlight_style(theme::SELECTED_STYLE);

    f.render_stateful_widget(table, table_area, &mut app.table_state);
}

fn issue_row(issue: &Issue) -> Row<'static> {
    let status_color = theme::status_color(issue.status);
    Row::new(vec![
        Cell::from(Span::styled(
            format!("{} {}", theme::status_icon(issue.status), issue.status),
            status_color,
        )),
        Cell::from(Span::styled(
            theme::priority_icon(issue.priority),
            theme::priority_color(issue.priority),
        )),
        Cell::from(issue.id.clone()),
        Cell::from(Line::from(vec![
            Span::styled(
                format!("[{}] ", issue.issue_type),
                Style::default().fg(theme::MUTED),
            ),
            Span::raw(issue.address.clone()),
        ])),
    ])
}

fn render_detail(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("민원 상세")
        .border_style(focus_border(app, FocusMode::Panel));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(issue) = app.dashboard.selected_issue() else {
        return;
    };
    let control_height = IssueStatus::ALL.len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(control_height)])
        .split(inner);

    let mut lines = vec![
        Line::from(Span::styled(
            "← 목록으로 돌아가기 (Esc)",
            Style::default().fg(theme::MUTED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("[{}]", issue.status),
                Style::default()
                    .fg(theme::status_color(issue.status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(issue.id.clone(), Style::default().fg(theme::MUTED)),
        ]),
        Line::from(Span::styled(
            issue.issue_type.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(issue.description.clone()),
        Line::from(""),
        detail_field("위치", issue.address.clone()),
        detail_field("접수일", issue.reported_at.clone()),
    ];
    if let Some(expected) = &issue.expected_at {
        lines.push(detail_field("처리 예정", expected.clone()));
    }
    lines.push(Line::from(vec![
        Span::styled("우선순위: ", Style::default().fg(theme::MUTED)),
        Span::styled(
            issue.priority.to_string(),
            theme::priority_color(issue.priority),
        ),
    ]));
    lines.push(detail_field("담당", issue.manager_dept.clone()));

    let mut control = vec![Line::from(Span::styled(
        "[운영] 처리 상태 변경 (1/2/3)",
        Style::default().fg(Color::Blue),
    ))];
    let mut option_areas = Vec::with_capacity(IssueStatus::ALL.len());
    for (idx, status) in IssueStatus::ALL.iter().enumerate() {
        let marker = if *status == issue.status { "(●)" } else { "( )" };
        control.push(Line::from(vec![
            Span::raw(format!("{} {} ", marker, idx + 1)),
            Span::styled(status.control_label(), theme::status_color(*status)),
        ]));
        option_areas.push((
            *status,
            Rect::new(
                chunks[1].x,
                chunks[1].y + 1 + idx as u16,
                chunks[1].width,
                1,
            ),
        ));
    }
    control.push(Line::from(Span::styled(
        "* 상태 변경 시 민원인에게 알림톡이 발송됩니다.",
        Style::default().fg(theme::MUTED),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[0]);
    f.render_widget(Paragraph::new(control), chunks[1]);

    app.back_area = Some(Rect::new(chunks[0].x, chunks[0].y, chunks[0].width, 1));
    app.status_option_areas = option_areas
        .into_iter()
        .filter(|(_, rect)| rect.bottom() <= chunks[1].bottom())
        .collect();
}

fn detail_field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(theme::MUTED)),
        Span::raw(value),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_toast(f: &mut Frame, message: &str, area: Rect) {
    let text = Line::from(message.to_string());
    let width = (text.width() as u16 + 4).min(area.width.saturating_sub(2));
    let height = 3u16;
    if area.height < height + 2 {
        return;
    }
    let toast_area = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height - height - 2,
        width,
        height,
    );
    f.render_widget(Clear, toast_area);
    f.render_widget(
        Paragraph::new(text)
            .style(theme::TOAST_STYLE)
            .block(Block::default().borders(Borders::ALL).style(theme::TOAST_STYLE)),
        toast_area,
    );
}

fn render_help(f: &mut Frame, area: Rect) {
    let overlay = centered_rect(56, 24, area);
    f.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("도움말")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let keys = [
        ("Tab", "지도/패널 포커스 전환"),
        ("j / k", "목록 이동 (지도: 구역 커서)"),
        ("Enter", "민원 선택 (지도: 구역 안내)"),
        ("← / →", "지도 핀 순환 선택"),
        ("Esc", "목록으로 돌아가기"),
        ("1 / 2 / 3", "상태를 접수/처리중/완료로 변경"),
        ("f", "상태 필터 순환"),
        ("t", "유형 필터 순환"),
        ("/", "검색어 입력"),
        ("v", "현황/분석 모드 전환"),
        ("L / O", "로그인 / 로그아웃"),
        ("?", "도움말 닫기"),
        ("q", "종료"),
    ];
    let mut text = vec![
        Line::from(Span::styled(
            "키보드 단축키",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    text.extend(keys.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{key:<10}"), Color::Cyan),
            Span::raw(*action),
        ])
    }));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "마우스: 핀 클릭 선택, 구역 클릭 안내, 상태 항목 클릭 변경",
        Style::default().fg(theme::MUTED),
    )));
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = app.login.as_ref() else {
        return;
    };
    let overlay = centered_rect(48, 14, area);
    f.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("통합 로그인")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let tabs: Vec<Span> = [Role::Manager, Role::Citizen]
        .into_iter()
        .flat_map(|role| {
            let style = if role == modal.form.role {
                theme::SELECTED_STYLE
            } else {
                Style::default().fg(theme::MUTED)
            };
            [Span::styled(format!(" {} ", role.tab_label()), style), Span::raw(" ")]
        })
        .collect();

    let field_style = |field: LoginField| {
        if modal.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };
    let cursor = |field: LoginField| if modal.field == field { "_" } else { "" };
    let masked = "*".repeat(modal.form.password.chars().count());

    let mut lines = vec![
        Line::from(tabs),
        Line::from(Span::styled("←/→ 역할 전환  Tab 입력란 이동", Style::default().fg(theme::MUTED))),
        Line::from(""),
        Line::from(vec![
            Span::styled("아이디(이메일): ", field_style(LoginField::Account)),
            Span::raw(format!("{}{}", modal.form.account, cursor(LoginField::Account))),
        ]),
        Line::from(vec![
            Span::styled("비밀번호:       ", field_style(LoginField::Password)),
            Span::raw(format!("{}{}", masked, cursor(LoginField::Password))),
        ]),
        Line::from(""),
    ];
    if modal.pending {
        lines.push(Line::from(Span::styled(
            "로그인 중...",
            Style::default().fg(Color::Cyan),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("[Enter] {}", modal.form.role.submit_label()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(error) = modal.error.as_deref() {
        lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "Esc 닫기",
        Style::default().fg(theme::MUTED),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
