use std::time::{Duration, Instant};
use wasteops_core::seed;
use wasteops_core::{
    Action, Dashboard, FilterChoice, FilterCriteria, IssueStatus, IssueType, Panel,
    SelectionSource, StatusCounts,
};

fn dashboard() -> Dashboard {
    Dashboard::new(seed::builtin().expect("builtin seed"))
}

fn ids(dash: &Dashboard) -> Vec<String> {
    dash.filtered_issues()
        .iter()
        .map(|issue| issue.id.clone())
        .collect()
}

fn status_choices() -> Vec<FilterChoice<IssueStatus>> {
    std::iter::once(FilterChoice::All)
        .chain(IssueStatus::ALL.iter().copied().map(FilterChoice::Only))
        .collect()
}

fn type_choices() -> Vec<FilterChoice<IssueType>> {
    std::iter::once(FilterChoice::All)
        .chain(IssueType::ALL.iter().copied().map(FilterChoice::Only))
        .collect()
}

#[test]
fn in_progress_filter_over_seed() {
    let mut dash = dashboard();
    dash.dispatch(
        Action::SetStatusFilter(FilterChoice::Only(IssueStatus::InProgress)),
        Instant::now(),
    );
    assert_eq!(
        ids(&dash),
        vec!["ISS-2023-002", "ISS-2023-006", "ISS-2023-009"]
    );
}

#[test]
fn neighbourhood_search_over_seed() {
    let mut dash = dashboard();
    dash.dispatch(Action::SetSearch("효자".to_string()), Instant::now());
    assert_eq!(ids(&dash), vec!["ISS-2023-003", "ISS-2023-013"]);
}

#[test]
fn completing_a_received_issue_changes_one_field_and_notifies() {
    let now = Instant::now();
    let mut dash = dashboard();
    let before = dash.registry().issues().to_vec();

    dash.dispatch(
        Action::SetStatus {
            id: "ISS-2023-001".to_string(),
            status: IssueStatus::Completed,
        },
        now,
    );

    let after = dash.registry().issues();
    for (old, new) in before.iter().zip(after) {
        if old.id == "ISS-2023-001" {
            assert_eq!(old.status, IssueStatus::Received);
            assert_eq!(new.status, IssueStatus::Completed);
            let mut restored = new.clone();
            restored.status = old.status;
            assert_eq!(&restored, old);
        } else {
            assert_eq!(new, old);
        }
    }

    let message = dash.visible_notification().expect("toast visible");
    assert!(message.contains("ISS-2023-001"));
    assert!(message.contains("완료"));
}

#[test]
fn back_from_detail_returns_to_full_list() {
    let mut dash = dashboard();
    dash.dispatch(
        Action::Select {
            id: "ISS-2023-004".to_string(),
            source: SelectionSource::ListRow,
        },
        Instant::now(),
    );
    match dash.panel() {
        Panel::Detail(issue) => assert_eq!(issue.id, "ISS-2023-004"),
        Panel::List(_) => panic!("expected detail panel"),
    }

    dash.dispatch(Action::Back, Instant::now());
    assert_eq!(dash.selection().current(), None);
    match dash.panel() {
        Panel::List(rows) => assert_eq!(rows.len(), 13),
        Panel::Detail(issue) => panic!("unexpected detail for {}", issue.id),
    }
}

#[test]
fn every_filter_combination_yields_an_ordered_matching_subsequence() {
    let registry = seed::builtin().expect("builtin seed");
    let all = registry.issues();
    let searches = ["", "효자", "ISS-2023-01", "쓰레기", "없는말"];

    for status in status_choices() {
        for issue_type in type_choices() {
            for search in searches {
                let criteria = FilterCriteria {
                    status,
                    issue_type,
                    search: search.to_string(),
                };
                let found = wasteops_core::filter::apply(all, &criteria);
                let again = wasteops_core::filter::apply(all, &criteria);
                assert_eq!(found, again);

                let mut cursor = 0;
                for issue in &found {
                    assert!(criteria.matches(issue));
                    let offset = all[cursor..]
                        .iter()
                        .position(|candidate| candidate.id == issue.id)
                        .expect("found issue appears later in the full list");
                    cursor += offset + 1;
                }
                let expected = all.iter().filter(|issue| criteria.matches(issue)).count();
                assert_eq!(found.len(), expected);
            }
        }
    }
}

#[test]
fn kpi_counters_ignore_the_active_filter() {
    let mut dash = dashboard();
    let full = dash.status_counts();
    assert_eq!(
        full,
        StatusCounts {
            received: 7,
            in_progress: 3,
            completed: 3,
        }
    );
    assert_eq!(full.total(), dash.registry().issues().len());

    dash.set_type_filter(FilterChoice::Only(IssueType::BulkWaste));
    dash.set_search("없는말");
    assert!(dash.filtered_issues().is_empty());
    assert_eq!(dash.status_counts(), full);
}

#[test]
fn selection_always_names_a_registered_issue() {
    let now = Instant::now();
    let mut dash = dashboard();
    let script = [
        Action::Select {
            id: "ISS-2023-010".to_string(),
            source: SelectionSource::MapPin,
        },
        Action::Select {
            id: "ISS-0000-000".to_string(),
            source: SelectionSource::ListRow,
        },
        Action::Back,
        Action::Back,
        Action::Select {
            id: String::new(),
            source: SelectionSource::MapPin,
        },
        Action::Select {
            id: "ISS-2023-013".to_string(),
            source: SelectionSource::ListRow,
        },
        Action::ClickZone("z3".to_string()),
    ];
    for action in script {
        dash.dispatch(action, now);
        if let Some(id) = dash.selection().current() {
            assert!(dash.registry().contains_issue(id), "stale selection {id}");
        }
    }
    assert_eq!(dash.selection().current(), Some("ISS-2023-013"));
}

#[test]
fn no_op_transition_still_notifies_once() {
    let now = Instant::now();
    let mut dash = dashboard();
    let before = dash.registry().issues().to_vec();
    let revision = dash.revision();

    let transition = dash
        .change_status("ISS-2023-006", IssueStatus::InProgress, now)
        .expect("known issue");

    assert!(transition.is_noop());
    assert_eq!(dash.registry().issues(), before.as_slice());
    assert_eq!(
        dash.visible_notification(),
        Some("민원(ISS-2023-006) 상태가 '처리중'(으)로 변경되었습니다.")
    );
    assert!(dash.revision() > revision);
}

#[test]
fn burst_of_notifications_keeps_only_the_last_for_its_full_lifetime() {
    let start = Instant::now();
    let mut dash = dashboard();
    let pushes = [
        (0, "z1"),
        (800, "z2"),
        (1600, "z3"),
        (2900, "z4"),
    ];
    for (offset, zone) in pushes {
        dash.click_zone(zone, start + Duration::from_millis(offset));
    }
    let last_push = start + Duration::from_millis(2900);

    assert!(!dash.tick(start + Duration::from_millis(3000)));
    assert!(!dash.tick(last_push + Duration::from_millis(2999)));
    assert_eq!(
        dash.visible_notification(),
        Some("'퇴계·남춘천' 구역이 선택되었습니다.")
    );

    assert!(dash.tick(last_push + Duration::from_millis(3000)));
    assert_eq!(dash.visible_notification(), None);
}

#[test]
fn transition_workflow_allows_any_pair_of_states() {
    let now = Instant::now();
    let mut dash = dashboard();
    for from in IssueStatus::ALL {
        for to in IssueStatus::ALL {
            dash.change_status("ISS-2023-008", from, now);
            let transition = dash
                .change_status("ISS-2023-008", to, now)
                .expect("known issue");
            assert_eq!(transition.from, from);
            assert_eq!(transition.to, to);
            assert_eq!(
                dash.registry()
                    .issue("ISS-2023-008")
                    .map(|issue| issue.status),
                Some(to)
            );
        }
    }
}

#[test]
fn unknown_issue_status_change_is_silent() {
    let now = Instant::now();
    let mut dash = dashboard();
    let before = dash.registry().issues().to_vec();
    assert!(dash
        .change_status("ISS-0000-000", IssueStatus::Completed, now)
        .is_none());
    assert_eq!(dash.registry().issues(), before.as_slice());
    assert_eq!(dash.visible_notification(), None);
}
