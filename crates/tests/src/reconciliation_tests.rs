//! Alert lifecycle reconciliation, driven through single-hive checks with a
//! scripted checker so each run's issue set is fully controlled.

use waggle_core::{
    alerts::{AlertFilter, AlertIssue, AlertSeverity, AlertStatus},
    checkers::CheckerSet,
    hives::HiveRegistry,
};

use crate::support::{active_alerts, hive, rig, ScriptedChecker};
use uuid::Uuid;

fn overdue(severity: AlertSeverity) -> AlertIssue {
    AlertIssue::new("inspection_overdue", "hive is overdue", severity)
}

#[test]
fn test_repeated_checks_are_idempotent() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let rig = rig(CheckerSet::new().register(Box::new(checker.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Low)]);
    rig.sweeper.check_hive(hive_id).unwrap();
    rig.sweeper.check_hive(hive_id).unwrap();
    rig.sweeper.check_hive(hive_id).unwrap();

    let active = active_alerts(&rig.manager, hive_id);
    assert_eq!(active.len(), 1, "identical issue must not duplicate the alert");
    assert_eq!(rig.manager.total_alerts(), 1);
}

#[test]
fn test_severity_escalation_supersedes_previous_alert() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let rig = rig(CheckerSet::new().register(Box::new(checker.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Low)]);
    rig.sweeper.check_hive(hive_id).unwrap();

    checker.set_issues(vec![overdue(AlertSeverity::High)]);
    rig.sweeper.check_hive(hive_id).unwrap();

    let active = active_alerts(&rig.manager, hive_id);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, AlertSeverity::High);

    let superseded = rig
        .manager
        .list(&AlertFilter {
            hive_id: Some(hive_id),
            status: Some(AlertStatus::Superseded),
            ..AlertFilter::default()
        })
        .unwrap();
    assert_eq!(superseded.len(), 1);
    assert_eq!(superseded[0].severity, AlertSeverity::Low);
}

#[test]
fn test_zero_issue_run_resolves_all_active_alerts() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let second = ScriptedChecker::new("low_health_score");
    let rig = rig(CheckerSet::new()
        .register(Box::new(checker.clone()))
        .register(Box::new(second.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Medium)]);
    second.set_issues(vec![AlertIssue::new(
        "low_health_score",
        "weak colony",
        AlertSeverity::Medium,
    )]);
    rig.sweeper.check_hive(hive_id).unwrap();
    assert_eq!(active_alerts(&rig.manager, hive_id).len(), 2);

    // Next run finds nothing at all for the hive: everything resolves.
    checker.set_issues(vec![]);
    second.set_issues(vec![]);
    rig.sweeper.check_hive(hive_id).unwrap();

    assert!(active_alerts(&rig.manager, hive_id).is_empty());
    let resolved = rig
        .manager
        .list(&AlertFilter {
            hive_id: Some(hive_id),
            status: Some(AlertStatus::Resolved),
            ..AlertFilter::default()
        })
        .unwrap();
    assert_eq!(resolved.len(), 2);
}

#[test]
fn test_dismissal_does_not_suppress_recurrence() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let rig = rig(CheckerSet::new().register(Box::new(checker.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Low)]);
    rig.sweeper.check_hive(hive_id).unwrap();

    let alert_id = active_alerts(&rig.manager, hive_id)[0].id;
    rig.manager.dismiss(alert_id, user).unwrap();
    assert!(active_alerts(&rig.manager, hive_id).is_empty());

    // The very next run re-escalates despite the dismissal.
    rig.sweeper.check_hive(hive_id).unwrap();

    let active = active_alerts(&rig.manager, hive_id);
    assert_eq!(active.len(), 1);
    assert_ne!(active[0].id, alert_id);
}

#[test]
fn test_dismissed_alert_survives_all_clear() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let rig = rig(CheckerSet::new().register(Box::new(checker.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Low)]);
    rig.sweeper.check_hive(hive_id).unwrap();
    let alert_id = active_alerts(&rig.manager, hive_id)[0].id;
    rig.manager.dismiss(alert_id, user).unwrap();

    checker.set_issues(vec![]);
    rig.sweeper.check_hive(hive_id).unwrap();

    // The all-clear touches active alerts only; the dismissed record stays
    // dismissed history.
    let dismissed = rig
        .manager
        .list(&AlertFilter {
            hive_id: Some(hive_id),
            status: Some(AlertStatus::Dismissed),
            ..AlertFilter::default()
        })
        .unwrap();
    assert_eq!(dismissed.len(), 1);
}

#[test]
fn test_retention_purges_only_old_resolved_alerts() {
    let checker = ScriptedChecker::new("inspection_overdue");
    let rig = rig(CheckerSet::new().register(Box::new(checker.clone())));

    let user = Uuid::new_v4();
    let ctx = hive(user, Some(1));
    let hive_id = ctx.hive_id;
    rig.registry.upsert(ctx);

    checker.set_issues(vec![overdue(AlertSeverity::Low)]);
    rig.sweeper.check_hive(hive_id).unwrap();
    checker.set_issues(vec![]);
    rig.sweeper.check_hive(hive_id).unwrap();

    // The freshly resolved alert is inside the retention window.
    assert_eq!(rig.manager.purge_resolved(30).unwrap(), 0);
    assert_eq!(rig.manager.total_alerts(), 1);

    // A zero-day window treats it as expired.
    assert_eq!(rig.manager.purge_resolved(0).unwrap(), 1);
    assert_eq!(rig.manager.total_alerts(), 0);
}
