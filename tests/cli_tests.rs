mod common;

use common::TestEnv;
use predicates::str::contains;
use serde_json::Value;

fn seed_october(env: &TestEnv) {
    env.cli()
        .args(["user", "add", "Ada", "--start-day", "5"])
        .assert()
        .success()
        .stdout(contains("user Ada created with start day 5"));
    env.cli_on("2024-10-10")
        .args(["budget", "set", "-u", "Ada", "Food", "300"])
        .assert()
        .success()
        .stdout(contains("Food budget for 2024-10 set to 300.00"));
    env.cli_on("2024-10-10")
        .args(["budget", "set", "-u", "Ada", "Rent", "900"])
        .assert()
        .success();
}

#[test]
fn rollover_copies_once_and_then_skips() {
    let env = TestEnv::new();
    seed_october(&env);

    env.cli_on("2024-11-05")
        .args(["rollover", "-u", "Ada"])
        .assert()
        .success()
        .stdout(contains("Rollover 2024-10 -> 2024-11: 2 copied, 0 skipped, 0 failed"));

    env.cli_on("2024-11-06")
        .args(["rollover", "-u", "Ada"])
        .assert()
        .success()
        .stdout(contains("0 copied, 2 skipped"))
        .stdout(contains("already budgeted"));

    env.cli_on("2024-11-06")
        .args(["budget", "list", "-u", "Ada", "--period", "2024-11"])
        .assert()
        .success()
        .stdout(contains("Food"))
        .stdout(contains("Rent"));
}

#[test]
fn dates_before_the_start_day_stay_in_the_previous_period() {
    let env = TestEnv::new();
    seed_october(&env);

    env.cli_on("2024-11-04")
        .args(["period", "-u", "Ada"])
        .assert()
        .success()
        .stdout(contains("2024-10 (2024-10-05 .. 2024-11-04)"));

    // Nothing to copy into the period that is already current.
    env.cli_on("2024-11-04")
        .args(["rollover", "-u", "Ada"])
        .assert()
        .success()
        .stdout(contains("Rollover 2024-09 -> 2024-10: 0 copied"));
}

#[test]
fn summary_flags_overspent_categories() {
    let env = TestEnv::new();
    seed_october(&env);

    env.cli_on("2024-10-12")
        .args(["expense", "add", "-u", "Ada", "-c", "Food", "350", "--note", "party"])
        .assert()
        .success()
        .stdout(contains("350.00 recorded on 2024-10-12 against Food (2024-10)"));

    let output = env
        .cli_on("2024-10-20")
        .args(["summary", "-u", "Ada"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let food = text.lines().find(|line| line.starts_with("Food")).unwrap();
    assert!(food.ends_with("OVER"), "{food}");
    let rent = text.lines().find(|line| line.starts_with("Rent")).unwrap();
    assert!(!rent.ends_with("OVER"), "{rent}");
}

#[test]
fn stats_json_reports_elapsed_days_and_changes() {
    let env = TestEnv::new();
    seed_october(&env);
    env.cli_on("2024-10-06")
        .args(["expense", "add", "-u", "Ada", "-c", "Food", "100"])
        .assert()
        .success();
    env.cli_on("2024-11-05")
        .args(["rollover", "-u", "Ada"])
        .assert()
        .success();
    env.cli_on("2024-11-05")
        .args(["expense", "add", "-u", "Ada", "-c", "Food", "60"])
        .assert()
        .success();

    let output = env
        .cli_on("2024-11-10")
        .args(["stats", "-u", "Ada", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: Value = serde_json::from_slice(&output).expect("stats json");
    assert_eq!(stats["period"], "2024-11");
    assert_eq!(stats["days_elapsed"], 6);
    assert_eq!(stats["total_spent"], 60.0);
    assert_eq!(stats["avg_daily_spend"], 10.0);
    assert_eq!(stats["budget_change"], "+0.00%");
    assert_eq!(stats["spent_change"], "-40.00%");
}

#[test]
fn sweep_flags_by_default_and_copies_with_auto_apply() {
    let env = TestEnv::new();
    seed_october(&env);

    env.cli_on("2024-11-05")
        .arg("sweep")
        .assert()
        .success()
        .stdout(contains("1 eligible, 0 budgets copied"))
        .stdout(contains("run `rollover` to copy budgets"));

    env.cli_on("2024-11-05")
        .args(["sweep", "--auto-apply"])
        .assert()
        .success()
        .stdout(contains("1 eligible, 2 budgets copied"));

    // Not a start day for anyone.
    env.cli_on("2024-11-06")
        .args(["sweep", "--auto-apply"])
        .assert()
        .success()
        .stdout(contains("0 eligible"));
}

#[test]
fn auto_apply_can_come_from_the_config_file() {
    let env = TestEnv::new();
    env.write_config(r#"{ "rollover": { "auto_apply": true }, "default_period_start_day": 5 }"#);
    env.cli()
        .args(["user", "add", "Lin"])
        .assert()
        .success()
        .stdout(contains("start day 5"));
    env.cli_on("2024-10-05")
        .args(["budget", "set", "-u", "Lin", "Fun", "50"])
        .assert()
        .success();

    env.cli_on("2024-11-05")
        .arg("sweep")
        .assert()
        .success()
        .stdout(contains("AutoApply"))
        .stdout(contains("1 budgets copied"));
}

#[test]
fn reports_cover_the_last_six_months() {
    let env = TestEnv::new();
    seed_october(&env);
    env.cli_on("2024-10-06")
        .args(["expense", "add", "-u", "Ada", "-c", "Rent", "900"])
        .assert()
        .success();
    env.cli_on("2024-10-07")
        .args(["expense", "add", "-u", "Ada", "-c", "Food", "40"])
        .assert()
        .success();

    let output = env
        .cli_on("2024-11-20")
        .args(["report", "-u", "Ada", "trend", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entries: Value = serde_json::from_slice(&output).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["label"], "Jun 2024");
    assert_eq!(entries[4]["label"], "Oct 2024");
    assert_eq!(entries[4]["value"], 940.0);

    env.cli_on("2024-11-20")
        .args(["report", "-u", "Ada", "category"])
        .assert()
        .success()
        .stdout(contains("Rent"))
        .stdout(contains("900.00"));
}

#[test]
fn invalid_input_fails_with_a_message() {
    let env = TestEnv::new();
    env.cli()
        .args(["user", "add", "Bob", "--start-day", "29"])
        .assert()
        .failure()
        .stderr(contains("Invalid period start day 29"));

    seed_october(&env);
    env.cli()
        .args(["summary", "-u", "Ada", "--period", "2024/11"])
        .assert()
        .failure()
        .stderr(contains("Invalid period format"));
    env.cli()
        .args(["summary", "-u", "Nobody"])
        .assert()
        .failure()
        .stderr(contains("no user named `Nobody`"));
    env.cli_on("2024-10-10")
        .args(["expense", "add", "-u", "Ada", "-c", "Travel", "10"])
        .assert()
        .failure()
        .stderr(contains("no `Travel` budget in 2024-10"));
}

#[test]
fn start_day_changes_apply_to_later_resolutions() {
    let env = TestEnv::new();
    seed_october(&env);
    env.cli()
        .args(["user", "start-day", "Ada", "20"])
        .assert()
        .success()
        .stdout(contains("Ada now starts periods on day 20"));
    env.cli_on("2024-11-10")
        .args(["period", "-u", "Ada"])
        .assert()
        .success()
        .stdout(contains("2024-10 (2024-10-20 .. 2024-11-19)"));
}

#[test]
fn watch_refuses_a_pinned_date() {
    let env = TestEnv::new();
    env.cli_on("2024-11-05")
        .args(["sweep", "--watch"])
        .assert()
        .failure()
        .stderr(contains("cannot be combined with --as-of"));
}

#[test]
fn config_set_is_saved_and_used_by_later_runs() {
    let env = TestEnv::new();
    env.cli()
        .args(["config", "set", "default-start-day", "12"])
        .assert()
        .success()
        .stdout(contains("default-start-day set to 12"));
    env.cli()
        .args(["config", "set", "auto-apply", "on"])
        .assert()
        .success();

    let output = env
        .cli()
        .args(["config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let saved: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(saved["default_period_start_day"], 12);
    assert_eq!(saved["rollover"]["auto_apply"], true);

    env.cli()
        .args(["user", "add", "Kai"])
        .assert()
        .success()
        .stdout(contains("start day 12"));

    env.cli()
        .args(["config", "set", "default-start-day", "31"])
        .assert()
        .failure()
        .stderr(contains("between 1 and 28"));
}
