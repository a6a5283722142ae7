use std::{
    fs,
    sync::{Arc, Barrier},
    thread,
};

use chrono::NaiveDate;
use finperiod_core::{
    storage::{BudgetStore, ExpenseStore, UserStore},
    BudgetService, CoreError, RolloverService,
};
use finperiod_domain::{Budget, Expense, Period, PeriodStartDay, User};
use finperiod_storage_json::JsonStore;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn json_store_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("data").join("finperiod.json");

    let user = User::new("Persisted").with_start_day(PeriodStartDay::new(10).unwrap());
    let budget_id = {
        let store = JsonStore::open(&path).expect("open empty store");
        store.save_user(&user).expect("save user");
        let budget =
            BudgetService::save(&store, &store, user.id, "Food", 250.0, date(2024, 11, 12))
                .expect("save budget");
        store
            .insert_expense(Expense::new(user.id, budget.id, 12.0, date(2024, 11, 13)))
            .expect("save expense");
        budget.id
    };
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = JsonStore::open(&path).expect("reopen store");
    let loaded = reopened.find_user(user.id).unwrap().expect("user survives");
    assert_eq!(loaded.period_start_day.get(), 10);
    let budget = reopened.find_budget_by_id(budget_id).unwrap().expect("budget survives");
    assert_eq!(budget.period, Period::new(2024, 11).unwrap());
    assert_eq!(reopened.find_expenses_for_budget(budget_id).unwrap().len(), 1);
}

#[test]
fn duplicate_budgets_are_rejected_and_not_persisted() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let store = JsonStore::open(&path).expect("open");
    let user = User::new("Dup");
    store.save_user(&user).unwrap();
    let period = Period::new(2024, 2).unwrap();

    store
        .insert_budget(Budget::new(user.id, "Rent", 900.0, period))
        .unwrap();
    let err = store
        .insert_budget(Budget::new(user.id, "Rent", 950.0, period))
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateBudgetForPeriod { .. }));

    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(reopened.find_budgets(user.id, period).unwrap().len(), 1);
}

#[test]
fn concurrent_rollovers_leave_one_copy_on_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let store = Arc::new(JsonStore::open(&path).unwrap());
    let user = User::new("Race");
    store.save_user(&user).unwrap();
    for category in ["Food", "Rent", "Fun"] {
        store
            .insert_budget(Budget::new(user.id, category, 100.0, Period::new(2024, 10).unwrap()))
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let user = user.clone();
            thread::spawn(move || {
                RolloverService::rollover(store.as_ref(), &user, date(2024, 11, 1)).unwrap()
            })
        })
        .collect();
    let copied: usize = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().copied_count())
        .sum();
    assert_eq!(copied, 3);

    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(
        reopened
            .find_budgets(user.id, Period::new(2024, 11).unwrap())
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn corrupt_and_future_files_are_refused() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");

    fs::write(&path, "[1, 2").unwrap();
    assert!(matches!(JsonStore::open(&path), Err(CoreError::Serde(_))));

    fs::write(&path, r#"{ "schema_version": 99 }"#).unwrap();
    assert!(matches!(JsonStore::open(&path), Err(CoreError::Storage(_))));
}

#[test]
fn legacy_files_without_optional_fields_load() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let user = User::new("Legacy");
    let mut raw = serde_json::to_value(&user).unwrap();
    raw.as_object_mut().unwrap().remove("period_start_day");
    fs::write(&path, serde_json::json!({ "users": [raw] }).to_string()).unwrap();

    let store = JsonStore::open(&path).expect("open legacy file");
    let loaded = store.find_user(user.id).unwrap().unwrap();
    assert_eq!(loaded.period_start_day, PeriodStartDay::default());
}

fn seed_october(path: &std::path::Path) -> User {
    let store = JsonStore::open(path).unwrap();
    let user = User::new("Shared");
    store.save_user(&user).unwrap();
    let october = Period::new(2024, 10).unwrap();
    for category in ["Food", "Rent"] {
        store
            .insert_budget(Budget::new(user.id, category, 200.0, october))
            .unwrap();
    }
    user
}

#[test]
fn handles_opened_earlier_see_later_writes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let user = seed_october(&path);
    let watcher = JsonStore::open(&path).unwrap();
    let manual = JsonStore::open(&path).unwrap();

    let november = Period::new(2024, 11).unwrap();
    manual
        .insert_budget(Budget::new(user.id, "Rent", 950.0, november))
        .unwrap();
    let rent = watcher.find_budget(user.id, "Rent", november).unwrap();
    assert_eq!(rent.map(|budget| budget.amount), Some(950.0));

    let manual_report = RolloverService::rollover(&manual, &user, date(2024, 11, 1)).unwrap();
    let watcher_report = RolloverService::rollover(&watcher, &user, date(2024, 11, 1)).unwrap();
    assert_eq!(manual_report.copied_count(), 1);
    assert_eq!(watcher_report.copied_count(), 0);

    let on_disk = JsonStore::open(&path).unwrap();
    let mut budgets = on_disk.find_budgets(user.id, november).unwrap();
    budgets.sort_by(|a, b| a.category.cmp(&b.category));
    let summary: Vec<_> = budgets
        .iter()
        .map(|budget| (budget.category.as_str(), budget.amount))
        .collect();
    assert_eq!(summary, vec![("Food", 200.0), ("Rent", 950.0)]);
}

#[test]
fn separate_handles_racing_on_one_file_copy_each_budget_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let user = seed_october(&path);
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = JsonStore::open(&path).unwrap();
            let barrier = Arc::clone(&barrier);
            let user = user.clone();
            thread::spawn(move || {
                barrier.wait();
                RolloverService::rollover(&store, &user, date(2024, 11, 1)).unwrap()
            })
        })
        .collect();
    let copied: usize = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().copied_count())
        .sum();
    assert_eq!(copied, 2);

    let on_disk = JsonStore::open(&path).unwrap();
    assert_eq!(on_disk.dataset().unwrap().budgets.len(), 4);
}

#[test]
fn failed_writes_leave_no_trace() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let store = JsonStore::open(&path).unwrap();
    let kept = User::new("Kept");
    store.save_user(&kept).unwrap();

    // A directory where the temporary file should go makes the write fail.
    let blocker = path.with_extension("json.tmp");
    fs::create_dir(&blocker).unwrap();
    let lost = User::new("Lost");
    assert!(store.save_user(&lost).is_err());
    assert!(store.find_user(lost.id).unwrap().is_none());

    fs::remove_dir(&blocker).unwrap();
    let later = User::new("Later");
    store.save_user(&later).unwrap();

    let reopened = JsonStore::open(&path).unwrap();
    let names: Vec<_> = reopened
        .list_users()
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, vec!["Kept", "Later"]);
}

#[test]
fn unwritable_locations_fail_without_caching() {
    let dir = tempdir().expect("tempdir");
    let file = dir.path().join("plain-file");
    fs::write(&file, "not a directory").unwrap();
    let store = JsonStore::open(file.join("store.json")).unwrap();

    let user = User::new("Nowhere");
    assert!(matches!(store.save_user(&user), Err(CoreError::Io(_))));
    assert!(store.find_user(user.id).unwrap().is_none());
}
