use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use mrtblog_backend_rs::{
    db::Store,
    import::{self, ImportOptions, CARRIAGE_DIR, STREAM_DIR},
    model::MrtLine,
};

async fn memory_store() -> Store {
    let store = Store::new("sqlite::memory:");
    store.init().await.unwrap();
    store
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn options(data_dir: &Path) -> ImportOptions {
    ImportOptions {
        data_dir: data_dir.to_path_buf(),
        carriage: true,
        stream: true,
        keep_existing: false,
    }
}

#[actix_rt::test]
async fn imports_both_datasets_and_skips_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let bannan = dir.path().join(CARRIAGE_DIR).join(MrtLine::Bannan.name());
    write(
        &bannan.join("2024-01-02-Tuesday.csv"),
        "==08:00:00==,,,\nBL01,頂埔,111,----\nBL02,永寧,12X,111\n==08:05:00==,,,\nBL02,永寧,222,333\nBL01,頂埔,----,----\n",
    );
    write(&bannan.join("notes-without-date.csv"), "==08:00:00==,,,\nBL01,頂埔,1,1\n");
    write(&bannan.join("readme.txt"), "ignored");

    let stream = dir.path().join(STREAM_DIR);
    write(
        &stream.join("2024-01-01-Monday.csv"),
        "date,timestamp,count\n2024-01-01,23:00:00,900\n",
    );
    write(
        &stream.join("2024-01-02-Tuesday.csv"),
        "date,timestamp,count\n2024-01-02,08:00:00,1000\n2024-01-02,08:01:00,oops\n2024-01-02,08:02:00,1100\n",
    );
    write(&stream.join("broken.csv"), "when,how_many\nnow,3\n");

    let store = memory_store().await;
    let report = import::run(&store, &options(dir.path())).await.unwrap();

    let carriage = report.carriage.unwrap();
    assert_eq!(carriage.files_seen, 2);
    assert_eq!(carriage.files_imported, 1);
    assert_eq!(carriage.records, 3);
    assert_eq!(carriage.rows_skipped, 1);

    let stream_summary = report.stream.unwrap();
    assert_eq!(stream_summary.files_seen, 3);
    assert_eq!(stream_summary.files_imported, 2);
    assert_eq!(stream_summary.records, 3);
    assert_eq!(stream_summary.rows_skipped, 1);

    let latest = store.mrt_carriages().get_latest_by_line("BL").await.unwrap();
    let stations: Vec<(&str, Option<Vec<f64>>)> = latest
        .iter()
        .map(|r| (r.data().station_code.as_str(), r.data().to_terminal_levels()))
        .collect();
    assert_eq!(
        stations,
        vec![("BL01", None), ("BL02", Some(vec![66.67, 66.67, 66.67]))]
    );

    let today = store.mrt_streams().get_daily_data(None).await.unwrap();
    let counts: Vec<i64> = today.iter().map(|r| r.data().count).collect();
    assert_eq!(counts, vec![1000, 1100]);
    let jan_first = store
        .mrt_streams()
        .get_daily_data(NaiveDate::from_ymd_opt(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(jan_first.len(), 1);
}

#[actix_rt::test]
async fn reimport_replaces_unless_keep_existing() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join(STREAM_DIR).join("2024-01-02-Tuesday.csv"),
        "date,timestamp,count\n2024-01-02,08:00:00,1000\n",
    );
    let store = memory_store().await;
    let mut opts = options(dir.path());
    opts.carriage = false;

    import::run(&store, &opts).await.unwrap();
    import::run(&store, &opts).await.unwrap();
    assert_eq!(store.mrt_streams().count_all().await.unwrap(), 1);

    opts.keep_existing = true;
    let report = import::run(&store, &opts).await.unwrap();
    assert!(report.carriage.is_none());
    assert_eq!(store.mrt_streams().count_all().await.unwrap(), 2);
}

#[actix_rt::test]
async fn missing_directories_are_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let report = import::run(&store, &options(dir.path())).await.unwrap();
    assert_eq!(report.carriage.unwrap().files_seen, 0);
    assert_eq!(report.stream.unwrap().records, 0);
}

#[actix_rt::test]
async fn uninitialized_store_fails_the_import() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new("sqlite::memory:");
    assert!(import::run(&store, &options(dir.path())).await.is_err());
}
