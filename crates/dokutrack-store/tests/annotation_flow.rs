//! Integration tests for the annotation flow through the public API

use chrono::NaiveDate;
use dokutrack_store::{
    AnnotationStore, DocumentLink, LinkFilter, MemoryStore, ScheduleFilter, TimelineSchedule,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Test a full annotate-list-delete round over both record kinds
#[test]
fn annotate_list_delete_round() {
    let store = MemoryStore::new();

    let link = store
        .add_link(DocumentLink::new(
            "1",
            "1-1-0",
            "Kerangka Acuan Kerja",
            "https://drive.example/kak",
        ))
        .expect("link add should succeed");

    let schedule = store
        .add_schedule(TimelineSchedule::new(
            "1",
            "1-1",
            "1-1-0",
            "Kerangka Acuan Kerja",
            date(2025, 9, 5),
        ))
        .expect("schedule add should succeed");

    // Both kinds live side by side without interfering.
    assert_eq!(store.links(&LinkFilter::package("1")).unwrap().len(), 1);
    assert_eq!(
        store.schedules(&ScheduleFilter::package("1")).unwrap().len(),
        1
    );

    store
        .delete_link(link.id.expect("stored link has an id"))
        .expect("link delete should succeed");
    assert!(store.links(&LinkFilter::package("1")).unwrap().is_empty());
    assert_eq!(
        store.schedules(&ScheduleFilter::package("1")).unwrap().len(),
        1,
        "deleting a link must not touch schedules"
    );

    store
        .delete_schedule(schedule.id.expect("stored schedule has an id"))
        .expect("schedule delete should succeed");
    assert!(store
        .schedules(&ScheduleFilter::package("1"))
        .unwrap()
        .is_empty());
}

/// Test that re-adding the same logical link replaces instead of duplicating
#[test]
fn re_adding_a_link_replaces_it() {
    let store = MemoryStore::new();

    store
        .add_link(DocumentLink::new("1", "1-1-0", "KAK", "https://old"))
        .unwrap();
    store
        .add_link(DocumentLink::new("1", "1-1-0", "KAK", "https://new"))
        .unwrap();

    let rows = store.links(&LinkFilter::package("1")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].link_url, "https://new");
}
