//! Agenda operations. Conflict detection is not a read-before-write: the
//! store's unique index on `(user_id, starts_at)` makes add and update
//! atomic, and a violation surfaces here as [`Error::Conflict`].

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::info;

use crate::appointments::repo::Appointment;
use crate::error::{Error, Result};

/// Book a new appointment for `user_id`. Fails with `Conflict` if the
/// user already has an appointment at exactly that date and time.
pub async fn add_appointment(
    db: &SqlitePool,
    user_id: i64,
    starts_at: NaiveDateTime,
    title: &str,
    description: &str,
    address: &str,
) -> Result<Appointment> {
    let appointment = Appointment::create(db, user_id, starts_at, title, description, address)
        .await
        .map_err(|e| Error::from(e).on_unique_violation(Error::Conflict))?;
    info!(
        appointment_id = appointment.id,
        user_id,
        starts_at = %appointment.starts_at,
        "appointment added"
    );
    Ok(appointment)
}

/// Every appointment owned by `user_id`, earliest slot first.
pub async fn get_appointments(db: &SqlitePool, user_id: i64) -> Result<Vec<Appointment>> {
    Ok(Appointment::list_by_user(db, user_id).await?)
}

/// Replace every mutable field of an existing appointment. `NotFound` if
/// the id does not exist; `Conflict` if the new slot collides with
/// another of the owner's appointments. Keeping the record's own current
/// slot is not a conflict.
pub async fn update_appointment(
    db: &SqlitePool,
    id: i64,
    starts_at: NaiveDateTime,
    title: &str,
    description: &str,
    address: &str,
) -> Result<Appointment> {
    match Appointment::update(db, id, starts_at, title, description, address).await {
        Ok(Some(appointment)) => {
            info!(appointment_id = id, starts_at = %appointment.starts_at, "appointment updated");
            Ok(appointment)
        }
        Ok(None) => Err(Error::NotFound),
        Err(e) => Err(Error::from(e).on_unique_violation(Error::Conflict)),
    }
}

/// Permanently remove an appointment; `NotFound` if the id is absent.
pub async fn delete_appointment(db: &SqlitePool, id: i64) -> Result<()> {
    if !Appointment::delete(db, id).await? {
        return Err(Error::NotFound);
    }
    info!(appointment_id = id, "appointment deleted");
    Ok(())
}

/// Appointments of `user_id` whose title contains `title` as a
/// case-sensitive substring.
pub async fn search_appointments(
    db: &SqlitePool,
    user_id: i64,
    title: &str,
) -> Result<Vec<Appointment>> {
    Ok(Appointment::search_by_title(db, user_id, title).await?)
}

/// Read-only form of the conflict predicate: true iff `user_id` already
/// has an appointment at exactly `starts_at`. The mutating paths do not
/// call this; they rely on the unique index instead.
pub async fn is_conflict(
    db: &SqlitePool,
    user_id: i64,
    starts_at: NaiveDateTime,
) -> Result<bool> {
    Ok(Appointment::slot_taken(db, user_id, starts_at).await?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::auth::register;
    use crate::test_pool;

    fn slot(date: &str, time: &str) -> NaiveDateTime {
        let date: NaiveDate = date.parse().expect("test date");
        let time = format!("{time}:00").parse().expect("test time");
        date.and_time(time)
    }

    async fn user(db: &SqlitePool, name: &str) -> i64 {
        register(db, name, "pw1").await.expect("register user").id
    }

    #[tokio::test]
    async fn add_then_same_slot_conflicts() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let at = slot("2024-05-01", "10:00");

        add_appointment(&db, alice, at, "Dentist", "checkup", "12 Main St")
            .await
            .expect("first booking");
        let err = add_appointment(&db, alice, at, "Other", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict));
    }

    #[tokio::test]
    async fn same_slot_different_users_is_fine() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let at = slot("2024-05-01", "10:00");

        add_appointment(&db, alice, at, "Dentist", "", "").await.expect("alice");
        add_appointment(&db, bob, at, "Dentist", "", "").await.expect("bob");
    }

    #[tokio::test]
    async fn one_minute_apart_is_not_a_conflict() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;

        add_appointment(&db, alice, slot("2024-05-01", "10:00"), "A", "", "")
            .await
            .expect("first");
        add_appointment(&db, alice, slot("2024-05-01", "10:01"), "B", "", "")
            .await
            .expect("adjacent slot");
    }

    #[tokio::test]
    async fn list_is_owner_scoped_and_ordered() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;

        add_appointment(&db, alice, slot("2024-05-02", "09:00"), "Later", "", "")
            .await
            .expect("add");
        add_appointment(&db, alice, slot("2024-05-01", "10:00"), "Sooner", "", "")
            .await
            .expect("add");
        add_appointment(&db, bob, slot("2024-05-01", "10:00"), "Bob's", "", "")
            .await
            .expect("add");

        let titles: Vec<_> = get_appointments(&db, alice)
            .await
            .expect("list")
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, ["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found_and_store_unchanged() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        add_appointment(&db, alice, slot("2024-05-01", "10:00"), "Dentist", "", "")
            .await
            .expect("add");

        let err = update_appointment(&db, 9999, slot("2024-06-01", "09:00"), "X", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));

        let list = get_appointments(&db, alice).await.expect("list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Dentist");
    }

    #[tokio::test]
    async fn update_to_own_slot_is_not_a_conflict() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let at = slot("2024-05-01", "10:00");
        let appt = add_appointment(&db, alice, at, "Dentist", "", "")
            .await
            .expect("add");

        let updated = update_appointment(&db, appt.id, at, "Dentist (moved room)", "", "")
            .await
            .expect("same slot, same record");
        assert_eq!(updated.id, appt.id);
        assert_eq!(updated.title, "Dentist (moved room)");
    }

    #[tokio::test]
    async fn update_into_anothers_slot_conflicts() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let taken = slot("2024-05-01", "10:00");
        add_appointment(&db, alice, taken, "Dentist", "", "").await.expect("add");
        let other = add_appointment(&db, alice, slot("2024-05-01", "11:00"), "Barber", "", "")
            .await
            .expect("add");

        let err = update_appointment(&db, other.id, taken, "Barber", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict));
    }

    #[tokio::test]
    async fn update_replaces_all_mutable_fields() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let appt = add_appointment(&db, alice, slot("2024-05-01", "10:00"), "Old", "old", "here")
            .await
            .expect("add");

        let new_at = slot("2024-05-03", "15:30");
        let updated = update_appointment(&db, appt.id, new_at, "New", "new", "there")
            .await
            .expect("update");
        assert_eq!(updated.starts_at, new_at);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, "new");
        assert_eq!(updated.address, "there");
        assert_eq!(updated.user_id, alice);
    }

    #[tokio::test]
    async fn delete_removes_row_and_repeat_is_not_found() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let appt = add_appointment(&db, alice, slot("2024-05-01", "10:00"), "Dentist", "", "")
            .await
            .expect("add");

        delete_appointment(&db, appt.id).await.expect("delete");
        assert!(get_appointments(&db, alice).await.expect("list").is_empty());

        let err = delete_appointment(&db, appt.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn deleted_slot_can_be_rebooked() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let at = slot("2024-05-01", "10:00");
        let appt = add_appointment(&db, alice, at, "Dentist", "", "").await.expect("add");
        delete_appointment(&db, appt.id).await.expect("delete");

        add_appointment(&db, alice, at, "Dentist again", "", "")
            .await
            .expect("slot freed by delete");
    }

    #[tokio::test]
    async fn search_is_case_sensitive_substring() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        add_appointment(&db, alice, slot("2024-05-01", "10:00"), "Dentist", "", "")
            .await
            .expect("add");
        add_appointment(&db, alice, slot("2024-05-02", "10:00"), "Barber", "", "")
            .await
            .expect("add");

        let hits = search_appointments(&db, alice, "Dent").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dentist");

        assert!(search_appointments(&db, alice, "dent")
            .await
            .expect("search")
            .is_empty());
    }

    #[tokio::test]
    async fn search_does_not_cross_owners() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        add_appointment(&db, bob, slot("2024-05-01", "10:00"), "Dentist", "", "")
            .await
            .expect("add");

        assert!(search_appointments(&db, alice, "Dent")
            .await
            .expect("search")
            .is_empty());
    }

    #[tokio::test]
    async fn conflict_predicate_matches_exact_slot_only() {
        let db = test_pool().await;
        let alice = user(&db, "alice").await;
        let at = slot("2024-05-01", "10:00");
        add_appointment(&db, alice, at, "Dentist", "", "").await.expect("add");

        assert!(is_conflict(&db, alice, at).await.expect("query"));
        assert!(!is_conflict(&db, alice, slot("2024-05-01", "10:01")).await.expect("query"));
        assert!(!is_conflict(&db, alice + 1, at).await.expect("query"));
    }
}
