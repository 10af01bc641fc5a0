//! Interactive surface: a dialoguer menu loop over the two services.
//! Domain errors are printed and the loop continues; only terminal I/O
//! failures propagate out of here.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dialoguer::{Input, Password, Select};

use crate::appointments::{
    add_appointment, delete_appointment, get_appointments, search_appointments,
    update_appointment, Appointment,
};
use crate::auth::{login, register, User};
use crate::error::{Error, Result as DomainResult};
use crate::state::AppState;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";

/// A logged-in user. Built by the login menu and passed into every
/// session-menu handler; there is no ambient current-user state.
pub struct Session {
    pub user: User,
}

/// Top-level loop: Login / Register / Quit. Logging out of a session
/// lands back here.
pub async fn run(state: &AppState) -> anyhow::Result<()> {
    println!("apptbook — appointment schedule");
    loop {
        let items = ["Login", "Register", "Quit"];
        match Select::new().items(&items).default(0).interact()? {
            0 => {
                if let Some(session) = login_menu(state).await? {
                    session_menu(state, &session).await?;
                }
            }
            1 => register_menu(state).await?,
            _ => break,
        }
    }
    Ok(())
}

async fn login_menu(state: &AppState) -> anyhow::Result<Option<Session>> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    match login(&state.db, &username, &password).await {
        Ok(Some(user)) => {
            println!("Welcome, {}!", user.username);
            Ok(Some(Session { user }))
        }
        Ok(None) => {
            println!("Invalid username or password.");
            Ok(None)
        }
        Err(e) => {
            println!("{e}");
            Ok(None)
        }
    }
}

async fn register_menu(state: &AppState) -> anyhow::Result<()> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    match register(&state.db, &username, &password).await {
        Ok(_) => println!("Account created, you can log in now."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

async fn session_menu(state: &AppState, session: &Session) -> anyhow::Result<()> {
    loop {
        let items = [
            "Add appointment",
            "View appointments",
            "Update appointment",
            "Delete appointment",
            "Search appointments",
            "Log out",
        ];
        match Select::new().items(&items).default(0).interact()? {
            0 => add_menu(state, session).await?,
            1 => view_menu(state, session).await?,
            2 => update_menu(state).await?,
            3 => delete_menu(state).await?,
            4 => search_menu(state, session).await?,
            _ => break,
        }
    }
    Ok(())
}

async fn add_menu(state: &AppState, session: &Session) -> anyhow::Result<()> {
    let (date, time, title, description, address) = prompt_fields()?;

    let outcome = async {
        let starts_at = parse_slot(&date, &time)?;
        add_appointment(&state.db, session.user.id, starts_at, &title, &description, &address)
            .await
    }
    .await;

    match outcome {
        Ok(a) => println!("Appointment {} added.", a.id),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

async fn view_menu(state: &AppState, session: &Session) -> anyhow::Result<()> {
    match get_appointments(&state.db, session.user.id).await {
        Ok(list) => print_appointments(&list),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

async fn update_menu(state: &AppState) -> anyhow::Result<()> {
    let raw_id: String = Input::new().with_prompt("Appointment id").interact_text()?;
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };
    let (date, time, title, description, address) = prompt_fields()?;

    let outcome = async {
        let starts_at = parse_slot(&date, &time)?;
        update_appointment(&state.db, id, starts_at, &title, &description, &address).await
    }
    .await;

    match outcome {
        Ok(_) => println!("Appointment {id} updated."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

async fn delete_menu(state: &AppState) -> anyhow::Result<()> {
    let raw_id: String = Input::new()
        .with_prompt("Appointment id to delete")
        .interact_text()?;

    let outcome = async {
        let id = parse_id(&raw_id)?;
        delete_appointment(&state.db, id).await
    }
    .await;

    match outcome {
        Ok(()) => println!("Appointment deleted."),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

async fn search_menu(state: &AppState, session: &Session) -> anyhow::Result<()> {
    let needle: String = Input::new().with_prompt("Search by title").interact_text()?;
    match search_appointments(&state.db, session.user.id, &needle).await {
        Ok(list) => print_appointments(&list),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn prompt_fields() -> anyhow::Result<(String, String, String, String, String)> {
    let date: String = Input::new().with_prompt("Date (YYYY-MM-DD)").interact_text()?;
    let time: String = Input::new().with_prompt("Time (HH:MM)").interact_text()?;
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description")
        .allow_empty(true)
        .interact_text()?;
    let address: String = Input::new()
        .with_prompt("Address")
        .allow_empty(true)
        .interact_text()?;
    Ok((date, time, title, description, address))
}

fn print_appointments(list: &[Appointment]) {
    if list.is_empty() {
        println!("No appointments.");
        return;
    }
    for a in list {
        println!(
            "{}: {} {}-{} at {}",
            a.id,
            a.starts_at.format(DATE_FMT),
            a.starts_at.format(TIME_FMT),
            a.title,
            a.address
        );
    }
}

fn parse_slot(date: &str, time: &str) -> DomainResult<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FMT)
        .map_err(|_| Error::Parse(format!("invalid date {date:?}, expected YYYY-MM-DD")))?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FMT)
        .map_err(|_| Error::Parse(format!("invalid time {time:?}, expected HH:MM")))?;
    Ok(date.and_time(time))
}

fn parse_id(raw: &str) -> DomainResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid appointment id {raw:?}")))
}
