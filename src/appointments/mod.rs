pub mod repo;
pub mod services;

pub use repo::Appointment;
pub use services::{
    add_appointment, delete_appointment, get_appointments, is_conflict, search_appointments,
    update_appointment,
};
