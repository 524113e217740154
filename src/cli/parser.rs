use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for examslot
/// Trial-exam seat reservations backed by SQLite
#[derive(Parser)]
#[command(
    name = "examslot",
    version = env!("CARGO_PKG_VERSION"),
    about = "Trial-exam slot reservations: capacity, quotas, confirmations and reminders on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(global = true, long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage trial exam events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Manage the student directory
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Book a seat in the active event
    Reserve {
        /// Student id
        student: i64,

        /// Subject name (checked against the student's grade list)
        subject: String,

        /// Campus name
        campus: String,

        /// Exam date (YYYY-MM-DD)
        date: String,

        /// Exam time (H:MM)
        time: String,

        #[arg(
            long = "skip-subject-check",
            help = "Do not check the subject against the student's grade list"
        )]
        skip_subject_check: bool,
    },

    /// Show booked and free seats per time for one campus day
    Availability {
        campus: String,

        /// Exam date (YYYY-MM-DD)
        date: String,

        #[arg(long = "event", help = "Event id (default: the active event)")]
        event: Option<i64>,
    },

    /// List a student's reservations
    List {
        /// Student id
        student: i64,

        #[arg(long = "event", help = "Event id (default: the active event)")]
        event: Option<i64>,
    },

    /// Confirm participation for a reservation
    Confirm {
        /// Reservation id
        id: i64,
    },

    /// Record attendance and submitted work for a reservation
    Outcome {
        /// Reservation id
        id: i64,

        #[arg(long = "attended", help = "Student attended the exam (true/false)")]
        attended: Option<bool>,

        #[arg(long = "submitted", help = "Student submitted the work (true/false)")]
        submitted: Option<bool>,
    },

    /// Cancel (delete) a reservation
    Cancel {
        /// Reservation id
        id: i64,
    },

    /// Compute the reminders due now
    Remind {
        #[arg(long = "now", help = "Evaluate at this RFC 3339 instant instead of now")]
        now: Option<String>,

        #[arg(
            long = "watch",
            conflicts_with = "now",
            help = "Keep running, emitting a JSON line per reminder cycle"
        )]
        watch: bool,
    },

    /// Export the reservations of an event
    Export {
        #[arg(long, value_enum, default_value = "csv", help = "Output format")]
        format: ExportFormat,

        #[arg(long, help = "Output file path")]
        file: String,

        #[arg(long = "event", help = "Event id (default: the active event)")]
        event: Option<i64>,

        #[arg(long, help = "Overwrite the output file without asking")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Show the active event
    Active,

    /// Create an event from a YAML or JSON definition file
    Create {
        file: PathBuf,
    },

    /// Apply a YAML or JSON patch file to an event
    Update {
        id: i64,
        file: PathBuf,
    },

    /// Make an event the active one (deactivates all others)
    Activate {
        id: i64,
    },

    Deactivate {
        id: i64,
    },

    /// Delete an event
    Delete {
        id: i64,

        #[arg(long, help = "Delete together with its reservations")]
        force: bool,
    },

    /// List all events
    List,

    /// Show one event
    Show {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// Add a student to the directory
    Add {
        /// Full name
        name: String,

        #[arg(long = "class", help = "Grade level (9, 10 or 11)")]
        class_num: Option<u8>,
    },

    /// Link a chat and stamp the enrollment confirmation
    Confirm {
        id: i64,

        #[arg(long = "chat", help = "Bot chat id")]
        chat_id: i64,

        #[arg(long = "at", help = "Confirmation instant (RFC 3339, default: now)")]
        at: Option<String>,
    },

    /// Remove a student together with all of their reservations
    Delete {
        id: i64,
    },

    /// List students
    List,

    /// Show the subjects a student may book
    Subjects {
        id: i64,
    },
}
