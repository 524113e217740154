use crate::cli::parser::{Commands, StudentAction};
use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::directory::{self, SqliteDirectory, StudentDirectory, subjects_for_class};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::table::Table;
use crate::utils::time::parse_now;
use serde_json::json;

pub fn handle(cmd: &Commands, cfg: &Config, as_json: bool) -> AppResult<()> {
    let Commands::Student { action } = cmd else {
        return Ok(());
    };
    let mut pool = DbPool::from_config(cfg)?;

    match action {
        StudentAction::Add { name, class_num } => {
            let tx = pool.write_tx()?;
            let id = directory::add_student(&tx, name, *class_num)?;
            audit(&tx, "student_add", &format!("student {}", id), name.trim())?;
            tx.commit()?;

            if as_json {
                return super::print_json(&json!({ "id": id, "full_name": name.trim() }));
            }
            success(format!("Student #{} '{}' added.", id, name.trim()));
        }

        StudentAction::Confirm { id, chat_id, at } => {
            let at = parse_now(at.as_deref())?;
            let tx = pool.write_tx()?;
            directory::confirm_enrollment(&tx, *id, *chat_id, &at)?;
            audit(
                &tx,
                "student_confirm",
                &format!("student {}", id),
                &format!("Linked chat {}", chat_id),
            )?;
            tx.commit()?;

            success(format!("Student #{} confirmed enrollment.", id));
        }

        StudentAction::Delete { id } => {
            let tx = pool.write_tx()?;
            let removed = queries::count_student_all_reservations(&tx, *id)?;
            directory::delete_student(&tx, *id)?;
            audit(
                &tx,
                "student_delete",
                &format!("student {}", id),
                &format!("Removed with {} reservation(s)", removed),
            )?;
            tx.commit()?;

            if as_json {
                return super::print_json(&json!({
                    "deleted": id,
                    "reservations_removed": removed,
                }));
            }
            success(format!(
                "Student #{} deleted ({} reservation(s) removed).",
                id, removed
            ));
        }

        StudentAction::List => {
            let students = SqliteDirectory::new(&pool.conn).all_students()?;
            if as_json {
                return super::print_json(&students);
            }
            if students.is_empty() {
                info("No students yet.");
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME", "CLASS", "CHAT", "CONFIRMED AT"]);
            for s in &students {
                table.add_row(vec![
                    s.id.to_string(),
                    s.full_name.clone(),
                    s.class_num.map(|c| c.to_string()).unwrap_or_default(),
                    s.chat_id.map(|c| c.to_string()).unwrap_or_default(),
                    s.confirmed_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                ]);
            }
            print!("{}", table.render());
        }

        StudentAction::Subjects { id } => {
            let student = SqliteDirectory::new(&pool.conn)
                .find_student(*id)?
                .ok_or_else(|| AppError::NotFound(format!("student {}", id)))?;

            let subjects = student.class_num.and_then(subjects_for_class);
            if as_json {
                return super::print_json(&json!({
                    "student_id": student.id,
                    "class_num": student.class_num,
                    "subjects": subjects,
                }));
            }
            match subjects {
                Some(list) => {
                    println!("📚 Subjects for {}:\n", student.full_name);
                    for s in list {
                        println!("  • {}", s);
                    }
                }
                None => warning(format!(
                    "No subject list for {} (class not set or not 9-11).",
                    student.full_name
                )),
            }
        }
    }

    Ok(())
}
