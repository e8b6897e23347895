use sqlx::PgPool;
use uuid::Uuid;

pub fn absence_message(student_name: &str) -> String {
    format!("Your child {} was marked absent today.", student_name)
}

/// Inserts one absence notification per parent linked to the student.
/// Callers run this on a spawned task; a failure here is logged by the
/// caller and never affects the attendance write.
pub async fn notify_absence(pool: &PgPool, student_id: Uuid) -> Result<u64, sqlx::Error> {
    let student = sqlx::query_as::<_, (String, String)>(
        "SELECT first_name, last_name FROM profiles WHERE id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    let Some((first_name, last_name)) = student else {
        return Ok(0);
    };

    let parents = sqlx::query_scalar::<_, Uuid>(
        "SELECT parent_id FROM parent_students WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let message = absence_message(&format!("{} {}", first_name, last_name));

    let mut sent = 0u64;
    for parent_id in parents {
        sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, title, message, type)
            VALUES ($1, 'Student Absent', $2, 'attendance')
            "#,
        )
        .bind(parent_id)
        .bind(&message)
        .execute(pool)
        .await?;
        sent += 1;
    }

    tracing::info!(%student_id, sent, "Absence notifications sent");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_message_names_the_student() {
        let msg = absence_message("Anita Roy");
        assert_eq!(msg, "Your child Anita Roy was marked absent today.");
    }
}
