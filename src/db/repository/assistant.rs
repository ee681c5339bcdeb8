use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{allocate_id, DatabaseError};
use crate::models::{ModulePermissions, NewAssistant, PaAccess, PersonalAssistant};

pub fn create_assistant(
    conn: &mut Connection,
    new: &NewAssistant,
    password_hash: &str,
) -> Result<PersonalAssistant, DatabaseError> {
    let tx = conn.transaction()?;
    let pa_id = allocate_id(&tx, "personal_assistants", "pa_id")?;
    tx.execute(
        "INSERT INTO personal_assistants (pa_id, doctor_id, first_name, last_name, email,
         mobile_number, password_hash, allow_patients, allow_schedules, allow_inventory,
         allow_alerts, allow_billing)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            pa_id,
            new.doctor_id,
            new.first_name.trim(),
            new.last_name.trim(),
            new.email.trim().to_lowercase(),
            new.mobile_number.trim(),
            password_hash,
            new.permissions.allow_patients as i64,
            new.permissions.allow_schedules as i64,
            new.permissions.allow_inventory as i64,
            new.permissions.allow_alerts as i64,
            new.permissions.allow_billing as i64,
        ],
    )?;
    tx.commit()?;

    get_assistant(conn, pa_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "personal_assistant".to_string(),
        id: pa_id.to_string(),
    })
}

pub fn get_assistant(
    conn: &Connection,
    pa_id: i64,
) -> Result<Option<PersonalAssistant>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM personal_assistants WHERE pa_id = ?1"),
        params![pa_id],
        assistant_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Lookup by login identifier: lowercased email or exact mobile number.
pub fn find_by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<PersonalAssistant>, DatabaseError> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM personal_assistants WHERE email = ?1 OR mobile_number = ?2"
        ),
        params![identifier.trim().to_lowercase(), identifier.trim()],
        assistant_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn update_permissions(
    conn: &Connection,
    pa_id: i64,
    permissions: &ModulePermissions,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE personal_assistants
         SET allow_patients = ?2, allow_schedules = ?3, allow_inventory = ?4,
             allow_alerts = ?5, allow_billing = ?6
         WHERE pa_id = ?1",
        params![
            pa_id,
            permissions.allow_patients as i64,
            permissions.allow_schedules as i64,
            permissions.allow_inventory as i64,
            permissions.allow_alerts as i64,
            permissions.allow_billing as i64,
        ],
    )?;
    Ok(changed)
}

pub fn set_assistant_active(
    conn: &Connection,
    pa_id: i64,
    is_active: bool,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE personal_assistants SET is_active = ?2 WHERE pa_id = ?1",
        params![pa_id, is_active as i64],
    )?;
    Ok(changed)
}

/// Create or overwrite the per-clinic override row, inside the caller's
/// transaction.
pub fn upsert_access(
    conn: &Connection,
    pa_id: i64,
    clinic_id: i64,
    permissions: &ModulePermissions,
) -> Result<(), DatabaseError> {
    let pa_access_id = allocate_id(conn, "pa_access", "pa_access_id")?;
    conn.execute(
        "INSERT INTO pa_access (pa_access_id, pa_id, clinic_id, allow_patients, allow_schedules,
         allow_inventory, allow_alerts, allow_billing)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (pa_id, clinic_id) DO UPDATE SET
             allow_patients = excluded.allow_patients,
             allow_schedules = excluded.allow_schedules,
             allow_inventory = excluded.allow_inventory,
             allow_alerts = excluded.allow_alerts,
             allow_billing = excluded.allow_billing",
        params![
            pa_access_id,
            pa_id,
            clinic_id,
            permissions.allow_patients as i64,
            permissions.allow_schedules as i64,
            permissions.allow_inventory as i64,
            permissions.allow_alerts as i64,
            permissions.allow_billing as i64,
        ],
    )?;
    Ok(())
}

pub fn access_row(
    conn: &Connection,
    pa_id: i64,
    clinic_id: i64,
) -> Result<Option<PaAccess>, DatabaseError> {
    conn.query_row(
        "SELECT pa_access_id, pa_id, clinic_id, allow_patients, allow_schedules,
         allow_inventory, allow_alerts, allow_billing
         FROM pa_access WHERE pa_id = ?1 AND clinic_id = ?2",
        params![pa_id, clinic_id],
        access_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn access_rows_for_assistant(
    conn: &Connection,
    pa_id: i64,
) -> Result<Vec<PaAccess>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT pa_access_id, pa_id, clinic_id, allow_patients, allow_schedules,
         allow_inventory, allow_alerts, allow_billing
         FROM pa_access WHERE pa_id = ?1 ORDER BY clinic_id",
    )?;
    let rows = stmt.query_map(params![pa_id], access_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Drop override rows for clinics not named in `keep` — stale scope is
/// revoked, not left behind.
pub fn delete_access_except(
    conn: &Connection,
    pa_id: i64,
    keep: &[i64],
) -> Result<usize, DatabaseError> {
    // Small N (clinics per doctor); delete row by row rather than
    // building a dynamic IN list.
    let existing = access_rows_for_assistant(conn, pa_id)?;
    let mut removed = 0;
    for row in existing {
        if !keep.contains(&row.clinic_id) {
            removed += conn.execute(
                "DELETE FROM pa_access WHERE pa_id = ?1 AND clinic_id = ?2",
                params![pa_id, row.clinic_id],
            )?;
        }
    }
    Ok(removed)
}

const COLUMNS: &str = "pa_id, doctor_id, first_name, last_name, email, mobile_number, \
                       password_hash, allow_patients, allow_schedules, allow_inventory, \
                       allow_alerts, allow_billing, is_active";

fn assistant_from_row(row: &rusqlite::Row<'_>) -> Result<PersonalAssistant, rusqlite::Error> {
    Ok(PersonalAssistant {
        pa_id: row.get(0)?,
        doctor_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        mobile_number: row.get(5)?,
        password_hash: row.get(6)?,
        permissions: ModulePermissions {
            allow_patients: row.get::<_, i64>(7)? != 0,
            allow_schedules: row.get::<_, i64>(8)? != 0,
            allow_inventory: row.get::<_, i64>(9)? != 0,
            allow_alerts: row.get::<_, i64>(10)? != 0,
            allow_billing: row.get::<_, i64>(11)? != 0,
        },
        is_active: row.get::<_, i64>(12)? != 0,
    })
}

fn access_from_row(row: &rusqlite::Row<'_>) -> Result<PaAccess, rusqlite::Error> {
    Ok(PaAccess {
        pa_access_id: row.get(0)?,
        pa_id: row.get(1)?,
        clinic_id: row.get(2)?,
        permissions: ModulePermissions {
            allow_patients: row.get::<_, i64>(3)? != 0,
            allow_schedules: row.get::<_, i64>(4)? != 0,
            allow_inventory: row.get::<_, i64>(5)? != 0,
            allow_alerts: row.get::<_, i64>(6)? != 0,
            allow_billing: row.get::<_, i64>(7)? != 0,
        },
    })
}
