//! Accounts, clinic lifecycle, and the assistant permission guard.
//!
//! Doctors own clinics and delegate to personal assistants. An
//! assistant acts on a module within a clinic only when three gates
//! agree: the account is active, the global permission flag allows the
//! module, and a per-clinic override row allows it too. At most one
//! clinic per doctor is online at a time.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::crypto;
use crate::db::repository::{assistant as assistant_repo, clinic as clinic_repo, doctor as doctor_repo};
use crate::error::{Error, Result};
use crate::models::{
    Clinic, Doctor, Module, ModulePermissions, NewAssistant, NewClinic, NewDoctor, PaAccess,
    PaAccessGrant, PersonalAssistant,
};

/// Outcome of resolving which clinic a doctor is working in.
#[derive(Debug)]
pub enum OnlineResolution {
    /// A clinic is already online.
    AlreadyOnline(Clinic),
    /// The doctor's single active clinic was brought online.
    Activated(Clinic),
    /// Several active clinics and none online; the caller must pick.
    SelectionRequired(Vec<Clinic>),
    /// The doctor has no active clinic.
    NoClinics,
}

/// Create a doctor account. The password is stored only as a salted
/// hash.
pub fn register_doctor(conn: &mut Connection, new: &NewDoctor) -> Result<Doctor> {
    if new.email.trim().is_empty() {
        return Err(Error::validation("email", "must not be empty"));
    }
    if new.password.len() < 8 {
        return Err(Error::validation("password", "must be at least 8 characters"));
    }
    let hash = crypto::hash_password(&new.password);
    match doctor_repo::create_doctor(conn, new, &hash) {
        Ok(doctor) => {
            info!(doctor_id = doctor.doctor_id, "doctor registered");
            Ok(doctor)
        }
        Err(err) if err.is_unique_violation() => Err(Error::Conflict(
            "a doctor with this email already exists".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

/// Create a clinic under a doctor. The first active clinic of a doctor
/// comes up online; later ones start offline. Registration numbers are
/// unique among active clinics only — a deactivated clinic releases
/// its number.
pub fn create_clinic(conn: &mut Connection, new: &NewClinic) -> Result<Clinic> {
    if new.name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    if new.reg_no.trim().is_empty() {
        return Err(Error::validation("regNo", "must not be empty"));
    }
    if doctor_repo::get_doctor(conn, new.doctor_id)?.is_none() {
        return Err(Error::not_found("doctor", new.doctor_id));
    }
    if clinic_repo::active_reg_no_exists(conn, &new.reg_no)? {
        return Err(Error::Conflict(format!(
            "an active clinic already holds registration number {}",
            new.reg_no.trim()
        )));
    }
    let is_first = clinic_repo::active_clinics_for_doctor(conn, new.doctor_id)?.is_empty();
    let clinic = clinic_repo::create_clinic(conn, new, is_first)?;
    info!(
        clinic_id = clinic.clinic_id,
        doctor_id = clinic.doctor_id,
        is_online = clinic.is_online,
        "clinic created"
    );
    Ok(clinic)
}

/// Bring one clinic online, forcing every other clinic of the doctor
/// offline in the same transaction.
pub fn set_online(conn: &mut Connection, doctor_id: i64, clinic_id: i64) -> Result<Clinic> {
    let clinic = owned_active_clinic(conn, doctor_id, clinic_id)?;

    let tx = conn.transaction()?;
    clinic_repo::clear_online_for_doctor(&tx, doctor_id)?;
    clinic_repo::set_online_flag(&tx, clinic.clinic_id, true)?;
    tx.commit()?;

    clinic_repo::get_clinic(conn, clinic_id)?.ok_or_else(|| Error::not_found("clinic", clinic_id))
}

/// Take a clinic offline without bringing another one up.
pub fn set_offline(conn: &Connection, doctor_id: i64, clinic_id: i64) -> Result<Clinic> {
    let clinic = owned_active_clinic(conn, doctor_id, clinic_id)?;
    clinic_repo::set_online_flag(conn, clinic.clinic_id, false)?;
    clinic_repo::get_clinic(conn, clinic_id)?.ok_or_else(|| Error::not_found("clinic", clinic_id))
}

/// Soft-delete a clinic. Its registration number becomes reusable.
pub fn deactivate_clinic(conn: &Connection, doctor_id: i64, clinic_id: i64) -> Result<()> {
    let clinic = owned_active_clinic(conn, doctor_id, clinic_id)?;
    clinic_repo::deactivate_clinic(conn, clinic.clinic_id)?;
    info!(clinic_id, doctor_id, "clinic deactivated");
    Ok(())
}

/// Resolve the working clinic for a doctor: keep the one already
/// online, bring a lone active clinic up automatically, or report that
/// a choice is needed.
pub fn auto_online_if_single(conn: &mut Connection, doctor_id: i64) -> Result<OnlineResolution> {
    let clinics = clinic_repo::active_clinics_for_doctor(conn, doctor_id)?;
    if clinics.is_empty() {
        return Ok(OnlineResolution::NoClinics);
    }
    if let Some(online) = clinics.iter().find(|c| c.is_online) {
        return Ok(OnlineResolution::AlreadyOnline(online.clone()));
    }
    if clinics.len() == 1 {
        let clinic = set_online(conn, doctor_id, clinics[0].clinic_id)?;
        return Ok(OnlineResolution::Activated(clinic));
    }
    Ok(OnlineResolution::SelectionRequired(clinics))
}

/// Create an assistant account under a doctor.
pub fn register_assistant(conn: &mut Connection, new: &NewAssistant) -> Result<PersonalAssistant> {
    if new.email.trim().is_empty() {
        return Err(Error::validation("email", "must not be empty"));
    }
    if new.password.len() < 8 {
        return Err(Error::validation("password", "must be at least 8 characters"));
    }
    if doctor_repo::get_doctor(conn, new.doctor_id)?.is_none() {
        return Err(Error::not_found("doctor", new.doctor_id));
    }
    let hash = crypto::hash_password(&new.password);
    match assistant_repo::create_assistant(conn, new, &hash) {
        Ok(assistant) => {
            info!(
                pa_id = assistant.pa_id,
                doctor_id = assistant.doctor_id,
                "assistant registered"
            );
            Ok(assistant)
        }
        Err(err) if err.is_unique_violation() => Err(Error::Conflict(
            "an assistant with this email already exists".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

/// Authenticate an assistant by email or mobile number. Every failure
/// mode surfaces as the same denial.
pub fn authenticate(
    conn: &Connection,
    identifier: &str,
    password: &str,
) -> Result<PersonalAssistant> {
    let Some(assistant) = assistant_repo::find_by_identifier(conn, identifier)? else {
        return Err(Error::AccessDenied("invalid credentials".to_string()));
    };
    if !crypto::verify_password(password, &assistant.password_hash) {
        warn!(pa_id = assistant.pa_id, "failed login attempt");
        return Err(Error::AccessDenied("invalid credentials".to_string()));
    }
    if !assistant.is_active {
        return Err(Error::AccessDenied("account is disabled".to_string()));
    }
    Ok(assistant)
}

/// The three-gate permission check: active account, global module flag,
/// and a per-clinic override row allowing the module.
pub fn can_act_on_clinic(
    conn: &Connection,
    pa_id: i64,
    clinic_id: i64,
    module: Module,
) -> Result<bool> {
    let Some(assistant) = assistant_repo::get_assistant(conn, pa_id)? else {
        return Err(Error::not_found("personal_assistant", pa_id));
    };
    if !assistant.is_active || !assistant.permissions.allows(module) {
        return Ok(false);
    }
    let allowed = match assistant_repo::access_row(conn, pa_id, clinic_id)? {
        Some(access) => access.permissions.allows(module),
        None => false,
    };
    Ok(allowed)
}

/// Like [`can_act_on_clinic`], but as a guard that denies with the
/// module name in the message.
pub fn require_access(
    conn: &Connection,
    pa_id: i64,
    clinic_id: i64,
    module: Module,
) -> Result<()> {
    if can_act_on_clinic(conn, pa_id, clinic_id, module)? {
        Ok(())
    } else {
        Err(Error::AccessDenied(format!(
            "assistant {pa_id} may not use {} in clinic {clinic_id}",
            module.as_str()
        )))
    }
}

/// Replace an assistant's global module flags.
pub fn update_permissions(
    conn: &Connection,
    pa_id: i64,
    permissions: &ModulePermissions,
) -> Result<PersonalAssistant> {
    let changed = assistant_repo::update_permissions(conn, pa_id, permissions)?;
    if changed == 0 {
        return Err(Error::not_found("personal_assistant", pa_id));
    }
    assistant_repo::get_assistant(conn, pa_id)?
        .ok_or_else(|| Error::not_found("personal_assistant", pa_id))
}

/// Enable or disable an assistant account.
pub fn set_assistant_active(conn: &Connection, pa_id: i64, is_active: bool) -> Result<()> {
    let changed = assistant_repo::set_assistant_active(conn, pa_id, is_active)?;
    if changed == 0 {
        return Err(Error::not_found("personal_assistant", pa_id));
    }
    info!(pa_id, is_active, "assistant account toggled");
    Ok(())
}

/// Replace an assistant's per-clinic scope wholesale: the given grants
/// are upserted and every override for a clinic not named is revoked.
pub fn replace_access(
    conn: &mut Connection,
    pa_id: i64,
    grants: &[PaAccessGrant],
) -> Result<Vec<PaAccess>> {
    if assistant_repo::get_assistant(conn, pa_id)?.is_none() {
        return Err(Error::not_found("personal_assistant", pa_id));
    }
    for grant in grants {
        if clinic_repo::get_clinic(conn, grant.clinic_id)?.is_none() {
            return Err(Error::not_found("clinic", grant.clinic_id));
        }
    }

    let tx = conn.transaction()?;
    let keep: Vec<i64> = grants.iter().map(|g| g.clinic_id).collect();
    for grant in grants {
        assistant_repo::upsert_access(&tx, pa_id, grant.clinic_id, &grant.permissions)?;
    }
    let revoked = assistant_repo::delete_access_except(&tx, pa_id, &keep)?;
    tx.commit()?;

    info!(pa_id, granted = grants.len(), revoked, "assistant scope replaced");
    Ok(assistant_repo::access_rows_for_assistant(conn, pa_id)?)
}

fn owned_active_clinic(conn: &Connection, doctor_id: i64, clinic_id: i64) -> Result<Clinic> {
    let clinic = clinic_repo::get_clinic(conn, clinic_id)?
        .ok_or_else(|| Error::not_found("clinic", clinic_id))?;
    // Ownership failures read the same as a missing clinic.
    if clinic.doctor_id != doctor_id || !clinic.is_active {
        return Err(Error::not_found("clinic", clinic_id));
    }
    Ok(clinic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::testutil::{seed_clinic, seed_doctor};

    fn new_clinic(doctor_id: i64, reg_no: &str) -> NewClinic {
        NewClinic {
            doctor_id,
            name: "City Clinic".to_string(),
            address: "12 Mall Road".to_string(),
            reg_no: reg_no.to_string(),
            logo: String::new(),
            phone_number: "042-111222333".to_string(),
            clinic_fee: 500.0,
        }
    }

    fn new_assistant(doctor_id: i64, email: &str, permissions: ModulePermissions) -> NewAssistant {
        NewAssistant {
            doctor_id,
            first_name: "Sana".to_string(),
            last_name: "Tariq".to_string(),
            email: email.to_string(),
            mobile_number: "0301-5550000".to_string(),
            password: "hunter2hunter2".to_string(),
            permissions,
        }
    }

    fn all_allowed() -> ModulePermissions {
        ModulePermissions {
            allow_patients: true,
            allow_schedules: true,
            allow_inventory: true,
            allow_alerts: true,
            allow_billing: true,
        }
    }

    #[test]
    fn first_clinic_comes_up_online_later_ones_offline() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);

        let first = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap();
        assert!(first.is_online);
        let second = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-2")).unwrap();
        assert!(!second.is_online);
    }

    #[test]
    fn reg_no_conflicts_only_among_active_clinics() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);

        let first = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap();
        let err = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Deactivation releases the number for reuse.
        deactivate_clinic(&conn, doctor_id, first.clinic_id).unwrap();
        create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap();
    }

    #[test]
    fn at_most_one_clinic_online_per_doctor() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let c1 = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap();
        let c2 = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-2")).unwrap();

        let brought_up = set_online(&mut conn, doctor_id, c2.clinic_id).unwrap();
        assert!(brought_up.is_online);

        let clinics = clinic_repo::active_clinics_for_doctor(&conn, doctor_id).unwrap();
        let online: Vec<i64> = clinics
            .iter()
            .filter(|c| c.is_online)
            .map(|c| c.clinic_id)
            .collect();
        assert_eq!(online, vec![c2.clinic_id]);
        let _ = c1;
    }

    #[test]
    fn set_online_rejects_foreign_clinic() {
        let mut conn = open_memory_database().unwrap();
        let owner = seed_doctor(&mut conn);
        let other = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, owner);

        let err = set_online(&mut conn, other, clinic_id).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "clinic", .. }));
    }

    #[test]
    fn auto_online_resolution_covers_all_cases() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        assert!(matches!(
            auto_online_if_single(&mut conn, doctor_id).unwrap(),
            OnlineResolution::NoClinics
        ));

        let c1 = create_clinic(&mut conn, &new_clinic(doctor_id, "REG-1")).unwrap();
        // First clinic is created online.
        assert!(matches!(
            auto_online_if_single(&mut conn, doctor_id).unwrap(),
            OnlineResolution::AlreadyOnline(_)
        ));

        set_offline(&conn, doctor_id, c1.clinic_id).unwrap();
        assert!(matches!(
            auto_online_if_single(&mut conn, doctor_id).unwrap(),
            OnlineResolution::Activated(_)
        ));

        create_clinic(&mut conn, &new_clinic(doctor_id, "REG-2")).unwrap();
        set_offline(&conn, doctor_id, c1.clinic_id).unwrap();
        assert!(matches!(
            auto_online_if_single(&mut conn, doctor_id).unwrap(),
            OnlineResolution::SelectionRequired(clinics) if clinics.len() == 2
        ));
    }

    #[test]
    fn assistant_login_accepts_email_or_mobile() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "Sana.T@clinic.test", all_allowed()),
        )
        .unwrap();

        // Email comparison is case-insensitive via stored lowercasing.
        let by_email = authenticate(&conn, "sana.t@clinic.test", "hunter2hunter2").unwrap();
        let by_mobile = authenticate(&conn, "0301-5550000", "hunter2hunter2").unwrap();
        assert_eq!(by_email.pa_id, by_mobile.pa_id);
    }

    #[test]
    fn wrong_password_and_disabled_account_both_deny() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let assistant = register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "sana@clinic.test", all_allowed()),
        )
        .unwrap();

        let err = authenticate(&conn, "sana@clinic.test", "wrong").unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));

        set_assistant_active(&conn, assistant.pa_id, false).unwrap();
        let err = authenticate(&conn, "sana@clinic.test", "hunter2hunter2").unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }

    #[test]
    fn permission_needs_global_flag_and_clinic_grant() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let global = ModulePermissions {
            allow_patients: true,
            allow_inventory: true,
            ..Default::default()
        };
        let assistant = register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "sana@clinic.test", global),
        )
        .unwrap();

        // No clinic grant yet: nothing is allowed anywhere.
        assert!(!can_act_on_clinic(&conn, assistant.pa_id, clinic_id, Module::Patients).unwrap());

        replace_access(
            &mut conn,
            assistant.pa_id,
            &[PaAccessGrant {
                clinic_id,
                permissions: ModulePermissions {
                    allow_patients: true,
                    allow_billing: true,
                    ..Default::default()
                },
            }],
        )
        .unwrap();

        // Allowed: both gates open.
        assert!(can_act_on_clinic(&conn, assistant.pa_id, clinic_id, Module::Patients).unwrap());
        // Clinic grants inventory? No — and billing lacks the global flag.
        assert!(!can_act_on_clinic(&conn, assistant.pa_id, clinic_id, Module::Inventory).unwrap());
        assert!(!can_act_on_clinic(&conn, assistant.pa_id, clinic_id, Module::Billing).unwrap());
    }

    #[test]
    fn disabled_assistant_is_denied_everywhere() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let clinic_id = seed_clinic(&mut conn, doctor_id);
        let assistant = register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "sana@clinic.test", all_allowed()),
        )
        .unwrap();
        replace_access(
            &mut conn,
            assistant.pa_id,
            &[PaAccessGrant {
                clinic_id,
                permissions: all_allowed(),
            }],
        )
        .unwrap();

        set_assistant_active(&conn, assistant.pa_id, false).unwrap();
        assert!(!can_act_on_clinic(&conn, assistant.pa_id, clinic_id, Module::Patients).unwrap());
        let err = require_access(&conn, assistant.pa_id, clinic_id, Module::Patients).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }

    #[test]
    fn replace_access_revokes_unlisted_clinics() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let c1 = seed_clinic(&mut conn, doctor_id);
        let c2 = seed_clinic(&mut conn, doctor_id);
        let assistant = register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "sana@clinic.test", all_allowed()),
        )
        .unwrap();

        replace_access(
            &mut conn,
            assistant.pa_id,
            &[
                PaAccessGrant { clinic_id: c1, permissions: all_allowed() },
                PaAccessGrant { clinic_id: c2, permissions: all_allowed() },
            ],
        )
        .unwrap();

        let rows = replace_access(
            &mut conn,
            assistant.pa_id,
            &[PaAccessGrant { clinic_id: c2, permissions: all_allowed() }],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clinic_id, c2);
        assert!(!can_act_on_clinic(&conn, assistant.pa_id, c1, Module::Patients).unwrap());
    }

    #[test]
    fn duplicate_assistant_email_is_conflict() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "sana@clinic.test", all_allowed()),
        )
        .unwrap();
        let err = register_assistant(
            &mut conn,
            &new_assistant(doctor_id, "SANA@clinic.test", all_allowed()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn doctor_password_is_stored_hashed() {
        let mut conn = open_memory_database().unwrap();
        let doctor = register_doctor(
            &mut conn,
            &NewDoctor {
                first_name: "Ayesha".to_string(),
                last_name: "Khan".to_string(),
                email: "ayesha@clinic.test".to_string(),
                mobile_number: "0300-0000000".to_string(),
                password: "correct horse battery".to_string(),
            },
        )
        .unwrap();
        assert!(doctor.password_hash.starts_with("pbkdf2-sha256$"));
        assert!(!doctor.password_hash.contains("correct horse"));
        assert!(crypto::verify_password(
            "correct horse battery",
            &doctor.password_hash
        ));
    }

    #[test]
    fn short_password_rejected_before_hashing() {
        let mut conn = open_memory_database().unwrap();
        let doctor_id = seed_doctor(&mut conn);
        let mut new = new_assistant(doctor_id, "sana@clinic.test", all_allowed());
        new.password = "short".to_string();
        let err = register_assistant(&mut conn, &new).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "password", .. }));
    }
}
