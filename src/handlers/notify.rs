//! Emails sent to volunteers when devices or organisations they work
//! on change hands. Delivery is best-effort: the triggering operation
//! never fails because of the mail API.

use crate::auth::Caller;
use crate::filter::paths::DbEnum;
use crate::models::{Kit, KitStatus, KitVolunteerRole, Organisation, Volunteer};
use crate::services::{send_best_effort, EmailMessage, NotificationSender};

/// Callers never get notified about their own edits, and volunteers
/// without an email address are skipped.
fn wants_mail(volunteer: &Volunteer, caller: &Caller) -> bool {
    !volunteer.email.trim().is_empty() && volunteer.email != caller.email
}

pub fn device_assigned_message(
    volunteer: &Volunteer,
    kit: &Kit,
    role: KitVolunteerRole,
) -> EmailMessage {
    EmailMessage::plain(
        &volunteer.email,
        "TechKit: Device Assigned",
        format!(
            "Hi {},\n\nYou have been assigned to the {} device ({}) as {}.\n\nTechKit",
            volunteer.name,
            kit.kit_type.as_db_str(),
            kit.model,
            role.as_db_str(),
        ),
    )
}

pub fn status_updated_message(
    volunteer: &Volunteer,
    kit: &Kit,
    previous: KitStatus,
) -> EmailMessage {
    EmailMessage::plain(
        &volunteer.email,
        "TechKit: Device Status Updated",
        format!(
            "Hi {},\n\nThe status of the {} device ({}) changed from {} to {}.\n\nTechKit",
            volunteer.name,
            kit.kit_type.as_db_str(),
            kit.model,
            previous.as_db_str(),
            kit.status.as_db_str(),
        ),
    )
}

pub fn organisation_assigned_message(
    volunteer: &Volunteer,
    organisation: &Organisation,
) -> EmailMessage {
    EmailMessage::plain(
        &volunteer.email,
        "TechKit: Organisation Assigned",
        format!(
            "Hi {},\n\nYou have been assigned to the organisation {}.\n\nTechKit",
            volunteer.name, organisation.name,
        ),
    )
}

pub async fn notify_assigned(
    sender: &dyn NotificationSender,
    caller: &Caller,
    volunteers: &[Volunteer],
    kit: &Kit,
    role: KitVolunteerRole,
) {
    for volunteer in volunteers.iter().filter(|v| wants_mail(v, caller)) {
        send_best_effort(sender, device_assigned_message(volunteer, kit, role)).await;
    }
}

pub async fn notify_status_updated(
    sender: &dyn NotificationSender,
    caller: &Caller,
    volunteers: &[Volunteer],
    kit: &Kit,
    previous: KitStatus,
) {
    for volunteer in volunteers.iter().filter(|v| wants_mail(v, caller)) {
        send_best_effort(sender, status_updated_message(volunteer, kit, previous)).await;
    }
}

pub async fn notify_organisation_assigned(
    sender: &dyn NotificationSender,
    caller: &Caller,
    volunteer: &Volunteer,
    organisation: &Organisation,
) {
    if wants_mail(volunteer, caller) {
        send_best_effort(sender, organisation_assigned_message(volunteer, organisation)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KitAttributes, KitType, VolunteerAttributes};
    use crate::services::mail::testing::RecordingSender;
    use chrono::Utc;
    use sqlx::types::Json;

    fn volunteer(id: i64, name: &str, email: &str) -> Volunteer {
        Volunteer {
            id,
            name: name.into(),
            phone_number: String::new(),
            email: email.into(),
            expertise: String::new(),
            sub_group: String::new(),
            storage: String::new(),
            transport: String::new(),
            post_code: String::new(),
            availability: String::new(),
            consent: "yes".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            kit_count: 0,
            coordinates: None,
            attributes: Json(VolunteerAttributes::default()),
        }
    }

    fn kit() -> Kit {
        Kit {
            id: 7,
            kit_type: KitType::Laptop,
            status: KitStatus::Ready,
            model: "ThinkPad T480".into(),
            location: "SW2".into(),
            age: 3,
            archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            attributes: Json(KitAttributes::default()),
            coordinates: None,
            donor_id: None,
            organisation_id: None,
        }
    }

    fn caller(email: &str) -> Caller {
        Caller { name: "Editor".into(), email: email.into(), permissions: vec![] }
    }

    #[tokio::test]
    async fn skips_the_caller_and_blank_addresses() {
        let sender = RecordingSender::default();
        let volunteers = vec![
            volunteer(1, "Me", "me@x.com"),
            volunteer(2, "NoMail", ""),
            volunteer(3, "Other", "other@x.com"),
        ];
        notify_assigned(&sender, &caller("me@x.com"), &volunteers, &kit(), KitVolunteerRole::Technician)
            .await;
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "other@x.com");
        assert!(sent[0].body.contains("TECHNICIAN"));
        assert!(sent[0].body.contains("ThinkPad T480"));
    }

    #[tokio::test]
    async fn status_change_names_both_states() {
        let sender = RecordingSender::default();
        let volunteers = vec![volunteer(1, "Tess", "tess@x.com")];
        notify_status_updated(&sender, &caller("editor@x.com"), &volunteers, &kit(), KitStatus::WithTechie)
            .await;
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("from WITH_TECHIE to READY"));
    }
}
